//! Taxonomy pane: tree cursor, scrolling and search.

use std::time::{Duration, Instant};

use log::{debug, warn};
use specimen_lib::model::{TaxonNode, TaxonSelection};
use specimen_lib::tree::{FlatRow, IndexEntry, NodeId, TaxonomyTree};

/// How long a revealed search hit stays highlighted.
pub const HIGHLIGHT_DURATION: Duration = Duration::from_millis(1500);

/// Interactive state around a [`TaxonomyTree`].
///
/// The tree is the source of truth; `rows` is the cached projection and is
/// rebuilt after every mutation.
#[derive(Debug)]
pub struct TaxonomyPanel {
    tree: TaxonomyTree,
    rows: Vec<FlatRow>,
    /// Index into `rows`.
    cursor: usize,
    /// First visible row.
    scroll_offset: usize,
    viewport_height: usize,
    query: String,
    suggestions: Vec<IndexEntry>,
    suggestion_cursor: usize,
    highlight: Option<(NodeId, Instant)>,
}

impl TaxonomyPanel {
    pub fn new(forest: Vec<TaxonNode>) -> Self {
        let tree = TaxonomyTree::from_forest(forest);
        let rows = tree.visible_rows();
        Self {
            tree,
            rows,
            cursor: 0,
            scroll_offset: 0,
            viewport_height: 0,
            query: String::new(),
            suggestions: Vec::new(),
            suggestion_cursor: 0,
            highlight: None,
        }
    }

    pub fn tree(&self) -> &TaxonomyTree {
        &self.tree
    }

    pub fn selection(&self) -> Vec<TaxonSelection> {
        self.tree.selection()
    }

    pub fn rows(&self) -> &[FlatRow] {
        &self.rows
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> Option<&FlatRow> {
        self.rows.get(self.cursor)
    }

    /// Rows that fit in the viewport.
    pub fn visible_range(&self) -> std::ops::Range<usize> {
        let end = (self.scroll_offset + self.viewport_height).min(self.rows.len());
        self.scroll_offset.min(end)..end
    }

    /// Set the viewport height (called by the renderer).
    pub fn set_viewport_height(&mut self, height: usize) {
        self.viewport_height = height;
        self.scroll_to_cursor();
    }

    fn refresh(&mut self) {
        self.rows = self.tree.visible_rows();
        if self.cursor >= self.rows.len() {
            self.cursor = self.rows.len().saturating_sub(1);
        }
        self.scroll_to_cursor();
    }

    fn scroll_to_cursor(&mut self) {
        if self.viewport_height == 0 {
            return;
        }
        if self.cursor < self.scroll_offset {
            self.scroll_offset = self.cursor;
        } else if self.cursor >= self.scroll_offset + self.viewport_height {
            self.scroll_offset = self.cursor + 1 - self.viewport_height;
        }
    }

    fn move_cursor_to(&mut self, id: NodeId) {
        if let Some(index) = self.rows.iter().position(|row| row.id == id) {
            self.cursor = index;
            self.scroll_to_cursor();
        }
    }

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------

    pub fn cursor_up(&mut self, by: usize) {
        self.cursor = self.cursor.saturating_sub(by);
        self.scroll_to_cursor();
    }

    pub fn cursor_down(&mut self, by: usize) {
        self.cursor = (self.cursor + by).min(self.rows.len().saturating_sub(1));
        self.scroll_to_cursor();
    }

    pub fn cursor_first(&mut self) {
        self.cursor = 0;
        self.scroll_to_cursor();
    }

    pub fn cursor_last(&mut self) {
        self.cursor = self.rows.len().saturating_sub(1);
        self.scroll_to_cursor();
    }

    pub fn page_size(&self) -> usize {
        self.viewport_height.max(1)
    }

    /// Right arrow: expand a collapsed node, or step into an expanded one.
    pub fn expand_or_descend(&mut self) {
        let Some(row) = self.current().cloned() else { return };
        if row.has_children && !row.is_expanded {
            if let Err(e) = self.tree.expand(row.id) {
                warn!("Expand failed: {}", e);
            }
            self.refresh();
        } else if row.is_expanded {
            self.cursor_down(1);
        }
    }

    /// Left arrow: collapse an expanded node, or step out to the parent.
    pub fn collapse_or_ascend(&mut self) {
        let Some(row) = self.current().cloned() else { return };
        if row.is_expanded {
            if let Err(e) = self.tree.collapse(row.id) {
                warn!("Collapse failed: {}", e);
            }
            self.refresh();
        } else if let Some(parent) = self.tree.parent(row.id) {
            self.move_cursor_to(parent);
        }
    }

    pub fn toggle_expanded(&mut self) {
        let Some(id) = self.current().map(|row| row.id) else { return };
        if let Err(e) = self.tree.toggle_expanded(id) {
            warn!("Toggle expand failed: {}", e);
        }
        self.refresh();
    }

    /// Space: click the checkbox under the cursor.
    pub fn toggle_checked(&mut self) {
        let Some(id) = self.current().map(|row| row.id) else { return };
        match self.tree.toggle_checked(id) {
            Ok(checked) => debug!("Checkbox {} -> {}", id, checked),
            Err(e) => warn!("Toggle check failed: {}", e),
        }
        self.refresh();
    }

    // -------------------------------------------------------------------------
    // Search
    // -------------------------------------------------------------------------

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn suggestions(&self) -> &[IndexEntry] {
        &self.suggestions
    }

    pub fn suggestion_cursor(&self) -> usize {
        self.suggestion_cursor
    }

    pub fn push_query_char(&mut self, c: char) {
        self.query.push(c);
        self.update_suggestions();
    }

    pub fn pop_query_char(&mut self) {
        self.query.pop();
        self.update_suggestions();
    }

    pub fn clear_query(&mut self) {
        self.query.clear();
        self.update_suggestions();
    }

    fn update_suggestions(&mut self) {
        self.suggestions = self.tree.search(&self.query);
        self.suggestion_cursor = 0;
    }

    pub fn suggestion_up(&mut self) {
        self.suggestion_cursor = self.suggestion_cursor.saturating_sub(1);
    }

    pub fn suggestion_down(&mut self) {
        if self.suggestion_cursor + 1 < self.suggestions.len() {
            self.suggestion_cursor += 1;
        }
    }

    /// Reveals the chosen suggestion: expands its ancestors, moves the
    /// cursor onto it and highlights it. Checkboxes are left alone.
    ///
    /// Returns `false` when there is nothing to pick.
    pub fn pick_suggestion(&mut self, now: Instant) -> bool {
        let Some(entry) = self.suggestions.get(self.suggestion_cursor).cloned() else {
            return false;
        };

        if let Err(e) = self.tree.reveal(entry.id) {
            warn!("Reveal of '{}' failed: {}", entry.name, e);
            return false;
        }
        self.refresh();
        self.move_cursor_to(entry.id);
        self.highlight = Some((entry.id, now));

        self.query.clear();
        self.suggestions.clear();
        self.suggestion_cursor = 0;
        true
    }

    /// Highlighted node, if the highlight has not expired at `now`.
    pub fn highlighted(&self, now: Instant) -> Option<NodeId> {
        self.highlight
            .filter(|(_, since)| now.duration_since(*since) < HIGHLIGHT_DURATION)
            .map(|(id, _)| id)
    }

    /// When the current highlight expires.
    pub fn highlight_deadline(&self) -> Option<Instant> {
        self.highlight.map(|(_, since)| since + HIGHLIGHT_DURATION)
    }

    /// Drops an expired highlight. Returns `true` if a redraw is needed.
    pub fn clear_expired_highlight(&mut self, now: Instant) -> bool {
        if self.highlight.is_some() && self.highlighted(now).is_none() {
            self.highlight = None;
            return true;
        }
        false
    }
}
