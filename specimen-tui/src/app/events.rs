//! Keyboard dispatch.

use std::time::Instant;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::debug;

use super::{App, Focus, TaxonomyView};

impl App {
    /// Handles one terminal event. Returns `true` if a redraw is needed.
    pub(super) fn handle_event(&mut self, event: Event) -> bool {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                self.handle_key(key);
                true
            }
            Event::Resize(..) => true,
            _ => false,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('q') => self.should_quit = true,
                KeyCode::Char('r') => self.submit_query(),
                _ => {}
            }
            return;
        }

        if key.code == KeyCode::Tab {
            self.focus = self.focus.next();
            debug!("Focus -> {:?}", self.focus);
            return;
        }

        match self.focus {
            Focus::Tree => self.handle_tree_key(key),
            Focus::Search => self.handle_search_key(key),
            Focus::Options => self.handle_options_key(key),
            Focus::Results => self.handle_results_key(key),
        }
    }

    fn handle_tree_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('/') {
            if matches!(self.taxonomy(), TaxonomyView::Ready(_)) {
                self.focus = Focus::Search;
            }
            return;
        }

        let Some(panel) = self.panel_mut() else { return };
        let page = panel.page_size();
        match key.code {
            KeyCode::Up => panel.cursor_up(1),
            KeyCode::Down => panel.cursor_down(1),
            KeyCode::PageUp => panel.cursor_up(page),
            KeyCode::PageDown => panel.cursor_down(page),
            KeyCode::Home => panel.cursor_first(),
            KeyCode::End => panel.cursor_last(),
            KeyCode::Right => panel.expand_or_descend(),
            KeyCode::Left => panel.collapse_or_ascend(),
            KeyCode::Enter => panel.toggle_expanded(),
            KeyCode::Char(' ') => panel.toggle_checked(),
            _ => {}
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        let Some(panel) = self.panel_mut() else {
            self.focus = Focus::Tree;
            return;
        };

        let mut leave = false;
        match key.code {
            KeyCode::Esc => {
                panel.clear_query();
                leave = true;
            }
            KeyCode::Enter => leave = panel.pick_suggestion(Instant::now()),
            KeyCode::Up => panel.suggestion_up(),
            KeyCode::Down => panel.suggestion_down(),
            KeyCode::Backspace => panel.pop_query_char(),
            KeyCode::Char(c) => panel.push_query_char(c),
            _ => {}
        }

        if leave {
            self.focus = Focus::Tree;
        }
    }

    fn handle_options_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => self.form.focus_prev(),
            KeyCode::Down => self.form.focus_next(),
            KeyCode::Left => self.form.cycle(false),
            KeyCode::Right => self.form.cycle(true),
            KeyCode::Backspace => self.form.backspace(),
            KeyCode::Char(' ') => self.form.activate(),
            KeyCode::Char(c) => {
                self.form.type_char(c);
            }
            _ => {}
        }
    }

    fn handle_results_key(&mut self, key: KeyEvent) {
        let rows = self
            .results
            .response
            .as_ref()
            .map_or(0, |response| response.rows.len());
        let offset = &mut self.results.scroll_offset;
        match key.code {
            KeyCode::Up => *offset = offset.saturating_sub(1),
            KeyCode::Down => *offset = (*offset + 1).min(rows.saturating_sub(1)),
            KeyCode::PageUp => *offset = offset.saturating_sub(10),
            KeyCode::PageDown => *offset = (*offset + 10).min(rows.saturating_sub(1)),
            KeyCode::Home => *offset = 0,
            KeyCode::End => *offset = rows.saturating_sub(1),
            _ => {}
        }
    }
}
