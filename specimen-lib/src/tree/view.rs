//! Flattened projection of the visible tree.

use super::state::{CheckState, NodeId, TaxonomyTree};

/// A visible row of the tree, ready to be drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatRow {
    pub id: NodeId,
    /// Depth in tree (0 = root).
    pub depth: u16,
    /// `name` or `name (rank)`.
    pub label: String,
    pub has_children: bool,
    pub is_expanded: bool,
    pub check: CheckState,
}

impl FlatRow {
    /// Expand/collapse affordance; blank for leaves.
    pub fn glyph(&self) -> char {
        match (self.has_children, self.is_expanded) {
            (false, _) => ' ',
            (true, true) => '▼',
            (true, false) => '►',
        }
    }

    /// Checkbox indicator for the tri-state.
    pub fn checkbox(&self) -> &'static str {
        match self.check {
            CheckState::Checked => "[x]",
            CheckState::Unchecked => "[ ]",
            CheckState::Indeterminate => "[-]",
        }
    }
}

impl TaxonomyTree {
    /// Rows currently visible: roots, plus the children of every expanded
    /// node, in display order.
    pub fn visible_rows(&self) -> Vec<FlatRow> {
        let mut rows = Vec::new();
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();

        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0];
            rows.push(FlatRow {
                id,
                depth: node.depth,
                label: crate::model::label(&node.name, node.rank.as_deref()),
                has_children: !node.children.is_empty(),
                is_expanded: node.expanded,
                check: node.check,
            });
            if node.expanded {
                stack.extend(self.materialized_children(id).iter().rev().copied());
            }
        }

        rows
    }
}
