//! Checkbox propagation.

use log::debug;

use crate::error::TreeError;

use super::state::{CheckState, NodeId, TaxonomyTree};

impl TaxonomyTree {
    /// Sets a node's checkbox and propagates the change.
    ///
    /// Every materialized descendant takes the new value. Every ancestor is
    /// then recomputed from its materialized children, all the way up to
    /// the root.
    pub fn set_checked(&mut self, id: NodeId, checked: bool) -> Result<(), TreeError> {
        self.ensure_materialized(id)?;
        let value = CheckState::from_bool(checked);

        self.nodes[id.0].check = value;
        self.propagate_down(id, value);
        self.propagate_up(id);

        debug!("Set '{}' to {:?}", self.nodes[id.0].name, value);
        Ok(())
    }

    /// Toggles a node the way a click does: only a checked node unchecks,
    /// unchecked and indeterminate nodes become checked.
    ///
    /// Returns the new checked value.
    pub fn toggle_checked(&mut self, id: NodeId) -> Result<bool, TreeError> {
        self.ensure_materialized(id)?;
        let checked = !self.nodes[id.0].check.is_checked();
        self.set_checked(id, checked)?;
        Ok(checked)
    }

    fn propagate_down(&mut self, id: NodeId, value: CheckState) {
        let mut stack: Vec<NodeId> = self.materialized_children(id).to_vec();
        while let Some(node) = stack.pop() {
            self.nodes[node.0].check = value;
            stack.extend_from_slice(self.materialized_children(node));
        }
    }

    fn propagate_up(&mut self, id: NodeId) {
        let mut current = self.nodes[id.0].parent;
        while let Some(ancestor) = current {
            let state = self.derived_state(ancestor);
            self.nodes[ancestor.0].check = state;
            current = self.nodes[ancestor.0].parent;
        }
    }

    /// Tri-state of a node as a function of its materialized children.
    ///
    /// Nodes without materialized children keep their own value.
    pub(super) fn derived_state(&self, id: NodeId) -> CheckState {
        let children = self.materialized_children(id);
        if children.is_empty() {
            return self.nodes[id.0].check;
        }

        let checked = children
            .iter()
            .filter(|c| self.nodes[c.0].check == CheckState::Checked)
            .count();
        let unchecked = children
            .iter()
            .filter(|c| self.nodes[c.0].check == CheckState::Unchecked)
            .count();

        if checked == children.len() {
            CheckState::Checked
        } else if unchecked == children.len() {
            CheckState::Unchecked
        } else {
            CheckState::Indeterminate
        }
    }
}
