//! Selection extraction.

use crate::model::TaxonSelection;

use super::state::{CheckState, NodeId, TaxonomyTree};

/// Name of the synthetic root the provider wraps single-rooted data in.
pub const SYNTHETIC_ROOT: &str = "Root";

impl TaxonomyTree {
    /// The minimal checked set, in display order.
    ///
    /// A checked node stands for its whole subtree, so nothing below it is
    /// reported. A selection consisting only of the synthetic root means
    /// "no taxonomic restriction" and comes back empty.
    pub fn selection(&self) -> Vec<TaxonSelection> {
        let mut selected: Vec<NodeId> = Vec::new();
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();

        while let Some(id) = stack.pop() {
            if self.nodes[id.0].check == CheckState::Checked {
                selected.push(id);
                continue;
            }
            stack.extend(self.materialized_children(id).iter().rev().copied());
        }

        if let [only] = selected.as_slice()
            && self.nodes[only.0].name == SYNTHETIC_ROOT
        {
            return Vec::new();
        }

        selected
            .into_iter()
            .map(|id| TaxonSelection {
                name: self.nodes[id.0].name.clone(),
                rank: self.nodes[id.0].rank.clone(),
            })
            .collect()
    }

    /// Number of checked materialized nodes, descendants included.
    pub fn checked_count(&self) -> usize {
        (0..self.nodes.len())
            .map(NodeId)
            .filter(|id| self.check_state(*id) == Some(CheckState::Checked))
            .count()
    }
}
