//! Incremental name search over the whole taxonomy.

use log::debug;
use nucleo_matcher::pattern::{Atom, AtomKind, CaseMatching, Normalization};
use nucleo_matcher::{Config, Matcher, Utf32Str};

use crate::error::TreeError;

use super::state::{NodeId, TaxonomyTree};

/// Maximum number of suggestions returned by [`TaxonomyTree::search`].
pub const MAX_SUGGESTIONS: usize = 10;

/// One entry of the flat search index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub id: NodeId,
    pub name: String,
    pub rank: Option<String>,
    /// Root-to-node path, both ends included.
    pub path: Vec<NodeId>,
}

impl IndexEntry {
    /// Display label: `name` or `name (rank)`.
    pub fn label(&self) -> String {
        crate::model::label(&self.name, self.rank.as_deref())
    }
}

/// Flat index of every node, in discovery order.
///
/// Built once when the tree is loaded, independent of materialization, so
/// search can find nodes the user has never expanded towards.
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    entries: Vec<IndexEntry>,
}

impl SearchIndex {
    pub(super) fn build(tree: &TaxonomyTree) -> Self {
        let entries: Vec<IndexEntry> = tree
            .nodes
            .iter()
            .enumerate()
            .map(|(index, node)| {
                let id = NodeId(index);
                IndexEntry {
                    id,
                    name: node.name.clone(),
                    rank: node.rank.clone(),
                    path: tree.path(id),
                }
            })
            .collect();

        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case-insensitive substring match on names.
    ///
    /// Returns at most [`MAX_SUGGESTIONS`] entries in discovery order. A
    /// blank query matches nothing.
    pub fn search(&self, query: &str) -> Vec<&IndexEntry> {
        if query.trim().is_empty() {
            return Vec::new();
        }

        let mut matcher = Matcher::new(Config::DEFAULT);
        let atom = Atom::new(
            query,
            CaseMatching::Ignore,
            Normalization::Never,
            AtomKind::Substring,
            false,
        );

        let mut buf = Vec::new();
        self.entries
            .iter()
            .filter(|entry| {
                let haystack = Utf32Str::new(&entry.name, &mut buf);
                atom.score(haystack, &mut matcher).is_some()
            })
            .take(MAX_SUGGESTIONS)
            .collect()
    }
}

impl TaxonomyTree {
    /// The flat search index built at load time.
    pub fn index(&self) -> &SearchIndex {
        &self.index
    }

    /// Search suggestions for a typed query.
    pub fn search(&self, query: &str) -> Vec<IndexEntry> {
        self.index.search(query).into_iter().cloned().collect()
    }

    /// Makes a node visible: every ancestor is materialized and expanded.
    ///
    /// Check states are never touched here; carry-forward still applies
    /// to any children materialized on the way down.
    pub fn reveal(&mut self, id: NodeId) -> Result<(), TreeError> {
        if id.0 >= self.nodes.len() {
            return Err(TreeError::UnknownNode(id));
        }

        let path = self.path(id);
        for ancestor in &path[..path.len() - 1] {
            self.expand(*ancestor)?;
        }

        debug!("Revealed '{}' at depth {}", self.nodes[id.0].name, path.len() - 1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaxonNode;
    use crate::tree::CheckState;
    use crate::tree::tests::{assert_consistent, scenario_tree};

    fn names(entries: &[IndexEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_substring_in_discovery_order() {
        let root = TaxonNode::new("Root", None).with_children([
            TaxonNode::new("Genus X", Some("genus")),
            TaxonNode::new("Metals", None).with_child(TaxonNode::new("Argentum", None)),
            TaxonNode::new("Aurum", None),
        ]);
        let tree = TaxonomyTree::from_forest(vec![root]);

        assert_eq!(names(&tree.search("gen")), vec!["Genus X", "Argentum"]);
        assert_eq!(names(&tree.search("GEN")), vec!["Genus X", "Argentum"]);
        assert!(tree.search("xyz").is_empty());
    }

    #[test]
    fn test_search_is_capped() {
        let root = TaxonNode::new("Root", None).with_children(
            (0..25).map(|i| TaxonNode::new(format!("Species {:02}", i), Some("species"))),
        );
        let tree = TaxonomyTree::from_forest(vec![root]);
        let matches = tree.search("species");

        assert_eq!(matches.len(), MAX_SUGGESTIONS);
        assert_eq!(matches[0].name, "Species 00");
        assert_eq!(matches[9].name, "Species 09");
    }

    #[test]
    fn test_cap_spans_the_whole_forest() {
        let forest = vec![
            TaxonNode::new("Tree A", None)
                .with_children((0..6).map(|i| TaxonNode::new(format!("leaf a{}", i), None))),
            TaxonNode::new("Tree B", None)
                .with_children((0..6).map(|i| TaxonNode::new(format!("leaf b{}", i), None))),
        ];
        let tree = TaxonomyTree::from_forest(forest);
        let matches = tree.search("leaf");

        assert_eq!(matches.len(), 10);
        assert_eq!(matches[6].name, "leaf b0");
    }

    #[test]
    fn test_blank_query_matches_nothing() {
        let tree = scenario_tree();
        assert!(tree.search("").is_empty());
        assert!(tree.search("   ").is_empty());
    }

    #[test]
    fn test_entries_carry_path() {
        let tree = scenario_tree();
        let matches = tree.search("genus y");

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].label(), "Genus Y (genus)");
        let path: Vec<&str> = matches[0].path.iter().filter_map(|id| tree.name(*id)).collect();
        assert_eq!(path, vec!["Root", "Kingdom A", "Genus Y"]);
    }

    #[test]
    fn test_reveal_deep_node_keeps_checks() {
        let root = TaxonNode::new("Root", None).with_children([
            TaxonNode::new("Kingdom A", Some("kingdom")).with_child(
                TaxonNode::new("Family F", Some("family")).with_child(
                    TaxonNode::new("Genus G", Some("genus"))
                        .with_child(TaxonNode::new("Species S", Some("species"))),
                ),
            ),
            TaxonNode::new("Kingdom B", Some("kingdom")),
        ]);
        let mut tree = TaxonomyTree::from_forest(vec![root]);
        let kingdom_b = tree.find("Kingdom B").unwrap();
        tree.set_checked(kingdom_b, true).unwrap();

        let before: Vec<Option<CheckState>> =
            (0..tree.len()).map(|i| tree.check_state(NodeId(i))).collect();

        let target = tree.search("species s")[0].id;
        tree.reveal(target).unwrap();

        for name in ["Kingdom A", "Family F", "Genus G"] {
            let id = tree.find(name).unwrap();
            assert!(tree.is_expanded(id), "{} should be expanded", name);
        }
        assert!(tree.is_materialized(target));
        assert!(!tree.is_expanded(target));

        // Nodes that already had UI state keep it
        for (i, state) in before.iter().enumerate() {
            if state.is_some() {
                assert_eq!(tree.check_state(NodeId(i)), *state);
            }
        }
        assert_eq!(tree.check_state(target), Some(CheckState::Unchecked));
        assert_consistent(&tree);
    }

    #[test]
    fn test_reveal_unknown_node() {
        let mut tree = scenario_tree();
        assert_eq!(tree.reveal(NodeId(42)), Err(TreeError::UnknownNode(NodeId(42))));
    }
}
