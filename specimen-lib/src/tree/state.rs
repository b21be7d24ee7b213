//! Taxonomy tree state.

use std::cmp::Ordering;

use log::debug;

use crate::error::TreeError;
use crate::model::TaxonNode;

use super::search::SearchIndex;

/// Index of a node in the tree arena.
///
/// Ids are assigned in pre-order over the provider's forest, so comparing
/// two ids compares their discovery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Raw arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Tri-state checkbox value.
///
/// `Indeterminate` is display-only: propagation treats it as "not checked",
/// but it still counts as "something below is checked" when a parent is
/// recomputed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CheckState {
    #[default]
    Unchecked,
    Checked,
    Indeterminate,
}

impl CheckState {
    pub fn is_checked(self) -> bool {
        self == Self::Checked
    }

    pub(crate) fn from_bool(checked: bool) -> Self {
        if checked { Self::Checked } else { Self::Unchecked }
    }
}

/// Whether a node's children have UI state yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    #[default]
    Unmaterialized,
    Materialized,
}

/// Arena record: provider data plus UI state.
#[derive(Debug, Clone)]
pub(super) struct NodeRecord {
    pub name: String,
    pub rank: Option<String>,
    pub parent: Option<NodeId>,
    /// Provider order until materialized, sorted by name afterwards.
    pub children: Vec<NodeId>,
    pub depth: u16,
    pub lifecycle: Lifecycle,
    pub expanded: bool,
    pub check: CheckState,
}

/// Taxonomy tree with lazy materialization and tri-state selection.
///
/// The tree owns an arena of node records built once from the provider's
/// forest. Roots and their first level are materialized on construction;
/// everything deeper gets UI state the first time its parent is expanded
/// (or revealed through search).
///
/// # Example
///
/// ```
/// use specimen_lib::model::TaxonNode;
/// use specimen_lib::tree::{CheckState, TaxonomyTree};
///
/// let root = TaxonNode::new("Root", None).with_child(
///     TaxonNode::new("Kingdom A", Some("kingdom"))
///         .with_child(TaxonNode::new("Genus X", Some("genus"))),
/// );
/// let mut tree = TaxonomyTree::from_forest(vec![root]);
///
/// let kingdom = tree.find("Kingdom A").unwrap();
/// tree.set_checked(kingdom, true).unwrap();
/// tree.expand(kingdom).unwrap();
///
/// let genus = tree.find("Genus X").unwrap();
/// assert_eq!(tree.check_state(genus), Some(CheckState::Checked));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TaxonomyTree {
    pub(super) nodes: Vec<NodeRecord>,
    pub(super) roots: Vec<NodeId>,
    pub(super) index: SearchIndex,
}

impl TaxonomyTree {
    /// Builds the tree from a forest, materializing roots and their first level.
    pub fn from_forest(forest: Vec<TaxonNode>) -> Self {
        let mut tree = Self::default();

        // Pre-order, provider order: push children reversed so the first
        // child is visited first.
        let mut stack: Vec<(TaxonNode, Option<NodeId>)> =
            forest.into_iter().rev().map(|node| (node, None)).collect();

        while let Some((node, parent)) = stack.pop() {
            let id = NodeId(tree.nodes.len());
            let depth = parent.map_or(0, |p| child_depth(tree.nodes[p.0].depth));

            tree.nodes.push(NodeRecord {
                name: node.name,
                rank: node.rank,
                parent,
                children: Vec::with_capacity(node.children.len()),
                depth,
                lifecycle: Lifecycle::Unmaterialized,
                expanded: false,
                check: CheckState::Unchecked,
            });

            match parent {
                Some(p) => tree.nodes[p.0].children.push(id),
                None => tree.roots.push(id),
            }

            stack.extend(node.children.into_iter().rev().map(|child| (child, Some(id))));
        }

        tree.index = SearchIndex::build(&tree);

        for root in tree.roots.clone() {
            tree.materialize(root);
            tree.nodes[root.0].expanded = tree.has_children(root);
        }

        debug!(
            "Built taxonomy tree: {} nodes, {} roots",
            tree.nodes.len(),
            tree.roots.len()
        );
        tree
    }

    // -------------------------------------------------------------------------
    // Read methods
    // -------------------------------------------------------------------------

    /// Total number of nodes, materialized or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// First node with the given name, in discovery order.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|node| node.name == name)
            .map(NodeId)
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id.0).map(|n| n.name.as_str())
    }

    pub fn rank(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id.0).and_then(|n| n.rank.as_deref())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    /// Children in current order (sorted once materialized).
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn has_children(&self, id: NodeId) -> bool {
        !self.children(id).is_empty()
    }

    pub fn lifecycle(&self, id: NodeId) -> Option<Lifecycle> {
        self.nodes.get(id.0).map(|n| n.lifecycle)
    }

    pub fn is_expanded(&self, id: NodeId) -> bool {
        self.nodes.get(id.0).is_some_and(|n| n.expanded)
    }

    /// A node has UI state once its parent's children are materialized.
    /// Roots always do.
    pub fn is_materialized(&self, id: NodeId) -> bool {
        match self.nodes.get(id.0) {
            Some(node) => match node.parent {
                Some(parent) => self.nodes[parent.0].lifecycle == Lifecycle::Materialized,
                None => true,
            },
            None => false,
        }
    }

    /// Checkbox state, or `None` for nodes without UI state.
    pub fn check_state(&self, id: NodeId) -> Option<CheckState> {
        if self.is_materialized(id) {
            Some(self.nodes[id.0].check)
        } else {
            None
        }
    }

    /// Materialized direct children of `id`.
    pub fn materialized_children(&self, id: NodeId) -> &[NodeId] {
        match self.nodes.get(id.0) {
            Some(node) if node.lifecycle == Lifecycle::Materialized => &node.children,
            _ => &[],
        }
    }

    /// Root-to-node path, both ends included.
    pub fn path(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut current = self.nodes.get(id.0).map(|_| id);
        while let Some(node) = current {
            path.push(node);
            current = self.nodes[node.0].parent;
        }
        path.reverse();
        path
    }

    /// Distinct ranks in discovery order.
    pub fn ranks(&self) -> Vec<String> {
        let mut ranks: Vec<String> = Vec::new();
        for rank in self.nodes.iter().filter_map(|n| n.rank.as_deref()) {
            if !rank.is_empty() && !ranks.iter().any(|r| r == rank) {
                ranks.push(rank.to_string());
            }
        }
        ranks
    }

    // -------------------------------------------------------------------------
    // Expand / collapse
    // -------------------------------------------------------------------------

    /// Expands a materialized node, materializing its children on first use.
    ///
    /// Returns `false` for leaves, which have nothing to expand.
    pub fn expand(&mut self, id: NodeId) -> Result<bool, TreeError> {
        self.ensure_materialized(id)?;
        if !self.has_children(id) {
            return Ok(false);
        }
        self.materialize(id);
        self.nodes[id.0].expanded = true;
        Ok(true)
    }

    /// Collapses a node. Materialized children are kept.
    pub fn collapse(&mut self, id: NodeId) -> Result<(), TreeError> {
        self.ensure_materialized(id)?;
        self.nodes[id.0].expanded = false;
        Ok(())
    }

    /// Flips the expanded flag and returns the new value.
    pub fn toggle_expanded(&mut self, id: NodeId) -> Result<bool, TreeError> {
        if self.is_expanded(id) {
            self.collapse(id)?;
            Ok(false)
        } else {
            self.expand(id)
        }
    }

    pub(super) fn ensure_materialized(&self, id: NodeId) -> Result<(), TreeError> {
        let node = self.nodes.get(id.0).ok_or(TreeError::UnknownNode(id))?;
        if self.is_materialized(id) {
            Ok(())
        } else {
            Err(TreeError::NotMaterialized(node.name.clone()))
        }
    }

    /// Gives a node's children UI state. Runs at most once per node.
    ///
    /// Children are sorted by name first and inherit the parent's checked
    /// state, so a checked parent never shows unchecked children.
    pub(super) fn materialize(&mut self, id: NodeId) {
        if self.nodes[id.0].lifecycle == Lifecycle::Materialized {
            return;
        }

        let mut children = std::mem::take(&mut self.nodes[id.0].children);
        children.sort_by(|a, b| compare_names(&self.nodes[a.0].name, &self.nodes[b.0].name));

        let inherited = CheckState::from_bool(self.nodes[id.0].check.is_checked());
        for child in &children {
            let record = &mut self.nodes[child.0];
            record.check = inherited;
            record.expanded = false;
        }

        debug!(
            "Materialized {} children of '{}'",
            children.len(),
            self.nodes[id.0].name
        );

        let node = &mut self.nodes[id.0];
        node.children = children;
        node.lifecycle = Lifecycle::Materialized;
    }
}

/// Ascending name order: case-folded first, exact bytes as tie-break.
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Depth of a child of a node at `parent`. Pathologically deep inputs stop
/// indenting instead of overflowing.
fn child_depth(parent: u16) -> u16 {
    parent.saturating_add(1)
}
