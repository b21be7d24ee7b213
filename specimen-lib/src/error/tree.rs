//! Taxonomy tree error types

use crate::tree::NodeId;

/// Errors returned by [`TaxonomyTree`](crate::tree::TaxonomyTree) operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// The id does not belong to this tree.
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    /// The node has not been materialized yet, so it has no UI state.
    #[error("node '{0}' is not materialized")]
    NotMaterialized(String),
}
