//! Taxonomy tree picker model.
//!
//! A rendering-independent arena of node records. Front ends draw
//! [`TaxonomyTree::visible_rows`] and feed user actions back through
//! [`TaxonomyTree::expand`], [`TaxonomyTree::set_checked`] and
//! [`TaxonomyTree::reveal`]; [`TaxonomyTree::selection`] is what gets sent
//! to the server.

mod propagate;
mod search;
mod selection;
mod state;
mod view;

pub use search::{IndexEntry, MAX_SUGGESTIONS, SearchIndex};
pub use selection::SYNTHETIC_ROOT;
pub use state::{CheckState, Lifecycle, NodeId, TaxonomyTree};
pub use view::FlatRow;
