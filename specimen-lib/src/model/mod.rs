//! Wire types exchanged with the search server.

mod response;
mod taxon;

pub use response::*;
pub use taxon::*;
