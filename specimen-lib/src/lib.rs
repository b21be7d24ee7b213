//! Specimen search client library
//!
//! Taxonomy tree state machine, query form state and an async HTTP client
//! for the specimen/sequence search server.

pub mod error;
pub mod model;
pub mod query;
pub mod tree;

mod client;

pub use client::*;
