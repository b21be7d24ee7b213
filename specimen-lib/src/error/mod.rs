//! Error types

mod api;
mod tree;

pub use api::*;
pub use tree::*;

/// Top-level error for the library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP/API failure.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Invalid operation on the taxonomy tree.
    #[error(transparent)]
    Tree(#[from] TreeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_errors_keep_message() {
        let err = Error::from(TreeError::NotMaterialized("Genus X".to_string()));
        assert_eq!(err.to_string(), "node 'Genus X' is not materialized");

        let err = Error::from(ApiError::http(502, "Bad Gateway"));
        assert!(matches!(err, Error::Api(ApiError::Http { status: 502, .. })));
    }
}
