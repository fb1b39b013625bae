use thiserror::Error;

/// Classification of the failures reported by a [`Record`](crate::Record).
///
/// Operations return an [`Error`](crate::Error) carrying one of these either as
/// the error itself or as context, recover it with
/// `error.downcast_ref::<CrudError>()`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CrudError {
    #[error("The connection is not available")]
    ConnectionUnavailable,
    #[error("No row of `{table}` matches {filter}")]
    NotFound { table: String, filter: String },
    #[error("Malformed query: {0}")]
    MalformedQuery(String),
    #[error("Could not materialize a row of `{table}`")]
    Mapping { table: String },
    #[error("Could not execute the statement on `{table}`")]
    Execution { table: String },
    #[error("The record of `{table}` was deleted")]
    Deleted { table: String },
}

impl CrudError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        CrudError::MalformedQuery(reason.into())
    }

    /// The classification attached to `error`, if any.
    pub fn of(error: &crate::Error) -> Option<&CrudError> {
        error.downcast_ref::<CrudError>()
    }
}
