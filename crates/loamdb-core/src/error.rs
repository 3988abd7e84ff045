use crate::{
    page::PaginationError,
    query::{BuildError, ConditionError},
    text::{StatementError, SyntaxError},
};
use thiserror::Error as ThisError;

///
/// ResultError
///
/// Cardinality failures: a caller asked for at most one entity and the
/// manager produced more.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ResultError {
    #[error("non-unique result: the query returned more than one entity")]
    NonUnique,
}

///
/// CommunicationError
///
/// Aggregate error surface for the whole core. Each variant carries one of
/// the per-boundary enums, so callers can tell a malformed query string from
/// wrong API usage, a cardinality failure, or a backend fault.
///

#[derive(Clone, Debug, PartialEq, ThisError)]
pub enum CommunicationError {
    #[error("{0}")]
    Condition(#[from] ConditionError),

    #[error("{0}")]
    Build(#[from] BuildError),

    #[error("{0}")]
    Syntax(#[from] SyntaxError),

    #[error("{0}")]
    Statement(#[from] StatementError),

    #[error("{0}")]
    Result(#[from] ResultError),

    #[error("{0}")]
    Pagination(#[from] PaginationError),

    /// Vendor-specific manager failure; the storage layer owns retries.
    #[error("database manager failure: {message}")]
    Manager { message: String },
}

impl CommunicationError {
    /// Wrap a vendor failure message.
    pub fn manager(message: impl Into<String>) -> Self {
        Self::Manager {
            message: message.into(),
        }
    }
}
