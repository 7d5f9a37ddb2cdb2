//! Query filter error model.

use thiserror::Error;

/// Result type used by the filter builders.
pub type FilterResult<T> = Result<T, FilterError>;

/// Rejection of a malformed filter query.
///
/// The `Display` output of each variant is the exact message returned to
/// clients, so callers can surface it unchanged in a client-error response.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("The query parameters include `date` together with at least one of `from` or `upTo`")]
    DateConflict,

    #[error("Not a string that represents a date in the format YYYY-MM-DD")]
    InvalidDate,

    #[error("The Min value must be a numerical value")]
    InvalidMin,

    #[error("The Max value must be a numerical value")]
    InvalidMax,
}
