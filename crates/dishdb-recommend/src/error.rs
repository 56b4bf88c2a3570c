use thiserror::Error;

/// Reasons a recommendation request is rejected at the API/CLI boundary.
///
/// The search pipeline itself never fails; these exist so callers can report
/// a useful message instead of silently returning nothing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("budget is required (e.g. \"300 MAD\")")]
    MissingBudget,

    #[error("invalid budget amount: \"{0}\"")]
    InvalidBudget(String),

    #[error("number of plates must be at least 1")]
    InvalidPlateCount,

    #[error("max results must be at least 1")]
    InvalidMaxResults,

    #[error("unknown algorithm \"{0}\"; expected exact, optimized or greedy")]
    UnknownStrategy(String),
}
