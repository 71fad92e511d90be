/// Errors raised while formatting timestamps.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum FormatError {
    /// Input could not be interpreted as a point in time. Callers render the
    /// field as blank instead of failing the whole view.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
