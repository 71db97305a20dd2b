//! Error types for counter operations.

use thiserror::Error;

/// Result type for counter operations.
pub type Result<T> = std::result::Result<T, CounterError>;

/// Errors raised by [`Counter`](crate::Counter) and its snapshot formats.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CounterError {
    /// An adjustment outside `{1, 5, 10}` was requested.
    ///
    /// This signals a usage bug in the caller; the counter is left untouched.
    #[error("Invalid adjustment: {0} (expected 1, 5 or 10)")]
    InvalidAdjustment(i64),

    /// Progress was requested while the total target is zero.
    #[error("Progress is undefined without a total target")]
    UndefinedProgress,

    /// A transport snapshot could not be decoded.
    #[error("Invalid counter snapshot: {0}")]
    InvalidSnapshot(String),

    /// A display template is missing its placeholder.
    #[error("Template {template:?} must contain {placeholder}")]
    InvalidTemplate {
        /// Offending template.
        template: String,
        /// Placeholder the template must contain.
        placeholder: &'static str,
    },
}
