use thiserror::Error;

/// Errors raised while configuring the policies.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// The configured panic key is not a single physical key.
    #[error("panic key must be a single character, got {0:?}")]
    InvalidPanicKey(String),

    /// The configured decoy icon is not an absolute URL.
    #[error("decoy icon is not a valid URL: {0}")]
    InvalidDecoyIcon(String),
}
