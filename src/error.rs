use thiserror::Error;

/// Failures of a single verification call.
///
/// A missing match is not an error, see [`crate::Verification::NotDeliverable`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// Deployment problem, e.g. credentials not set. No request was sent.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The provider answered with a non-2xx status.
    #[error("provider returned HTTP {status}: {body}")]
    Provider { status: u16, body: String },

    /// Network failure, timeout or an unreadable response body.
    #[error("transient failure: {0}")]
    Transient(String),
}

impl VerifyError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}
