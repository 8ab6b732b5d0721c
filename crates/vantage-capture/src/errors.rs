//! Provider-boundary error type.

/// Error returned by a [`crate::DesktopProvider`] call.
///
/// Provider errors are operation-scoped: they are reported to the calling
/// connection and never tear the connection down.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The capability is not available in this deployment.
    #[error("desktop capability not available: {message}")]
    Unsupported {
        /// What was attempted.
        message: String,
    },

    /// The provider attempted the operation and failed.
    #[error("{message}")]
    Failed {
        /// Provider-supplied description.
        message: String,
    },

    /// The provider did not answer within the configured deadline.
    #[error("provider call timed out after {elapsed_ms}ms")]
    Timeout {
        /// How long the call was allowed to run.
        elapsed_ms: u64,
    },
}

impl ProviderError {
    /// Shorthand for a generic failure.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    /// Shorthand for an unsupported-capability error.
    #[must_use]
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported {
            message: message.into(),
        }
    }
}
