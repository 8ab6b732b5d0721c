//! RPC error codes and error type.

use crate::types::RpcErrorBody;

// ── Error code constants ────────────────────────────────────────────

/// Invalid or missing parameters.
pub const INVALID_PARAMS: &str = "INVALID_PARAMS";
/// Unexpected internal error.
pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
/// Method not found in the registry.
pub const METHOD_NOT_FOUND: &str = "METHOD_NOT_FOUND";

/// RPC error type returned by handlers.
///
/// Note the deliberately small surface: provider failures are not RPC
/// errors (they become per-caller `error` events), and authorization
/// failures are silent drops, so handlers only ever report bad input or
/// internal faults here.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// Required parameter missing or wrong type.
    #[error("{message}")]
    InvalidParams {
        /// Description of what is wrong.
        message: String,
    },

    /// Internal server error.
    #[error("{message}")]
    Internal {
        /// Description.
        message: String,
    },
}

impl RpcError {
    /// Machine-readable error code for this variant.
    pub fn code(&self) -> &str {
        match self {
            Self::InvalidParams { .. } => INVALID_PARAMS,
            Self::Internal { .. } => INTERNAL_ERROR,
        }
    }

    /// Convert to the wire-format error body.
    ///
    /// Internal messages are sanitized — clients get a generic message
    /// while the full text stays in the server log.
    pub fn to_error_body(&self) -> RpcErrorBody {
        RpcErrorBody {
            code: self.code().to_owned(),
            message: match self {
                Self::InvalidParams { message } => message.clone(),
                Self::Internal { .. } => "Internal error".to_owned(),
            },
        }
    }
}
