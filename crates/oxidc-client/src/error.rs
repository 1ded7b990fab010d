//! Relying-party error types

use thiserror::Error;

/// Errors raised by the relying-party layer
///
/// Token-level failures pass through as [`ClientError::Jose`] unchanged so
/// callers keep the fine-grained variants.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The provider does not advertise a client authentication method this
    /// relying party implements
    #[error("token endpoint does not support client authentication method '{method}'")]
    UnsupportedAuthMethod { method: String },

    /// The HTTP exchange itself failed (connect, TLS, timeout)
    #[error("transport error: {reason}")]
    Transport { reason: String },

    /// The provider responded, but not with what the protocol requires
    #[error("invalid provider response: {reason}")]
    InvalidResponse { reason: String },

    /// A token or claims processing failure
    #[error(transparent)]
    Jose(#[from] oxidc_jose::JoseError),
}

impl ClientError {
    /// Stable category label for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::UnsupportedAuthMethod { .. } => "unsupported_auth_method",
            Self::Transport { .. } => "transport",
            Self::InvalidResponse { .. } => "invalid_response",
            Self::Jose(e) => e.category(),
        }
    }
}
