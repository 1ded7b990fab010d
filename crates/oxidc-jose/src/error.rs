//! JOSE error types
//!
//! Every security-relevant failure surfaces as a distinct variant; callers
//! decide on messaging and whether to retry the surrounding network
//! operation. None of these are retried internally.

use thiserror::Error;

/// Errors raised by the token and claims processing engine
#[derive(Debug, Clone, Error)]
pub enum JoseError {
    /// No advertised algorithm matched a locally available key or method
    #[error("no advertised algorithm matched the available keys: {advertised:?}")]
    NoMatchingAlgorithm {
        /// The IdP-advertised labels that were scanned
        advertised: Vec<String>,
    },

    /// Algorithm was agreed but the key store holds no usable key for it
    #[error("no key in the store matches use={key_use} alg={alg}")]
    NoMatchingKey { key_use: String, alg: String },

    /// Caller-supplied configuration is unusable
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    /// A required claim is absent from the payload
    #[error("missing required claim: {claim}")]
    MissingRequiredClaim { claim: String },

    /// `iss` does not equal the expected issuer
    #[error("invalid issuer: expected '{expected}', got '{found}'")]
    InvalidIssuer { expected: String, found: String },

    /// `iat` lies beyond the tolerated clock skew in the future
    #[error("token issued in the future: iat={iat}, now={now}, tolerance={tolerance_secs}s")]
    TokenIssuedInFuture {
        iat: i64,
        now: i64,
        tolerance_secs: u64,
    },

    /// `nbf` has not been reached yet
    #[error("token not yet valid: nbf={nbf}, now={now}, tolerance={tolerance_secs}s")]
    TokenNotYetValid {
        nbf: i64,
        now: i64,
        tolerance_secs: u64,
    },

    /// `exp` has passed
    #[error("token expired: exp={exp}, now={now}, tolerance={tolerance_secs}s")]
    TokenExpired {
        exp: i64,
        now: i64,
        tolerance_secs: u64,
    },

    /// `aud` does not contain the expected audience
    #[error("invalid audience: '{expected}' is not among the token audiences")]
    InvalidAudience { expected: String },

    /// Cryptographic signature check failed
    #[error("signature verification failed")]
    SignatureVerificationFailed,

    /// Key unwrap or content decryption failed
    #[error("decryption failed: {reason}")]
    DecryptionFailed { reason: String },

    /// Token does not parse as compact JWS/JWE
    #[error("malformed token: {reason}")]
    MalformedToken { reason: String },

    /// Key generation or encoding fault in the underlying crypto crates
    #[error("cryptographic failure: {reason}")]
    CryptoFailure { reason: String },
}

impl JoseError {
    /// Stable category label for logging and metrics
    pub fn category(&self) -> &'static str {
        match self {
            Self::NoMatchingAlgorithm { .. } => "no_matching_algorithm",
            Self::NoMatchingKey { .. } => "no_matching_key",
            Self::InvalidConfiguration { .. } => "invalid_configuration",
            Self::MissingRequiredClaim { .. } => "missing_required_claim",
            Self::InvalidIssuer { .. } => "invalid_issuer",
            Self::TokenIssuedInFuture { .. } => "token_issued_in_future",
            Self::TokenNotYetValid { .. } => "token_not_yet_valid",
            Self::TokenExpired { .. } => "token_expired",
            Self::InvalidAudience { .. } => "invalid_audience",
            Self::SignatureVerificationFailed => "signature_verification_failed",
            Self::DecryptionFailed { .. } => "decryption_failed",
            Self::MalformedToken { .. } => "malformed_token",
            Self::CryptoFailure { .. } => "crypto_failure",
        }
    }
}
