//! # oxidc-jose - Token and claims processing engine
//!
//! The cryptographic core of the oxidc OpenID Connect relying party. It owns
//! the selection, sequencing, and validation around JOSE operations:
//!
//! - [`key`] - versioned key store with atomic rollover and public JWKS export
//! - [`alg`] - algorithm labels and negotiation against IdP capability lists
//! - [`claims`] - ordered validation of standard temporal/identity claims
//! - [`codec`] - JWS/JWE compact serialization: sign, encrypt, verify, decrypt
//! - [`error`] - typed, terminal error kinds
//!
//! ## Security model
//!
//! Inbound tokens are never trusted before the header algorithm passes an
//! explicit allow-list check; key resolution and signature verification only
//! happen afterwards. This ordering prevents algorithm-confusion attacks
//! (e.g. a token downgraded to an algorithm the relying party never agreed
//! to). Claims validation is a separate, ordered step with first-violation
//! semantics.
//!
//! Raw primitives (RSA/ECDSA signatures, AES-GCM, RSA-OAEP) are delegated to
//! `jsonwebtoken`, `rsa`, `p256`, and `aes-gcm`; this crate never implements
//! its own cryptography.
//!
//! ## Concurrency
//!
//! All operations are pure functions of their inputs plus a [`key::KeyStore`]
//! snapshot. The store supports atomic whole-set replacement (key rollover);
//! an operation that has taken a snapshot keeps using it even if a rollover
//! completes mid-flight.

pub mod alg;
pub mod claims;
pub mod codec;
pub mod error;
pub mod key;

pub use alg::{negotiate, ContentEncryption, JoseAlgorithm, JweAlgorithm, JwsAlgorithm};
pub use claims::{ClaimsMap, ClaimsValidator};
pub use codec::TokenCodec;
pub use error::JoseError;
pub use key::{JsonWebKey, KeySelector, KeySetSnapshot, KeyStore, KeyUse, PublicJwkSet};

/// JOSE result type
pub type Result<T> = std::result::Result<T, JoseError>;

/// Default clock skew tolerance for temporal claims (seconds)
pub const DEFAULT_CLOCK_TOLERANCE_SECONDS: u64 = 60;

/// JWT `typ` header value for signed tokens
pub const JWT_TYPE: &str = "JWT";
