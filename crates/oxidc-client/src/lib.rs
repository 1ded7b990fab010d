//! # oxidc-client - OpenID Connect relying-party layer
//!
//! Sits on top of [`oxidc_jose`] and adds everything that involves a real
//! provider: discovery metadata, the HTTP boundary, and the
//! [`rp::RelyingParty`] orchestrator that drives the authorization-code
//! exchange, ID token verification, UserInfo resolution, and request
//! objects.
//!
//! Network traffic goes through the [`http::HttpExchange`] trait; production
//! code uses [`http::ReqwestExchange`], tests substitute an in-memory
//! implementation.

pub mod error;
pub mod http;
pub mod metadata;
pub mod request;
pub mod rp;

pub use error::ClientError;
pub use http::{HttpExchange, ReqwestExchange};
pub use metadata::{ProviderMetadata, TokenService};
pub use request::AuthorizationRequest;
pub use rp::{RelyingParty, TokenResponse};

/// Relying-party result type
pub type Result<T> = std::result::Result<T, ClientError>;
