//! Provider discovery metadata
//!
//! The subset of the OpenID Connect discovery document this relying party
//! consumes, plus [`TokenService`], the typed index into its per-service
//! algorithm capability lists.

use serde::{Deserialize, Serialize};

/// OpenID Provider metadata, as served from
/// `/.well-known/openid-configuration`
///
/// Unknown fields are ignored on deserialization; absent capability lists
/// read as empty, which downstream negotiation reports as
/// "no matching algorithm" rather than a parse failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderMetadata {
    /// Issuer identifier; must match the `iss` claim of issued tokens
    pub issuer: String,
    /// Authorization endpoint URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_endpoint: Option<String>,
    /// Token endpoint URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_endpoint: Option<String>,
    /// UserInfo endpoint URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub userinfo_endpoint: Option<String>,
    /// Provider JWK Set URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwks_uri: Option<String>,

    /// Client authentication methods accepted at the token endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_endpoint_auth_methods_supported: Option<Vec<String>>,
    /// Signing algorithms accepted for `private_key_jwt` client assertions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_endpoint_auth_signing_alg_values_supported: Option<Vec<String>>,

    /// ID token signing algorithms, in provider preference order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token_signing_alg_values_supported: Option<Vec<String>>,
    /// ID token key-management (encryption) algorithms
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token_encryption_alg_values_supported: Option<Vec<String>>,
    /// ID token content-encryption methods
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token_encryption_enc_values_supported: Option<Vec<String>>,

    /// Signed UserInfo response algorithms
    #[serde(skip_serializing_if = "Option::is_none")]
    pub userinfo_signing_alg_values_supported: Option<Vec<String>>,
    /// Encrypted UserInfo key-management algorithms
    #[serde(skip_serializing_if = "Option::is_none")]
    pub userinfo_encryption_alg_values_supported: Option<Vec<String>>,
    /// Encrypted UserInfo content-encryption methods
    #[serde(skip_serializing_if = "Option::is_none")]
    pub userinfo_encryption_enc_values_supported: Option<Vec<String>>,

    /// Request object signing algorithms
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_object_signing_alg_values_supported: Option<Vec<String>>,
    /// Request object key-management algorithms
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_object_encryption_alg_values_supported: Option<Vec<String>>,
    /// Request object content-encryption methods
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_object_encryption_enc_values_supported: Option<Vec<String>>,
}

impl ProviderMetadata {
    /// Whether the token endpoint accepts the given client authentication
    /// method
    pub fn supports_auth_method(&self, method: &str) -> bool {
        self.token_endpoint_auth_methods_supported
            .as_deref()
            .unwrap_or_default()
            .iter()
            .any(|m| m == method)
    }
}

/// The token-bearing services of a provider
///
/// Each service carries its own trio of capability lists in the discovery
/// document; this enum replaces ad-hoc string service codes so an unmapped
/// service is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenService {
    /// ID tokens from the token endpoint
    IdToken,
    /// Signed/encrypted UserInfo responses
    UserInfo,
    /// Request objects sent to the authorization endpoint
    RequestObject,
    /// Client assertions presented to the token endpoint
    TokenEndpoint,
}

impl TokenService {
    /// Signing algorithms the provider advertises for this service, in
    /// preference order; empty when the provider is silent
    pub fn signing_algs<'a>(self, meta: &'a ProviderMetadata) -> &'a [String] {
        let list = match self {
            Self::IdToken => &meta.id_token_signing_alg_values_supported,
            Self::UserInfo => &meta.userinfo_signing_alg_values_supported,
            Self::RequestObject => &meta.request_object_signing_alg_values_supported,
            Self::TokenEndpoint => &meta.token_endpoint_auth_signing_alg_values_supported,
        };
        list.as_deref().unwrap_or_default()
    }

    /// Key-management (encryption) algorithms for this service
    pub fn encryption_algs<'a>(self, meta: &'a ProviderMetadata) -> &'a [String] {
        let list = match self {
            Self::IdToken => &meta.id_token_encryption_alg_values_supported,
            Self::UserInfo => &meta.userinfo_encryption_alg_values_supported,
            Self::RequestObject => &meta.request_object_encryption_alg_values_supported,
            // Client assertions are signed, never encrypted.
            Self::TokenEndpoint => &None,
        };
        list.as_deref().unwrap_or_default()
    }

    /// Content-encryption methods for this service
    pub fn encryption_methods<'a>(self, meta: &'a ProviderMetadata) -> &'a [String] {
        let list = match self {
            Self::IdToken => &meta.id_token_encryption_enc_values_supported,
            Self::UserInfo => &meta.userinfo_encryption_enc_values_supported,
            Self::RequestObject => &meta.request_object_encryption_enc_values_supported,
            Self::TokenEndpoint => &None,
        };
        list.as_deref().unwrap_or_default()
    }
}
