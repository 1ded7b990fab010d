//! Token exchange orchestration
//!
//! [`RelyingParty`] composes the JOSE engine with the HTTP boundary to run
//! the standard relying-party flows: authenticate to the token endpoint with
//! a `private_key_jwt` client assertion, exchange an authorization code,
//! resolve UserInfo, and build request objects.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::Deserialize;
use serde_json::{json, Value};

use oxidc_jose::{ClaimsMap, ClaimsValidator, JoseError, TokenCodec};

use crate::error::ClientError;
use crate::http::HttpExchange;
use crate::metadata::{ProviderMetadata, TokenService};
use crate::request::AuthorizationRequest;
use crate::Result;

/// Client authentication method this relying party implements
const PRIVATE_KEY_JWT: &str = "private_key_jwt";
/// RFC 7523 client assertion type
const JWT_BEARER_ASSERTION: &str = "urn:ietf:params:oauth:client-assertion-type:jwt-bearer";
/// Default client assertion lifetime
const ASSERTION_TTL: Duration = Duration::from_secs(300);

/// A parsed token endpoint response
///
/// Fields beyond the standard ones are kept in `extra` rather than dropped;
/// providers routinely attach `scope`, `refresh_token`, or proprietary
/// members.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// The access token for subsequent resource requests
    pub access_token: String,
    /// The ID token, when the `openid` scope was granted
    #[serde(default)]
    pub id_token: Option<String>,
    /// Token type, normally `Bearer`
    #[serde(default)]
    pub token_type: Option<String>,
    /// Access token lifetime in seconds
    #[serde(default)]
    pub expires_in: Option<u64>,
    /// Everything else the provider included
    #[serde(flatten)]
    pub extra: ClaimsMap,
}

/// The relying party: one registered client against one provider
///
/// Immutable after construction; share it behind an `Arc` across tasks. All
/// mutability lives in the key store, which handles its own rollover.
pub struct RelyingParty {
    client_id: String,
    metadata: ProviderMetadata,
    codec: TokenCodec,
    validator: ClaimsValidator,
    http: Arc<dyn HttpExchange>,
    assertion_ttl: Duration,
}

impl RelyingParty {
    /// Assemble a relying party from its registered identity, the provider's
    /// discovery metadata, the JOSE engine, and an HTTP boundary
    pub fn new(
        client_id: impl Into<String>,
        metadata: ProviderMetadata,
        codec: TokenCodec,
        http: Arc<dyn HttpExchange>,
    ) -> Self {
        let client_id = client_id.into();
        let validator = ClaimsValidator::new(metadata.issuer.clone(), client_id.clone());
        Self {
            client_id,
            metadata,
            codec,
            validator,
            http,
            assertion_ttl: ASSERTION_TTL,
        }
    }

    /// Override the client assertion lifetime
    pub fn with_assertion_ttl(mut self, ttl: Duration) -> Self {
        self.assertion_ttl = ttl;
        self
    }

    /// The provider metadata this relying party was built against
    pub fn metadata(&self) -> &ProviderMetadata {
        &self.metadata
    }

    /// The token codec, sharing this relying party's key store
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Build a signed `private_key_jwt` client assertion for the token
    /// endpoint
    ///
    /// # Errors
    /// [`ClientError::UnsupportedAuthMethod`] when the provider does not
    /// advertise `private_key_jwt`; [`ClientError::InvalidResponse`] when the
    /// metadata lacks a token endpoint.
    pub fn build_client_assertion(&self) -> Result<String> {
        if !self.metadata.supports_auth_method(PRIVATE_KEY_JWT) {
            return Err(ClientError::UnsupportedAuthMethod {
                method: PRIVATE_KEY_JWT.to_string(),
            });
        }
        let token_endpoint = self.token_endpoint()?;

        let now = now_unix()?;
        let claims = claims_map(json!({
            "iss": self.client_id,
            "sub": self.client_id,
            "aud": token_endpoint,
            "jti": uuid::Uuid::new_v4().to_string(),
            "iat": now,
            "exp": now + self.assertion_ttl.as_secs() as i64,
        }))?;

        let assertion = self
            .codec
            .sign(&claims, TokenService::TokenEndpoint.signing_algs(&self.metadata))?;
        tracing::debug!(client_id = %self.client_id, "built client assertion");
        Ok(assertion)
    }

    /// Exchange an authorization code for tokens
    ///
    /// POSTs the form-encoded grant with a fresh client assertion and
    /// returns the parsed response unmodified; ID token verification is the
    /// caller's next step via [`RelyingParty::verify_id_token`].
    pub async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<TokenResponse> {
        let assertion = self.build_client_assertion()?;
        let token_endpoint = self.token_endpoint()?.to_string();

        let fields = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("client_id", self.client_id.as_str()),
            ("client_assertion_type", JWT_BEARER_ASSERTION),
            ("client_assertion", assertion.as_str()),
        ];
        let body = self.http.post_form(&token_endpoint, &fields).await?;

        let response: TokenResponse =
            serde_json::from_str(&body).map_err(|e| ClientError::InvalidResponse {
                reason: format!("token endpoint body: {e}"),
            })?;
        tracing::info!(client_id = %self.client_id, "authorization code exchanged");
        Ok(response)
    }

    /// Verify an ID token from the token endpoint and return its claims
    ///
    /// Accepts both the plain signed form and the nested encrypted form;
    /// which one is expected follows from the provider's advertised ID token
    /// encryption algorithms.
    pub fn verify_id_token(&self, id_token: &str) -> Result<ClaimsMap> {
        // Encryption advertised in metadata is an offer, not a promise;
        // decrypt only when the token actually has the 5-segment JWE shape.
        let enc_algs = TokenService::IdToken.encryption_algs(&self.metadata);
        let signed = if !enc_algs.is_empty() && id_token.split('.').count() == 5 {
            self.codec.decrypt(id_token, enc_algs)?
        } else {
            id_token.to_string()
        };
        let claims = self.codec.verify(
            &signed,
            TokenService::IdToken.signing_algs(&self.metadata),
            &self.validator,
            &["iss", "sub", "aud"],
        )?;
        Ok(claims)
    }

    /// Fetch the UserInfo response and resolve it to validated claims
    ///
    /// Pipeline: bearer-authenticated GET, decrypt against the UserInfo
    /// encryption algorithms, verify against the UserInfo signing algorithms
    /// with `iss`, `sub`, and `aud` required.
    pub async fn fetch_userinfo(&self, access_token: &str) -> Result<ClaimsMap> {
        let endpoint =
            endpoint(self.metadata.userinfo_endpoint.as_deref(), "userinfo_endpoint")?
                .to_string();

        let body = self.http.get_bearer(&endpoint, access_token).await?;

        let signed = self
            .codec
            .decrypt(&body, TokenService::UserInfo.encryption_algs(&self.metadata))?;
        let claims = self.codec.verify(
            &signed,
            TokenService::UserInfo.signing_algs(&self.metadata),
            &self.validator,
            &["iss", "sub", "aud"],
        )?;
        tracing::debug!(client_id = %self.client_id, "userinfo resolved");
        Ok(claims)
    }

    /// Build a signed, optionally nested-encrypted request object
    ///
    /// The object is always signed with the provider's request-object
    /// signing algorithms; when the provider also advertises request-object
    /// encryption algorithms, the signed form is wrapped in a JWE with
    /// `cty: "JWT"`.
    pub fn build_request_object(&self, request: &AuthorizationRequest) -> Result<String> {
        let mut claims = request.to_claims();
        claims.insert("iss".into(), json!(self.client_id));
        claims.insert("client_id".into(), json!(self.client_id));
        claims.insert("aud".into(), json!(self.metadata.issuer));

        let signed = self
            .codec
            .sign(&claims, TokenService::RequestObject.signing_algs(&self.metadata))?;

        let enc_algs = TokenService::RequestObject.encryption_algs(&self.metadata);
        if enc_algs.is_empty() {
            return Ok(signed);
        }
        let encrypted = self.codec.encrypt(
            signed.as_bytes(),
            enc_algs,
            TokenService::RequestObject.encryption_methods(&self.metadata),
            Some("JWT"),
        )?;
        Ok(encrypted)
    }

    fn token_endpoint(&self) -> Result<&str> {
        endpoint(self.metadata.token_endpoint.as_deref(), "token_endpoint")
    }
}

/// Require a metadata endpoint to be present and a parseable URL; the raw
/// string is returned untouched so `aud` claims match the metadata exactly.
fn endpoint<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str> {
    let raw = value.ok_or_else(|| ClientError::InvalidResponse {
        reason: format!("provider metadata has no {field}"),
    })?;
    url::Url::parse(raw).map_err(|e| ClientError::InvalidResponse {
        reason: format!("{field} is not a valid URL: {e}"),
    })?;
    Ok(raw)
}

fn now_unix() -> Result<i64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .map_err(|_| {
            ClientError::Jose(JoseError::CryptoFailure {
                reason: "system clock before Unix epoch".to_string(),
            })
        })
}

fn claims_map(value: Value) -> Result<ClaimsMap> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ClientError::InvalidResponse {
            reason: "claims must be a JSON object".to_string(),
        }),
    }
}
