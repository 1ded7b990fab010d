//! Authorization request objects
//!
//! OpenID Connect allows the authorization request parameters to travel as a
//! signed (and optionally encrypted) JWT instead of bare query parameters.
//! [`AuthorizationRequest`] assembles the claims; the orchestrator turns them
//! into the token.

use serde_json::{json, Value};

use oxidc_jose::ClaimsMap;

/// Builder for the claims of a request object
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    response_type: String,
    redirect_uri: String,
    scope: String,
    state: Option<String>,
    nonce: Option<String>,
    extensions: ClaimsMap,
}

impl AuthorizationRequest {
    /// An authorization-code request for the given redirect URI
    pub fn code(redirect_uri: impl Into<String>) -> Self {
        Self {
            response_type: "code".to_string(),
            redirect_uri: redirect_uri.into(),
            scope: "openid".to_string(),
            state: None,
            nonce: None,
            extensions: ClaimsMap::new(),
        }
    }

    /// Override the requested scope (always keep `openid` in it)
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// CSRF state parameter
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Replay-protection nonce, echoed back in the ID token
    pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    /// Attach a named extension parameter (e.g. `claims`, `acr_values`)
    pub fn with_extension(mut self, name: impl Into<String>, value: Value) -> Self {
        self.extensions.insert(name.into(), value);
        self
    }

    /// The request-object claims
    ///
    /// `iss` (client id) and `aud` (issuer) are added by the orchestrator,
    /// which knows both.
    pub fn to_claims(&self) -> ClaimsMap {
        let mut claims = ClaimsMap::new();
        claims.insert("response_type".into(), json!(self.response_type));
        claims.insert("redirect_uri".into(), json!(self.redirect_uri));
        claims.insert("scope".into(), json!(self.scope));
        if let Some(ref state) = self.state {
            claims.insert("state".into(), json!(state));
        }
        if let Some(ref nonce) = self.nonce {
            claims.insert("nonce".into(), json!(nonce));
        }
        for (name, value) in &self.extensions {
            claims.insert(name.clone(), value.clone());
        }
        claims
    }
}
