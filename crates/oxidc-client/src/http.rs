//! HTTP boundary of the relying party
//!
//! All provider traffic goes through the [`HttpExchange`] trait so the
//! orchestrator is testable without a network. [`ReqwestExchange`] is the
//! production implementation.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::ClientError;
use crate::Result;

/// Default per-request timeout
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// The two request shapes this relying party sends to a provider
#[async_trait]
pub trait HttpExchange: Send + Sync {
    /// POST a `application/x-www-form-urlencoded` body and return the
    /// response body on a 2xx status
    async fn post_form(&self, url: &str, fields: &[(&str, &str)]) -> Result<String>;

    /// GET with a bearer token and return the response body on a 2xx status
    async fn get_bearer(&self, url: &str, access_token: &str) -> Result<String>;
}

/// Production HTTP stack: rustls, no redirect following, 30s timeout
///
/// Redirects are disabled on purpose: a token or userinfo endpoint that
/// redirects is misconfigured at best and hostile at worst, and credentials
/// must never be replayed to a redirect target.
#[derive(Debug, Clone)]
pub struct ReqwestExchange {
    client: reqwest::Client,
}

impl ReqwestExchange {
    /// Build the production client
    ///
    /// # Errors
    /// [`ClientError::Transport`] when the TLS backend fails to initialize.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| ClientError::Transport {
                reason: format!("HTTP client initialization failed: {e}"),
            })?;
        Ok(Self { client })
    }

    async fn read_body(url: &str, response: reqwest::Response) -> Result<String> {
        let status = response.status();
        let body = response.text().await.map_err(|e| ClientError::Transport {
            reason: format!("reading response from {url}: {e}"),
        })?;
        if !status.is_success() {
            tracing::warn!(%url, %status, "provider returned an error status");
            return Err(ClientError::InvalidResponse {
                reason: format!("{url} returned {status}"),
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl HttpExchange for ReqwestExchange {
    async fn post_form(&self, url: &str, fields: &[(&str, &str)]) -> Result<String> {
        let response = self
            .client
            .post(url)
            .form(fields)
            .send()
            .await
            .map_err(|e| ClientError::Transport {
                reason: format!("POST {url}: {e}"),
            })?;
        Self::read_body(url, response).await
    }

    async fn get_bearer(&self, url: &str, access_token: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| ClientError::Transport {
                reason: format!("GET {url}: {e}"),
            })?;
        Self::read_body(url, response).await
    }
}
