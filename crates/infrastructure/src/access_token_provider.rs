//! OAuth access tokens for management API calls.
//!
//! On Cloud Run and GCE the runtime service account's token is served by the
//! instance metadata server. A static token can be configured instead for
//! local runs.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use keyexpiry_core::{AppError, AppResult};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;
use url::Url;

/// Metadata server host used when `GCE_METADATA_HOST` is not set.
pub const DEFAULT_METADATA_HOST: &str = "metadata.google.internal";

const TOKEN_PATH: &str = "computeMetadata/v1/instance/service-accounts/default/token";
const REFRESH_MARGIN_SECONDS: i64 = 60;

/// Source of bearer tokens for the management API.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Returns a token valid for at least the next request.
    async fn access_token(&self) -> AppResult<String>;
}

/// Provider returning one preconfigured token.
#[derive(Clone)]
pub struct StaticAccessTokenProvider {
    token: String,
}

impl StaticAccessTokenProvider {
    /// Creates a provider for a fixed token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl AccessTokenProvider for StaticAccessTokenProvider {
    async fn access_token(&self) -> AppResult<String> {
        Ok(self.token.clone())
    }
}

#[derive(Debug, Deserialize)]
struct MetadataTokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Provider fetching the default service account token from the metadata server.
///
/// Tokens are cached until shortly before they expire.
pub struct MetadataServerTokenProvider {
    http_client: reqwest::Client,
    token_url: Url,
    cached: Mutex<Option<CachedToken>>,
}

impl MetadataServerTokenProvider {
    /// Creates a provider for the given metadata host (`host` or `host:port`).
    pub fn new(http_client: reqwest::Client, metadata_host: &str) -> AppResult<Self> {
        let token_url = Url::parse(&format!("http://{metadata_host}/{TOKEN_PATH}")).map_err(
            |error| {
                AppError::Validation(format!(
                    "invalid metadata host '{metadata_host}': {error}"
                ))
            },
        )?;

        Ok(Self {
            http_client,
            token_url,
            cached: Mutex::new(None),
        })
    }

    async fn fetch_token(&self) -> AppResult<CachedToken> {
        let response = self
            .http_client
            .get(self.token_url.clone())
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|error| {
                AppError::Upstream(format!("metadata server token request failed: {error}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "metadata server token request failed with status {status}"
            )));
        }

        let payload = response
            .json::<MetadataTokenResponse>()
            .await
            .map_err(|error| {
                AppError::Upstream(format!("invalid metadata server token response: {error}"))
            })?;

        debug!(expires_in = payload.expires_in, "fetched access token");

        Ok(CachedToken {
            value: payload.access_token,
            expires_at: Utc::now() + Duration::seconds(payload.expires_in),
        })
    }
}

#[async_trait]
impl AccessTokenProvider for MetadataServerTokenProvider {
    async fn access_token(&self) -> AppResult<String> {
        let mut cached = self.cached.lock().await;

        let refresh_before = Utc::now() + Duration::seconds(REFRESH_MARGIN_SECONDS);
        if let Some(token) = cached.as_ref().filter(|token| token.expires_at > refresh_before) {
            return Ok(token.value.clone());
        }

        let token = self.fetch_token().await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }
}
