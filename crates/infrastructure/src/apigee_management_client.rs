use std::sync::Arc;

use async_trait::async_trait;
use keyexpiry_application::{CreateKeyInput, ManagementApi, ReplaceKeyInput};
use keyexpiry_core::{AppError, AppResult};
use keyexpiry_domain::{DeveloperApp, ProductAction, ResourcePath, mask_consumer_key};
use reqwest::Method;
use tracing::debug;
use url::Url;

use crate::AccessTokenProvider;

mod dto;

use dto::{CreateKeyRequest, DeveloperAppDto, ReplaceKeyRequest, error_message};

/// Public Apigee management API endpoint.
pub const DEFAULT_APIGEE_API_BASE_URL: &str = "https://apigee.googleapis.com/v1/";

/// Apigee v1 REST implementation of the management port.
pub struct ApigeeManagementClient {
    http_client: reqwest::Client,
    base_url: Url,
    token_provider: Arc<dyn AccessTokenProvider>,
}

impl ApigeeManagementClient {
    /// Creates a client rooted at `base_url` (for example
    /// [`DEFAULT_APIGEE_API_BASE_URL`]).
    pub fn new(
        http_client: reqwest::Client,
        base_url: &str,
        token_provider: Arc<dyn AccessTokenProvider>,
    ) -> AppResult<Self> {
        let mut base_url = Url::parse(base_url).map_err(|error| {
            AppError::Validation(format!("invalid Apigee API base URL '{base_url}': {error}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Validation(format!(
                "Apigee API base URL '{base_url}' cannot be used as a base"
            )));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            http_client,
            base_url,
            token_provider,
        })
    }

    fn resource_url(&self, resource_name: &str) -> AppResult<Url> {
        self.base_url
            .join(resource_name.trim_start_matches('/'))
            .map_err(|error| {
                AppError::Validation(format!(
                    "invalid management resource name '{resource_name}': {error}"
                ))
            })
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
        operation: &str,
    ) -> AppResult<reqwest::Response> {
        let token = self.token_provider.access_token().await?;
        let mut request = self
            .http_client
            .request(method.clone(), url.clone())
            .bearer_auth(token);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|error| {
            AppError::Upstream(format!("{operation} transport error: {error}"))
        })?;

        let status = response.status();
        debug!(%method, path = url.path(), %status, operation, "management API call");

        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<response body unavailable>".to_owned());
        Err(AppError::Upstream(format!(
            "{operation} failed with status {status}: {}",
            error_message(&body)
        )))
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> AppResult<serde_json::Value> {
    serde_json::to_value(value)
        .map_err(|error| AppError::Internal(format!("failed to encode request body: {error}")))
}

#[async_trait]
impl ManagementApi for ApigeeManagementClient {
    async fn get_developer_app(&self, app_path: &ResourcePath) -> AppResult<DeveloperApp> {
        let url = self.resource_url(app_path.as_str())?;
        let response = self.send(Method::GET, url, None, "get developer app").await?;

        let app = response.json::<DeveloperAppDto>().await.map_err(|error| {
            AppError::Upstream(format!("invalid developer app response: {error}"))
        })?;

        Ok(app.into())
    }

    async fn delete_key(&self, app_path: &ResourcePath, consumer_key: &str) -> AppResult<()> {
        let url = self.resource_url(&app_path.key_path(consumer_key))?;
        self.send(Method::DELETE, url, None, "delete key")
            .await
            .map(|_| ())
    }

    async fn create_key(&self, app_path: &ResourcePath, input: CreateKeyInput) -> AppResult<()> {
        let url = self.resource_url(&format!("{}/keys", app_path.as_str()))?;
        debug!(
            key_prefix = %mask_consumer_key(&input.consumer_key),
            expires_in_seconds = input.expires_in_seconds,
            "importing key"
        );
        let body = to_json(&CreateKeyRequest::from(input))?;

        self.send(Method::POST, url, Some(body), "create key")
            .await
            .map(|_| ())
    }

    async fn replace_key(
        &self,
        app_path: &ResourcePath,
        consumer_key: &str,
        input: ReplaceKeyInput,
    ) -> AppResult<()> {
        let url = self.resource_url(&app_path.key_path(consumer_key))?;
        let body = to_json(&ReplaceKeyRequest::from(input))?;

        self.send(Method::PUT, url, Some(body), "replace key")
            .await
            .map(|_| ())
    }

    async fn update_key_product(
        &self,
        app_path: &ResourcePath,
        consumer_key: &str,
        api_product: &str,
        action: ProductAction,
    ) -> AppResult<()> {
        let mut url = self.resource_url(&app_path.key_product_path(consumer_key, api_product))?;
        url.query_pairs_mut().append_pair("action", action.as_str());

        self.send(Method::POST, url, None, "update key API product")
            .await
            .map(|_| ())
    }
}
