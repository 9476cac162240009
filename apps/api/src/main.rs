//! Key expiration webhook composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod dto;
mod error;
mod handlers;
mod state;

use std::sync::Arc;
use std::time::Duration;

use keyexpiry_application::ManagementApi;
use keyexpiry_core::AppError;
use keyexpiry_infrastructure::{
    AccessTokenProvider, ApigeeManagementClient, MetadataServerTokenProvider,
    StaticAccessTokenProvider,
};
use tracing::info;

use crate::api_config::{ApiConfig, init_tracing};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;

    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_seconds))
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

    let token_provider: Arc<dyn AccessTokenProvider> = match config.access_token.as_deref() {
        Some(token) => Arc::new(StaticAccessTokenProvider::new(token)),
        None => Arc::new(MetadataServerTokenProvider::new(
            http_client.clone(),
            &config.metadata_host,
        )?),
    };
    let management_api: Arc<dyn ManagementApi> = Arc::new(ApigeeManagementClient::new(
        http_client,
        &config.apigee_api_base_url,
        token_provider,
    )?);

    let app_state = AppState::new(management_api, config.rotation_settings.clone());
    let app = api_router::build_router(app_state);

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(
        %address,
        apigee_api_base_url = %config.apigee_api_base_url,
        expire_in_seconds = config.rotation_settings.expire_in_seconds(),
        settle_delay_seconds = config.rotation_settings.settle_delay().as_secs(),
        static_token = config.access_token.is_some(),
        "keyexpiry-api listening"
    );

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
