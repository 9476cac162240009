use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use keyexpiry_application::{DEFAULT_SETTLE_DELAY_SECONDS, RotationSettings};
use keyexpiry_core::AppError;
use keyexpiry_infrastructure::{DEFAULT_APIGEE_API_BASE_URL, DEFAULT_METADATA_HOST};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub api_host: String,
    pub api_port: u16,
    pub rotation_settings: RotationSettings,
    pub apigee_api_base_url: String,
    pub access_token: Option<String>,
    pub metadata_host: String,
    pub http_timeout_seconds: u64,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let api_host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_owned());
        let api_port = match optional_non_empty_env("PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|error| AppError::Validation(format!("invalid PORT: {error}")))?,
            None => 8080,
        };

        let settle_delay_seconds = match optional_non_empty_env("ROTATION_SETTLE_DELAY_SECONDS") {
            Some(value) => value.parse::<u64>().map_err(|error| {
                AppError::Validation(format!("invalid ROTATION_SETTLE_DELAY_SECONDS: {error}"))
            })?,
            None => DEFAULT_SETTLE_DELAY_SECONDS,
        };
        let rotation_settings = RotationSettings::from_raw_expire_in_seconds(
            env::var("EXPIRE_IN_SECONDS").ok().as_deref(),
            Duration::from_secs(settle_delay_seconds),
        );

        let apigee_api_base_url = optional_non_empty_env("APIGEE_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_APIGEE_API_BASE_URL.to_owned());
        let access_token = optional_non_empty_env("APIGEE_ACCESS_TOKEN");
        let metadata_host = optional_non_empty_env("GCE_METADATA_HOST")
            .unwrap_or_else(|| DEFAULT_METADATA_HOST.to_owned());

        let http_timeout_seconds = optional_non_empty_env("HTTP_TIMEOUT_SECONDS")
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(30);

        Ok(Self {
            api_host,
            api_port,
            rotation_settings,
            apigee_api_base_url,
            access_token,
            metadata_host,
            http_timeout_seconds,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn optional_non_empty_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}
