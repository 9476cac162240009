use keyexpiry_application::{CreateKeyInput, ReplaceKeyInput};
use keyexpiry_domain::{ApiProductRef, Credential, DeveloperApp};
use serde::{Deserialize, Deserializer, Serialize};

/// Apigee encodes int64 fields as JSON strings; numbers are accepted too.
#[derive(Deserialize)]
#[serde(untagged)]
enum Int64Value {
    Number(i64),
    Text(String),
}

fn deserialize_int64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Int64Value>::deserialize(deserializer)? {
        None => Ok(0),
        Some(Int64Value::Number(value)) => Ok(value),
        Some(Int64Value::Text(value)) if value.trim().is_empty() => Ok(0),
        Some(Int64Value::Text(value)) => value
            .trim()
            .parse::<i64>()
            .map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DeveloperAppDto {
    #[serde(default)]
    name: String,
    #[serde(default)]
    credentials: Vec<CredentialDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CredentialDto {
    #[serde(default)]
    consumer_key: String,
    #[serde(default)]
    consumer_secret: String,
    #[serde(default)]
    status: String,
    #[serde(default, deserialize_with = "deserialize_int64")]
    expires_at: i64,
    #[serde(default)]
    scopes: Vec<String>,
    #[serde(default)]
    api_products: Vec<ApiProductDto>,
}

#[derive(Debug, Deserialize)]
struct ApiProductDto {
    #[serde(default)]
    apiproduct: String,
    #[serde(default)]
    status: String,
}

impl From<DeveloperAppDto> for DeveloperApp {
    fn from(value: DeveloperAppDto) -> Self {
        let credentials = value
            .credentials
            .into_iter()
            .map(|credential| {
                Credential::new(
                    credential.consumer_key,
                    credential.consumer_secret,
                    credential.status,
                )
                .with_expires_at(credential.expires_at)
                .with_scopes(credential.scopes)
                .with_api_products(
                    credential
                        .api_products
                        .into_iter()
                        .map(|product| ApiProductRef::new(product.apiproduct, product.status))
                        .collect(),
                )
            })
            .collect();

        DeveloperApp::new(value.name, credentials)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreateKeyRequest {
    consumer_key: String,
    consumer_secret: String,
    expires_in_seconds: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    status: String,
}

impl From<CreateKeyInput> for CreateKeyRequest {
    fn from(value: CreateKeyInput) -> Self {
        Self {
            consumer_key: value.consumer_key,
            consumer_secret: value.consumer_secret,
            expires_in_seconds: value.expires_in_seconds.to_string(),
            status: value.status,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ReplaceKeyRequest {
    api_products: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    scopes: Vec<String>,
}

impl From<ReplaceKeyInput> for ReplaceKeyRequest {
    fn from(value: ReplaceKeyInput) -> Self {
        Self {
            api_products: value.api_products,
            scopes: value.scopes,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Extracts the message of a Google API error body, falling back to the raw body.
pub(super) fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error.message)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| body.trim().to_owned())
}
