use keyexpiry_core::{AppError, AppResult};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{OperationKind, ResourcePath};

/// Request body of a supported audit event, one shape per operation.
#[derive(Debug, Clone, PartialEq, Eq)]
enum EventRequest {
    /// `CreateDeveloperApp` request.
    CreateApp {
        /// Developer resource name, `organizations/{org}/developers/{developer}`.
        parent: String,
        /// Name of the created app.
        app_name: String,
    },
    /// `CreateDeveloperAppKey` request.
    CreateAppKey {
        /// App resource name that owns the new key.
        parent: String,
    },
    /// `UpdateDeveloperApp` request.
    UpdateApp {
        /// App resource name.
        name: String,
    },
    /// `UpdateDeveloperAppKey` request.
    UpdateAppKey {
        /// Key resource name, `.../apps/{app}/keys/{key}`.
        name: String,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct EventEnvelope {
    method_name: Option<String>,
    proto_payload: ProtoPayload,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProtoPayload {
    method_name: Option<String>,
    request: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CreateAppPayload {
    parent: String,
    developer_app: NamedResource,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ParentPayload {
    parent: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NamedResource {
    name: String,
}

impl EventEnvelope {
    fn method_name(&self) -> &str {
        self.proto_payload
            .method_name
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .or(self.method_name.as_deref())
            .unwrap_or_default()
    }
}

/// Classifies a raw audit event payload by its `methodName`.
///
/// The name is read from `protoPayload.methodName`, falling back to a
/// top-level `methodName`. Bodies that are not JSON objects are treated as
/// events without a method name.
pub fn classify(payload: &[u8]) -> AppResult<OperationKind> {
    let envelope = parse_envelope(payload);
    OperationKind::from_method_name(envelope.method_name())
}

/// Derives the developer app affected by an event already classified as `kind`.
pub fn resolve_path(kind: OperationKind, payload: &[u8]) -> AppResult<ResourcePath> {
    let envelope = parse_envelope(payload);
    EventRequest::decode(kind, envelope.proto_payload.request)?.resource_path()
}

impl EventRequest {
    fn decode(kind: OperationKind, request: Value) -> AppResult<Self> {
        match kind {
            OperationKind::CreateApp => {
                let payload: CreateAppPayload = decode_request(request)?;
                Ok(Self::CreateApp {
                    parent: payload.parent,
                    app_name: payload.developer_app.name,
                })
            }
            OperationKind::CreateAppKey => {
                let payload: ParentPayload = decode_request(request)?;
                Ok(Self::CreateAppKey {
                    parent: payload.parent,
                })
            }
            OperationKind::UpdateApp => {
                let payload: NamedResource = decode_request(request)?;
                Ok(Self::UpdateApp { name: payload.name })
            }
            OperationKind::UpdateAppKey => {
                let payload: NamedResource = decode_request(request)?;
                Ok(Self::UpdateAppKey { name: payload.name })
            }
        }
    }

    fn resource_path(&self) -> AppResult<ResourcePath> {
        match self {
            Self::CreateApp { parent, app_name } => ResourcePath::for_created_app(parent, app_name),
            Self::CreateAppKey { parent } => ResourcePath::new(parent.as_str()),
            Self::UpdateApp { name } => ResourcePath::new(name.as_str()),
            Self::UpdateAppKey { name } => ResourcePath::from_key_name(name),
        }
    }
}

fn parse_envelope(payload: &[u8]) -> EventEnvelope {
    serde_json::from_slice(payload).unwrap_or_default()
}

fn decode_request<T>(request: Value) -> AppResult<T>
where
    T: DeserializeOwned + Default,
{
    if request.is_null() {
        return Ok(T::default());
    }

    serde_json::from_value(request).map_err(|error| {
        AppError::UnresolvablePath(format!(
            "could not determine app path from event: {error}"
        ))
    })
}
