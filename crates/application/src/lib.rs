//! Application services and ports.

#![forbid(unsafe_code)]

mod app_resolver;
mod key_expiration_service;
mod key_rotation_service;
mod management_ports;

#[cfg(test)]
mod test_support;

pub use app_resolver::AppResolver;
pub use key_expiration_service::{KeyExpirationService, ProcessedEvent};
pub use key_rotation_service::{
    CredentialOutcome, CredentialRotationStatus, DEFAULT_EXPIRE_IN_SECONDS,
    DEFAULT_SETTLE_DELAY_SECONDS, KeyRotationService, RotationFailure, RotationReport,
    RotationSettings,
};
pub use management_ports::{CreateKeyInput, ManagementApi, ReplaceKeyInput};
