use std::sync::Arc;

use keyexpiry_application::{
    AppResolver, KeyExpirationService, KeyRotationService, ManagementApi, RotationSettings,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub key_expiration_service: KeyExpirationService,
}

impl AppState {
    pub fn new(management_api: Arc<dyn ManagementApi>, rotation_settings: RotationSettings) -> Self {
        let app_resolver = AppResolver::new(management_api.clone());
        let key_rotation_service = KeyRotationService::new(management_api, rotation_settings);

        Self {
            key_expiration_service: KeyExpirationService::new(app_resolver, key_rotation_service),
        }
    }
}
