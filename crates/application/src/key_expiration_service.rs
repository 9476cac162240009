use keyexpiry_core::AppResult;
use keyexpiry_domain::{OperationKind, ResourcePath, classify, resolve_path};
use tracing::info;

use crate::{AppResolver, KeyRotationService, RotationReport};

/// Result of handling one audit event delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedEvent {
    /// Classified operation.
    pub kind: OperationKind,
    /// Developer app the event referred to.
    pub app_path: ResourcePath,
    /// App name reported by the management API.
    pub app_name: String,
    /// Per-credential rotation outcomes.
    pub report: RotationReport,
}

/// Entry point for audit event deliveries: classify, resolve, then rotate.
#[derive(Clone)]
pub struct KeyExpirationService {
    app_resolver: AppResolver,
    key_rotation_service: KeyRotationService,
}

impl KeyExpirationService {
    /// Creates the service from its collaborators.
    #[must_use]
    pub fn new(app_resolver: AppResolver, key_rotation_service: KeyRotationService) -> Self {
        Self {
            app_resolver,
            key_rotation_service,
        }
    }

    /// Processes one raw audit event payload.
    ///
    /// Fails only when the event cannot be classified, its app path cannot be
    /// derived, or the app lookup fails. Rotation problems are reported in the
    /// returned [`RotationReport`].
    pub async fn process_event(&self, payload: &[u8]) -> AppResult<ProcessedEvent> {
        let kind = classify(payload)?;
        info!(operation = kind.method_suffix(), "detected method");

        let app_path = resolve_path(kind, payload)?;
        info!(app_path = %app_path, "detected app path");

        let app = self.app_resolver.resolve_app(&app_path).await?;
        info!(
            app_path = %app_path,
            app_name = app.name(),
            credentials = app.credentials().len(),
            "found app"
        );

        let settle_delay = self.key_rotation_service.settings().settle_delay();
        if !settle_delay.is_zero() {
            tokio::time::sleep(settle_delay).await;
        }

        let report = self.key_rotation_service.rotate(&app_path, &app).await;
        info!(
            app_path = %app_path,
            rotated_keys = ?report.rotated_keys(),
            skipped = report.skipped_count(),
            failures = report.failure_count(),
            "updated keys"
        );

        Ok(ProcessedEvent {
            kind,
            app_path,
            app_name: app.name().to_owned(),
            report,
        })
    }
}
