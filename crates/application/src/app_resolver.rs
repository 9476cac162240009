use std::sync::Arc;

use keyexpiry_core::{AppError, AppResult};
use keyexpiry_domain::{DeveloperApp, ResourcePath};

use crate::ManagementApi;

/// Resolves developer apps named by audit events.
#[derive(Clone)]
pub struct AppResolver {
    management_api: Arc<dyn ManagementApi>,
}

impl AppResolver {
    /// Creates a resolver backed by the management API.
    #[must_use]
    pub fn new(management_api: Arc<dyn ManagementApi>) -> Self {
        Self { management_api }
    }

    /// Fetches the current snapshot of one developer app.
    ///
    /// Lookups are not retried; any failure is reported as `AppNotFound`.
    pub async fn resolve_app(&self, app_path: &ResourcePath) -> AppResult<DeveloperApp> {
        self.management_api
            .get_developer_app(app_path)
            .await
            .map_err(|error| match error {
                AppError::Upstream(message) | AppError::AppNotFound(message) => {
                    AppError::AppNotFound(message)
                }
                other => AppError::AppNotFound(other.to_string()),
            })
    }
}
