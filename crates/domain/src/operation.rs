use keyexpiry_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Developer app mutation reported by a management-plane audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// A developer app was created.
    CreateApp,
    /// A key was added to an existing developer app.
    CreateAppKey,
    /// A developer app was updated.
    UpdateApp,
    /// A developer app key was updated.
    UpdateAppKey,
}

impl OperationKind {
    /// All supported operation kinds.
    pub const ALL: [Self; 4] = [
        Self::CreateApp,
        Self::CreateAppKey,
        Self::UpdateApp,
        Self::UpdateAppKey,
    ];

    /// Classifies a dot-delimited audit method name by its final segment.
    pub fn from_method_name(method_name: &str) -> AppResult<Self> {
        let suffix = method_name.trim().rsplit('.').next().unwrap_or_default();
        // A trailing dot leaves no operation name, same as a missing methodName.
        if suffix.is_empty() {
            return Err(AppError::UnrecognizedOperation(
                "could not detect operation".to_owned(),
            ));
        }

        Self::ALL
            .into_iter()
            .find(|kind| kind.method_suffix() == suffix)
            .ok_or_else(|| {
                AppError::UnrecognizedOperation(format!("method {suffix} not supported"))
            })
    }

    /// Returns the audit method name suffix for this operation.
    #[must_use]
    pub fn method_suffix(self) -> &'static str {
        match self {
            Self::CreateApp => "CreateDeveloperApp",
            Self::CreateAppKey => "CreateDeveloperAppKey",
            Self::UpdateApp => "UpdateDeveloperApp",
            Self::UpdateAppKey => "UpdateDeveloperAppKey",
        }
    }

    /// Returns stable operation type value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreateApp => "create_app",
            Self::CreateAppKey => "create_app_key",
            Self::UpdateApp => "update_app",
            Self::UpdateAppKey => "update_app_key",
        }
    }
}
