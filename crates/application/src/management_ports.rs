use async_trait::async_trait;
use keyexpiry_core::AppResult;
use keyexpiry_domain::{DeveloperApp, ProductAction, ResourcePath};

/// Key material for a key imported into an existing app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateKeyInput {
    /// Consumer key to import.
    pub consumer_key: String,
    /// Consumer secret to import.
    pub consumer_secret: String,
    /// Lifetime of the key in seconds.
    pub expires_in_seconds: i64,
    /// Key status to carry over.
    pub status: String,
}

/// Replacement product list and scopes for an existing key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceKeyInput {
    /// API product names associated with the key.
    pub api_products: Vec<String>,
    /// OAuth scopes granted to the key.
    pub scopes: Vec<String>,
}

/// Port for the developer app and key operations of the management plane.
#[async_trait]
pub trait ManagementApi: Send + Sync {
    /// Fetches one developer app with its credentials.
    async fn get_developer_app(&self, app_path: &ResourcePath) -> AppResult<DeveloperApp>;

    /// Deletes one key from an app.
    async fn delete_key(&self, app_path: &ResourcePath, consumer_key: &str) -> AppResult<()>;

    /// Creates a key with caller-supplied key material.
    async fn create_key(&self, app_path: &ResourcePath, input: CreateKeyInput) -> AppResult<()>;

    /// Replaces the API products and scopes of one key.
    async fn replace_key(
        &self,
        app_path: &ResourcePath,
        consumer_key: &str,
        input: ReplaceKeyInput,
    ) -> AppResult<()>;

    /// Approves or revokes one API product association of a key.
    async fn update_key_product(
        &self,
        app_path: &ResourcePath,
        consumer_key: &str,
        api_product: &str,
        action: ProductAction,
    ) -> AppResult<()>;
}
