use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use keyexpiry_application::{CreateKeyInput, ManagementApi, ReplaceKeyInput};
use keyexpiry_core::{AppError, AppResult};
use keyexpiry_domain::{ApiProductRef, Credential, DeveloperApp, ProductAction, ResourcePath};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct StoredKey {
    consumer_key: String,
    consumer_secret: String,
    status: String,
    expires_at: i64,
    scopes: Vec<String>,
    api_products: Vec<(String, String)>,
}

impl StoredKey {
    fn from_credential(credential: &Credential) -> Self {
        Self {
            consumer_key: credential.consumer_key().to_owned(),
            consumer_secret: credential.consumer_secret().to_owned(),
            status: credential.status().to_owned(),
            expires_at: credential.expires_at(),
            scopes: credential.scopes().to_vec(),
            api_products: credential
                .api_products()
                .iter()
                .map(|product| (product.name().to_owned(), product.status().to_owned()))
                .collect(),
        }
    }

    fn to_credential(&self) -> Credential {
        Credential::new(
            self.consumer_key.as_str(),
            self.consumer_secret.as_str(),
            self.status.as_str(),
        )
        .with_expires_at(self.expires_at)
        .with_scopes(self.scopes.clone())
        .with_api_products(
            self.api_products
                .iter()
                .map(|(name, status)| ApiProductRef::new(name.as_str(), status.as_str()))
                .collect(),
        )
    }
}

#[derive(Debug, Clone)]
struct StoredApp {
    name: String,
    keys: Vec<StoredKey>,
}

/// In-memory management API with the key semantics of Apigee.
///
/// Importing a key upserts it without API products, replacing a key attaches
/// products as `pending`, and product actions flip one association.
#[derive(Debug, Default)]
pub struct InMemoryManagementApi {
    apps: RwLock<HashMap<String, StoredApp>>,
    failing_creates: RwLock<HashSet<String>>,
}

impl InMemoryManagementApi {
    /// Creates an empty management API.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores or overwrites one developer app.
    pub async fn put_app(&self, app_path: &ResourcePath, app: &DeveloperApp) {
        let stored = StoredApp {
            name: app.name().to_owned(),
            keys: app
                .credentials()
                .iter()
                .map(StoredKey::from_credential)
                .collect(),
        };
        self.apps
            .write()
            .await
            .insert(app_path.as_str().to_owned(), stored);
    }

    /// Makes every import of the given consumer key fail.
    pub async fn fail_creates_for(&self, consumer_key: &str) {
        self.failing_creates
            .write()
            .await
            .insert(consumer_key.to_owned());
    }

    fn not_found(resource: &str) -> AppError {
        AppError::Upstream(format!("404 Not Found: {resource} not found"))
    }
}

#[async_trait]
impl ManagementApi for InMemoryManagementApi {
    async fn get_developer_app(&self, app_path: &ResourcePath) -> AppResult<DeveloperApp> {
        let apps = self.apps.read().await;
        let app = apps
            .get(app_path.as_str())
            .ok_or_else(|| Self::not_found(app_path.as_str()))?;

        Ok(DeveloperApp::new(
            app.name.as_str(),
            app.keys.iter().map(StoredKey::to_credential).collect(),
        ))
    }

    async fn delete_key(&self, app_path: &ResourcePath, consumer_key: &str) -> AppResult<()> {
        let mut apps = self.apps.write().await;
        let app = apps
            .get_mut(app_path.as_str())
            .ok_or_else(|| Self::not_found(app_path.as_str()))?;

        let before = app.keys.len();
        app.keys.retain(|key| key.consumer_key != consumer_key);
        if app.keys.len() == before {
            return Err(Self::not_found(&app_path.key_path(consumer_key)));
        }

        Ok(())
    }

    async fn create_key(&self, app_path: &ResourcePath, input: CreateKeyInput) -> AppResult<()> {
        if self
            .failing_creates
            .read()
            .await
            .contains(&input.consumer_key)
        {
            return Err(AppError::Upstream(format!(
                "409 Conflict: key {} rejected",
                keyexpiry_domain::mask_consumer_key(&input.consumer_key)
            )));
        }

        let mut apps = self.apps.write().await;
        let app = apps
            .get_mut(app_path.as_str())
            .ok_or_else(|| Self::not_found(app_path.as_str()))?;

        let expires_at = if input.expires_in_seconds > 0 {
            Utc::now().timestamp_millis() + input.expires_in_seconds.saturating_mul(1_000)
        } else {
            -1
        };
        let stored = StoredKey {
            consumer_key: input.consumer_key,
            consumer_secret: input.consumer_secret,
            status: input.status,
            expires_at,
            scopes: Vec::new(),
            api_products: Vec::new(),
        };

        match app
            .keys
            .iter_mut()
            .find(|key| key.consumer_key == stored.consumer_key)
        {
            Some(existing) => *existing = stored,
            None => app.keys.push(stored),
        }

        Ok(())
    }

    async fn replace_key(
        &self,
        app_path: &ResourcePath,
        consumer_key: &str,
        input: ReplaceKeyInput,
    ) -> AppResult<()> {
        let mut apps = self.apps.write().await;
        let key = apps
            .get_mut(app_path.as_str())
            .and_then(|app| {
                app.keys
                    .iter_mut()
                    .find(|key| key.consumer_key == consumer_key)
            })
            .ok_or_else(|| Self::not_found(&app_path.key_path(consumer_key)))?;

        key.api_products = input
            .api_products
            .into_iter()
            .map(|name| (name, "pending".to_owned()))
            .collect();
        key.scopes = input.scopes;
        Ok(())
    }

    async fn update_key_product(
        &self,
        app_path: &ResourcePath,
        consumer_key: &str,
        api_product: &str,
        action: ProductAction,
    ) -> AppResult<()> {
        let mut apps = self.apps.write().await;
        let association = apps
            .get_mut(app_path.as_str())
            .and_then(|app| {
                app.keys
                    .iter_mut()
                    .find(|key| key.consumer_key == consumer_key)
            })
            .and_then(|key| {
                key.api_products
                    .iter_mut()
                    .find(|(name, _)| name == api_product)
            })
            .ok_or_else(|| {
                Self::not_found(&app_path.key_product_path(consumer_key, api_product))
            })?;

        association.1 = match action {
            ProductAction::Approve => "approved".to_owned(),
            ProductAction::Revoke => "revoked".to_owned(),
        };
        Ok(())
    }
}
