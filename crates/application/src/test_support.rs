use std::collections::HashSet;

use async_trait::async_trait;
use keyexpiry_core::{AppError, AppResult};
use keyexpiry_domain::{DeveloperApp, ProductAction, ResourcePath};
use tokio::sync::Mutex;

use crate::{CreateKeyInput, ManagementApi, ReplaceKeyInput};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ManagementCall {
    GetApp(String),
    DeleteKey(String),
    CreateKey(String, CreateKeyInput),
    ReplaceKey(String, ReplaceKeyInput),
    UpdateKeyProduct(String, ProductAction),
}

#[derive(Default)]
pub(crate) struct FakeManagementApi {
    app: Option<DeveloperApp>,
    failing_deletes: HashSet<String>,
    failing_creates: HashSet<String>,
    failing_replaces: HashSet<String>,
    failing_products: HashSet<(String, String)>,
    calls: Mutex<Vec<ManagementCall>>,
}

impl FakeManagementApi {
    pub(crate) fn with_app(app: DeveloperApp) -> Self {
        Self {
            app: Some(app),
            ..Self::default()
        }
    }

    pub(crate) fn fail_delete(mut self, consumer_key: &str) -> Self {
        self.failing_deletes.insert(consumer_key.to_owned());
        self
    }

    pub(crate) fn fail_create(mut self, consumer_key: &str) -> Self {
        self.failing_creates.insert(consumer_key.to_owned());
        self
    }

    pub(crate) fn fail_replace(mut self, consumer_key: &str) -> Self {
        self.failing_replaces.insert(consumer_key.to_owned());
        self
    }

    pub(crate) fn fail_product(mut self, consumer_key: &str, api_product: &str) -> Self {
        self.failing_products
            .insert((consumer_key.to_owned(), api_product.to_owned()));
        self
    }

    pub(crate) async fn calls(&self) -> Vec<ManagementCall> {
        self.calls.lock().await.clone()
    }

    async fn record(&self, call: ManagementCall) {
        self.calls.lock().await.push(call);
    }
}

fn upstream(message: &str) -> AppError {
    AppError::Upstream(message.to_owned())
}

#[async_trait]
impl ManagementApi for FakeManagementApi {
    async fn get_developer_app(&self, app_path: &ResourcePath) -> AppResult<DeveloperApp> {
        self.record(ManagementCall::GetApp(app_path.as_str().to_owned()))
            .await;
        self.app
            .clone()
            .ok_or_else(|| upstream("404 DeveloperApp not found"))
    }

    async fn delete_key(&self, app_path: &ResourcePath, consumer_key: &str) -> AppResult<()> {
        self.record(ManagementCall::DeleteKey(app_path.key_path(consumer_key)))
            .await;
        if self.failing_deletes.contains(consumer_key) {
            return Err(upstream("404 key not found"));
        }
        Ok(())
    }

    async fn create_key(&self, app_path: &ResourcePath, input: CreateKeyInput) -> AppResult<()> {
        let failing = self.failing_creates.contains(&input.consumer_key);
        self.record(ManagementCall::CreateKey(app_path.as_str().to_owned(), input))
            .await;
        if failing {
            return Err(upstream("409 key already exists"));
        }
        Ok(())
    }

    async fn replace_key(
        &self,
        app_path: &ResourcePath,
        consumer_key: &str,
        input: ReplaceKeyInput,
    ) -> AppResult<()> {
        self.record(ManagementCall::ReplaceKey(
            app_path.key_path(consumer_key),
            input,
        ))
        .await;
        if self.failing_replaces.contains(consumer_key) {
            return Err(upstream("500 backend error"));
        }
        Ok(())
    }

    async fn update_key_product(
        &self,
        app_path: &ResourcePath,
        consumer_key: &str,
        api_product: &str,
        action: ProductAction,
    ) -> AppResult<()> {
        self.record(ManagementCall::UpdateKeyProduct(
            app_path.key_product_path(consumer_key, api_product),
            action,
        ))
        .await;
        if self
            .failing_products
            .contains(&(consumer_key.to_owned(), api_product.to_owned()))
        {
            return Err(upstream("400 invalid action"));
        }
        Ok(())
    }
}
