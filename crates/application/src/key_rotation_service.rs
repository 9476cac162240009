//! Expiration enforcement for developer app keys.
//!
//! The management API fixes a key's expiration when the key is created, so a
//! non-expiring key is replaced by deleting it and importing the same consumer
//! key and secret with a lifetime. Importing drops the key's API product
//! associations, which are then restored with a replace call followed by one
//! status transition per approved or revoked product.
//!
//! None of these calls are transactional. Every failure after the app lookup
//! is recorded in the [`RotationReport`] and never stops work on sibling
//! credentials or products. A credential counts as rotated only once its
//! products are reattached; failed status transitions do not change that.

use std::sync::Arc;

use keyexpiry_domain::{Credential, DeveloperApp, ResourcePath};
use tracing::{debug, info, warn};

use crate::{CreateKeyInput, ManagementApi, ReplaceKeyInput};

mod report;
mod settings;

pub use report::{CredentialOutcome, CredentialRotationStatus, RotationFailure, RotationReport};
pub use settings::{DEFAULT_EXPIRE_IN_SECONDS, DEFAULT_SETTLE_DELAY_SECONDS, RotationSettings};

/// Application service that imposes expirations on non-expiring keys.
#[derive(Clone)]
pub struct KeyRotationService {
    management_api: Arc<dyn ManagementApi>,
    settings: RotationSettings,
}

impl KeyRotationService {
    /// Creates a rotation service.
    #[must_use]
    pub fn new(management_api: Arc<dyn ManagementApi>, settings: RotationSettings) -> Self {
        Self {
            management_api,
            settings,
        }
    }

    /// Returns the active rotation settings.
    #[must_use]
    pub fn settings(&self) -> &RotationSettings {
        &self.settings
    }

    /// Rotates every non-expiring credential of an app, in app order.
    pub async fn rotate(&self, app_path: &ResourcePath, app: &DeveloperApp) -> RotationReport {
        let mut report = RotationReport::default();

        for credential in app.credentials() {
            if credential.has_expiration() {
                debug!(
                    app_path = %app_path,
                    key_prefix = %credential.masked_key(),
                    expires_at = credential.expires_at(),
                    "key already expires, skipping"
                );
                report.push(CredentialOutcome::skipped(
                    credential.masked_key(),
                    credential.expires_at(),
                ));
                continue;
            }

            let outcome = self.rotate_credential(app_path, credential).await;
            report.push(outcome);
        }

        report
    }

    async fn rotate_credential(
        &self,
        app_path: &ResourcePath,
        credential: &Credential,
    ) -> CredentialOutcome {
        let key_prefix = credential.masked_key();
        let mut failures = Vec::new();

        // A missing key is fine: the import below upserts.
        if let Err(error) = self
            .management_api
            .delete_key(app_path, credential.consumer_key())
            .await
        {
            warn!(
                app_path = %app_path,
                key_prefix = %key_prefix,
                error = %error,
                "could not delete API key"
            );
            failures.push(RotationFailure::KeyDeleteFailed {
                reason: error.to_string(),
            });
        }

        let expires_in_seconds = self.settings.expire_in_seconds();
        let create_input = CreateKeyInput {
            consumer_key: credential.consumer_key().to_owned(),
            consumer_secret: credential.consumer_secret().to_owned(),
            expires_in_seconds,
            status: credential.status().to_owned(),
        };

        if let Err(error) = self
            .management_api
            .create_key(app_path, create_input)
            .await
        {
            warn!(
                app_path = %app_path,
                key_prefix = %key_prefix,
                error = %error,
                "could not import API key"
            );
            failures.push(RotationFailure::KeyCreateFailed {
                reason: error.to_string(),
            });
            return CredentialOutcome::failed(key_prefix, failures);
        }

        if !credential.api_products().is_empty()
            && !self
                .restore_api_products(app_path, credential, &mut failures)
                .await
        {
            return CredentialOutcome::failed(key_prefix, failures);
        }

        info!(
            app_path = %app_path,
            key_prefix = %key_prefix,
            expires_in_seconds,
            degraded_steps = failures.len(),
            "updated expiration for key"
        );

        CredentialOutcome::rotated(key_prefix, expires_in_seconds, failures)
    }

    async fn restore_api_products(
        &self,
        app_path: &ResourcePath,
        credential: &Credential,
        failures: &mut Vec<RotationFailure>,
    ) -> bool {
        let key_prefix = credential.masked_key();
        let replace_input = ReplaceKeyInput {
            api_products: credential
                .api_products()
                .iter()
                .map(|product| product.name().to_owned())
                .collect(),
            scopes: credential.scopes().to_vec(),
        };

        if let Err(error) = self
            .management_api
            .replace_key(app_path, credential.consumer_key(), replace_input)
            .await
        {
            warn!(
                app_path = %app_path,
                key_prefix = %key_prefix,
                error = %error,
                "could not replace API key"
            );
            failures.push(RotationFailure::KeyReplaceFailed {
                reason: error.to_string(),
            });
            return false;
        }

        for product in credential.api_products() {
            let Some(action) = product.replay_action() else {
                continue;
            };

            if let Err(error) = self
                .management_api
                .update_key_product(app_path, credential.consumer_key(), product.name(), action)
                .await
            {
                warn!(
                    app_path = %app_path,
                    key_prefix = %key_prefix,
                    api_product = product.name(),
                    action = action.as_str(),
                    error = %error,
                    "could not update API product status for key"
                );
                failures.push(RotationFailure::ProductStatusUpdateFailed {
                    api_product: product.name().to_owned(),
                    action,
                    reason: error.to_string(),
                });
            }
        }

        true
    }
}
