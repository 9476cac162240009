use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Number of consumer key characters kept when a key is logged or reported.
pub const MASKED_KEY_LENGTH: usize = 7;

/// Returns the reportable prefix of a consumer key.
#[must_use]
pub fn mask_consumer_key(consumer_key: &str) -> String {
    consumer_key.chars().take(MASKED_KEY_LENGTH).collect()
}

/// Developer app snapshot fetched from the management API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeveloperApp {
    name: String,
    credentials: Vec<Credential>,
}

impl DeveloperApp {
    /// Creates an app snapshot with credentials in management API order.
    #[must_use]
    pub fn new(name: impl Into<String>, credentials: Vec<Credential>) -> Self {
        Self {
            name: name.into(),
            credentials,
        }
    }

    /// Returns the app name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the app credentials.
    #[must_use]
    pub fn credentials(&self) -> &[Credential] {
        &self.credentials
    }
}

/// One consumer key and secret pair of a developer app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    consumer_key: String,
    consumer_secret: String,
    status: String,
    expires_at: i64,
    scopes: Vec<String>,
    api_products: Vec<ApiProductRef>,
}

impl Credential {
    /// Creates a non-expiring credential without API products.
    #[must_use]
    pub fn new(
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            status: status.into(),
            expires_at: 0,
            scopes: Vec::new(),
            api_products: Vec::new(),
        }
    }

    /// Sets the expiration in epoch milliseconds. Zero or negative never expires.
    #[must_use]
    pub fn with_expires_at(mut self, expires_at: i64) -> Self {
        self.expires_at = expires_at;
        self
    }

    /// Sets the OAuth scopes granted to the key.
    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Sets the API products associated with the key.
    #[must_use]
    pub fn with_api_products(mut self, api_products: Vec<ApiProductRef>) -> Self {
        self.api_products = api_products;
        self
    }

    /// Returns the public consumer key.
    #[must_use]
    pub fn consumer_key(&self) -> &str {
        self.consumer_key.as_str()
    }

    /// Returns the consumer secret.
    #[must_use]
    pub fn consumer_secret(&self) -> &str {
        self.consumer_secret.as_str()
    }

    /// Returns the key status as reported by the management API.
    #[must_use]
    pub fn status(&self) -> &str {
        self.status.as_str()
    }

    /// Returns the expiration in epoch milliseconds.
    #[must_use]
    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }

    /// Returns true when the key carries an expiration.
    #[must_use]
    pub fn has_expiration(&self) -> bool {
        self.expires_at > 0
    }

    /// Returns the OAuth scopes granted to the key.
    #[must_use]
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Returns the API products associated with the key.
    #[must_use]
    pub fn api_products(&self) -> &[ApiProductRef] {
        &self.api_products
    }

    /// Returns the masked consumer key used in logs and reports.
    #[must_use]
    pub fn masked_key(&self) -> String {
        mask_consumer_key(&self.consumer_key)
    }
}

/// API product association of one credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiProductRef {
    name: String,
    status: String,
}

impl ApiProductRef {
    /// Creates a product association.
    #[must_use]
    pub fn new(name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: status.into(),
        }
    }

    /// Returns the API product name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the association status (`approved`, `revoked`, `pending`, ...).
    #[must_use]
    pub fn status(&self) -> &str {
        self.status.as_str()
    }

    /// Returns the action that restores this association's status on a new key.
    ///
    /// Only `approved` and `revoked` are replayed.
    #[must_use]
    pub fn replay_action(&self) -> Option<ProductAction> {
        ProductAction::from_status(&self.status)
    }
}

/// Status transition applied to a key's API product association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductAction {
    /// Approve the association.
    Approve,
    /// Revoke the association.
    Revoke,
}

impl ProductAction {
    /// Maps a status word to the action producing it.
    #[must_use]
    pub fn from_status(status: &str) -> Option<Self> {
        match status {
            "approved" => Some(Self::Approve),
            "revoked" => Some(Self::Revoke),
            _ => None,
        }
    }

    /// Returns the management API `action` query value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Revoke => "revoke",
        }
    }
}

impl Display for ProductAction {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}
