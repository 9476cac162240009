use keyexpiry_domain::ProductAction;
use thiserror::Error;

/// Failure of one management API call during key rotation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RotationFailure {
    /// The old key could not be deleted. Rotation continues.
    #[error("could not delete API key: {reason}")]
    KeyDeleteFailed {
        /// Upstream error text.
        reason: String,
    },
    /// The key could not be imported with an expiration. Rotation stops.
    #[error("could not import API key: {reason}")]
    KeyCreateFailed {
        /// Upstream error text.
        reason: String,
    },
    /// API products could not be reattached. Rotation stops.
    #[error("could not replace API key: {reason}")]
    KeyReplaceFailed {
        /// Upstream error text.
        reason: String,
    },
    /// One product status transition failed.
    #[error("could not {action} API product {api_product}: {reason}")]
    ProductStatusUpdateFailed {
        /// API product name.
        api_product: String,
        /// Transition that was attempted.
        action: ProductAction,
        /// Upstream error text.
        reason: String,
    },
}

/// Result of processing one credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialRotationStatus {
    /// The credential already expires and was left untouched.
    Skipped {
        /// Existing expiration in epoch milliseconds.
        expires_at: i64,
    },
    /// The key was recreated with an expiration and its products reattached.
    /// `failures` lists steps that did not complete around that.
    Rotated {
        /// Lifetime given to the recreated key.
        expires_in_seconds: i64,
        /// Non-fatal step failures.
        failures: Vec<RotationFailure>,
    },
    /// The key could not be recreated or its products not reattached.
    Failed {
        /// Step failures, ending with the failed import or replace.
        failures: Vec<RotationFailure>,
    },
}

/// Outcome for one credential, identified by its masked consumer key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialOutcome {
    /// First characters of the consumer key.
    pub key_prefix: String,
    /// What happened to the credential.
    pub status: CredentialRotationStatus,
}

impl CredentialOutcome {
    pub(crate) fn skipped(key_prefix: String, expires_at: i64) -> Self {
        Self {
            key_prefix,
            status: CredentialRotationStatus::Skipped { expires_at },
        }
    }

    pub(crate) fn rotated(
        key_prefix: String,
        expires_in_seconds: i64,
        failures: Vec<RotationFailure>,
    ) -> Self {
        Self {
            key_prefix,
            status: CredentialRotationStatus::Rotated {
                expires_in_seconds,
                failures,
            },
        }
    }

    pub(crate) fn failed(key_prefix: String, failures: Vec<RotationFailure>) -> Self {
        Self {
            key_prefix,
            status: CredentialRotationStatus::Failed { failures },
        }
    }

    /// Returns true when the key was imported with an expiration and its
    /// products were reattached.
    #[must_use]
    pub fn is_rotated(&self) -> bool {
        matches!(self.status, CredentialRotationStatus::Rotated { .. })
    }

    /// Returns the step failures recorded for this credential.
    #[must_use]
    pub fn failures(&self) -> &[RotationFailure] {
        match &self.status {
            CredentialRotationStatus::Skipped { .. } => &[],
            CredentialRotationStatus::Rotated { failures, .. }
            | CredentialRotationStatus::Failed { failures } => failures,
        }
    }
}

/// Per-credential outcomes of one rotation pass, in app order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RotationReport {
    outcomes: Vec<CredentialOutcome>,
}

impl RotationReport {
    pub(crate) fn push(&mut self, outcome: CredentialOutcome) {
        self.outcomes.push(outcome);
    }

    /// Returns every credential outcome.
    #[must_use]
    pub fn outcomes(&self) -> &[CredentialOutcome] {
        &self.outcomes
    }

    /// Returns the masked keys that now carry an expiration.
    #[must_use]
    pub fn rotated_keys(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.is_rotated())
            .map(|outcome| outcome.key_prefix.clone())
            .collect()
    }

    /// Returns the number of credentials left untouched.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome.status, CredentialRotationStatus::Skipped { .. }))
            .count()
    }

    /// Returns the number of step failures across all credentials.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.outcomes
            .iter()
            .map(|outcome| outcome.failures().len())
            .sum()
    }
}
