use std::fmt::{Display, Formatter};

use keyexpiry_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

const KEYS_SEGMENT: &str = "/keys/";

/// Fully qualified developer app name,
/// `organizations/{org}/developers/{developer}/apps/{app}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourcePath(NonEmptyString);

impl ResourcePath {
    /// Creates a resource path, rejecting empty values.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        NonEmptyString::new(value).map(Self).map_err(|_| {
            AppError::UnresolvablePath("could not determine app path from event".to_owned())
        })
    }

    /// Builds the path of a newly created app from its developer parent.
    pub fn for_created_app(parent: &str, app_name: &str) -> AppResult<Self> {
        if parent.trim().is_empty() || app_name.trim().is_empty() {
            return Err(AppError::UnresolvablePath(
                "could not determine app path from event".to_owned(),
            ));
        }

        Self::new(format!("{parent}/apps/{app_name}"))
    }

    /// Reduces a key-level resource name to its owning app path.
    ///
    /// Everything from the first `/keys/<id>` segment onwards is dropped; names
    /// without one are used verbatim.
    pub fn from_key_name(key_name: &str) -> AppResult<Self> {
        let app_path = match key_name.find(KEYS_SEGMENT) {
            Some(index) if index + KEYS_SEGMENT.len() < key_name.len() => &key_name[..index],
            _ => key_name,
        };

        Self::new(app_path)
    }

    /// Returns the underlying path.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the resource name of one key in this app.
    #[must_use]
    pub fn key_path(&self, consumer_key: &str) -> String {
        format!("{}/keys/{consumer_key}", self.as_str())
    }

    /// Returns the resource name of one API product grant on one key.
    #[must_use]
    pub fn key_product_path(&self, consumer_key: &str, api_product: &str) -> String {
        format!("{}/apiproducts/{api_product}", self.key_path(consumer_key))
    }
}

impl Display for ResourcePath {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::ResourcePath;

    #[test]
    fn strips_trailing_key_segment() {
        let path = ResourcePath::from_key_name("org/developers/d/apps/a/keys/k1");
        assert!(matches!(path, Ok(value) if value.as_str() == "org/developers/d/apps/a"));
    }

    #[test]
    fn keeps_name_without_key_segment() {
        let path = ResourcePath::from_key_name("organizations/o/developers/d/apps/a");
        assert!(matches!(path, Ok(value) if value.as_str() == "organizations/o/developers/d/apps/a"));
    }

    #[test]
    fn keeps_dangling_keys_segment() {
        let path = ResourcePath::from_key_name("organizations/o/developers/d/apps/a/keys/");
        assert!(
            matches!(path, Ok(value) if value.as_str() == "organizations/o/developers/d/apps/a/keys/")
        );
    }

    #[test]
    fn rejects_empty_paths() {
        assert!(ResourcePath::new("").is_err());
        assert!(ResourcePath::from_key_name("/keys/k1").is_err());
        assert!(ResourcePath::for_created_app("", "app1").is_err());
        assert!(ResourcePath::for_created_app("organizations/o/developers/d", "").is_err());
    }

    #[test]
    fn builds_key_and_product_paths() {
        let path = ResourcePath::new("organizations/o/developers/d/apps/a");
        assert!(path.is_ok());
        let path = path.unwrap_or_else(|_| unreachable!());

        assert_eq!(
            path.key_path("abc"),
            "organizations/o/developers/d/apps/a/keys/abc"
        );
        assert_eq!(
            path.key_product_path("abc", "gold"),
            "organizations/o/developers/d/apps/a/keys/abc/apiproducts/gold"
        );
    }

    proptest! {
        #[test]
        fn key_name_reduces_to_owning_app(
            org in "[a-z][a-z0-9-]{0,12}",
            developer in "[a-z0-9.@]{1,16}",
            app in "[a-zA-Z0-9_-]{1,16}",
            key in "[a-zA-Z0-9]{1,32}",
        ) {
            let app_path = format!("organizations/{org}/developers/{developer}/apps/{app}");
            let key_name = format!("{app_path}/keys/{key}");

            let resolved = ResourcePath::from_key_name(&key_name);
            prop_assert!(matches!(resolved, Ok(value) if value.as_str() == app_path));
        }

        #[test]
        fn created_app_path_is_parent_plus_app(
            org in "[a-z][a-z0-9-]{0,12}",
            developer in "[a-z0-9.@]{1,16}",
            app in "[a-zA-Z0-9_-]{1,16}",
        ) {
            let parent = format!("organizations/{org}/developers/{developer}");
            let first = ResourcePath::for_created_app(&parent, &app);
            let second = ResourcePath::for_created_app(&parent, &app);

            prop_assert!(first.is_ok());
            let first = first.unwrap_or_else(|_| unreachable!());
            prop_assert_eq!(first.as_str(), format!("{parent}/apps/{app}"));
            prop_assert!(matches!(second, Ok(value) if value == first));
        }
    }
}
