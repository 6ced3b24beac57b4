//! Store configuration
//!
//! Names the connection entry, database, and collection prefix used to
//! address collections in the document store.

use serde::{Deserialize, Serialize};

/// Document store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Named configuration entry for the store connection (default: "mongo")
    #[serde(default = "default_connection")]
    pub connection: String,

    /// Database holding the application collections (default: "app")
    #[serde(default = "default_database")]
    pub database: String,

    /// Prefix prepended to every logical collection name (default: "")
    #[serde(default)]
    pub prefix: String,
}

fn default_connection() -> String {
    "mongo".to_string()
}

fn default_database() -> String {
    "app".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            connection: default_connection(),
            database: default_database(),
            prefix: String::new(),
        }
    }
}

impl StoreConfig {
    /// Create a config with the given collection prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Default::default()
        }
    }

    /// Physical collection name for a logical one (prefix + logical name)
    pub fn collection_name(&self, logical: &str) -> String {
        format!("{}{}", self.prefix, logical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.connection, "mongo");
        assert_eq!(config.database, "app");
        assert_eq!(config.prefix, "");
    }

    #[test]
    fn test_collection_name_applies_prefix() {
        let config = StoreConfig::with_prefix("app_");
        assert_eq!(config.collection_name("article"), "app_article");
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: StoreConfig = serde_json::from_str(r#"{"prefix": "t_"}"#).unwrap();
        assert_eq!(config.connection, "mongo");
        assert_eq!(config.database, "app");
        assert_eq!(config.prefix, "t_");
    }
}
