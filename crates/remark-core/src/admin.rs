//! Admin and secret directory
//!
//! Supplies the per-site secret used for IP hashing and the list of site admins.

use crate::config::AdminConfig;
use crate::error::{RemarkError, Result};

/// Trait for admin directory implementations
pub trait AdminStore: Send + Sync {
    /// Secret key for the site
    fn key(&self, site_id: &str) -> Result<String>;

    /// Admin user IDs of the site
    fn admins(&self, site_id: &str) -> Vec<String>;
}

/// Admin directory with one secret and one admin list shared by all sites
#[derive(Debug, Clone)]
pub struct StaticAdminStore {
    secret: String,
    admins: Vec<String>,
}

impl StaticAdminStore {
    pub fn new(secret: impl Into<String>, admins: Vec<String>) -> Self {
        Self {
            secret: secret.into(),
            admins,
        }
    }

    pub fn from_config(config: &AdminConfig) -> Self {
        Self::new(config.secret.clone(), config.admins.clone())
    }
}

impl AdminStore for StaticAdminStore {
    fn key(&self, site_id: &str) -> Result<String> {
        if self.secret.is_empty() {
            return Err(RemarkError::Config(format!(
                "secret for site {} is not set",
                site_id
            )));
        }
        Ok(self.secret.clone())
    }

    fn admins(&self, _site_id: &str) -> Vec<String> {
        self.admins.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_store() {
        let store = StaticAdminStore::new("12345", vec!["admin1".to_string()]);
        assert_eq!(store.key("any-site").unwrap(), "12345");
        assert_eq!(store.admins("any-site"), vec!["admin1".to_string()]);
    }

    #[test]
    fn test_empty_secret_is_config_error() {
        let store = StaticAdminStore::from_config(&AdminConfig::default());
        let err = store.key("site1").unwrap_err();
        assert!(matches!(err, RemarkError::Config(_)));
    }
}
