use serde::{Deserialize, Serialize};
use url::Url;

use crate::core::error::SportsfestError;

/// Runtime configuration for the backend.
///
/// Defaults target the production Google endpoints; the standard Firebase
/// emulator environment variables override them for local development.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SportsfestConfig {
    pub project_id: String,
    pub storage_bucket: String,
    /// Web API key for Identity Toolkit calls. Optional against the emulator.
    pub api_key: Option<String>,
    /// Bearer token for privileged REST calls (service account access token).
    pub service_token: Option<String>,

    pub firestore_url: String,
    pub storage_url: String,
    pub identity_url: String,

    pub profiles_collection: String,
    pub registrations_collection: String,
    pub profile_pictures_prefix: String,

    pub delete_batch_limit: usize,
    pub timeout: u64,
    pub max_retries: u32,

    pub bind_host: String,
    pub bind_port: u16,

    pub stats_cache_ttl: u64,
    pub stats_cache_size: usize,
}

impl SportsfestConfig {
    pub fn new(project_id: &str) -> Self {
        Self {
            project_id: project_id.to_string(),
            storage_bucket: format!("{}.appspot.com", project_id),
            api_key: None,
            service_token: None,

            firestore_url: "https://firestore.googleapis.com".to_string(),
            storage_url: "https://storage.googleapis.com".to_string(),
            identity_url: "https://identitytoolkit.googleapis.com".to_string(),

            profiles_collection: "users".to_string(),
            registrations_collection: "registrations".to_string(),
            profile_pictures_prefix: crate::PROFILE_PICTURES_PREFIX.to_string(),

            delete_batch_limit: crate::DEFAULT_DELETE_BATCH_LIMIT,
            timeout: 30,
            max_retries: 3,

            bind_host: "0.0.0.0".to_string(),
            bind_port: crate::DEFAULT_BIND_PORT,

            stats_cache_ttl: crate::DEFAULT_STATS_CACHE_TTL,
            stats_cache_size: crate::DEFAULT_STATS_CACHE_SIZE,
        }
    }

    /// Loads configuration from the environment.
    ///
    /// `SPORTSFEST_*` variables configure the app itself; the Firebase
    /// emulator variables (`FIRESTORE_EMULATOR_HOST` and friends) redirect
    /// the platform endpoints, matching what the official tooling sets.
    pub fn from_env() -> Self {
        let mut config = Self::new(
            &std::env::var("SPORTSFEST_PROJECT_ID")
                .unwrap_or_else(|_| crate::DEFAULT_PROJECT_ID.to_string()),
        );

        if let Ok(bucket) = std::env::var("SPORTSFEST_STORAGE_BUCKET") {
            config.storage_bucket = bucket;
        }
        if let Ok(key) = std::env::var("SPORTSFEST_API_KEY") {
            config.api_key = Some(key);
        }
        if let Ok(token) = std::env::var("SPORTSFEST_SERVICE_TOKEN") {
            config.service_token = Some(token);
        }

        if let Ok(host) = std::env::var("FIRESTORE_EMULATOR_HOST") {
            config.firestore_url = format!("http://{}", host);
        }
        if let Ok(host) = std::env::var("FIREBASE_STORAGE_EMULATOR_HOST") {
            config.storage_url = format!("http://{}", host);
        }
        if let Ok(host) = std::env::var("FIREBASE_AUTH_EMULATOR_HOST") {
            config.identity_url = format!("http://{}", host);
        }

        if let Ok(host) = std::env::var("SPORTSFEST_BIND_HOST") {
            config.bind_host = host;
        }
        if let Ok(port) = std::env::var("SPORTSFEST_BIND_PORT") {
            config.bind_port = port.parse().unwrap_or(crate::DEFAULT_BIND_PORT);
        }
        if let Ok(limit) = std::env::var("SPORTSFEST_DELETE_BATCH_LIMIT") {
            config.delete_batch_limit = limit.parse().unwrap_or(crate::DEFAULT_DELETE_BATCH_LIMIT);
        }
        if let Ok(ttl) = std::env::var("SPORTSFEST_STATS_CACHE_TTL") {
            config.stats_cache_ttl = ttl.parse().unwrap_or(crate::DEFAULT_STATS_CACHE_TTL);
        }

        config
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.bind_port)
    }

    /// Checks that the three platform endpoints parse as URLs.
    pub fn validate(&self) -> Result<(), SportsfestError> {
        for (name, value) in [
            ("firestore_url", &self.firestore_url),
            ("storage_url", &self.storage_url),
            ("identity_url", &self.identity_url),
        ] {
            Url::parse(value).map_err(|e| {
                SportsfestError::Configuration(format!("{} is not a valid URL: {}", name, e))
            })?;
        }
        if self.delete_batch_limit == 0 {
            return Err(SportsfestError::Configuration(
                "delete_batch_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SportsfestConfig {
    fn default() -> Self {
        Self::new(crate::DEFAULT_PROJECT_ID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SportsfestConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.storage_bucket, "sportsfest-dev.appspot.com");
        assert_eq!(config.delete_batch_limit, 500);
    }

    #[test]
    fn test_bind_addr() {
        let mut config = SportsfestConfig::default();
        config.bind_host = "127.0.0.1".to_string();
        config.bind_port = 9090;
        assert_eq!(config.bind_addr(), "127.0.0.1:9090");
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut config = SportsfestConfig::default();
        config.firestore_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_batch_limit() {
        let mut config = SportsfestConfig::default();
        config.delete_batch_limit = 0;
        assert!(config.validate().is_err());
    }
}
