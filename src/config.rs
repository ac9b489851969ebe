//! Configuration for registry access, caching and audit scope

use crate::error::{AuditError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration for the audit process
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Network configuration
    pub network: NetworkConfig,
    /// Response cache configuration
    pub cache: CacheConfig,
    /// Analyze `devDependencies` as well
    pub include_dev: bool,
    /// Dependencies to ignore in the audit
    pub ignored_dependencies: HashSet<String>,
}

/// Network configuration for registry calls
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Base URL of the npm registry
    pub registry_url: String,
    /// Base URL of the npm download counts API
    pub downloads_api_url: String,
    /// Absolute timeout per request, in seconds
    pub timeout_secs: u64,
    /// Maximum number of retries for failed requests
    pub max_retries: u32,
    /// Delay between spawned analyses and base retry backoff (milliseconds)
    pub request_delay_ms: u64,
}

/// On-disk response cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Cache directory; the platform cache dir is used when unset
    pub directory: Option<PathBuf>,
    /// Time-to-live of a cached response, in seconds
    pub ttl_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            registry_url: "https://registry.npmjs.org".to_string(),
            downloads_api_url: "https://api.npmjs.org/downloads".to_string(),
            timeout_secs: 10,
            max_retries: 2,
            request_delay_ms: 50,
        }
    }
}

impl NetworkConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get request delay as Duration
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    fn validate(&self) -> Result<()> {
        for (field, url) in [
            ("registry_url", &self.registry_url),
            ("downloads_api_url", &self.downloads_api_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(AuditError::config(format!(
                    "network.{} must be an http(s) URL, got '{}'",
                    field, url
                )));
            }
        }
        if self.timeout_secs == 0 {
            return Err(AuditError::config("network.timeout_secs must be positive"));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: None,
            ttl_secs: 60 * 60,
        }
    }
}

impl CacheConfig {
    /// Get TTL as Duration
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// Directory the disk cache lives in
    pub fn resolved_directory(&self) -> PathBuf {
        self.directory.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .or_else(|| dirs::home_dir().map(|h| h.join(".cache")))
                .unwrap_or_else(|| PathBuf::from("."))
                .join("dep-health")
        })
    }
}

impl AuditConfig {
    /// Create a new builder for AuditConfig
    pub fn builder() -> AuditConfigBuilder {
        AuditConfigBuilder::default()
    }

    /// Load a configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a TOML configuration
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AuditConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.network.validate()
    }
}

/// Builder for AuditConfig
#[derive(Default)]
pub struct AuditConfigBuilder {
    network: Option<NetworkConfig>,
    cache: Option<CacheConfig>,
    include_dev: bool,
    ignored_dependencies: HashSet<String>,
}

impl AuditConfigBuilder {
    pub fn network(mut self, network: NetworkConfig) -> Self {
        self.network = Some(network);
        self
    }

    pub fn cache(mut self, cache: CacheConfig) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn include_dev(mut self, include: bool) -> Self {
        self.include_dev = include;
        self
    }

    pub fn ignore_dependency(mut self, name: impl Into<String>) -> Self {
        self.ignored_dependencies.insert(name.into());
        self
    }

    pub fn build(self) -> AuditConfig {
        AuditConfig {
            network: self.network.unwrap_or_default(),
            cache: self.cache.unwrap_or_default(),
            include_dev: self.include_dev,
            ignored_dependencies: self.ignored_dependencies,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AuditConfig::from_toml_str(
            r#"
            include_dev = true
            ignored_dependencies = ["left-pad"]

            [network]
            timeout_secs = 3
            "#,
        )
        .unwrap();

        assert!(config.include_dev);
        assert!(config.ignored_dependencies.contains("left-pad"));
        assert_eq!(config.network.timeout(), Duration::from_secs(3));
        assert_eq!(config.network.registry_url, "https://registry.npmjs.org");
        assert!(config.cache.enabled);
        assert_eq!(config.cache.ttl_secs, 3600);
    }

    #[test]
    fn test_invalid_registry_url_rejected() {
        let err = AuditConfig::from_toml_str(
            r#"
            [network]
            registry_url = "registry.npmjs.org"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, AuditError::ConfigError(_)));
    }

    #[test]
    fn test_builder() {
        let config = AuditConfig::builder()
            .include_dev(true)
            .ignore_dependency("typescript")
            .cache(CacheConfig {
                enabled: false,
                ..CacheConfig::default()
            })
            .build();

        assert!(config.include_dev);
        assert!(!config.cache.enabled);
        assert!(config.ignored_dependencies.contains("typescript"));
    }

    #[test]
    fn test_explicit_cache_directory() {
        let cache = CacheConfig {
            directory: Some(PathBuf::from("/tmp/somewhere")),
            ..CacheConfig::default()
        };
        assert_eq!(cache.resolved_directory(), PathBuf::from("/tmp/somewhere"));
        assert!(CacheConfig::default()
            .resolved_directory()
            .ends_with("dep-health"));
    }
}
