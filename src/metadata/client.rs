//! Shared HTTP client for the npm registry and download counts API

use crate::cache::ResponseCache;
use crate::config::AuditConfig;
use crate::error::{AuditError, Result};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// HTTP access to npm with retries and a response cache
#[derive(Clone)]
pub struct NpmClient {
    client: Client,
    pub(crate) registry_url: String,
    pub(crate) downloads_url: String,
    max_retries: u32,
    retry_delay: Duration,
    cache: Arc<dyn ResponseCache>,
    cache_ttl: Duration,
}

impl NpmClient {
    pub fn new(config: &AuditConfig, cache: Arc<dyn ResponseCache>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.network.timeout())
            .build()
            .map_err(|e| AuditError::network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            registry_url: config.network.registry_url.trim_end_matches('/').to_string(),
            downloads_url: config.network.downloads_api_url.trim_end_matches('/').to_string(),
            max_retries: config.network.max_retries,
            retry_delay: config.network.request_delay(),
            cache,
            cache_ttl: config.cache.ttl(),
        })
    }

    /// GET `url` and decode its JSON body, consulting the cache first.
    ///
    /// A 404 maps to [`AuditError::DependencyNotFound`] for `package`.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        service: &str,
        package: &str,
    ) -> Result<T> {
        if let Some(body) = self.cache.get(url).await {
            match serde_json::from_str(&body) {
                Ok(value) => {
                    debug!("Cache hit ({}) for {}", self.cache.name(), url);
                    return Ok(value);
                }
                Err(e) => debug!("Discarding unreadable cached response for {}: {}", url, e),
            }
        }

        let response = self.retry_request(url, service).await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(AuditError::DependencyNotFound(package.to_string()));
        }
        if !status.is_success() {
            return Err(AuditError::api(service, format!("HTTP {}: {}", status, package)));
        }

        let body = response.text().await?;
        let value = serde_json::from_str(&body).map_err(|e| {
            AuditError::api(service, format!("malformed response for {}: {}", package, e))
        })?;

        if let Err(e) = self.cache.set(url, &body, self.cache_ttl).await {
            debug!("Failed to cache response for {}: {}", url, e);
        }

        Ok(value)
    }

    /// Retry a request with exponential backoff
    async fn retry_request(&self, url: &str, service: &str) -> Result<reqwest::Response> {
        let mut attempts = 0;
        let mut delay = self.retry_delay;

        loop {
            match self.client.get(url).send().await {
                Ok(response) => {
                    if response.status() == StatusCode::TOO_MANY_REQUESTS {
                        if attempts >= self.max_retries {
                            return Err(AuditError::RateLimitExceeded {
                                service: service.to_string(),
                                retry_after: Some(delay),
                            });
                        }
                        warn!("Rate limited by {}, retrying after {:?}", service, delay);
                        tokio::time::sleep(delay).await;
                        attempts += 1;
                        delay *= 2;
                        continue;
                    }
                    return Ok(response);
                }
                Err(e) => {
                    if attempts >= self.max_retries {
                        return Err(AuditError::network(format!("Request to {} failed: {}", url, e)));
                    }
                    warn!("Request to {} failed, retrying: {}", service, e);
                    tokio::time::sleep(delay).await;
                    attempts += 1;
                    delay *= 2;
                }
            }
        }
    }
}
