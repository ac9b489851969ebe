//! Signal acquisition for a single dependency

use crate::error::Result;
use crate::metadata::NpmClient;
use crate::signals::{maintenance, popularity, size, SecurityAnalyzer};
use crate::types::{DependencySpec, SignalBundle};
use async_trait::async_trait;
use chrono::Utc;
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, warn};

/// Provides the signals the scorer consumes.
///
/// An `Err` means the package could not be acquired at all. Individual
/// signals that could not be determined are `None` in the bundle.
#[async_trait]
pub trait SignalSource: Send + Sync {
    async fn fetch_signals(&self, dependency: &DependencySpec) -> Result<SignalBundle>;
}

/// Signals from the npm registry and downloads API
pub struct RegistrySignalSource {
    client: NpmClient,
    security: Arc<dyn SecurityAnalyzer>,
}

impl RegistrySignalSource {
    pub fn new(client: NpmClient, security: Arc<dyn SecurityAnalyzer>) -> Self {
        Self { client, security }
    }
}

#[async_trait]
impl SignalSource for RegistrySignalSource {
    async fn fetch_signals(&self, dependency: &DependencySpec) -> Result<SignalBundle> {
        let name = dependency.name.as_str();
        let constraint = dependency.version_constraint.as_str();

        let packument = self.client.fetch_packument(name).await?;
        let now = Utc::now();

        let (maintenance, popularity, size, security) = tokio::join!(
            async { maintenance::extract(&packument, now) },
            popularity::extract(&self.client, name, now.date_naive()),
            async { size::extract(&packument, constraint) },
            self.security.analyze(name, constraint),
        );

        let mut warnings = Vec::new();
        if let Some((version, notice)) = packument
            .resolve_version(constraint)
            .and_then(|(version, manifest)| manifest.deprecation_notice().map(|n| (version, n)))
        {
            warnings.push(format!("Version {} is deprecated: {}", version, notice));
        }

        let bundle = SignalBundle {
            maintenance: Some(maintenance),
            popularity: isolate(name, "popularity", popularity, &mut warnings),
            size: isolate(name, "size", size, &mut warnings),
            security: isolate(name, "security", security, &mut warnings),
            warnings,
        };

        debug!(
            "Acquired signals for {} (security analyzer: {})",
            name,
            self.security.name()
        );
        Ok(bundle)
    }
}

/// Keep a failed extractor from affecting the other dimensions
fn isolate<T, E: Display>(
    package: &str,
    dimension: &str,
    outcome: std::result::Result<T, E>,
    warnings: &mut Vec<String>,
) -> Option<T> {
    match outcome {
        Ok(signal) => Some(signal),
        Err(e) => {
            warn!("Failed to determine {} signal for {}: {}", dimension, package, e);
            warnings.push(format!("Could not determine {} signal: {}", dimension, e));
            None
        }
    }
}
