//! Known-vulnerability analysis

use crate::error::Result;
use crate::types::SecuritySignal;
use async_trait::async_trait;

/// Source of vulnerability information for a package
#[async_trait]
pub trait SecurityAnalyzer: Send + Sync {
    fn name(&self) -> &'static str;

    async fn analyze(&self, name: &str, version_constraint: &str) -> Result<SecuritySignal>;
}

/// Analyzer that knows of no advisories and reports every package as clean
#[derive(Debug, Default, Clone, Copy)]
pub struct NoKnownVulnerabilities;

#[async_trait]
impl SecurityAnalyzer for NoKnownVulnerabilities {
    fn name(&self) -> &'static str {
        "no-known-vulnerabilities"
    }

    async fn analyze(&self, _name: &str, _version_constraint: &str) -> Result<SecuritySignal> {
        Ok(SecuritySignal::clean())
    }
}
