//! # npm_dependency_health
//!
//! Health scoring for the dependencies of an npm project. Each dependency
//! declared in `package.json` gets a 0-100 score and an A-F grade built from:
//! - **Maintenance**: how recently a version was published
//! - **Popularity**: weekly downloads
//! - **Size**: unpacked size of the resolved version
//! - **Security**: severity of known vulnerabilities
//! - **Trend**: downloads against the same week half a year earlier
//!
//! The project as a whole is graded by a weighted mean in which dev
//! dependencies count half.
//!
//! ## Quick Start
//!
//! ```no_run
//! use npm_dependency_health::{audit_project, AuditConfig};
//! use std::path::Path;
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = AuditConfig::default();
//! let report = audit_project(Path::new("."), &config).await?;
//!
//! for dep in &report.dependencies {
//!     println!("{}: {} ({})", dep.name, dep.score, dep.grade);
//! }
//! println!("project: {} ({})", report.project_score, report.project_grade);
//! # Ok(())
//! # }
//! ```
//!
//! ## Scoring without the network
//!
//! ```
//! use npm_dependency_health::{calculate_score, determine_grade, SignalBundle};
//!
//! let score = calculate_score(&SignalBundle::default());
//! assert_eq!(score, 0);
//! assert_eq!(determine_grade(score).to_string(), "F");
//! ```

mod aggregate;
mod alternatives;
mod audit;
pub mod cache;
mod config;
mod error;
mod metadata;
mod parser;
mod scoring;
pub mod signals;
mod source;
mod types;

// Re-export public API
pub use aggregate::{project_grade, project_score, weighted_score, DEV_WEIGHT, PRODUCTION_WEIGHT};
pub use alternatives::lookup as lookup_alternative;
pub use audit::{
    analyze_dependencies, analyze_manifest, audit_project, registry_source, score_dependency,
    unresolved_dependency,
};
pub use cache::{DiskCache, MemoryCache, NoCache, ResponseCache};
pub use config::{AuditConfig, AuditConfigBuilder, CacheConfig, NetworkConfig};
pub use error::{AuditError, Result};
pub use metadata::{NpmClient, Packument, VersionManifest};
pub use parser::{parse_manifest, parse_manifest_str, Manifest};
pub use scoring::{calculate_breakdown, calculate_score, determine_grade};
pub use signals::{NoKnownVulnerabilities, SecurityAnalyzer};
pub use source::{RegistrySignalSource, SignalSource};
pub use types::{
    AlternativeSuggestion, DependencyResult, DependencySpec, Grade, MaintenanceSignal,
    MaintenanceStatus, PopularitySignal, ProjectResult, ProjectSummary, ScoreBreakdown,
    SecuritySignal, Severity, SignalBundle, SizeSignal, Trend, SCHEMA_VERSION,
};
