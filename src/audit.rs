//! Main audit orchestration logic

use crate::aggregate::project_grade;
use crate::alternatives;
use crate::cache::{self, ResponseCache};
use crate::config::AuditConfig;
use crate::error::{AuditError, Result};
use crate::metadata::NpmClient;
use crate::parser::{parse_manifest, Manifest};
use crate::scoring::{calculate_breakdown, calculate_score, determine_grade};
use crate::signals::NoKnownVulnerabilities;
use crate::source::{RegistrySignalSource, SignalSource};
use crate::types::{
    DependencyResult, DependencySpec, Grade, ProjectResult, ScoreBreakdown, SignalBundle,
};
use std::path::Path;
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Audit an npm project and generate a health report
pub async fn audit_project(project_path: &Path, config: &AuditConfig) -> Result<ProjectResult> {
    info!("Starting audit of project at: {}", project_path.display());

    let manifest = parse_manifest(project_path)?;
    let cache = cache::from_config(&config.cache);
    let source = registry_source(config, cache)?;

    analyze_manifest(&manifest, source, config).await
}

/// The npm-backed signal source used by [`audit_project`]
pub fn registry_source(
    config: &AuditConfig,
    cache: Arc<dyn ResponseCache>,
) -> Result<Arc<dyn SignalSource>> {
    let client = NpmClient::new(config, cache)?;
    Ok(Arc::new(RegistrySignalSource::new(
        client,
        Arc::new(NoKnownVulnerabilities),
    )))
}

/// Score every in-scope dependency of a parsed manifest
pub async fn analyze_manifest(
    manifest: &Manifest,
    source: Arc<dyn SignalSource>,
    config: &AuditConfig,
) -> Result<ProjectResult> {
    if manifest.dependencies.is_empty() && manifest.dev_dependencies.is_empty() {
        return Err(AuditError::NoDependencies(manifest.path.display().to_string()));
    }

    let production = in_scope(&manifest.dependencies, config);
    let dev = if config.include_dev {
        in_scope(&manifest.dev_dependencies, config)
    } else {
        Vec::new()
    };

    if production.is_empty() && dev.is_empty() {
        warn!(
            "No dependencies left to analyze in {} after filtering",
            manifest.path.display()
        );
    }

    info!(
        "Found {} dependencies and {} dev dependencies for project '{}'",
        production.len(),
        dev.len(),
        manifest.name
    );

    let (dependencies, dev_dependencies) = tokio::join!(
        analyze_dependencies(production, Arc::clone(&source), config),
        analyze_dependencies(dev, Arc::clone(&source), config),
    );

    let mut report = ProjectResult::new(manifest.name.clone(), manifest.path.display().to_string());
    let (score, grade) = project_grade(&dependencies, &dev_dependencies);
    report.dependencies = dependencies;
    report.dev_dependencies = dev_dependencies;
    report.project_score = score;
    report.project_grade = grade;
    report.compute_summary();

    info!(
        "Audit complete: project score {} ({}), {}/{} dependencies graded F, {} unresolved",
        report.project_score,
        report.project_grade,
        report.summary.grade_f,
        report.summary.total_dependencies,
        report.summary.unresolved,
    );

    Ok(report)
}

fn in_scope(specs: &[DependencySpec], config: &AuditConfig) -> Vec<DependencySpec> {
    specs
        .iter()
        .filter(|dep| {
            let ignored = config.ignored_dependencies.contains(&dep.name);
            if ignored {
                debug!("Skipping ignored dependency: {}", dep.name);
            }
            !ignored
        })
        .cloned()
        .collect()
}

/// Analyze dependencies concurrently; results keep the input order.
///
/// Every dependency yields exactly one result. A failed or panicked
/// analysis becomes a worst-case result instead of aborting its siblings.
pub async fn analyze_dependencies(
    dependencies: Vec<DependencySpec>,
    source: Arc<dyn SignalSource>,
    config: &AuditConfig,
) -> Vec<DependencyResult> {
    let mut tasks = Vec::with_capacity(dependencies.len());

    for (i, dep) in dependencies.into_iter().enumerate() {
        // Stagger requests to avoid overwhelming the registry
        if i > 0 && !config.network.request_delay().is_zero() {
            sleep(config.network.request_delay()).await;
        }

        let source = Arc::clone(&source);
        let spec = dep.clone();
        let task = tokio::spawn(async move { source.fetch_signals(&spec).await });
        tasks.push((dep, task));
    }

    let mut results = Vec::with_capacity(tasks.len());
    for (dep, task) in tasks {
        let result = match task.await {
            Ok(Ok(signals)) => score_dependency(dep, signals),
            Ok(Err(e)) => {
                warn!("Failed to analyze dependency {}: {}", dep.name, e);
                unresolved_dependency(dep, e.to_string())
            }
            Err(e) => {
                warn!("Analysis task for {} failed: {}", dep.name, e);
                unresolved_dependency(dep, format!("analysis task failed: {}", e))
            }
        };
        results.push(result);
    }

    results
}

/// Score a dependency from its acquired signals
pub fn score_dependency(dep: DependencySpec, signals: SignalBundle) -> DependencyResult {
    let breakdown = calculate_breakdown(&signals);
    let score = calculate_score(&signals);
    debug!("Scored {}: {}", dep.name, score);

    DependencyResult {
        alternative: alternatives::lookup(&dep.name),
        name: dep.name,
        version_constraint: dep.version_constraint,
        maintenance: signals.maintenance,
        popularity: signals.popularity,
        size: signals.size,
        security: signals.security,
        breakdown,
        score,
        grade: determine_grade(score),
        error: None,
        warnings: signals.warnings,
    }
}

/// Result for a dependency whose package could not be acquired at all
pub fn unresolved_dependency(dep: DependencySpec, error: String) -> DependencyResult {
    let signals = SignalBundle::worst_case();

    DependencyResult {
        alternative: alternatives::lookup(&dep.name),
        name: dep.name,
        version_constraint: dep.version_constraint,
        maintenance: signals.maintenance,
        popularity: signals.popularity,
        size: signals.size,
        security: signals.security,
        breakdown: ScoreBreakdown::default(),
        score: 0,
        grade: Grade::F,
        error: Some(error),
        warnings: Vec::new(),
    }
}
