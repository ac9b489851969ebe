//! Parser for package.json to extract declared dependencies

use crate::error::{AuditError, Result};
use crate::types::DependencySpec;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::warn;

const MANIFEST_FILE: &str = "package.json";

/// Dependencies declared by a project, in declaration order
#[derive(Debug, Clone)]
pub struct Manifest {
    pub name: String,
    pub path: PathBuf,
    pub dependencies: Vec<DependencySpec>,
    pub dev_dependencies: Vec<DependencySpec>,
}

#[derive(Debug, Deserialize)]
struct PackageJson {
    name: Option<String>,
    #[serde(default)]
    dependencies: Map<String, Value>,
    #[serde(default, rename = "devDependencies")]
    dev_dependencies: Map<String, Value>,
}

/// Locate the manifest for a project directory or an explicit manifest path
pub fn manifest_path(project_path: &Path) -> PathBuf {
    if project_path.is_dir() {
        project_path.join(MANIFEST_FILE)
    } else {
        project_path.to_path_buf()
    }
}

/// Read and parse the project's package.json
pub fn parse_manifest(project_path: &Path) -> Result<Manifest> {
    let path = manifest_path(project_path);

    if !path.exists() {
        return Err(AuditError::parse(format!(
            "{} not found at {}",
            MANIFEST_FILE,
            path.display()
        )));
    }

    let content = std::fs::read_to_string(&path)?;
    let mut manifest = parse_manifest_str(&content)?;
    if manifest.name.is_empty() {
        manifest.name = fallback_name(&path);
    }
    manifest.path = path;
    Ok(manifest)
}

/// Parse package.json content
pub fn parse_manifest_str(content: &str) -> Result<Manifest> {
    let package: PackageJson = serde_json::from_str(content)
        .map_err(|e| AuditError::parse(format!("invalid {}: {}", MANIFEST_FILE, e)))?;

    Ok(Manifest {
        name: package.name.unwrap_or_default(),
        path: PathBuf::from(MANIFEST_FILE),
        dependencies: collect_specs(package.dependencies, "dependencies"),
        dev_dependencies: collect_specs(package.dev_dependencies, "devDependencies"),
    })
}

fn collect_specs(section: Map<String, Value>, section_name: &str) -> Vec<DependencySpec> {
    section
        .into_iter()
        .filter_map(|(name, constraint)| match constraint {
            Value::String(constraint) => Some(DependencySpec::new(name, constraint)),
            other => {
                warn!(
                    "Skipping {} entry '{}': version constraint is not a string ({})",
                    section_name, name, other
                );
                None
            }
        })
        .collect()
}

fn fallback_name(path: &Path) -> String {
    path.parent()
        .and_then(|dir| dir.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unnamed".to_string())
}
