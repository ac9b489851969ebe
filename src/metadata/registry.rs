//! Fetch package documents from the npm registry

use super::client::NpmClient;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

const SERVICE: &str = "npm registry";

/// Registry document describing every published version of a package
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Packument {
    pub name: String,
    #[serde(default, rename = "dist-tags")]
    pub dist_tags: HashMap<String, String>,
    #[serde(default)]
    pub versions: HashMap<String, VersionManifest>,
    /// Publish timestamps per version, plus `created` and `modified`
    #[serde(default)]
    pub time: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VersionManifest {
    #[serde(default)]
    pub dist: Option<Dist>,
    /// Deprecation notice; npm stores it as a string
    #[serde(default)]
    pub deprecated: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Dist {
    #[serde(default, rename = "unpackedSize")]
    pub unpacked_size: Option<u64>,
}

impl Packument {
    /// Latest publish timestamp recorded for any version
    pub fn last_publish_date(&self) -> Option<DateTime<Utc>> {
        let latest_version = self
            .time
            .iter()
            .filter(|(key, _)| key.as_str() != "created" && key.as_str() != "modified")
            .filter_map(|(_, ts)| parse_datetime(ts))
            .max();

        latest_version.or_else(|| self.time.get("modified").and_then(|ts| parse_datetime(ts)))
    }

    /// Version a manifest constraint most plausibly refers to.
    ///
    /// Range operators are stripped and the remainder looked up exactly,
    /// otherwise the `latest` dist-tag is used.
    pub fn resolve_version(&self, constraint: &str) -> Option<(&str, &VersionManifest)> {
        let exact = constraint
            .trim()
            .trim_start_matches(|c: char| matches!(c, '^' | '~' | '>' | '<' | '=' | 'v' | ' '));

        if let Some((version, manifest)) = self.versions.get_key_value(exact) {
            return Some((version.as_str(), manifest));
        }

        let latest = self.dist_tags.get("latest")?;
        self.versions
            .get_key_value(latest)
            .map(|(version, manifest)| (version.as_str(), manifest))
    }
}

impl VersionManifest {
    pub fn unpacked_size(&self) -> Option<u64> {
        self.dist.as_ref().and_then(|d| d.unpacked_size)
    }

    pub fn deprecation_notice(&self) -> Option<String> {
        match &self.deprecated {
            Some(serde_json::Value::String(msg)) if !msg.is_empty() => Some(msg.clone()),
            Some(serde_json::Value::Bool(true)) => Some("deprecated".to_string()),
            _ => None,
        }
    }
}

impl NpmClient {
    /// Fetch the packument for a package
    pub async fn fetch_packument(&self, name: &str) -> Result<Packument> {
        debug!("Fetching packument for {}", name);
        let url = format!("{}/{}", self.registry_url, encode_package_name(name));
        self.get_json(&url, SERVICE, name).await
    }
}

/// Registry path segment for a package; the scope separator must be escaped
pub fn encode_package_name(name: &str) -> String {
    match name.strip_prefix('@') {
        Some(scoped) => format!("@{}", urlencoding::encode(scoped)),
        None => urlencoding::encode(name).into_owned(),
    }
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packument() -> Packument {
        serde_json::from_str(
            r#"{
                "name": "left-pad",
                "dist-tags": { "latest": "1.3.0" },
                "versions": {
                    "1.1.0": { "dist": { "unpackedSize": 4000 } },
                    "1.3.0": {
                        "dist": { "unpackedSize": 9000 },
                        "deprecated": "use String.prototype.padStart()"
                    }
                },
                "time": {
                    "created": "2014-03-01T00:00:00.000Z",
                    "modified": "2022-06-01T00:00:00.000Z",
                    "1.1.0": "2016-04-01T00:00:00.000Z",
                    "1.3.0": "2018-04-09T00:00:00.000Z"
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_last_publish_ignores_modified() {
        let date = packument().last_publish_date().unwrap();
        assert_eq!(date.to_rfc3339(), "2018-04-09T00:00:00+00:00");
    }

    #[test]
    fn test_last_publish_falls_back_to_modified() {
        let mut doc = packument();
        doc.time.retain(|k, _| k == "created" || k == "modified");
        assert_eq!(
            doc.last_publish_date().unwrap().to_rfc3339(),
            "2022-06-01T00:00:00+00:00"
        );

        doc.time.clear();
        assert!(doc.last_publish_date().is_none());
    }

    #[test]
    fn test_resolve_version() {
        let doc = packument();
        assert_eq!(doc.resolve_version("^1.1.0").unwrap().0, "1.1.0");
        assert_eq!(doc.resolve_version(">= 1.1.0").unwrap().0, "1.1.0");
        assert_eq!(doc.resolve_version("1.x").unwrap().0, "1.3.0");
        assert_eq!(doc.resolve_version("latest").unwrap().0, "1.3.0");
        assert!(Packument::default().resolve_version("1.0.0").is_none());
    }

    #[test]
    fn test_deprecation_notice() {
        let doc = packument();
        assert_eq!(
            doc.versions["1.3.0"].deprecation_notice().as_deref(),
            Some("use String.prototype.padStart()")
        );
        assert!(doc.versions["1.1.0"].deprecation_notice().is_none());
    }

    #[test]
    fn test_encode_package_name() {
        assert_eq!(encode_package_name("express"), "express");
        assert_eq!(encode_package_name("@babel/core"), "@babel%2Fcore");
    }
}
