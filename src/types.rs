//! Core data types for dependency health reporting

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version of the serialized [`ProjectResult`] layout
pub const SCHEMA_VERSION: u32 = 1;

/// A dependency as declared in the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencySpec {
    pub name: String,
    pub version_constraint: String,
}

impl DependencySpec {
    pub fn new(name: impl Into<String>, version_constraint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version_constraint: version_constraint.into(),
        }
    }
}

/// Maintenance status derived from publish recency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaintenanceStatus {
    /// Published within the last 180 days
    Active,
    /// Last publish between 180 and 540 days ago
    Stale,
    /// No publish for 540 days or more, or no publish date known
    Abandoned,
}

impl MaintenanceStatus {
    pub const STALE_AFTER_DAYS: i64 = 180;
    pub const ABANDONED_AFTER_DAYS: i64 = 540;

    /// Status for a number of days since the last publish; `None` means unknown
    pub fn from_days(days_since_publish: Option<i64>) -> Self {
        match days_since_publish {
            Some(days) if days < Self::STALE_AFTER_DAYS => Self::Active,
            Some(days) if days < Self::ABANDONED_AFTER_DAYS => Self::Stale,
            _ => Self::Abandoned,
        }
    }
}

impl std::fmt::Display for MaintenanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Stale => write!(f, "stale"),
            Self::Abandoned => write!(f, "abandoned"),
        }
    }
}

/// Recency of the most recent publish
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceSignal {
    pub last_publish_date: Option<DateTime<Utc>>,
    /// Whole days since the last publish; `None` stands for infinitely long ago
    pub days_since_publish: Option<i64>,
    pub status: MaintenanceStatus,
}

impl MaintenanceSignal {
    /// Build the signal from the last publish date, relative to `now`
    pub fn from_last_publish(last_publish_date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        let days_since_publish =
            last_publish_date.map(|date| now.signed_duration_since(date).num_days().max(0));
        Self {
            last_publish_date,
            days_since_publish,
            status: MaintenanceStatus::from_days(days_since_publish),
        }
    }

    /// Signal used when nothing is known about the package
    pub fn unknown() -> Self {
        Self {
            last_publish_date: None,
            days_since_publish: None,
            status: MaintenanceStatus::Abandoned,
        }
    }
}

/// Direction of download volume relative to ~26 weeks earlier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Growing,
    Stable,
    Declining,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Growing => write!(f, "growing"),
            Self::Stable => write!(f, "stable"),
            Self::Declining => write!(f, "declining"),
        }
    }
}

/// Download volume and its trend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopularitySignal {
    pub weekly_downloads: u64,
    pub trend: Trend,
    /// Percent change against the prior window, one decimal place
    pub trend_percent: f64,
}

impl PopularitySignal {
    pub fn none() -> Self {
        Self {
            weekly_downloads: 0,
            trend: Trend::Stable,
            trend_percent: 0.0,
        }
    }
}

/// Installed size of the resolved version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeSignal {
    /// Unpacked size in bytes, 0 when unknown
    pub unpacked_size_bytes: u64,
    pub unpacked_size_human: String,
}

impl SizeSignal {
    pub fn unknown() -> Self {
        Self {
            unpacked_size_bytes: 0,
            unpacked_size_human: "unknown".to_string(),
        }
    }
}

/// Highest advisory severity affecting a package
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    None,
    Low,
    Moderate,
    High,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Low => write!(f, "low"),
            Self::Moderate => write!(f, "moderate"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// Known vulnerabilities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecuritySignal {
    pub vulnerability_count: u32,
    pub severity: Severity,
}

impl SecuritySignal {
    pub fn clean() -> Self {
        Self {
            vulnerability_count: 0,
            severity: Severity::None,
        }
    }

    /// Fold individual advisory severities into one signal
    pub fn from_severities(severities: &[Severity]) -> Self {
        Self {
            vulnerability_count: severities.len() as u32,
            severity: severities.iter().copied().max().unwrap_or(Severity::None),
        }
    }
}

/// Suggested replacement for a dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternativeSuggestion {
    pub name: String,
    pub reason: String,
}

/// Every signal gathered for one dependency; absent signals score zero
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalBundle {
    pub maintenance: Option<MaintenanceSignal>,
    pub popularity: Option<PopularitySignal>,
    pub size: Option<SizeSignal>,
    pub security: Option<SecuritySignal>,
    /// Notes collected while acquiring the signals
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl SignalBundle {
    /// Signals substituted when the package could not be acquired at all
    pub fn worst_case() -> Self {
        Self {
            maintenance: Some(MaintenanceSignal::unknown()),
            popularity: Some(PopularitySignal::none()),
            size: Some(SizeSignal::unknown()),
            security: Some(SecuritySignal::clean()),
            warnings: Vec::new(),
        }
    }
}

/// Letter grade bucketing a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
            Self::C => write!(f, "C"),
            Self::D => write!(f, "D"),
            Self::F => write!(f, "F"),
        }
    }
}

/// Points awarded per scoring bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub maintenance: u8,
    pub popularity: u8,
    pub size: u8,
    pub security: u8,
    pub trend: u8,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u32 {
        [
            self.maintenance,
            self.popularity,
            self.size,
            self.security,
            self.trend,
        ]
        .iter()
        .map(|&p| p as u32)
        .sum()
    }
}

/// Health information for a single dependency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyResult {
    pub name: String,
    pub version_constraint: String,
    pub maintenance: Option<MaintenanceSignal>,
    pub popularity: Option<PopularitySignal>,
    pub size: Option<SizeSignal>,
    pub security: Option<SecuritySignal>,
    pub breakdown: ScoreBreakdown,
    /// Overall health score (0-100)
    pub score: u8,
    pub grade: Grade,
    pub alternative: Option<AlternativeSuggestion>,
    /// Set when the package could not be analyzed at all
    pub error: Option<String>,
    pub warnings: Vec<String>,
}

impl DependencyResult {
    pub fn is_failing(&self) -> bool {
        self.grade == Grade::F
    }
}

/// Dependency counts by outcome
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub total_dependencies: usize,
    pub grade_a: usize,
    pub grade_b: usize,
    pub grade_c: usize,
    pub grade_d: usize,
    pub grade_f: usize,
    /// Dependencies that could not be analyzed at all
    pub unresolved: usize,
    pub with_alternatives: usize,
}

/// Complete health report for a project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectResult {
    pub schema_version: u32,
    pub project_name: String,
    pub project_path: String,
    /// Timestamp when the analysis was performed
    pub timestamp: DateTime<Utc>,
    /// Production dependencies, in manifest order
    pub dependencies: Vec<DependencyResult>,
    /// Dev dependencies, in manifest order; empty unless requested
    pub dev_dependencies: Vec<DependencyResult>,
    pub project_score: u8,
    pub project_grade: Grade,
    pub summary: ProjectSummary,
}

impl ProjectResult {
    /// Create an empty report
    pub fn new(project_name: String, project_path: String) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            project_name,
            project_path,
            timestamp: Utc::now(),
            dependencies: Vec::new(),
            dev_dependencies: Vec::new(),
            project_score: 0,
            project_grade: Grade::F,
            summary: ProjectSummary::default(),
        }
    }

    /// All analyzed dependencies, production first
    pub fn all_dependencies(&self) -> impl Iterator<Item = &DependencyResult> {
        self.dependencies.iter().chain(self.dev_dependencies.iter())
    }

    /// In-scope dependencies graded F
    pub fn failing(&self, include_dev: bool) -> Vec<&DependencyResult> {
        let dev: &[DependencyResult] = if include_dev {
            &self.dev_dependencies
        } else {
            &[]
        };
        self.dependencies
            .iter()
            .chain(dev.iter())
            .filter(|d| d.is_failing())
            .collect()
    }

    /// Compute summary statistics from dependencies
    pub fn compute_summary(&mut self) {
        let mut summary = ProjectSummary::default();

        for dep in self.dependencies.iter().chain(self.dev_dependencies.iter()) {
            summary.total_dependencies += 1;
            match dep.grade {
                Grade::A => summary.grade_a += 1,
                Grade::B => summary.grade_b += 1,
                Grade::C => summary.grade_c += 1,
                Grade::D => summary.grade_d += 1,
                Grade::F => summary.grade_f += 1,
            }
            if dep.error.is_some() {
                summary.unresolved += 1;
            }
            if dep.alternative.is_some() {
                summary.with_alternatives += 1;
            }
        }

        self.summary = summary;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_maintenance_status_boundaries() {
        assert_eq!(MaintenanceStatus::from_days(Some(0)), MaintenanceStatus::Active);
        assert_eq!(MaintenanceStatus::from_days(Some(179)), MaintenanceStatus::Active);
        assert_eq!(MaintenanceStatus::from_days(Some(180)), MaintenanceStatus::Stale);
        assert_eq!(MaintenanceStatus::from_days(Some(539)), MaintenanceStatus::Stale);
        assert_eq!(MaintenanceStatus::from_days(Some(540)), MaintenanceStatus::Abandoned);
        assert_eq!(MaintenanceStatus::from_days(None), MaintenanceStatus::Abandoned);
    }

    #[test]
    fn test_maintenance_signal_from_last_publish() {
        let now = Utc::now();
        let signal = MaintenanceSignal::from_last_publish(Some(now - Duration::days(200)), now);
        assert_eq!(signal.days_since_publish, Some(200));
        assert_eq!(signal.status, MaintenanceStatus::Stale);

        let unknown = MaintenanceSignal::from_last_publish(None, now);
        assert_eq!(unknown, MaintenanceSignal::unknown());
    }

    #[test]
    fn test_future_publish_date_counts_as_today() {
        let now = Utc::now();
        let signal = MaintenanceSignal::from_last_publish(Some(now + Duration::days(3)), now);
        assert_eq!(signal.days_since_publish, Some(0));
        assert_eq!(signal.status, MaintenanceStatus::Active);
    }

    #[test]
    fn test_security_from_severities() {
        let signal = SecuritySignal::from_severities(&[Severity::Low, Severity::High, Severity::Moderate]);
        assert_eq!(signal.vulnerability_count, 3);
        assert_eq!(signal.severity, Severity::High);
        assert_eq!(SecuritySignal::from_severities(&[]), SecuritySignal::clean());
    }

    #[test]
    fn test_enums_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&Trend::Declining).unwrap(), "\"declining\"");
        assert_eq!(serde_json::to_string(&Severity::Moderate).unwrap(), "\"moderate\"");
        assert_eq!(serde_json::to_string(&Grade::B).unwrap(), "\"B\"");
    }
}
