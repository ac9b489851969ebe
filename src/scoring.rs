//! Health scoring for a single dependency
//!
//! Five buckets are summed into a 0-100 score:
//!
//! | bucket      | max |
//! |-------------|-----|
//! | maintenance | 30  |
//! | popularity  | 20  |
//! | size        | 15  |
//! | security    | 25  |
//! | trend       | 10  |
//!
//! An absent signal contributes nothing. A size signal reporting an unknown
//! size (0 bytes) still earns partial credit.

use crate::types::{
    Grade, MaintenanceSignal, MaintenanceStatus, PopularitySignal, ScoreBreakdown,
    SecuritySignal, Severity, SignalBundle, SizeSignal, Trend,
};

const KIB: u64 = 1024;
const MIB: u64 = 1024 * 1024;

/// Points for a size signal whose size could not be determined
pub const UNKNOWN_SIZE_POINTS: u8 = 8;

/// Calculate overall health score for a dependency
pub fn calculate_score(signals: &SignalBundle) -> u8 {
    let total = calculate_breakdown(signals).total();
    total.clamp(0, 100) as u8
}

/// Per-bucket points for a signal bundle
pub fn calculate_breakdown(signals: &SignalBundle) -> ScoreBreakdown {
    ScoreBreakdown {
        maintenance: maintenance_points(signals.maintenance.as_ref()),
        popularity: popularity_points(signals.popularity.as_ref()),
        size: size_points(signals.size.as_ref()),
        security: security_points(signals.security.as_ref()),
        trend: trend_points(signals.popularity.as_ref()),
    }
}

/// Map a score to its letter grade
pub fn determine_grade(score: u8) -> Grade {
    if score >= 80 {
        Grade::A
    } else if score >= 60 {
        Grade::B
    } else if score >= 40 {
        Grade::C
    } else if score >= 20 {
        Grade::D
    } else {
        Grade::F
    }
}

fn maintenance_points(signal: Option<&MaintenanceSignal>) -> u8 {
    match signal.map(|m| m.status) {
        Some(MaintenanceStatus::Active) => 30,
        Some(MaintenanceStatus::Stale) => 15,
        Some(MaintenanceStatus::Abandoned) | None => 0,
    }
}

fn popularity_points(signal: Option<&PopularitySignal>) -> u8 {
    let Some(popularity) = signal else {
        return 0;
    };

    let downloads = popularity.weekly_downloads;
    if downloads > 1_000_000 {
        20
    } else if downloads > 100_000 {
        15
    } else if downloads > 10_000 {
        10
    } else if downloads > 1_000 {
        5
    } else {
        0
    }
}

fn size_points(signal: Option<&SizeSignal>) -> u8 {
    let Some(size) = signal else {
        return 0;
    };

    let bytes = size.unpacked_size_bytes;
    if bytes == 0 {
        UNKNOWN_SIZE_POINTS
    } else if bytes < 100 * KIB {
        15
    } else if bytes < 500 * KIB {
        12
    } else if bytes < MIB {
        8
    } else if bytes < 5 * MIB {
        4
    } else {
        0
    }
}

fn security_points(signal: Option<&SecuritySignal>) -> u8 {
    match signal.map(|s| s.severity) {
        Some(Severity::None) => 25,
        Some(Severity::Low) => 15,
        Some(Severity::Moderate) => 8,
        Some(Severity::High) => 2,
        Some(Severity::Critical) | None => 0,
    }
}

fn trend_points(signal: Option<&PopularitySignal>) -> u8 {
    match signal.map(|p| p.trend) {
        Some(Trend::Growing) => 10,
        Some(Trend::Stable) => 7,
        Some(Trend::Declining) => 2,
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn maintenance(status: MaintenanceStatus) -> Option<MaintenanceSignal> {
        let days = match status {
            MaintenanceStatus::Active => Some(10),
            MaintenanceStatus::Stale => Some(300),
            MaintenanceStatus::Abandoned => Some(1000),
        };
        Some(MaintenanceSignal {
            last_publish_date: None,
            days_since_publish: days,
            status,
        })
    }

    fn popularity(weekly_downloads: u64, trend: Trend) -> Option<PopularitySignal> {
        Some(PopularitySignal {
            weekly_downloads,
            trend,
            trend_percent: 0.0,
        })
    }

    fn size(bytes: u64) -> Option<SizeSignal> {
        Some(SizeSignal {
            unpacked_size_bytes: bytes,
            unpacked_size_human: String::new(),
        })
    }

    fn security(severity: Severity) -> Option<SecuritySignal> {
        Some(SecuritySignal {
            vulnerability_count: u32::from(severity != Severity::None),
            severity,
        })
    }

    fn bundle(
        m: MaintenanceStatus,
        downloads: u64,
        trend: Trend,
        bytes: u64,
        severity: Severity,
    ) -> SignalBundle {
        SignalBundle {
            maintenance: maintenance(m),
            popularity: popularity(downloads, trend),
            size: size(bytes),
            security: security(severity),
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_perfect_signals() {
        let signals = bundle(
            MaintenanceStatus::Active,
            2_000_000,
            Trend::Growing,
            50_000,
            Severity::None,
        );
        let score = calculate_score(&signals);
        assert_eq!(score, 100);
        assert_eq!(determine_grade(score), Grade::A);
    }

    #[test]
    fn test_worst_signals() {
        let signals = bundle(
            MaintenanceStatus::Abandoned,
            50,
            Trend::Declining,
            10_000_000,
            Severity::Critical,
        );
        let breakdown = calculate_breakdown(&signals);
        assert_eq!(
            breakdown,
            ScoreBreakdown {
                maintenance: 0,
                popularity: 0,
                size: 0,
                security: 0,
                trend: 2,
            }
        );
        assert_eq!(calculate_score(&signals), 2);
        assert_eq!(determine_grade(2), Grade::F);
    }

    #[test]
    fn test_mixed_signals() {
        let signals = bundle(
            MaintenanceStatus::Stale,
            50_000,
            Trend::Stable,
            200_000,
            Severity::Moderate,
        );
        assert_eq!(
            calculate_breakdown(&signals),
            ScoreBreakdown {
                maintenance: 15,
                popularity: 10,
                size: 12,
                security: 8,
                trend: 7,
            }
        );
        assert_eq!(calculate_score(&signals), 52);
        assert_eq!(determine_grade(52), Grade::C);
    }

    #[test]
    fn test_empty_bundle_scores_zero() {
        let signals = SignalBundle::default();
        assert_eq!(calculate_score(&signals), 0);
        assert_eq!(determine_grade(0), Grade::F);
    }

    #[test]
    fn test_popularity_boundaries_are_strict() {
        assert_eq!(popularity_points(popularity(1_000_001, Trend::Stable).as_ref()), 20);
        assert_eq!(popularity_points(popularity(1_000_000, Trend::Stable).as_ref()), 15);
        assert_eq!(popularity_points(popularity(100_000, Trend::Stable).as_ref()), 10);
        assert_eq!(popularity_points(popularity(10_000, Trend::Stable).as_ref()), 5);
        assert_eq!(popularity_points(popularity(1_001, Trend::Stable).as_ref()), 5);
        assert_eq!(popularity_points(popularity(1_000, Trend::Stable).as_ref()), 0);
        assert_eq!(popularity_points(None), 0);
    }

    #[test]
    fn test_size_boundaries_are_strict() {
        assert_eq!(size_points(size(100 * 1024 - 1).as_ref()), 15);
        assert_eq!(size_points(size(100 * 1024).as_ref()), 12);
        assert_eq!(size_points(size(500 * 1024).as_ref()), 8);
        assert_eq!(size_points(size(1024 * 1024).as_ref()), 4);
        assert_eq!(size_points(size(5 * 1024 * 1024).as_ref()), 0);
    }

    #[test]
    fn test_unknown_size_gets_partial_credit() {
        assert_eq!(size_points(size(0).as_ref()), UNKNOWN_SIZE_POINTS);
        assert_eq!(size_points(None), 0);
    }

    #[test]
    fn test_whole_score_at_download_boundary() {
        let at = bundle(MaintenanceStatus::Active, 1_000_000, Trend::Growing, 50_000, Severity::None);
        let above = bundle(MaintenanceStatus::Active, 1_000_001, Trend::Growing, 50_000, Severity::None);
        assert_eq!(calculate_score(&at), 95);
        assert_eq!(calculate_score(&above), 100);

        let at_100k = bundle(MaintenanceStatus::Active, 100_000, Trend::Growing, 50_000, Severity::None);
        assert_eq!(calculate_breakdown(&at_100k).popularity, 10);
    }

    #[test]
    fn test_whole_score_at_size_boundary() {
        let signals = bundle(MaintenanceStatus::Active, 2_000_000, Trend::Growing, 100 * 1024, Severity::None);
        assert_eq!(calculate_breakdown(&signals).size, 12);
        assert_eq!(calculate_score(&signals), 97);
    }

    #[test]
    fn test_security_bands() {
        assert_eq!(security_points(security(Severity::None).as_ref()), 25);
        assert_eq!(security_points(security(Severity::Low).as_ref()), 15);
        assert_eq!(security_points(security(Severity::Moderate).as_ref()), 8);
        assert_eq!(security_points(security(Severity::High).as_ref()), 2);
        assert_eq!(security_points(security(Severity::Critical).as_ref()), 0);
        assert_eq!(security_points(None), 0);
    }

    #[test]
    fn test_trend_requires_popularity() {
        let mut signals = bundle(MaintenanceStatus::Active, 5_000, Trend::Growing, 1, Severity::None);
        assert_eq!(calculate_breakdown(&signals).trend, 10);
        signals.popularity = None;
        assert_eq!(calculate_breakdown(&signals).trend, 0);
        assert_eq!(calculate_breakdown(&signals).popularity, 0);
    }

    #[test]
    fn test_missing_security_contributes_zero() {
        let mut signals = bundle(MaintenanceStatus::Active, 2_000_000, Trend::Growing, 50_000, Severity::None);
        signals.security = None;
        assert_eq!(calculate_score(&signals), 75);
        assert_eq!(determine_grade(75), Grade::B);
    }

    #[test]
    fn test_worst_case_bundle() {
        // abandoned, 0 downloads + stable, unknown size, clean security
        assert_eq!(calculate_score(&SignalBundle::worst_case()), 40);
    }

    #[test]
    fn test_grade_boundaries() {
        assert_eq!(determine_grade(100), Grade::A);
        assert_eq!(determine_grade(80), Grade::A);
        assert_eq!(determine_grade(79), Grade::B);
        assert_eq!(determine_grade(60), Grade::B);
        assert_eq!(determine_grade(59), Grade::C);
        assert_eq!(determine_grade(40), Grade::C);
        assert_eq!(determine_grade(39), Grade::D);
        assert_eq!(determine_grade(20), Grade::D);
        assert_eq!(determine_grade(19), Grade::F);
        assert_eq!(determine_grade(0), Grade::F);
    }

    #[test]
    fn test_scoring_is_repeatable() {
        let signals = bundle(MaintenanceStatus::Stale, 50_000, Trend::Stable, 200_000, Severity::Moderate);
        let first = calculate_score(&signals);
        for _ in 0..10 {
            assert_eq!(calculate_score(&signals), first);
        }
    }

    #[test]
    fn test_score_always_in_range() {
        let statuses = [MaintenanceStatus::Active, MaintenanceStatus::Stale, MaintenanceStatus::Abandoned];
        let trends = [Trend::Growing, Trend::Stable, Trend::Declining];
        let severities = [Severity::None, Severity::Low, Severity::Moderate, Severity::High, Severity::Critical];

        for status in statuses {
            for trend in trends {
                for severity in severities {
                    for downloads in [0, 1_500, 20_000, 200_000, 5_000_000] {
                        for bytes in [0, 10, 200 * 1024, 800 * 1024, 2 * MIB, 50 * MIB] {
                            let score = calculate_score(&bundle(status, downloads, trend, bytes, severity));
                            assert!(score <= 100);
                        }
                    }
                }
            }
        }
    }
}
