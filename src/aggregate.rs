//! Project-level aggregation of dependency scores

use crate::scoring::determine_grade;
use crate::types::{DependencyResult, Grade};

/// Weight of a production dependency in the project score
pub const PRODUCTION_WEIGHT: f64 = 1.0;
/// Weight of a dev dependency in the project score
pub const DEV_WEIGHT: f64 = 0.5;

/// Weighted mean of production and dev scores, rounded; 0 when both are empty
pub fn weighted_score(production: &[u8], dev: &[u8]) -> u8 {
    let weighted = production
        .iter()
        .map(|&s| (s, PRODUCTION_WEIGHT))
        .chain(dev.iter().map(|&s| (s, DEV_WEIGHT)));

    let (sum, total_weight) = weighted.fold((0.0, 0.0), |(sum, weight), (score, w)| {
        (sum + f64::from(score) * w, weight + w)
    });

    if total_weight == 0.0 {
        return 0;
    }

    (sum / total_weight).round().clamp(0.0, 100.0) as u8
}

/// Project score over analyzed production and dev dependencies
pub fn project_score(production: &[DependencyResult], dev: &[DependencyResult]) -> u8 {
    let production: Vec<u8> = production.iter().map(|d| d.score).collect();
    let dev: Vec<u8> = dev.iter().map(|d| d.score).collect();
    weighted_score(&production, &dev)
}

/// Project score together with its grade
pub fn project_grade(production: &[DependencyResult], dev: &[DependencyResult]) -> (u8, Grade) {
    let score = project_score(production, dev);
    (score, determine_grade(score))
}
