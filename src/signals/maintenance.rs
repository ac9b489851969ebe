//! Maintenance recency from publish timestamps

use crate::metadata::Packument;
use crate::types::MaintenanceSignal;
use chrono::{DateTime, Utc};

/// Maintenance signal for a packument, relative to `now`
pub fn extract(packument: &Packument, now: DateTime<Utc>) -> MaintenanceSignal {
    MaintenanceSignal::from_last_publish(packument.last_publish_date(), now)
}
