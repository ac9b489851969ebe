//! Download popularity and its half-year trend

use crate::error::Result;
use crate::metadata::NpmClient;
use crate::types::{PopularitySignal, Trend};
use chrono::{Duration, NaiveDate};
use tracing::debug;

/// Days between the recent window and the comparison window
pub const TREND_LOOKBACK_DAYS: i64 = 182;
/// Percent change beyond which the trend is no longer stable
pub const TREND_THRESHOLD_PERCENT: f64 = 10.0;

/// Trend of `recent` downloads against `prior` downloads
pub fn derive_trend(recent: u64, prior: u64) -> (Trend, f64) {
    if prior == 0 {
        return if recent > 0 {
            (Trend::Growing, 100.0)
        } else {
            (Trend::Stable, 0.0)
        };
    }

    let change = (recent as f64 - prior as f64) / prior as f64 * 100.0;
    // Round half up on both signs: -10.05 becomes -10.0
    let percent = (change * 10.0 + 0.5).floor() / 10.0;

    let trend = if percent > TREND_THRESHOLD_PERCENT {
        Trend::Growing
    } else if percent < -TREND_THRESHOLD_PERCENT {
        Trend::Declining
    } else {
        Trend::Stable
    };
    (trend, percent)
}

/// Seven-day window ending `TREND_LOOKBACK_DAYS` before `today`
pub fn prior_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let end = today - Duration::days(TREND_LOOKBACK_DAYS);
    (end - Duration::days(6), end)
}

/// Fetch weekly downloads and the prior window concurrently.
///
/// Failing to fetch the weekly count fails the signal. Failing to fetch the
/// prior window only loses the trend, which is then reported as stable.
pub async fn extract(client: &NpmClient, name: &str, today: NaiveDate) -> Result<PopularitySignal> {
    let (start, end) = prior_window(today);
    let (recent, prior) = tokio::join!(
        client.fetch_weekly_downloads(name),
        client.fetch_downloads_between(name, start, end),
    );

    let weekly_downloads = recent?;
    let (trend, trend_percent) = match prior {
        Ok(prior) => derive_trend(weekly_downloads, prior),
        Err(e) => {
            debug!("No prior download window for {}: {}", name, e);
            (Trend::Stable, 0.0)
        }
    };

    Ok(PopularitySignal {
        weekly_downloads,
        trend,
        trend_percent,
    })
}
