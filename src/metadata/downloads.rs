//! Fetch download counts from the npm downloads API

use super::client::NpmClient;
use crate::error::Result;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

const SERVICE: &str = "npm downloads API";

#[derive(Debug, Deserialize)]
struct PointResponse {
    downloads: u64,
}

#[derive(Debug, Deserialize)]
struct RangeResponse {
    #[serde(default)]
    downloads: Vec<DailyDownloads>,
}

#[derive(Debug, Deserialize)]
struct DailyDownloads {
    downloads: u64,
}

impl NpmClient {
    /// Total downloads over the last seven days
    pub async fn fetch_weekly_downloads(&self, name: &str) -> Result<u64> {
        debug!("Fetching weekly downloads for {}", name);
        let url = format!("{}/point/last-week/{}", self.downloads_url, name);
        let point: PointResponse = self.get_json(&url, SERVICE, name).await?;
        Ok(point.downloads)
    }

    /// Total downloads between `start` and `end`, both inclusive
    pub async fn fetch_downloads_between(
        &self,
        name: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<u64> {
        debug!("Fetching downloads for {} from {} to {}", name, start, end);
        let url = format!(
            "{}/range/{}:{}/{}",
            self.downloads_url,
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d"),
            name
        );
        let range: RangeResponse = self.get_json(&url, SERVICE, name).await?;
        Ok(range.downloads.iter().map(|d| d.downloads).sum())
    }
}
