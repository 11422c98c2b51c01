use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use super::{http_client, DEFAULT_TIMEOUT};

const VIDEOS_URL: &str = "https://www.googleapis.com/youtube/v3/videos";

/// Count is capped here regardless of the requested chart size.
const MAX_COUNT: usize = 100;

#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

pub struct YouTubeClient {
    api_key: String,
    client: reqwest::Client,
}

impl YouTubeClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            client: http_client(DEFAULT_TIMEOUT),
        }
    }

    /// Number of videos on the Korean most-popular chart.
    pub async fn trending_count(&self, max_results: usize) -> Result<usize> {
        let max_results = max_results.to_string();

        let resp = self
            .client
            .get(VIDEOS_URL)
            .query(&[
                ("part", "snippet,statistics"),
                ("chart", "mostPopular"),
                ("regionCode", "KR"),
                ("maxResults", max_results.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .context("YouTube videos request failed")?
            .error_for_status()
            .context("YouTube videos returned an error status")?;

        let data: VideosResponse = resp
            .json()
            .await
            .context("Failed to parse YouTube videos response")?;

        let count = data.items.len().min(MAX_COUNT);
        info!(count, "YouTube trending chart fetched");
        Ok(count)
    }
}
