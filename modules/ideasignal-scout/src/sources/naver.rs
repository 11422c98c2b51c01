use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use ideasignal_common::{DateRange, SignalItem, TrendPoint};

use super::{http_client, strip_markup, DEFAULT_TIMEOUT};

const DATALAB_URL: &str = "https://openapi.naver.com/v1/datalab/search";
const SEARCH_URL: &str = "https://openapi.naver.com/v1/search";

/// Search endpoints used by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NaverEndpoint {
    News,
    Blog,
    CafeArticle,
}

impl NaverEndpoint {
    fn path(&self) -> &'static str {
        match self {
            NaverEndpoint::News => "news",
            NaverEndpoint::Blog => "blog",
            NaverEndpoint::CafeArticle => "cafearticle",
        }
    }

    fn publisher(&self) -> &'static str {
        match self {
            NaverEndpoint::News => "Naver News",
            NaverEndpoint::Blog => "Naver Blog",
            NaverEndpoint::CafeArticle => "Naver Cafe",
        }
    }
}

// --- DataLab ---

#[derive(Debug, Deserialize)]
struct DatalabResponse {
    #[serde(default)]
    results: Vec<DatalabGroup>,
}

#[derive(Debug, Deserialize)]
struct DatalabGroup {
    #[serde(default)]
    data: Vec<DatalabRow>,
}

#[derive(Debug, Deserialize)]
struct DatalabRow {
    #[serde(default)]
    period: String,
    #[serde(default)]
    ratio: f64,
}

// --- Search ---

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    /// News only, RFC 2822.
    #[serde(default, rename = "pubDate")]
    pub_date: String,
    /// Blog only, `YYYYMMDD`.
    #[serde(default)]
    postdate: String,
}

pub struct NaverClient {
    client_id: String,
    client_secret: String,
    client: reqwest::Client,
}

impl NaverClient {
    pub fn new(client_id: &str, client_secret: &str) -> Self {
        Self {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            client: http_client(DEFAULT_TIMEOUT),
        }
    }

    /// Daily relative search interest (0–100) for one keyword group.
    pub async fn trend(
        &self,
        group: &str,
        keywords: &[String],
        range: DateRange,
    ) -> Result<Vec<TrendPoint>> {
        let body = serde_json::json!({
            "startDate": range.start_str(),
            "endDate": range.end_str(),
            "timeUnit": "date",
            "keywordGroups": [{"groupName": group, "keywords": keywords}],
        });

        let resp = self
            .client
            .post(DATALAB_URL)
            .header("X-Naver-Client-Id", &self.client_id)
            .header("X-Naver-Client-Secret", &self.client_secret)
            .json(&body)
            .send()
            .await
            .context("Naver DataLab request failed")?
            .error_for_status()
            .context("Naver DataLab returned an error status")?;

        let data: DatalabResponse = resp
            .json()
            .await
            .context("Failed to parse Naver DataLab response")?;

        let series = parse_series(data);
        info!(group, points = series.len(), "Naver DataLab trend fetched");
        Ok(series)
    }

    pub async fn search(
        &self,
        endpoint: NaverEndpoint,
        query: &str,
        display: usize,
    ) -> Result<Vec<SignalItem>> {
        let url = format!("{SEARCH_URL}/{}.json", endpoint.path());
        let display = display.to_string();

        let resp = self
            .client
            .get(&url)
            .header("X-Naver-Client-Id", &self.client_id)
            .header("X-Naver-Client-Secret", &self.client_secret)
            .query(&[("query", query), ("display", display.as_str()), ("sort", "date")])
            .send()
            .await
            .with_context(|| format!("Naver {} search request failed", endpoint.path()))?
            .error_for_status()
            .with_context(|| format!("Naver {} search returned an error status", endpoint.path()))?;

        let data: SearchResponse = resp
            .json()
            .await
            .with_context(|| format!("Failed to parse Naver {} response", endpoint.path()))?;

        let items: Vec<SignalItem> = data
            .items
            .into_iter()
            .map(|it| to_item(it, endpoint))
            .collect();
        info!(query, endpoint = endpoint.path(), count = items.len(), "Naver search complete");
        Ok(items)
    }
}

/// First keyword group's rows, in provider order (ascending by date).
fn parse_series(data: DatalabResponse) -> Vec<TrendPoint> {
    data.results
        .into_iter()
        .next()
        .map(|group| {
            group
                .data
                .into_iter()
                .map(|row| TrendPoint {
                    date: row.period,
                    value: row.ratio.max(0.0),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn to_item(it: SearchItem, endpoint: NaverEndpoint) -> SignalItem {
    let date = if it.pub_date.is_empty() {
        it.postdate
    } else {
        it.pub_date
    };
    SignalItem::new(strip_markup(&it.title), it.link, endpoint.publisher()).with_date(date)
}
