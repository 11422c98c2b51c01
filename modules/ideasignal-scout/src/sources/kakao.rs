use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use ideasignal_common::SignalItem;

use super::{http_client, strip_markup, DEFAULT_TIMEOUT};

const SEARCH_URL: &str = "https://dapi.kakao.com/v2/search";

/// Daum search endpoints served by the Kakao API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KakaoEndpoint {
    Blog,
    Cafe,
}

impl KakaoEndpoint {
    fn path(&self) -> &'static str {
        match self {
            KakaoEndpoint::Blog => "blog",
            KakaoEndpoint::Cafe => "cafe",
        }
    }

    fn publisher(&self) -> &'static str {
        match self {
            KakaoEndpoint::Blog => "Daum Blog",
            KakaoEndpoint::Cafe => "Daum Cafe",
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    documents: Vec<Document>,
}

#[derive(Debug, Deserialize)]
struct Document {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    datetime: String,
}

pub struct KakaoClient {
    rest_api_key: String,
    client: reqwest::Client,
}

impl KakaoClient {
    pub fn new(rest_api_key: &str) -> Self {
        Self {
            rest_api_key: rest_api_key.to_string(),
            client: http_client(DEFAULT_TIMEOUT),
        }
    }

    /// First page of results, most recent first.
    pub async fn search(
        &self,
        endpoint: KakaoEndpoint,
        query: &str,
        size: usize,
    ) -> Result<Vec<SignalItem>> {
        let size = size.to_string();

        let resp = self
            .client
            .get(format!("{SEARCH_URL}/{}", endpoint.path()))
            .header("Authorization", format!("KakaoAK {}", self.rest_api_key))
            .query(&[
                ("query", query),
                ("page", "1"),
                ("size", size.as_str()),
                ("sort", "recency"),
            ])
            .send()
            .await
            .with_context(|| format!("Kakao {} search request failed", endpoint.path()))?
            .error_for_status()
            .with_context(|| format!("Kakao {} search returned an error status", endpoint.path()))?;

        let data: SearchResponse = resp
            .json()
            .await
            .with_context(|| format!("Failed to parse Kakao {} response", endpoint.path()))?;

        let items = to_items(data, endpoint);
        info!(query, endpoint = endpoint.path(), count = items.len(), "Kakao search complete");
        Ok(items)
    }
}

fn to_items(data: SearchResponse, endpoint: KakaoEndpoint) -> Vec<SignalItem> {
    data.documents
        .into_iter()
        .map(|d| {
            SignalItem::new(strip_markup(&d.title), d.url, endpoint.publisher())
                .with_date(d.datetime)
        })
        .collect()
}
