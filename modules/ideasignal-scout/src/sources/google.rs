use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use ideasignal_common::SignalItem;

use super::{http_client, DEFAULT_TIMEOUT};

const CSE_URL: &str = "https://www.googleapis.com/customsearch/v1";

/// The API rejects `num` above 10.
const MAX_NUM: usize = 10;

#[derive(Debug, Deserialize)]
struct CseResponse {
    #[serde(default)]
    items: Vec<CseItem>,
}

#[derive(Debug, Deserialize)]
struct CseItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    pagemap: PageMap,
}

#[derive(Debug, Default, Deserialize)]
struct PageMap {
    #[serde(default)]
    metatags: Vec<HashMap<String, serde_json::Value>>,
}

impl CseItem {
    fn published_time(&self) -> String {
        self.pagemap
            .metatags
            .first()
            .and_then(|tags| tags.get("article:published_time"))
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string()
    }
}

pub struct GoogleSearcher {
    api_key: String,
    cse_id: String,
    client: reqwest::Client,
}

impl GoogleSearcher {
    pub fn new(api_key: &str, cse_id: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            cse_id: cse_id.to_string(),
            client: http_client(DEFAULT_TIMEOUT),
        }
    }

    pub async fn search(&self, query: &str, num: usize) -> Result<Vec<SignalItem>> {
        let num = num.min(MAX_NUM).to_string();

        let resp = self
            .client
            .get(CSE_URL)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.cse_id.as_str()),
                ("q", query),
                ("num", num.as_str()),
            ])
            .send()
            .await
            .context("Google CSE request failed")?
            .error_for_status()
            .context("Google CSE returned an error status")?;

        let data: CseResponse = resp
            .json()
            .await
            .context("Failed to parse Google CSE response")?;

        let items = to_items(data);
        info!(query, count = items.len(), "Google search complete");
        Ok(items)
    }
}

fn to_items(data: CseResponse) -> Vec<SignalItem> {
    data.items
        .into_iter()
        .map(|it| {
            let date = it.published_time();
            SignalItem::new(it.title, it.link, "Google").with_date(date)
        })
        .collect()
}
