use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use tracing::info;

use ideasignal_common::SignalItem;

use super::http_client;

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const SEARCH_URL: &str = "https://oauth.reddit.com/search";
const TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct Listing {
    #[serde(default)]
    data: ListingData,
}

#[derive(Debug, Default, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    #[serde(default)]
    data: Post,
}

#[derive(Debug, Default, Deserialize)]
struct Post {
    #[serde(default)]
    title: String,
    #[serde(default)]
    permalink: String,
    #[serde(default)]
    subreddit: String,
}

/// Application-only OAuth client. A fresh token is requested per search.
pub struct RedditClient {
    client_id: String,
    client_secret: String,
    user_agent: String,
    client: reqwest::Client,
}

impl RedditClient {
    pub fn new(client_id: &str, client_secret: &str, user_agent: &str) -> Self {
        Self {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            user_agent: user_agent.to_string(),
            client: http_client(TIMEOUT),
        }
    }

    async fn access_token(&self) -> Result<String> {
        let resp = self
            .client
            .post(TOKEN_URL)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .header("User-Agent", &self.user_agent)
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .context("Reddit token request failed")?
            .error_for_status()
            .context("Reddit token endpoint returned an error status")?;

        let token: TokenResponse = resp
            .json()
            .await
            .context("Failed to parse Reddit token response")?;
        if token.access_token.is_empty() {
            return Err(anyhow!("Reddit token response had no access_token"));
        }
        Ok(token.access_token)
    }

    /// Site-wide search over the past month, newest first.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<SignalItem>> {
        let token = self.access_token().await?;
        let limit = limit.to_string();

        let resp = self
            .client
            .get(SEARCH_URL)
            .bearer_auth(token)
            .header("User-Agent", &self.user_agent)
            .query(&[
                ("q", query),
                ("limit", limit.as_str()),
                ("sort", "new"),
                ("t", "month"),
                ("restrict_sr", "false"),
            ])
            .send()
            .await
            .context("Reddit search request failed")?
            .error_for_status()
            .context("Reddit search returned an error status")?;

        let listing: Listing = resp
            .json()
            .await
            .context("Failed to parse Reddit search response")?;

        let items = to_items(listing);
        info!(query, count = items.len(), "Reddit search complete");
        Ok(items)
    }
}

fn to_items(listing: Listing) -> Vec<SignalItem> {
    listing
        .data
        .children
        .into_iter()
        .map(|child| {
            let post = child.data;
            SignalItem::new(
                post.title,
                format!("https://www.reddit.com{}", post.permalink),
                "Reddit",
            )
            .with_origin(post.subreddit.to_lowercase())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn posts_carry_lowercased_subreddit() {
        let listing: Listing = serde_json::from_str(
            r#"{"kind": "Listing", "data": {"children": [
                {"kind": "t3", "data": {"title": "EV charging in Seoul",
                  "permalink": "/r/Korea/comments/abc/ev/", "subreddit": "Korea"}}
            ]}}"#,
        )
        .unwrap();
        let items = to_items(listing);
        assert_eq!(items[0].url, "https://www.reddit.com/r/Korea/comments/abc/ev/");
        assert_eq!(items[0].origin.as_deref(), Some("korea"));
        assert_eq!(items[0].date, None);
    }

    #[test]
    fn empty_listing_is_empty() {
        let listing: Listing = serde_json::from_str("{}").unwrap();
        assert!(to_items(listing).is_empty());
    }
}
