use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

use ideasignal_common::{
    Config, CountFetch, DateRange, FilterConfig, SignalItem, SignalResult, TrendFetch,
};

use super::google::GoogleSearcher;
use super::kakao::{KakaoClient, KakaoEndpoint};
use super::naver::{NaverClient, NaverEndpoint};
use super::reddit::RedditClient;
use super::youtube::YouTubeClient;
use super::{forum_item_allowed, web_item_allowed};
use crate::traits::{CommunitySource, SignalFetcher};

/// `SignalFetcher` over the real providers. A provider without credentials
/// is `None` and every call to it returns a failed result without a request.
pub struct LiveFetcher {
    naver: Option<NaverClient>,
    kakao: Option<KakaoClient>,
    google: Option<GoogleSearcher>,
    reddit: Option<RedditClient>,
    youtube: Option<YouTubeClient>,
    filters: Arc<FilterConfig>,
}

impl LiveFetcher {
    pub fn new(config: &Config, filters: Arc<FilterConfig>) -> Self {
        Self {
            naver: config
                .has_naver()
                .then(|| NaverClient::new(&config.naver_client_id, &config.naver_client_secret)),
            kakao: config
                .has_kakao()
                .then(|| KakaoClient::new(&config.kakao_rest_api_key)),
            google: config
                .has_google()
                .then(|| GoogleSearcher::new(&config.google_api_key, &config.google_cse_id)),
            reddit: config.has_reddit().then(|| {
                RedditClient::new(
                    &config.reddit_client_id,
                    &config.reddit_client_secret,
                    &config.reddit_user_agent,
                )
            }),
            youtube: config
                .has_youtube()
                .then(|| YouTubeClient::new(&config.youtube_api_key)),
            filters,
        }
    }
}

fn not_configured(provider: &str) -> String {
    format!("{provider} credentials not configured")
}

/// Convert a provider call into a result value, logging the failure.
fn settle(source: &str, query: &str, outcome: Result<Vec<SignalItem>>) -> SignalResult {
    match outcome {
        Ok(items) => SignalResult::ok(items),
        Err(e) => {
            warn!(source, query, error = %e, "Fetch failed");
            SignalResult::failed(format!("{e:#}"))
        }
    }
}

#[async_trait]
impl SignalFetcher for LiveFetcher {
    async fn trend(&self, group: &str, keywords: &[String], range: DateRange) -> TrendFetch {
        let Some(naver) = &self.naver else {
            return TrendFetch::failed(not_configured("Naver"));
        };
        match naver.trend(group, keywords, range).await {
            Ok(series) => TrendFetch::ok(series),
            Err(e) => {
                warn!(source = "naver_datalab", group, error = %e, "Fetch failed");
                TrendFetch::failed(format!("{e:#}"))
            }
        }
    }

    async fn news(&self, query: &str, display: usize) -> SignalResult {
        let Some(naver) = &self.naver else {
            return SignalResult::failed(not_configured("Naver"));
        };
        settle(
            "naver_news",
            query,
            naver.search(NaverEndpoint::News, query, display).await,
        )
    }

    async fn community(&self, source: CommunitySource, query: &str, size: usize) -> SignalResult {
        let outcome = match source {
            CommunitySource::NaverBlog | CommunitySource::NaverCafe => {
                let Some(naver) = &self.naver else {
                    return SignalResult::failed(not_configured("Naver"));
                };
                let endpoint = if source == CommunitySource::NaverBlog {
                    NaverEndpoint::Blog
                } else {
                    NaverEndpoint::CafeArticle
                };
                naver.search(endpoint, query, size).await
            }
            CommunitySource::DaumBlog | CommunitySource::DaumCafe => {
                let Some(kakao) = &self.kakao else {
                    return SignalResult::failed(not_configured("Kakao"));
                };
                let endpoint = if source == CommunitySource::DaumBlog {
                    KakaoEndpoint::Blog
                } else {
                    KakaoEndpoint::Cafe
                };
                kakao.search(endpoint, query, size).await
            }
        };
        settle(source.key(), query, outcome)
    }

    async fn web_search(&self, query: &str, num: usize) -> SignalResult {
        let Some(google) = &self.google else {
            return SignalResult::failed(not_configured("Google"));
        };
        settle("google", query, google.search(query, num).await)
            .retain(|item| web_item_allowed(item, &self.filters))
    }

    async fn forum_search(&self, query: &str, limit: usize) -> SignalResult {
        let Some(reddit) = &self.reddit else {
            return SignalResult::failed(not_configured("Reddit"));
        };
        settle("reddit", query, reddit.search(query, limit).await)
            .retain(|item| forum_item_allowed(item, &self.filters))
    }

    async fn trending_video_count(&self, max: usize) -> CountFetch {
        let Some(youtube) = &self.youtube else {
            return CountFetch::failed(not_configured("YouTube"));
        };
        match youtube.trending_count(max).await {
            Ok(count) => CountFetch::ok(count),
            Err(e) => {
                warn!(source = "youtube", error = %e, "Fetch failed");
                CountFetch::failed(format!("{e:#}"))
            }
        }
    }
}
