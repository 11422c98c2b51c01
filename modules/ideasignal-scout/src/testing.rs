// Test mocks for the idea pipeline.
//
// - MockFetcher (SignalFetcher): per-keyword canned results, failed by default
// - MockSummarizer (Summarizer): fixed reply or error, records requests
//
// Plus helpers for building trend series and search items.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use ideasignal_common::{CountFetch, DateRange, SignalItem, SignalResult, TrendFetch, TrendPoint};

use crate::brief::BriefRequest;
use crate::traits::{CommunitySource, SignalFetcher, Summarizer};

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

/// HashMap-based fetcher keyed by query. Anything not registered comes back
/// as a failed result, the same as an unconfigured provider.
/// Builder pattern: `.on_trend()`, `.on_news()`, `.on_community()`, ...
#[derive(Default)]
pub struct MockFetcher {
    trends: HashMap<String, Vec<TrendPoint>>,
    news: HashMap<String, Vec<SignalItem>>,
    community: HashMap<(CommunitySource, String), Vec<SignalItem>>,
    web: HashMap<String, Vec<SignalItem>>,
    forum: HashMap<String, Vec<SignalItem>>,
    video_count: Option<usize>,
    calls: Mutex<Vec<String>>,
    trend_keywords: Mutex<Vec<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_trend(mut self, group: &str, series: Vec<TrendPoint>) -> Self {
        self.trends.insert(group.to_string(), series);
        self
    }

    pub fn on_news(mut self, query: &str, items: Vec<SignalItem>) -> Self {
        self.news.insert(query.to_string(), items);
        self
    }

    pub fn on_community(
        mut self,
        source: CommunitySource,
        query: &str,
        items: Vec<SignalItem>,
    ) -> Self {
        self.community.insert((source, query.to_string()), items);
        self
    }

    pub fn on_web_search(mut self, query: &str, items: Vec<SignalItem>) -> Self {
        self.web.insert(query.to_string(), items);
        self
    }

    pub fn on_forum_search(mut self, query: &str, items: Vec<SignalItem>) -> Self {
        self.forum.insert(query.to_string(), items);
        self
    }

    pub fn with_video_count(mut self, count: usize) -> Self {
        self.video_count = Some(count);
        self
    }

    /// Method names in call order, e.g. `"news:전기차 충전"`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Keyword lists passed to `trend`, one per call.
    pub fn trend_keywords(&self) -> Vec<Vec<String>> {
        self.trend_keywords.lock().map(|k| k.clone()).unwrap_or_default()
    }

    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

fn lookup(map: &HashMap<String, Vec<SignalItem>>, query: &str, limit: usize) -> SignalResult {
    match map.get(query) {
        Some(items) => SignalResult::ok(items.iter().take(limit).cloned().collect()),
        None => SignalResult::failed(format!("MockFetcher: nothing registered for {query}")),
    }
}

#[async_trait]
impl SignalFetcher for MockFetcher {
    async fn trend(&self, group: &str, keywords: &[String], _range: DateRange) -> TrendFetch {
        self.record(format!("trend:{group}"));
        if let Ok(mut seen) = self.trend_keywords.lock() {
            seen.push(keywords.to_vec());
        }
        match self.trends.get(group) {
            Some(series) => TrendFetch::ok(series.clone()),
            None => TrendFetch::failed(format!("MockFetcher: no trend registered for {group}")),
        }
    }

    async fn news(&self, query: &str, display: usize) -> SignalResult {
        self.record(format!("news:{query}"));
        lookup(&self.news, query, display)
    }

    async fn community(&self, source: CommunitySource, query: &str, size: usize) -> SignalResult {
        self.record(format!("{source}:{query}"));
        match self.community.get(&(source, query.to_string())) {
            Some(items) => SignalResult::ok(items.iter().take(size).cloned().collect()),
            None => {
                SignalResult::failed(format!("MockFetcher: no {source} registered for {query}"))
            }
        }
    }

    async fn web_search(&self, query: &str, num: usize) -> SignalResult {
        self.record(format!("web_search:{query}"));
        lookup(&self.web, query, num)
    }

    async fn forum_search(&self, query: &str, limit: usize) -> SignalResult {
        self.record(format!("forum_search:{query}"));
        lookup(&self.forum, query, limit)
    }

    async fn trending_video_count(&self, max: usize) -> CountFetch {
        self.record("trending_video_count".to_string());
        match self.video_count {
            Some(count) => CountFetch::ok(count.min(max)),
            None => CountFetch::failed("MockFetcher: no video count registered"),
        }
    }
}

// ---------------------------------------------------------------------------
// MockSummarizer
// ---------------------------------------------------------------------------

/// Returns a fixed reply (or error) and keeps every request it receives.
pub struct MockSummarizer {
    reply: Result<String, String>,
    requests: Mutex<Vec<BriefRequest>>,
}

impl MockSummarizer {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Ok(reply.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            reply: Err(reason.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<BriefRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Summarizer for MockSummarizer {
    async fn summarize(&self, request: &BriefRequest) -> Result<String> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        self.reply.clone().map_err(|e| anyhow!(e))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Daily series starting 2025-03-01 with the given values.
pub fn trend_series(values: &[f64]) -> Vec<TrendPoint> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| TrendPoint {
            date: format!("2025-03-{:02}", (i % 31) + 1),
            value: *v,
        })
        .collect()
}

/// `n` items titled `"{prefix} {i}"` on distinct hosts `{prefix}{i}.example.com`.
pub fn search_items(prefix: &str, publisher: &str, n: usize) -> Vec<SignalItem> {
    (0..n)
        .map(|i| {
            SignalItem::new(
                format!("{prefix} {i}"),
                format!("https://{prefix}{i}.example.com/post/{i}"),
                publisher,
            )
            .with_date("2025-03-28")
        })
        .collect()
}

/// A brief reply the strict parser accepts.
pub fn valid_brief_reply() -> String {
    serde_json::json!({
        "one_liner": "아파트 충전 예약 서비스",
        "summary": "충전 대기 불만이 늘고 있다 [1].",
        "why_now": "완속 충전기 보급 확대 [2].",
        "gtm_tactics": ["관리사무소 제휴", "입주민 커뮤니티 홍보"],
        "market": "확실하지 않음",
        "risks": "충전 사업자 정책 변경",
        "validation_steps": ["대기 시간 설문", "예약 랜딩 페이지 전환율"],
    })
    .to_string()
}
