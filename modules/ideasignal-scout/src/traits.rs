// Trait boundaries for the idea pipeline.
//
// SignalFetcher puts every external data source behind one trait so the
// pipeline can run against MockFetcher with no network. Summarizer does the
// same for the language model.

use anyhow::Result;
use async_trait::async_trait;

use ideasignal_common::{CountFetch, DateRange, SignalResult, TrendFetch};

use crate::brief::BriefRequest;

/// Blog and cafe search providers counted toward the community channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CommunitySource {
    NaverBlog,
    NaverCafe,
    DaumBlog,
    DaumCafe,
}

impl CommunitySource {
    pub const ALL: [CommunitySource; 4] = [
        CommunitySource::NaverBlog,
        CommunitySource::NaverCafe,
        CommunitySource::DaumBlog,
        CommunitySource::DaumCafe,
    ];

    /// Display label used in community highlights.
    pub fn label(&self) -> &'static str {
        match self {
            CommunitySource::NaverBlog => "Naver Blog",
            CommunitySource::NaverCafe => "Naver Cafe",
            CommunitySource::DaumBlog => "Daum Blog",
            CommunitySource::DaumCafe => "Daum Cafe",
        }
    }

    /// Key shared with the trust table and `community_counts`.
    pub fn key(&self) -> &'static str {
        match self {
            CommunitySource::NaverBlog => "naver_blog",
            CommunitySource::NaverCafe => "naver_cafe",
            CommunitySource::DaumBlog => "daum_blog",
            CommunitySource::DaumCafe => "daum_cafe",
        }
    }
}

impl std::fmt::Display for CommunitySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

// ---------------------------------------------------------------------------
// SignalFetcher
// ---------------------------------------------------------------------------

/// One method per data source. Implementations never return an error: a
/// provider failure comes back as a failed result with empty data.
#[async_trait]
pub trait SignalFetcher: Send + Sync {
    /// Daily search-interest series for one keyword group.
    async fn trend(&self, group: &str, keywords: &[String], range: DateRange) -> TrendFetch;

    /// Recent news articles, newest first.
    async fn news(&self, query: &str, display: usize) -> SignalResult;

    async fn community(&self, source: CommunitySource, query: &str, size: usize) -> SignalResult;

    /// General web search. Blocked domains and sensitive titles are dropped.
    async fn web_search(&self, query: &str, num: usize) -> SignalResult;

    /// Social-forum search. Blocked communities and sensitive titles are dropped.
    async fn forum_search(&self, query: &str, limit: usize) -> SignalResult;

    /// Size of the national trending-video chart, capped at `max`.
    async fn trending_video_count(&self, max: usize) -> CountFetch;
}

// ---------------------------------------------------------------------------
// Summarizer
// ---------------------------------------------------------------------------

/// Turns a scored idea into the model's raw reply. Parsing the reply is the
/// caller's job.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, request: &BriefRequest) -> Result<String>;
}
