use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

// --- Input ---

fn default_category() -> String {
    "generic".to_string()
}

/// One keyword group to research. Loaded once per run from the keyword file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordEntry {
    /// Primary query term; also the idea title.
    pub keyword_group: String,
    /// Synonyms submitted together to the trend index.
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_category")]
    pub category: String,
}

impl KeywordEntry {
    pub fn new(keyword_group: impl Into<String>) -> Self {
        Self {
            keyword_group: keyword_group.into(),
            keywords: Vec::new(),
            tags: Vec::new(),
            category: default_category(),
        }
    }

    /// Terms for the trend lookup. Falls back to the group itself so the
    /// provider never receives an empty keyword list.
    pub fn trend_keywords(&self) -> Vec<String> {
        if self.keywords.is_empty() {
            vec![self.keyword_group.clone()]
        } else {
            self.keywords.clone()
        }
    }
}

/// On-disk shape of the keyword file: `{"entries": [...]}`.
#[derive(Debug, Clone, Deserialize)]
pub struct KeywordFile {
    pub entries: Vec<KeywordEntry>,
}

// --- Fetch results ---

/// A single search hit, normalized across providers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalItem {
    pub title: String,
    pub url: String,
    pub publisher: String,
    #[serde(default)]
    pub date: Option<String>,
    /// Sub-community the item came from (subreddit name for forum posts).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

impl SignalItem {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        publisher: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            publisher: publisher.into(),
            date: None,
            origin: None,
        }
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        let date = date.into();
        self.date = if date.is_empty() { None } else { Some(date) };
        self
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }
}

/// Outcome of one provider call: either items or an explicit failure reason.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalResult {
    items: Vec<SignalItem>,
    error: Option<String>,
}

impl SignalResult {
    pub fn ok(items: Vec<SignalItem>) -> Self {
        Self { items, error: None }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            error: Some(reason.into()),
        }
    }

    pub fn items(&self) -> &[SignalItem] {
        &self.items
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Keep only items matching `keep`. A failed result stays failed.
    pub fn retain(mut self, keep: impl FnMut(&SignalItem) -> bool) -> Self {
        self.items.retain(keep);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
    pub value: f64,
}

/// Daily search-interest series, ascending by date. Empty on provider failure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrendFetch {
    pub series: Vec<TrendPoint>,
    pub error: Option<String>,
}

impl TrendFetch {
    pub fn ok(series: Vec<TrendPoint>) -> Self {
        Self {
            series,
            error: None,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            series: Vec::new(),
            error: Some(reason.into()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Size of a chart that is not query-specific. Zero on provider failure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountFetch {
    pub count: usize,
    pub error: Option<String>,
}

impl CountFetch {
    pub fn ok(count: usize) -> Self {
        Self { count, error: None }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            count: 0,
            error: Some(reason.into()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

const KST_OFFSET_HOURS: i64 = 9;

/// Trend providers only keep a few years of daily data.
pub const MAX_RANGE_DAYS: u64 = 3650;

/// Inclusive date window for the trend lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Window of `days` ending today in Korea Standard Time (UTC+9).
    pub fn ending_today_kst(days: u64) -> Self {
        let end = (Utc::now() + Duration::hours(KST_OFFSET_HOURS)).date_naive();
        Self::ending_on(end, days)
    }

    pub fn ending_on(end: NaiveDate, days: u64) -> Self {
        Self {
            start: end - Duration::days(days.min(MAX_RANGE_DAYS) as i64),
            end,
        }
    }

    pub fn start_str(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    pub fn end_str(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }
}

// --- Scoring ---

/// Score channels. Weight maps and breakdowns are keyed by these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Trend,
    Community,
    News,
    Video,
    RegulatoryInvert,
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Channel::Trend => write!(f, "trend"),
            Channel::Community => write!(f, "community"),
            Channel::News => write!(f, "news"),
            Channel::Video => write!(f, "video"),
            Channel::RegulatoryInvert => write!(f, "regulatory_invert"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub trend_last: f64,
    /// Percent change against the 7-point baseline; `None` when the baseline is 0.
    pub trend_delta_7: Option<f64>,
    /// Percent change against the 30-point baseline; `None` when the baseline is 0.
    pub trend_delta_30: Option<f64>,
    /// Population standard deviation of the series.
    pub trend_sigma: f64,
    /// Trust-weighted community item count, before the saturation cap.
    pub community_weighted: f64,
    /// Trust-weighted news item count, before the saturation cap.
    pub news_weighted: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Score {
    /// 0–100 when weights sum to 1.
    pub total: f64,
    /// Clamped normalized value (0–100) for each weighted channel.
    pub breakdown: BTreeMap<Channel, f64>,
}

// --- Evidence ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub title: String,
    pub publisher: String,
    #[serde(default)]
    pub date: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityHighlight {
    pub title: String,
    pub url: String,
    /// Display label, e.g. "Naver Blog" or "r/korea".
    pub source: String,
}

// --- Narrative ---

pub const UNKNOWN_KO: &str = "알 수 없습니다";
pub const UNCERTAIN_KO: &str = "확실하지 않음";

/// Generated narrative for one idea. Parsing is strict: every field is
/// required and unknown fields are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdeaBrief {
    pub one_liner: String,
    pub summary: String,
    pub why_now: String,
    pub gtm_tactics: Vec<String>,
    pub market: String,
    pub risks: String,
    pub validation_steps: Vec<String>,
}

impl IdeaBrief {
    /// Substituted wholesale when the summarizer fails or its reply is unusable.
    pub fn placeholder() -> Self {
        Self {
            one_liner: UNKNOWN_KO.to_string(),
            summary: UNKNOWN_KO.to_string(),
            why_now: UNCERTAIN_KO.to_string(),
            gtm_tactics: Vec::new(),
            market: UNCERTAIN_KO.to_string(),
            risks: UNCERTAIN_KO.to_string(),
            validation_steps: Vec::new(),
        }
    }
}

// --- Output ---

/// Everything known about an idea before the narrative is generated.
#[derive(Debug, Clone, TypedBuilder)]
pub struct IdeaDraft {
    #[builder(setter(into))]
    pub keyword_group: String,
    #[builder(setter(into))]
    pub category: String,
    #[builder(default)]
    pub tags: Vec<String>,
    pub score: Score,
    #[builder(default)]
    pub trend_series: Vec<TrendPoint>,
    #[builder(default)]
    pub community_counts: BTreeMap<String, usize>,
    #[builder(default)]
    pub community_top: Vec<CommunityHighlight>,
    #[builder(default)]
    pub sources: Vec<EvidenceItem>,
    #[builder(default)]
    pub evidence: Vec<EvidenceItem>,
    pub metrics: Metrics,
}

impl IdeaDraft {
    /// Attach the narrative, producing the final record.
    pub fn finish(self, brief: IdeaBrief) -> Idea {
        Idea {
            title: self.keyword_group.clone(),
            keyword_group: self.keyword_group,
            category: self.category,
            tags: self.tags,
            score: self.score,
            trend_series: self.trend_series,
            community_counts: self.community_counts,
            community_top: self.community_top,
            sources: self.sources,
            evidence: self.evidence,
            metrics: self.metrics,
            brief,
        }
    }
}

/// Final per-keyword record in the output feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Idea {
    pub title: String,
    pub keyword_group: String,
    pub category: String,
    pub tags: Vec<String>,
    pub score: Score,
    pub trend_series: Vec<TrendPoint>,
    pub community_counts: BTreeMap<String, usize>,
    pub community_top: Vec<CommunityHighlight>,
    pub sources: Vec<EvidenceItem>,
    pub evidence: Vec<EvidenceItem>,
    pub metrics: Metrics,
    #[serde(flatten)]
    pub brief: IdeaBrief,
}

#[derive(Debug, Clone, Serialize)]
pub struct IdeaFeed {
    /// `YYYY-MM-DD HH:MM:SS UTC`
    pub generated_at: String,
    pub ideas: Vec<Idea>,
}

impl IdeaFeed {
    /// Stamp the current UTC time and rank ideas by total score, highest first.
    /// Ties keep their input order.
    pub fn ranked(mut ideas: Vec<Idea>) -> Self {
        ideas.sort_by(|a, b| b.score.total.total_cmp(&a.score.total));
        Self {
            generated_at: Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            ideas,
        }
    }
}

// --- URL helpers ---

/// Host part of a URL, lowercased. Scheme-less strings fall back to the text
/// before the first `/`, `?` or `#`.
pub fn extract_domain(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(parsed) => parsed.host_str().unwrap_or_default().to_lowercase(),
        Err(_) => raw
            .split(['/', '?', '#'])
            .next()
            .unwrap_or_default()
            .to_lowercase(),
    }
}

/// Normalize a domain for dedup: lowercase + strip leading `www.`.
pub fn normalize_domain(domain: &str) -> String {
    let d = domain.to_lowercase();
    d.strip_prefix("www.").unwrap_or(&d).to_string()
}

/// Strip tracking parameters and fragments so the same article shared with
/// different campaign tags compares equal.
pub fn sanitize_url(raw: &str) -> String {
    const TRACKING_PARAMS: &[&str] = &[
        "fbclid",
        "gclid",
        "utm_source",
        "utm_medium",
        "utm_campaign",
        "utm_term",
        "utm_content",
        "ref",
    ];

    let Ok(mut parsed) = url::Url::parse(raw) else {
        return raw.trim().to_string();
    };
    parsed.set_fragment(None);

    if parsed.query().is_some() {
        let clean_pairs: Vec<(String, String)> = parsed
            .query_pairs()
            .filter(|(key, _)| !TRACKING_PARAMS.contains(&key.as_ref()))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        if clean_pairs.is_empty() {
            parsed.set_query(None);
        } else {
            parsed.query_pairs_mut().clear().extend_pairs(clean_pairs);
        }
    }

    parsed.to_string()
}
