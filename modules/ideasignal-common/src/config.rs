use std::collections::BTreeMap;
use std::env;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use tracing::info;

use crate::error::IdeaSignalError;
use crate::types::{Channel, KeywordEntry, KeywordFile, MAX_RANGE_DAYS};

/// Provider credentials loaded from environment variables.
///
/// Every credential is optional: a provider whose keys are absent is skipped
/// and its channel degrades to empty data.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub naver_client_id: String,
    pub naver_client_secret: String,
    pub kakao_rest_api_key: String,
    pub youtube_api_key: String,
    pub google_api_key: String,
    pub google_cse_id: String,
    pub reddit_client_id: String,
    pub reddit_client_secret: String,
    pub reddit_user_agent: String,
    pub openai_api_key: String,
    pub openai_base_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            naver_client_id: optional_env("NAVER_CLIENT_ID"),
            naver_client_secret: optional_env("NAVER_CLIENT_SECRET"),
            kakao_rest_api_key: optional_env("KAKAO_REST_API_KEY"),
            youtube_api_key: optional_env("YOUTUBE_API_KEY"),
            google_api_key: optional_env("GOOGLE_API_KEY"),
            google_cse_id: optional_env("GOOGLE_CSE_ID"),
            reddit_client_id: optional_env("REDDIT_CLIENT_ID"),
            reddit_client_secret: optional_env("REDDIT_CLIENT_SECRET"),
            reddit_user_agent: env::var("REDDIT_USER_AGENT")
                .unwrap_or_else(|_| "IdeaBrowserKR/1.0".to_string()),
            openai_api_key: optional_env("OPENAI_API_KEY"),
            openai_base_url: env::var("OPENAI_BASE_URL").ok().filter(|v| !v.is_empty()),
        }
    }

    pub fn has_naver(&self) -> bool {
        !self.naver_client_id.is_empty() && !self.naver_client_secret.is_empty()
    }

    pub fn has_kakao(&self) -> bool {
        !self.kakao_rest_api_key.is_empty()
    }

    pub fn has_youtube(&self) -> bool {
        !self.youtube_api_key.is_empty()
    }

    pub fn has_google(&self) -> bool {
        !self.google_api_key.is_empty() && !self.google_cse_id.is_empty()
    }

    pub fn has_reddit(&self) -> bool {
        !self.reddit_client_id.is_empty() && !self.reddit_client_secret.is_empty()
    }

    pub fn has_openai(&self) -> bool {
        !self.openai_api_key.is_empty()
    }

    /// Log which providers are configured without printing any secret.
    pub fn log_redacted(&self) {
        info!(
            naver = self.has_naver(),
            kakao = self.has_kakao(),
            youtube = self.has_youtube(),
            google = self.has_google(),
            reddit = self.has_reddit(),
            openai = self.has_openai(),
            "Provider credentials"
        );
    }
}

fn optional_env(key: &str) -> String {
    env::var(key).unwrap_or_default()
}

// --- Scoring configuration (config.json) ---

/// Per-source reliability multipliers applied to raw item counts.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrustCoefficients {
    pub naver_datalab: f64,
    pub naver_news: f64,
    pub naver_blog: f64,
    pub naver_cafe: f64,
    pub daum_blog: f64,
    pub daum_cafe: f64,
    pub google: f64,
    pub reddit: f64,
    pub youtube: f64,
}

impl Default for TrustCoefficients {
    fn default() -> Self {
        Self {
            naver_datalab: 1.0,
            naver_news: 1.0,
            naver_blog: 0.85,
            naver_cafe: 0.75,
            daum_blog: 0.8,
            daum_cafe: 0.75,
            google: 0.75,
            reddit: 0.6,
            youtube: 0.6,
        }
    }
}

/// Raw values at which each channel saturates at 100.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoreCaps {
    pub community_max_raw: f64,
    pub news_max_raw: f64,
    pub video_max_raw: f64,
}

impl Default for ScoreCaps {
    fn default() -> Self {
        Self {
            community_max_raw: 60.0,
            news_max_raw: 60.0,
            video_max_raw: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScoringConfig {
    /// Channel weights. Not required to sum to 1.
    pub weights: BTreeMap<Channel, f64>,
    #[serde(default)]
    pub caps: ScoreCaps,
    #[serde(default)]
    pub trust_coeff: TrustCoefficients,
    /// Trend lookup window in days.
    #[serde(default = "default_days", deserialize_with = "u64_or_string")]
    pub days: u64,
    #[serde(default = "default_max_ideas", deserialize_with = "u64_or_string")]
    pub max_ideas_per_run: u64,
    /// Summarizer model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// Delay between keyword entries.
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: default_weights(),
            caps: ScoreCaps::default(),
            trust_coeff: TrustCoefficients::default(),
            days: default_days(),
            max_ideas_per_run: default_max_ideas(),
            model: default_model(),
            pacing_ms: default_pacing_ms(),
        }
    }
}

impl ScoringConfig {
    fn validate(&self) -> Result<(), IdeaSignalError> {
        if self.weights.is_empty() {
            return Err(IdeaSignalError::Config("weights must not be empty".into()));
        }
        if let Some((channel, w)) = self.weights.iter().find(|(_, w)| !w.is_finite() || **w < 0.0) {
            return Err(IdeaSignalError::Config(format!(
                "weight for {channel} must be a non-negative number, got {w}"
            )));
        }
        if self.days == 0 || self.days > MAX_RANGE_DAYS {
            return Err(IdeaSignalError::Config(format!(
                "days must be between 1 and {MAX_RANGE_DAYS}, got {}",
                self.days
            )));
        }
        Ok(())
    }
}

fn default_weights() -> BTreeMap<Channel, f64> {
    BTreeMap::from([
        (Channel::Trend, 0.4),
        (Channel::Community, 0.3),
        (Channel::News, 0.2),
        (Channel::Video, 0.1),
    ])
}

fn default_days() -> u64 {
    30
}

fn default_max_ideas() -> u64 {
    10
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_pacing_ms() -> u64 {
    200
}

/// Accept `30` or `"30"`; hand-edited config files use both.
fn u64_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u64),
        Text(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

// --- Filter configuration (filters.json) ---

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub politics_keywords: Vec<String>,
    pub entertainment_keywords: Vec<String>,
    pub stopwords_ko: Vec<String>,
    pub stopwords_en: Vec<String>,
    /// URL substrings excluded from web-search results.
    pub blocked_domains: Vec<String>,
    pub blocked_subreddits: Vec<String>,
    /// Keywords this many characters or shorter are too generic.
    pub generic_length_threshold: usize,
    pub trend_volatility_sigma_min: f64,
    pub google_domain_diversity_min: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            politics_keywords: Vec::new(),
            entertainment_keywords: Vec::new(),
            stopwords_ko: Vec::new(),
            stopwords_en: Vec::new(),
            blocked_domains: Vec::new(),
            blocked_subreddits: Vec::new(),
            generic_length_threshold: 2,
            trend_volatility_sigma_min: 3.0,
            google_domain_diversity_min: 3,
        }
    }
}

// --- Run configuration ---

/// Immutable configuration for one run, built at startup and passed to each
/// component explicitly.
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    pub scoring: ScoringConfig,
    pub filters: FilterConfig,
}

impl RunConfig {
    /// Load and validate the scoring and filter files. Either one missing or
    /// malformed is fatal: there is no meaningful run without them.
    pub fn load(config_path: &Path, filters_path: &Path) -> Result<Self, IdeaSignalError> {
        let scoring: ScoringConfig = read_json(config_path)?;
        scoring.validate()?;
        let filters: FilterConfig = read_json(filters_path)?;
        Ok(Self { scoring, filters })
    }
}

/// Load the keyword entries. An empty list is allowed and yields an empty feed.
pub fn load_keywords(path: &Path) -> Result<Vec<KeywordEntry>, IdeaSignalError> {
    let file: KeywordFile = read_json(path)?;
    if let Some(bad) = file.entries.iter().find(|e| e.keyword_group.trim().is_empty()) {
        return Err(IdeaSignalError::Config(format!(
            "keyword entry with empty keyword_group in {} (tags: {:?})",
            path.display(),
            bad.tags
        )));
    }
    Ok(file.entries)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, IdeaSignalError> {
    let text = std::fs::read_to_string(path).map_err(|source| IdeaSignalError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| IdeaSignalError::Json {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoring_config_fills_defaults() {
        let cfg: ScoringConfig =
            serde_json::from_str(r#"{"weights": {"trend": 0.5, "news": 0.5}, "days": "14"}"#)
                .unwrap();
        assert_eq!(cfg.days, 14);
        assert_eq!(cfg.max_ideas_per_run, 10);
        assert_eq!(cfg.caps.community_max_raw, 60.0);
        assert_eq!(cfg.trust_coeff.naver_blog, 0.85);
        assert_eq!(cfg.weights.get(&Channel::Trend), Some(&0.5));
        assert_eq!(cfg.model, "gpt-4o-mini");
    }

    #[test]
    fn scoring_config_requires_weights() {
        assert!(serde_json::from_str::<ScoringConfig>(r#"{"days": 30}"#).is_err());
    }

    #[test]
    fn unknown_channel_is_rejected() {
        let result = serde_json::from_str::<ScoringConfig>(r#"{"weights": {"virality": 1.0}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn validate_rejects_negative_weight() {
        let mut cfg = ScoringConfig::default();
        cfg.weights.insert(Channel::Video, -0.1);
        assert!(matches!(cfg.validate(), Err(IdeaSignalError::Config(_))));
    }

    #[test]
    fn partial_trust_overrides_keep_other_defaults() {
        let trust: TrustCoefficients = serde_json::from_str(r#"{"reddit": 0.3}"#).unwrap();
        assert_eq!(trust.reddit, 0.3);
        assert_eq!(trust.naver_news, 1.0);
    }

    #[test]
    fn filter_config_defaults_thresholds() {
        let cfg: FilterConfig =
            serde_json::from_str(r#"{"politics_keywords": ["대통령"]}"#).unwrap();
        assert_eq!(cfg.generic_length_threshold, 2);
        assert_eq!(cfg.trend_volatility_sigma_min, 3.0);
        assert_eq!(cfg.google_domain_diversity_min, 3);
    }

    #[test]
    fn missing_config_file_is_io_error() {
        let result = RunConfig::load(
            Path::new("/nonexistent/config.json"),
            Path::new("/nonexistent/filters.json"),
        );
        assert!(matches!(result, Err(IdeaSignalError::Io { .. })));
    }

    #[test]
    fn bundled_tool_files_load() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../..");
        let cfg = RunConfig::load(
            &root.join("tools/config.json"),
            &root.join("tools/filters.json"),
        )
        .unwrap();
        assert_eq!(cfg.scoring.weights.len(), 4);
        assert!(!cfg.filters.politics_keywords.is_empty());

        let entries = load_keywords(&root.join("tools/keywords.json")).unwrap();
        assert_eq!(entries[0].keyword_group, "전기차 충전");
        assert_eq!(entries[3].category, "generic");
    }

    #[test]
    fn config_reports_missing_providers() {
        let config = Config::default();
        assert!(!config.has_naver());
        assert!(!config.has_openai());
    }
}
