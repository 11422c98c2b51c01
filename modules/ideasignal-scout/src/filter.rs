use std::collections::HashSet;
use std::sync::Arc;

use ideasignal_common::{
    classify_topic, extract_domain, normalize_domain, population_sigma, FilterConfig,
    TopicSensitivity, TrendPoint,
};

/// Series shorter than this are too sparse for the volatility rule.
const MIN_POINTS_FOR_VOLATILITY: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum RejectReason {
    Sensitive(TopicSensitivity),
    TooShort { chars: usize },
    Stopword,
    FlatTrend { sigma: f64 },
    LowDomainDiversity { distinct: usize },
}

impl RejectReason {
    /// Stable name used as a stats key.
    pub fn kind(&self) -> &'static str {
        match self {
            RejectReason::Sensitive(_) => "sensitive",
            RejectReason::TooShort { .. } => "too_short",
            RejectReason::Stopword => "stopword",
            RejectReason::FlatTrend { .. } => "flat_trend",
            RejectReason::LowDomainDiversity { .. } => "low_domain_diversity",
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::Sensitive(topic) => write!(f, "sensitive topic ({topic:?})"),
            RejectReason::TooShort { chars } => write!(f, "keyword too short ({chars} chars)"),
            RejectReason::Stopword => write!(f, "keyword is a stopword"),
            RejectReason::FlatTrend { sigma } => write!(f, "flat trend (sigma {sigma:.2})"),
            RejectReason::LowDomainDiversity { distinct } => {
                write!(f, "low source diversity ({distinct} domains)")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Admit,
    Reject(RejectReason),
}

impl Verdict {
    pub fn admits(&self) -> bool {
        matches!(self, Verdict::Admit)
    }
}

/// Hard filter applied to each keyword group after its signals are fetched.
/// A rejected group produces no idea at all.
#[derive(Clone)]
pub struct ContentFilter {
    rules: Arc<FilterConfig>,
}

impl ContentFilter {
    pub fn new(rules: Arc<FilterConfig>) -> Self {
        Self { rules }
    }

    /// `search_urls` are the web-search result URLs; their hosts feed the
    /// diversity rule. An empty slice never triggers it.
    pub fn decide(&self, keyword: &str, series: &[TrendPoint], search_urls: &[String]) -> Verdict {
        match self.first_violation(keyword, series, search_urls) {
            Some(reason) => Verdict::Reject(reason),
            None => Verdict::Admit,
        }
    }

    fn first_violation(
        &self,
        keyword: &str,
        series: &[TrendPoint],
        search_urls: &[String],
    ) -> Option<RejectReason> {
        let topic = classify_topic(keyword, &self.rules);
        if topic.is_sensitive() {
            return Some(RejectReason::Sensitive(topic));
        }

        let term = keyword.trim().to_lowercase();
        let chars = term.chars().count();
        if chars <= self.rules.generic_length_threshold {
            return Some(RejectReason::TooShort { chars });
        }
        let is_stopword = self
            .rules
            .stopwords_ko
            .iter()
            .chain(&self.rules.stopwords_en)
            .any(|s| s.trim().to_lowercase() == term);
        if is_stopword {
            return Some(RejectReason::Stopword);
        }

        if series.len() >= MIN_POINTS_FOR_VOLATILITY {
            let values: Vec<f64> = series.iter().map(|p| p.value).collect();
            let sigma = population_sigma(&values);
            if sigma < self.rules.trend_volatility_sigma_min {
                return Some(RejectReason::FlatTrend { sigma });
            }
        }

        if !search_urls.is_empty() {
            let distinct: HashSet<String> = search_urls
                .iter()
                .map(|u| normalize_domain(&extract_domain(u)))
                .collect();
            if distinct.len() < self.rules.google_domain_diversity_min {
                return Some(RejectReason::LowDomainDiversity {
                    distinct: distinct.len(),
                });
            }
        }

        None
    }
}
