use serde::{Deserialize, Serialize};

use crate::config::FilterConfig;

/// Topic sensitivity classification. Anything other than `General` keeps a
/// keyword or a search hit out of the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicSensitivity {
    General,
    /// Elections, parties, politicians.
    Politics,
    /// Celebrities, idols, broadcast gossip.
    Entertainment,
}

impl TopicSensitivity {
    pub fn is_sensitive(&self) -> bool {
        !matches!(self, TopicSensitivity::General)
    }
}

/// Case-insensitive substring match against the configured topic lists.
/// Politics is checked first.
pub fn classify_topic(text: &str, filters: &FilterConfig) -> TopicSensitivity {
    let lowered = text.to_lowercase();
    if contains_any(&lowered, &filters.politics_keywords) {
        TopicSensitivity::Politics
    } else if contains_any(&lowered, &filters.entertainment_keywords) {
        TopicSensitivity::Entertainment
    } else {
        TopicSensitivity::General
    }
}

/// `text` must already be lowercased.
fn contains_any(text: &str, needles: &[String]) -> bool {
    needles
        .iter()
        .filter(|n| !n.is_empty())
        .any(|n| text.contains(&n.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filters() -> FilterConfig {
        FilterConfig {
            politics_keywords: vec!["대통령".into(), "Election".into()],
            entertainment_keywords: vec!["아이돌".into()],
            ..FilterConfig::default()
        }
    }

    #[test]
    fn politics_match_is_case_insensitive() {
        assert_eq!(
            classify_topic("Local ELECTION results", &filters()),
            TopicSensitivity::Politics
        );
    }

    #[test]
    fn entertainment_substring_matches() {
        let verdict = classify_topic("신인 아이돌 그룹 데뷔", &filters());
        assert_eq!(verdict, TopicSensitivity::Entertainment);
        assert!(verdict.is_sensitive());
    }

    #[test]
    fn general_text_passes() {
        assert!(!classify_topic("전기차 충전소 설치", &filters()).is_sensitive());
    }

    #[test]
    fn empty_needles_never_match() {
        let filters = FilterConfig {
            politics_keywords: vec![String::new()],
            ..FilterConfig::default()
        };
        assert_eq!(classify_topic("anything", &filters), TopicSensitivity::General);
    }
}
