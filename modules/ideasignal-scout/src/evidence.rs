use std::collections::{BTreeMap, HashSet};

use ideasignal_common::{sanitize_url, CommunityHighlight, EvidenceItem, SignalItem};

use crate::pipeline::FetchedSignals;
use crate::traits::CommunitySource;

pub const NEWS_SOURCE_LIMIT: usize = 8;
pub const WEB_SOURCE_LIMIT: usize = 6;
pub const FORUM_SOURCE_LIMIT: usize = 6;
pub const MAX_EVIDENCE: usize = 12;

/// Highlight quotas, in output order.
const COMMUNITY_QUOTAS: [(CommunitySource, usize); 4] = [
    (CommunitySource::NaverBlog, 2),
    (CommunitySource::NaverCafe, 1),
    (CommunitySource::DaumBlog, 2),
    (CommunitySource::DaumCafe, 1),
];
const WEB_HIGHLIGHTS: usize = 3;
const FORUM_HIGHLIGHTS: usize = 3;

/// Deduplicated, capped citation list. Index `i` in the brief refers to
/// `items[i - 1]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evidence {
    items: Vec<EvidenceItem>,
}

impl Evidence {
    /// Keep the first occurrence of each URL (tracking parameters ignored;
    /// URL-less items compare by title), up to [`MAX_EVIDENCE`].
    pub fn from_sources(sources: &[EvidenceItem]) -> Self {
        let mut seen = HashSet::new();
        let items = sources
            .iter()
            .filter(|item| seen.insert(dedup_key(item)))
            .take(MAX_EVIDENCE)
            .cloned()
            .collect();
        Self { items }
    }

    /// `(1-based index, item)` in encounter order.
    pub fn numbered(&self) -> impl Iterator<Item = (usize, &EvidenceItem)> {
        self.items.iter().enumerate().map(|(i, item)| (i + 1, item))
    }

    pub fn items(&self) -> &[EvidenceItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_items(self) -> Vec<EvidenceItem> {
        self.items
    }
}

fn dedup_key(item: &EvidenceItem) -> String {
    if item.url.trim().is_empty() {
        format!("title:{}", item.title.trim())
    } else {
        sanitize_url(&item.url)
    }
}

/// Everything the idea record cites, derived from one keyword's signals.
#[derive(Debug, Clone, Default)]
pub struct AssembledEvidence {
    pub sources: Vec<EvidenceItem>,
    pub evidence: Evidence,
    pub community_top: Vec<CommunityHighlight>,
    pub community_counts: BTreeMap<String, usize>,
}

pub struct EvidenceAssembler;

impl EvidenceAssembler {
    pub fn assemble(signals: &FetchedSignals) -> AssembledEvidence {
        let sources = Self::sources(signals);
        let evidence = Evidence::from_sources(&sources);
        AssembledEvidence {
            community_top: Self::highlights(signals),
            community_counts: Self::counts(signals),
            sources,
            evidence,
        }
    }

    /// News, then web search, then forum, each truncated to its limit.
    fn sources(signals: &FetchedSignals) -> Vec<EvidenceItem> {
        let news = signals
            .news
            .items()
            .iter()
            .take(NEWS_SOURCE_LIMIT)
            .map(|it| to_evidence(it, "Naver News", true));
        let web = signals
            .web
            .items()
            .iter()
            .take(WEB_SOURCE_LIMIT)
            .map(|it| to_evidence(it, "Google", true));
        let forum = signals
            .forum
            .items()
            .iter()
            .take(FORUM_SOURCE_LIMIT)
            .map(|it| to_evidence(it, "Reddit", false));
        news.chain(web).chain(forum).collect()
    }

    fn highlights(signals: &FetchedSignals) -> Vec<CommunityHighlight> {
        let mut out = Vec::new();
        for (source, quota) in COMMUNITY_QUOTAS {
            out.extend(
                signals
                    .community_items(source)
                    .iter()
                    .take(quota)
                    .map(|it| highlight(it, source.label().to_string())),
            );
        }
        out.extend(
            signals
                .web
                .items()
                .iter()
                .take(WEB_HIGHLIGHTS)
                .map(|it| highlight(it, "Google".to_string())),
        );
        out.extend(signals.forum.items().iter().take(FORUM_HIGHLIGHTS).map(|it| {
            let sub = it.origin.as_deref().unwrap_or("");
            highlight(it, format!("r/{sub}"))
        }));
        out
    }

    fn counts(signals: &FetchedSignals) -> BTreeMap<String, usize> {
        CommunitySource::ALL
            .iter()
            .map(|s| (s.key().to_string(), signals.community_items(*s).len()))
            .collect()
    }
}

fn to_evidence(item: &SignalItem, publisher: &str, keep_date: bool) -> EvidenceItem {
    EvidenceItem {
        title: item.title.clone(),
        publisher: publisher.to_string(),
        date: if keep_date {
            item.date.clone().unwrap_or_default()
        } else {
            String::new()
        },
        url: item.url.clone(),
    }
}

fn highlight(item: &SignalItem, source: String) -> CommunityHighlight {
    CommunityHighlight {
        title: item.title.clone(),
        url: item.url.clone(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ideasignal_common::SignalResult;

    fn items(prefix: &str, n: usize) -> Vec<SignalItem> {
        (0..n)
            .map(|i| {
                SignalItem::new(
                    format!("{prefix} {i}"),
                    format!("https://{prefix}.example.com/{i}"),
                    prefix,
                )
                .with_date("2025-03-01")
            })
            .collect()
    }

    fn signals() -> FetchedSignals {
        let mut signals = FetchedSignals::default();
        signals.news = SignalResult::ok(items("news", 20));
        signals.web = SignalResult::ok(items("web", 8));
        signals.forum = SignalResult::ok(
            items("forum", 8)
                .into_iter()
                .map(|it| it.with_origin("korea"))
                .collect(),
        );
        for source in CommunitySource::ALL {
            signals
                .community
                .insert(source, SignalResult::ok(items(source.key(), 10)));
        }
        signals
    }

    #[test]
    fn sources_follow_per_channel_limits() {
        let assembled = EvidenceAssembler::assemble(&signals());
        assert_eq!(assembled.sources.len(), 8 + 6 + 6);
        assert_eq!(assembled.sources[0].publisher, "Naver News");
        assert_eq!(assembled.sources[8].publisher, "Google");
        assert_eq!(assembled.sources[14].publisher, "Reddit");
        assert_eq!(assembled.sources[14].date, "");
    }

    #[test]
    fn evidence_is_capped_and_numbered_from_one() {
        let assembled = EvidenceAssembler::assemble(&signals());
        assert_eq!(assembled.evidence.len(), MAX_EVIDENCE);
        let numbered: Vec<usize> = assembled.evidence.numbered().map(|(i, _)| i).collect();
        assert_eq!(numbered, (1..=12).collect::<Vec<_>>());
        assert_eq!(assembled.evidence.items()[8].title, "web 0");
    }

    #[test]
    fn duplicate_urls_collapse_ignoring_tracking_params() {
        let a = EvidenceItem {
            title: "A".into(),
            publisher: "Naver News".into(),
            date: String::new(),
            url: "https://example.com/a?utm_source=naver".into(),
        };
        let b = EvidenceItem {
            title: "A again".into(),
            url: "https://example.com/a".into(),
            ..a.clone()
        };
        let c = EvidenceItem {
            title: "no url".into(),
            url: String::new(),
            ..a.clone()
        };
        let evidence = Evidence::from_sources(&[a, b, c.clone(), c]);
        let titles: Vec<&str> = evidence.items().iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "no url"]);
    }

    #[test]
    fn highlights_respect_quotas_and_order() {
        let assembled = EvidenceAssembler::assemble(&signals());
        let labels: Vec<&str> = assembled
            .community_top
            .iter()
            .map(|h| h.source.as_str())
            .collect();
        assert_eq!(
            labels,
            vec![
                "Naver Blog",
                "Naver Blog",
                "Naver Cafe",
                "Daum Blog",
                "Daum Blog",
                "Daum Cafe",
                "Google",
                "Google",
                "Google",
                "r/korea",
                "r/korea",
                "r/korea",
            ]
        );
    }

    #[test]
    fn counts_cover_every_community_source() {
        let mut signals = signals();
        signals
            .community
            .insert(CommunitySource::DaumCafe, SignalResult::failed("401"));
        let assembled = EvidenceAssembler::assemble(&signals);
        assert_eq!(assembled.community_counts.get("naver_blog"), Some(&10));
        assert_eq!(assembled.community_counts.get("daum_cafe"), Some(&0));
        assert_eq!(assembled.community_counts.len(), 4);
    }

    #[test]
    fn empty_signals_give_empty_evidence() {
        let assembled = EvidenceAssembler::assemble(&FetchedSignals::default());
        assert!(assembled.sources.is_empty());
        assert!(assembled.evidence.is_empty());
        assert!(assembled.community_top.is_empty());
    }
}
