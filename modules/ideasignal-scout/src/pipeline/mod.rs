pub mod stats;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use ideasignal_common::{
    DateRange, Idea, IdeaBrief, IdeaDraft, IdeaFeed, KeywordEntry, RunConfig, SignalItem,
    SignalResult, TrendFetch,
};

use crate::brief::{parse_brief, BriefRequest};
use crate::evidence::EvidenceAssembler;
use crate::filter::{ContentFilter, Verdict};
use crate::scoring::{compute_metrics, compute_score, normalize, RawAggregates, SourceCounts};
use crate::traits::{CommunitySource, SignalFetcher, Summarizer};

pub use stats::RunStats;

const NEWS_DISPLAY: usize = 20;
const COMMUNITY_SIZE: usize = 10;
const WEB_SEARCH_NUM: usize = 8;
const FORUM_LIMIT: usize = 8;
const VIDEO_CHART_SIZE: usize = 25;

/// Everything fetched for one keyword group before filtering.
#[derive(Debug, Clone, Default)]
pub struct FetchedSignals {
    pub trend: TrendFetch,
    pub news: SignalResult,
    pub community: BTreeMap<CommunitySource, SignalResult>,
    pub web: SignalResult,
    pub forum: SignalResult,
}

impl FetchedSignals {
    pub fn community_items(&self, source: CommunitySource) -> &[SignalItem] {
        self.community
            .get(&source)
            .map(|r| r.items())
            .unwrap_or_default()
    }

    pub fn web_urls(&self) -> Vec<String> {
        self.web.items().iter().map(|it| it.url.clone()).collect()
    }

    pub fn counts(&self, video: usize) -> SourceCounts {
        SourceCounts {
            naver_blog: self.community_items(CommunitySource::NaverBlog).len(),
            naver_cafe: self.community_items(CommunitySource::NaverCafe).len(),
            daum_blog: self.community_items(CommunitySource::DaumBlog).len(),
            daum_cafe: self.community_items(CommunitySource::DaumCafe).len(),
            google: self.web.len(),
            reddit: self.forum.len(),
            news: self.news.len(),
            video,
        }
    }

    pub fn failures(&self) -> u32 {
        let lists = [&self.news, &self.web, &self.forum]
            .into_iter()
            .chain(self.community.values())
            .filter(|r| r.is_failed())
            .count();
        lists as u32 + u32::from(self.trend.is_failed())
    }
}

/// Drives keyword entries through fetch, filter, score, evidence and brief
/// generation, one entry at a time.
pub struct IdeaPipeline {
    fetcher: Arc<dyn SignalFetcher>,
    summarizer: Arc<dyn Summarizer>,
    config: Arc<RunConfig>,
    filter: ContentFilter,
}

impl IdeaPipeline {
    pub fn new(
        fetcher: Arc<dyn SignalFetcher>,
        summarizer: Arc<dyn Summarizer>,
        config: Arc<RunConfig>,
    ) -> Self {
        let filter = ContentFilter::new(Arc::new(config.filters.clone()));
        Self {
            fetcher,
            summarizer,
            config,
            filter,
        }
    }

    /// Process the first `max_ideas_per_run` entries and rank the results.
    pub async fn run(&self, entries: &[KeywordEntry]) -> (IdeaFeed, RunStats) {
        let scoring = &self.config.scoring;
        let range = DateRange::ending_today_kst(scoring.days);
        let limit = usize::try_from(scoring.max_ideas_per_run).unwrap_or(usize::MAX);
        let pacing = Duration::from_millis(scoring.pacing_ms);

        info!(
            entries = entries.len(),
            limit,
            start = %range.start_str(),
            end = %range.end_str(),
            "Starting idea run"
        );

        let mut stats = RunStats::default();
        let mut ideas = Vec::new();

        for entry in entries.iter().take(limit) {
            stats.entries_processed += 1;
            let Some(idea) = self.process(entry, range, &mut stats).await else {
                continue;
            };
            ideas.push(idea);
            stats.ideas_built += 1;
            if !pacing.is_zero() {
                tokio::time::sleep(pacing).await;
            }
        }

        let feed = IdeaFeed::ranked(ideas);
        info!("{stats}");
        (feed, stats)
    }

    async fn fetch(&self, entry: &KeywordEntry, range: DateRange) -> FetchedSignals {
        let kg = entry.keyword_group.as_str();
        let keywords = entry.trend_keywords();
        let f = &self.fetcher;

        let (trend, news, naver_blog, naver_cafe, daum_blog, daum_cafe, web, forum) =
            futures::join!(
                f.trend(kg, &keywords, range),
                f.news(kg, NEWS_DISPLAY),
                f.community(CommunitySource::NaverBlog, kg, COMMUNITY_SIZE),
                f.community(CommunitySource::NaverCafe, kg, COMMUNITY_SIZE),
                f.community(CommunitySource::DaumBlog, kg, COMMUNITY_SIZE),
                f.community(CommunitySource::DaumCafe, kg, COMMUNITY_SIZE),
                f.web_search(kg, WEB_SEARCH_NUM),
                f.forum_search(kg, FORUM_LIMIT),
            );

        FetchedSignals {
            trend,
            news,
            community: BTreeMap::from([
                (CommunitySource::NaverBlog, naver_blog),
                (CommunitySource::NaverCafe, naver_cafe),
                (CommunitySource::DaumBlog, daum_blog),
                (CommunitySource::DaumCafe, daum_cafe),
            ]),
            web,
            forum,
        }
    }

    async fn process(
        &self,
        entry: &KeywordEntry,
        range: DateRange,
        stats: &mut RunStats,
    ) -> Option<Idea> {
        let kg = entry.keyword_group.as_str();
        let signals = self.fetch(entry, range).await;
        stats.fetch_failures += signals.failures();

        if let Verdict::Reject(reason) =
            self.filter
                .decide(kg, &signals.trend.series, &signals.web_urls())
        {
            info!(keyword = kg, reason = %reason, "Keyword rejected");
            stats.record_rejection(reason.kind());
            return None;
        }

        let video = self.fetcher.trending_video_count(VIDEO_CHART_SIZE).await;
        if video.is_failed() {
            stats.fetch_failures += 1;
        }

        let scoring = &self.config.scoring;
        let raw = RawAggregates::weigh(&signals.counts(video.count), &scoring.trust_coeff);
        let trend_last = signals.trend.series.last().map_or(0.0, |p| p.value);
        let normalized = normalize(trend_last, &raw, &scoring.caps, &scoring.trust_coeff);
        let score = compute_score(&normalized, &scoring.weights);
        let metrics = compute_metrics(&signals.trend.series, &raw);

        let assembled = EvidenceAssembler::assemble(&signals);

        info!(
            keyword = kg,
            total = score.total,
            evidence = assembled.evidence.len(),
            "Idea scored"
        );

        let request = BriefRequest {
            title: kg.to_string(),
            category: entry.category.clone(),
            tags: entry.tags.clone(),
            score_total: score.total,
            metrics: metrics.clone(),
            community_counts: assembled.community_counts.clone(),
            evidence: assembled.evidence.clone(),
        };

        let draft = IdeaDraft::builder()
            .keyword_group(kg)
            .category(entry.category.as_str())
            .tags(entry.tags.clone())
            .score(score)
            .trend_series(signals.trend.series)
            .community_counts(assembled.community_counts)
            .community_top(assembled.community_top)
            .sources(assembled.sources)
            .evidence(assembled.evidence.into_items())
            .metrics(metrics)
            .build();

        let brief = self.brief(&request, stats).await;
        Some(draft.finish(brief))
    }

    /// Summarizer reply parsed into a brief; any failure yields the placeholder.
    async fn brief(&self, request: &BriefRequest, stats: &mut RunStats) -> IdeaBrief {
        let reply = match self.summarizer.summarize(request).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(
                    keyword = request.title.as_str(),
                    error = %e,
                    "Summarizer failed, using placeholder"
                );
                stats.summarizer_fallbacks += 1;
                return IdeaBrief::placeholder();
            }
        };
        match parse_brief(&reply) {
            Ok(brief) => brief,
            Err(e) => {
                warn!(
                    keyword = request.title.as_str(),
                    error = %e,
                    "Unusable brief reply, using placeholder"
                );
                stats.summarizer_fallbacks += 1;
                IdeaBrief::placeholder()
            }
        }
    }
}
