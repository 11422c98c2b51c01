//! End-to-end pipeline runs against MockFetcher / MockSummarizer.

use std::sync::Arc;

use ideasignal_common::{
    Channel, FilterConfig, KeywordEntry, RunConfig, ScoringConfig, SignalItem, UNCERTAIN_KO,
    UNKNOWN_KO,
};
use ideasignal_scout::pipeline::IdeaPipeline;
use ideasignal_scout::testing::{
    search_items, trend_series, valid_brief_reply, MockFetcher, MockSummarizer,
};
use ideasignal_scout::traits::CommunitySource;

const EV: &str = "전기차 충전";

fn run_config(max_ideas: u64) -> Arc<RunConfig> {
    Arc::new(RunConfig {
        scoring: ScoringConfig {
            max_ideas_per_run: max_ideas,
            pacing_ms: 0,
            ..ScoringConfig::default()
        },
        filters: FilterConfig {
            politics_keywords: vec!["대통령".into()],
            entertainment_keywords: vec!["아이돌".into()],
            stopwords_ko: vec!["인기순위".into()],
            ..FilterConfig::default()
        },
    })
}

/// 30 points cycling 20, 30, 40, 50, 60; last value 60.
fn cycling_series() -> Vec<f64> {
    (0..30).map(|i| 20.0 + (i % 5) as f64 * 10.0).collect()
}

fn forum_items(n: usize) -> Vec<SignalItem> {
    search_items("forum", "Reddit", n)
        .into_iter()
        .map(|it| it.with_origin("korea"))
        .collect()
}

/// Full signal set for one keyword.
fn register(fetcher: MockFetcher, keyword: &str, series: Vec<f64>) -> MockFetcher {
    let mut fetcher = fetcher
        .on_trend(keyword, trend_series(&series))
        .on_news(keyword, search_items("news", "Naver News", 20))
        .on_web_search(keyword, search_items("web", "Google", 8))
        .on_forum_search(keyword, forum_items(5));
    for source in CommunitySource::ALL {
        let items = search_items(source.key(), source.label(), 10);
        fetcher = fetcher.on_community(source, keyword, items);
    }
    fetcher
}

fn pipeline(
    fetcher: MockFetcher,
    summarizer: Arc<MockSummarizer>,
    max_ideas: u64,
) -> IdeaPipeline {
    IdeaPipeline::new(Arc::new(fetcher), summarizer, run_config(max_ideas))
}

#[tokio::test]
async fn ev_charging_scores_deterministically() {
    let fetcher = register(MockFetcher::new(), EV, cycling_series()).with_video_count(25);
    let summarizer = Arc::new(MockSummarizer::replying(valid_brief_reply()));
    let (feed, stats) = pipeline(fetcher, summarizer.clone(), 10)
        .run(&[KeywordEntry::new(EV)])
        .await;

    assert_eq!(feed.ideas.len(), 1);
    let idea = &feed.ideas[0];
    assert_eq!(idea.title, EV);

    // trend 60*0.4 + community 67.5*0.3 + news 33.33*0.2 + video 15*0.1
    assert_eq!(idea.score.total, 52.42);
    assert_eq!(idea.score.breakdown[&Channel::Trend], 60.0);
    assert_eq!(idea.score.breakdown[&Channel::Community], 67.5);
    assert_eq!(idea.score.breakdown[&Channel::News], 33.33);
    assert_eq!(idea.score.breakdown[&Channel::Video], 15.0);

    assert_eq!(idea.metrics.trend_last, 60.0);
    assert_eq!(idea.metrics.trend_delta_7, Some(20.0));
    assert_eq!(idea.metrics.trend_delta_30, Some(200.0));
    assert_eq!(idea.metrics.community_weighted, 40.5);
    assert_eq!(idea.metrics.news_weighted, 20.0);

    assert_eq!(idea.sources.len(), 8 + 6 + 5);
    assert_eq!(idea.evidence.len(), 12);
    assert_eq!(idea.community_top.len(), 2 + 1 + 2 + 1 + 3 + 3);
    assert_eq!(idea.community_counts.get("daum_blog"), Some(&10));
    assert_eq!(idea.trend_series.len(), 30);

    assert_eq!(idea.brief.one_liner, "아파트 충전 예약 서비스");
    assert_eq!(idea.brief.gtm_tactics.len(), 2);

    let requests = summarizer.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].evidence.len(), 12);
    assert_eq!(requests[0].score_total, 52.42);

    assert_eq!(stats.ideas_built, 1);
    assert_eq!(stats.fetch_failures, 0);
    assert_eq!(stats.summarizer_fallbacks, 0);
}

#[tokio::test]
async fn tagged_entry_with_synonyms_flows_through_to_idea_and_brief() {
    let entry = KeywordEntry {
        keyword_group: EV.to_string(),
        keywords: vec!["전기차 충전소".to_string()],
        tags: vec!["mobility".to_string()],
        category: "EV".to_string(),
    };
    let series = [10.0, 15.0, 20.0, 30.0, 40.0, 50.0, 55.0, 60.0, 70.0, 80.0];
    let fetcher = Arc::new(
        MockFetcher::new()
            .on_trend(EV, trend_series(&series))
            .on_news(EV, search_items("news", "Naver News", 5))
            .on_community(CommunitySource::NaverBlog, EV, search_items("blog", "Naver Blog", 3))
            .on_web_search(EV, search_items("web", "Google", 3)),
    );
    let summarizer = Arc::new(MockSummarizer::replying(valid_brief_reply()));
    let pipeline = IdeaPipeline::new(fetcher.clone(), summarizer.clone(), run_config(10));

    let (feed, stats) = pipeline.run(&[entry]).await;

    assert_eq!(feed.ideas.len(), 1);
    let idea = &feed.ideas[0];
    // trend 80*0.4 + community (0.85*3 + 0.75*3 = 4.8 of 60) * 0.3 + news 5/60 * 0.2
    assert_eq!(idea.score.total, 36.07);
    assert_eq!(idea.score.breakdown[&Channel::Community], 8.0);
    assert_eq!(idea.score.breakdown[&Channel::Video], 0.0);
    assert_eq!(idea.metrics.trend_last, 80.0);
    assert_eq!(idea.metrics.trend_delta_7, Some(166.67));
    assert_eq!(idea.metrics.trend_delta_30, Some(700.0));
    assert_eq!(idea.title, EV);
    assert_eq!(idea.category, "EV");
    assert_eq!(idea.tags, vec!["mobility".to_string()]);
    assert_eq!(idea.community_counts.get("naver_blog"), Some(&3));
    assert_eq!(idea.community_counts.get("daum_cafe"), Some(&0));

    let requests = summarizer.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].category, "EV");
    assert_eq!(requests[0].tags, vec!["mobility".to_string()]);
    assert_eq!(requests[0].score_total, 36.07);

    assert_eq!(fetcher.trend_keywords(), vec![vec!["전기차 충전소".to_string()]]);
    // three other community sources, forum and the video chart are unregistered
    assert_eq!(stats.fetch_failures, 5);
}

#[tokio::test]
async fn evidence_numbering_is_stable_across_runs() {
    let run = || async {
        let fetcher = register(MockFetcher::new(), EV, cycling_series()).with_video_count(25);
        let summarizer = Arc::new(MockSummarizer::replying(valid_brief_reply()));
        let (feed, _) = pipeline(fetcher, summarizer, 10)
            .run(&[KeywordEntry::new(EV)])
            .await;
        feed.ideas[0].evidence.clone()
    };
    let first = run().await;
    let second = run().await;
    assert_eq!(first, second);
    assert_eq!(first[0].title, "news 0");
    assert_eq!(first[8].title, "web 0");
}

#[tokio::test]
async fn non_json_reply_gives_placeholder_brief() {
    let fetcher = register(MockFetcher::new(), EV, cycling_series()).with_video_count(25);
    let summarizer = Arc::new(MockSummarizer::replying("죄송하지만 답변할 수 없습니다."));
    let (feed, stats) = pipeline(fetcher, summarizer, 10)
        .run(&[KeywordEntry::new(EV)])
        .await;

    let brief = &feed.ideas[0].brief;
    assert_eq!(brief.one_liner, UNKNOWN_KO);
    assert_eq!(brief.summary, UNKNOWN_KO);
    assert_eq!(brief.why_now, UNCERTAIN_KO);
    assert!(brief.gtm_tactics.is_empty());
    assert!(brief.validation_steps.is_empty());
    assert_eq!(stats.summarizer_fallbacks, 1);
}

#[tokio::test]
async fn summarizer_error_gives_placeholder_brief() {
    let fetcher = register(MockFetcher::new(), EV, cycling_series()).with_video_count(25);
    let summarizer = Arc::new(MockSummarizer::failing("connection reset"));
    let (feed, stats) = pipeline(fetcher, summarizer, 10)
        .run(&[KeywordEntry::new(EV)])
        .await;

    assert_eq!(feed.ideas[0].brief.one_liner, UNKNOWN_KO);
    assert_eq!(feed.ideas[0].brief.market, UNCERTAIN_KO);
    assert_eq!(stats.summarizer_fallbacks, 1);
}

#[tokio::test]
async fn all_fetchers_failing_yields_zero_score_idea() {
    let summarizer = Arc::new(MockSummarizer::replying(valid_brief_reply()));
    let (feed, stats) = pipeline(MockFetcher::new(), summarizer, 10)
        .run(&[KeywordEntry::new(EV)])
        .await;

    assert_eq!(feed.ideas.len(), 1);
    let idea = &feed.ideas[0];
    assert_eq!(idea.score.total, 0.0);
    assert!(idea.evidence.is_empty());
    assert!(idea.sources.is_empty());
    assert!(idea.community_top.is_empty());
    assert!(idea.trend_series.is_empty());
    assert_eq!(idea.metrics.trend_delta_7, None);
    // trend, news, 4 community, web, forum, video
    assert_eq!(stats.fetch_failures, 9);
}

#[tokio::test]
async fn filtered_keywords_produce_no_ideas() {
    let fetcher = register(MockFetcher::new(), "대통령 선거 테마주", cycling_series());
    let fetcher = register(fetcher, "차", cycling_series());
    let fetcher = register(fetcher, "인기순위", cycling_series());
    let fetcher = register(fetcher, "무난한 키워드", vec![42.0; 10]).with_video_count(25);
    let summarizer = Arc::new(MockSummarizer::replying(valid_brief_reply()));

    let entries = [
        KeywordEntry::new("대통령 선거 테마주"),
        KeywordEntry::new("차"),
        KeywordEntry::new("인기순위"),
        KeywordEntry::new("무난한 키워드"),
    ];
    let fetcher = Arc::new(fetcher);
    let pipeline = IdeaPipeline::new(fetcher.clone(), summarizer.clone(), run_config(10));
    let (feed, stats) = pipeline.run(&entries).await;

    assert!(feed.ideas.is_empty());
    assert!(summarizer.requests().is_empty());
    assert_eq!(stats.rejected.get("sensitive"), Some(&1));
    assert_eq!(stats.rejected.get("too_short"), Some(&1));
    assert_eq!(stats.rejected.get("stopword"), Some(&1));
    assert_eq!(stats.rejected.get("flat_trend"), Some(&1));
    assert!(!fetcher.calls().iter().any(|c| c == "trending_video_count"));
}

#[tokio::test]
async fn low_domain_diversity_is_rejected() {
    let same_host: Vec<SignalItem> = (0..5)
        .map(|i| {
            SignalItem::new(
                format!("글 {i}"),
                format!("https://www.blog.example/{i}"),
                "Google",
            )
        })
        .collect();
    let fetcher = MockFetcher::new()
        .on_trend(EV, trend_series(&cycling_series()))
        .on_web_search(EV, same_host);
    let summarizer = Arc::new(MockSummarizer::replying(valid_brief_reply()));
    let (feed, stats) = pipeline(fetcher, summarizer, 10)
        .run(&[KeywordEntry::new(EV)])
        .await;

    assert!(feed.ideas.is_empty());
    assert_eq!(stats.rejected.get("low_domain_diversity"), Some(&1));
}

#[tokio::test]
async fn run_stops_at_max_ideas_per_run() {
    let fetcher = MockFetcher::new().with_video_count(10);
    let fetcher = register(fetcher, "첫번째 아이디어", cycling_series());
    let fetcher = register(fetcher, "두번째 아이디어", cycling_series());
    let fetcher = Arc::new(register(fetcher, "세번째 아이디어", cycling_series()));
    let summarizer = Arc::new(MockSummarizer::replying(valid_brief_reply()));
    let entries = [
        KeywordEntry::new("첫번째 아이디어"),
        KeywordEntry::new("두번째 아이디어"),
        KeywordEntry::new("세번째 아이디어"),
    ];

    let pipeline = IdeaPipeline::new(fetcher.clone(), summarizer, run_config(2));
    let (feed, stats) = pipeline.run(&entries).await;

    assert_eq!(feed.ideas.len(), 2);
    assert_eq!(stats.entries_processed, 2);
    assert!(!fetcher.calls().iter().any(|c| c.contains("세번째")));
}

#[tokio::test]
async fn ideas_are_ranked_by_total_descending() {
    // Lower trend for the first entry, so the second one must come out on top.
    let quiet: Vec<f64> = (0..30).map(|i| 5.0 + (i % 5) as f64 * 4.0).collect();
    let fetcher = register(MockFetcher::new(), "조용한 아이디어", quiet);
    let fetcher = register(fetcher, EV, cycling_series()).with_video_count(25);
    let summarizer = Arc::new(MockSummarizer::replying(valid_brief_reply()));

    let (feed, _) = pipeline(fetcher, summarizer, 10)
        .run(&[KeywordEntry::new("조용한 아이디어"), KeywordEntry::new(EV)])
        .await;

    let titles: Vec<&str> = feed.ideas.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, vec![EV, "조용한 아이디어"]);
    assert!(feed.ideas[0].score.total > feed.ideas[1].score.total);
}

#[tokio::test]
async fn feed_serializes_flat_brief_fields() {
    let fetcher = register(MockFetcher::new(), EV, cycling_series()).with_video_count(25);
    let summarizer = Arc::new(MockSummarizer::replying(valid_brief_reply()));
    let (feed, _) = pipeline(fetcher, summarizer, 10)
        .run(&[KeywordEntry::new(EV)])
        .await;

    let value = serde_json::to_value(&feed).unwrap();
    let idea = &value["ideas"][0];
    assert_eq!(idea["keyword_group"], EV);
    assert_eq!(idea["category"], "generic");
    assert_eq!(idea["one_liner"], "아파트 충전 예약 서비스");
    assert_eq!(idea["score"]["breakdown"]["trend"], 60.0);
    assert!(value["generated_at"].as_str().unwrap().ends_with(" UTC"));
}
