use std::collections::BTreeMap;

use ideasignal_common::{
    pct_change, population_sigma, round2, Channel, Metrics, Score, ScoreCaps, TrendPoint,
    TrustCoefficients,
};

/// Regulatory signals are not collected; the channel holds a neutral value.
pub const REGULATORY_NEUTRAL: f64 = 50.0;

/// Raw item counts per source for one keyword group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceCounts {
    pub naver_blog: usize,
    pub naver_cafe: usize,
    pub daum_blog: usize,
    pub daum_cafe: usize,
    pub google: usize,
    pub reddit: usize,
    pub news: usize,
    pub video: usize,
}

/// Trust-weighted, uncapped channel totals.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawAggregates {
    pub community: f64,
    pub news: f64,
    pub video: f64,
}

impl RawAggregates {
    pub fn weigh(counts: &SourceCounts, trust: &TrustCoefficients) -> Self {
        let community = trust.naver_blog * counts.naver_blog as f64
            + trust.naver_cafe * counts.naver_cafe as f64
            + trust.daum_blog * counts.daum_blog as f64
            + trust.daum_cafe * counts.daum_cafe as f64
            + trust.reddit * counts.reddit as f64
            + trust.google * counts.google as f64;
        Self {
            community,
            news: trust.naver_news * counts.news as f64,
            video: trust.youtube * counts.video as f64,
        }
    }
}

/// Saturating map of `v` onto 0–100; `cap` is the value that reaches 100.
pub fn scale(v: f64, cap: f64) -> f64 {
    if cap <= 0.0 {
        return 0.0;
    }
    100.0 * v.clamp(0.0, cap) / cap
}

/// Per-channel values on the 0–100 scale, before weighting.
pub fn normalize(
    trend_last: f64,
    raw: &RawAggregates,
    caps: &ScoreCaps,
    trust: &TrustCoefficients,
) -> BTreeMap<Channel, f64> {
    BTreeMap::from([
        (
            Channel::Trend,
            (trend_last * trust.naver_datalab).clamp(0.0, 100.0),
        ),
        (Channel::Community, scale(raw.community, caps.community_max_raw)),
        (Channel::News, scale(raw.news, caps.news_max_raw)),
        (Channel::Video, scale(raw.video, caps.video_max_raw)),
        (Channel::RegulatoryInvert, REGULATORY_NEUTRAL),
    ])
}

/// Weighted composite over the configured channels only. A channel missing
/// from `normalized` counts as 0.
pub fn compute_score(
    normalized: &BTreeMap<Channel, f64>,
    weights: &BTreeMap<Channel, f64>,
) -> Score {
    let unit =
        |c: &Channel| (normalized.get(c).copied().unwrap_or(0.0) / 100.0).clamp(0.0, 1.0);

    let total: f64 = weights.iter().map(|(c, w)| w * unit(c)).sum();
    let breakdown = weights
        .keys()
        .map(|c| (*c, round2(unit(c) * 100.0)))
        .collect();

    Score {
        total: round2(total * 100.0),
        breakdown,
    }
}

pub fn compute_metrics(series: &[TrendPoint], raw: &RawAggregates) -> Metrics {
    let values: Vec<f64> = series.iter().map(|p| p.value).collect();

    let (trend_last, trend_delta_7, trend_delta_30) = match (values.first(), values.last()) {
        (Some(&first), Some(&last)) => {
            let base_7 = baseline(&values, 7).unwrap_or(first);
            // 30-day baseline is the window's first point (a 30-day range has 31 points)
            (last, pct_change(last, base_7), pct_change(last, first))
        }
        _ => (0.0, None, None),
    };

    Metrics {
        trend_last: round2(trend_last),
        trend_delta_7,
        trend_delta_30,
        trend_sigma: round2(population_sigma(&values)),
        community_weighted: round2(raw.community),
        news_weighted: round2(raw.news),
    }
}

/// Value `n` points back from the end, counting the last point as 1.
fn baseline(values: &[f64], n: usize) -> Option<f64> {
    values.len().checked_sub(n).map(|i| values[i])
}
