use std::collections::BTreeMap;
use std::fmt::Write as _;

use ai_client::util::{extract_json_object, strip_code_blocks};
use ai_client::{Agent, OpenAi, PromptBuilder};
use anyhow::{bail, Result};
use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use ideasignal_common::{IdeaBrief, Metrics};

use crate::evidence::Evidence;
use crate::traits::Summarizer;

/// Only this many evidence lines are shown to the model.
pub const PROMPT_EVIDENCE_LINES: usize = 12;

const TEMPERATURE: f32 = 0.2;

const SYSTEM_PROMPT: &str =
    "너는 한국 시장 리서치 에디터. 각 사실/수치 뒤 [번호]로 근거. 근거 없으면 문장 내 표기.";

const RESPONSE_SHAPE: &str = r#"{"one_liner":"최대 30자. 과장 금지.","summary":"2~4문장. 각 사실 뒤 [번호].","why_now":"정책/행태/기술 변화. 근거 없으면 '근거가 부족합니다'.","gtm_tactics":["..."],"market":"...","risks":"...","validation_steps":["..."]}"#;

/// Input to the summarizer for one scored idea.
#[derive(Debug, Clone)]
pub struct BriefRequest {
    pub title: String,
    pub category: String,
    pub tags: Vec<String>,
    pub score_total: f64,
    pub metrics: Metrics,
    pub community_counts: BTreeMap<String, usize>,
    pub evidence: Evidence,
}

impl BriefRequest {
    /// Korean user prompt: role, metrics, numbered evidence, idea header and
    /// the required JSON shape.
    pub fn user_prompt(&self) -> String {
        let m = &self.metrics;
        let mut prompt = String::new();

        prompt.push_str(
            "역할: 한국 시장 리서치 에디터. 모든 주장/숫자는 Evidence 번호로 근거. \
             근거 없으면 문장 안에 '근거가 부족합니다/확실하지 않음' 명시.\n\n",
        );
        let _ = writeln!(
            prompt,
            "입력 지표: 검색지수 최근 {}, 7일 {}, 30일 {}, σ {}, 커뮤니티(가중) {}, 뉴스(가중) {}",
            m.trend_last,
            fmt_delta(m.trend_delta_7),
            fmt_delta(m.trend_delta_30),
            m.trend_sigma,
            m.community_weighted,
            m.news_weighted,
        );
        if !self.community_counts.is_empty() {
            let counts: Vec<String> = self
                .community_counts
                .iter()
                .map(|(k, v)| format!("{k}:{v}"))
                .collect();
            let _ = writeln!(prompt, "커뮤니티 건수: {}", counts.join(", "));
        }

        prompt.push_str("\nEvidence:\n");
        for (n, e) in self.evidence.numbered().take(PROMPT_EVIDENCE_LINES) {
            let _ = writeln!(
                prompt,
                "[{}] {} ({}, {}) {}",
                n,
                e.title,
                e.publisher,
                e.date,
                e.url
            );
        }

        let _ = writeln!(
            prompt,
            "\n아이디어: {} / 카테고리: {} / 태그: {}",
            self.title,
            self.category,
            self.tags.join(", ")
        );
        let _ = writeln!(prompt, "점수: {}", self.score_total);
        prompt.push_str("\nJSON만:\n");
        prompt.push_str(RESPONSE_SHAPE);
        prompt.push('\n');
        prompt
    }
}

fn fmt_delta(delta: Option<f64>) -> String {
    delta.map_or_else(|| "없음".to_string(), |d| format!("{d}%"))
}

// --- Parsing ---

#[derive(Debug, Error)]
pub enum BriefParseError {
    #[error("reply contains no JSON object")]
    NoJsonObject,
    #[error("reply JSON does not match the brief shape: {0}")]
    Shape(#[from] serde_json::Error),
}

/// Stage 1 strips code fences and isolates the outermost `{...}`; stage 2 is
/// a strict parse where every field is required and extras are rejected.
pub fn parse_brief(reply: &str) -> Result<IdeaBrief, BriefParseError> {
    let unfenced = strip_code_blocks(reply);
    let object = extract_json_object(unfenced).ok_or(BriefParseError::NoJsonObject)?;
    Ok(serde_json::from_str(object)?)
}

// --- OpenAI summarizer ---

pub struct OpenAiSummarizer {
    agent: OpenAi,
}

impl OpenAiSummarizer {
    pub fn new(agent: OpenAi) -> Self {
        Self { agent }
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn summarize(&self, request: &BriefRequest) -> Result<String> {
        if self.agent.api_key().is_empty() {
            bail!("OPENAI_API_KEY not configured");
        }
        info!(title = request.title.as_str(), model = self.agent.model(), "Requesting brief");
        self.agent
            .prompt(request.user_prompt())
            .preamble(SYSTEM_PROMPT)
            .temperature(TEMPERATURE)
            .send()
            .await
    }
}
