use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ai_client::OpenAi;
use ideasignal_common::{load_keywords, Config, IdeaFeed, IdeaSignalError, RunConfig};
use ideasignal_scout::brief::OpenAiSummarizer;
use ideasignal_scout::pipeline::IdeaPipeline;
use ideasignal_scout::sources::LiveFetcher;

/// Collect market signals for each keyword group and write the ranked idea feed.
#[derive(Parser, Debug)]
#[command(name = "ideasignal-scout", version)]
struct Args {
    /// Keyword groups to research.
    #[arg(long, default_value = "tools/keywords.json")]
    keywords: PathBuf,

    /// Scoring configuration.
    #[arg(long, default_value = "tools/config.json")]
    config: PathBuf,

    /// Content filter rules.
    #[arg(long, default_value = "tools/filters.json")]
    filters: PathBuf,

    /// Output feed path.
    #[arg(long, default_value = "docs/ideas.json")]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("ideasignal=info".parse()?))
        .init();

    let args = Args::parse();
    info!("IdeaSignal scout starting...");

    let config = Config::from_env();
    config.log_redacted();

    let run_config = Arc::new(RunConfig::load(&args.config, &args.filters)?);
    let entries = load_keywords(&args.keywords)?;
    info!(
        entries = entries.len(),
        model = run_config.scoring.model.as_str(),
        "Configuration loaded"
    );

    let fetcher = Arc::new(LiveFetcher::new(&config, Arc::new(run_config.filters.clone())));

    let mut agent = OpenAi::new(&config.openai_api_key, &run_config.scoring.model);
    if let Some(base_url) = &config.openai_base_url {
        agent = agent.with_base_url(base_url);
    }
    let summarizer = Arc::new(OpenAiSummarizer::new(agent));

    let pipeline = IdeaPipeline::new(fetcher, summarizer, run_config);
    let (feed, _stats) = pipeline.run(&entries).await;

    write_feed(&args.output, &feed)?;
    info!(path = %args.output.display(), ideas = feed.ideas.len(), "Idea feed written");
    Ok(())
}

/// Pretty-printed UTF-8 JSON, replacing any previous snapshot.
fn write_feed(path: &Path, feed: &IdeaFeed) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| IdeaSignalError::Output(format!("{}: {e}", parent.display())))?;
    }
    let json = serde_json::to_string_pretty(feed).context("Failed to serialize idea feed")?;
    std::fs::write(path, json)
        .map_err(|e| IdeaSignalError::Output(format!("{}: {e}", path.display())))?;
    Ok(())
}
