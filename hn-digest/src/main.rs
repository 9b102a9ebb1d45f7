use anyhow::Context;
use clap::Parser;
use hn_digest::{AppContext, DigestConfig, OutcomeStatus, Ranking};
use std::env;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Summarize and translate the day's top Hacker News stories.
#[derive(Parser, Debug)]
#[command(name = "hn-digest", version, about)]
struct Args {
    /// How far back to look for stories, in hours
    #[arg(long, default_value_t = 24)]
    hours: u32,

    /// Maximum number of stories (capped at 10)
    #[arg(long, default_value_t = 10)]
    limit: usize,

    /// Which listing to pull candidates from
    #[arg(long, value_enum, default_value_t = Ranking::Top)]
    ranking: Ranking,

    /// Output file (defaults to hackernews_daily_<date>.md in --output-dir)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long, env = "HN_DIGEST_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Model to use for summaries and translation
    #[arg(long, env = "ANTHROPIC_MODEL")]
    model: Option<String>,

    /// Print the pipeline outcome as JSON
    #[arg(long)]
    json: bool,

    #[arg(long, default_value = "hackernews_agent.log")]
    log_file: PathBuf,

    /// Log to stderr only
    #[arg(long)]
    no_log_file: bool,
}

fn init_tracing(log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(fmt::layer().with_ansi(false).with_writer(Arc::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(())
}

async fn run(args: Args) -> anyhow::Result<()> {
    let api_key = env::var("ANTHROPIC_API_KEY").context("ANTHROPIC_API_KEY must be set")?;

    let mut config = DigestConfig::default();
    config.fetch.ranking = args.ranking;
    config.output_dir = args.output_dir;
    if let Some(model) = args.model {
        config.generation.model = model;
    }

    let context = AppContext::connect(config, &api_key).context("Failed to set up clients")?;
    let outcome = context.orchestrator().run(args.hours, args.limit).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    }

    match (outcome.status(), outcome.translated_stories()) {
        (OutcomeStatus::Success, Some(translated)) => {
            match context.writer().persist(translated, args.output.as_deref()).await {
                Ok(path) => {
                    info!("Process completed successfully. Results saved to {}", path.display());
                    println!("Process completed successfully. Results saved to {}", path.display());
                }
                Err(e) => {
                    warn!("Process completed but the results could not be saved: {}", e);
                    println!("Process completed but the results could not be saved: {}", e);
                }
            }
        }
        (status, _) => {
            error!(
                "Process ended with status {}. Message: {}",
                status,
                outcome.message()
            );
            println!("Error: {}", outcome.message());
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let log_file = (!args.no_log_file).then(|| args.log_file.clone());
    init_tracing(log_file.as_deref())?;

    info!("Starting HN digest");

    if let Err(e) = run(args).await {
        error!("Error during execution: {:#}", e);
        println!("Error during execution: {:#}", e);
    }

    Ok(())
}
