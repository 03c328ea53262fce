//! ClipGenius command-line front-end.

mod progress;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use clipgen_gemini::GeminiClient;
use clipgen_media::FfprobeDurationProbe;
use clipgen_models::{Platform, SessionPhase};
use clipgen_session::{IgnoreReason, Session, SessionConfig, StartOutcome, FAILURE_NOTICE};

#[derive(Parser)]
#[command(
    name = "clipgen",
    version,
    about = "Turn long videos into a viral short strategy"
)]
struct Cli {
    /// Video files to analyze
    #[arg(required = true)]
    videos: Vec<PathBuf>,

    /// Optional context for the analysis
    #[arg(short, long)]
    prompt: Option<String>,

    /// Platform tab shown in the result (youtube or tiktok)
    #[arg(long, default_value = "youtube")]
    platform: Platform,

    /// Start right away instead of waiting for duration probes
    #[arg(long)]
    no_wait_probes: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let level = if verbose { "clipgen=debug" } else { "clipgen=warn" };
    let env_filter = EnvFilter::from_default_env().add_directive(level.parse()?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .with(env_filter)
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // TLS for the Gemini endpoint; a second install is harmless
    let _ = rustls::crypto::ring::default_provider().install_default();

    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let client = GeminiClient::from_env().context("Gemini client configuration")?;
    let config = SessionConfig::from_env();
    info!("Session config: {:?}", config);

    let probe = FfprobeDurationProbe::new(config.probe_timeout);
    let session = Session::new(config, Arc::new(client), Arc::new(probe));

    session
        .add_assets(&cli.videos)
        .await
        .context("Failed to add videos")?;
    if !cli.no_wait_probes {
        session.settle_probes().await;
    }

    let snapshot = session.snapshot().await;
    if !cli.json {
        eprint!("{}", render::upload_grid(&snapshot.assets));
    }

    let events = session.subscribe();
    let follower = tokio::spawn(progress::follow(events, cli.json));

    match session.start_processing(cli.prompt.clone()).await {
        StartOutcome::Started { aggregate } => {
            info!(
                total_duration = aggregate.total_duration,
                target_duration = aggregate.target_duration(),
                "Processing started"
            );
        }
        StartOutcome::Ignored(IgnoreReason::NoAssets) => {
            follower.abort();
            anyhow::bail!("No videos to process");
        }
        StartOutcome::Ignored(IgnoreReason::WrongPhase(phase)) => {
            follower.abort();
            anyhow::bail!("Session is busy ({})", phase);
        }
    }

    let phase = session.wait_for_outcome().await;
    let report = follower.await.context("Progress view stopped")??;

    if phase != SessionPhase::Result {
        let kind = report
            .failure
            .as_ref()
            .map(|(_, kind)| kind.as_str())
            .unwrap_or("unknown");
        warn!(kind, "Strategy request failed");
        eprintln!("{}", FAILURE_NOTICE);
        return Ok(ExitCode::FAILURE);
    }

    let Some(result) = session.snapshot().await.result else {
        eprintln!("{}", FAILURE_NOTICE);
        return Ok(ExitCode::FAILURE);
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", render::dashboard(&result, cli.platform));
    }

    session.reset().await;
    Ok(ExitCode::SUCCESS)
}
