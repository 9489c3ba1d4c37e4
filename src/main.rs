mod backoff;
mod cli;
mod config;
mod error;
mod fetch;
mod notify;
mod pipeline;
mod render;
mod ui;
mod vidu;

use anyhow::Result;
use clap::Parser;
use console::Style;
use tracing::warn;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Command};
use config::BoothConfig;
use fetch::ArtifactFetcher;
use notify::{CommandNotifier, Notifier};
use pipeline::{Pipeline, PipelineEvent, TerminalEvent};
use render::LocalRenderer;
use ui::JobProgress;
use vidu::ViduClient;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "aibooth=debug"
    } else {
        "aibooth=info"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = BoothConfig::load()?;

    match cli.command {
        Command::Check => check(&config).await,
        Command::Run { image, notify } => run(&config, image, notify).await,
    }
}

async fn check(config: &BoothConfig) -> Result<()> {
    let api_key = config.require_api_key()?;
    let client = ViduClient::with_base_url(api_key.to_string(), config.api_base_url.clone());

    match client.check_access().await {
        Ok(()) => {
            println!(
                "  {} API reachable, credentials accepted",
                Style::new().green().bold().apply_to("✓")
            );
            Ok(())
        }
        Err(e) => {
            println!(
                "  {} API check failed: {e}",
                Style::new().red().bold().apply_to("✗")
            );
            std::process::exit(1);
        }
    }
}

async fn run(
    config: &BoothConfig,
    image: std::path::PathBuf,
    notify: Option<String>,
) -> Result<()> {
    let api_key = config.require_api_key()?;

    if !image.exists() {
        anyhow::bail!("image not found: {}", image.display());
    }
    let ext = image
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    if !matches!(ext.as_deref(), Some("jpg" | "jpeg" | "png")) {
        anyhow::bail!(
            "unsupported image type: {} (expected jpg, jpeg or png)",
            image.display()
        );
    }

    let generator = ViduClient::with_base_url(api_key.to_string(), config.api_base_url.clone());
    let fetcher = ArtifactFetcher::new();
    let renderer = LocalRenderer::new(
        config.render_exe.clone(),
        config.render_project.clone(),
        config.output_dir.clone(),
    );

    let (handle, mut events) =
        Pipeline::new(generator, fetcher, renderer, config.output_dir.clone()).start();

    handle
        .enqueue(image.clone())
        .map_err(|e| anyhow::anyhow!("cannot start job: {e}"))?;

    let progress = JobProgress::start(&image.display().to_string());
    let mut outcome = None;

    while let Some(event) = events.recv().await {
        match event {
            PipelineEvent::Progress {
                stage,
                percent,
                message,
                ..
            } => progress.update(stage, percent, &message),
            PipelineEvent::Terminal { event, .. } => {
                progress.complete(&event);
                outcome = Some(event);
                break;
            }
        }
    }

    match outcome {
        Some(TerminalEvent::Success { output }) => {
            if let Some(recipient) = notify {
                deliver(config, &recipient, &output).await;
            }
            Ok(())
        }
        Some(TerminalEvent::Failure { .. }) => std::process::exit(1),
        None => anyhow::bail!("pipeline worker stopped without reporting an outcome"),
    }
}

async fn deliver(config: &BoothConfig, recipient: &str, output: &std::path::Path) {
    let Some(command) = &config.notify_command else {
        warn!("--notify given but notify_command is not configured, skipping delivery");
        return;
    };

    let notifier = CommandNotifier::new(command.clone());
    if let Err(e) = notifier.notify(recipient, output).await {
        // Delivery failure does not change the job outcome.
        warn!("notification failed: {e}");
    }
}
