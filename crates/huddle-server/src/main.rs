use std::path::Path;

use anyhow::Context;
use clap::Parser;
use huddle_config::HuddleConfig;
use huddle_db::service::HuddleService;
use huddle_server::cli::{Cli, Commands, LinksAction};
use huddle_server::{AppState, router};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("huddle error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let config = HuddleConfig::load_with_dotenv(cli.config_dir.as_deref())
        .context("failed to load configuration")?;
    let svc = open_service(&config).await?;

    match cli.command {
        Commands::Serve { bind } => serve(svc, config, bind).await,
        Commands::Links { action } => links(&svc, action).await,
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("HUDDLE_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

async fn open_service(config: &HuddleConfig) -> anyhow::Result<HuddleService> {
    let path = &config.database.path;
    if !config.database.is_in_memory() {
        if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    HuddleService::open_local(path)
        .await
        .with_context(|| format!("failed to open database at {path}"))
}

async fn serve(svc: HuddleService, config: HuddleConfig, bind: Option<String>) -> anyhow::Result<()> {
    let addr = bind.unwrap_or_else(|| config.server.bind.clone());
    let app = router(AppState::new(svc, config.general.clone()), &config.server);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, database = %config.database.path, "huddle listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server stopped unexpectedly")?;
    tracing::info!("huddle stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(%error, "failed to listen for ctrl-c");
    }
}

async fn links(svc: &HuddleService, action: LinksAction) -> anyhow::Result<()> {
    match action {
        LinksAction::Check => {
            let broken = svc.audit_link_symmetry().await?;
            if broken.is_empty() {
                println!("all links are mirrored");
            } else {
                println!("{}", serde_json::to_string_pretty(&broken)?);
                anyhow::bail!("{} asymmetric link(s) found", broken.len());
            }
        }
        LinksAction::Repair => {
            let repaired = svc.repair_link_symmetry(None).await?;
            println!("repaired {repaired} link(s)");
        }
    }
    Ok(())
}
