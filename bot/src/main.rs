mod config;
mod dispatcher;
mod session;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use config::BotConfig;
use dispatcher::{ChallengePolicy, Dispatcher};
use lichess_client::{BotApi, LichessClient};
use session::{SessionManager, SessionSettings};
use strategies::StrategyRegistry;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = BotConfig::parse();
    let _log_guard = init_tracing(config.log_dir.as_deref())?;

    tracing::info!("Starting multibot");

    let token = config.read_token()?;
    let api: Arc<dyn BotApi> = Arc::new(LichessClient::new(&config.base_url, token)?);
    let player_id = api
        .account_id()
        .await
        .context("Lichess rejected the API token")?;
    println!("Connected to Lichess as: {}", player_id);

    let oracle = config.oracle()?;
    match &oracle {
        Some(engine) => tracing::info!("Using Stockfish at {}", engine.path.display()),
        None => tracing::warn!("Can't find Stockfish, engine strategies disabled"),
    }
    let registry = Arc::new(StrategyRegistry::new(oracle));
    tracing::info!("Strategies: {}", registry.names().join(", "));

    let preselected = match config.strategy.as_deref() {
        Some(name) => {
            let kind = registry.by_prefix(name).with_context(|| {
                format!(
                    "Unknown strategy {:?}, expected one of: {}",
                    name,
                    registry.names().join(", ")
                )
            })?;
            tracing::info!("Playing every game with {}", kind.display_name());
            Some(kind)
        }
        None => None,
    };

    let sessions = Arc::new(SessionManager::new(
        api.clone(),
        SessionSettings {
            registry,
            preselected,
            negotiation_secs: config.negotiation_secs,
        },
    ));
    let policy = ChallengePolicy {
        require_clock: !config.allow_any_time_control,
    };
    let dispatcher = Dispatcher::new(api, player_id, policy, sessions.clone());

    let result = dispatcher.run(shutdown_signal()).await;
    sessions.shutdown_all().await;
    result?;

    tracing::info!("multibot stopped");
    Ok(())
}

/// Resolves on Ctrl-C; never resolves if the handler can't be installed.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Ctrl-C received");
}

/// Log to stdout, and to a daily rolling file when `log_dir` is set.
fn init_tracing(
    log_dir: Option<&Path>,
) -> anyhow::Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout = fmt::layer().with_span_events(FmtSpan::CLOSE);

    match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let file_appender = tracing_appender::rolling::daily(dir, "multibot.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(stdout)
                .with(
                    fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false)
                        .with_target(true)
                        .with_line_number(true),
                )
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry().with(filter).with(stdout).init();
            Ok(None)
        }
    }
}
