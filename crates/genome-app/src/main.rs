// Genome scoring service entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file)
// 2. Load config
// 3. Build the scoring engine
// 4. Load the athlete pool and log a leaderboard preview
// 5. Spawn WebSocket server task
// 6. Wait for Ctrl+C
// 7. Cleanup on exit

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use genome_app::config;
use genome_app::pool;
use genome_app::service::ScoringService;
use genome_app::ws_server;
use genome_core::leaderboard::build_leaderboard;
use genome_core::ScoringEngine;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("Genome scoring service starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: port={}, pool={}, {} programs, {} archetype rules",
        config.service.ws_port,
        config.service.data_paths.athletes,
        config.engine.programs.len(),
        config.engine.archetypes.len()
    );

    // 3. Build the scoring engine
    let engine = ScoringEngine::new(config.engine.clone())
        .context("failed to build scoring engine")?;

    // 4. Load the athlete pool
    let pool_path = Path::new(&config.service.data_paths.athletes);
    let athletes = if pool_path.exists() {
        pool::load_athletes(pool_path).context("failed to load athlete pool")?
    } else {
        warn!(
            "Athlete pool {} not found; starting with an empty pool",
            pool_path.display()
        );
        Vec::new()
    };

    let board = build_leaderboard(&engine, &athletes);
    for row in board.iter().take(config.service.leaderboard_preview) {
        info!(
            "#{:<3} {:<24} GAI {:>2} {:<10} QB {:>2} {:<9} {}",
            row.rank,
            row.name,
            row.score.gai.score,
            row.score.gai.tier.label(),
            row.score.qb_index,
            row.score.qb_tier.label(),
            row.score.gai.archetype.label()
        );
    }

    let service = Arc::new(ScoringService::new(engine, athletes));

    // 5. Spawn WebSocket server
    let port = config.service.ws_port;
    let ws_handle = tokio::spawn(async move {
        if let Err(e) = ws_server::run(port, service).await {
            error!("WebSocket server error: {e}");
        }
    });

    // 6. Wait for Ctrl+C
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("Shutdown requested");

    // 7. Cleanup
    ws_handle.abort();
    let _ = ws_handle.await;
    info!("Genome scoring service shut down");

    Ok(())
}

/// Log to `logs/genome.log` rather than the terminal.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("genome.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("genome_app=info,genome_core=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
