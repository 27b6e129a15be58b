// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # SwarmWare Server
//!
//! The `swarmware` binary serves the dashboard backend: REST under `/api`,
//! the realtime channel at `/ws`, Postgres persistence underneath.
//!
//! Startup order matters: connect the pool, run migrations, seed the
//! app-state defaults (idempotent), then serve until ctrl-c/SIGTERM.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use colored::Colorize;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use swarmware_core::application::dashboard::DashboardService;
use swarmware_core::domain::repository::AppStateStore;
use swarmware_core::infrastructure::db::Database;
use swarmware_core::infrastructure::event_bus::EventBus;
use swarmware_core::infrastructure::repositories::{
    PostgresAgentRepository, PostgresApiCallRepository, PostgresAppStateStore,
    PostgresSecurityAlertRepository, PostgresSwarmRepository, PostgresTemplateRepository,
    PostgresUserRepository,
};
use swarmware_core::presentation::api::{router, AppContext};

/// SwarmWare - AI agent swarm dashboard server
#[derive(Parser)]
#[command(name = "swarmware")]
#[command(version, about, long_about = None)]
struct Cli {
    /// HTTP listen host
    #[arg(long, env = "SWARMWARE_HOST", default_value = "127.0.0.1")]
    host: String,

    /// HTTP listen port
    #[arg(long, env = "SWARMWARE_PORT", default_value = "5000")]
    port: u16,

    /// Postgres connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "SWARMWARE_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(&cli.log_level)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    println!(
        "{} {}",
        "SwarmWare".bright_cyan().bold(),
        env!("CARGO_PKG_VERSION").dimmed()
    );

    let db = Database::connect(&cli.database_url)
        .await
        .context("Failed to connect to Postgres")?;
    db.run_migrations()
        .await
        .context("Failed to run schema migrations")?;
    let pool = db.get_pool().clone();

    let app_state: Arc<dyn AppStateStore> = Arc::new(PostgresAppStateStore::new(pool.clone()));
    app_state
        .initialize_defaults(Utc::now())
        .await
        .context("Failed to seed app-state defaults")?;

    let swarms = Arc::new(PostgresSwarmRepository::new(pool.clone()));
    let agents = Arc::new(PostgresAgentRepository::new(pool.clone()));
    let dashboard = Arc::new(DashboardService::new(
        swarms.clone(),
        agents.clone(),
        app_state.clone(),
    ));

    let ctx = AppContext {
        users: Arc::new(PostgresUserRepository::new(pool.clone())),
        swarms,
        agents,
        templates: Arc::new(PostgresTemplateRepository::new(pool.clone())),
        alerts: Arc::new(PostgresSecurityAlertRepository::new(pool.clone())),
        api_calls: Arc::new(PostgresApiCallRepository::new(pool.clone())),
        app_state,
        dashboard,
        events: EventBus::with_default_capacity(),
    };

    let app = router(ctx);
    let addr = format!("{}:{}", cli.host, cli.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("SwarmWare listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("SwarmWare shutting down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
