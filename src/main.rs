// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use basket_manager::{
    api::router,
    auth::SecretKeyManager,
    config::{Config, LogFormat, DEFAULT_LOG_FILTER},
    state::AppState,
    storage::BasketDatabase,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();
    init_tracing(config.log_format);

    // One secret per process; tokens do not survive a restart
    let secret = SecretKeyManager::init();

    let db = match BasketDatabase::open_in_dir(&config.data_dir) {
        Ok(db) => db,
        Err(e) => {
            error!(error = %e, data_dir = %config.data_dir.display(), "Failed to open database");
            std::process::exit(1);
        }
    };
    info!(data_dir = %config.data_dir.display(), "Database opened");

    let state = AppState::new(Arc::new(db), secret);
    let app = router(state);

    let Some(addr) = config.bind_addr() else {
        error!(host = %config.host, port = config.port, "Failed to parse bind address");
        std::process::exit(1);
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, %addr, "Failed to bind");
            std::process::exit(1);
        }
    };

    info!(%addr, "Basket manager listening (docs at /docs)");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %e, "Server failed");
        std::process::exit(1);
    }
}
