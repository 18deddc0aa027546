// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wirehome hub daemon (`whd`) entry point.

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use wh_hub::{http, lifecycle, Config, LifecycleError};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("hub failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), LifecycleError> {
    let config = Config::load()?;
    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let state = Arc::new(lifecycle::startup(config)?);

    state.spawn_background();

    let interrupt = state.shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received");
            interrupt.cancel();
        }
    });

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| LifecycleError::BindFailed(addr, e))?;
    info!(%addr, "http facade listening");

    let drained = state.shutdown.clone();
    axum::serve(listener, http::router(Arc::clone(&state)))
        .with_graceful_shutdown(async move { drained.cancelled().await })
        .await?;

    state.stop();
    info!("hub stopped");
    Ok(())
}
