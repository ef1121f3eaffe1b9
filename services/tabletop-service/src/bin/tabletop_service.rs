use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use tabletop_api::{app_routes, setup_tracing, ApiServerEnv, GlobalState};
use tabletop_common::EnvVars;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenv::dotenv();
    setup_tracing();

    let env = ApiServerEnv::load()?;
    let cors = CorsLayer::very_permissive();
    let trace = TraceLayer::new_for_http();

    let global_state = GlobalState::connect()
        .await
        .context("failed to set up the PostgreSQL client")?;

    let app = Router::new()
        .merge(app_routes())
        .layer(TimeoutLayer::new(Duration::from_secs(env.request_timeout_secs)))
        .layer(cors)
        .layer(trace)
        .with_state(global_state);

    let port = env.port;
    let listener = tokio::net::TcpListener::bind(format!("[::]:{port}"))
        .await
        .with_context(|| format!("failed to bind port {port}"))?;

    tracing::info!("LISTENING ON {port}");
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {:?}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
