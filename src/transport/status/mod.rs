//! Small HTTP status page for hosting platforms that expect a bound port.

use crate::ledger::ShareLedger;
use crate::relay::StatsEntry;
use crate::relay::report::{STATS_LIMIT, stats_entries};
use anyhow::{Context, Result};
use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;

pub const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Clone)]
struct StatusState {
    ledger: Arc<ShareLedger>,
}

#[derive(serde::Serialize)]
struct HealthBody {
    status: &'static str,
    total_shares: u64,
    tracked_games: usize,
}

/// Bind `host:port` and serve until the task is dropped.
pub async fn run_status_server(host: &str, port: u16, ledger: Arc<ShareLedger>) -> Result<()> {
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .context("parse status page bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("bind status page socket")?;
    tracing::info!("Status page listening on http://{addr}");

    run_status_with_listener(listener, ledger).await
}

pub async fn run_status_with_listener(
    listener: tokio::net::TcpListener,
    ledger: Arc<ShareLedger>,
) -> Result<()> {
    axum::serve(listener, build_app(ledger))
        .await
        .context("serve status page")?;
    Ok(())
}

fn build_app(ledger: Arc<ShareLedger>) -> Router {
    Router::new()
        .route("/", get(handle_index))
        .route("/health", get(handle_health))
        .route("/stats", get(handle_stats))
        .with_state(StatusState { ledger })
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
        ))
}

/// GET /: liveness text
async fn handle_index() -> &'static str {
    "Steam link relay is running"
}

/// GET /health
async fn handle_health(State(state): State<StatusState>) -> impl IntoResponse {
    Json(HealthBody {
        status: "ok",
        total_shares: state.ledger.total_shares(),
        tracked_games: state.ledger.len(),
    })
}

/// GET /stats: same ranking as the chat command
async fn handle_stats(State(state): State<StatusState>) -> Json<Vec<StatsEntry>> {
    Json(stats_entries(&state.ledger, STATS_LIMIT))
}
