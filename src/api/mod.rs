//! REST API over a finished game.
//!
//! Read-only GET endpoints:
//! - `/state` for the run status, player, final report and configuration
//! - `/market` for current conditions and price history
//! - `/leaderboard` for the ranked board
//! - `/trades` for the newest trades
//! - `/telemetry` for per-tick summaries with optional range filtering

mod handlers;
mod types;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use log::info;

use crate::config::GameConfig;
use crate::sim::GameEngine;
use crate::sim::state::GameState;
use crate::sim::types::TickSummary;

pub use types::{
    ErrorResponse, MarketResponse, PricePoint, StateResponse, TelemetryQuery, TradesQuery,
};

/// Immutable snapshot shared across all request handlers.
///
/// Built once after the run completes and wrapped in `Arc`; nothing is
/// mutated while serving, so no locks are needed.
pub struct AppState {
    pub config: GameConfig,
    pub game: GameState,
    /// Per-tick summaries collected during the run.
    pub telemetry: Vec<TickSummary>,
}

impl AppState {
    /// Snapshots `engine` together with the collected telemetry.
    pub fn from_engine(engine: &GameEngine, telemetry: Vec<TickSummary>) -> Self {
        Self {
            config: engine.config().clone(),
            game: engine.game_state().clone(),
            telemetry,
        }
    }
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/state", get(handlers::get_state))
        .route("/market", get(handlers::get_market))
        .route("/leaderboard", get(handlers::get_leaderboard))
        .route("/trades", get(handlers::get_trades))
        .route("/telemetry", get(handlers::get_telemetry))
        .with_state(state)
}

/// Binds to `addr` and serves the API until the process exits.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("API server listening on http://{addr}");
    axum::serve(listener, app).await
}
