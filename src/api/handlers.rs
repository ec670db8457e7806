//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::AppState;
use super::types::{
    ErrorResponse, MarketResponse, PricePoint, StateResponse, TelemetryQuery, TradesQuery,
};
use crate::sim::leaderboard::LeaderboardEntry;
use crate::sim::ledger::{Trade, TradeLedger};
use crate::sim::types::TickSummary;

/// `GET /state` → 200 + `StateResponse` JSON
pub async fn get_state(State(state): State<Arc<AppState>>) -> Json<StateResponse> {
    let game = &state.game;
    Json(StateResponse {
        config: state.config.clone(),
        status: game.status,
        day: game.clock.day(),
        hour: game.clock.hour(),
        ticks: game.ticks,
        player: game.player.clone(),
        final_report: game.final_report.clone(),
        latest_tick: state.telemetry.last().cloned(),
    })
}

/// `GET /market` → 200 + `MarketResponse` JSON
pub async fn get_market(State(state): State<Arc<AppState>>) -> Json<MarketResponse> {
    let market = &state.game.market;
    Json(MarketResponse {
        current_price: market.current_price,
        supply: market.supply,
        demand: market.demand,
        volume: market.volume,
        weather: market.weather,
        price_history: market.price_history.iter().map(PricePoint::from).collect(),
    })
}

/// `GET /leaderboard` → 200 + ranked entries
pub async fn get_leaderboard(State(state): State<Arc<AppState>>) -> Json<Vec<LeaderboardEntry>> {
    Json(state.game.leaderboard.clone())
}

/// Returns the newest trades, newest first.
///
/// `GET /trades` → the newest ten
/// `GET /trades?limit=N` → the newest `N`
pub async fn get_trades(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TradesQuery>,
) -> Json<Vec<Trade>> {
    let limit = query.limit.unwrap_or(TradeLedger::RECENT_LIMIT);
    Json(state.game.ledger.iter().take(limit).cloned().collect())
}

/// Returns tick summaries, optionally filtered by tick range.
///
/// `GET /telemetry?from=N&to=M` → inclusive range
/// `GET /telemetry?from=10&to=5` → 400 + `ErrorResponse`
pub async fn get_telemetry(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TelemetryQuery>,
) -> impl IntoResponse {
    let from = query.from.unwrap_or(0);
    let to = query.to.unwrap_or(u64::MAX);

    if from > to {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("`from` ({from}) must be <= `to` ({to})"),
            }),
        ));
    }

    let rows: Vec<TickSummary> = state
        .telemetry
        .iter()
        .filter(|r| r.tick >= from && r.tick <= to)
        .cloned()
        .collect();

    Ok(Json(rows))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tower::util::ServiceExt;

    use super::*;
    use crate::api::router;
    use crate::config::GameConfig;
    use crate::sim::GameEngine;
    use crate::sim::ledger::TradeKind;

    fn make_test_state() -> Arc<AppState> {
        let mut engine = GameEngine::from_config(GameConfig::default());
        for _ in 0..12 {
            engine.execute_trade(TradeKind::Buy, 1.0, 0.1).ok();
        }
        engine.start();
        let telemetry: Vec<TickSummary> = (0..24)
            .filter_map(|_| engine.tick().summary().cloned())
            .collect();
        Arc::new(AppState::from_engine(&engine, telemetry))
    }

    async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
        let app = router(make_test_state());
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn state_returns_200() {
        let (status, json) = get_json("/state").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "running");
        assert_eq!(json["ticks"], 24);
        assert!(json["player"].is_object());
        assert!(json["final_report"].is_null());
        assert_eq!(json["config"]["game"]["participant"], "residential");
        assert_eq!(json["config"]["game"]["max_days"], 7);
    }

    #[tokio::test]
    async fn market_includes_bounded_history() {
        let (status, json) = get_json("/market").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["price_history"].as_array().map(Vec::len), Some(24));
        assert!(json["price_history"][23]["time"].is_string());
    }

    #[tokio::test]
    async fn leaderboard_has_six_entries() {
        let (_, json) = get_json("/leaderboard").await;
        assert_eq!(json.as_array().map(Vec::len), Some(6));
        assert_eq!(json[0]["rank"], 1);
    }

    #[tokio::test]
    async fn trades_default_and_limit() {
        let (_, json) = get_json("/trades").await;
        assert_eq!(json.as_array().map(Vec::len), Some(10));
        assert_eq!(json[0]["id"], 12);

        let (_, json) = get_json("/trades?limit=3").await;
        assert_eq!(json.as_array().map(Vec::len), Some(3));
    }

    #[tokio::test]
    async fn telemetry_range_query() {
        let (status, json) = get_json("/telemetry?from=5&to=10").await;
        assert_eq!(status, StatusCode::OK);
        let rows = json.as_array().cloned().unwrap_or_default();
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0]["tick"], 5);
        assert_eq!(rows[5]["tick"], 10);
    }

    #[tokio::test]
    async fn telemetry_invalid_range_returns_400() {
        let (status, json) = get_json("/telemetry?from=10&to=5").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json.get("error").is_some());
    }
}
