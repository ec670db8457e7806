//! Integration tests for the REST API feature.

#![cfg(feature = "api")]

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::util::ServiceExt;

use common::{FULL_GAME_TICKS, play};
use p2p_energy_sim::api::{AppState, router};
use p2p_energy_sim::config::GameConfig;

fn build_api_state() -> Arc<AppState> {
    let (engine, telemetry) = play(GameConfig::multiplayer());
    Arc::new(AppState::from_engine(&engine, telemetry))
}

async fn get(uri: &str) -> (StatusCode, serde_json::Value) {
    let app = router(build_api_state());
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn finished_game_reports_final_state() {
    let (status, json) = get("/state").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ended");
    assert_eq!(json["final_report"]["days_played"], 7);
    assert_eq!(json["day"], 8);
    assert_eq!(json["latest_tick"]["tick"], FULL_GAME_TICKS as u64);
    assert_eq!(json["config"]["game"]["seed"], 42);
    assert_eq!(json["config"]["peers"]["enabled"], true);
}

#[tokio::test]
async fn market_prices_are_in_band() {
    let (_, json) = get("/market").await;
    let price = json["current_price"].as_f64().unwrap();
    assert!((0.05..=0.50).contains(&price));
    assert_eq!(json["price_history"].as_array().unwrap().len(), 24);
}

#[tokio::test]
async fn leaderboard_is_ranked() {
    let (_, json) = get("/leaderboard").await;
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 6);
    for (i, e) in entries.iter().enumerate() {
        assert_eq!(e["rank"], i + 1);
    }
}

#[tokio::test]
async fn trades_respect_limit() {
    let (status, json) = get("/trades?limit=2").await;
    assert_eq!(status, StatusCode::OK);
    assert!(json.as_array().unwrap().len() <= 2);
}

#[tokio::test]
async fn telemetry_covers_the_whole_run() {
    let (_, json) = get("/telemetry").await;
    assert_eq!(json.as_array().unwrap().len(), FULL_GAME_TICKS);

    let (_, json) = get("/telemetry?from=100").await;
    assert_eq!(json.as_array().unwrap().len(), FULL_GAME_TICKS - 99);
}

#[tokio::test]
async fn telemetry_rejects_inverted_range() {
    let (status, json) = get("/telemetry?from=20&to=10").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("must be <="));
}
