//! API response and query types.

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::participants::Player;
use crate::sim::market::PriceSnapshot;
use crate::sim::report::FinalReport;
use crate::sim::state::RunStatus;
use crate::sim::types::TickSummary;
use crate::sim::weather::Weather;

/// Run status, player and outcome, with the configuration the game ran on.
#[derive(Debug, Serialize)]
pub struct StateResponse {
    pub config: GameConfig,
    pub status: RunStatus,
    pub day: u32,
    pub hour: u32,
    pub ticks: u64,
    pub player: Option<Player>,
    pub final_report: Option<FinalReport>,
    /// Summary of the last tick, if any tick ran.
    pub latest_tick: Option<TickSummary>,
}

/// Current market conditions.
#[derive(Debug, Serialize)]
pub struct MarketResponse {
    pub current_price: f64,
    pub supply: f64,
    pub demand: f64,
    pub volume: f64,
    pub weather: Weather,
    /// Oldest first.
    pub price_history: Vec<PricePoint>,
}

/// One price-history entry with its display label.
#[derive(Debug, Serialize)]
pub struct PricePoint {
    /// `"Day d, h:00"`.
    pub time: String,
    pub price: f64,
    pub supply: f64,
    pub demand: f64,
}

impl From<&PriceSnapshot> for PricePoint {
    fn from(s: &PriceSnapshot) -> Self {
        Self {
            time: s.label(),
            price: s.price,
            supply: s.supply,
            demand: s.demand,
        }
    }
}

/// Optional cap for the trades endpoint.
#[derive(Debug, Deserialize)]
pub struct TradesQuery {
    pub limit: Option<usize>,
}

/// Optional range query parameters for the telemetry endpoint.
#[derive(Debug, Deserialize)]
pub struct TelemetryQuery {
    /// First tick (inclusive).
    pub from: Option<u64>,
    /// Last tick (inclusive).
    pub to: Option<u64>,
}

/// Error response body for 400-class errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
