//! Event, topic and per-tick record types shared by the engine and its
//! subscribers.

use std::fmt;

use serde::Serialize;

use super::automation::AutomationRule;
use super::incidents::Incident;
use super::ledger::Trade;
use super::report::FinalReport;
use super::weather::Weather;
use crate::participants::{EnergyFlow, Player};

/// Subscription key on the event bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Topic {
    GameStarted,
    GamePaused,
    GameStopped,
    GameStateUpdated,
    PlayerUpdated,
    PlayerEnergyUpdated,
    TradeExecuted,
    TradeError,
    WeatherChanged,
    RandomEvent,
    NewDay,
    GameEnded,
    AutomationRuleAdded,
    AutomationRuleToggled,
    PeerTradeExecuted,
}

impl Topic {
    pub const ALL: [Topic; 15] = [
        Topic::GameStarted,
        Topic::GamePaused,
        Topic::GameStopped,
        Topic::GameStateUpdated,
        Topic::PlayerUpdated,
        Topic::PlayerEnergyUpdated,
        Topic::TradeExecuted,
        Topic::TradeError,
        Topic::WeatherChanged,
        Topic::RandomEvent,
        Topic::NewDay,
        Topic::GameEnded,
        Topic::AutomationRuleAdded,
        Topic::AutomationRuleToggled,
        Topic::PeerTradeExecuted,
    ];
}

/// Broadcast payloads. Each variant maps to exactly one [`Topic`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum GameEvent {
    GameStarted,
    /// `true` when the game is now paused.
    GamePaused(bool),
    GameStopped,
    GameStateUpdated(TickSummary),
    PlayerUpdated(Player),
    PlayerEnergyUpdated(EnergyFlow),
    TradeExecuted(Trade),
    TradeError { message: String },
    WeatherChanged(Weather),
    RandomEvent(Incident),
    NewDay(u32),
    GameEnded(FinalReport),
    AutomationRuleAdded(AutomationRule),
    AutomationRuleToggled { rule_id: u64, enabled: bool },
    PeerTradeExecuted(Trade),
}

impl GameEvent {
    pub fn topic(&self) -> Topic {
        match self {
            GameEvent::GameStarted => Topic::GameStarted,
            GameEvent::GamePaused(_) => Topic::GamePaused,
            GameEvent::GameStopped => Topic::GameStopped,
            GameEvent::GameStateUpdated(_) => Topic::GameStateUpdated,
            GameEvent::PlayerUpdated(_) => Topic::PlayerUpdated,
            GameEvent::PlayerEnergyUpdated(_) => Topic::PlayerEnergyUpdated,
            GameEvent::TradeExecuted(_) => Topic::TradeExecuted,
            GameEvent::TradeError { .. } => Topic::TradeError,
            GameEvent::WeatherChanged(_) => Topic::WeatherChanged,
            GameEvent::RandomEvent(_) => Topic::RandomEvent,
            GameEvent::NewDay(_) => Topic::NewDay,
            GameEvent::GameEnded(_) => Topic::GameEnded,
            GameEvent::AutomationRuleAdded(_) => Topic::AutomationRuleAdded,
            GameEvent::AutomationRuleToggled { .. } => Topic::AutomationRuleToggled,
            GameEvent::PeerTradeExecuted(_) => Topic::PeerTradeExecuted,
        }
    }
}

/// Snapshot of market and player after one tick.
///
/// Player fields are zero when no player has been initialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickSummary {
    /// 1-based tick counter.
    pub tick: u64,
    pub day: u32,
    pub hour: u32,
    pub price: f64,
    pub supply: f64,
    pub demand: f64,
    pub volume: f64,
    pub weather: Weather,
    pub cash: f64,
    pub energy_balance: f64,
    pub battery_level: f64,
    pub total_profit: f64,
    pub daily_profit: f64,
    pub trade_count: usize,
}

impl fmt::Display for TickSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:>3}] Day {} {:02}:00 | ${:.4}/kWh | supply {:>5.0} demand {:>5.0} | {:<6} | \
             cash ${:.2} energy {:+.2} battery {:.2} | profit ${:.2}",
            self.tick,
            self.day,
            self.hour,
            self.price,
            self.supply,
            self.demand,
            self.weather.as_str(),
            self.cash,
            self.energy_balance,
            self.battery_level,
            self.total_profit
        )
    }
}

/// Result of calling `GameEngine::tick`.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// The game was not running, or paused.
    Skipped,
    Advanced(TickSummary),
    /// This tick ended the game.
    Ended(FinalReport),
}

impl TickOutcome {
    pub fn summary(&self) -> Option<&TickSummary> {
        match self {
            TickOutcome::Advanced(s) => Some(s),
            _ => None,
        }
    }
}
