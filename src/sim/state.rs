//! The single owned game state.

use rand::Rng;
use serde::Serialize;

use super::automation::RuleBook;
use super::clock::GameClock;
use super::incidents::IncidentLog;
use super::leaderboard::{self, LeaderboardEntry};
use super::ledger::TradeLedger;
use super::market::Market;
use super::peers::{self, Peer};
use super::report::FinalReport;
use super::weather::Weather;
use crate::config::GameConfig;
use crate::participants::Player;

/// Lifecycle of a game run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Not started yet.
    #[default]
    Idle,
    Running,
    Paused,
    /// Stopped by the caller before the last day.
    Stopped,
    /// Past the final day; the final report exists.
    Ended,
}

impl RunStatus {
    pub fn is_running(self) -> bool {
        self == RunStatus::Running
    }
}

/// Everything the engine mutates, owned in one place.
#[derive(Debug, Clone, Serialize)]
pub struct GameState {
    pub clock: GameClock,
    pub status: RunStatus,
    /// Ticks advanced so far.
    pub ticks: u64,
    pub market: Market,
    pub player: Option<Player>,
    pub peers: Vec<Peer>,
    pub ledger: TradeLedger,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub incidents: IncidentLog,
    pub rules: RuleBook,
    pub final_report: Option<FinalReport>,
}

impl GameState {
    /// Builds the opening state for `config`. An unparsable initial weather
    /// falls back to sunny; `GameConfig::validate` reports it.
    pub fn new(config: &GameConfig, rng: &mut impl Rng) -> Self {
        let weather = config
            .market
            .initial_weather
            .parse::<Weather>()
            .unwrap_or_default();
        Self {
            clock: GameClock::new(
                config.game.start_day,
                config.game.start_hour,
                config.game.max_days,
            ),
            status: RunStatus::Idle,
            ticks: 0,
            market: Market::new(&config.market, weather, rng),
            player: None,
            peers: peers::demo_peers(),
            ledger: TradeLedger::new(),
            leaderboard: leaderboard::rank(None),
            incidents: IncidentLog::new(),
            rules: RuleBook::new(),
            final_report: None,
        }
    }
}
