pub mod automation;
/// Simulated day/hour clock.
pub mod clock;
pub mod engine;
/// Topic-keyed event bus with isolated handlers.
pub mod event;
pub mod incidents;
pub mod leaderboard;
pub mod ledger;
/// Price, supply and demand model.
pub mod market;
pub mod peers;
pub mod report;
/// Tick drivers and wall-clock pacing.
pub mod scheduler;
pub mod state;
pub mod types;
pub mod weather;

pub use engine::GameEngine;
pub use event::{Dispatch, EventBus, HandlerResult};
pub use state::{GameState, RunStatus};
pub use types::{GameEvent, TickOutcome, TickSummary, Topic};
