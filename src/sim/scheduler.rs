//! Drivers that call `GameEngine::tick` repeatedly.

use std::thread;
use std::time::Duration;

use super::engine::GameEngine;
use super::report::FinalReport;
use super::types::TickOutcome;

/// How long to wait between two advanced ticks.
pub trait Pacing {
    fn wait(&mut self);
}

/// No delay; ticks run back to back.
#[derive(Debug, Default, Clone, Copy)]
pub struct Immediate;

impl Pacing for Immediate {
    fn wait(&mut self) {}
}

/// Sleeps a fixed wall-clock interval after each advanced tick.
#[derive(Debug, Clone, Copy)]
pub struct FixedInterval {
    pub interval: Duration,
}

impl FixedInterval {
    pub fn from_millis(ms: u64) -> Self {
        Self {
            interval: Duration::from_millis(ms),
        }
    }
}

impl Pacing for FixedInterval {
    fn wait(&mut self) {
        thread::sleep(self.interval);
    }
}

/// Counts from one scheduler run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOutcome {
    /// Calls to `tick`.
    pub firings: usize,
    pub advanced: usize,
    pub skipped: usize,
    /// Set when the game ended during this run.
    pub report: Option<FinalReport>,
}

impl RunOutcome {
    fn record(&mut self, outcome: TickOutcome) -> bool {
        self.firings += 1;
        match outcome {
            TickOutcome::Advanced(_) => {
                self.advanced += 1;
                true
            }
            TickOutcome::Skipped => {
                self.skipped += 1;
                false
            }
            TickOutcome::Ended(report) => {
                self.advanced += 1;
                self.report = Some(report);
                false
            }
        }
    }
}

/// Repeatedly ticks an engine until the game ends, stops advancing, or a
/// tick limit is reached.
#[derive(Debug, Clone)]
pub struct Scheduler<P: Pacing> {
    pacing: P,
    limit: Option<usize>,
}

impl<P: Pacing> Scheduler<P> {
    pub fn new(pacing: P) -> Self {
        Self {
            pacing,
            limit: None,
        }
    }

    /// Caps the number of `tick` calls per [`Scheduler::run`].
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Starts the engine and ticks it until the game ends.
    ///
    /// A skipped tick ends the run: with a single-threaded driver nothing
    /// can resume a paused or stopped game.
    pub fn run(&mut self, engine: &mut GameEngine) -> RunOutcome {
        engine.start();
        let mut outcome = RunOutcome::default();
        while self.limit.is_none_or(|limit| outcome.firings < limit) {
            if !outcome.record(engine.tick()) {
                break;
            }
            self.pacing.wait();
        }
        outcome
    }

    /// Ticks exactly `n` times without pacing, whatever each tick returns.
    pub fn step(&mut self, engine: &mut GameEngine, n: usize) -> RunOutcome {
        let mut outcome = RunOutcome::default();
        for _ in 0..n {
            outcome.record(engine.tick());
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    #[derive(Default)]
    struct CountingPacing {
        waits: usize,
    }

    impl Pacing for CountingPacing {
        fn wait(&mut self) {
            self.waits += 1;
        }
    }

    #[test]
    fn runs_until_the_game_ends() {
        let mut engine = GameEngine::from_config(GameConfig::default());
        let outcome = Scheduler::new(Immediate).run(&mut engine);
        // Day 1 06:00 to day 8 00:00.
        assert_eq!(outcome.advanced, 18 + 24 * 6);
        assert_eq!(outcome.skipped, 0);
        assert_eq!(outcome.report.map(|r| r.days_played), Some(7));
    }

    #[test]
    fn limit_caps_firings_and_paces_each_tick() {
        let mut engine = GameEngine::from_config(GameConfig::default());
        let mut scheduler = Scheduler::new(CountingPacing::default()).with_limit(10);
        let outcome = scheduler.run(&mut engine);
        assert_eq!(outcome.firings, 10);
        assert_eq!(scheduler.pacing.waits, 10);
        assert!(outcome.report.is_none());
    }

    #[test]
    fn step_counts_skips_on_idle_engine() {
        let mut engine = GameEngine::from_config(GameConfig::default());
        let outcome = Scheduler::new(Immediate).step(&mut engine, 3);
        assert_eq!(outcome.skipped, 3);
        assert_eq!(outcome.advanced, 0);
    }

    #[test]
    fn fixed_interval_from_millis() {
        assert_eq!(
            FixedInterval::from_millis(250).interval,
            Duration::from_millis(250)
        );
    }
}
