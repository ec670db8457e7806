//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use p2p_energy_sim::config::GameConfig;
use p2p_energy_sim::sim::scheduler::{Immediate, Scheduler};
use p2p_energy_sim::sim::{GameEngine, GameEvent, TickSummary, Topic};

/// Demo configuration with the given seed.
pub fn demo_config(seed: u64) -> GameConfig {
    let mut cfg = GameConfig::demo();
    cfg.game.seed = seed;
    cfg
}

/// Demo configuration with weather pinned to `weather` for the whole run.
pub fn fixed_weather_config(weather: &str, participant: &str) -> GameConfig {
    let mut cfg = GameConfig::demo();
    cfg.game.participant = participant.to_string();
    cfg.market.initial_weather = weather.to_string();
    cfg.market.weather_change_probability = 0.0;
    cfg.game.random_event_probability = 0.0;
    cfg
}

/// Records every event of `topic` delivered by `engine`.
pub fn collect(engine: &mut GameEngine, topic: Topic) -> Rc<RefCell<Vec<GameEvent>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    engine.on(topic, move |event| {
        sink.borrow_mut().push(event.clone());
        Ok(())
    });
    seen
}

/// Records every tick summary broadcast by `engine`.
pub fn collect_summaries(engine: &mut GameEngine) -> Rc<RefCell<Vec<TickSummary>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    engine.on(Topic::GameStateUpdated, move |event| {
        if let GameEvent::GameStateUpdated(summary) = event {
            sink.borrow_mut().push(summary.clone());
        }
        Ok(())
    });
    seen
}

/// Plays a full game for `config` and returns the engine and every summary.
pub fn play(config: GameConfig) -> (GameEngine, Vec<TickSummary>) {
    let mut engine = GameEngine::from_config(config);
    let summaries = collect_summaries(&mut engine);
    Scheduler::new(Immediate).run(&mut engine);
    let rows = summaries.borrow().clone();
    (engine, rows)
}

/// Ticks from day 1 06:00 until day 8 00:00.
pub const FULL_GAME_TICKS: usize = 18 + 24 * 6;
