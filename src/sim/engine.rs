//! Game engine that owns the state and drives one tick at a time.

use log::{debug, info, warn};
use rand::{SeedableRng, rngs::StdRng};

use super::automation::{AutomationRule, RuleKind};
use super::event::{EventBus, HandlerResult};
use super::incidents::Incident;
use super::leaderboard::{self, LeaderboardEntry};
use super::ledger::{Trade, TradeKind, TradeRequest};
use super::market::Market;
use super::peers::{Peer, PeerNetwork};
use super::report::FinalReport;
use super::state::{GameState, RunStatus};
use super::types::{GameEvent, TickOutcome, TickSummary, Topic};
use crate::config::GameConfig;
use crate::error::TradeError;
use crate::participants::{Player, catalog};

/// Single owner of the game state.
///
/// All mutation goes through the engine, which broadcasts what changed on
/// its [`EventBus`]. The engine never schedules itself; a driver calls
/// [`GameEngine::tick`].
#[derive(Debug)]
pub struct GameEngine {
    config: GameConfig,
    state: GameState,
    bus: EventBus,
    rng: StdRng,
    peers: PeerNetwork,
}

impl GameEngine {
    /// Creates an idle engine with no player. Automation rules listed in
    /// `config` are preloaded; unparsable ones are skipped.
    pub fn new(config: GameConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.game.seed);
        let mut state = GameState::new(&config, &mut rng);
        for rule in &config.automation.rules {
            match rule.kind.parse::<RuleKind>() {
                Ok(kind) => {
                    state.rules.add(kind, rule.price_threshold);
                }
                Err(e) => warn!("skipping automation rule: {e}"),
            }
        }
        let peers = PeerNetwork::new(config.peers.clone(), &config.market);
        Self {
            config,
            state,
            bus: EventBus::new(),
            rng,
            peers,
        }
    }

    /// Creates an engine with the player and archetype named in `config`.
    pub fn from_config(config: GameConfig) -> Self {
        let id = config.game.player_id.clone();
        let name = config.game.player_name.clone();
        let participant = config.game.participant.clone();
        let mut engine = Self::new(config);
        engine.init_player(id, name);
        if !engine.set_participant_type(&participant) {
            warn!("unknown participant type \"{participant}\", player has no archetype");
        }
        engine
    }

    /// Subscribes `handler` to `topic`.
    pub fn on<F>(&mut self, topic: Topic, handler: F)
    where
        F: FnMut(&GameEvent) -> HandlerResult + 'static,
    {
        self.bus.on(topic, handler);
    }

    /// Creates the player with zero balances and no archetype.
    pub fn init_player(&mut self, id: impl Into<String>, name: impl Into<String>) {
        self.state.player = Some(Player::new(id, name));
        self.refresh_leaderboard();
    }

    /// Assigns an archetype to the player, loading its starting cash and a
    /// partly charged battery. Returns `false`, with no event, when `key`
    /// is unknown or no player exists.
    pub fn set_participant_type(&mut self, key: &str) -> bool {
        let Some(profile) = catalog::lookup(key) else {
            return false;
        };
        let fraction = self.config.game.initial_battery_fraction;
        let Some(player) = self.state.player.as_mut() else {
            return false;
        };
        player.assign(profile, fraction);
        let snapshot = player.clone();
        self.refresh_leaderboard();
        self.emit(GameEvent::PlayerUpdated(snapshot));
        true
    }

    /// Starts the run. No-op while running, paused or after the game ended.
    pub fn start(&mut self) {
        match self.state.status {
            RunStatus::Idle | RunStatus::Stopped => {
                self.state.status = RunStatus::Running;
                info!(
                    "game started at day {} {:02}:00",
                    self.state.clock.day(),
                    self.state.clock.hour()
                );
                self.emit(GameEvent::GameStarted);
            }
            RunStatus::Running | RunStatus::Paused | RunStatus::Ended => {}
        }
    }

    /// Flips between running and paused. Does nothing in any other state.
    pub fn toggle_pause(&mut self) {
        let paused = match self.state.status {
            RunStatus::Running => true,
            RunStatus::Paused => false,
            _ => return,
        };
        self.state.status = if paused {
            RunStatus::Paused
        } else {
            RunStatus::Running
        };
        info!("game {}", if paused { "paused" } else { "resumed" });
        self.emit(GameEvent::GamePaused(paused));
    }

    /// Stops the run. A stopped game can be started again.
    pub fn stop(&mut self) {
        if self.state.status == RunStatus::Ended {
            return;
        }
        self.halt();
    }

    fn halt(&mut self) {
        self.state.status = RunStatus::Stopped;
        info!(
            "game stopped at day {} {:02}:00",
            self.state.clock.day(),
            self.state.clock.hour()
        );
        self.emit(GameEvent::GameStopped);
    }

    /// Advances one simulated hour.
    ///
    /// Order within a tick: clock (and day rollover), market, automation,
    /// player energy, incidents, leaderboard, state broadcast, peers, and
    /// finally the end-of-game check.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.state.status.is_running() {
            return TickOutcome::Skipped;
        }

        let clock = self.state.clock.advance();
        self.state.ticks += 1;
        if clock.new_day {
            self.on_new_day(clock.day);
        }

        self.update_market(clock.day, clock.hour);
        self.run_automation();
        self.update_player_energy();
        self.roll_incident(clock.day, clock.hour);
        self.refresh_leaderboard();

        let summary = self.summary();
        debug!(
            "tick {} day {} {:02}:00 price {:.4} supply {} demand {} weather {}",
            summary.tick,
            summary.day,
            summary.hour,
            summary.price,
            summary.supply,
            summary.demand,
            summary.weather
        );
        self.emit(GameEvent::GameStateUpdated(summary.clone()));

        self.step_peers();

        if self.state.clock.is_finished() {
            return TickOutcome::Ended(self.end_game());
        }
        TickOutcome::Advanced(summary)
    }

    /// Places a manual trade for the player.
    ///
    /// # Errors
    ///
    /// Returns a `TradeError` if there is no player, the quantity is
    /// malformed, or the player cannot cover the trade. A `TradeError`
    /// event carrying the message is emitted as well.
    pub fn execute_trade(
        &mut self,
        kind: TradeKind,
        amount: f64,
        price: f64,
    ) -> Result<Trade, TradeError> {
        self.place_trade(TradeRequest::manual(kind, amount, price))
    }

    fn place_trade(&mut self, request: TradeRequest) -> Result<Trade, TradeError> {
        let day = self.state.clock.day();
        let hour = self.state.clock.hour();
        let result = match self.state.player.as_mut() {
            Some(player) => {
                self.state
                    .ledger
                    .execute(player, &mut self.state.market, request, day, hour)
            }
            None => Err(TradeError::NoPlayer),
        };

        match result {
            Ok(trade) => {
                debug!(
                    "trade #{} {} {:.2} kWh @ {:.4}{}",
                    trade.id,
                    trade.kind,
                    trade.amount,
                    trade.price,
                    if trade.automated { " (auto)" } else { "" }
                );
                self.emit(GameEvent::TradeExecuted(trade.clone()));
                if let Some(player) = self.state.player.clone() {
                    self.emit(GameEvent::PlayerUpdated(player));
                }
                Ok(trade)
            }
            Err(e) => {
                warn!(
                    "rejected {} of {} kWh @ {}: {e}",
                    request.kind, request.amount, request.price
                );
                self.emit(GameEvent::TradeError {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Adds an enabled automation rule and returns its id.
    pub fn add_automation_rule(&mut self, kind: RuleKind, price_threshold: f64) -> u64 {
        let rule = self.state.rules.add(kind, price_threshold).clone();
        info!(
            "automation rule #{} added: {} at {}",
            rule.id, rule.kind, rule.price_threshold
        );
        let id = rule.id;
        self.emit(GameEvent::AutomationRuleAdded(rule));
        id
    }

    /// Enables or disables a rule. Returns `false`, with no event, for an
    /// unknown id.
    pub fn toggle_automation_rule(&mut self, rule_id: u64, enabled: bool) -> bool {
        if self.state.rules.toggle(rule_id, enabled).is_none() {
            return false;
        }
        self.emit(GameEvent::AutomationRuleToggled { rule_id, enabled });
        true
    }

    pub fn game_state(&self) -> &GameState {
        &self.state
    }

    pub fn player(&self) -> Option<&Player> {
        self.state.player.as_ref()
    }

    pub fn market(&self) -> &Market {
        &self.state.market
    }

    pub fn leaderboard(&self) -> &[LeaderboardEntry] {
        &self.state.leaderboard
    }

    /// The newest ten trades, newest first.
    pub fn recent_trades(&self) -> Vec<Trade> {
        self.state.ledger.recent()
    }

    pub fn rules(&self) -> &[AutomationRule] {
        self.state.rules.as_slice()
    }

    pub fn incidents(&self) -> &[Incident] {
        self.state.incidents.as_slice()
    }

    pub fn peers(&self) -> &[Peer] {
        &self.state.peers
    }

    pub fn final_report(&self) -> Option<&FinalReport> {
        self.state.final_report.as_ref()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    fn emit(&mut self, event: GameEvent) {
        self.bus.emit(&event);
    }

    fn on_new_day(&mut self, day: u32) {
        if let Some(player) = self.state.player.as_mut() {
            player.reset_daily();
        }
        self.state.incidents.prune(day);
        info!("day {day} begins");
        self.emit(GameEvent::NewDay(day));
    }

    fn update_market(&mut self, day: u32, hour: u32) {
        let participant_demand = self
            .state
            .player
            .as_ref()
            .and_then(Player::participant_type)
            .map_or(0.0, |t| t.consumption);
        let tick = self.state.market.tick(
            &self.config.market,
            day,
            hour,
            participant_demand,
            &mut self.rng,
        );
        if let Some(weather) = tick.weather_changed {
            debug!("weather changed to {weather}");
            self.emit(GameEvent::WeatherChanged(weather));
        }
    }

    /// Evaluates rules in creation order. Each rule sees the balance left
    /// by the rules before it.
    fn run_automation(&mut self) {
        let price = self.state.market.current_price;
        for index in 0..self.state.rules.len() {
            let Some(balance) = self.state.player.as_ref().map(|p| p.energy_balance) else {
                return;
            };
            let order = self
                .state
                .rules
                .get(index)
                .and_then(|rule| rule.order_for(price, balance));
            if let Some(order) = order {
                debug!("rule #{} fired", order.rule_id);
                // Rejections are already broadcast as TradeError events.
                let _ = self.place_trade(TradeRequest::automated(order.kind, order.amount, price));
            }
        }
    }

    fn update_player_energy(&mut self) {
        let solar = self.state.market.weather.effect().solar;
        let Some(player) = self.state.player.as_mut() else {
            return;
        };
        let Some(profile) = player.participant_type() else {
            return;
        };
        let flow = player.apply_energy(profile.generation * solar, profile.consumption);
        self.emit(GameEvent::PlayerEnergyUpdated(flow));
    }

    fn roll_incident(&mut self, day: u32, hour: u32) {
        let probability = self.config.game.random_event_probability;
        let incident = self
            .state
            .incidents
            .roll(probability, day, hour, &mut self.rng)
            .cloned();
        if let Some(incident) = incident {
            info!("incident: {} ({})", incident.title, incident.message);
            self.emit(GameEvent::RandomEvent(incident));
        }
    }

    fn refresh_leaderboard(&mut self) {
        self.state.leaderboard = leaderboard::rank(self.state.player.as_ref());
    }

    fn step_peers(&mut self) {
        if !self.peers.is_enabled() {
            return;
        }
        let activity = self.peers.step(&mut self.state, &mut self.rng);
        if activity.jittered {
            let market = &self.state.market;
            debug!(
                "peers moved the market to {:.4} (supply {} demand {})",
                market.current_price, market.supply, market.demand
            );
        }
        for (id, online) in &activity.status_changes {
            debug!("peer {id} is now {}", if *online { "online" } else { "offline" });
        }
        if let Some(trade) = activity.trade {
            debug!(
                "peer {} {} {:.0} kWh @ {:.4}",
                trade.trader_id, trade.kind, trade.amount, trade.price
            );
            self.emit(GameEvent::PeerTradeExecuted(trade));
        }
    }

    fn summary(&self) -> TickSummary {
        let market = &self.state.market;
        let player = self.state.player.as_ref();
        TickSummary {
            tick: self.state.ticks,
            day: self.state.clock.day(),
            hour: self.state.clock.hour(),
            price: market.current_price,
            supply: market.supply,
            demand: market.demand,
            volume: market.volume,
            weather: market.weather,
            cash: player.map_or(0.0, |p| p.cash),
            energy_balance: player.map_or(0.0, |p| p.energy_balance),
            battery_level: player.map_or(0.0, |p| p.battery_level),
            total_profit: player.map_or(0.0, |p| p.total_profit),
            daily_profit: player.map_or(0.0, |p| p.daily_profit),
            trade_count: player.map_or(0, |p| p.trade_count),
        }
    }

    fn end_game(&mut self) -> FinalReport {
        self.halt();
        self.state.status = RunStatus::Ended;

        let player = self.state.player.as_ref();
        let report = FinalReport {
            total_profit: player.map_or(0.0, |p| p.total_profit),
            total_trades: player.map_or(0, |p| p.trade_count),
            final_rank: player
                .and_then(|p| leaderboard::position_of(&self.state.leaderboard, &p.name)),
            days_played: self.state.clock.days_played(),
        };
        info!(
            "game ended after {} days: profit ${:.2}, {} trades",
            report.days_played, report.total_profit, report.total_trades
        );
        self.state.final_report = Some(report.clone());
        self.emit(GameEvent::GameEnded(report.clone()));
        report
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn engine() -> GameEngine {
        GameEngine::from_config(GameConfig::default())
    }

    fn capture(engine: &mut GameEngine, topic: Topic) -> Rc<RefCell<Vec<GameEvent>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        engine.on(topic, move |e| {
            sink.borrow_mut().push(e.clone());
            Ok(())
        });
        seen
    }

    #[test]
    fn ticks_are_skipped_until_started() {
        let mut e = engine();
        assert_eq!(e.tick(), TickOutcome::Skipped);
        e.start();
        assert!(matches!(e.tick(), TickOutcome::Advanced(_)));
        assert_eq!(e.game_state().clock.hour(), 7);
    }

    #[test]
    fn start_is_idempotent() {
        let mut e = engine();
        let started = capture(&mut e, Topic::GameStarted);
        e.start();
        e.start();
        assert_eq!(started.borrow().len(), 1);
    }

    #[test]
    fn pause_gates_ticks() {
        let mut e = engine();
        let paused = capture(&mut e, Topic::GamePaused);
        e.start();
        e.toggle_pause();
        assert_eq!(e.tick(), TickOutcome::Skipped);
        e.toggle_pause();
        assert!(e.tick().summary().is_some());
        assert_eq!(
            *paused.borrow(),
            vec![GameEvent::GamePaused(true), GameEvent::GamePaused(false)]
        );
    }

    #[test]
    fn toggle_pause_before_start_is_ignored() {
        let mut e = engine();
        let paused = capture(&mut e, Topic::GamePaused);
        e.toggle_pause();
        assert_eq!(e.game_state().status, RunStatus::Idle);
        assert!(paused.borrow().is_empty());
    }

    #[test]
    fn residential_buy_settles() {
        let mut e = engine();
        let executed = capture(&mut e, Topic::TradeExecuted);
        let updated = capture(&mut e, Topic::PlayerUpdated);
        let trade = e.execute_trade(TradeKind::Buy, 10.0, 0.12);
        assert!(trade.is_ok());

        let player = e.player().cloned().unwrap_or_else(|| Player::new("", ""));
        assert!((player.cash - 498.80).abs() < 1e-9);
        assert_eq!(player.energy_balance, 10.0);
        assert_eq!(player.trade_count, 1);
        assert_eq!(executed.borrow().len(), 1);
        assert_eq!(updated.borrow().len(), 1);
        assert_eq!(e.recent_trades().len(), 1);
    }

    #[test]
    fn rejected_trade_emits_message() {
        let mut e = engine();
        let errors = capture(&mut e, Topic::TradeError);
        let r = e.execute_trade(TradeKind::Buy, 10_000.0, 0.5);
        assert!(matches!(r, Err(TradeError::InsufficientFunds { .. })));
        assert_eq!(
            *errors.borrow(),
            vec![GameEvent::TradeError {
                message: "Insufficient funds".to_string()
            }]
        );
    }

    #[test]
    fn trade_without_player_fails() {
        let mut e = GameEngine::new(GameConfig::default());
        assert_eq!(
            e.execute_trade(TradeKind::Sell, 1.0, 0.1),
            Err(TradeError::NoPlayer)
        );
    }

    #[test]
    fn unknown_participant_is_rejected_silently() {
        let mut e = GameEngine::new(GameConfig::default());
        e.init_player("p1", "Tester");
        let updated = capture(&mut e, Topic::PlayerUpdated);
        assert!(!e.set_participant_type("spaceship"));
        assert!(updated.borrow().is_empty());
        assert!(e.set_participant_type("industrial"));
        assert_eq!(e.player().map(|p| p.cash), Some(10_000.0));
        assert_eq!(updated.borrow().len(), 1);
    }

    #[test]
    fn rules_are_added_and_toggled() {
        let mut e = engine();
        let toggled = capture(&mut e, Topic::AutomationRuleToggled);
        let id = e.add_automation_rule(RuleKind::AutoSell, 0.2);
        assert_eq!(e.rules().len(), 1);
        assert!(e.toggle_automation_rule(id, false));
        assert!(!e.toggle_automation_rule(id + 100, true));
        assert!(!e.rules()[0].enabled);
        assert_eq!(toggled.borrow().len(), 1);
    }

    #[test]
    fn energy_update_is_broadcast_each_tick() {
        let mut e = engine();
        let flows = capture(&mut e, Topic::PlayerEnergyUpdated);
        e.start();
        for _ in 0..5 {
            e.tick();
        }
        assert_eq!(flows.borrow().len(), 5);
    }

    #[test]
    fn stopped_game_can_resume() {
        let mut e = engine();
        e.start();
        e.tick();
        e.stop();
        assert_eq!(e.tick(), TickOutcome::Skipped);
        e.start();
        assert!(e.tick().summary().is_some());
        assert_eq!(e.game_state().ticks, 2);
    }
}
