//! Simulated third-party peers.
//!
//! Peers stand in for other players on a shared market. They are stepped
//! once per tick by the engine and act on tick-count intervals: market
//! jitter, occasional trades, and online/offline churn.

use rand::Rng;
use serde::Serialize;

use super::ledger::{Trade, TradeKind};
use super::state::GameState;
use crate::config::{MarketConfig, PeersConfig};
use crate::participants::ParticipantKind;

/// Supply never jitters below this.
const MIN_SUPPLY: f64 = 500.0;
/// Demand never jitters below this.
const MIN_DEMAND: f64 = 400.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Peer {
    pub id: String,
    pub name: String,
    pub participant: ParticipantKind,
    pub online: bool,
}

/// The five demo peers, matching the leaderboard's demo traders.
pub fn demo_peers() -> Vec<Peer> {
    [
        ("demo1", "EcoTrader_42", ParticipantKind::Commercial, true),
        ("demo2", "SolarMom", ParticipantKind::Residential, true),
        ("demo3", "GreenFactory", ParticipantKind::Industrial, false),
        ("demo4", "CommunityGrid", ParticipantKind::Community, true),
        ("demo5", "PowerSaver", ParticipantKind::Residential, true),
    ]
    .into_iter()
    .map(|(id, name, participant, online)| Peer {
        id: id.to_string(),
        name: name.to_string(),
        participant,
        online,
    })
    .collect()
}

/// What the peers did during one step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeerActivity {
    pub jittered: bool,
    pub trade: Option<Trade>,
    /// `(peer id, now online)` for every peer that flipped status.
    pub status_changes: Vec<(String, bool)>,
}

/// Interval scheduler for peer behaviour.
#[derive(Debug, Clone)]
pub struct PeerNetwork {
    params: PeersConfig,
    price_floor: f64,
    price_ceiling: f64,
    steps: u64,
}

impl PeerNetwork {
    pub fn new(params: PeersConfig, market: &MarketConfig) -> Self {
        Self {
            params,
            price_floor: market.price_floor,
            price_ceiling: market.price_ceiling,
            steps: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.params.enabled
    }

    /// Advances the peer timers by one tick and runs whatever is due.
    pub fn step(&mut self, state: &mut GameState, rng: &mut impl Rng) -> PeerActivity {
        let mut activity = PeerActivity::default();
        if !self.params.enabled {
            return activity;
        }
        self.steps += 1;

        if self.due(self.params.jitter_every) {
            self.jitter(state, rng);
            activity.jittered = true;
        }
        if self.due(self.params.trade_every) && rng.random::<f64>() < self.params.trade_probability
        {
            activity.trade = self.trade(state, rng);
        }
        if self.due(self.params.status_every) {
            for peer in &mut state.peers {
                if rng.random::<f64>() < self.params.status_toggle_probability {
                    peer.online = !peer.online;
                    activity.status_changes.push((peer.id.clone(), peer.online));
                }
            }
        }
        activity
    }

    fn due(&self, every: u64) -> bool {
        every > 0 && self.steps % every == 0
    }

    fn jitter(&self, state: &mut GameState, rng: &mut impl Rng) {
        let market = &mut state.market;
        let fluctuation = (rng.random::<f64>() - 0.5) * 0.01;
        market.current_price =
            (market.current_price + fluctuation).clamp(self.price_floor, self.price_ceiling);
        let supply_delta = ((rng.random::<f64>() - 0.5) * 100.0).floor();
        let demand_delta = ((rng.random::<f64>() - 0.5) * 80.0).floor();
        market.supply = (market.supply + supply_delta).max(MIN_SUPPLY);
        market.demand = (market.demand + demand_delta).max(MIN_DEMAND);
    }

    /// Picks a random peer; offline peers sit the round out.
    fn trade(&self, state: &mut GameState, rng: &mut impl Rng) -> Option<Trade> {
        if state.peers.is_empty() {
            return None;
        }
        let peer = &state.peers[rng.random_range(0..state.peers.len())];
        if !peer.online {
            return None;
        }
        let trader_id = peer.id.clone();

        let kind = if rng.random::<bool>() {
            TradeKind::Buy
        } else {
            TradeKind::Sell
        };
        let amount = f64::from(rng.random_range(10u32..60));
        let price = state.market.current_price * (0.95 + rng.random::<f64>() * 0.1);
        let automated = rng.random::<f64>() < 0.4;

        let day = state.clock.day();
        let hour = state.clock.hour();
        Some(state.ledger.record_external(
            &trader_id,
            kind,
            amount,
            price,
            automated,
            day,
            hour,
            &mut state.market,
        ))
    }
}
