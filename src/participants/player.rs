use serde::Serialize;

use super::catalog::{ParticipantKind, ParticipantType};

/// The human player's balance sheet.
///
/// Created empty by [`Player::new`]; cash and battery are loaded when a
/// participant archetype is assigned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Player {
    /// Stable identifier, recorded on every trade.
    pub id: String,
    /// Display name used on the leaderboard.
    pub name: String,
    /// Spendable cash.
    pub cash: f64,
    /// Tradable energy this tick (kWh). Negative means an uncovered deficit.
    pub energy_balance: f64,
    /// Stored energy (kWh).
    pub battery_level: f64,
    /// Battery capacity of the assigned archetype (kWh).
    pub max_battery: f64,
    /// Cumulative trade profit (sales minus purchases).
    pub total_profit: f64,
    /// Trade profit since the last day rollover.
    pub daily_profit: f64,
    /// Number of successful trades.
    pub trade_count: usize,
    /// Assigned archetype, if any.
    pub participant: Option<ParticipantKind>,
}

/// Energy movements produced by one generation/consumption update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnergyFlow {
    pub generation: f64,
    pub consumption: f64,
    pub battery_level: f64,
    pub net_energy: f64,
}

impl Player {
    /// Creates a player with no archetype and zero balances.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            cash: 0.0,
            energy_balance: 0.0,
            battery_level: 0.0,
            max_battery: 0.0,
            total_profit: 0.0,
            daily_profit: 0.0,
            trade_count: 0,
            participant: None,
        }
    }

    /// Adopts an archetype: loads its starting cash and fills the battery
    /// to `battery_fraction` of capacity.
    pub fn assign(&mut self, profile: &ParticipantType, battery_fraction: f64) {
        self.participant = Some(profile.kind);
        self.cash = profile.starting_cash;
        self.max_battery = profile.battery_capacity;
        self.battery_level = profile.battery_capacity * battery_fraction.clamp(0.0, 1.0);
    }

    /// Returns the catalog entry of the assigned archetype.
    pub fn participant_type(&self) -> Option<&'static ParticipantType> {
        self.participant.map(ParticipantKind::profile)
    }

    /// Applies one tick of generation and consumption.
    ///
    /// A surplus charges the battery up to capacity and the remainder
    /// becomes the tradable balance. A deficit drains the battery and the
    /// uncovered remainder becomes a negative balance. The balance is
    /// replaced, not accumulated.
    pub fn apply_energy(&mut self, generation: f64, consumption: f64) -> EnergyFlow {
        let net = generation - consumption;

        if net > 0.0 {
            let space = (self.max_battery - self.battery_level).max(0.0);
            let to_battery = net.min(space);
            self.battery_level += to_battery;
            self.energy_balance = net - to_battery;
        } else {
            let from_battery = (-net).min(self.battery_level);
            self.battery_level -= from_battery;
            self.energy_balance = net + from_battery;
        }

        EnergyFlow {
            generation,
            consumption,
            battery_level: self.battery_level,
            net_energy: self.energy_balance,
        }
    }

    /// Zeroes per-day profit at day rollover.
    pub fn reset_daily(&mut self) {
        self.daily_profit = 0.0;
    }
}
