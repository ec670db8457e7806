//! Trade validation and the append-only trade ledger.

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::market::Market;
use crate::error::TradeError;
use crate::participants::Player;

/// Direction of a trade from the trader's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeKind {
    Buy,
    Sell,
}

impl fmt::Display for TradeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TradeKind::Buy => "buy",
            TradeKind::Sell => "sell",
        })
    }
}

/// A recorded trade. Never mutated after it enters the ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    pub id: u64,
    /// Player or peer that took the trade.
    pub trader_id: String,
    pub kind: TradeKind,
    /// Energy traded (kWh).
    pub amount: f64,
    /// Unit price.
    pub price: f64,
    /// `amount * price`.
    pub total_value: f64,
    pub timestamp: DateTime<Utc>,
    /// Placed by an automation rule or an automated peer.
    pub automated: bool,
    pub day: u32,
    pub hour: u32,
}

/// A trade the player wants to place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeRequest {
    pub kind: TradeKind,
    pub amount: f64,
    pub price: f64,
    pub automated: bool,
}

impl TradeRequest {
    pub fn manual(kind: TradeKind, amount: f64, price: f64) -> Self {
        Self {
            kind,
            amount,
            price,
            automated: false,
        }
    }

    pub fn automated(kind: TradeKind, amount: f64, price: f64) -> Self {
        Self {
            kind,
            amount,
            price,
            automated: true,
        }
    }
}

/// Every trade of the run, newest first.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TradeLedger {
    trades: VecDeque<Trade>,
    next_id: u64,
}

impl TradeLedger {
    /// Number of trades exposed by [`TradeLedger::recent`].
    pub const RECENT_LIMIT: usize = 10;

    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and settles a player trade.
    ///
    /// A buy needs `cash >= amount * price`; a sell needs
    /// `energy_balance >= amount`. On success the player's cash, energy,
    /// profit and trade count move, market volume grows by `amount`, and
    /// the new trade is prepended.
    ///
    /// # Errors
    ///
    /// Returns a `TradeError` and leaves all state untouched when the trade
    /// is malformed or the player cannot cover it.
    pub fn execute(
        &mut self,
        player: &mut Player,
        market: &mut Market,
        request: TradeRequest,
        day: u32,
        hour: u32,
    ) -> Result<Trade, TradeError> {
        let TradeRequest {
            kind,
            amount,
            price,
            automated,
        } = request;

        if !(amount.is_finite() && amount > 0.0 && price.is_finite() && price >= 0.0) {
            return Err(TradeError::InvalidQuantity { amount, price });
        }

        let total = amount * price;
        match kind {
            TradeKind::Buy => {
                if player.cash < total {
                    return Err(TradeError::InsufficientFunds {
                        required: total,
                        available: player.cash,
                    });
                }
                player.cash -= total;
                player.energy_balance += amount;
            }
            TradeKind::Sell => {
                if player.energy_balance < amount {
                    return Err(TradeError::InsufficientEnergy {
                        requested: amount,
                        available: player.energy_balance,
                    });
                }
                player.cash += total;
                player.energy_balance -= amount;
            }
        }

        let profit = match kind {
            TradeKind::Sell => total,
            TradeKind::Buy => -total,
        };
        player.trade_count += 1;
        player.daily_profit += profit;
        player.total_profit += profit;
        market.volume += amount;

        Ok(self.record(&player.id, kind, amount, price, automated, day, hour))
    }

    /// Records a third-party trade that needs no balance checks.
    #[expect(clippy::too_many_arguments)]
    pub fn record_external(
        &mut self,
        trader_id: &str,
        kind: TradeKind,
        amount: f64,
        price: f64,
        automated: bool,
        day: u32,
        hour: u32,
        market: &mut Market,
    ) -> Trade {
        market.volume += amount;
        self.record(trader_id, kind, amount, price, automated, day, hour)
    }

    #[expect(clippy::too_many_arguments)]
    fn record(
        &mut self,
        trader_id: &str,
        kind: TradeKind,
        amount: f64,
        price: f64,
        automated: bool,
        day: u32,
        hour: u32,
    ) -> Trade {
        self.next_id += 1;
        let trade = Trade {
            id: self.next_id,
            trader_id: trader_id.to_string(),
            kind,
            amount,
            price,
            total_value: amount * price,
            timestamp: Utc::now(),
            automated,
            day,
            hour,
        };
        self.trades.push_front(trade.clone());
        trade
    }

    /// The newest [`Self::RECENT_LIMIT`] trades, newest first.
    pub fn recent(&self) -> Vec<Trade> {
        self.trades.iter().take(Self::RECENT_LIMIT).cloned().collect()
    }

    /// All trades, newest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Trade> {
        self.trades.iter()
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }
}
