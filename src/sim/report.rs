//! End-of-game report and post-hoc trade statistics.

use std::fmt;

use serde::Serialize;

use super::ledger::{Trade, TradeKind};

/// Summary produced once when the game ends.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalReport {
    pub total_profit: f64,
    pub total_trades: usize,
    /// Player's 1-based leaderboard position; `None` without a player.
    pub final_rank: Option<usize>,
    pub days_played: u32,
}

impl fmt::Display for FinalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Final Report ---")?;
        writeln!(f, "Days played:    {}", self.days_played)?;
        writeln!(f, "Total trades:   {}", self.total_trades)?;
        writeln!(f, "Total profit:   ${:.2}", self.total_profit)?;
        match self.final_rank {
            Some(rank) => write!(f, "Final rank:     #{rank}"),
            None => write!(f, "Final rank:     n/a"),
        }
    }
}

/// Aggregate trade statistics for one trader, computed from the ledger.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TradeStats {
    pub trades: usize,
    pub automated_trades: usize,
    /// kWh bought.
    pub bought_kwh: f64,
    /// kWh sold.
    pub sold_kwh: f64,
    pub spent: f64,
    pub earned: f64,
    /// Volume-weighted average buy price; zero when nothing was bought.
    pub avg_buy_price: f64,
    /// Volume-weighted average sell price; zero when nothing was sold.
    pub avg_sell_price: f64,
}

impl TradeStats {
    /// Computes statistics over the trades placed by `trader_id`.
    pub fn from_trades<'a>(trades: impl IntoIterator<Item = &'a Trade>, trader_id: &str) -> Self {
        let mut stats = Self::default();
        for t in trades.into_iter().filter(|t| t.trader_id == trader_id) {
            stats.trades += 1;
            if t.automated {
                stats.automated_trades += 1;
            }
            match t.kind {
                TradeKind::Buy => {
                    stats.bought_kwh += t.amount;
                    stats.spent += t.total_value;
                }
                TradeKind::Sell => {
                    stats.sold_kwh += t.amount;
                    stats.earned += t.total_value;
                }
            }
        }
        if stats.bought_kwh > 0.0 {
            stats.avg_buy_price = stats.spent / stats.bought_kwh;
        }
        if stats.sold_kwh > 0.0 {
            stats.avg_sell_price = stats.earned / stats.sold_kwh;
        }
        stats
    }

    /// Earned minus spent.
    pub fn net(&self) -> f64 {
        self.earned - self.spent
    }
}

impl fmt::Display for TradeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Trade Statistics ---")?;
        writeln!(
            f,
            "Trades:         {} ({} automated)",
            self.trades, self.automated_trades
        )?;
        writeln!(
            f,
            "Bought:         {:.2} kWh for ${:.2} (avg ${:.4}/kWh)",
            self.bought_kwh, self.spent, self.avg_buy_price
        )?;
        writeln!(
            f,
            "Sold:           {:.2} kWh for ${:.2} (avg ${:.4}/kWh)",
            self.sold_kwh, self.earned, self.avg_sell_price
        )?;
        write!(f, "Net:            ${:.2}", self.net())
    }
}
