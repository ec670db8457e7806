//! Threshold automation rules.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ledger::TradeKind;
use crate::error::GameError;

/// What a rule does when its threshold is crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// Buy the whole deficit when the price is at or below the threshold.
    AutoBuy,
    /// Sell the whole surplus when the price is at or above the threshold.
    AutoSell,
}

impl RuleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleKind::AutoBuy => "auto_buy",
            RuleKind::AutoSell => "auto_sell",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleKind {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto_buy" | "autoBuy" => Ok(RuleKind::AutoBuy),
            "auto_sell" | "autoSell" => Ok(RuleKind::AutoSell),
            other => Err(GameError::UnknownRuleKind(other.to_string())),
        }
    }
}

/// A standing instruction to trade when the price crosses a threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutomationRule {
    pub id: u64,
    pub kind: RuleKind,
    pub price_threshold: f64,
    pub enabled: bool,
}

/// Trade an automation rule wants placed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoOrder {
    pub rule_id: u64,
    pub kind: TradeKind,
    pub amount: f64,
}

impl AutomationRule {
    /// Returns the order this rule places at `price` given the player's
    /// current `energy_balance`, or `None` when it does not fire.
    pub fn order_for(&self, price: f64, energy_balance: f64) -> Option<AutoOrder> {
        if !self.enabled {
            return None;
        }
        let kind = match self.kind {
            RuleKind::AutoSell if price >= self.price_threshold && energy_balance > 0.0 => {
                TradeKind::Sell
            }
            RuleKind::AutoBuy if price <= self.price_threshold && energy_balance < 0.0 => {
                TradeKind::Buy
            }
            _ => return None,
        };
        Some(AutoOrder {
            rule_id: self.id,
            kind,
            amount: energy_balance.abs(),
        })
    }
}

/// Rules in creation order. Rules can be disabled but never removed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RuleBook {
    rules: Vec<AutomationRule>,
    next_id: u64,
}

impl RuleBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an enabled rule and returns it.
    pub fn add(&mut self, kind: RuleKind, price_threshold: f64) -> &AutomationRule {
        self.next_id += 1;
        self.rules.push(AutomationRule {
            id: self.next_id,
            kind,
            price_threshold,
            enabled: true,
        });
        &self.rules[self.rules.len() - 1]
    }

    /// Sets a rule's enabled flag. Returns `None` for unknown ids.
    pub fn toggle(&mut self, id: u64, enabled: bool) -> Option<&AutomationRule> {
        let rule = self.rules.iter_mut().find(|r| r.id == id)?;
        rule.enabled = enabled;
        Some(rule)
    }

    pub fn get(&self, index: usize) -> Option<&AutomationRule> {
        self.rules.get(index)
    }

    pub fn as_slice(&self) -> &[AutomationRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(kind: RuleKind, threshold: f64) -> AutomationRule {
        AutomationRule {
            id: 1,
            kind,
            price_threshold: threshold,
            enabled: true,
        }
    }

    #[test]
    fn auto_sell_fires_on_surplus_at_or_above_threshold() {
        let r = rule(RuleKind::AutoSell, 0.2);
        let order = r.order_for(0.2, 4.0);
        assert_eq!(
            order,
            Some(AutoOrder {
                rule_id: 1,
                kind: TradeKind::Sell,
                amount: 4.0
            })
        );
        assert!(r.order_for(0.19, 4.0).is_none());
        assert!(r.order_for(0.3, 0.0).is_none());
    }

    #[test]
    fn auto_buy_fires_on_deficit_at_or_below_threshold() {
        let r = rule(RuleKind::AutoBuy, 0.1);
        let order = r.order_for(0.08, -3.5);
        assert_eq!(order.map(|o| (o.kind, o.amount)), Some((TradeKind::Buy, 3.5)));
        assert!(r.order_for(0.11, -3.5).is_none());
        assert!(r.order_for(0.05, 2.0).is_none());
    }

    #[test]
    fn disabled_rule_never_fires() {
        let mut r = rule(RuleKind::AutoSell, 0.0);
        r.enabled = false;
        assert!(r.order_for(0.5, 10.0).is_none());
    }

    #[test]
    fn rule_book_assigns_ids_and_toggles() {
        let mut book = RuleBook::new();
        let a = book.add(RuleKind::AutoSell, 0.2).id;
        let b = book.add(RuleKind::AutoBuy, 0.1).id;
        assert_ne!(a, b);
        assert!(book.as_slice().iter().all(|r| r.enabled));

        assert_eq!(book.toggle(a, false).map(|r| r.enabled), Some(false));
        assert!(book.toggle(999, false).is_none());
        assert_eq!(book.len(), 2);
    }

    #[test]
    fn parses_both_spellings() {
        assert_eq!("auto_buy".parse::<RuleKind>().ok(), Some(RuleKind::AutoBuy));
        assert_eq!("autoSell".parse::<RuleKind>().ok(), Some(RuleKind::AutoSell));
        assert!("hold".parse::<RuleKind>().is_err());
    }
}
