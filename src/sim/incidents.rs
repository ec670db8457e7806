//! Random market incidents.
//!
//! Incidents are informational: they are recorded and broadcast but do not
//! feed back into pricing.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentKind {
    EquipmentFailure,
    GridCongestion,
    RenewableBonus,
    MarketManipulation,
}

/// Advertised effect of an incident and how many hours it lasts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum IncidentEffect {
    SolarEfficiency { factor: f64, duration_hours: u32 },
    PriceMultiplier { factor: f64, duration_hours: u32 },
    RenewableBonus { per_kwh: f64, duration_hours: u32 },
    PriceVolatility { factor: f64, duration_hours: u32 },
}

impl IncidentKind {
    pub const ALL: [IncidentKind; 4] = [
        IncidentKind::EquipmentFailure,
        IncidentKind::GridCongestion,
        IncidentKind::RenewableBonus,
        IncidentKind::MarketManipulation,
    ];

    pub fn title(self) -> &'static str {
        match self {
            IncidentKind::EquipmentFailure => "Equipment Maintenance",
            IncidentKind::GridCongestion => "Grid Congestion",
            IncidentKind::RenewableBonus => "Renewable Energy Bonus",
            IncidentKind::MarketManipulation => "Market Volatility",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            IncidentKind::EquipmentFailure => "Solar panel efficiency reduced by 20% for 2 hours",
            IncidentKind::GridCongestion => "High demand causing price spike!",
            IncidentKind::RenewableBonus => "Government incentive: +$0.02/kWh for renewable sales",
            IncidentKind::MarketManipulation => "Unusual trading activity detected",
        }
    }

    pub fn effect(self) -> IncidentEffect {
        match self {
            IncidentKind::EquipmentFailure => IncidentEffect::SolarEfficiency {
                factor: 0.8,
                duration_hours: 2,
            },
            IncidentKind::GridCongestion => IncidentEffect::PriceMultiplier {
                factor: 1.5,
                duration_hours: 1,
            },
            IncidentKind::RenewableBonus => IncidentEffect::RenewableBonus {
                per_kwh: 0.02,
                duration_hours: 3,
            },
            IncidentKind::MarketManipulation => IncidentEffect::PriceVolatility {
                factor: 2.0,
                duration_hours: 2,
            },
        }
    }
}

/// A recorded incident.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Incident {
    pub id: u64,
    pub kind: IncidentKind,
    pub title: &'static str,
    pub message: &'static str,
    pub effect: IncidentEffect,
    pub day: u32,
    pub hour: u32,
    pub timestamp: DateTime<Utc>,
}

/// Incidents of the current and previous day.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IncidentLog {
    entries: Vec<Incident>,
    next_id: u64,
}

impl IncidentLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rolls once with `probability`; on success records a uniformly drawn
    /// incident and returns it.
    pub fn roll(
        &mut self,
        probability: f64,
        day: u32,
        hour: u32,
        rng: &mut impl Rng,
    ) -> Option<&Incident> {
        if rng.random::<f64>() >= probability {
            return None;
        }
        let kind = IncidentKind::ALL[rng.random_range(0..IncidentKind::ALL.len())];
        Some(self.record(kind, day, hour))
    }

    /// Records `kind` at `day`/`hour`.
    pub fn record(&mut self, kind: IncidentKind, day: u32, hour: u32) -> &Incident {
        self.next_id += 1;
        self.entries.push(Incident {
            id: self.next_id,
            kind,
            title: kind.title(),
            message: kind.message(),
            effect: kind.effect(),
            day,
            hour,
            timestamp: Utc::now(),
        });
        &self.entries[self.entries.len() - 1]
    }

    /// Drops incidents older than the day before `current_day`.
    pub fn prune(&mut self, current_day: u32) {
        self.entries.retain(|e| e.day.saturating_add(1) >= current_day);
    }

    pub fn as_slice(&self) -> &[Incident] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn zero_probability_never_records() {
        let mut log = IncidentLog::new();
        let mut rng = StdRng::seed_from_u64(1);
        for h in 0..100 {
            assert!(log.roll(0.0, 1, h % 24, &mut rng).is_none());
        }
        assert!(log.is_empty());
    }

    #[test]
    fn certain_roll_records_with_time() {
        let mut log = IncidentLog::new();
        let mut rng = StdRng::seed_from_u64(1);
        let incident = log.roll(1.0, 3, 14, &mut rng).cloned();
        assert_eq!(incident.as_ref().map(|i| (i.day, i.hour)), Some((3, 14)));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn prune_keeps_today_and_yesterday() {
        let mut log = IncidentLog::new();
        log.record(IncidentKind::GridCongestion, 1, 10);
        log.record(IncidentKind::RenewableBonus, 2, 10);
        log.record(IncidentKind::EquipmentFailure, 3, 0);
        log.prune(3);
        let days: Vec<u32> = log.as_slice().iter().map(|i| i.day).collect();
        assert_eq!(days, vec![2, 3]);
    }

    #[test]
    fn prune_handles_last_representable_day() {
        let mut log = IncidentLog::new();
        log.record(IncidentKind::GridCongestion, u32::MAX, 10);
        log.prune(u32::MAX);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn congestion_advertises_price_spike() {
        assert_eq!(
            IncidentKind::GridCongestion.effect(),
            IncidentEffect::PriceMultiplier {
                factor: 1.5,
                duration_hours: 1
            }
        );
    }
}
