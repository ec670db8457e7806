//! Market price model: time-of-day buckets, supply/demand totals and the
//! rolling price history.

use std::collections::VecDeque;

use rand::Rng;
use serde::Serialize;

use super::weather::Weather;
use crate::config::MarketConfig;

/// Tariff bucket for an hour of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    /// Hours 14 through 19.
    Peak,
    /// Hours 22 through 5.
    OffPeak,
    Normal,
}

impl TimeOfDay {
    pub fn from_hour(hour: u32) -> Self {
        match hour % 24 {
            14..=19 => TimeOfDay::Peak,
            22 | 23 | 0..=5 => TimeOfDay::OffPeak,
            _ => TimeOfDay::Normal,
        }
    }

    pub fn price_multiplier(self) -> f64 {
        match self {
            TimeOfDay::Peak => 2.5,
            TimeOfDay::OffPeak => 0.6,
            TimeOfDay::Normal => 1.0,
        }
    }

    pub fn demand_multiplier(self) -> f64 {
        match self {
            TimeOfDay::Peak => 1.8,
            TimeOfDay::OffPeak => 0.6,
            TimeOfDay::Normal => 1.0,
        }
    }
}

/// One entry of the rolling price history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSnapshot {
    pub day: u32,
    pub hour: u32,
    pub price: f64,
    pub supply: f64,
    pub demand: f64,
}

impl PriceSnapshot {
    /// Human-readable time label, e.g. `Day 2, 14:00`.
    pub fn label(&self) -> String {
        format!("Day {}, {}:00", self.day, self.hour)
    }
}

/// Result of one market update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketTick {
    pub price: f64,
    pub supply: f64,
    pub demand: f64,
    /// Set when the weather transitioned to a different condition.
    pub weather_changed: Option<Weather>,
}

/// Mutable market state, recomputed once per tick.
#[derive(Debug, Clone, Serialize)]
pub struct Market {
    /// Clamped price per kWh.
    pub current_price: f64,
    /// Total supply, rounded to whole units.
    pub supply: f64,
    /// Total demand, rounded to whole units.
    pub demand: f64,
    /// Cumulative traded energy.
    pub volume: f64,
    pub weather: Weather,
    /// Oldest first; bounded by `MarketConfig::history_len`.
    pub price_history: VecDeque<PriceSnapshot>,
}

impl Market {
    /// Creates the opening market with a pre-seeded "Day 0" history.
    pub fn new(params: &MarketConfig, weather: Weather, rng: &mut impl Rng) -> Self {
        let mut price_history = VecDeque::with_capacity(params.history_len + 1);
        for hour in 0..params.history_len {
            price_history.push_back(PriceSnapshot {
                day: 0,
                hour: (hour % 24) as u32,
                price: 0.08 + rng.random::<f64>() * 0.08,
                supply: 1000.0 + rng.random::<f64>() * 500.0,
                demand: 900.0 + rng.random::<f64>() * 400.0,
            });
        }

        Self {
            current_price: 0.12,
            supply: 1250.0,
            demand: 1180.0,
            volume: 340.0,
            weather,
            price_history,
        }
    }

    /// Recomputes price, supply and demand for `hour`, records a history
    /// snapshot and rolls for a weather transition.
    ///
    /// The price uses the weather in effect before the transition roll.
    pub fn tick(
        &mut self,
        params: &MarketConfig,
        day: u32,
        hour: u32,
        participant_demand: f64,
        rng: &mut impl Rng,
    ) -> MarketTick {
        let supply = total_supply(params, self.weather);
        let demand = total_demand(params, hour, participant_demand);
        let noise = params.noise_min + rng.random::<f64>() * (params.noise_max - params.noise_min);

        self.current_price = quote(params, hour, supply, demand, noise);
        self.supply = supply.round();
        self.demand = demand.round();

        self.price_history.push_back(PriceSnapshot {
            day,
            hour,
            price: self.current_price,
            supply: self.supply,
            demand: self.demand,
        });
        while self.price_history.len() > params.history_len {
            self.price_history.pop_front();
        }

        let mut weather_changed = None;
        if rng.random::<f64>() < params.weather_change_probability {
            let next = Weather::draw(rng);
            if next != self.weather {
                self.weather = next;
                weather_changed = Some(next);
            }
        }

        MarketTick {
            price: self.current_price,
            supply: self.supply,
            demand: self.demand,
            weather_changed,
        }
    }

    /// Price snapshot most recently recorded.
    pub fn latest(&self) -> Option<&PriceSnapshot> {
        self.price_history.back()
    }
}

/// Renewable output for `weather` plus the fixed grid baseline.
pub fn total_supply(params: &MarketConfig, weather: Weather) -> f64 {
    let effect = weather.effect();
    let renewable = params.solar_capacity * effect.solar + params.wind_capacity * effect.wind;
    renewable + params.grid_baseline_supply
}

/// Time-of-day scaled base demand plus participant load.
pub fn total_demand(params: &MarketConfig, hour: u32, participant_demand: f64) -> f64 {
    params.base_demand * TimeOfDay::from_hour(hour).demand_multiplier() + participant_demand
}

/// Prices one kWh: base × time-of-day × (2 − supply/demand) × noise,
/// clamped to the configured band.
pub fn quote(params: &MarketConfig, hour: u32, supply: f64, demand: f64, noise: f64) -> f64 {
    let ratio = if demand > 0.0 { supply / demand } else { 2.0 };
    let price =
        params.base_price * TimeOfDay::from_hour(hour).price_multiplier() * (2.0 - ratio) * noise;
    clamp_price(params, price)
}

/// Clamps to `[price_floor, price_ceiling]`; NaN maps to the floor.
pub fn clamp_price(params: &MarketConfig, price: f64) -> f64 {
    if price.is_nan() {
        return params.price_floor;
    }
    price.clamp(params.price_floor, params.price_ceiling)
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn params() -> MarketConfig {
        MarketConfig::default()
    }

    #[test]
    fn time_of_day_buckets() {
        assert_eq!(TimeOfDay::from_hour(14), TimeOfDay::Peak);
        assert_eq!(TimeOfDay::from_hour(19), TimeOfDay::Peak);
        assert_eq!(TimeOfDay::from_hour(22), TimeOfDay::OffPeak);
        assert_eq!(TimeOfDay::from_hour(0), TimeOfDay::OffPeak);
        assert_eq!(TimeOfDay::from_hour(5), TimeOfDay::OffPeak);
        assert_eq!(TimeOfDay::from_hour(6), TimeOfDay::Normal);
        assert_eq!(TimeOfDay::from_hour(21), TimeOfDay::Normal);
    }

    #[test]
    fn sunny_supply_includes_grid_baseline() {
        // 800*1.5 + 400*0.8 + 500
        assert_eq!(total_supply(&params(), Weather::Sunny), 2020.0);
    }

    #[test]
    fn peak_demand_scales_and_adds_participant() {
        assert_eq!(total_demand(&params(), 15, 12.0), 1812.0);
        assert_eq!(total_demand(&params(), 3, 0.0), 600.0);
    }

    #[test]
    fn sunny_peak_quote_follows_formula() {
        let p = params();
        let supply = total_supply(&p, Weather::Sunny);
        let demand = total_demand(&p, 15, 12.0);
        let expected = 0.12 * 2.5 * (2.0 - supply / demand);
        let price = quote(&p, 15, supply, demand, 1.0);
        assert!((price - expected).abs() < 1e-12);

        for noise in [0.9, 1.0, 1.1] {
            let price = quote(&p, 15, supply, demand, noise);
            assert!((0.05..=0.50).contains(&price));
        }
    }

    #[test]
    fn oversupply_clamps_to_floor() {
        let p = params();
        // ratio > 2 makes the raw price negative
        let price = quote(&p, 2, 2020.0, 612.0, 1.0);
        assert_eq!(price, 0.05);
    }

    #[test]
    fn scarcity_clamps_to_ceiling() {
        let p = MarketConfig {
            base_price: 1.0,
            ..params()
        };
        let price = quote(&p, 15, 100.0, 5000.0, 1.1);
        assert_eq!(price, 0.50);
    }

    #[test]
    fn new_market_seeds_full_history() {
        let mut rng = StdRng::seed_from_u64(1);
        let market = Market::new(&params(), Weather::Sunny, &mut rng);
        assert_eq!(market.price_history.len(), 24);
        assert!(market.price_history.iter().all(|s| s.day == 0));
        assert_eq!(market.current_price, 0.12);
        assert_eq!(market.volume, 340.0);
    }

    #[test]
    fn history_stays_bounded_and_price_in_band() {
        let p = params();
        let mut rng = StdRng::seed_from_u64(9);
        let mut market = Market::new(&p, Weather::Sunny, &mut rng);
        for t in 0..500u32 {
            let tick = market.tick(&p, 1 + t / 24, t % 24, 12.0, &mut rng);
            assert!((0.05..=0.50).contains(&tick.price));
            assert!(market.price_history.len() <= 24);
        }
        assert_eq!(market.latest().map(|s| s.hour), Some(499 % 24));
    }

    #[test]
    fn supply_and_demand_are_rounded() {
        let p = params();
        let mut rng = StdRng::seed_from_u64(2);
        let mut market = Market::new(&p, Weather::Cloudy, &mut rng);
        market.tick(&p, 1, 10, 12.4, &mut rng);
        assert_eq!(market.demand, 1012.0);
        assert_eq!(market.supply.fract(), 0.0);
    }

    #[test]
    fn weather_never_changes_at_zero_probability() {
        let p = MarketConfig {
            weather_change_probability: 0.0,
            ..params()
        };
        let mut rng = StdRng::seed_from_u64(5);
        let mut market = Market::new(&p, Weather::Windy, &mut rng);
        for h in 0..100 {
            assert!(market.tick(&p, 1, h % 24, 0.0, &mut rng).weather_changed.is_none());
        }
        assert_eq!(market.weather, Weather::Windy);
    }

    #[test]
    fn reported_weather_change_differs_from_previous() {
        let p = MarketConfig {
            weather_change_probability: 1.0,
            ..params()
        };
        let mut rng = StdRng::seed_from_u64(11);
        let mut market = Market::new(&p, Weather::Sunny, &mut rng);
        for h in 0..50 {
            let before = market.weather;
            let tick = market.tick(&p, 1, h % 24, 0.0, &mut rng);
            if let Some(next) = tick.weather_changed {
                assert_ne!(next, before);
                assert_eq!(market.weather, next);
            } else {
                assert_eq!(market.weather, before);
            }
        }
    }

    #[test]
    fn snapshot_label_format() {
        let s = PriceSnapshot {
            day: 2,
            hour: 14,
            price: 0.2,
            supply: 1.0,
            demand: 1.0,
        };
        assert_eq!(s.label(), "Day 2, 14:00");
    }
}
