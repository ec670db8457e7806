//! TOML-based game configuration and preset definitions.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::participants::ParticipantKind;
use crate::sim::automation::RuleKind;
use crate::sim::clock::MAX_GAME_DAYS;
use crate::sim::weather::Weather;

/// Top-level game configuration parsed from TOML.
///
/// All fields have defaults matching the demo game. Load from TOML with
/// [`GameConfig::from_toml_file`] or use [`GameConfig::demo`] for the
/// built-in default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GameConfig {
    /// Run length, player identity and random seed.
    #[serde(default)]
    pub game: GameSection,
    /// Pricing and supply/demand constants.
    #[serde(default)]
    pub market: MarketConfig,
    /// Automation rules installed before the run starts.
    #[serde(default)]
    pub automation: AutomationConfig,
    /// Simulated third-party peer activity.
    #[serde(default)]
    pub peers: PeersConfig,
}

/// Run length, player identity and global parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameSection {
    /// Master random seed.
    pub seed: u64,
    /// Day counter at game start.
    pub start_day: u32,
    /// Hour of day at game start (0-23).
    pub start_hour: u32,
    /// The run ends once the day counter exceeds this value.
    pub max_days: u32,
    /// Player identifier recorded on trades.
    pub player_id: String,
    /// Player display name.
    pub player_name: String,
    /// Participant archetype key (`residential`, `commercial`, ...).
    pub participant: String,
    /// Initial battery charge as a fraction of capacity.
    pub initial_battery_fraction: f64,
    /// Per-tick probability of a random market incident.
    pub random_event_probability: f64,
}

impl Default for GameSection {
    fn default() -> Self {
        Self {
            seed: 42,
            start_day: 1,
            start_hour: 6,
            max_days: 7,
            player_id: "demo-user".to_string(),
            player_name: "Demo User".to_string(),
            participant: "residential".to_string(),
            initial_battery_fraction: 0.5,
            random_event_probability: 0.05,
        }
    }
}

/// Pricing and supply/demand constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarketConfig {
    /// Price per kWh before time-of-day and scarcity scaling.
    pub base_price: f64,
    /// Lower price clamp.
    pub price_floor: f64,
    /// Upper price clamp.
    pub price_ceiling: f64,
    /// Maximum number of price snapshots kept.
    pub history_len: usize,
    /// Per-tick probability of a weather transition.
    pub weather_change_probability: f64,
    /// Weather at game start.
    pub initial_weather: String,
    /// Solar supply at a solar factor of 1.0.
    pub solar_capacity: f64,
    /// Wind supply at a wind factor of 1.0.
    pub wind_capacity: f64,
    /// Fixed grid supply added to renewables.
    pub grid_baseline_supply: f64,
    /// Demand before time-of-day scaling and participant load.
    pub base_demand: f64,
    /// Lower bound of the multiplicative price noise.
    pub noise_min: f64,
    /// Upper bound of the multiplicative price noise.
    pub noise_max: f64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            base_price: 0.12,
            price_floor: 0.05,
            price_ceiling: 0.50,
            history_len: 24,
            weather_change_probability: 0.1,
            initial_weather: "sunny".to_string(),
            solar_capacity: 800.0,
            wind_capacity: 400.0,
            grid_baseline_supply: 500.0,
            base_demand: 1000.0,
            noise_min: 0.9,
            noise_max: 1.1,
        }
    }
}

/// Automation rules installed before the first tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AutomationConfig {
    pub rules: Vec<RuleConfig>,
}

/// One automation rule definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    /// `auto_buy` or `auto_sell`.
    pub kind: String,
    /// Price at which the rule fires.
    pub price_threshold: f64,
}

/// Simulated peer activity, stepped in ticks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PeersConfig {
    /// Whether peers act at all.
    pub enabled: bool,
    /// Ticks between market jitter updates.
    pub jitter_every: u64,
    /// Ticks between peer trade attempts.
    pub trade_every: u64,
    /// Ticks between online-status updates.
    pub status_every: u64,
    /// Probability that a trade attempt happens.
    pub trade_probability: f64,
    /// Per-peer probability of toggling online status.
    pub status_toggle_probability: f64,
}

impl Default for PeersConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            jitter_every: 2,
            trade_every: 5,
            status_every: 10,
            trade_probability: 0.3,
            status_toggle_probability: 0.1,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"game.start_hour"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl GameConfig {
    /// Returns the demo game: a residential prosumer, no automation, no peers.
    pub fn demo() -> Self {
        Self::default()
    }

    /// Returns the multiplayer preset: demo peers trade and jitter the market.
    pub fn multiplayer() -> Self {
        Self {
            peers: PeersConfig {
                enabled: true,
                ..PeersConfig::default()
            },
            ..Self::default()
        }
    }

    /// Returns the community-seller preset: a surplus-heavy energy
    /// community with standing sell and buy rules.
    pub fn community_seller() -> Self {
        Self {
            game: GameSection {
                participant: "community".to_string(),
                player_name: "Community Trader".to_string(),
                ..GameSection::default()
            },
            automation: AutomationConfig {
                rules: vec![
                    RuleConfig {
                        kind: "auto_sell".to_string(),
                        price_threshold: 0.10,
                    },
                    RuleConfig {
                        kind: "auto_buy".to_string(),
                        price_threshold: 0.08,
                    },
                ],
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["demo", "multiplayer", "community_seller"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "demo" => Ok(Self::demo()),
            "multiplayer" => Ok(Self::multiplayer()),
            "community_seller" => Ok(Self::community_seller()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let g = &self.game;
        if g.participant.parse::<ParticipantKind>().is_err() {
            errors.push(ConfigError::new(
                "game.participant",
                format!(
                    "must be one of residential, commercial, industrial, community; got \"{}\"",
                    g.participant
                ),
            ));
        }
        if g.start_hour > 23 {
            errors.push(ConfigError::new("game.start_hour", "must be <= 23"));
        }
        if g.start_day == 0 {
            errors.push(ConfigError::new("game.start_day", "must be > 0"));
        }
        if g.max_days < g.start_day {
            errors.push(ConfigError::new("game.max_days", "must be >= game.start_day"));
        }
        if g.max_days > MAX_GAME_DAYS {
            errors.push(ConfigError::new(
                "game.max_days",
                format!("must be <= {MAX_GAME_DAYS}"),
            ));
        }
        if !(0.0..=1.0).contains(&g.initial_battery_fraction) {
            errors.push(ConfigError::new(
                "game.initial_battery_fraction",
                "must be in [0.0, 1.0]",
            ));
        }
        check_probability(
            &mut errors,
            "game.random_event_probability",
            g.random_event_probability,
        );

        let m = &self.market;
        if !(m.price_floor >= 0.0 && m.price_floor < m.price_ceiling) {
            errors.push(ConfigError::new(
                "market.price_floor",
                "must be >= 0 and < market.price_ceiling",
            ));
        }
        if m.base_price <= 0.0 {
            errors.push(ConfigError::new("market.base_price", "must be > 0"));
        }
        if m.history_len == 0 {
            errors.push(ConfigError::new("market.history_len", "must be > 0"));
        }
        if m.base_demand <= 0.0 {
            errors.push(ConfigError::new("market.base_demand", "must be > 0"));
        }
        if !(m.noise_min > 0.0 && m.noise_min <= m.noise_max) {
            errors.push(ConfigError::new(
                "market.noise_min",
                "must be > 0 and <= market.noise_max",
            ));
        }
        if m.initial_weather.parse::<Weather>().is_err() {
            errors.push(ConfigError::new(
                "market.initial_weather",
                format!(
                    "must be one of sunny, cloudy, windy, rainy; got \"{}\"",
                    m.initial_weather
                ),
            ));
        }
        check_probability(
            &mut errors,
            "market.weather_change_probability",
            m.weather_change_probability,
        );

        for (i, rule) in self.automation.rules.iter().enumerate() {
            if rule.kind.parse::<RuleKind>().is_err() {
                errors.push(ConfigError::new(
                    format!("automation.rules[{i}].kind"),
                    format!("must be \"auto_buy\" or \"auto_sell\", got \"{}\"", rule.kind),
                ));
            }
            if !(rule.price_threshold.is_finite() && rule.price_threshold >= 0.0) {
                errors.push(ConfigError::new(
                    format!("automation.rules[{i}].price_threshold"),
                    "must be a finite value >= 0",
                ));
            }
        }

        let p = &self.peers;
        for (field, every) in [
            ("peers.jitter_every", p.jitter_every),
            ("peers.trade_every", p.trade_every),
            ("peers.status_every", p.status_every),
        ] {
            if every == 0 {
                errors.push(ConfigError::new(field, "must be > 0"));
            }
        }
        check_probability(&mut errors, "peers.trade_probability", p.trade_probability);
        check_probability(
            &mut errors,
            "peers.status_toggle_probability",
            p.status_toggle_probability,
        );

        errors
    }
}

fn check_probability(errors: &mut Vec<ConfigError>, field: &str, value: f64) {
    if !(0.0..=1.0).contains(&value) {
        errors.push(ConfigError::new(field, "must be in [0.0, 1.0]"));
    }
}
