use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// Market-wide weather condition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    #[default]
    Sunny,
    Cloudy,
    Windy,
    Rainy,
}

/// Renewable output factors for a weather condition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeatherEffect {
    pub solar: f64,
    pub wind: f64,
}

impl Weather {
    /// Every weather condition, in transition-draw order.
    pub const ALL: [Weather; 4] = [
        Weather::Sunny,
        Weather::Cloudy,
        Weather::Windy,
        Weather::Rainy,
    ];

    pub fn effect(self) -> WeatherEffect {
        match self {
            Weather::Sunny => WeatherEffect {
                solar: 1.5,
                wind: 0.8,
            },
            Weather::Cloudy => WeatherEffect {
                solar: 0.5,
                wind: 1.0,
            },
            Weather::Windy => WeatherEffect {
                solar: 1.0,
                wind: 2.0,
            },
            Weather::Rainy => WeatherEffect {
                solar: 0.3,
                wind: 1.2,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Weather::Sunny => "sunny",
            Weather::Cloudy => "cloudy",
            Weather::Windy => "windy",
            Weather::Rainy => "rainy",
        }
    }

    /// Draws a condition uniformly, which may equal the current one.
    pub fn draw(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weather {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|w| w.as_str() == s)
            .ok_or_else(|| GameError::UnknownWeather(s.to_string()))
    }
}
