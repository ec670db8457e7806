//! Error types for trading and game control.

use thiserror::Error;

/// Reasons a trade is rejected.
///
/// The `Display` text is the human-readable message carried by the
/// `TradeError` event.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TradeError {
    #[error("Insufficient funds")]
    InsufficientFunds { required: f64, available: f64 },

    #[error("Insufficient energy")]
    InsufficientEnergy { requested: f64, available: f64 },

    #[error("Invalid trade quantity")]
    InvalidQuantity { amount: f64, price: f64 },

    #[error("No active player")]
    NoPlayer,
}

/// Lookup failures for named game entities.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("unknown participant type \"{0}\"")]
    UnknownParticipant(String),

    #[error("unknown weather \"{0}\"")]
    UnknownWeather(String),

    #[error("unknown automation rule kind \"{0}\"")]
    UnknownRuleKind(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trade_error_messages_are_human_readable() {
        let funds = TradeError::InsufficientFunds {
            required: 10.0,
            available: 1.0,
        };
        assert_eq!(funds.to_string(), "Insufficient funds");
        let energy = TradeError::InsufficientEnergy {
            requested: 5.0,
            available: 0.0,
        };
        assert_eq!(energy.to_string(), "Insufficient energy");
    }
}
