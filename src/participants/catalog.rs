use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// Identifier of a participant archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantKind {
    Residential,
    Commercial,
    Industrial,
    Community,
}

impl ParticipantKind {
    /// Every archetype, in catalog order.
    pub const ALL: [ParticipantKind; 4] = [
        ParticipantKind::Residential,
        ParticipantKind::Commercial,
        ParticipantKind::Industrial,
        ParticipantKind::Community,
    ];

    /// Lowercase key used in configuration files and on the CLI.
    pub fn as_str(self) -> &'static str {
        match self {
            ParticipantKind::Residential => "residential",
            ParticipantKind::Commercial => "commercial",
            ParticipantKind::Industrial => "industrial",
            ParticipantKind::Community => "community",
        }
    }

    /// Returns the catalog entry for this archetype.
    pub fn profile(self) -> &'static ParticipantType {
        match self {
            ParticipantKind::Residential => &CATALOG[0],
            ParticipantKind::Commercial => &CATALOG[1],
            ParticipantKind::Industrial => &CATALOG[2],
            ParticipantKind::Community => &CATALOG[3],
        }
    }
}

impl fmt::Display for ParticipantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParticipantKind {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| GameError::UnknownParticipant(s.to_string()))
    }
}

/// An immutable participant archetype.
///
/// Generation and consumption are per-tick energy quantities (kWh per
/// simulated hour); generation is scaled by the weather's solar factor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticipantType {
    /// Catalog key.
    pub kind: ParticipantKind,
    /// Display name.
    pub name: &'static str,
    /// Nominal generation under a solar factor of 1.0.
    pub generation: f64,
    /// Consumption per tick.
    pub consumption: f64,
    /// Battery capacity in kWh.
    pub battery_capacity: f64,
    /// Automation sophistication on a 1-10 scale.
    pub automation_level: u8,
    /// Risk appetite on a 1-10 scale.
    pub risk_tolerance: u8,
    /// Cash granted on selection.
    pub starting_cash: f64,
    /// Descriptive asset list.
    pub assets: &'static [&'static str],
}

static CATALOG: [ParticipantType; 4] = [
    ParticipantType {
        kind: ParticipantKind::Residential,
        name: "Residential Prosumer",
        generation: 8.0,
        consumption: 12.0,
        battery_capacity: 15.0,
        automation_level: 4,
        risk_tolerance: 3,
        starting_cash: 500.0,
        assets: &["5kW Solar Panels", "10kWh Battery", "Smart Home System"],
    },
    ParticipantType {
        kind: ParticipantKind::Commercial,
        name: "Commercial Prosumer",
        generation: 150.0,
        consumption: 200.0,
        battery_capacity: 300.0,
        automation_level: 7,
        risk_tolerance: 6,
        starting_cash: 5000.0,
        assets: &[
            "100kW Solar Array",
            "200kWh Battery Bank",
            "Building Management System",
        ],
    },
    ParticipantType {
        kind: ParticipantKind::Industrial,
        name: "Industrial Consumer",
        generation: 50.0,
        consumption: 800.0,
        battery_capacity: 100.0,
        automation_level: 6,
        risk_tolerance: 8,
        starting_cash: 10000.0,
        assets: &[
            "Backup Generators",
            "Load Management System",
            "Process Flexibility",
        ],
    },
    ParticipantType {
        kind: ParticipantKind::Community,
        name: "Energy Community",
        generation: 300.0,
        consumption: 250.0,
        battery_capacity: 500.0,
        automation_level: 8,
        risk_tolerance: 4,
        starting_cash: 2000.0,
        assets: &[
            "Community Solar Farm",
            "Shared Battery Storage",
            "Smart Grid Management",
        ],
    },
];

/// Returns the full catalog in display order.
pub fn catalog() -> &'static [ParticipantType] {
    &CATALOG
}

/// Looks up an archetype by its key, returning `None` for unknown keys.
pub fn lookup(key: &str) -> Option<&'static ParticipantType> {
    key.parse::<ParticipantKind>().ok().map(ParticipantKind::profile)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_matches_kind() {
        for kind in ParticipantKind::ALL {
            assert_eq!(kind.profile().kind, kind);
        }
    }

    #[test]
    fn residential_profile_values() {
        let p = ParticipantKind::Residential.profile();
        assert_eq!(p.name, "Residential Prosumer");
        assert_eq!(p.generation, 8.0);
        assert_eq!(p.consumption, 12.0);
        assert_eq!(p.battery_capacity, 15.0);
        assert_eq!(p.starting_cash, 500.0);
    }

    #[test]
    fn parse_round_trips_keys() {
        for kind in ParticipantKind::ALL {
            assert_eq!(kind.as_str().parse::<ParticipantKind>().ok(), Some(kind));
        }
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert!(lookup("utility").is_none());
        let err = "utility".parse::<ParticipantKind>();
        assert_eq!(err, Err(GameError::UnknownParticipant("utility".into())));
    }

    #[test]
    fn catalog_has_four_entries() {
        assert_eq!(catalog().len(), 4);
        assert_eq!(catalog()[3].kind, ParticipantKind::Community);
    }
}
