//! Flight Strategies
//!
//! A closed set of flight behaviors. Each one sets a target velocity on the
//! telemetry and costs a fixed amount of battery per application.

use crate::error::DroneResult;
use crate::telemetry::Telemetry;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Flight behavior selected by the facade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FlightStrategy {
    #[default]
    Normal,
    Turbo,
    Scan,
}

impl FlightStrategy {
    pub const ALL: [FlightStrategy; 3] =
        [FlightStrategy::Normal, FlightStrategy::Turbo, FlightStrategy::Scan];

    /// Velocity the strategy flies at, in units/s
    pub fn target_velocity(self) -> f64 {
        match self {
            FlightStrategy::Normal => 10.0,
            FlightStrategy::Turbo => 50.0,
            FlightStrategy::Scan => 1.0,
        }
    }

    /// Battery percent drained by one application
    pub fn battery_cost(self) -> f64 {
        match self {
            FlightStrategy::Normal => 1.0,
            FlightStrategy::Turbo => 3.0,
            FlightStrategy::Scan => 0.5,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            FlightStrategy::Normal => "normal flight at 10 units/s",
            FlightStrategy::Turbo => "turbo flight at 50 units/s",
            FlightStrategy::Scan => "terrain-scan flight at 1 unit/s",
        }
    }

    /// Fly with this strategy: sets the telemetry velocity and returns the
    /// velocity together with its description
    pub fn apply(self, telemetry: &mut Telemetry) -> DroneResult<(f64, &'static str)> {
        let velocity = self.target_velocity();
        telemetry.set_velocity(velocity)?;
        Ok((velocity, self.description()))
    }

    pub fn name(self) -> &'static str {
        match self {
            FlightStrategy::Normal => "Normal",
            FlightStrategy::Turbo => "Turbo",
            FlightStrategy::Scan => "Scan",
        }
    }
}

impl fmt::Display for FlightStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown flight strategy: {0}")]
pub struct ParseStrategyError(String);

impl FromStr for FlightStrategy {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FlightStrategy::ALL
            .into_iter()
            .find(|strategy| strategy.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseStrategyError(s.to_string()))
    }
}
