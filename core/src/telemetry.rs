//! Telemetry Model
//!
//! Holds the instantaneous physical state of the drone. Every field has its
//! own mutator and no mutator touches another field.

use crate::error::{DroneError, DroneResult};
use crate::limits;
use std::fmt;

/// Planar position in mission coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Outward projection of the telemetry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Status {
    pub height: f64,
    pub velocity: f64,
    pub position: Position,
    /// Battery charge in whole percent
    pub battery: u8,
}

/// The drone's physical state
#[derive(Debug, Clone, PartialEq)]
pub struct Telemetry {
    height: f64,
    velocity: f64,
    position: Position,
    /// Exact charge in percent, kept in `[0, 100]`
    charge: f64,
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::new()
    }
}

impl Telemetry {
    /// Fresh telemetry at the origin with a full battery
    pub fn new() -> Self {
        Self {
            height: 0.0,
            velocity: 0.0,
            position: Position::ORIGIN,
            charge: limits::BATTERY_FULL_PERCENT,
        }
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Exact remaining charge, including fractional drains
    pub fn charge(&self) -> f64 {
        self.charge
    }

    /// Remaining charge in whole percent (rounded down)
    pub fn battery(&self) -> u8 {
        // charge is clamped to [0, 100]
        self.charge.floor() as u8
    }

    pub fn set_position(&mut self, position: Position) -> DroneResult<()> {
        if !position.x.is_finite() {
            return Err(DroneError::InvalidValue { field: "x", value: position.x });
        }
        if !position.y.is_finite() {
            return Err(DroneError::InvalidValue { field: "y", value: position.y });
        }
        self.position = position;
        Ok(())
    }

    pub fn set_height(&mut self, height: f64) -> DroneResult<()> {
        self.height = non_negative("height", height)?;
        Ok(())
    }

    pub fn set_velocity(&mut self, velocity: f64) -> DroneResult<()> {
        self.velocity = non_negative("velocity", velocity)?;
        Ok(())
    }

    /// Remove `amount` percent of charge, never going below empty
    pub fn drain_battery(&mut self, amount: f64) -> DroneResult<()> {
        if amount.is_nan() || amount < 0.0 {
            return Err(DroneError::InvalidAmount(amount));
        }
        self.charge = (self.charge - amount).clamp(0.0, limits::BATTERY_FULL_PERCENT);
        Ok(())
    }

    /// Put the drone back on the ground at `origin`. Charge is untouched.
    pub fn return_to_origin(&mut self, origin: Position) {
        self.position = origin;
        self.height = 0.0;
        self.velocity = 0.0;
    }

    pub fn project_status(&self) -> Status {
        Status {
            height: self.height,
            velocity: self.velocity,
            position: self.position,
            battery: self.battery(),
        }
    }
}

fn non_negative(field: &'static str, value: f64) -> DroneResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(DroneError::InvalidValue { field, value })
    }
}
