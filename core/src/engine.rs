//! Engine Subsystem
//!
//! Tracks rotational speed against a rated maximum. `rpm == 0` means the
//! engine is stopped.

use crate::error::{DroneError, DroneResult};
use crate::limits;
use std::num::NonZeroU32;

/// Result of an rpm change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpmReport {
    /// Speed actually applied after clamping
    pub rpm: u32,
    pub percent: u8,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Engine {
    /// Current speed, zero when stopped
    rpm: u32,
    /// Rated maximum, fixed at construction
    max_rpm: NonZeroU32,
}

impl Engine {
    /// Create a stopped engine rated for `max_rpm`
    pub fn new(max_rpm: NonZeroU32) -> Self {
        Self { rpm: 0, max_rpm }
    }

    /// Current engine speed
    pub fn rpm(&self) -> u32 {
        self.rpm
    }

    /// Rated maximum engine speed
    pub fn max_rpm(&self) -> u32 {
        self.max_rpm.get()
    }

    pub fn is_running(&self) -> bool {
        self.rpm > 0
    }

    /// Current speed as a rounded percentage of the rated maximum
    pub fn percent_of_capacity(&self) -> u8 {
        percent_of(self.rpm, self.max_rpm.get())
    }

    /// Spin up to idle
    pub fn start(&mut self) -> DroneResult<()> {
        if self.is_running() {
            return Err(DroneError::AlreadyRunning);
        }
        self.rpm = limits::IDLE_RPM.min(self.max_rpm.get());
        Ok(())
    }

    /// Stop the engine. Stopping a stopped engine is a no-op.
    pub fn stop(&mut self) {
        self.rpm = 0;
    }

    /// Set the engine speed, clamped to the rated maximum
    pub fn set_rpm(&mut self, value: i64) -> DroneResult<RpmReport> {
        if value < 0 {
            return Err(DroneError::InvalidRpm(value));
        }
        if !self.is_running() && value != 0 {
            return Err(DroneError::EngineNotRunning);
        }

        let max = self.max_rpm.get();
        let rpm = u32::try_from(value).unwrap_or(max).min(max);
        self.rpm = rpm;

        let percent = percent_of(rpm, max);
        let message = if percent == 100 {
            "engine at maximum capacity".to_string()
        } else {
            format!("engine running at {rpm} rpm ({percent}% of maximum capacity)")
        };

        Ok(RpmReport { rpm, percent, message })
    }
}

fn percent_of(rpm: u32, max_rpm: u32) -> u8 {
    // rpm <= max_rpm, so the result is within 0..=100
    (100.0 * f64::from(rpm) / f64::from(max_rpm)).round() as u8
}
