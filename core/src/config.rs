//! Drone configuration

use crate::limits;
use std::collections::BTreeMap;
use std::num::NonZeroU32;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("max_rpm must be greater than zero")]
    ZeroMaxRpm,

    #[error("Low battery threshold out of range: {0} (expected 0-100)")]
    ThresholdOutOfRange(f64),

    #[error("At least one sensor must be configured")]
    NoSensors,

    #[error("Default reading for sensor {0} is not finite")]
    NonFiniteReading(String),
}

/// Construction parameters for a [`crate::Drone`]
#[derive(Debug, Clone, PartialEq)]
pub struct DroneConfig {
    /// Rated maximum engine speed
    pub max_rpm: u32,
    /// Charge below which the interlock returns the drone to base
    pub low_battery_percent: f64,
    /// Sensor set and the reference used until the first explicit calibration
    pub sensors: BTreeMap<String, f64>,
}

impl Default for DroneConfig {
    fn default() -> Self {
        Self {
            max_rpm: limits::DEFAULT_MAX_RPM,
            low_battery_percent: limits::BATTERY_LOW_PERCENT,
            sensors: ["altimeter", "gyroscope", "magnetometer"]
                .into_iter()
                .map(|name| (name.to_string(), 0.0))
                .collect(),
        }
    }
}

impl DroneConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.max_rpm_nonzero()?;
        if !(0.0..=limits::BATTERY_FULL_PERCENT).contains(&self.low_battery_percent) {
            return Err(ConfigError::ThresholdOutOfRange(self.low_battery_percent));
        }
        if self.sensors.is_empty() {
            return Err(ConfigError::NoSensors);
        }
        if let Some(name) = self.sensors.iter().find(|(_, v)| !v.is_finite()).map(|(k, _)| k) {
            return Err(ConfigError::NonFiniteReading(name.clone()));
        }
        Ok(())
    }

    pub(crate) fn max_rpm_nonzero(&self) -> Result<NonZeroU32, ConfigError> {
        NonZeroU32::new(self.max_rpm).ok_or(ConfigError::ZeroMaxRpm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = DroneConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.max_rpm, 10_000);
        assert_eq!(config.low_battery_percent, 20.0);
        assert_eq!(config.sensors.len(), 3);
    }

    #[test]
    fn test_zero_max_rpm_rejected() {
        let config = DroneConfig { max_rpm: 0, ..Default::default() };
        assert_eq!(config.validate(), Err(ConfigError::ZeroMaxRpm));
    }

    #[test]
    fn test_threshold_range() {
        let config = DroneConfig { low_battery_percent: 120.0, ..Default::default() };
        assert_eq!(config.validate(), Err(ConfigError::ThresholdOutOfRange(120.0)));

        let config = DroneConfig { low_battery_percent: f64::NAN, ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_sensor_set_rejected() {
        let config = DroneConfig { sensors: BTreeMap::new(), ..Default::default() };
        assert_eq!(config.validate(), Err(ConfigError::NoSensors));
    }
}
