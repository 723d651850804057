//! Error kinds reported by the drone core

use thiserror::Error;

/// Convenience alias for results returned by the core
pub type DroneResult<T> = Result<T, DroneError>;

/// Failures reported by subsystems and the facade
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DroneError {
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: f64 },

    #[error("Invalid battery drain amount: {0}")]
    InvalidAmount(f64),

    #[error("Engine is already running")]
    AlreadyRunning,

    #[error("Engine is not running")]
    EngineNotRunning,

    #[error("Invalid rpm: {0}")]
    InvalidRpm(i64),

    #[error("Unknown sensor: {0}")]
    UnknownSensor(String),

    #[error("Missing reading for sensor: {0}")]
    MissingReading(String),
}

impl DroneError {
    /// Stable failure indicator exposed to external callers
    pub fn code(&self) -> &'static str {
        match self {
            DroneError::InvalidValue { .. } => "INVALID_VALUE",
            DroneError::InvalidAmount(_) => "INVALID_AMOUNT",
            DroneError::AlreadyRunning => "ALREADY_RUNNING",
            DroneError::EngineNotRunning => "ENGINE_NOT_RUNNING",
            DroneError::InvalidRpm(_) => "INVALID_RPM",
            DroneError::UnknownSensor(_) => "UNKNOWN_SENSOR",
            DroneError::MissingReading(_) => "MISSING_READING",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            DroneError::InvalidValue { field: "height", value: -1.0 },
            DroneError::InvalidAmount(-1.0),
            DroneError::AlreadyRunning,
            DroneError::EngineNotRunning,
            DroneError::InvalidRpm(-5),
            DroneError::UnknownSensor("lidar".into()),
            DroneError::MissingReading("gyroscope".into()),
        ];

        let mut codes: Vec<_> = errors.iter().map(DroneError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_display_names_the_sensor() {
        let err = DroneError::UnknownSensor("lidar".into());
        assert_eq!(err.to_string(), "Unknown sensor: lidar");
    }
}
