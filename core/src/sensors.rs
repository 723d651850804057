//! Sensor Subsystem
//!
//! A fixed set of named sensors. Values only change through a complete
//! calibration: the reference must name every configured sensor and nothing
//! else, and it is validated in full before any value is replaced.

use crate::error::{DroneError, DroneResult};
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct SensorArray {
    /// Sensor name to calibrated value; the key set never changes
    readings: BTreeMap<String, f64>,
}

impl SensorArray {
    /// Create the sensor set. The keys given here are the only sensors the
    /// array will ever hold.
    pub fn new<I, K>(sensors: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        Self {
            readings: sensors.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Current values of every sensor
    pub fn readings(&self) -> &BTreeMap<String, f64> {
        &self.readings
    }

    /// Value of one sensor, `None` if it is not configured
    pub fn get(&self, name: &str) -> Option<f64> {
        self.readings.get(name).copied()
    }

    /// Number of configured sensors
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Replace every reading with the matching reference value
    pub fn calibrate(&mut self, reference: &BTreeMap<String, f64>) -> DroneResult<()> {
        if let Some(unknown) = reference.keys().find(|k| !self.readings.contains_key(*k)) {
            return Err(DroneError::UnknownSensor(unknown.clone()));
        }
        if let Some(missing) = self.readings.keys().find(|k| !reference.contains_key(*k)) {
            return Err(DroneError::MissingReading(missing.clone()));
        }
        if let Some((name, value)) = reference.iter().find(|(_, v)| !v.is_finite()) {
            debug!("Rejected non-finite reading for {}", name);
            return Err(DroneError::InvalidValue {
                field: "sensor reading",
                value: *value,
            });
        }

        for (name, value) in self.readings.iter_mut() {
            // every key was checked above
            if let Some(calibrated) = reference.get(name) {
                *value = *calibrated;
            }
        }
        Ok(())
    }
}
