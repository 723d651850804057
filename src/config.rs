//! Edge device configuration

use anyhow::{Context, Result};
use dronectl_core::DroneConfig;

pub const ENV_DEVICE_ID: &str = "DRONECTL_DEVICE_ID";
pub const ENV_LISTEN_ADDR: &str = "DRONECTL_LISTEN_ADDR";
pub const ENV_MAX_RPM: &str = "DRONECTL_MAX_RPM";

#[derive(Debug, Clone)]
pub struct EdgeConfig {
    pub device_id: String,
    /// Address the command endpoint listens on
    pub listen_addr: String,
    pub drone: DroneConfig,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            device_id: "edge-001".into(),
            listen_addr: "127.0.0.1:8080".into(),
            drone: DroneConfig::default(),
        }
    }
}

impl EdgeConfig {
    /// Defaults overridden by `DRONECTL_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(device_id) = lookup(ENV_DEVICE_ID) {
            config.device_id = device_id;
        }
        if let Some(addr) = lookup(ENV_LISTEN_ADDR) {
            config.listen_addr = addr;
        }
        if let Some(max_rpm) = lookup(ENV_MAX_RPM) {
            config.drone.max_rpm = max_rpm
                .trim()
                .parse()
                .with_context(|| format!("{ENV_MAX_RPM} is not a valid rpm: {max_rpm:?}"))?;
        }

        config.drone.validate().context("Invalid drone configuration")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = EdgeConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.device_id, "edge-001");
        assert_eq!(config.listen_addr, "127.0.0.1:8080");
        assert_eq!(config.drone, DroneConfig::default());
    }

    #[test]
    fn test_env_overrides() {
        let config = EdgeConfig::from_lookup(lookup(&[
            (ENV_DEVICE_ID, "edge-042"),
            (ENV_LISTEN_ADDR, "0.0.0.0:9100"),
            (ENV_MAX_RPM, "12000"),
        ]))
        .unwrap();

        assert_eq!(config.device_id, "edge-042");
        assert_eq!(config.listen_addr, "0.0.0.0:9100");
        assert_eq!(config.drone.max_rpm, 12_000);
    }

    #[test]
    fn test_bad_max_rpm() {
        assert!(EdgeConfig::from_lookup(lookup(&[(ENV_MAX_RPM, "fast")])).is_err());
        assert!(EdgeConfig::from_lookup(lookup(&[(ENV_MAX_RPM, "0")])).is_err());
    }
}
