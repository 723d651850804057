//! dronectl core
//!
//! Control core for a single drone: the telemetry model, flight strategies,
//! engine/navigation/sensor subsystems and the facade that coordinates them.
//! External callers go through [`CommandInterface`].

pub mod codec;
pub mod command;
pub mod config;
pub mod drone;
pub mod engine;
pub mod error;
pub mod navigation;
pub mod proto;
pub mod sensors;
pub mod strategy;
pub mod telemetry;

pub use command::{CommandInterface, CommandReply, DroneCommand};
pub use config::{ConfigError, DroneConfig};
pub use drone::{BatteryReport, Drone, EngineStatus, StrategyOutcome};
pub use engine::{Engine, RpmReport};
pub use error::{DroneError, DroneResult};
pub use navigation::Navigation;
pub use sensors::SensorArray;
pub use strategy::FlightStrategy;
pub use telemetry::{Position, Status, Telemetry};

/// Operating limits for the vehicle
pub mod limits {
    /// Engine speed set by `start()`
    pub const IDLE_RPM: u32 = 10;

    /// Rated maximum engine speed used when none is configured
    pub const DEFAULT_MAX_RPM: u32 = 10_000;

    /// Full battery charge in percent
    pub const BATTERY_FULL_PERCENT: f64 = 100.0;

    /// Below this charge the interlock forces return-to-base
    pub const BATTERY_LOW_PERCENT: f64 = 20.0;
}
