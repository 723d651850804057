//! Drone Facade
//!
//! Owns the telemetry and every subsystem, runs mission-level operations and
//! enforces the low-battery interlock. Subsystems never see each other; all
//! coordination happens here.

use crate::config::{ConfigError, DroneConfig};
use crate::engine::{Engine, RpmReport};
use crate::error::{DroneError, DroneResult};
use crate::navigation::Navigation;
use crate::sensors::SensorArray;
use crate::strategy::FlightStrategy;
use crate::telemetry::{Position, Status, Telemetry};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info, warn};

/// Warning returned when the interlock sends the drone home
pub const LOW_BATTERY_WARNING: &str = "low battery, returning to origin";

/// Warning returned by an explicit return-to-base
pub const RETURNED_HOME_WARNING: &str = "drone successfully returned to origin";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    Stopped,
    Running,
}

impl fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineStatus::Stopped => write!(f, "stopped"),
            EngineStatus::Running => write!(f, "running"),
        }
    }
}

/// Outcome of a battery check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryReport {
    /// Charge is healthy, value in whole percent
    Level(u8),
    /// Charge was low and the drone has been returned to origin
    Warning(&'static str),
}

impl BatteryReport {
    pub fn is_warning(&self) -> bool {
        matches!(self, BatteryReport::Warning(_))
    }
}

/// Result of flying one strategy step
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyOutcome {
    pub strategy: FlightStrategy,
    pub velocity: f64,
    pub description: &'static str,
    /// Interlock result evaluated after the battery drain
    pub battery: BatteryReport,
}

#[derive(Debug, Clone)]
pub struct Drone {
    /// Physical state, mutated only through its own methods
    telemetry: Telemetry,
    /// Engine rpm and rating
    engine: Engine,
    /// Origin and destination
    navigation: Navigation,
    /// Fixed sensor set
    sensors: SensorArray,
    /// Strategy flown by the last `apply_strategy`
    strategy: FlightStrategy,
    /// Reference applied by `engine_start`; updated by successful calibrations
    reference: BTreeMap<String, f64>,
    /// Interlock threshold in percent
    low_battery_percent: f64,
}

impl Drone {
    /// Create a drone at the origin with a full battery and a stopped engine
    pub fn new(config: DroneConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let max_rpm = config.max_rpm_nonzero()?;

        Ok(Self {
            telemetry: Telemetry::new(),
            engine: Engine::new(max_rpm),
            navigation: Navigation::new(),
            sensors: SensorArray::new(config.sensors.clone()),
            strategy: FlightStrategy::default(),
            reference: config.sensors,
            low_battery_percent: config.low_battery_percent,
        })
    }

    /// Project the current telemetry
    pub fn status(&self) -> Status {
        self.telemetry.project_status()
    }

    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn navigation(&self) -> &Navigation {
        &self.navigation
    }

    /// Current value of every configured sensor
    pub fn sensor_readings(&self) -> &BTreeMap<String, f64> {
        self.sensors.readings()
    }

    /// Strategy flown most recently, Normal after `go_home`
    pub fn active_strategy(&self) -> FlightStrategy {
        self.strategy
    }

    /// Engine status derived from rpm
    pub fn engine_status(&self) -> EngineStatus {
        if self.engine.is_running() {
            EngineStatus::Running
        } else {
            EngineStatus::Stopped
        }
    }

    /// Start the engine, calibrate against the last-known reference and aim
    /// navigation at the current position. Nothing is kept if any step fails.
    pub fn engine_start(&mut self) -> DroneResult<()> {
        let engine = self.engine.clone();
        let sensors = self.sensors.clone();
        let navigation = self.navigation.clone();

        if let Err(e) = self.start_sequence() {
            self.engine = engine;
            self.sensors = sensors;
            self.navigation = navigation;
            warn!("Engine start rolled back: {}", e);
            return Err(e);
        }

        info!(
            "Engine started at {} rpm, holding at {}",
            self.engine.rpm(),
            self.navigation.current_destination()
        );
        Ok(())
    }

    fn start_sequence(&mut self) -> DroneResult<()> {
        self.engine.start()?;
        self.sensors.calibrate(&self.reference)?;
        let here = self.telemetry.position();
        self.navigation.set_destination(here.x, here.y);
        Ok(())
    }

    pub fn engine_stop(&mut self) {
        self.engine.stop();
        info!("Engine stopped");
    }

    pub fn set_engine_rpm(&mut self, rpm: i64) -> DroneResult<RpmReport> {
        let report = self.engine.set_rpm(rpm)?;
        debug!("Engine rpm set: {}", report.message);
        Ok(report)
    }

    pub fn regulate_position(&mut self, position: Position) -> DroneResult<Status> {
        self.telemetry.set_position(position)?;
        Ok(self.status())
    }

    pub fn regulate_height(&mut self, height: f64) -> DroneResult<Status> {
        self.telemetry.set_height(height)?;
        Ok(self.status())
    }

    pub fn regulate_velocity(&mut self, velocity: f64) -> DroneResult<Status> {
        self.telemetry.set_velocity(velocity)?;
        Ok(self.status())
    }

    pub fn set_destination(&mut self, x: f64, y: f64) {
        self.navigation.set_destination(x, y);
    }

    /// Calibrate every sensor. On success the reference becomes the one used
    /// by later engine starts.
    pub fn calibrate_sensors(&mut self, reference: BTreeMap<String, f64>) -> DroneResult<()> {
        self.sensors.calibrate(&reference)?;
        self.reference = reference;
        info!("Sensors calibrated ({} readings)", self.sensors.len());
        Ok(())
    }

    /// Switch to `strategy` and fly one step with it. The battery interlock
    /// runs before this returns.
    pub fn apply_strategy(&mut self, strategy: FlightStrategy) -> DroneResult<StrategyOutcome> {
        if !self.engine.is_running() {
            return Err(DroneError::EngineNotRunning);
        }

        if strategy != self.strategy {
            debug!("Flight strategy {} -> {}", self.strategy, strategy);
        }
        self.strategy = strategy;

        let (velocity, description) = strategy.apply(&mut self.telemetry)?;
        self.telemetry.drain_battery(strategy.battery_cost())?;
        let battery = self.battery_check();

        Ok(StrategyOutcome {
            strategy,
            velocity,
            description,
            battery,
        })
    }

    /// The low-battery interlock
    pub fn battery_check(&mut self) -> BatteryReport {
        if self.telemetry.charge() < self.low_battery_percent {
            warn!(
                "[SAFETY] Battery at {:.1}% (threshold {}%), returning to origin",
                self.telemetry.charge(),
                self.low_battery_percent
            );
            self.go_home();
            return BatteryReport::Warning(LOW_BATTERY_WARNING);
        }
        BatteryReport::Level(self.telemetry.battery())
    }

    /// Return to origin and stop the engine. Safe to call in any state.
    pub fn go_home(&mut self) -> Status {
        self.strategy = FlightStrategy::Normal;
        let home = self.navigation.return_to_home();
        self.telemetry.return_to_origin(home);
        self.engine.stop();
        info!("Returned to origin {}", home);
        self.status()
    }
}
