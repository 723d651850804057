//! Command Interface
//!
//! The only entry point external transports use. It owns the facade behind a
//! mutex so that commands from any number of callers execute one at a time,
//! each one seeing the complete result of the previous one.

use crate::drone::{BatteryReport, Drone, RETURNED_HOME_WARNING};
use crate::error::DroneError;
use crate::strategy::FlightStrategy;
use crate::telemetry::{Position, Status};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// Failure indicator for requests that never reached the drone
pub const INVALID_REQUEST: &str = "INVALID_REQUEST";

/// Commands accepted from external callers
#[derive(Debug, Clone, PartialEq)]
pub enum DroneCommand {
    GetStatus,
    UpdatePosition { x: f64, y: f64 },
    UpdateHeight { height: f64 },
    UpdateVelocity { velocity: f64 },
    BatteryCheck,
    ReturnToBase,
    EngineStart,
    EngineStop,
    SetEngineRpm { rpm: i64 },
    SetDestination { x: f64, y: f64 },
    ApplyStrategy { strategy: FlightStrategy },
    CalibrateSensors { readings: BTreeMap<String, f64> },
}

impl DroneCommand {
    pub fn name(&self) -> &'static str {
        match self {
            DroneCommand::GetStatus => "get_status",
            DroneCommand::UpdatePosition { .. } => "update_position",
            DroneCommand::UpdateHeight { .. } => "update_height",
            DroneCommand::UpdateVelocity { .. } => "update_velocity",
            DroneCommand::BatteryCheck => "battery_check",
            DroneCommand::ReturnToBase => "return_to_base",
            DroneCommand::EngineStart => "engine_start",
            DroneCommand::EngineStop => "engine_stop",
            DroneCommand::SetEngineRpm { .. } => "set_engine_rpm",
            DroneCommand::SetDestination { .. } => "set_destination",
            DroneCommand::ApplyStrategy { .. } => "apply_strategy",
            DroneCommand::CalibrateSensors { .. } => "calibrate_sensors",
        }
    }
}

/// Reply to a command
#[derive(Debug, Clone, PartialEq)]
pub enum CommandReply {
    /// Telemetry projection
    Status(Status),
    /// Battery is healthy
    BatteryLevel(u8),
    Warning(String),
    /// Descriptive outcome, with the interlock warning when it tripped
    Message { message: String, warning: Option<String> },
    /// Command succeeded with nothing further to report
    Completed(String),
    /// Command failed; no drone state is included
    Failed { code: &'static str, message: String },
}

impl CommandReply {
    pub fn is_failure(&self) -> bool {
        matches!(self, CommandReply::Failed { .. })
    }

    /// Reply for a request the transport could not turn into a command
    pub fn rejected(message: impl Into<String>) -> Self {
        CommandReply::Failed {
            code: INVALID_REQUEST,
            message: message.into(),
        }
    }
}

impl From<DroneError> for CommandReply {
    fn from(err: DroneError) -> Self {
        CommandReply::Failed {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

impl From<BatteryReport> for CommandReply {
    fn from(report: BatteryReport) -> Self {
        match report {
            BatteryReport::Level(level) => CommandReply::BatteryLevel(level),
            BatteryReport::Warning(warning) => CommandReply::Warning(warning.into()),
        }
    }
}

/// Shared handle to the single drone instance
#[derive(Debug, Clone)]
pub struct CommandInterface {
    drone: Arc<Mutex<Drone>>,
}

impl CommandInterface {
    pub fn new(drone: Drone) -> Self {
        Self {
            drone: Arc::new(Mutex::new(drone)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Drone> {
        // Facade operations validate before mutating, so the state behind a
        // poisoned lock is still consistent
        self.drone.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with exclusive access to the drone
    pub fn with_drone<R>(&self, f: impl FnOnce(&mut Drone) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn status(&self) -> Status {
        self.lock().status()
    }

    /// Execute one command as a single critical section
    pub fn execute(&self, command: DroneCommand) -> CommandReply {
        let name = command.name();
        debug!("Executing command: {}", name);

        let reply = {
            let mut drone = self.lock();
            dispatch(&mut drone, command)
        };

        if let CommandReply::Failed { code, message } = &reply {
            warn!("Command {} failed ({}): {}", name, code, message);
        }
        reply
    }
}

fn dispatch(drone: &mut Drone, command: DroneCommand) -> CommandReply {
    let result = match command {
        DroneCommand::GetStatus => Ok(CommandReply::Status(drone.status())),
        DroneCommand::UpdatePosition { x, y } => {
            drone.regulate_position(Position::new(x, y)).map(CommandReply::Status)
        }
        DroneCommand::UpdateHeight { height } => {
            drone.regulate_height(height).map(CommandReply::Status)
        }
        DroneCommand::UpdateVelocity { velocity } => {
            drone.regulate_velocity(velocity).map(CommandReply::Status)
        }
        DroneCommand::BatteryCheck => Ok(drone.battery_check().into()),
        DroneCommand::ReturnToBase => {
            drone.go_home();
            Ok(CommandReply::Warning(RETURNED_HOME_WARNING.into()))
        }
        DroneCommand::EngineStart => drone
            .engine_start()
            .map(|()| CommandReply::Completed("engine started".into())),
        DroneCommand::EngineStop => {
            drone.engine_stop();
            Ok(CommandReply::Completed("engine stopped".into()))
        }
        DroneCommand::SetEngineRpm { rpm } => drone.set_engine_rpm(rpm).map(|report| {
            CommandReply::Message {
                message: report.message,
                warning: None,
            }
        }),
        DroneCommand::SetDestination { x, y } => {
            drone.set_destination(x, y);
            Ok(CommandReply::Completed(format!("destination set to {}", Position::new(x, y))))
        }
        DroneCommand::ApplyStrategy { strategy } => {
            drone.apply_strategy(strategy).map(|outcome| CommandReply::Message {
                message: outcome.description.into(),
                warning: match outcome.battery {
                    BatteryReport::Warning(warning) => Some(warning.into()),
                    BatteryReport::Level(_) => None,
                },
            })
        }
        DroneCommand::CalibrateSensors { readings } => drone
            .calibrate_sensors(readings)
            .map(|()| CommandReply::Completed("sensors calibrated".into())),
    };

    result.unwrap_or_else(CommandReply::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DroneConfig;
    use crate::drone::LOW_BATTERY_WARNING;
    use std::thread;

    fn interface() -> CommandInterface {
        CommandInterface::new(Drone::new(DroneConfig::default()).unwrap())
    }

    fn readings(value: f64) -> BTreeMap<String, f64> {
        ["altimeter", "gyroscope", "magnetometer"]
            .into_iter()
            .map(|name| (name.to_string(), value))
            .collect()
    }

    #[test]
    fn test_get_status() {
        let reply = interface().execute(DroneCommand::GetStatus);
        let CommandReply::Status(status) = reply else {
            panic!("expected status, got {reply:?}");
        };
        assert_eq!(status.battery, 100);
        assert_eq!(status.position, Position::ORIGIN);
    }

    #[test]
    fn test_update_commands_return_status() {
        let commands = interface();

        commands.execute(DroneCommand::UpdatePosition { x: 1.0, y: 2.0 });
        commands.execute(DroneCommand::UpdateHeight { height: 30.0 });
        let reply = commands.execute(DroneCommand::UpdateVelocity { velocity: 5.0 });

        let CommandReply::Status(status) = reply else {
            panic!("expected status, got {reply:?}");
        };
        assert_eq!(status.position, Position::new(1.0, 2.0));
        assert_eq!(status.height, 30.0);
        assert_eq!(status.velocity, 5.0);
    }

    #[test]
    fn test_failure_carries_code_and_no_status() {
        let reply = interface().execute(DroneCommand::UpdateHeight { height: -4.0 });
        assert!(matches!(reply, CommandReply::Failed { code: "INVALID_VALUE", .. }));
    }

    #[test]
    fn test_apply_strategy_when_stopped() {
        let reply = interface().execute(DroneCommand::ApplyStrategy {
            strategy: FlightStrategy::Normal,
        });
        assert!(matches!(reply, CommandReply::Failed { code: "ENGINE_NOT_RUNNING", .. }));
    }

    #[test]
    fn test_apply_strategy_message() {
        let commands = interface();
        assert!(!commands.execute(DroneCommand::EngineStart).is_failure());

        let reply = commands.execute(DroneCommand::ApplyStrategy {
            strategy: FlightStrategy::Turbo,
        });
        assert_eq!(
            reply,
            CommandReply::Message {
                message: "turbo flight at 50 units/s".into(),
                warning: None,
            }
        );
    }

    #[test]
    fn test_return_to_base_twice() {
        let commands = interface();
        commands.execute(DroneCommand::EngineStart);
        commands.execute(DroneCommand::UpdatePosition { x: 9.0, y: 9.0 });

        for _ in 0..2 {
            let reply = commands.execute(DroneCommand::ReturnToBase);
            assert_eq!(reply, CommandReply::Warning("drone successfully returned to origin".into()));

            let status = commands.status();
            assert_eq!(status.position, Position::ORIGIN);
            assert_eq!(status.height, 0.0);
            assert_eq!(status.velocity, 0.0);
        }
        assert_eq!(commands.with_drone(|d| d.engine().rpm()), 0);
    }

    #[test]
    fn test_engine_start_twice_reports_failure() {
        let commands = interface();
        assert_eq!(
            commands.execute(DroneCommand::EngineStart),
            CommandReply::Completed("engine started".into())
        );
        assert!(matches!(
            commands.execute(DroneCommand::EngineStart),
            CommandReply::Failed { code: "ALREADY_RUNNING", .. }
        ));
    }

    #[test]
    fn test_set_engine_rpm() {
        let commands = interface();
        assert!(matches!(
            commands.execute(DroneCommand::SetEngineRpm { rpm: 5_000 }),
            CommandReply::Failed { code: "ENGINE_NOT_RUNNING", .. }
        ));

        commands.execute(DroneCommand::EngineStart);
        let reply = commands.execute(DroneCommand::SetEngineRpm { rpm: 10_000 });
        assert_eq!(
            reply,
            CommandReply::Message {
                message: "engine at maximum capacity".into(),
                warning: None,
            }
        );
    }

    #[test]
    fn test_calibrate_sensors() {
        let commands = interface();
        assert_eq!(
            commands.execute(DroneCommand::CalibrateSensors { readings: readings(2.0) }),
            CommandReply::Completed("sensors calibrated".into())
        );

        let mut extra = readings(3.0);
        extra.insert("lidar".into(), 1.0);
        assert!(matches!(
            commands.execute(DroneCommand::CalibrateSensors { readings: extra }),
            CommandReply::Failed { code: "UNKNOWN_SENSOR", .. }
        ));
        assert_eq!(commands.with_drone(|d| d.sensor_readings().clone()), readings(2.0));
    }

    #[test]
    fn test_battery_check_warning_after_drain() {
        let commands = interface();
        commands.execute(DroneCommand::EngineStart);

        let mut last = None;
        for _ in 0..27 {
            last = Some(commands.execute(DroneCommand::ApplyStrategy {
                strategy: FlightStrategy::Turbo,
            }));
        }
        assert_eq!(
            last,
            Some(CommandReply::Message {
                message: "turbo flight at 50 units/s".into(),
                warning: Some(LOW_BATTERY_WARNING.into()),
            })
        );
        assert_eq!(
            commands.execute(DroneCommand::BatteryCheck),
            CommandReply::Warning(LOW_BATTERY_WARNING.into())
        );
    }

    #[test]
    fn test_concurrent_commands_keep_invariants() {
        let commands = interface();
        commands.execute(DroneCommand::EngineStart);

        thread::scope(|scope| {
            for worker in 0..8 {
                let commands = commands.clone();
                scope.spawn(move || {
                    for step in 0..50 {
                        match (worker + step) % 4 {
                            0 => {
                                commands.execute(DroneCommand::EngineStart);
                            }
                            1 => commands.with_drone(|drone| {
                                if drone.apply_strategy(FlightStrategy::Turbo).is_ok()
                                    && drone.telemetry().charge() < 20.0
                                {
                                    assert_eq!(drone.engine().rpm(), 0);
                                    assert_eq!(drone.status().velocity, 0.0);
                                    assert_eq!(drone.status().position, Position::ORIGIN);
                                }
                            }),
                            2 => {
                                commands.execute(DroneCommand::UpdateHeight {
                                    height: f64::from(step),
                                });
                            }
                            _ => {
                                commands.execute(DroneCommand::UpdatePosition { x: 1.0, y: 1.0 });
                            }
                        }

                        commands.with_drone(|drone| {
                            let charge = drone.telemetry().charge();
                            assert!((0.0..=100.0).contains(&charge));
                            assert!(drone.engine().rpm() <= drone.engine().max_rpm());
                        });
                    }
                });
            }
        });

        // the engine stays up until the interlock trips, which takes 27 runs
        assert!(commands.status().battery < 20);
    }
}
