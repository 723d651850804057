//! Wire messages exchanged between the ground station and the edge endpoint
//!
//! Protobuf encoded via prost derives. Conversions to and from the command
//! types live here so the transports stay free of drone logic.

use crate::command::{CommandReply, DroneCommand};
use crate::strategy::FlightStrategy;
use crate::telemetry::Status;
use prost::{Enumeration, Message};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Enumeration)]
#[repr(i32)]
pub enum CommandKind {
    Unspecified = 0,
    GetStatus = 1,
    UpdatePosition = 2,
    UpdateHeight = 3,
    UpdateVelocity = 4,
    BatteryCheck = 5,
    ReturnToBase = 6,
    EngineStart = 7,
    EngineStop = 8,
    ApplyStrategy = 9,
    CalibrateSensors = 10,
    SetEngineRpm = 11,
    SetDestination = 12,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Enumeration)]
#[repr(i32)]
pub enum WireStrategy {
    Unspecified = 0,
    Normal = 1,
    Turbo = 2,
    Scan = 3,
}

#[derive(Clone, PartialEq, Message)]
pub struct WireRequest {
    #[prost(enumeration = "CommandKind", tag = "1")]
    pub kind: i32,

    #[prost(double, tag = "2")]
    pub x: f64,

    #[prost(double, tag = "3")]
    pub y: f64,

    /// Height or velocity, depending on the command
    #[prost(double, tag = "4")]
    pub value: f64,

    #[prost(enumeration = "WireStrategy", tag = "5")]
    pub strategy: i32,

    #[prost(btree_map = "string, double", tag = "6")]
    pub readings: BTreeMap<String, f64>,

    #[prost(int64, tag = "7")]
    pub rpm: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct WireStatus {
    #[prost(double, tag = "1")]
    pub height: f64,

    #[prost(double, tag = "2")]
    pub velocity: f64,

    #[prost(double, tag = "3")]
    pub x: f64,

    #[prost(double, tag = "4")]
    pub y: f64,

    #[prost(uint32, tag = "5")]
    pub battery: u32,
}

#[derive(Clone, PartialEq, Message)]
pub struct WireResponse {
    #[prost(bool, tag = "1")]
    pub ok: bool,

    /// Failure indicator, empty on success
    #[prost(string, tag = "2")]
    pub code: String,

    #[prost(string, tag = "3")]
    pub message: String,

    #[prost(message, optional, tag = "4")]
    pub status: Option<WireStatus>,

    #[prost(uint32, optional, tag = "5")]
    pub battery_level: Option<u32>,

    #[prost(string, optional, tag = "6")]
    pub warning: Option<String>,
}

/// Reasons a request cannot be turned into a command
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("Unknown command kind: {0}")]
    UnknownKind(i32),

    #[error("Request does not name a command")]
    MissingKind,

    #[error("Unknown flight strategy: {0}")]
    UnknownStrategy(i32),
}

impl From<FlightStrategy> for WireStrategy {
    fn from(strategy: FlightStrategy) -> Self {
        match strategy {
            FlightStrategy::Normal => WireStrategy::Normal,
            FlightStrategy::Turbo => WireStrategy::Turbo,
            FlightStrategy::Scan => WireStrategy::Scan,
        }
    }
}

impl TryFrom<WireRequest> for DroneCommand {
    type Error = RequestError;

    fn try_from(request: WireRequest) -> Result<Self, Self::Error> {
        let kind =
            CommandKind::try_from(request.kind).map_err(|_| RequestError::UnknownKind(request.kind))?;

        let command = match kind {
            CommandKind::Unspecified => return Err(RequestError::MissingKind),
            CommandKind::GetStatus => DroneCommand::GetStatus,
            CommandKind::UpdatePosition => DroneCommand::UpdatePosition {
                x: request.x,
                y: request.y,
            },
            CommandKind::UpdateHeight => DroneCommand::UpdateHeight { height: request.value },
            CommandKind::UpdateVelocity => DroneCommand::UpdateVelocity {
                velocity: request.value,
            },
            CommandKind::BatteryCheck => DroneCommand::BatteryCheck,
            CommandKind::ReturnToBase => DroneCommand::ReturnToBase,
            CommandKind::EngineStart => DroneCommand::EngineStart,
            CommandKind::EngineStop => DroneCommand::EngineStop,
            CommandKind::ApplyStrategy => {
                let strategy = match WireStrategy::try_from(request.strategy) {
                    Ok(WireStrategy::Normal) => FlightStrategy::Normal,
                    Ok(WireStrategy::Turbo) => FlightStrategy::Turbo,
                    Ok(WireStrategy::Scan) => FlightStrategy::Scan,
                    Ok(WireStrategy::Unspecified) | Err(_) => {
                        return Err(RequestError::UnknownStrategy(request.strategy));
                    }
                };
                DroneCommand::ApplyStrategy { strategy }
            }
            CommandKind::CalibrateSensors => DroneCommand::CalibrateSensors {
                readings: request.readings,
            },
            CommandKind::SetEngineRpm => DroneCommand::SetEngineRpm { rpm: request.rpm },
            CommandKind::SetDestination => DroneCommand::SetDestination {
                x: request.x,
                y: request.y,
            },
        };

        Ok(command)
    }
}

impl From<DroneCommand> for WireRequest {
    fn from(command: DroneCommand) -> Self {
        let mut request = WireRequest::default();
        let kind = match command {
            DroneCommand::GetStatus => CommandKind::GetStatus,
            DroneCommand::UpdatePosition { x, y } => {
                request.x = x;
                request.y = y;
                CommandKind::UpdatePosition
            }
            DroneCommand::UpdateHeight { height } => {
                request.value = height;
                CommandKind::UpdateHeight
            }
            DroneCommand::UpdateVelocity { velocity } => {
                request.value = velocity;
                CommandKind::UpdateVelocity
            }
            DroneCommand::BatteryCheck => CommandKind::BatteryCheck,
            DroneCommand::ReturnToBase => CommandKind::ReturnToBase,
            DroneCommand::EngineStart => CommandKind::EngineStart,
            DroneCommand::EngineStop => CommandKind::EngineStop,
            DroneCommand::SetEngineRpm { rpm } => {
                request.rpm = rpm;
                CommandKind::SetEngineRpm
            }
            DroneCommand::SetDestination { x, y } => {
                request.x = x;
                request.y = y;
                CommandKind::SetDestination
            }
            DroneCommand::ApplyStrategy { strategy } => {
                request.strategy = WireStrategy::from(strategy).into();
                CommandKind::ApplyStrategy
            }
            DroneCommand::CalibrateSensors { readings } => {
                request.readings = readings;
                CommandKind::CalibrateSensors
            }
        };
        request.kind = kind.into();
        request
    }
}

impl From<Status> for WireStatus {
    fn from(status: Status) -> Self {
        Self {
            height: status.height,
            velocity: status.velocity,
            x: status.position.x,
            y: status.position.y,
            battery: status.battery.into(),
        }
    }
}

impl From<CommandReply> for WireResponse {
    fn from(reply: CommandReply) -> Self {
        let mut response = WireResponse {
            ok: true,
            ..Default::default()
        };

        match reply {
            CommandReply::Status(status) => response.status = Some(status.into()),
            CommandReply::BatteryLevel(level) => response.battery_level = Some(level.into()),
            CommandReply::Warning(warning) => response.warning = Some(warning),
            CommandReply::Message { message, warning } => {
                response.message = message;
                response.warning = warning;
            }
            CommandReply::Completed(message) => response.message = message,
            CommandReply::Failed { code, message } => {
                response.ok = false;
                response.code = code.into();
                response.message = message;
            }
        }
        response
    }
}
