//! Ground station CLI
//!
//! Sends a single command to the edge endpoint and prints the reply.
//!
//! ```text
//! ground-station status
//! ground-station start
//! ground-station fly turbo
//! ground-station calibrate altimeter=1.2 gyroscope=0 magnetometer=0.4
//! ```

use anyhow::{anyhow, bail, Context, Result};
use dronectl_core::codec::{self, FrameDecoder};
use dronectl_core::proto::{WireRequest, WireResponse};
use dronectl_core::{DroneCommand, FlightStrategy};
use std::collections::BTreeMap;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

const ENV_EDGE_ADDR: &str = "DRONECTL_EDGE_ADDR";
const DEFAULT_EDGE_ADDR: &str = "127.0.0.1:8080";

const USAGE: &str = "usage: ground-station <command> [args]
commands:
  status                      show telemetry
  position <x> <y>            move to coordinates
  height <h>                  set height
  velocity <v>                set velocity
  battery                     run the battery check
  rth                         return to base
  start                       start the engine
  stop                        stop the engine
  rpm <n>                     set engine rpm
  destination <x> <y>         set navigation destination
  fly <normal|turbo|scan>     fly one step with a strategy
  calibrate <name=value>...   calibrate every sensor";

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        println!("{USAGE}");
        return Ok(());
    }

    let command = parse_command(&args)?;
    let addr = std::env::var(ENV_EDGE_ADDR).unwrap_or_else(|_| DEFAULT_EDGE_ADDR.into());

    let response = send(&addr, command).await?;
    println!("{}", render(&response));

    if !response.ok {
        std::process::exit(1);
    }
    Ok(())
}

async fn send(addr: &str, command: DroneCommand) -> Result<WireResponse> {
    let mut stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("Failed to connect to edge device at {addr}"))?;

    let request = WireRequest::from(command);
    stream.write_all(&codec::encode(&request)?).await?;

    let mut decoder = FrameDecoder::<WireResponse>::new();
    let mut buf = vec![0u8; 4096];
    loop {
        if let Some(response) = decoder.decode_next()? {
            return Ok(response);
        }
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            bail!("Edge device closed the connection without replying");
        }
        decoder.extend(&buf[..n]);
    }
}

fn parse_command(args: &[String]) -> Result<DroneCommand> {
    let (name, rest) = args.split_first().ok_or_else(|| anyhow!("missing command\n{USAGE}"))?;

    let command = match (name.as_str(), rest) {
        ("status", []) => DroneCommand::GetStatus,
        ("position", [x, y]) => DroneCommand::UpdatePosition {
            x: number(x)?,
            y: number(y)?,
        },
        ("height", [h]) => DroneCommand::UpdateHeight { height: number(h)? },
        ("velocity", [v]) => DroneCommand::UpdateVelocity { velocity: number(v)? },
        ("battery", []) => DroneCommand::BatteryCheck,
        ("rth", []) => DroneCommand::ReturnToBase,
        ("start", []) => DroneCommand::EngineStart,
        ("stop", []) => DroneCommand::EngineStop,
        ("rpm", [n]) => DroneCommand::SetEngineRpm {
            rpm: n.parse().with_context(|| format!("not an rpm value: {n}"))?,
        },
        ("destination", [x, y]) => DroneCommand::SetDestination {
            x: number(x)?,
            y: number(y)?,
        },
        ("fly", [strategy]) => DroneCommand::ApplyStrategy {
            strategy: strategy.parse::<FlightStrategy>()?,
        },
        ("calibrate", pairs) if !pairs.is_empty() => DroneCommand::CalibrateSensors {
            readings: readings(pairs)?,
        },
        _ => bail!("unrecognized command: {}\n{USAGE}", args.join(" ")),
    };
    Ok(command)
}

fn number(arg: &str) -> Result<f64> {
    arg.parse().with_context(|| format!("not a number: {arg}"))
}

fn readings(pairs: &[String]) -> Result<BTreeMap<String, f64>> {
    pairs
        .iter()
        .map(|pair| {
            let (name, value) = pair
                .split_once('=')
                .ok_or_else(|| anyhow!("expected name=value, got {pair}"))?;
            Ok::<_, anyhow::Error>((name.to_string(), number(value)?))
        })
        .collect()
}

fn render(response: &WireResponse) -> String {
    if !response.ok {
        return format!("FAILED [{}]: {}", response.code, response.message);
    }

    let mut lines = Vec::new();
    if let Some(status) = &response.status {
        lines.push(format!(
            "height={} velocity={} position=({}, {}) battery={}%",
            status.height, status.velocity, status.x, status.y, status.battery
        ));
    }
    if let Some(level) = response.battery_level {
        lines.push(format!("battery level: {level}%"));
    }
    if !response.message.is_empty() {
        lines.push(response.message.clone());
    }
    if let Some(warning) = &response.warning {
        lines.push(format!("WARNING: {warning}"));
    }
    if lines.is_empty() {
        lines.push("ok".into());
    }
    lines.join("\n")
}
