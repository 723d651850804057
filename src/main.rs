mod config;
mod server;

use anyhow::Result;
use config::EdgeConfig;
use dronectl_core::{CommandInterface, Drone};
use server::CommandServer;
use tracing::{info, info_span, warn, Instrument};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = EdgeConfig::from_env()?;

    info!("Edge device starting: {}", config.device_id);
    info!("  Max rpm: {}", config.drone.max_rpm);
    info!("  Low battery threshold: {}%", config.drone.low_battery_percent);
    info!("  Sensors: {:?}", config.drone.sensors.keys().collect::<Vec<_>>());

    let drone = Drone::new(config.drone.clone())?;
    let commands = CommandInterface::new(drone);

    let server =
        CommandServer::bind(&config.listen_addr, config.device_id.as_str(), commands.clone())
            .await?;
    info!("Command endpoint listening on {}", server.local_addr()?);

    tokio::select! {
        result = server.run().instrument(info_span!("edge", device_id = %config.device_id)) => result?,
        _ = tokio::signal::ctrl_c() => {
            warn!("Shutdown requested, returning to origin");
            commands.with_drone(|drone| drone.go_home());
        }
    }

    info!("Edge device stopped");
    Ok(())
}
