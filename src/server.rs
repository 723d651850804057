//! TCP command endpoint
//!
//! Accepts framed [`WireRequest`]s, runs them through the shared
//! [`CommandInterface`] and answers each with one framed [`WireResponse`].

use anyhow::Result;
use dronectl_core::codec::{self, FrameDecoder};
use dronectl_core::proto::{WireRequest, WireResponse};
use dronectl_core::{CommandInterface, CommandReply, DroneCommand};
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, info_span, warn, Instrument};

pub struct CommandServer {
    listener: TcpListener,
    /// Identifies this edge device in every connection span
    device_id: String,
    commands: CommandInterface,
}

impl CommandServer {
    pub async fn bind(
        addr: &str,
        device_id: impl Into<String>,
        commands: CommandInterface,
    ) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            device_id: device_id.into(),
            commands,
        })
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until the listener fails
    pub async fn run(self) -> Result<()> {
        loop {
            let (socket, addr) = self.listener.accept().await?;
            info!("Connection from: {}", addr);

            let commands = self.commands.clone();
            let span = info_span!("connection", device_id = %self.device_id, %addr);
            tokio::spawn(
                async move {
                    match serve_connection(socket, &commands).await {
                        Ok(()) => info!("Client disconnected: {}", addr),
                        Err(e) => error!("Connection {} closed: {}", addr, e),
                    }
                }
                .instrument(span),
            );
        }
    }
}

async fn serve_connection(mut socket: TcpStream, commands: &CommandInterface) -> Result<()> {
    let mut decoder = FrameDecoder::<WireRequest>::new();
    let mut buf = vec![0u8; 4096];

    loop {
        let n = socket.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }
        decoder.extend(&buf[..n]);

        while let Some(request) = decoder.decode_next()? {
            let response = handle_request(commands, request);
            socket.write_all(&codec::encode(&response)?).await?;
        }
    }
}

/// Turn one request into its response
pub fn handle_request(commands: &CommandInterface, request: WireRequest) -> WireResponse {
    let reply = match DroneCommand::try_from(request) {
        Ok(command) => commands.execute(command),
        Err(e) => {
            warn!("Rejected request: {}", e);
            CommandReply::rejected(e.to_string())
        }
    };
    debug!("Reply: {:?}", reply);
    reply.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dronectl_core::proto::CommandKind;
    use dronectl_core::{Drone, DroneConfig};

    fn commands() -> CommandInterface {
        CommandInterface::new(Drone::new(DroneConfig::default()).unwrap())
    }

    fn request(kind: CommandKind) -> WireRequest {
        WireRequest {
            kind: kind.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_handle_request_rejects_unknown_kind() {
        let response = handle_request(&commands(), WireRequest { kind: 77, ..Default::default() });
        assert!(!response.ok);
        assert_eq!(response.code, "INVALID_REQUEST");
    }

    #[test]
    fn test_handle_request_battery() {
        let response = handle_request(&commands(), request(CommandKind::BatteryCheck));
        assert!(response.ok);
        assert_eq!(response.battery_level, Some(100));
    }

    #[tokio::test]
    async fn test_round_trip_over_tcp() {
        let server = CommandServer::bind("127.0.0.1:0", "edge-test", commands()).await.unwrap();
        assert_eq!(server.device_id(), "edge-test");
        let addr = server.local_addr().unwrap();
        tokio::spawn(server.run());

        let mut stream = TcpStream::connect(addr).await.unwrap();
        let mut frames = bytes::BytesMut::new();
        codec::encode_into(&request(CommandKind::EngineStart), &mut frames).unwrap();
        codec::encode_into(
            &WireRequest {
                kind: CommandKind::UpdateHeight.into(),
                value: 15.0,
                ..Default::default()
            },
            &mut frames,
        )
        .unwrap();
        stream.write_all(&frames).await.unwrap();

        let mut decoder = FrameDecoder::<WireResponse>::new();
        let mut responses = Vec::new();
        let mut buf = vec![0u8; 1024];
        while responses.len() < 2 {
            let n = stream.read(&mut buf).await.unwrap();
            assert!(n > 0, "server closed the connection early");
            decoder.extend(&buf[..n]);
            while let Some(response) = decoder.decode_next().unwrap() {
                responses.push(response);
            }
        }

        assert!(responses[0].ok);
        assert_eq!(responses[0].message, "engine started");
        assert_eq!(responses[1].status.as_ref().map(|s| s.height), Some(15.0));
    }
}
