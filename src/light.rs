//! WiZ bulb control over UDP.

use std::net::Ipv4Addr;
use std::time::Duration;

use log::debug;
use serde_json::{Value, json};
use tokio::net::UdpSocket;
use tokio::time;

use crate::discovery::{DiscoveredBulb, discover_bulbs};
use crate::errors::Error;
use crate::payload::Payload;
use crate::preset::ColorMode;
use crate::transport::Transport;
use crate::types::SceneMode;

type Result<T> = std::result::Result<T, Error>;

/// [`Transport`] for Philips WiZ bulbs.
///
/// Every command is a single JSON datagram to port 38899 followed by one
/// reply. A bulb that does not answer within the command timeout is
/// reported as an error; nothing is retried.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use wiz_scenes::WizTransport;
///
/// let transport = WizTransport::new(Duration::from_secs(5), Duration::from_millis(800));
/// assert_eq!(transport.command_timeout(), Duration::from_millis(800));
/// ```
#[derive(Debug, Clone)]
pub struct WizTransport {
    discovery_timeout: Duration,
    command_timeout: Duration,
}

impl Default for WizTransport {
    fn default() -> Self {
        Self::new(
            Duration::from_secs(Self::DISCOVERY_SECS),
            Duration::from_millis(Self::TIMEOUT_MS),
        )
    }
}

impl WizTransport {
    const PORT: u16 = 38899;
    const TIMEOUT_MS: u64 = 1000;
    const DISCOVERY_SECS: u64 = 3;

    pub fn new(discovery_timeout: Duration, command_timeout: Duration) -> Self {
        WizTransport {
            discovery_timeout,
            command_timeout,
        }
    }

    pub fn discovery_timeout(&self) -> Duration {
        self.discovery_timeout
    }

    pub fn command_timeout(&self) -> Duration {
        self.command_timeout
    }

    async fn set_pilot(&self, ip: Ipv4Addr, payload: &Payload) -> Result<()> {
        if !payload.is_valid() {
            return Err(Error::NoAttribute);
        }

        let params = serde_json::to_value(payload).map_err(Error::JsonDump)?;
        self.send_command(ip, &json!({"method": "setPilot", "params": params}))
            .await?;
        Ok(())
    }

    async fn send_command(&self, ip: Ipv4Addr, msg: &Value) -> Result<Value> {
        let msg_str = serde_json::to_string(msg).map_err(Error::JsonDump)?;
        debug!("UDP request to {}: {}", ip, msg_str);

        match self.send_udp(ip, &msg_str).await {
            Ok(response) => {
                debug!("UDP response from {}: {:?}", ip, response);
                Ok(response)
            }
            Err(e) => {
                debug!("UDP command to {} failed: {}", ip, e);
                Err(e)
            }
        }
    }

    async fn send_udp(&self, ip: Ipv4Addr, msg: &str) -> Result<Value> {
        let socket = UdpSocket::bind("0.0.0.0:0")
            .await
            .map_err(|e| Error::socket("bind", e))?;

        socket
            .connect((ip, Self::PORT))
            .await
            .map_err(|e| Error::socket("connect", e))?;

        socket
            .send(msg.as_bytes())
            .await
            .map_err(|e| Error::socket("send", e))?;

        let mut buffer = [0u8; 4096];

        let bytes = time::timeout(self.command_timeout, socket.recv(&mut buffer))
            .await
            .map_err(|_| {
                Error::socket(
                    "receive",
                    std::io::Error::new(std::io::ErrorKind::TimedOut, "receive timeout"),
                )
            })?
            .map_err(|e| Error::socket("receive", e))?;

        let response = String::from_utf8(buffer[..bytes].to_vec()).map_err(Error::Utf8Decode)?;
        serde_json::from_str(&response).map_err(Error::JsonLoad)
    }
}

impl Transport for WizTransport {
    async fn discover(&self) -> Result<Vec<DiscoveredBulb>> {
        discover_bulbs(self.discovery_timeout).await
    }

    async fn power(&self, ip: Ipv4Addr) -> Result<bool> {
        let resp = self.send_command(ip, &json!({"method": "getPilot"})).await?;
        parse_power(&resp)
    }

    async fn set_power(&self, ip: Ipv4Addr, on: bool) -> Result<()> {
        self.send_command(ip, &json!({"method": "setState", "params": {"state": on}}))
            .await?;
        Ok(())
    }

    async fn set_light(&self, ip: Ipv4Addr, brightness: u8, mode: &ColorMode) -> Result<()> {
        self.set_pilot(ip, &Payload::lighting(brightness, mode)).await
    }

    async fn run_indicator(&self, ip: Ipv4Addr) -> Result<()> {
        self.set_pilot(ip, &Payload::from(&SceneMode::Alarm)).await
    }

    async fn stop_indicator(&self, ip: Ipv4Addr) -> Result<()> {
        self.set_pilot(ip, &Payload::from(&SceneMode::WarmWhite)).await
    }
}

fn parse_power(resp: &Value) -> Result<bool> {
    resp.get("result")
        .and_then(|r| r.get("state"))
        .and_then(Value::as_bool)
        .ok_or_else(|| {
            Error::JsonLoad(serde::de::Error::custom(
                "getPilot reply carries no power state",
            ))
        })
}
