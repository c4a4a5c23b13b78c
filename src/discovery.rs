//! Device discovery via UDP broadcast.

use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use log::debug;
use serde_json::{Value, json};
use tokio::net::UdpSocket;
use tokio::time::{self, Instant};

use crate::errors::Error;

type Result<T> = std::result::Result<T, Error>;

/// A WiZ bulb that answered the discovery broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredBulb {
    /// IP address of the discovered bulb
    pub ip: Ipv4Addr,
    /// MAC address of the discovered bulb
    pub mac: String,
}

impl DiscoveredBulb {
    pub fn new(ip: Ipv4Addr, mac: &str) -> Self {
        DiscoveredBulb {
            ip,
            mac: mac.to_string(),
        }
    }
}

/// Discover WiZ bulbs on the local network using UDP broadcast.
///
/// Sends a broadcast message and collects responses from all bulbs within
/// the specified timeout period. Bulbs answering more than once are
/// reported once, keyed by MAC address.
///
/// # Examples
///
/// ```ignore
/// use std::time::Duration;
/// use wiz_scenes::discover_bulbs;
///
/// let bulbs = discover_bulbs(Duration::from_secs(5)).await?;
/// println!("Found {} bulbs", bulbs.len());
/// ```
pub async fn discover_bulbs(discovery_timeout: Duration) -> Result<Vec<DiscoveredBulb>> {
    let socket = UdpSocket::bind("0.0.0.0:0")
        .await
        .map_err(|e| Error::socket("bind", e))?;

    socket
        .set_broadcast(true)
        .map_err(|e| Error::socket("set_broadcast", e))?;

    let msg = json!({
        "method": "registration",
        "params": {
            "phoneMac": "AAAAAAAAAAAA",
            "register": false,
            "phoneIp": "1.2.3.4",
            "id": "1"
        }
    });
    let msg_bytes = serde_json::to_vec(&msg).map_err(Error::JsonDump)?;

    socket
        .send_to(&msg_bytes, "255.255.255.255:38899")
        .await
        .map_err(|e| Error::socket("send_to", e))?;

    let mut discovered: HashMap<String, DiscoveredBulb> = HashMap::new();
    let start = Instant::now();
    let mut buffer = [0u8; 4096];
    let recv_timeout = Duration::from_millis(500);

    while start.elapsed() < discovery_timeout {
        match time::timeout(recv_timeout, socket.recv_from(&mut buffer)).await {
            Ok(Ok((size, SocketAddr::V4(addr)))) => {
                if let Some(mac) = parse_registration(&buffer[..size]) {
                    debug!("discovery reply from {} ({})", addr.ip(), mac);
                    discovered.insert(mac.clone(), DiscoveredBulb::new(*addr.ip(), &mac));
                }
            }
            // Timeout elapsed or a non-IPv4 reply; keep listening
            Ok(_) | Err(_) => continue,
        }
    }

    let mut bulbs: Vec<DiscoveredBulb> = discovered.into_values().collect();
    bulbs.sort_by_key(|bulb| bulb.ip);
    Ok(bulbs)
}

fn parse_registration(datagram: &[u8]) -> Option<String> {
    let json: Value = serde_json::from_slice(datagram).ok()?;
    json.get("result")
        .and_then(|r| r.get("mac"))
        .and_then(|m| m.as_str())
        .map(String::from)
}
