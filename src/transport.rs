//! The device side of bulb control.

use std::future::Future;
use std::net::Ipv4Addr;

use crate::discovery::DiscoveredBulb;
use crate::errors::Error;
use crate::preset::ColorMode;

type Result<T> = std::result::Result<T, Error>;

/// Commands a bulb registry needs from the physical devices.
///
/// [`crate::WizTransport`] talks to WiZ bulbs over UDP. Any error returned
/// from a command is treated by callers as "the bulb is unavailable".
pub trait Transport: Send + Sync {
    /// Find reachable bulbs on the local network.
    fn discover(&self) -> impl Future<Output = Result<Vec<DiscoveredBulb>>> + Send;

    /// Whether the bulb at `ip` is currently emitting light.
    fn power(&self, ip: Ipv4Addr) -> impl Future<Output = Result<bool>> + Send;

    fn set_power(&self, ip: Ipv4Addr, on: bool) -> impl Future<Output = Result<()>> + Send;

    /// Set colour and brightness together in one device call.
    fn set_light(
        &self,
        ip: Ipv4Addr,
        brightness: u8,
        mode: &ColorMode,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Start a visible effect so the user can tell which bulb is which.
    fn run_indicator(&self, ip: Ipv4Addr) -> impl Future<Output = Result<()>> + Send;

    fn stop_indicator(&self, ip: Ipv4Addr) -> impl Future<Output = Result<()>> + Send;
}
