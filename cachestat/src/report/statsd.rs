//! DogStatsD gauge forwarding
//!
//! Sends `<metric>:<ratio>|g` datagrams to a local collector. UDP is
//! fire-and-forget: a collector that is down must not stop sampling, so send
//! failures are logged and dropped.

use log::warn;
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs, UdpSocket};

use super::Reporter;
use crate::domain::{ReportError, Sample};

pub const DEFAULT_STATSD_HOST: &str = "127.0.0.1";
pub const DEFAULT_STATSD_PORT: u16 = 8125;
pub const DEFAULT_METRIC_NAME: &str = "pagecache.hit_ratio";

pub struct StatsdReporter {
    socket: UdpSocket,
    metric: String,
}

impl StatsdReporter {
    /// Bind an ephemeral local socket and connect it to the collector
    ///
    /// # Errors
    /// Returns an error if the address does not resolve or the socket cannot be set up
    pub fn connect(addr: impl ToSocketAddrs, metric: impl Into<String>) -> io::Result<Self> {
        let addr = addr.to_socket_addrs()?.next().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "statsd address did not resolve")
        })?;
        let local: SocketAddr = if addr.is_ipv6() {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(local)?;
        socket.connect(addr)?;
        Ok(Self { socket, metric: metric.into() })
    }
}

/// Gauge line for one sample
#[must_use]
pub fn gauge_line(metric: &str, value: f64) -> String {
    format!("{metric}:{value}|g")
}

impl Reporter for StatsdReporter {
    fn report(&mut self, sample: &Sample) -> Result<(), ReportError> {
        let line = gauge_line(&self.metric, sample.hit_ratio);
        if let Err(e) = self.socket.send(line.as_bytes()) {
            warn!("Failed to send {} to statsd: {e}", self.metric);
        }
        Ok(())
    }
}
