use std::net::SocketAddr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::net::UdpSocket;
use tracing::debug;

use super::{TimeError, TimeSource};

pub const DEFAULT_NTP_SERVER: &str = "pool.ntp.org";
pub const DEFAULT_NTP_TIMEOUT: Duration = Duration::from_secs(2);

const NTP_PORT: u16 = 123;
const NTP_PACKET_LEN: usize = 48;
/// Seconds between 1900-01-01 (NTP era 0) and 1970-01-01.
const NTP_UNIX_OFFSET: i64 = 2_208_988_800;
/// LI = 0, VN = 3, Mode = 3 (client)
const CLIENT_HEADER: u8 = 0x1B;
const MODE_SERVER: u8 = 4;

/// Minimal SNTP client. The reply is trusted as-is.
#[derive(Debug, Clone)]
pub struct NtpClient {
    server: String,
    timeout: Duration,
}

impl Default for NtpClient {
    fn default() -> Self {
        Self::new(DEFAULT_NTP_SERVER, DEFAULT_NTP_TIMEOUT)
    }
}

impl NtpClient {
    /// `server` is a host name or address, with or without a port (default 123).
    pub fn new(server: impl Into<String>, timeout: Duration) -> Self {
        Self {
            server: server.into(),
            timeout,
        }
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Ask the server for the current UTC time. The whole exchange, including
    /// name resolution, is bounded by the client timeout.
    pub async fn query(&self) -> Result<DateTime<Utc>, TimeError> {
        tokio::time::timeout(self.timeout, self.exchange())
            .await
            .map_err(|_| TimeError::Timeout(self.timeout))?
    }

    /// Try each resolved address in turn and keep the first good reply.
    async fn exchange(&self) -> Result<DateTime<Utc>, TimeError> {
        let mut last_error = TimeError::Unresolvable(self.server.clone());
        for addr in self.resolve().await? {
            match exchange_with(addr).await {
                Ok(instant) => return Ok(instant),
                Err(e) => {
                    debug!(server = %addr, error = %e, "network time exchange failed");
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }

    async fn resolve(&self) -> Result<Vec<SocketAddr>, TimeError> {
        if let Ok(addr) = self.server.parse::<SocketAddr>() {
            return Ok(vec![addr]);
        }

        let target = if self.server.contains(':') {
            self.server.clone()
        } else {
            format!("{}:{}", self.server, NTP_PORT)
        };

        let addrs: Vec<SocketAddr> = tokio::net::lookup_host(target)
            .await
            .map_err(|_| TimeError::Unresolvable(self.server.clone()))?
            .collect();
        if addrs.is_empty() {
            return Err(TimeError::Unresolvable(self.server.clone()));
        }
        Ok(prefer_ipv4(addrs))
    }
}

impl TimeSource for NtpClient {
    async fn now_utc(&self) -> Result<DateTime<Utc>, TimeError> {
        self.query().await
    }
}

async fn exchange_with(addr: SocketAddr) -> Result<DateTime<Utc>, TimeError> {
    let bind_addr = if addr.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };

    let socket = UdpSocket::bind(bind_addr).await?;
    socket.connect(addr).await?;
    socket.send(&request_packet()).await?;

    let mut buf = [0u8; NTP_PACKET_LEN];
    let len = socket.recv(&mut buf).await?;
    let instant = parse_reply(&buf[..len])?;

    debug!(server = %addr, %instant, "network time received");
    Ok(instant)
}

/// IPv4 first, keeping resolver order within each family.
fn prefer_ipv4(mut addrs: Vec<SocketAddr>) -> Vec<SocketAddr> {
    addrs.sort_by_key(|addr| addr.is_ipv6());
    addrs
}

/// A client request: header byte set, everything else zero.
pub fn request_packet() -> [u8; NTP_PACKET_LEN] {
    let mut packet = [0u8; NTP_PACKET_LEN];
    packet[0] = CLIENT_HEADER;
    packet
}

/// Extract the server transmit timestamp from a reply.
pub fn parse_reply(reply: &[u8]) -> Result<DateTime<Utc>, TimeError> {
    if reply.len() < NTP_PACKET_LEN {
        return Err(TimeError::MalformedReply(format!(
            "expected {} bytes, got {}",
            NTP_PACKET_LEN,
            reply.len()
        )));
    }

    let mode = reply[0] & 0x07;
    if mode != MODE_SERVER {
        return Err(TimeError::MalformedReply(format!(
            "unexpected mode {}",
            mode
        )));
    }

    let seconds = u32::from_be_bytes([reply[40], reply[41], reply[42], reply[43]]);
    let fraction = u32::from_be_bytes([reply[44], reply[45], reply[46], reply[47]]);
    if seconds == 0 && fraction == 0 {
        return Err(TimeError::MalformedReply(
            "empty transmit timestamp".to_string(),
        ));
    }

    // Values below the Unix offset belong to era 1 (after 2036-02-07)
    let mut ntp_seconds = i64::from(seconds);
    if ntp_seconds < NTP_UNIX_OFFSET {
        ntp_seconds += 1 << 32;
    }
    let nanos = ((u64::from(fraction) * 1_000_000_000) >> 32) as u32;

    DateTime::from_timestamp(ntp_seconds - NTP_UNIX_OFFSET, nanos).ok_or_else(|| {
        TimeError::MalformedReply(format!("timestamp {} out of range", seconds))
    })
}
