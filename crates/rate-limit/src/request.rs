//! Client identity used as the rate limit key.

use std::fmt;
use std::net::IpAddr;

/// The rate limiter's notion of a client, derived from the network origin of a request.
///
/// There is no authentication behind it: forwarded headers can be spoofed, and clients
/// sharing a NAT share a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientIdentity {
    /// The client's IP address.
    Ip(IpAddr),
    /// Origin could not be determined. All such requests share one bucket.
    Unknown,
}

impl ClientIdentity {
    /// The storage key for this identity.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl From<IpAddr> for ClientIdentity {
    fn from(ip: IpAddr) -> Self {
        Self::Ip(ip)
    }
}

impl fmt::Display for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ip(ip) => write!(f, "ip:{ip}"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}
