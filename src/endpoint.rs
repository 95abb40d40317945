use std::{
    collections::HashSet,
    fmt, io,
    net::{IpAddr, SocketAddr},
    str::FromStr,
};

/// A hostname and port that still needs to be resolved before it can be connected to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SymbolicEndpoint {
    hostname: String,
    port: u16,
}

impl SymbolicEndpoint {
    pub fn new(hostname: impl Into<String>, port: u16) -> Self {
        Self {
            hostname: hostname.into(),
            port,
        }
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for SymbolicEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hostname.contains(':') {
            write!(f, "[{}]:{}", self.hostname, self.port)
        } else {
            write!(f, "{}:{}", self.hostname, self.port)
        }
    }
}

impl FromStr for SymbolicEndpoint {
    type Err = io::Error;

    /// Parses `host:port`, or `[v6-literal]:port` for IPv6 addresses.
    fn from_str(s: &str) -> io::Result<Self> {
        let invalid = |reason: &str| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid endpoint '{}': {}", s, reason),
            )
        };

        let (host, port) = s.rsplit_once(':').ok_or_else(|| invalid("missing port"))?;
        let host = match host.strip_prefix('[') {
            Some(rest) => rest
                .strip_suffix(']')
                .ok_or_else(|| invalid("unterminated '['"))?,
            None if host.contains(':') => return Err(invalid("IPv6 hosts must be bracketed")),
            None => host,
        };
        if host.is_empty() {
            return Err(invalid("missing hostname"));
        }
        let port = port.parse::<u16>().map_err(|_| invalid("bad port"))?;

        Ok(Self::new(host, port))
    }
}

/// A concrete address and port. Equality and hashing are by (address, port).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResolvedEndpoint {
    address: IpAddr,
    port: u16,
}

impl ResolvedEndpoint {
    pub fn new(address: IpAddr, port: u16) -> Self {
        Self { address, port }
    }

    pub fn address(&self) -> IpAddr {
        self.address
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for ResolvedEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        SocketAddr::from(*self).fmt(f)
    }
}

impl From<ResolvedEndpoint> for SocketAddr {
    fn from(endpoint: ResolvedEndpoint) -> Self {
        SocketAddr::new(endpoint.address, endpoint.port)
    }
}

impl From<SocketAddr> for ResolvedEndpoint {
    fn from(addr: SocketAddr) -> Self {
        Self::new(addr.ip(), addr.port())
    }
}

pub type ResolvedSet = HashSet<ResolvedEndpoint>;

/// Pair every address with `port`, collapsing duplicates.
pub fn aggregate(addresses: impl IntoIterator<Item = IpAddr>, port: u16) -> ResolvedSet {
    addresses
        .into_iter()
        .map(|address| ResolvedEndpoint::new(address, port))
        .collect()
}

/// Sorted, comma-separated rendering of a set for log messages.
pub(crate) fn display_set(set: &ResolvedSet) -> String {
    let mut endpoints = set.iter().collect::<Vec<_>>();
    endpoints.sort();
    let rendered = endpoints
        .iter()
        .map(|endpoint| endpoint.to_string())
        .collect::<Vec<_>>();
    format!("[{}]", rendered.join(", "))
}
