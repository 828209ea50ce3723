//! Network reachability probes.

use crate::screen::ports::{Reachability, ReachabilityProbe};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Online when a TCP connection to `host:port` succeeds.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    target: String,
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            timeout: CONNECT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl ReachabilityProbe for TcpProbe {
    fn status(&self) -> Reachability {
        let addrs = match self.target.to_socket_addrs() {
            Ok(addrs) => addrs,
            Err(e) => {
                tracing::info!(target = %self.target, error = %e, "Reachability lookup failed");
                return Reachability::Offline;
            }
        };
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.timeout) {
                Ok(_) => return Reachability::Online,
                Err(e) => tracing::debug!(%addr, error = %e, "Reachability connect failed"),
            }
        }
        Reachability::Offline
    }
}

/// Always reports the same status. Used for `--offline`.
#[derive(Debug, Clone, Copy)]
pub struct FixedProbe(pub Reachability);

impl ReachabilityProbe for FixedProbe {
    fn status(&self) -> Reachability {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn test_tcp_probe_online_with_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let probe = TcpProbe::new(addr.to_string());
        assert_eq!(probe.status(), Reachability::Online);
    }

    #[test]
    fn test_tcp_probe_offline_for_bad_target() {
        let probe = TcpProbe::new("not a host").with_timeout(Duration::from_millis(50));
        assert_eq!(probe.status(), Reachability::Offline);
    }

    #[test]
    fn test_fixed_probe() {
        assert_eq!(FixedProbe(Reachability::Offline).status(), Reachability::Offline);
    }
}
