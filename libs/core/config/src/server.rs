use crate::{ConfigError, FromEnv, env_parse};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

pub const DEFAULT_PORT: u16 = 8080;

/// Listen address of an HTTP API.
///
/// `HOST` must be an IP literal. A hostname such as `localhost` is rejected
/// while loading config rather than when the listener binds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
}

impl ServerConfig {
    /// Same host, different port. Port `0` lets the OS choose.
    pub fn with_port(self, port: u16) -> Self {
        Self {
            addr: SocketAddr::new(self.addr.ip(), port),
        }
    }
}

impl FromEnv for ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let host: IpAddr = env_parse("HOST", IpAddr::V4(Ipv4Addr::UNSPECIFIED))?;
        let port = env_parse("PORT", DEFAULT_PORT)?;

        Ok(Self {
            addr: SocketAddr::new(host, port),
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv6Addr;

    #[test]
    fn test_listens_on_all_interfaces_by_default() {
        temp_env::with_vars([("HOST", None::<&str>), ("PORT", None)], || {
            let config = ServerConfig::from_env().unwrap();
            assert_eq!(config, ServerConfig::default());
            assert_eq!(config.addr.to_string(), "0.0.0.0:8080");
        });
    }

    #[test]
    fn test_accepts_ipv6_host() {
        temp_env::with_vars([("HOST", Some("::1")), ("PORT", Some("3001"))], || {
            let config = ServerConfig::from_env().unwrap();
            assert_eq!(config.addr.ip(), IpAddr::V6(Ipv6Addr::LOCALHOST));
            assert_eq!(config.addr.port(), 3001);
        });
    }

    #[test]
    fn test_hostname_is_rejected_up_front() {
        temp_env::with_vars([("HOST", Some("localhost")), ("PORT", None)], || {
            let err = ServerConfig::from_env().unwrap_err();
            assert!(matches!(err, ConfigError::ParseError { ref key, .. } if key == "HOST"));
        });
    }

    #[test]
    fn test_port_outside_u16_is_rejected() {
        temp_env::with_vars([("HOST", None), ("PORT", Some("65536"))], || {
            let err = ServerConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("PORT"));
        });
    }

    #[test]
    fn test_with_port_keeps_host() {
        let config = ServerConfig::default().with_port(0);
        assert_eq!(config.addr.ip(), IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(config.addr.port(), 0);
    }
}
