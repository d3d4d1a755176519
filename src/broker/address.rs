use std::fmt;

use url::Url;

use crate::error::{NotifierError, Result};

const DEFAULT_PORT: u16 = 1883;
const DEFAULT_TLS_PORT: u16 = 8883;

/// Parsed broker location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerAddress {
    pub host: String,
    pub port: u16,
    pub tls: bool,
}

impl BrokerAddress {
    /// Parse `tcp://`, `mqtt://`, `ssl://`, `mqtts://` URLs or a bare `host[:port]`.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(NotifierError::InvalidAddress(
                "Broker URL must not be empty".to_string(),
            ));
        }

        let url = if raw.contains("://") {
            Url::parse(raw)
        } else {
            Url::parse(&format!("tcp://{raw}"))
        }
        .map_err(|e| NotifierError::InvalidAddress(format!("{raw}: {e}")))?;

        let tls = match url.scheme() {
            "tcp" | "mqtt" => false,
            "ssl" | "tls" | "mqtts" => true,
            other => {
                return Err(NotifierError::InvalidAddress(format!(
                    "{raw}: unsupported scheme '{other}'"
                )))
            }
        };

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| NotifierError::InvalidAddress(format!("{raw}: missing host")))?
            .trim_start_matches('[')
            .trim_end_matches(']')
            .to_string();

        let port = url
            .port()
            .unwrap_or(if tls { DEFAULT_TLS_PORT } else { DEFAULT_PORT });

        Ok(Self { host, port, tls })
    }
}

impl fmt::Display for BrokerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scheme = if self.tls { "ssl" } else { "tcp" };
        write!(f, "{}://{}:{}", scheme, self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tcp_url() {
        let addr = BrokerAddress::parse("tcp://broker.local:1884").unwrap();
        assert_eq!(addr.host, "broker.local");
        assert_eq!(addr.port, 1884);
        assert!(!addr.tls);
    }

    #[test]
    fn test_parse_bare_host_uses_default_port() {
        let addr = BrokerAddress::parse("localhost").unwrap();
        assert_eq!(addr.host, "localhost");
        assert_eq!(addr.port, 1883);

        let addr = BrokerAddress::parse("10.0.0.5:2883").unwrap();
        assert_eq!(addr.host, "10.0.0.5");
        assert_eq!(addr.port, 2883);
    }

    #[test]
    fn test_parse_tls_schemes() {
        let addr = BrokerAddress::parse("ssl://broker.local").unwrap();
        assert!(addr.tls);
        assert_eq!(addr.port, 8883);

        let addr = BrokerAddress::parse("mqtts://broker.local:9999").unwrap();
        assert!(addr.tls);
        assert_eq!(addr.port, 9999);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(BrokerAddress::parse("").is_err());
        assert!(BrokerAddress::parse("http://broker.local").is_err());
        assert!(BrokerAddress::parse("tcp://").is_err());
    }

    #[test]
    fn test_display() {
        let addr = BrokerAddress::parse("mqtt://broker.local").unwrap();
        assert_eq!(addr.to_string(), "tcp://broker.local:1883");
    }
}
