use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifierError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid broker address: {0}")]
    InvalidAddress(String),

    #[error("Invalid QoS value {0}: must be 0, 1 or 2")]
    InvalidQos(u8),

    #[error("MQTT connection failed")]
    Connection(#[from] rumqttc::ConnectionError),

    #[error("MQTT client request failed")]
    Client(#[from] rumqttc::ClientError),

    #[error("Broker closed the connection while {0}")]
    ConnectionClosed(&'static str),

    #[error("Failed to read build context: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse build context: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Telemetry error: {0}")]
    Telemetry(String),
}

impl NotifierError {
    /// Whether the error belongs to the configuration-time taxonomy, as
    /// opposed to a connection or publish failure at build time.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            NotifierError::Config(_)
                | NotifierError::Validation(_)
                | NotifierError::InvalidAddress(_)
                | NotifierError::InvalidQos(_)
        )
    }

    /// Whether the broker refused the CONNECT because of the supplied login.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(
            self,
            NotifierError::Connection(rumqttc::ConnectionError::ConnectionRefused(
                rumqttc::ConnectReturnCode::BadUserNamePassword
                    | rumqttc::ConnectReturnCode::NotAuthorized
            ))
        )
    }

    /// Error message followed by the sources in the chain, outermost first.
    /// A source whose text the previous line already shows is skipped.
    pub fn chain(&self) -> Vec<String> {
        let mut lines = vec![self.to_string()];
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            let text = err.to_string();
            if lines.last().is_some_and(|last| !last.contains(&text)) {
                lines.push(text);
            }
            source = err.source();
        }
        lines
    }
}

pub type Result<T> = std::result::Result<T, NotifierError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_taxonomy() {
        assert!(NotifierError::InvalidQos(3).is_configuration());
        assert!(NotifierError::Validation("empty".into()).is_configuration());
        assert!(!NotifierError::ConnectionClosed("publishing").is_configuration());
    }

    #[test]
    fn test_auth_rejection() {
        let refused = NotifierError::Connection(rumqttc::ConnectionError::ConnectionRefused(
            rumqttc::ConnectReturnCode::NotAuthorized,
        ));
        assert!(refused.is_auth_rejection());

        let unavailable = NotifierError::Connection(rumqttc::ConnectionError::ConnectionRefused(
            rumqttc::ConnectReturnCode::ServiceUnavailable,
        ));
        assert!(!unavailable.is_auth_rejection());
    }

    #[test]
    fn test_chain_includes_sources() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = NotifierError::Connection(rumqttc::ConnectionError::Io(io));
        let chain = err.chain();
        assert_eq!(chain, vec!["MQTT connection failed", "I/O: refused"]);
    }

    #[test]
    fn test_chain_skips_repeated_causes() {
        let err = NotifierError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "context.json missing",
        ));
        assert_eq!(
            err.chain(),
            vec!["Failed to read build context: context.json missing"]
        );
    }
}
