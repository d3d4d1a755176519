use serde::Deserialize;

use crate::broker::BrokerAddress;
use crate::error::{NotifierError, Result};

use super::Qos;

pub const DEFAULT_TOPIC: &str = "jenkins/$PROJECT_URL";
pub const DEFAULT_MESSAGE: &str = "$BUILD_RESULT";
pub const DEFAULT_CLIENT_ID: &str = "mqtt-build-notifier";

/// Per-notifier configuration, built once and reused for every build.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    /// Broker address: `tcp://host:port`, `ssl://host:port` or `host:port`
    pub broker_url: String,
    /// Topic template; empty means [`DEFAULT_TOPIC`]
    #[serde(default)]
    pub topic: String,
    /// Message template; empty means [`DEFAULT_MESSAGE`]
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub qos: Qos,
    #[serde(default)]
    pub retain: bool,
    /// Identifier handed to the credential lookup; empty means anonymous
    #[serde(default)]
    pub credentials_id: String,
    #[serde(default = "default_client_id")]
    pub client_id: String,
}

fn default_client_id() -> String {
    DEFAULT_CLIENT_ID.to_string()
}

impl NotificationConfig {
    pub fn new(broker_url: impl Into<String>) -> Self {
        Self {
            broker_url: broker_url.into(),
            topic: String::new(),
            message: String::new(),
            qos: Qos::default(),
            retain: false,
            credentials_id: String::new(),
            client_id: default_client_id(),
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_qos(mut self, qos: Qos) -> Self {
        self.qos = qos;
        self
    }

    pub fn with_retain(mut self, retain: bool) -> Self {
        self.retain = retain;
        self
    }

    pub fn with_credentials_id(mut self, id: impl Into<String>) -> Self {
        self.credentials_id = id.into();
        self
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    /// Topic template, falling back to the default when unset.
    pub fn topic(&self) -> &str {
        if self.topic.is_empty() {
            DEFAULT_TOPIC
        } else {
            &self.topic
        }
    }

    /// Message template, falling back to the default when unset.
    pub fn message(&self) -> &str {
        if self.message.is_empty() {
            DEFAULT_MESSAGE
        } else {
            &self.message
        }
    }

    pub fn credentials_id(&self) -> Option<&str> {
        let id = self.credentials_id.trim();
        (!id.is_empty()).then_some(id)
    }

    /// Configuration-time checks. Build-time publishing never calls this.
    pub fn validate(&self) -> Result<BrokerAddress> {
        if self.client_id.trim().is_empty() {
            return Err(NotifierError::Validation(
                "Client ID must not be empty".to_string(),
            ));
        }
        BrokerAddress::parse(&self.broker_url)
    }
}
