//! Broker connectivity.
//!
//! The publish pipeline only talks to the [`BrokerConnector`] and
//! [`BrokerSession`] traits; [`MqttConnector`] is the rumqttc-backed
//! implementation used in production. Tests substitute in-memory fakes.

mod address;
mod mqtt;

pub use address::BrokerAddress;
pub use mqtt::MqttConnector;

use async_trait::async_trait;

use crate::config::Qos;
use crate::credentials::Credentials;
use crate::error::Result;

/// Everything needed to open one broker connection.
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    pub address: BrokerAddress,
    pub client_id: String,
    pub credentials: Option<Credentials>,
}

/// A single message to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub topic: String,
    pub payload: Vec<u8>,
    pub qos: Qos,
    pub retain: bool,
}

/// Opens broker connections. One connection per call; never pooled.
#[async_trait]
pub trait BrokerConnector: Send + Sync {
    async fn connect(&self, options: ConnectOptions) -> Result<Box<dyn BrokerSession>>;
}

/// An established broker connection.
#[async_trait]
pub trait BrokerSession: Send {
    /// Publish one message and wait for the acknowledgement its QoS requires.
    async fn publish(&mut self, message: OutgoingMessage) -> Result<()>;

    /// Send DISCONNECT and release the connection.
    async fn disconnect(self: Box<Self>) -> Result<()>;
}
