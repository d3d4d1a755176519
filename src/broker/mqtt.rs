use std::time::Duration;

use async_trait::async_trait;
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Outgoing, Packet, Transport};

use crate::config::Qos;
use crate::error::{NotifierError, Result};

use super::{BrokerConnector, BrokerSession, ConnectOptions, OutgoingMessage};

/// Capacity of the client request channel. Each session issues at most a
/// publish and a disconnect before the event loop drains them.
const REQUEST_CAPACITY: usize = 10;

const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(30);

/// rumqttc-backed connector.
#[derive(Debug, Clone)]
pub struct MqttConnector {
    keep_alive: Duration,
}

impl MqttConnector {
    pub fn new() -> Self {
        Self {
            keep_alive: DEFAULT_KEEP_ALIVE,
        }
    }

    pub fn with_keep_alive(keep_alive: Duration) -> Self {
        Self { keep_alive }
    }

    fn mqtt_options(&self, options: ConnectOptions) -> MqttOptions {
        let mut mqtt_options = MqttOptions::new(
            options.client_id,
            options.address.host.clone(),
            options.address.port,
        );
        mqtt_options.set_keep_alive(self.keep_alive);
        mqtt_options.set_clean_session(true);

        if let Some(credentials) = options.credentials {
            mqtt_options.set_credentials(credentials.username, credentials.secret);
        }

        if options.address.tls {
            mqtt_options.set_transport(Transport::tls_with_default_config());
        }

        mqtt_options
    }
}

impl Default for MqttConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BrokerConnector for MqttConnector {
    async fn connect(&self, options: ConnectOptions) -> Result<Box<dyn BrokerSession>> {
        let address = options.address.to_string();
        let (client, mut eventloop) =
            AsyncClient::new(self.mqtt_options(options), REQUEST_CAPACITY);

        // rumqttc surfaces a refused CONNACK as an error from poll()
        loop {
            match eventloop.poll().await? {
                Event::Incoming(Packet::ConnAck(ack)) => {
                    tracing::debug!(
                        broker = %address,
                        session_present = ack.session_present,
                        "MQTT connected"
                    );
                    break;
                }
                event => tracing::trace!(?event, "MQTT event while connecting"),
            }
        }

        Ok(Box::new(MqttSession {
            client,
            eventloop,
            broken: false,
        }))
    }
}

struct MqttSession {
    client: AsyncClient,
    eventloop: EventLoop,
    /// Set once the event loop has lost its connection. Polling again would
    /// make rumqttc reconnect and replay the pending publish.
    broken: bool,
}

impl MqttSession {
    fn is_complete(qos: Qos, event: &Event) -> bool {
        matches!(
            (qos, event),
            (Qos::AtMostOnce, Event::Outgoing(Outgoing::Publish(_)))
                | (Qos::AtLeastOnce, Event::Incoming(Packet::PubAck(_)))
                | (Qos::ExactlyOnce, Event::Incoming(Packet::PubComp(_)))
        )
    }
}

#[async_trait]
impl BrokerSession for MqttSession {
    async fn publish(&mut self, message: OutgoingMessage) -> Result<()> {
        let qos = message.qos;
        self.client
            .publish(message.topic, qos.into(), message.retain, message.payload)
            .await?;

        loop {
            let event = match self.eventloop.poll().await {
                Ok(event) => event,
                Err(e) => {
                    self.broken = true;
                    return Err(e.into());
                }
            };
            if Self::is_complete(qos, &event) {
                return Ok(());
            }
            if matches!(event, Event::Incoming(Packet::Disconnect)) {
                self.broken = true;
                return Err(NotifierError::ConnectionClosed("publishing"));
            }
            tracing::trace!(?event, "MQTT event while publishing");
        }
    }

    async fn disconnect(self: Box<Self>) -> Result<()> {
        let MqttSession {
            client,
            mut eventloop,
            broken,
        } = *self;
        if broken {
            tracing::debug!("MQTT connection already lost, skipping DISCONNECT");
            return Ok(());
        }
        client.disconnect().await?;

        loop {
            match eventloop.poll().await? {
                Event::Outgoing(Outgoing::Disconnect) => return Ok(()),
                // A fresh CONNACK means rumqttc reconnected behind our back
                Event::Incoming(Packet::ConnAck(_)) => {
                    return Err(NotifierError::ConnectionClosed("disconnecting"));
                }
                event => tracing::trace!(?event, "MQTT event while disconnecting"),
            }
        }
    }
}
