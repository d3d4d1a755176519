use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tracing::Instrument;

use crate::broker::{
    BrokerAddress, BrokerConnector, BrokerSession, ConnectOptions, MqttConnector, OutgoingMessage,
};
use crate::build::BuildContext;
use crate::config::{NotificationConfig, DEFAULT_CLIENT_ID};
use crate::credentials::{CredentialLookup, Credentials};
use crate::error::{NotifierError, Result};
use crate::metrics::PublishMetrics;
use crate::variables::VariableResolver;

use super::LogSink;

/// Stages of one publish attempt, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    ResolvingVariables,
    Connecting,
    Authenticating,
    Publishing,
    Disconnecting,
}

impl PipelineStage {
    pub fn as_str(self) -> &'static str {
        match self {
            PipelineStage::ResolvingVariables => "resolving_variables",
            PipelineStage::Connecting => "connecting",
            PipelineStage::Authenticating => "authenticating",
            PipelineStage::Publishing => "publishing",
            PipelineStage::Disconnecting => "disconnecting",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a publish attempt. Never an error for the caller: a failure is
/// already logged by the time it is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Delivered { topic: String },
    Failed { stage: PipelineStage, reason: String },
}

impl PublishOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, PublishOutcome::Delivered { .. })
    }
}

/// Expands the templates, then connects, publishes one message and
/// disconnects.
///
/// Every invocation opens its own connection. Once connected, DISCONNECT is
/// attempted whether or not the publish succeeded, and dropping the session
/// closes the socket if the invocation is abandoned midway.
pub struct PublishPipeline {
    connector: Arc<dyn BrokerConnector>,
    credentials: Arc<dyn CredentialLookup>,
}

impl PublishPipeline {
    pub fn new(
        connector: Arc<dyn BrokerConnector>,
        credentials: Arc<dyn CredentialLookup>,
    ) -> Self {
        Self {
            connector,
            credentials,
        }
    }

    /// Pipeline backed by the rumqttc connector.
    pub fn mqtt(credentials: Arc<dyn CredentialLookup>) -> Self {
        Self::new(Arc::new(MqttConnector::new()), credentials)
    }

    /// Publish the build notification described by `config` for `context`.
    ///
    /// Failures are written to `sink` and to the process log; the returned
    /// outcome is informational only.
    pub async fn publish(
        &self,
        config: &NotificationConfig,
        context: &BuildContext,
        sink: &dyn LogSink,
    ) -> PublishOutcome {
        let span = tracing::info_span!(
            "mqtt_publish",
            broker = %config.broker_url,
            job = %context.job_name,
            build = context.build_number,
            qos = %config.qos,
            topic = tracing::field::Empty,
        );

        async move {
            tracing::debug!(stage = %PipelineStage::ResolvingVariables, "Expanding templates");
            let resolver = VariableResolver::new(context);
            let topic = resolver.resolve(config.topic());
            let message = resolver.resolve(config.message());
            tracing::Span::current().record("topic", topic.as_str());

            let outgoing = OutgoingMessage {
                topic,
                payload: message.into_bytes(),
                qos: config.qos,
                retain: config.retain,
            };

            match self.send(config, outgoing, sink).await {
                Ok(topic) => PublishOutcome::Delivered { topic },
                Err((stage, err)) => self.fail(stage, &err, sink),
            }
        }
        .instrument(span)
        .await
    }

    async fn send(
        &self,
        config: &NotificationConfig,
        message: OutgoingMessage,
        sink: &dyn LogSink,
    ) -> std::result::Result<String, (PipelineStage, NotifierError)> {
        let address = BrokerAddress::parse(&config.broker_url)
            .map_err(|e| (PipelineStage::Connecting, e))?;
        let credentials = self.resolve_credentials(config.credentials_id()).await;
        let authenticated = credentials.is_some();

        let started = Instant::now();
        let session = self
            .connector
            .connect(ConnectOptions {
                address,
                client_id: config.client_id.clone(),
                credentials,
            })
            .await
            .map_err(|e| {
                let stage = if authenticated && e.is_auth_rejection() {
                    PipelineStage::Authenticating
                } else {
                    PipelineStage::Connecting
                };
                (stage, e)
            })?;

        let topic = message.topic.clone();
        let (published, disconnected) = Self::publish_then_disconnect(session, message).await;
        published.map_err(|e| (PipelineStage::Publishing, e))?;

        // The message is already with the broker; a failed DISCONNECT only
        // leaks the connection until the broker notices.
        if let Err(e) = disconnected {
            let stage = PipelineStage::Disconnecting;
            tracing::warn!(stage = %stage, error = %e, "MQTT disconnect failed after publish");
            sink.println(&format!("WARNING: MQTT notification failed while {}: {}", stage, e));
        }

        PublishMetrics::record_delivered(started.elapsed());
        tracing::info!(topic = %topic, "MQTT notification published");
        Ok(topic)
    }

    /// Publish on `session` and always disconnect it afterwards.
    async fn publish_then_disconnect(
        mut session: Box<dyn BrokerSession>,
        message: OutgoingMessage,
    ) -> (Result<()>, Result<()>) {
        let published = session.publish(message).await;
        let disconnected = session.disconnect().await;
        (published, disconnected)
    }

    /// Look up credentials for `id`. A miss falls back to an anonymous
    /// connection.
    async fn resolve_credentials(&self, id: Option<&str>) -> Option<Credentials> {
        let id = id?;
        let credentials = self.credentials.lookup(id).await;
        PublishMetrics::record_credential_lookup(credentials.is_some());
        if credentials.is_none() {
            tracing::warn!(
                credentials_id = %id,
                "Credentials not found, connecting anonymously"
            );
        }
        credentials
    }

    fn fail(
        &self,
        stage: PipelineStage,
        err: &NotifierError,
        sink: &dyn LogSink,
    ) -> PublishOutcome {
        let chain = err.chain();
        sink.println(&format!(
            "ERROR: MQTT notification failed while {}: {}",
            stage, chain[0]
        ));
        for cause in &chain[1..] {
            sink.println(&format!("    caused by: {}", cause));
        }

        let reason = chain.join(": ");
        tracing::error!(stage = %stage, error = %reason, "MQTT notification failed");
        PublishMetrics::record_failed(stage.as_str());

        PublishOutcome::Failed { stage, reason }
    }

    /// Connect and immediately disconnect, reporting any error. Used when
    /// validating a configuration, so unlike [`publish`](Self::publish) it
    /// returns errors to the caller.
    pub async fn test_connection(&self, broker_url: &str, credentials_id: &str) -> Result<()> {
        if broker_url.trim().is_empty() {
            return Err(NotifierError::Validation(
                "Broker URL must not be empty".to_string(),
            ));
        }
        let address = BrokerAddress::parse(broker_url)?;
        let id = credentials_id.trim();
        let credentials = if id.is_empty() {
            None
        } else {
            self.resolve_credentials(Some(id)).await
        };

        let session = self
            .connector
            .connect(ConnectOptions {
                address,
                client_id: DEFAULT_CLIENT_ID.to_string(),
                credentials,
            })
            .await?;
        session.disconnect().await
    }
}
