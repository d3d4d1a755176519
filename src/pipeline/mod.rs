//! Build notification publishing.
//!
//! `notify` is the single entry point for the host: it takes the notifier
//! configuration, a build snapshot and the build's log sink, and always
//! returns. Broker and credential failures end up in the sink, never in the
//! caller's control flow.

mod publisher;
mod sink;

use std::sync::Arc;

pub use publisher::{PipelineStage, PublishOutcome, PublishPipeline};
pub use sink::{BufferSink, LogSink, WriterSink};

use crate::build::BuildContext;
use crate::config::NotificationConfig;
use crate::credentials::CredentialLookup;

/// Publish one notification for a finished build over MQTT.
pub async fn notify(
    config: &NotificationConfig,
    context: &BuildContext,
    sink: &dyn LogSink,
    credentials: Arc<dyn CredentialLookup>,
) -> PublishOutcome {
    PublishPipeline::mqtt(credentials)
        .publish(config, context, sink)
        .await
}
