use std::sync::Arc;

use anyhow::{Context, Result};

use mqtt_build_notifier::build::BuildContext;
use mqtt_build_notifier::config::Settings;
use mqtt_build_notifier::credentials::{
    ChainedCredentialLookup, EnvCredentialStore, StaticCredentialStore,
};
use mqtt_build_notifier::metrics::encode_metrics;
use mqtt_build_notifier::pipeline::{notify, WriterSink};
use mqtt_build_notifier::telemetry::init_telemetry;

/// Prefix for credentials supplied through the environment
const CREDENTIALS_ENV_PREFIX: &str = "MQTT_CREDENTIALS";

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration problems are the only errors that stop the step
    let settings = Settings::new().context("Failed to load configuration")?;
    let _telemetry = init_telemetry(&settings.otel)?;
    tracing::info!(broker = %settings.mqtt.broker_url, "Configuration loaded");

    let context = load_context(&settings)?;

    let credentials = Arc::new(
        ChainedCredentialLookup::new()
            .with(StaticCredentialStore::from_settings(&settings.credentials))
            .with(EnvCredentialStore::new(CREDENTIALS_ENV_PREFIX)),
    );
    let sink = WriterSink::stdout();

    let outcome = notify(&settings.mqtt, &context, &sink, credentials).await;
    tracing::info!(
        delivered = outcome.is_delivered(),
        "Notification step finished"
    );
    if let Ok(metrics) = encode_metrics() {
        tracing::debug!(%metrics, "Publish metrics");
    }

    Ok(())
}

fn load_context(settings: &Settings) -> Result<BuildContext> {
    let mut context = match &settings.context.path {
        Some(path) => BuildContext::from_json_file(path)
            .with_context(|| format!("Failed to load build context from {}", path.display()))?,
        None => context_from_env()?,
    };

    if settings.context.include_process_env {
        context.environment.insert(0, std::env::vars().collect());
    }

    tracing::debug!(
        job = %context.job_name,
        build = context.build_number,
        "Build context loaded"
    );
    Ok(context)
}

/// Minimal context from the variables a CI agent exports for each build.
fn context_from_env() -> Result<BuildContext> {
    let job_name = std::env::var("JOB_NAME")
        .context("No build context: set NOTIFIER__CONTEXT__PATH or JOB_NAME")?;
    let build_number = match std::env::var("BUILD_NUMBER") {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("BUILD_NUMBER is not a number: {}", raw))?,
        Err(_) => 0,
    };

    let mut context = BuildContext::new(job_name, build_number);
    if let Ok(result) = std::env::var("BUILD_RESULT") {
        context.result = result.parse().ok();
    }
    Ok(context)
}
