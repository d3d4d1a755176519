use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::Result;

use super::NotificationConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub mqtt: NotificationConfig,
    /// Credentials served by the static store, keyed by credentials id
    #[serde(default)]
    pub credentials: HashMap<String, CredentialEntry>,
    #[serde(default)]
    pub context: ContextConfig,
    #[serde(default)]
    pub otel: OtelConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CredentialEntry {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContextConfig {
    /// JSON file holding the build context snapshot
    pub path: Option<PathBuf>,
    /// Prepend the process environment as the lowest environment scope
    #[serde(default = "default_include_process_env")]
    pub include_process_env: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OtelConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_otel_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    /// Trace sampling ratio (0.0-1.0)
    #[serde(default = "default_sampling_ratio")]
    pub sampling_ratio: f64,
}

fn default_include_process_env() -> bool {
    true
}

fn default_otel_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_service_name() -> String {
    "mqtt-build-notifier".to_string()
}

fn default_sampling_ratio() -> f64 {
    1.0
}

impl Settings {
    /// Load settings from `config/` and `NOTIFIER__*` environment variables.
    pub fn new() -> Result<Self> {
        Self::load(Path::new("config"))
    }

    pub fn load(config_dir: &Path) -> Result<Self> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        let default_file = config_dir.join("default");
        let mode_file = config_dir.join(&run_mode);

        let builder = Config::builder()
            .set_default("mqtt.topic", "")?
            .set_default("mqtt.message", "")?
            .set_default("mqtt.qos", 0)?
            .set_default("mqtt.retain", false)?
            .set_default("context.include_process_env", true)?
            .add_source(File::with_name(&default_file.to_string_lossy()).required(false))
            .add_source(File::with_name(&mode_file.to_string_lossy()).required(false))
            // NOTIFIER__MQTT__BROKER_URL, NOTIFIER__MQTT__QOS, ...
            .add_source(
                Environment::with_prefix("NOTIFIER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.mqtt.validate()?;
        Ok(settings)
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            path: None,
            include_process_env: default_include_process_env(),
        }
    }
}

impl Default for OtelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_otel_endpoint(),
            service_name: default_service_name(),
            sampling_ratio: default_sampling_ratio(),
        }
    }
}
