mod notification;
mod qos;
mod settings;

pub use notification::{NotificationConfig, DEFAULT_CLIENT_ID, DEFAULT_MESSAGE, DEFAULT_TOPIC};
pub use qos::Qos;
pub use settings::{ContextConfig, CredentialEntry, OtelConfig, Settings};
