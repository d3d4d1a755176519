// Core
pub mod build;
pub mod variables;

// Publishing
pub mod broker;
pub mod credentials;
pub mod pipeline;

// Supporting modules
pub mod config;
pub mod error;
pub mod metrics;
pub mod telemetry;

pub use error::{NotifierError, Result};
pub use pipeline::{notify, PublishOutcome};
