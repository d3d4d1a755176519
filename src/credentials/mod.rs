//! Credential resolution for broker connections.
//!
//! Credentials are looked up by id on every publish and never cached, so a
//! rotated or revoked secret takes effect on the next build. A miss is not an
//! error: the caller decides what to do without credentials.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;

use crate::config::CredentialEntry;

/// Username/secret pair for an authenticated broker connection.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Resolves a credentials id to a username/secret pair.
#[async_trait]
pub trait CredentialLookup: Send + Sync {
    /// `None` when the id is unknown or revoked.
    async fn lookup(&self, id: &str) -> Option<Credentials>;
}

/// Credentials held in memory, typically loaded from the `credentials`
/// settings table. Ids are case-insensitive: the settings loader lowercases
/// table keys but leaves `mqtt.credentials_id` as written.
#[derive(Debug, Default)]
pub struct StaticCredentialStore {
    entries: HashMap<String, Credentials>,
}

impl StaticCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settings(entries: &HashMap<String, CredentialEntry>) -> Self {
        let entries = entries
            .iter()
            .map(|(id, entry)| {
                (
                    normalize_id(id),
                    Credentials::new(entry.username.clone(), entry.password.clone()),
                )
            })
            .collect();
        Self { entries }
    }

    pub fn insert(&mut self, id: impl Into<String>, credentials: Credentials) {
        self.entries.insert(normalize_id(&id.into()), credentials);
    }

    pub fn remove(&mut self, id: &str) -> Option<Credentials> {
        self.entries.remove(&normalize_id(id))
    }
}

fn normalize_id(id: &str) -> String {
    id.trim().to_lowercase()
}

#[async_trait]
impl CredentialLookup for StaticCredentialStore {
    async fn lookup(&self, id: &str) -> Option<Credentials> {
        self.entries.get(&normalize_id(id)).cloned()
    }
}

/// Reads `{PREFIX}_{ID}_USERNAME` and `{PREFIX}_{ID}_PASSWORD` from the
/// process environment at lookup time. The id is upper-cased and every
/// character outside `[A-Z0-9]` becomes `_`.
#[derive(Debug, Clone)]
pub struct EnvCredentialStore {
    prefix: String,
}

impl EnvCredentialStore {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn var_name(&self, id: &str, suffix: &str) -> String {
        let id: String = id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        format!("{}_{}_{}", self.prefix, id, suffix)
    }
}

#[async_trait]
impl CredentialLookup for EnvCredentialStore {
    async fn lookup(&self, id: &str) -> Option<Credentials> {
        let username = std::env::var(self.var_name(id, "USERNAME")).ok()?;
        let secret = std::env::var(self.var_name(id, "PASSWORD")).unwrap_or_default();
        Some(Credentials::new(username, secret))
    }
}

/// Consults each store in order and returns the first hit.
#[derive(Default)]
pub struct ChainedCredentialLookup {
    stores: Vec<Box<dyn CredentialLookup>>,
}

impl ChainedCredentialLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, store: impl CredentialLookup + 'static) -> Self {
        self.stores.push(Box::new(store));
        self
    }
}

#[async_trait]
impl CredentialLookup for ChainedCredentialLookup {
    async fn lookup(&self, id: &str) -> Option<Credentials> {
        for store in &self.stores {
            if let Some(credentials) = store.lookup(id).await {
                return Some(credentials);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secret() {
        let credentials = Credentials::new("bot", "hunter2");
        let rendered = format!("{:?}", credentials);
        assert!(rendered.contains("bot"));
        assert!(!rendered.contains("hunter2"));
    }

    #[tokio::test]
    async fn test_static_store_hit_and_miss() {
        let mut store = StaticCredentialStore::new();
        store.insert("mqtt-bot", Credentials::new("bot", "secret"));

        assert_eq!(
            store.lookup("mqtt-bot").await,
            Some(Credentials::new("bot", "secret"))
        );
        assert_eq!(store.lookup("unknown").await, None);
    }

    #[tokio::test]
    async fn test_static_store_revocation_visible_immediately() {
        let mut store = StaticCredentialStore::new();
        store.insert("mqtt-bot", Credentials::new("bot", "secret"));
        store.remove("mqtt-bot");
        assert_eq!(store.lookup("mqtt-bot").await, None);
    }

    #[tokio::test]
    async fn test_static_store_ids_ignore_case() {
        let mut store = StaticCredentialStore::new();
        store.insert("CI-Bot", Credentials::new("bot", "secret"));

        assert!(store.lookup("ci-bot").await.is_some());
        assert!(store.lookup("CI-BOT").await.is_some());
        assert!(store.remove("Ci-Bot").is_some());
        assert_eq!(store.lookup("CI-Bot").await, None);
    }

    #[test]
    fn test_env_var_names() {
        let store = EnvCredentialStore::new("MQTT_CREDENTIALS");
        assert_eq!(
            store.var_name("ci-bot.prod", "USERNAME"),
            "MQTT_CREDENTIALS_CI_BOT_PROD_USERNAME"
        );
    }

    #[tokio::test]
    async fn test_env_store_reads_at_lookup_time() {
        let store = EnvCredentialStore::new("NOTIFIER_TEST_CREDS");
        assert_eq!(store.lookup("rotating").await, None);

        std::env::set_var("NOTIFIER_TEST_CREDS_ROTATING_USERNAME", "bot");
        std::env::set_var("NOTIFIER_TEST_CREDS_ROTATING_PASSWORD", "first");
        assert_eq!(
            store.lookup("rotating").await,
            Some(Credentials::new("bot", "first"))
        );

        std::env::set_var("NOTIFIER_TEST_CREDS_ROTATING_PASSWORD", "second");
        assert_eq!(
            store.lookup("rotating").await.map(|c| c.secret),
            Some("second".to_string())
        );
    }

    #[tokio::test]
    async fn test_chained_lookup_prefers_first_hit() {
        let mut first = StaticCredentialStore::new();
        first.insert("shared", Credentials::new("first", "a"));
        let mut second = StaticCredentialStore::new();
        second.insert("shared", Credentials::new("second", "b"));
        second.insert("only-second", Credentials::new("second", "c"));

        let chain = ChainedCredentialLookup::new().with(first).with(second);
        assert_eq!(chain.lookup("shared").await.unwrap().username, "first");
        assert_eq!(chain.lookup("only-second").await.unwrap().username, "second");
        assert!(chain.lookup("missing").await.is_none());
    }
}
