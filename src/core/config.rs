//! Bot configuration
//!
//! Loaded once by the entry point from an optional TOML file overlaid with
//! `MANGI_*` environment variables, then resolved into a [`FeatureSet`] that
//! the pipeline is built from. Nothing here is a global: the resolved values
//! are passed into the builder explicitly.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::Path;

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};

use crate::core::error::AppResult;
use crate::core::types::UserId;

/// Prefix for environment overrides, e.g. `MANGI_USE_AUTH=fully`
pub const ENV_PREFIX: &str = "MANGI_";

/// Default config file looked up by the binary
pub const DEFAULT_CONFIG_PATH: &str = "mangibot.toml";

/// How token authentication applies to handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, strum::Display, strum::EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AuthMode {
    /// Every private update passes the token gate before dispatch
    Fully,
    /// Only handlers registered as auth-required pass the token gate
    Partial,
    /// No token gate
    #[default]
    None,
}

/// How updates reach the bot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    #[default]
    Polling,
    Webhook,
}

/// Raw configuration surface
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    #[serde(default)]
    pub bot_token: Option<String>,
    #[serde(default = "default_redis_url")]
    pub redis_url: String,
    #[serde(default)]
    pub delivery: DeliveryMode,
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default = "default_webhook_listen")]
    pub webhook_listen: SocketAddr,
    #[serde(default)]
    pub use_auth: AuthMode,
    #[serde(default)]
    pub token_secret: Option<String>,
    #[serde(default)]
    pub admin_approval: bool,
    #[serde(default, deserialize_with = "deserialize_admin_ids")]
    pub admin_user_ids: Vec<u64>,
    #[serde(default)]
    pub dev_mode: bool,
    #[serde(default)]
    pub bot_username: Option<String>,
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_webhook_listen() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            redis_url: default_redis_url(),
            delivery: DeliveryMode::default(),
            webhook_url: None,
            webhook_listen: default_webhook_listen(),
            use_auth: AuthMode::default(),
            token_secret: None,
            admin_approval: false,
            admin_user_ids: Vec::new(),
            dev_mode: false,
            bot_username: None,
        }
    }
}

/// Splits a loose id list such as `"1, 2 3"`; invalid parts are dropped
fn parse_admin_ids(raw: &str) -> Vec<u64> {
    raw.split([',', ' ', '\n', '\t'])
        .filter_map(|part| part.trim().parse::<u64>().ok())
        .collect()
}

fn deserialize_admin_ids<'de, D>(deserializer: D) -> Result<Vec<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawIds {
        List(Vec<u64>),
        Single(u64),
        Text(String),
    }

    Ok(match RawIds::deserialize(deserializer)? {
        RawIds::List(ids) => ids,
        RawIds::Single(id) => vec![id],
        RawIds::Text(raw) => parse_admin_ids(&raw),
    })
}

impl BotConfig {
    /// Loads `path` (if it exists) and overlays `MANGI_*` environment variables.
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let config = Self::figment(path.as_ref()).extract()?;
        Ok(config)
    }

    fn figment(path: &Path) -> Figment {
        Figment::new().merge(Toml::file(path)).merge(Env::prefixed(ENV_PREFIX))
    }

    /// Resolves the effective feature set.
    ///
    /// Misconfigured features are logged and disabled rather than failing, so
    /// the rest of the bot keeps working.
    pub fn features(&self) -> FeatureSet {
        let features = FeatureSet::default()
            .with_token_auth(self.use_auth, self.token_secret.clone().unwrap_or_default())
            .with_dev_mode(self.dev_mode);
        if self.admin_approval {
            features.with_admin_approval(self.admin_user_ids.iter().copied())
        } else {
            FeatureSet {
                admin_ids: self.admin_user_ids.iter().copied().map(UserId).collect(),
                ..features
            }
        }
    }
}

/// Validated features the pipeline is assembled from
#[derive(Debug, Clone, Default)]
pub struct FeatureSet {
    pub auth_mode: AuthMode,
    pub token_secret: Option<SecretString>,
    pub admin_approval: bool,
    pub admin_ids: HashSet<UserId>,
    pub dev_mode: bool,
}

impl FeatureSet {
    /// Token auth with the given mode and secret.
    ///
    /// A blank secret is refused with a logged error and leaves auth off.
    pub fn with_token_auth(mut self, mode: AuthMode, secret: impl Into<String>) -> Self {
        let secret = secret.into();
        let secret = secret.trim();
        (self.auth_mode, self.token_secret) = match mode {
            AuthMode::None => (AuthMode::None, None),
            mode if secret.is_empty() => {
                log::error!(
                    "Token authentication is set to '{}' but token_secret is not configured; authentication disabled",
                    mode
                );
                (AuthMode::None, None)
            }
            mode => (mode, Some(SecretString::from(secret.to_string()))),
        };
        self
    }

    /// Admin approval with the given admin user ids.
    ///
    /// An empty id list is refused with a logged error and leaves approval off.
    pub fn with_admin_approval(mut self, admin_ids: impl IntoIterator<Item = u64>) -> Self {
        self.admin_ids = admin_ids.into_iter().map(UserId).collect();
        self.admin_approval = !self.admin_ids.is_empty();
        if !self.admin_approval {
            log::error!("Admin approval is enabled but admin_user_ids is empty; admin approval disabled");
        }
        self
    }

    pub fn with_dev_mode(mut self, dev_mode: bool) -> Self {
        self.dev_mode = dev_mode;
        self
    }

    pub fn token_auth_enabled(&self) -> bool {
        self.auth_mode != AuthMode::None
            && self
                .token_secret
                .as_ref()
                .is_some_and(|secret| !secret.expose_secret().trim().is_empty())
    }

    /// Whether the approval gate can run
    pub fn admin_approval_enabled(&self) -> bool {
        self.admin_approval && !self.admin_ids.is_empty()
    }
}
