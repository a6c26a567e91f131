use crate::scheduler::Permission;
use std::{env, str::FromStr, time::Duration};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4";

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 1000,
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub gateway: GatewayConfig,
    pub reminder_interval: Duration,
    pub notification_permission: Permission,
    pub seed_samples: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; unparseable values fall back to
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = GatewayConfig::default();
        let gateway = GatewayConfig {
            api_key: lookup("OPENAI_API_KEY").filter(|key| !key.trim().is_empty()),
            base_url: lookup("OPENAI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            model: lookup("OPENAI_MODEL").unwrap_or(defaults.model),
            timeout: parsed(&lookup, "HABITS_GATEWAY_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            ..defaults
        };

        Self {
            port: parsed(&lookup, "PORT").unwrap_or(8080),
            gateway,
            reminder_interval: parsed(&lookup, "HABITS_REMINDER_INTERVAL_SECS")
                .filter(|secs: &u64| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(Duration::from_secs(3600)),
            notification_permission: parsed(&lookup, "HABITS_NOTIFICATION_PERMISSION")
                .unwrap_or(Permission::Granted),
            seed_samples: parsed(&lookup, "HABITS_SEED_SAMPLES").unwrap_or(true),
        }
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|value| value.trim().parse().ok())
}
