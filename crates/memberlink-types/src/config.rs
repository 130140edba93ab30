//! Global configuration types for Memberlink.
//!
//! `GlobalConfig` represents the top-level `config.toml` in the data
//! directory. Every field has a default, so an empty file is valid.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub relay: RelayConfig,
}

/// HTTP listener settings. CLI flags take precedence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    4000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Member directory cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of owner slots kept in memory (least recently used
    /// owners are evicted beyond this).
    #[serde(default = "default_max_owners")]
    pub max_owners: usize,

    /// Pre-populate the cache from the store at startup.
    #[serde(default = "default_warm_on_start")]
    pub warm_on_start: bool,
}

fn default_max_owners() -> usize {
    1024
}

fn default_warm_on_start() -> bool {
    true
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_owners: default_max_owners(),
            warm_on_start: default_warm_on_start(),
        }
    }
}

/// Chat relay settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Start the chat relay alongside the HTTP server.
    #[serde(default = "default_relay_enabled")]
    pub enabled: bool,

    /// Phrases that trigger a greeting reply (matched case-insensitively).
    #[serde(default = "default_greetings")]
    pub greetings: Vec<String>,
}

fn default_relay_enabled() -> bool {
    true
}

/// Greeting phrases recognized by default.
pub fn default_greetings() -> Vec<String> {
    [
        "Hello!",
        "Hi there!",
        "Welcome!",
        "Greetings!",
        "Hey!",
        "Good to see you!",
        "Howdy!",
        "Salutations!",
        "Hola!",
        "Namaste!",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            enabled: default_relay_enabled(),
            greetings: default_greetings(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_config_default_values() {
        let config = GlobalConfig::default();
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.cache.max_owners, 1024);
        assert!(config.cache.warm_on_start);
        assert!(config.relay.enabled);
        assert_eq!(config.relay.greetings.len(), 10);
    }

    #[test]
    fn test_global_config_deserialize_with_defaults() {
        let config: GlobalConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.cache.max_owners, 1024);
    }

    #[test]
    fn test_global_config_deserialize_with_values() {
        let toml_str = r#"
[server]
port = 8080

[cache]
max_owners = 16
warm_on_start = false

[relay]
greetings = ["Yo!"]
"#;
        let config: GlobalConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.cache.max_owners, 16);
        assert!(!config.cache.warm_on_start);
        assert_eq!(config.relay.greetings, vec!["Yo!"]);
        assert!(config.relay.enabled);
    }
}
