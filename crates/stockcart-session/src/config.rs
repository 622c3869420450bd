//! # Cart Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     STOCKCART_API_URL=http://shop.local:3333                           │
//! │     STOCKCART_DB_PATH=/var/lib/stockcart/cart.db                       │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/stockcart/stockcart.toml (Linux)                         │
//! │     ~/Library/Application Support/com.stockcart.stockcart/... (macOS)  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # stockcart.toml
//! [storage]
//! database_path = "/var/lib/stockcart/cart.db"
//! cart_key = "@RocketShoes:cart"
//!
//! [api]
//! base_url = "http://localhost:3333"
//! request_timeout_secs = 5
//!
//! [session]
//! queue_capacity = 32
//! notify_persistence_failures = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use stockcart_core::DEFAULT_CART_KEY;

use crate::error::{ConfigError, ConfigResult};

// =============================================================================
// Storage Settings
// =============================================================================

/// Where the cart snapshot lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// SQLite file path. Defaults to `stockcart.db` in the platform data dir.
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Key the snapshot is stored under.
    #[serde(default = "default_cart_key")]
    pub cart_key: String,
}

fn default_cart_key() -> String {
    DEFAULT_CART_KEY.to_string()
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            database_path: None,
            cart_key: default_cart_key(),
        }
    }
}

// =============================================================================
// API Settings
// =============================================================================

/// Storefront API used for stock and product lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base URL, e.g. `http://localhost:3333`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (seconds).
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:3333".to_string()
}

fn default_request_timeout() -> u64 {
    5
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ApiSettings {
    /// Returns the request timeout as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// =============================================================================
// Session Settings
// =============================================================================

/// Behavior of the cart worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Operations that can wait in the queue before callers block.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Send a user notification when the write-through fails.
    /// Failures are always logged.
    #[serde(default)]
    pub notify_persistence_failures: bool,
}

fn default_queue_capacity() -> usize {
    32
}

impl Default for SessionSettings {
    fn default() -> Self {
        SessionSettings {
            queue_capacity: default_queue_capacity(),
            notify_persistence_failures: false,
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete cart configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CartConfig {
    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub session: SessionSettings,
}

impl CartConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (stockcart.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading cart config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load cart config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.storage.cart_key.trim().is_empty() {
            return Err(ConfigError::Invalid("cart_key must not be empty".into()));
        }

        let url = &self.api.base_url;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::Invalid(format!(
                "API URL must start with http:// or https://, got: {}",
                url
            )));
        }

        if self.api.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.session.queue_capacity == 0 {
            return Err(ConfigError::Invalid(
                "queue_capacity must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Applies `STOCKCART_*` overrides read through `var`.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(path) = var("STOCKCART_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.storage.database_path = Some(PathBuf::from(path));
        }

        if let Some(key) = var("STOCKCART_CART_KEY") {
            self.storage.cart_key = key;
        }

        if let Some(url) = var("STOCKCART_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api.base_url = url;
        }

        if let Some(secs) = var("STOCKCART_API_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(s) => self.api.request_timeout_secs = s,
                Err(_) => warn!(value = %secs, "Ignoring invalid STOCKCART_API_TIMEOUT_SECS"),
            }
        }

        if let Some(capacity) = var("STOCKCART_QUEUE_CAPACITY") {
            match capacity.parse::<usize>() {
                Ok(c) => self.session.queue_capacity = c,
                Err(_) => warn!(value = %capacity, "Ignoring invalid STOCKCART_QUEUE_CAPACITY"),
            }
        }

        if let Some(flag) = var("STOCKCART_NOTIFY_PERSISTENCE") {
            match flag.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.session.notify_persistence_failures = true,
                "0" | "false" | "no" | "off" => self.session.notify_persistence_failures = false,
                _ => warn!(value = %flag, "Ignoring invalid STOCKCART_NOTIFY_PERSISTENCE"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "stockcart", "stockcart")
            .map(|dirs| dirs.config_dir().join("stockcart.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Returns the database path, falling back to the platform data dir.
    pub fn database_path(&self) -> Option<PathBuf> {
        self.storage.database_path.clone().or_else(|| {
            directories::ProjectDirs::from("com", "stockcart", "stockcart")
                .map(|dirs| dirs.data_dir().join("stockcart.db"))
        })
    }

    /// Returns the snapshot key.
    pub fn cart_key(&self) -> &str {
        &self.storage.cart_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = CartConfig::default();
        assert_eq!(config.cart_key(), "@RocketShoes:cart");
        assert_eq!(config.api.base_url, "http://localhost:3333");
        assert_eq!(config.api.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.session.queue_capacity, 32);
        assert!(!config.session.notify_persistence_failures);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = CartConfig::default();

        config.api.base_url = "ftp://shop".to_string();
        assert!(config.validate().is_err());

        config.api.base_url = "https://shop.example.com".to_string();
        assert!(config.validate().is_ok());

        config.api.request_timeout_secs = 0;
        assert!(config.validate().is_err());

        config.api.request_timeout_secs = 1;
        config.session.queue_capacity = 0;
        assert!(config.validate().is_err());

        config.session.queue_capacity = 1;
        config.storage.cart_key = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: CartConfig = toml::from_str(
            r#"
            [api]
            base_url = "http://shop.local:3333"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "http://shop.local:3333");
        assert_eq!(config.api.request_timeout_secs, 5);
        assert_eq!(config.cart_key(), "@RocketShoes:cart");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = CartConfig::default();
        config.apply_overrides(env(&[
            ("STOCKCART_DB_PATH", "/tmp/cart.db"),
            ("STOCKCART_API_URL", "http://10.0.0.2:3333"),
            ("STOCKCART_API_TIMEOUT_SECS", "2"),
            ("STOCKCART_QUEUE_CAPACITY", "not-a-number"),
            ("STOCKCART_NOTIFY_PERSISTENCE", "yes"),
        ]));

        assert_eq!(config.database_path(), Some(PathBuf::from("/tmp/cart.db")));
        assert_eq!(config.api.base_url, "http://10.0.0.2:3333");
        assert_eq!(config.api.request_timeout_secs, 2);
        assert_eq!(config.session.queue_capacity, 32);
        assert!(config.session.notify_persistence_failures);
    }

    #[test]
    fn test_load_from_file() {
        let dir = std::env::temp_dir().join(format!("stockcart-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let path = dir.join("stockcart.toml");
        std::fs::write(
            &path,
            "[session]\nqueue_capacity = 8\n\n[api]\nbase_url = \"http://shop.local:3333\"\n",
        )
        .unwrap();
        let loaded = CartConfig::load(Some(path.clone()));

        let broken = dir.join("broken.toml");
        std::fs::write(&broken, "[session\nqueue_capacity = ").unwrap();
        let failed = CartConfig::load(Some(broken));

        let _ = std::fs::remove_dir_all(&dir);

        let config = loaded.unwrap();
        assert_eq!(config.session.queue_capacity, 8);
        assert_eq!(config.api.base_url, "http://shop.local:3333");
        assert_eq!(config.cart_key(), "@RocketShoes:cart");
        assert!(matches!(failed, Err(ConfigError::Parse(_))));
    }
}
