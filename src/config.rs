use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::fs;

/// Configuration file name, looked up in the working directory
pub const CONFIG_FILE: &str = "tempbox.toml";

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub address: AddressConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub inbox: InboxConfig,
}

/// Shape of generated addresses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressConfig {
    /// Domain part of generated addresses
    #[serde(default = "default_domain")]
    pub domain: String,
    /// Fixed prefix of the local part
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Number of random characters after the prefix
    #[serde(default = "default_local_len")]
    pub local_len: usize,
}

impl Default for AddressConfig {
    fn default() -> Self {
        Self {
            domain: default_domain(),
            prefix: default_prefix(),
            local_len: default_local_len(),
        }
    }
}

fn default_domain() -> String {
    "tempmail.io".to_string()
}

fn default_prefix() -> String {
    "temp_".to_string()
}

fn default_local_len() -> usize {
    6
}

/// Lifetimes and timer cadences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// How long a generated address stays active
    #[serde(default = "default_lifetime_minutes")]
    pub lifetime_minutes: i64,
    /// Cadence of the expiry sweep
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    /// Delay before the simulated delivery fires
    #[serde(default = "default_delivery_delay_secs")]
    pub delivery_delay_secs: u64,
    /// Cadence of the countdown ticker
    #[serde(default = "default_countdown_tick_secs")]
    pub countdown_tick_secs: u64,
    /// How long the "copied" indicator stays lit
    #[serde(default = "default_copied_reset_secs")]
    pub copied_reset_secs: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            lifetime_minutes: default_lifetime_minutes(),
            sweep_interval_secs: default_sweep_interval_secs(),
            delivery_delay_secs: default_delivery_delay_secs(),
            countdown_tick_secs: default_countdown_tick_secs(),
            copied_reset_secs: default_copied_reset_secs(),
        }
    }
}

fn default_lifetime_minutes() -> i64 {
    60
}

fn default_sweep_interval_secs() -> u64 {
    60
}

fn default_delivery_delay_secs() -> u64 {
    2
}

fn default_countdown_tick_secs() -> u64 {
    1
}

fn default_copied_reset_secs() -> u64 {
    2
}

/// Inbox presentation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboxConfig {
    /// Messages per inbox page
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for InboxConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

fn default_page_size() -> usize {
    4
}

/// Error type for configuration loading
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {}", e),
            Self::Parse(e) => write!(f, "Invalid configuration: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Parse(e)
    }
}

impl EngineConfig {
    /// Load configuration from `tempbox.toml` in `dir`, falling back to
    /// defaults, then apply environment variable overrides
    pub async fn load(dir: &Path) -> Result<Self, ConfigError> {
        let config_path = dir.join(CONFIG_FILE);

        let mut config = if config_path.exists() {
            let content = fs::read_to_string(&config_path).await?;
            toml::from_str(&content)?
        } else {
            EngineConfig::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(domain) = std::env::var("TEMPBOX_DOMAIN") {
            self.address.domain = domain;
        }
        if let Ok(minutes) = std::env::var("TEMPBOX_LIFETIME_MINUTES") {
            if let Ok(minutes) = minutes.parse() {
                self.timing.lifetime_minutes = minutes;
            }
        }
        if let Ok(secs) = std::env::var("TEMPBOX_SWEEP_INTERVAL_SECS") {
            if let Ok(secs) = secs.parse() {
                self.timing.sweep_interval_secs = secs;
            }
        }
        if let Ok(secs) = std::env::var("TEMPBOX_DELIVERY_DELAY_SECS") {
            if let Ok(secs) = secs.parse() {
                self.timing.delivery_delay_secs = secs;
            }
        }
    }

    /// Active lifetime of a generated address
    pub fn lifetime(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.timing.lifetime_minutes)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.timing.sweep_interval_secs)
    }

    pub fn delivery_delay(&self) -> Duration {
        Duration::from_secs(self.timing.delivery_delay_secs)
    }

    pub fn countdown_tick(&self) -> Duration {
        Duration::from_secs(self.timing.countdown_tick_secs)
    }

    pub fn copied_reset(&self) -> Duration {
        Duration::from_secs(self.timing.copied_reset_secs)
    }

    /// Generate a sample configuration file
    pub fn sample() -> String {
        toml::to_string_pretty(&EngineConfig::default()).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.address.domain, "tempmail.io");
        assert_eq!(config.address.prefix, "temp_");
        assert_eq!(config.address.local_len, 6);
        assert_eq!(config.timing.lifetime_minutes, 60);
        assert_eq!(config.timing.sweep_interval_secs, 60);
        assert_eq!(config.inbox.page_size, 4);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: EngineConfig = toml::from_str(
            r#"
            [timing]
            delivery_delay_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.timing.delivery_delay_secs, 5);
        assert_eq!(config.timing.lifetime_minutes, 60);
        assert_eq!(config.address.domain, "tempmail.io");
    }

    #[test]
    fn test_sample_round_trips() {
        let sample = EngineConfig::sample();
        let parsed: EngineConfig = toml::from_str(&sample).unwrap();
        assert_eq!(parsed.inbox.page_size, EngineConfig::default().inbox.page_size);
    }

    #[test]
    fn test_duration_helpers() {
        let config = EngineConfig::default();
        assert_eq!(config.lifetime(), chrono::Duration::minutes(60));
        assert_eq!(config.delivery_delay(), Duration::from_secs(2));
    }
}
