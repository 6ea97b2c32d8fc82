use crate::domain::node::Node;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub feed: FeedSettings,
    #[serde(default)]
    pub polling: PollingSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default = "default_nodes")]
    pub nodes: Vec<Node>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeedSettings {
    #[serde(default = "default_host")]
    pub host: String,
    pub channel_id: String,
    pub read_api_key: String,
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Fixes the synthetic fallback sequence, for reproducible demos.
    #[serde(default)]
    pub fallback_seed: Option<u64>,
}

impl FeedSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PollingSettings {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl PollingSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

/// The terminal belongs to the dashboard, so logs go to a file.
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    #[serde(default = "default_log_directory")]
    pub directory: PathBuf,
    /// Filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: default_log_directory(),
            level: default_log_level(),
        }
    }
}

fn default_log_directory() -> PathBuf {
    PathBuf::from("logs")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_host() -> String {
    "https://api.thingspeak.com".to_string()
}

fn default_max_results() -> u32 {
    // One day at one-minute resolution.
    1440
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_interval_secs() -> u64 {
    5 * 60
}

fn default_nodes() -> Vec<Node> {
    vec![Node::new("IIIT", "IIIT", 17.446146, 78.349206)]
}

/// Reads `config/dashboard.*` if present, then `DASHBOARD_*` environment
/// variables (`__` separates nesting, e.g. `DASHBOARD_FEED__CHANNEL_ID`).
pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(
            config::Environment::with_prefix("DASHBOARD")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{Config, File, FileFormat};

    fn parse(toml: &str) -> anyhow::Result<DashboardConfig> {
        let settings = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    #[test]
    fn test_defaults_applied() {
        let config = parse(
            r#"
            [feed]
            channel_id = "2293900"
            read_api_key = "KEY"
            "#,
        )
        .unwrap();

        assert_eq!(config.feed.host, "https://api.thingspeak.com");
        assert_eq!(config.feed.max_results, 1440);
        assert_eq!(config.feed.fallback_seed, None);
        assert_eq!(config.logging.directory, PathBuf::from("logs"));
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.polling.interval(), Duration::from_secs(300));
        assert_eq!(config.nodes.len(), 1);
        assert_eq!(config.nodes[0].id, "IIIT");
    }

    #[test]
    fn test_nodes_and_overrides() {
        let config = parse(
            r#"
            [feed]
            host = "http://localhost:9000"
            channel_id = "1"
            read_api_key = "K"
            max_results = 100
            fallback_seed = 7

            [polling]
            interval_secs = 60

            [logging]
            directory = "/tmp/dashboard-logs"
            level = "debug"

            [[nodes]]
            id = "PH-1"
            name = "Pump House"
            lat = 17.1
            lng = 78.2
            status = "error"
            channel_id = "777"
            "#,
        )
        .unwrap();

        assert_eq!(config.feed.max_results, 100);
        assert_eq!(config.feed.fallback_seed, Some(7));
        assert_eq!(config.polling.interval(), Duration::from_secs(60));
        assert_eq!(config.logging.directory, PathBuf::from("/tmp/dashboard-logs"));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.nodes[0].channel_id.as_deref(), Some("777"));
        assert_eq!(config.nodes[0].status, crate::domain::node::NodeStatus::Error);
    }

    #[test]
    fn test_missing_channel_rejected() {
        assert!(parse("[feed]\nread_api_key = \"K\"").is_err());
    }
}
