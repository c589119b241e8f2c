//! Startup configuration: a TOML file for per-source settings plus
//! environment variables for API keys. Loaded once in `main` and passed by
//! reference into each source constructor — no ambient global state.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "config/glance.toml";
pub const ENV_CONFIG_PATH: &str = "GLANCE_CONFIG_PATH";

/// Fallback delay handed to the display when no schedule applies.
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 5 * 60 * 1000; // 5 minutes

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub football: FootballConfig,
    pub transit: TransitConfig,
    pub weather: WeatherConfig,
    /// API keys come from the environment, never the config file.
    #[serde(skip)]
    pub keys: ApiKeys,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub refresh_interval_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FootballConfig {
    /// football-data.org team id.
    pub team_id: u32,
    /// Display title for the tracked team.
    pub team_name: String,
}

impl Default for FootballConfig {
    fn default() -> Self {
        Self {
            team_id: 57, // Arsenal FC
            team_name: "Arsenal FC".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransitConfig {
    pub route_id: String,
    pub stop_id: String,
}

impl Default for TransitConfig {
    fn default() -> Self {
        Self {
            route_id: "Red".to_string(),
            stop_id: "place-harsq".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Free-form address geocoded at fetch time; empty degrades weather.
    pub home_address: String,
}

#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    pub football: String,
    pub transit: String,
    pub maps: String,
}

impl ApiKeys {
    /// An empty key means "send no auth header" downstream.
    pub fn from_env() -> Self {
        Self {
            football: std::env::var("FOOTBALL_API_KEY").unwrap_or_default(),
            transit: std::env::var("MBTA_API_KEY").unwrap_or_default(),
            maps: std::env::var("GOOGLE_MAPS_API_KEY").unwrap_or_default(),
        }
    }
}

impl AppConfig {
    /// Load from `$GLANCE_CONFIG_PATH` or `config/glance.toml`; a missing
    /// file yields the documented defaults. API keys are merged from the
    /// environment afterwards.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var(ENV_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        let mut config = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("reading config from {}", path.display()))?;
            Self::from_toml_str(&content)
                .with_context(|| format!("parsing config at {}", path.display()))?
        } else {
            Self::default()
        };

        config.keys = ApiKeys::from_env();
        Ok(config)
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_setup() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.server.bind_addr, "0.0.0.0:8080");
        assert_eq!(cfg.server.refresh_interval_ms, 5 * 60 * 1000);
        assert_eq!(cfg.football.team_id, 57);
        assert_eq!(cfg.transit.route_id, "Red");
        assert_eq!(cfg.transit.stop_id, "place-harsq");
        assert!(cfg.weather.home_address.is_empty());
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let cfg = AppConfig::from_toml_str(
            r#"
[transit]
route_id = "Orange"

[weather]
home_address = "1 Main St, Cambridge, MA"
"#,
        )
        .expect("parse");

        assert_eq!(cfg.transit.route_id, "Orange");
        assert_eq!(cfg.transit.stop_id, "place-harsq", "unnamed fields keep defaults");
        assert_eq!(cfg.weather.home_address, "1 Main St, Cambridge, MA");
        assert_eq!(cfg.football.team_id, 57);
    }

    #[test]
    fn empty_toml_is_all_defaults() {
        let cfg = AppConfig::from_toml_str("").expect("parse empty");
        assert_eq!(cfg.football.team_name, "Arsenal FC");
    }
}
