use serde::{Deserialize, Serialize};

use crate::collect::global_variables::{
    DEFAULT_ELEVATION_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
};

/// Per-run settings for road processing
///
/// Missing fields fall back to their defaults when deserialized, so a config
/// file only needs to list what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadConfig {
    /// Backfill and smooth elevations after stitching
    pub elevation_enabled: bool,
    /// Root of the Open-Elevation service
    pub elevation_url: String,
    /// User-Agent sent with lookup requests
    pub user_agent: String,
    /// Per-request timeout, in seconds
    pub timeout_secs: u64,
}

impl Default for RoadConfig {
    fn default() -> Self {
        RoadConfig {
            elevation_enabled: true,
            elevation_url: DEFAULT_ELEVATION_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl RoadConfig {
    /// Read a config from JSON text
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn without_elevation() -> Self {
        RoadConfig {
            elevation_enabled: false,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_road_config_default() {
        let config = RoadConfig::default();
        assert!(config.elevation_enabled);
        assert_eq!(config.elevation_url, "https://api.open-elevation.com");
        assert_eq!(config.timeout_secs, 30);
        assert!(config.user_agent.starts_with("rsroads/"));
    }

    #[test]
    fn test_road_config_partial_json() {
        let config =
            RoadConfig::from_json(r#"{"elevation_url": "http://localhost:8080", "timeout_secs": 5}"#)
                .unwrap();
        assert!(config.elevation_enabled);
        assert_eq!(config.elevation_url, "http://localhost:8080");
        assert_eq!(config.timeout_secs, 5);

        assert!(RoadConfig::from_json(r#"{"timeout_secs": "soon"}"#).is_err());
        assert!(!RoadConfig::without_elevation().elevation_enabled);
    }
}
