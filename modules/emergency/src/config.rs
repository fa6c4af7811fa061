use serde::{Deserialize, Serialize};

/// Configuration for the emergency module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmergencyConfig {
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
    /// Cap on raw records returned by the geographic rollup.
    #[serde(default = "default_geo_result_limit")]
    pub geo_result_limit: u64,
    /// Outbound frames buffered per live session before events are dropped.
    #[serde(default = "default_session_buffer")]
    pub session_buffer: usize,
}

impl Default for EmergencyConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            geo_result_limit: default_geo_result_limit(),
            session_buffer: default_session_buffer(),
        }
    }
}

fn default_page_size() -> u64 {
    50
}

fn default_max_page_size() -> u64 {
    1000
}

fn default_geo_result_limit() -> u64 {
    1000
}

fn default_session_buffer() -> usize {
    64
}
