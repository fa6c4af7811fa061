use serde::{Deserialize, Serialize};

/// HTTP surface configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiIngressConfig {
    /// `host:port`. Empty means the application picks it from its server section.
    #[serde(default)]
    pub bind_addr: String,
    #[serde(default)]
    pub cors_enabled: bool,
    /// Allowed origins when CORS is enabled; empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_body_limit_bytes")]
    pub body_limit_bytes: usize,
    /// Serve `/api/openapi.json` and `/api/docs`.
    #[serde(default = "default_enable_docs")]
    pub enable_docs: bool,
}

impl Default for ApiIngressConfig {
    fn default() -> Self {
        Self {
            bind_addr: String::new(),
            cors_enabled: false,
            cors_origins: Vec::new(),
            request_timeout_secs: default_request_timeout_secs(),
            body_limit_bytes: default_body_limit_bytes(),
            enable_docs: default_enable_docs(),
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_body_limit_bytes() -> usize {
    1024 * 1024
}

fn default_enable_docs() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_section_keeps_defaults() {
        let cfg: ApiIngressConfig = serde_json::from_value(serde_json::json!({
            "cors_enabled": true,
            "cors_origins": ["http://localhost:3000"]
        }))
        .unwrap();
        assert!(cfg.cors_enabled);
        assert_eq!(cfg.request_timeout_secs, 30);
        assert_eq!(cfg.body_limit_bytes, 1024 * 1024);
        assert!(cfg.enable_docs);
        assert!(cfg.bind_addr.is_empty());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let res = serde_json::from_value::<ApiIngressConfig>(serde_json::json!({ "port": 1 }));
        assert!(res.is_err());
    }
}
