use serde::{Deserialize, Serialize};

/// Configuration for the operators module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OperatorsConfig {
    /// HS256 signing secret. Must be non-empty to serve traffic.
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_jwt_issuer")]
    pub jwt_issuer: String,
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,
    /// Super admin created on startup when no admin exists yet.
    #[serde(default)]
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl Default for OperatorsConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_issuer: default_jwt_issuer(),
            token_ttl_secs: default_token_ttl_secs(),
            min_password_length: default_min_password_length(),
            bootstrap_admin: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl Default for BootstrapAdmin {
    fn default() -> Self {
        Self {
            email: "admin@emergency.com".to_string(),
            password: "admin123".to_string(),
            name: "System Administrator".to_string(),
        }
    }
}

fn default_jwt_issuer() -> String {
    "sos-server".to_string()
}

fn default_token_ttl_secs() -> u64 {
    24 * 60 * 60
}

fn default_min_password_length() -> usize {
    6
}
