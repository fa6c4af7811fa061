use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

use modkit::ids::{new_hex_id, parse_hex_id};

/// 24-hex admin identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AdminId(String);

impl AdminId {
    pub fn generate() -> Self {
        Self(new_hex_id())
    }

    /// Parse a user-supplied id; `None` if it is not 24 hex characters.
    pub fn parse(raw: &str) -> Option<Self> {
        parse_hex_id(raw).map(Self)
    }

    /// Wrap an id read back from storage.
    pub(crate) fn from_stored(raw: String) -> Self {
        Self(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AdminId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    #[default]
    Admin,
    SuperAdmin,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Admin, Role::SuperAdmin];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Admin account without credentials (no serde/schemars)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admin {
    pub id: AdminId,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Admin {
    pub fn is_super_admin(&self) -> bool {
        self.role == Role::SuperAdmin
    }
}

/// Unvalidated input for creating an admin
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewAdmin {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
}

/// Unvalidated login input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Successful login
#[derive(Debug, Clone)]
pub struct LoginSession {
    pub token: String,
    pub admin: Admin,
}

#[derive(Debug, Clone)]
pub enum SeedOutcome {
    Created(Admin),
    /// At least one admin already existed; nothing was written.
    Skipped { existing: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_names_round_trip() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
        assert_eq!("root".parse::<Role>(), Err("root".to_string()));
        assert_eq!(Role::default(), Role::Admin);
    }

    #[test]
    fn admin_id_parse_normalizes_case() {
        let id = AdminId::parse("ABCDEFABCDEFABCDEFABCDEF").unwrap();
        assert_eq!(id.as_str(), "abcdefabcdefabcdefabcdef");
        assert!(AdminId::parse("xyz").is_none());
    }
}
