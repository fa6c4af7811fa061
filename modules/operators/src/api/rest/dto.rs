use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::contract::model::{Admin, Credentials, LoginSession, NewAdmin};

/// REST DTO for login
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct LoginReq {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Admin as returned after login
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginAdminDto {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub last_login: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginDto {
    pub token: String,
    pub admin: LoginAdminDto,
}

/// Current admin profile
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDto {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerifiedAdminDto {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerifyDto {
    pub admin: VerifiedAdminDto,
}

/// REST DTO for creating an admin
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CreateAdminReq {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    /// `admin` (default) or `super_admin`
    pub role: Option<String>,
}

/// Full admin record for management views; never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminDto {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAdminStatusReq {
    pub is_active: Option<bool>,
}

// Conversion implementations between REST DTOs and contract models

impl From<LoginReq> for Credentials {
    fn from(req: LoginReq) -> Self {
        Self {
            email: req.email,
            password: req.password,
        }
    }
}

impl From<CreateAdminReq> for NewAdmin {
    fn from(req: CreateAdminReq) -> Self {
        Self {
            email: req.email,
            password: req.password,
            name: req.name,
            role: req.role,
        }
    }
}

impl From<LoginSession> for LoginDto {
    fn from(s: LoginSession) -> Self {
        Self {
            token: s.token,
            admin: LoginAdminDto {
                id: s.admin.id.to_string(),
                email: s.admin.email,
                name: s.admin.name,
                role: s.admin.role.as_str().to_string(),
                last_login: s.admin.last_login,
            },
        }
    }
}

impl From<Admin> for ProfileDto {
    fn from(a: Admin) -> Self {
        Self {
            id: a.id.to_string(),
            email: a.email,
            name: a.name,
            role: a.role.as_str().to_string(),
            last_login: a.last_login,
            created_at: a.created_at,
        }
    }
}

impl From<Admin> for VerifyDto {
    fn from(a: Admin) -> Self {
        Self {
            admin: VerifiedAdminDto {
                id: a.id.to_string(),
                email: a.email,
                name: a.name,
                role: a.role.as_str().to_string(),
            },
        }
    }
}

impl From<Admin> for AdminDto {
    fn from(a: Admin) -> Self {
        Self {
            id: a.id.to_string(),
            email: a.email,
            name: a.name,
            role: a.role.as_str().to_string(),
            is_active: a.is_active,
            last_login: a.last_login,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}
