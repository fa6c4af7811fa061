use sea_orm::Set;

use crate::contract::model::{Admin, AdminId, Role};
use crate::domain::repo::StoredAdmin;
use crate::infra::storage::entity::{ActiveModel, Model};

impl From<Model> for Admin {
    fn from(m: Model) -> Self {
        let role = m.role.parse::<Role>().unwrap_or_else(|unknown| {
            tracing::warn!(admin_id = %m.id, role = %unknown, "unknown stored role, treating as admin");
            Role::Admin
        });
        Self {
            id: AdminId::from_stored(m.id),
            email: m.email,
            name: m.name,
            role,
            is_active: m.is_active,
            last_login: m.last_login,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<Model> for StoredAdmin {
    fn from(m: Model) -> Self {
        let password_hash = m.password_hash.clone();
        Self {
            admin: m.into(),
            password_hash,
        }
    }
}

/// Build an insertable row from a domain admin and its hash.
pub fn to_active_model(admin: &Admin, password_hash: &str) -> ActiveModel {
    ActiveModel {
        id: Set(admin.id.to_string()),
        email: Set(admin.email.clone()),
        password_hash: Set(password_hash.to_string()),
        name: Set(admin.name.clone()),
        role: Set(admin.role.as_str().to_string()),
        is_active: Set(admin.is_active),
        last_login: Set(admin.last_login),
        created_at: Set(admin.created_at),
        updated_at: Set(admin.updated_at),
    }
}
