use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::contract::model::{Admin, AdminId};

/// Admin together with its password hash; never leaves the domain layer.
#[derive(Debug, Clone)]
pub struct StoredAdmin {
    pub admin: Admin,
    pub password_hash: String,
}

/// Port for the domain layer: persistence operations the domain needs.
#[async_trait]
pub trait AdminsRepository: Send + Sync {
    async fn find_by_id(&self, id: &AdminId) -> anyhow::Result<Option<StoredAdmin>>;
    /// Lookup by normalized (trimmed, lower-cased) email.
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<StoredAdmin>>;
    /// Insert a fully-formed admin. Returns false if the email is already taken.
    async fn insert(&self, admin: &Admin, password_hash: &str) -> anyhow::Result<bool>;
    /// All admins, newest first.
    async fn list(&self) -> anyhow::Result<Vec<Admin>>;
    /// Returns the updated admin, or `None` if the id is unknown.
    async fn set_active(
        &self,
        id: &AdminId,
        is_active: bool,
        at: DateTime<Utc>,
    ) -> anyhow::Result<Option<Admin>>;
    async fn record_login(&self, id: &AdminId, at: DateTime<Utc>) -> anyhow::Result<()>;
    async fn count(&self) -> anyhow::Result<u64>;
}
