//! SeaORM-backed repository implementation for the admins port.
//!
//! Generic over `C: ConnectionTrait`, so it works with a `DatabaseConnection`
//! or a transaction.

use anyhow::Context;
use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, SqlErr,
};

use crate::contract::model::{Admin, AdminId};
use crate::domain::repo::{AdminsRepository, StoredAdmin};
use crate::infra::storage::entity::{Column, Entity as AdminEntity};
use crate::infra::storage::mapper::to_active_model;

pub struct SeaOrmAdminsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmAdminsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

#[async_trait::async_trait]
impl<C> AdminsRepository for SeaOrmAdminsRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: &AdminId) -> anyhow::Result<Option<StoredAdmin>> {
        let found = AdminEntity::find_by_id(id.to_string())
            .one(&self.conn)
            .await
            .context("find_by_id failed")?;
        Ok(found.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<StoredAdmin>> {
        let found = AdminEntity::find()
            .filter(Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("find_by_email failed")?;
        Ok(found.map(Into::into))
    }

    async fn insert(&self, admin: &Admin, password_hash: &str) -> anyhow::Result<bool> {
        match to_active_model(admin, password_hash).insert(&self.conn).await {
            Ok(_) => Ok(true),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Ok(false)
            }
            Err(e) => Err(e).context("insert failed"),
        }
    }

    async fn list(&self) -> anyhow::Result<Vec<Admin>> {
        let rows = AdminEntity::find()
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(&self.conn)
            .await
            .context("list failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn set_active(
        &self,
        id: &AdminId,
        is_active: bool,
        at: DateTime<Utc>,
    ) -> anyhow::Result<Option<Admin>> {
        let res = AdminEntity::update_many()
            .col_expr(Column::IsActive, Expr::value(is_active))
            .col_expr(Column::UpdatedAt, Expr::value(at))
            .filter(Column::Id.eq(id.as_str()))
            .exec(&self.conn)
            .await
            .context("set_active failed")?;
        if res.rows_affected == 0 {
            return Ok(None);
        }
        Ok(self.find_by_id(id).await?.map(|s| s.admin))
    }

    async fn record_login(&self, id: &AdminId, at: DateTime<Utc>) -> anyhow::Result<()> {
        AdminEntity::update_many()
            .col_expr(Column::LastLogin, Expr::value(Some(at)))
            .filter(Column::Id.eq(id.as_str()))
            .exec(&self.conn)
            .await
            .context("record_login failed")?;
        Ok(())
    }

    async fn count(&self) -> anyhow::Result<u64> {
        AdminEntity::find()
            .count(&self.conn)
            .await
            .context("count failed")
    }
}
