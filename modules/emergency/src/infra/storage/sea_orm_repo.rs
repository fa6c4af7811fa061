//! SeaORM-backed repository implementation for the requests port.
//!
//! Generic over `C: ConnectionTrait`, so it works with a `DatabaseConnection`
//! or a transaction.

use anyhow::Context;
use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::{Expr, Func, SimpleExpr},
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select,
};

use crate::contract::model::{
    EmergencyRequest, GeoPoint, ListQuery, Priority, RequestId, RequestStatus, SortField,
    SortOrder,
};
use crate::domain::repo::{Dimension, RequestsRepository, Transition};
use crate::domain::statistics::GeoBounds;
use crate::infra::storage::entity::{Column, Entity as RequestEntity};
use crate::infra::storage::mapper::{priority_from_stored, status_from_stored, to_active_model};

pub struct SeaOrmRequestsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmRequestsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

fn sort_column(field: SortField) -> Column {
    match field {
        SortField::CreatedAt => Column::CreatedAt,
        SortField::UpdatedAt => Column::UpdatedAt,
        SortField::Status => Column::Status,
        SortField::Priority => Column::Priority,
        SortField::FullName => Column::FullName,
        SortField::ResponseTime => Column::ResponseTime,
    }
}

fn bounds_condition(b: &GeoBounds) -> Condition {
    let longitude = if b.crosses_antimeridian() {
        Condition::any()
            .add(Column::Longitude.gte(b.west))
            .add(Column::Longitude.lte(b.east))
    } else {
        Condition::all()
            .add(Column::Longitude.gte(b.west))
            .add(Column::Longitude.lte(b.east))
    };
    Condition::all()
        .add(Column::Latitude.gte(b.south))
        .add(Column::Latitude.lte(b.north))
        .add(longitude)
}

fn within(select: Select<RequestEntity>, bounds: Option<&GeoBounds>) -> Select<RequestEntity> {
    match bounds {
        Some(b) => select.filter(bounds_condition(b)),
        None => select,
    }
}

/// `COALESCE(column, value)`: keep what is stored, otherwise take `value`.
fn set_once(column: Column, value: SimpleExpr) -> SimpleExpr {
    Func::coalesce([Expr::col(column).into(), value]).into()
}

fn to_count(n: i64) -> u64 {
    u64::try_from(n).unwrap_or(0)
}

#[async_trait::async_trait]
impl<C> RequestsRepository for SeaOrmRequestsRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn insert(&self, request: &EmergencyRequest) -> anyhow::Result<()> {
        to_active_model(request)
            .insert(&self.conn)
            .await
            .context("insert failed")?;
        Ok(())
    }

    async fn find_by_id(&self, id: &RequestId) -> anyhow::Result<Option<EmergencyRequest>> {
        let found = RequestEntity::find_by_id(id.to_string())
            .one(&self.conn)
            .await
            .context("find_by_id failed")?;
        Ok(found.map(Into::into))
    }

    async fn list(&self, query: &ListQuery) -> anyhow::Result<(Vec<EmergencyRequest>, u64)> {
        let mut select = RequestEntity::find();
        if let Some(status) = query.filter.status {
            select = select.filter(Column::Status.eq(status.as_str()));
        }
        if let Some(priority) = query.filter.priority {
            select = select.filter(Column::Priority.eq(priority.as_str()));
        }

        let total = select
            .clone()
            .count(&self.conn)
            .await
            .context("list count failed")?;

        let order = match query.sort_order {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        };
        let rows = select
            .order_by(sort_column(query.sort_by), order.clone())
            // Tie-break for stable paging
            .order_by(Column::Id, order)
            .offset(query.offset())
            .limit(query.page_size)
            .all(&self.conn)
            .await
            .context("list failed")?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    async fn apply_transition(
        &self,
        id: &RequestId,
        t: &Transition,
    ) -> anyhow::Result<Option<EmergencyRequest>> {
        let mut update = RequestEntity::update_many()
            .col_expr(Column::Status, Expr::value(t.status.as_str()))
            .col_expr(Column::UpdatedAt, Expr::value(t.at));
        if let Some(notes) = &t.notes {
            update = update.col_expr(Column::Notes, Expr::value(notes.clone()));
        }
        if let Some(assigned_to) = &t.assigned_to {
            update = update.col_expr(Column::AssignedTo, Expr::value(assigned_to.clone()));
        }
        if let Some(minutes) = t.response_time {
            update = update.col_expr(
                Column::ResponseTime,
                set_once(Column::ResponseTime, Expr::value(minutes)),
            );
        }
        if let Some(resolved_at) = t.resolved_at {
            update = update.col_expr(
                Column::ResolvedAt,
                set_once(Column::ResolvedAt, Expr::value(resolved_at)),
            );
        }

        let res = update
            .filter(Column::Id.eq(id.as_str()))
            .exec(&self.conn)
            .await
            .context("apply_transition failed")?;
        if res.rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    async fn distribution(
        &self,
        dimension: Dimension,
        created_since: Option<DateTime<Utc>>,
    ) -> anyhow::Result<Vec<(String, u64)>> {
        let column = match dimension {
            Dimension::Status => Column::Status,
            Dimension::Priority => Column::Priority,
        };
        let mut select = RequestEntity::find()
            .select_only()
            .column(column)
            .column_as(Column::Id.count(), "count")
            .group_by(column);
        if let Some(since) = created_since {
            select = select.filter(Column::CreatedAt.gte(since));
        }

        let rows: Vec<(String, i64)> = select
            .into_tuple()
            .all(&self.conn)
            .await
            .context("distribution failed")?;
        Ok(rows.into_iter().map(|(k, n)| (k, to_count(n))).collect())
    }

    async fn count_created_since(&self, since: DateTime<Utc>) -> anyhow::Result<u64> {
        RequestEntity::find()
            .filter(Column::CreatedAt.gte(since))
            .count(&self.conn)
            .await
            .context("count_created_since failed")
    }

    async fn count_resolved_updated_since(&self, since: DateTime<Utc>) -> anyhow::Result<u64> {
        RequestEntity::find()
            .filter(Column::Status.eq(RequestStatus::Resolved.as_str()))
            .filter(Column::UpdatedAt.gte(since))
            .count(&self.conn)
            .await
            .context("count_resolved_updated_since failed")
    }

    async fn resolved_spans(&self) -> anyhow::Result<Vec<(DateTime<Utc>, DateTime<Utc>)>> {
        RequestEntity::find()
            .select_only()
            .column(Column::CreatedAt)
            .column(Column::UpdatedAt)
            .filter(Column::Status.eq(RequestStatus::Resolved.as_str()))
            .into_tuple()
            .all(&self.conn)
            .await
            .context("resolved_spans failed")
    }

    async fn created_times_since(&self, since: DateTime<Utc>) -> anyhow::Result<Vec<DateTime<Utc>>> {
        RequestEntity::find()
            .select_only()
            .column(Column::CreatedAt)
            .filter(Column::CreatedAt.gte(since))
            .into_tuple()
            .all(&self.conn)
            .await
            .context("created_times_since failed")
    }

    async fn find_in_bounds(
        &self,
        bounds: Option<&GeoBounds>,
        limit: u64,
    ) -> anyhow::Result<Vec<EmergencyRequest>> {
        let rows = within(RequestEntity::find(), bounds)
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("find_in_bounds failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn points_in_bounds(
        &self,
        bounds: Option<&GeoBounds>,
    ) -> anyhow::Result<Vec<(GeoPoint, RequestStatus, Priority)>> {
        let rows: Vec<(String, f64, f64, String, String)> = within(RequestEntity::find(), bounds)
            .select_only()
            .column(Column::Id)
            .column(Column::Longitude)
            .column(Column::Latitude)
            .column(Column::Status)
            .column(Column::Priority)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("points_in_bounds failed")?;

        Ok(rows
            .into_iter()
            .map(|(id, longitude, latitude, status, priority)| {
                (
                    GeoPoint {
                        longitude,
                        latitude,
                    },
                    status_from_stored(&id, &status),
                    priority_from_stored(&id, &priority),
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::storage::migrations::Migrator;
    use chrono::{Duration, TimeZone};
    use sea_orm::{ConnectOptions, Database, DatabaseConnection};
    use sea_orm_migration::MigratorTrait;

    async fn repo() -> SeaOrmRequestsRepository<DatabaseConnection> {
        let mut opts = ConnectOptions::new("sqlite::memory:");
        opts.max_connections(1);
        let db = Database::connect(opts).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        SeaOrmRequestsRepository::new(db)
    }

    fn request_at(longitude: f64, latitude: f64, created_at: DateTime<Utc>) -> EmergencyRequest {
        EmergencyRequest {
            id: RequestId::generate(),
            full_name: "Jane Doe".into(),
            phone_number: "+15551234567".into(),
            location: GeoPoint {
                longitude,
                latitude,
            },
            address: None,
            status: RequestStatus::Pending,
            priority: Priority::High,
            notes: None,
            assigned_to: None,
            response_time: None,
            resolved_at: None,
            created_at,
            updated_at: created_at,
        }
    }

    fn transition(
        status: RequestStatus,
        at: DateTime<Utc>,
        response_time: Option<i64>,
        resolved_at: Option<DateTime<Utc>>,
    ) -> Transition {
        Transition {
            status,
            notes: None,
            assigned_to: None,
            at,
            response_time,
            resolved_at,
        }
    }

    #[tokio::test]
    async fn set_once_fields_keep_the_first_write() {
        let repo = repo().await;
        let created = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let request = request_at(-74.0, 40.7, created);
        repo.insert(&request).await.unwrap();

        let t0 = created + Duration::minutes(3);
        let first = repo
            .apply_transition(
                &request.id,
                &transition(RequestStatus::Resolved, t0, Some(3), Some(t0)),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.response_time, Some(3));
        assert_eq!(first.resolved_at, Some(t0));

        // A transition planned from a stale read still cannot overwrite them.
        let later = t0 + Duration::minutes(50);
        let second = repo
            .apply_transition(
                &request.id,
                &transition(RequestStatus::Resolved, later, Some(99), Some(later)),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(second.response_time, Some(3));
        assert_eq!(second.resolved_at, Some(t0));
        assert_eq!(second.updated_at, later);
    }

    #[tokio::test]
    async fn transition_of_unknown_id_is_none() {
        let repo = repo().await;
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let res = repo
            .apply_transition(
                &RequestId::generate(),
                &transition(RequestStatus::Canceled, at, None, None),
            )
            .await
            .unwrap();
        assert!(res.is_none());
    }

    #[tokio::test]
    async fn bounds_filter_matches_in_memory_check() {
        let repo = repo().await;
        let created = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let spots = [
            (-74.0, 40.7),
            (-72.0, 40.7),
            (175.0, 0.0),
            (-175.0, 0.0),
            (0.0, 0.0),
            (179.9, -10.0),
        ];
        for (i, (lng, lat)) in spots.into_iter().enumerate() {
            let at = created + Duration::seconds(i as i64);
            repo.insert(&request_at(lng, lat, at)).await.unwrap();
        }

        let cases = [
            GeoBounds {
                north: 41.0,
                south: 40.0,
                east: -73.0,
                west: -75.0,
            },
            GeoBounds {
                north: 10.0,
                south: -10.0,
                east: -170.0,
                west: 170.0,
            },
        ];
        for bounds in cases {
            let mut from_sql: Vec<(f64, f64)> = repo
                .points_in_bounds(Some(&bounds))
                .await
                .unwrap()
                .into_iter()
                .map(|(p, _, _)| (p.longitude, p.latitude))
                .collect();
            from_sql.sort_by(|a, b| a.partial_cmp(b).unwrap());

            let mut expected: Vec<(f64, f64)> = spots
                .into_iter()
                .filter(|&(longitude, latitude)| {
                    bounds.contains(GeoPoint {
                        longitude,
                        latitude,
                    })
                })
                .collect();
            expected.sort_by(|a, b| a.partial_cmp(b).unwrap());

            assert!(!expected.is_empty());
            assert_eq!(from_sql, expected, "{bounds:?}");
        }
    }
}
