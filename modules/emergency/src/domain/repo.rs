use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::contract::model::{
    EmergencyRequest, GeoPoint, ListQuery, Priority, RequestId, RequestStatus,
};
use crate::domain::statistics::GeoBounds;

/// A status change together with the set-once values it may derive.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub status: RequestStatus,
    /// Overwrites the stored value when present.
    pub notes: Option<String>,
    /// Overwrites the stored value when present.
    pub assigned_to: Option<String>,
    pub at: DateTime<Utc>,
    /// Written only if the stored response time is still unset.
    pub response_time: Option<i64>,
    /// Written only if the stored resolution time is still unset.
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Column a distribution is grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Status,
    Priority,
}

/// Port for the domain layer: persistence operations the domain needs.
#[async_trait]
pub trait RequestsRepository: Send + Sync {
    async fn insert(&self, request: &EmergencyRequest) -> anyhow::Result<()>;

    async fn find_by_id(&self, id: &RequestId) -> anyhow::Result<Option<EmergencyRequest>>;

    /// One page plus the total number of matching rows.
    async fn list(&self, query: &ListQuery) -> anyhow::Result<(Vec<EmergencyRequest>, u64)>;

    /// Apply a transition in a single conditional write.
    /// Returns the stored record afterwards, or `None` if the id is unknown.
    async fn apply_transition(
        &self,
        id: &RequestId,
        transition: &Transition,
    ) -> anyhow::Result<Option<EmergencyRequest>>;

    /// `(value, count)` rows, optionally restricted to records created since.
    async fn distribution(
        &self,
        dimension: Dimension,
        created_since: Option<DateTime<Utc>>,
    ) -> anyhow::Result<Vec<(String, u64)>>;

    async fn count_created_since(&self, since: DateTime<Utc>) -> anyhow::Result<u64>;

    /// Resolved records last updated since `since`.
    async fn count_resolved_updated_since(&self, since: DateTime<Utc>) -> anyhow::Result<u64>;

    /// `(created_at, updated_at)` of every resolved record.
    async fn resolved_spans(&self) -> anyhow::Result<Vec<(DateTime<Utc>, DateTime<Utc>)>>;

    async fn created_times_since(&self, since: DateTime<Utc>) -> anyhow::Result<Vec<DateTime<Utc>>>;

    /// Newest first, at most `limit` rows.
    async fn find_in_bounds(
        &self,
        bounds: Option<&GeoBounds>,
        limit: u64,
    ) -> anyhow::Result<Vec<EmergencyRequest>>;

    /// Location, status and priority of every record inside `bounds`.
    async fn points_in_bounds(
        &self,
        bounds: Option<&GeoBounds>,
    ) -> anyhow::Result<Vec<(GeoPoint, RequestStatus, Priority)>>;
}
