use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use crate::contract::model::{
    EmergencyRequest, ListParams, ListQuery, NewRequest, Page, Priority, RequestFilter, RequestId,
    RequestStatus, SortField, SortOrder, StatusUpdate,
};
use crate::domain::error::DomainError;
use crate::domain::events::RequestEvent;
use crate::domain::ports::EventPublisher;
use crate::domain::repo::{Dimension, RequestsRepository, Transition};
use crate::domain::statistics::{
    self, DashboardStats, GeoBounds, GeoStats, TimeRange,
};
use crate::domain::validation::{validate_new_request, validate_status_update};

/// Configuration for the domain service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub default_page_size: u64,
    pub max_page_size: u64,
    pub geo_result_limit: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_page_size: 50,
            max_page_size: 1000,
            geo_result_limit: 1000,
        }
    }
}

/// Request lifecycle and dashboard rollups.
/// Depends only on the repository and publisher ports, not on infra types.
#[derive(Clone)]
pub struct RequestService {
    repo: Arc<dyn RequestsRepository>,
    events: Arc<dyn EventPublisher<RequestEvent>>,
    config: ServiceConfig,
}

impl RequestService {
    pub fn new(
        repo: Arc<dyn RequestsRepository>,
        events: Arc<dyn EventPublisher<RequestEvent>>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            repo,
            events,
            config,
        }
    }

    #[instrument(name = "emergency.service.create", skip_all)]
    pub async fn create(&self, input: NewRequest) -> Result<EmergencyRequest, DomainError> {
        let location = validate_new_request(&input).map_err(DomainError::validation)?;

        let now = Utc::now();
        let request = EmergencyRequest {
            id: RequestId::generate(),
            full_name: input.full_name.unwrap_or_default().trim().to_string(),
            phone_number: input.phone_number.unwrap_or_default().trim().to_string(),
            location,
            address: input
                .address
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty()),
            status: RequestStatus::Pending,
            priority: Priority::default(),
            notes: None,
            assigned_to: None,
            response_time: None,
            resolved_at: None,
            created_at: now,
            updated_at: now,
        };

        self.repo
            .insert(&request)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        self.events.publish(&RequestEvent::Created(request.clone()));

        info!(request_id = %request.id, "emergency request created");
        Ok(request)
    }

    #[instrument(name = "emergency.service.get", skip(self), fields(request_id = %id))]
    pub async fn get(&self, id: &RequestId) -> Result<EmergencyRequest, DomainError> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::request_not_found(id.as_str()))
    }

    #[instrument(name = "emergency.service.list", skip(self))]
    pub async fn list(&self, params: &ListParams) -> Result<Page<EmergencyRequest>, DomainError> {
        let query = self.list_query(params)?;
        let (items, total) = self
            .repo
            .list(&query)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        debug!(returned = items.len(), total, "listed emergency requests");
        Ok(Page {
            items,
            page: query.page,
            page_size: query.page_size,
            total,
        })
    }

    /// Validate filters and sort keys; page numbers are clamped rather than rejected.
    pub fn list_query(&self, params: &ListParams) -> Result<ListQuery, DomainError> {
        let non_empty = |v: &Option<String>| v.as_deref().filter(|s| !s.is_empty()).map(str::to_owned);

        let status = non_empty(&params.status)
            .map(|s| s.parse::<RequestStatus>().map_err(DomainError::invalid_status))
            .transpose()?;
        let priority = non_empty(&params.priority)
            .map(|p| p.parse::<Priority>().map_err(DomainError::invalid_priority))
            .transpose()?;
        let sort_by = non_empty(&params.sort_by)
            .map(|s| s.parse::<SortField>().map_err(DomainError::invalid_sort_field))
            .transpose()?
            .unwrap_or_default();
        let sort_order = params
            .sort_order
            .as_deref()
            .map(SortOrder::parse_lenient)
            .unwrap_or_default();

        let page = parse_positive(params.page.as_deref()).unwrap_or(1);
        let page_size = parse_positive(params.limit.as_deref())
            .unwrap_or(self.config.default_page_size)
            .min(self.config.max_page_size.max(1));

        Ok(ListQuery {
            filter: RequestFilter { status, priority },
            page,
            page_size,
            sort_by,
            sort_order,
        })
    }

    #[instrument(
        name = "emergency.service.transition",
        skip(self, update),
        fields(request_id = %id)
    )]
    pub async fn transition(
        &self,
        id: &RequestId,
        update: StatusUpdate,
    ) -> Result<EmergencyRequest, DomainError> {
        let status = match update.status.as_deref() {
            None | Some("") => return Err(DomainError::StatusRequired),
            Some(raw) => raw
                .parse::<RequestStatus>()
                .map_err(DomainError::invalid_status)?,
        };
        validate_status_update(&update).map_err(DomainError::validation)?;

        let current = self.get(id).await?;
        let transition = plan_transition(
            &current,
            status,
            update.notes,
            update.assigned_to.map(|a| a.trim().to_string()),
            Utc::now(),
        );

        let updated = self
            .repo
            .apply_transition(id, &transition)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::request_not_found(id.as_str()))?;

        self.events.publish(&RequestEvent::updated(&updated));

        info!(
            from = current.status.as_str(),
            to = updated.status.as_str(),
            "emergency request transitioned"
        );
        Ok(updated)
    }

    #[instrument(name = "emergency.service.dashboard", skip(self))]
    pub async fn dashboard(&self, time_range: Option<&str>) -> Result<DashboardStats, DomainError> {
        let range = TimeRange::parse_lenient(time_range);
        let now = Utc::now();
        let start = range.start(now);
        let db = |e: anyhow::Error| DomainError::database(e.to_string());

        let status_rows = self.repo.distribution(Dimension::Status, None).await.map_err(db)?;
        let priority_rows = self
            .repo
            .distribution(Dimension::Priority, None)
            .await
            .map_err(db)?;
        let recent_status_rows = self
            .repo
            .distribution(Dimension::Status, Some(start))
            .await
            .map_err(db)?;
        let recent_requests = self.repo.count_created_since(start).await.map_err(db)?;
        let recent_resolved = self
            .repo
            .count_resolved_updated_since(start)
            .await
            .map_err(db)?;
        let spans = self.repo.resolved_spans().await.map_err(db)?;
        let created = self
            .repo
            .created_times_since(TimeRange::LastDay.start(now))
            .await
            .map_err(db)?;

        Ok(DashboardStats {
            overview: statistics::overview(&status_rows, recent_requests, recent_resolved, range),
            status_distribution: statistics::status_counts(&status_rows),
            priority_distribution: statistics::priority_counts(&priority_rows),
            recent_status_distribution: statistics::status_counts(&recent_status_rows),
            response_time: statistics::response_time_stats(&spans),
            requests_by_hour: statistics::hourly_histogram(&created),
        })
    }

    #[instrument(name = "emergency.service.geographical", skip(self))]
    pub async fn geographical(&self, bounds: Option<&str>) -> Result<GeoStats, DomainError> {
        let bounds = bounds
            .filter(|b| !b.is_empty())
            .map(GeoBounds::parse)
            .transpose()?;
        let db = |e: anyhow::Error| DomainError::database(e.to_string());

        let requests = self
            .repo
            .find_in_bounds(bounds.as_ref(), self.config.geo_result_limit)
            .await
            .map_err(db)?;
        let points = self
            .repo
            .points_in_bounds(bounds.as_ref())
            .await
            .map_err(db)?;

        Ok(GeoStats {
            requests,
            area_distribution: statistics::cluster_points(points),
        })
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .map(|n| u64::try_from(n.max(1)).unwrap_or(1))
}

/// Derive the set-once fields a move to `status` would write.
///
/// The repository only applies them where still unset, so concurrent
/// transitions cannot shift an already recorded value.
pub fn plan_transition(
    current: &EmergencyRequest,
    status: RequestStatus,
    notes: Option<String>,
    assigned_to: Option<String>,
    at: DateTime<Utc>,
) -> Transition {
    let response_time = (status == RequestStatus::InProgress && current.response_time.is_none())
        .then(|| (at - current.created_at).num_minutes().max(0));
    let resolved_at =
        (status == RequestStatus::Resolved && current.resolved_at.is_none()).then_some(at);

    Transition {
        status,
        notes,
        assigned_to,
        at,
        response_time,
        resolved_at,
    }
}
