use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::contract::model::{
    EmergencyRequest, GeoPoint, ListParams, LocationInput, NewRequest, StatusUpdate,
};
use crate::domain::statistics::{
    Cluster, DashboardStats, GeoStats, HourBucket, Overview, ResponseTimeStats,
};

/// GeoJSON point
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LocationDto {
    /// Always `Point`.
    #[serde(rename = "type")]
    pub kind: String,
    /// `[longitude, latitude]`
    #[schema(value_type = Vec<f64>)]
    pub coordinates: [f64; 2],
}

impl From<GeoPoint> for LocationDto {
    fn from(p: GeoPoint) -> Self {
        Self {
            kind: "Point".to_string(),
            coordinates: [p.longitude, p.latitude],
        }
    }
}

/// REST DTO for submitting an emergency request.
///
/// Fields are loosely typed so that a wrong JSON type is reported as a
/// validation message for that field instead of a parse failure.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestReq {
    #[schema(value_type = String, example = "Jane Doe")]
    pub full_name: Option<Value>,
    #[schema(value_type = String, example = "+15551234567")]
    pub phone_number: Option<Value>,
    #[schema(value_type = LocationDto)]
    pub location: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub address: Option<Value>,
}

/// Returned by a successful submission
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedDto {
    pub id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Full request record
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestDto {
    pub id: String,
    pub full_name: String,
    pub phone_number: String,
    pub location: LocationDto,
    pub address: Option<String>,
    pub status: String,
    pub priority: String,
    pub notes: Option<String>,
    pub assigned_to: Option<String>,
    /// Minutes from creation to the first move into `in_progress`.
    pub response_time: Option<i64>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Reporter-facing projection used by the map view and `request-created` events.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestSummaryDto {
    pub id: String,
    pub full_name: String,
    pub phone_number: String,
    pub location: LocationDto,
    pub address: Option<String>,
    pub status: String,
    pub priority: String,
    pub created_at: DateTime<Utc>,
}

/// Payload of `request-updated` events
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestUpdatedDto {
    pub id: String,
    pub status: String,
    pub notes: Option<String>,
    pub assigned_to: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListRequestsQuery {
    /// pending, in_progress, resolved or canceled
    pub status: Option<String>,
    /// low, medium, high or critical
    pub priority: Option<String>,
    /// 1-based page number (default 1)
    pub page: Option<String>,
    /// Page size (default 50)
    pub limit: Option<String>,
    /// createdAt, updatedAt, status, priority, fullName or responseTime
    pub sort_by: Option<String>,
    /// `desc` (default) or `asc`
    pub sort_order: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusReq {
    pub status: Option<String>,
    pub notes: Option<String>,
    pub assigned_to: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DashboardQuery {
    /// 1h, 24h (default), 7d or 30d
    pub time_range: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GeoQuery {
    /// JSON object `{"north":..,"south":..,"east":..,"west":..}`
    pub bounds: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OverviewDto {
    pub total_requests: u64,
    pub recent_requests: u64,
    pub active_requests: u64,
    pub resolved_requests: u64,
    pub recent_resolved_requests: u64,
    pub time_range: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResponseTimeDto {
    pub avg_response_time: i64,
    pub min_response_time: i64,
    pub max_response_time: i64,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HourBucketDto {
    pub hour: u32,
    pub date: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardDto {
    pub overview: OverviewDto,
    pub status_distribution: BTreeMap<String, u64>,
    pub priority_distribution: BTreeMap<String, u64>,
    pub recent_status_distribution: BTreeMap<String, u64>,
    pub response_time: ResponseTimeDto,
    pub requests_by_hour: Vec<HourBucketDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterDto {
    /// `[longitude, latitude]` rounded to two decimals
    #[schema(value_type = Vec<f64>)]
    pub coordinates: [f64; 2],
    pub count: u64,
    pub status_breakdown: BTreeMap<String, u64>,
    pub priority_breakdown: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeoDto {
    pub requests: Vec<RequestSummaryDto>,
    pub area_distribution: Vec<ClusterDto>,
}

// Conversion implementations between REST DTOs and contract models

fn string_field(v: Option<Value>) -> Option<String> {
    match v {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}

impl From<CreateRequestReq> for NewRequest {
    fn from(req: CreateRequestReq) -> Self {
        let location = match req.location {
            None | Some(Value::Null) => None,
            Some(other) => Some(LocationInput {
                coordinates: other
                    .get("coordinates")
                    .and_then(Value::as_array)
                    .map(|items| items.iter().map(Value::as_f64).collect()),
            }),
        };
        let malformed_address = matches!(&req.address, Some(v) if !v.is_string() && !v.is_null());
        Self {
            full_name: string_field(req.full_name),
            phone_number: string_field(req.phone_number),
            location,
            address: string_field(req.address),
            malformed_address,
        }
    }
}

impl From<ListRequestsQuery> for ListParams {
    fn from(q: ListRequestsQuery) -> Self {
        Self {
            status: q.status,
            priority: q.priority,
            page: q.page,
            limit: q.limit,
            sort_by: q.sort_by,
            sort_order: q.sort_order,
        }
    }
}

impl From<UpdateStatusReq> for StatusUpdate {
    fn from(req: UpdateStatusReq) -> Self {
        Self {
            status: req.status,
            notes: req.notes,
            assigned_to: req.assigned_to,
        }
    }
}

impl From<&EmergencyRequest> for CreatedDto {
    fn from(r: &EmergencyRequest) -> Self {
        Self {
            id: r.id.to_string(),
            status: r.status.as_str().to_string(),
            created_at: r.created_at,
        }
    }
}

impl From<EmergencyRequest> for RequestDto {
    fn from(r: EmergencyRequest) -> Self {
        Self {
            id: r.id.to_string(),
            full_name: r.full_name,
            phone_number: r.phone_number,
            location: r.location.into(),
            address: r.address,
            status: r.status.as_str().to_string(),
            priority: r.priority.as_str().to_string(),
            notes: r.notes,
            assigned_to: r.assigned_to,
            response_time: r.response_time,
            resolved_at: r.resolved_at,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

impl From<&EmergencyRequest> for RequestSummaryDto {
    fn from(r: &EmergencyRequest) -> Self {
        Self {
            id: r.id.to_string(),
            full_name: r.full_name.clone(),
            phone_number: r.phone_number.clone(),
            location: r.location.into(),
            address: r.address.clone(),
            status: r.status.as_str().to_string(),
            priority: r.priority.as_str().to_string(),
            created_at: r.created_at,
        }
    }
}

impl From<Overview> for OverviewDto {
    fn from(o: Overview) -> Self {
        Self {
            total_requests: o.total_requests,
            recent_requests: o.recent_requests,
            active_requests: o.active_requests,
            resolved_requests: o.resolved_requests,
            recent_resolved_requests: o.recent_resolved_requests,
            time_range: o.time_range.as_str().to_string(),
        }
    }
}

impl From<ResponseTimeStats> for ResponseTimeDto {
    fn from(s: ResponseTimeStats) -> Self {
        Self {
            avg_response_time: s.avg,
            min_response_time: s.min,
            max_response_time: s.max,
            count: s.count,
        }
    }
}

impl From<HourBucket> for HourBucketDto {
    fn from(b: HourBucket) -> Self {
        Self {
            hour: b.hour,
            date: b.date,
            count: b.count,
        }
    }
}

impl From<DashboardStats> for DashboardDto {
    fn from(s: DashboardStats) -> Self {
        Self {
            overview: s.overview.into(),
            status_distribution: s.status_distribution,
            priority_distribution: s.priority_distribution,
            recent_status_distribution: s.recent_status_distribution,
            response_time: s.response_time.into(),
            requests_by_hour: s.requests_by_hour.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<Cluster> for ClusterDto {
    fn from(c: Cluster) -> Self {
        Self {
            coordinates: [c.point.longitude, c.point.latitude],
            count: c.count,
            status_breakdown: c.status_breakdown,
            priority_breakdown: c.priority_breakdown,
        }
    }
}

impl From<GeoStats> for GeoDto {
    fn from(s: GeoStats) -> Self {
        Self {
            requests: s.requests.iter().map(RequestSummaryDto::from).collect(),
            area_distribution: s.area_distribution.into_iter().map(Into::into).collect(),
        }
    }
}
