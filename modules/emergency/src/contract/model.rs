use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

use modkit::ids::{new_hex_id, parse_hex_id};

/// 24-hex emergency request identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(String);

impl RequestId {
    pub fn generate() -> Self {
        Self(new_hex_id())
    }

    /// Parse a user-supplied id; `None` if it is not 24 hex characters.
    pub fn parse(raw: &str) -> Option<Self> {
        parse_hex_id(raw).map(Self)
    }

    pub(crate) fn from_stored(raw: String) -> Self {
        Self(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RequestStatus {
    #[default]
    Pending,
    InProgress,
    Resolved,
    Canceled,
}

impl RequestStatus {
    pub const ALL: [Self; 4] = [
        Self::Pending,
        Self::InProgress,
        Self::Resolved,
        Self::Canceled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Canceled => "canceled",
        }
    }

    /// Pending or in progress: still needs an operator.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::InProgress)
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Urgency. New requests are high unless an operator says otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Priority {
    Low,
    Medium,
    #[default]
    High,
    Critical,
}

impl Priority {
    pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// WGS84 point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

/// Emergency request entity (no serde/schemars)
#[derive(Debug, Clone, PartialEq)]
pub struct EmergencyRequest {
    pub id: RequestId,
    pub full_name: String,
    pub phone_number: String,
    pub location: GeoPoint,
    pub address: Option<String>,
    pub status: RequestStatus,
    pub priority: Priority,
    pub notes: Option<String>,
    pub assigned_to: Option<String>,
    /// Minutes from creation to the first move into `in_progress`.
    pub response_time: Option<i64>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Unvalidated submission from a reporter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewRequest {
    /// `None` when missing or not a string.
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub location: Option<LocationInput>,
    pub address: Option<String>,
    /// Set when `address` was present with a non-string value.
    pub malformed_address: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationInput {
    /// `None` when missing or not an array; a `None` element is a non-number.
    pub coordinates: Option<Vec<Option<f64>>>,
}

/// Unvalidated operator update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: Option<String>,
    pub notes: Option<String>,
    pub assigned_to: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Status,
    Priority,
    FullName,
    ResponseTime,
}

impl SortField {
    pub const ALL: [Self; 6] = [
        Self::CreatedAt,
        Self::UpdatedAt,
        Self::Status,
        Self::Priority,
        Self::FullName,
        Self::ResponseTime,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreatedAt => "createdAt",
            Self::UpdatedAt => "updatedAt",
            Self::Status => "status",
            Self::Priority => "priority",
            Self::FullName => "fullName",
            Self::ResponseTime => "responseTime",
        }
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Anything other than `desc` sorts ascending.
    pub fn parse_lenient(raw: &str) -> Self {
        if raw == "desc" {
            Self::Desc
        } else {
            Self::Asc
        }
    }
}

/// Raw list query as received; parsed and clamped by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RequestFilter {
    pub status: Option<RequestStatus>,
    pub priority: Option<Priority>,
}

/// Validated list query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    pub filter: RequestFilter,
    /// 1-based.
    pub page: u64,
    pub page_size: u64,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl ListQuery {
    /// Rows to skip, capped at what SQL drivers bind as a signed 64-bit value.
    pub fn offset(&self) -> u64 {
        (self.page - 1)
            .saturating_mul(self.page_size)
            .min(i64::MAX as u64)
    }
}

#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub page_size: u64,
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_snake_case() {
        for s in RequestStatus::ALL {
            assert_eq!(s.as_str().parse::<RequestStatus>(), Ok(s));
        }
        assert_eq!("in_progress".parse(), Ok(RequestStatus::InProgress));
        assert!("In_Progress".parse::<RequestStatus>().is_err());
    }

    #[test]
    fn defaults() {
        assert_eq!(RequestStatus::default(), RequestStatus::Pending);
        assert_eq!(Priority::default(), Priority::High);
        assert_eq!(SortField::default(), SortField::CreatedAt);
        assert_eq!(SortOrder::default(), SortOrder::Desc);
    }

    #[test]
    fn active_statuses() {
        let active: Vec<_> = RequestStatus::ALL
            .into_iter()
            .filter(|s| s.is_active())
            .collect();
        assert_eq!(active, vec![RequestStatus::Pending, RequestStatus::InProgress]);
    }

    #[test]
    fn sort_order_is_lenient() {
        assert_eq!(SortOrder::parse_lenient("desc"), SortOrder::Desc);
        assert_eq!(SortOrder::parse_lenient("asc"), SortOrder::Asc);
        assert_eq!(SortOrder::parse_lenient("DESC"), SortOrder::Asc);
    }

    #[test]
    fn offset_from_page() {
        let q = ListQuery {
            filter: RequestFilter::default(),
            page: 2,
            page_size: 10,
            sort_by: SortField::CreatedAt,
            sort_order: SortOrder::Desc,
        };
        assert_eq!(q.offset(), 10);

        let far = ListQuery {
            page: 1_000_000_000_000_000_000,
            ..q
        };
        assert_eq!(far.offset(), i64::MAX as u64);
    }
}
