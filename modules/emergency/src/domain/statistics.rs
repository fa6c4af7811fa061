//! Pure rollups behind the dashboard and map views.
//!
//! The repository hands over raw counts, timestamps and points; everything
//! here is deterministic and unit-tested without a database.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::Deserialize;

use crate::contract::model::{EmergencyRequest, GeoPoint, Priority, RequestStatus};
use crate::domain::error::DomainError;

/// Trailing window for dashboard counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeRange {
    LastHour,
    #[default]
    LastDay,
    LastWeek,
    LastMonth,
}

impl TimeRange {
    /// Unknown or missing values fall back to 24h.
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw {
            Some("1h") => Self::LastHour,
            Some("7d") => Self::LastWeek,
            Some("30d") => Self::LastMonth,
            _ => Self::LastDay,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::LastHour => "1h",
            Self::LastDay => "24h",
            Self::LastWeek => "7d",
            Self::LastMonth => "30d",
        }
    }

    pub fn duration(self) -> Duration {
        match self {
            Self::LastHour => Duration::hours(1),
            Self::LastDay => Duration::hours(24),
            Self::LastWeek => Duration::days(7),
            Self::LastMonth => Duration::days(30),
        }
    }

    pub fn start(self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.duration()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overview {
    pub total_requests: u64,
    pub recent_requests: u64,
    pub active_requests: u64,
    pub resolved_requests: u64,
    pub recent_resolved_requests: u64,
    pub time_range: TimeRange,
}

/// Whole minutes between creation and last update of resolved requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResponseTimeStats {
    pub avg: i64,
    pub min: i64,
    pub max: i64,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourBucket {
    /// `YYYY-MM-DD`, UTC.
    pub date: String,
    /// 0-23, UTC.
    pub hour: u32,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStats {
    pub overview: Overview,
    pub status_distribution: BTreeMap<String, u64>,
    pub priority_distribution: BTreeMap<String, u64>,
    pub recent_status_distribution: BTreeMap<String, u64>,
    pub response_time: ResponseTimeStats,
    pub requests_by_hour: Vec<HourBucket>,
}

/// Requests sharing a two-decimal rounded point.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub point: GeoPoint,
    pub count: u64,
    pub status_breakdown: BTreeMap<String, u64>,
    pub priority_breakdown: BTreeMap<String, u64>,
}

#[derive(Debug, Clone)]
pub struct GeoStats {
    pub requests: Vec<EmergencyRequest>,
    pub area_distribution: Vec<Cluster>,
}

/// Bounding box; `west > east` crosses the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GeoBounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl GeoBounds {
    /// Parse the `bounds` query parameter, a JSON object with four numbers.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let value: serde_json::Value =
            serde_json::from_str(raw).map_err(|e| DomainError::invalid_bounds(e.to_string()))?;
        // Derived struct deserialization would also accept a four-element array.
        if !value.is_object() {
            return Err(DomainError::invalid_bounds("bounds must be a JSON object"));
        }
        let bounds: Self = serde_json::from_value(value)
            .map_err(|e| DomainError::invalid_bounds(e.to_string()))?;
        let all_finite = [bounds.north, bounds.south, bounds.east, bounds.west]
            .iter()
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(DomainError::invalid_bounds("bounds must be finite numbers"));
        }
        Ok(bounds)
    }

    pub fn crosses_antimeridian(&self) -> bool {
        self.west > self.east
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, point: GeoPoint) -> bool {
        let lat_ok = point.latitude >= self.south && point.latitude <= self.north;
        let lng_ok = if self.crosses_antimeridian() {
            point.longitude >= self.west || point.longitude <= self.east
        } else {
            point.longitude >= self.west && point.longitude <= self.east
        };
        lat_ok && lng_ok
    }
}

/// Per-value counts with every enum value present, zero when absent.
pub fn fold_counts<'a, I>(values: I, rows: &[(String, u64)]) -> BTreeMap<String, u64>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out: BTreeMap<String, u64> = values.into_iter().map(|v| (v.to_string(), 0)).collect();
    for (key, count) in rows {
        *out.entry(key.clone()).or_insert(0) += count;
    }
    out
}

pub fn status_counts(rows: &[(String, u64)]) -> BTreeMap<String, u64> {
    fold_counts(RequestStatus::ALL.map(RequestStatus::as_str), rows)
}

pub fn priority_counts(rows: &[(String, u64)]) -> BTreeMap<String, u64> {
    fold_counts(Priority::ALL.map(Priority::as_str), rows)
}

/// Overview numbers; active and resolved come from the same status rows as
/// the total so they always agree.
pub fn overview(
    status_rows: &[(String, u64)],
    recent_requests: u64,
    recent_resolved_requests: u64,
    time_range: TimeRange,
) -> Overview {
    let count_of = |s: RequestStatus| {
        status_rows
            .iter()
            .filter(|(k, _)| k == s.as_str())
            .map(|(_, c)| *c)
            .sum::<u64>()
    };
    Overview {
        total_requests: status_rows.iter().map(|(_, c)| *c).sum(),
        recent_requests,
        active_requests: count_of(RequestStatus::Pending) + count_of(RequestStatus::InProgress),
        resolved_requests: count_of(RequestStatus::Resolved),
        recent_resolved_requests,
        time_range,
    }
}

/// Minutes between `(created_at, updated_at)` pairs, rounded to the nearest.
pub fn response_time_stats(spans: &[(DateTime<Utc>, DateTime<Utc>)]) -> ResponseTimeStats {
    if spans.is_empty() {
        return ResponseTimeStats::default();
    }
    let minutes: Vec<f64> = spans
        .iter()
        .map(|(created, updated)| (*updated - *created).num_milliseconds() as f64 / 60_000.0)
        .collect();
    let sum: f64 = minutes.iter().sum();
    let min = minutes.iter().copied().fold(f64::INFINITY, f64::min);
    let max = minutes.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    ResponseTimeStats {
        avg: (sum / minutes.len() as f64).round() as i64,
        min: min.round() as i64,
        max: max.round() as i64,
        count: minutes.len() as u64,
    }
}

/// Creation counts per (UTC date, hour), oldest bucket first.
pub fn hourly_histogram(created: &[DateTime<Utc>]) -> Vec<HourBucket> {
    let mut buckets: BTreeMap<(String, u32), u64> = BTreeMap::new();
    for at in created {
        *buckets
            .entry((at.format("%Y-%m-%d").to_string(), at.hour()))
            .or_insert(0) += 1;
    }
    buckets
        .into_iter()
        .map(|((date, hour), count)| HourBucket { date, hour, count })
        .collect()
}

fn cluster_key(point: GeoPoint) -> (i64, i64) {
    (
        (point.longitude * 100.0).round() as i64,
        (point.latitude * 100.0).round() as i64,
    )
}

/// Group points by coordinates rounded to two decimals; largest cluster first.
pub fn cluster_points<I>(points: I) -> Vec<Cluster>
where
    I: IntoIterator<Item = (GeoPoint, RequestStatus, Priority)>,
{
    let mut groups: BTreeMap<(i64, i64), Cluster> = BTreeMap::new();
    for (point, status, priority) in points {
        let key = cluster_key(point);
        let cluster = groups.entry(key).or_insert_with(|| Cluster {
            point: GeoPoint {
                longitude: key.0 as f64 / 100.0,
                latitude: key.1 as f64 / 100.0,
            },
            count: 0,
            status_breakdown: BTreeMap::new(),
            priority_breakdown: BTreeMap::new(),
        });
        cluster.count += 1;
        *cluster
            .status_breakdown
            .entry(status.as_str().to_string())
            .or_insert(0) += 1;
        *cluster
            .priority_breakdown
            .entry(priority.as_str().to_string())
            .or_insert(0) += 1;
    }
    let mut clusters: Vec<Cluster> = groups.into_values().collect();
    // Stable sort keeps key order among equal counts.
    clusters.sort_by(|a, b| b.count.cmp(&a.count));
    clusters
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, h, m, 0).unwrap()
    }

    fn point(latitude: f64, longitude: f64) -> GeoPoint {
        GeoPoint {
            longitude,
            latitude,
        }
    }

    #[test]
    fn time_range_parsing() {
        assert_eq!(TimeRange::parse_lenient(None), TimeRange::LastDay);
        assert_eq!(TimeRange::parse_lenient(Some("1h")), TimeRange::LastHour);
        assert_eq!(TimeRange::parse_lenient(Some("7d")), TimeRange::LastWeek);
        assert_eq!(TimeRange::parse_lenient(Some("30d")), TimeRange::LastMonth);
        assert_eq!(TimeRange::parse_lenient(Some("90d")), TimeRange::LastDay);
        assert_eq!(TimeRange::LastWeek.start(at(12, 0)), at(12, 0) - Duration::days(7));
    }

    #[test]
    fn distributions_include_zero_values() {
        let rows = vec![("pending".to_string(), 3), ("resolved".to_string(), 1)];
        let dist = status_counts(&rows);
        assert_eq!(dist.len(), 4);
        assert_eq!(dist["pending"], 3);
        assert_eq!(dist["in_progress"], 0);
        assert_eq!(dist["canceled"], 0);

        let prio = priority_counts(&[("high".to_string(), 2)]);
        assert_eq!(prio["high"], 2);
        assert_eq!(prio["critical"], 0);
    }

    #[test]
    fn overview_active_matches_distribution() {
        let rows = vec![
            ("pending".to_string(), 4),
            ("in_progress".to_string(), 2),
            ("resolved".to_string(), 5),
            ("canceled".to_string(), 1),
        ];
        let o = overview(&rows, 3, 2, TimeRange::LastDay);
        assert_eq!(o.total_requests, 12);
        assert_eq!(o.active_requests, 6);
        assert_eq!(o.resolved_requests, 5);
        assert_eq!(o.recent_requests, 3);
        assert_eq!(o.recent_resolved_requests, 2);
    }

    #[test]
    fn response_times_round_to_minutes() {
        assert_eq!(response_time_stats(&[]), ResponseTimeStats::default());

        let spans = vec![
            (at(10, 0), at(10, 10)),
            (at(10, 0), at(10, 31)),
            (at(10, 0), at(10, 0) + Duration::seconds(89)),
        ];
        let stats = response_time_stats(&spans);
        assert_eq!(stats.count, 3);
        assert_eq!(stats.min, 1);
        assert_eq!(stats.max, 31);
        // (10 + 31 + 1.4833) / 3 = 14.16
        assert_eq!(stats.avg, 14);
    }

    #[test]
    fn hourly_buckets_sorted_by_date_then_hour() {
        let next_day = Utc.with_ymd_and_hms(2024, 3, 11, 1, 5, 0).unwrap();
        let buckets = hourly_histogram(&[at(23, 50), next_day, at(9, 1), at(23, 5)]);
        assert_eq!(
            buckets,
            vec![
                HourBucket { date: "2024-03-10".into(), hour: 9, count: 1 },
                HourBucket { date: "2024-03-10".into(), hour: 23, count: 2 },
                HourBucket { date: "2024-03-11".into(), hour: 1, count: 1 },
            ]
        );
    }

    #[test]
    fn nearby_points_share_a_cluster() {
        let clusters = cluster_points(vec![
            (point(40.71279, -74.00601), RequestStatus::Pending, Priority::High),
            (point(40.71284, -74.00599), RequestStatus::Resolved, Priority::High),
            (point(51.5, -0.12), RequestStatus::Pending, Priority::Low),
        ]);
        assert_eq!(clusters.len(), 2);
        let nyc = &clusters[0];
        assert_eq!(nyc.count, 2);
        assert_eq!(nyc.point, point(40.71, -74.01));
        assert_eq!(nyc.status_breakdown["pending"], 1);
        assert_eq!(nyc.status_breakdown["resolved"], 1);
        assert_eq!(nyc.priority_breakdown["high"], 2);
        assert!(!nyc.priority_breakdown.contains_key("low"));
        assert_eq!(clusters[1].count, 1);
    }

    #[test]
    fn bounds_parsing() {
        let b = GeoBounds::parse(r#"{"north":41,"south":40,"east":-73,"west":-75}"#).unwrap();
        assert!(b.contains(point(40.7, -74.0)));
        assert!(!b.contains(point(42.0, -74.0)));
        assert!(!b.contains(point(40.7, -72.0)));

        for bad in ["not json", r#"{"north":1}"#, r#"[1,2,3,4]"#, r#"{"north":"a","south":0,"east":0,"west":0}"#] {
            assert!(
                matches!(GeoBounds::parse(bad), Err(DomainError::InvalidBounds { .. })),
                "{bad}"
            );
        }
    }

    #[test]
    fn bounds_across_antimeridian() {
        let b = GeoBounds {
            north: 10.0,
            south: -10.0,
            east: -170.0,
            west: 170.0,
        };
        assert!(b.crosses_antimeridian());
        assert!(b.contains(point(0.0, 175.0)));
        assert!(b.contains(point(0.0, -175.0)));
        assert!(!b.contains(point(0.0, 0.0)));
    }
}
