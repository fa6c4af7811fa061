use sea_orm::Set;

use crate::contract::model::{EmergencyRequest, GeoPoint, Priority, RequestId, RequestStatus};
use crate::infra::storage::entity::{ActiveModel, Model};

pub(crate) fn status_from_stored(id: &str, raw: &str) -> RequestStatus {
    raw.parse().unwrap_or_else(|unknown| {
        tracing::warn!(request_id = %id, status = %unknown, "unknown stored status, treating as pending");
        RequestStatus::Pending
    })
}

pub(crate) fn priority_from_stored(id: &str, raw: &str) -> Priority {
    raw.parse().unwrap_or_else(|unknown| {
        tracing::warn!(request_id = %id, priority = %unknown, "unknown stored priority, treating as high");
        Priority::High
    })
}

impl From<Model> for EmergencyRequest {
    fn from(m: Model) -> Self {
        let status = status_from_stored(&m.id, &m.status);
        let priority = priority_from_stored(&m.id, &m.priority);
        Self {
            id: RequestId::from_stored(m.id),
            full_name: m.full_name,
            phone_number: m.phone_number,
            location: GeoPoint {
                longitude: m.longitude,
                latitude: m.latitude,
            },
            address: m.address,
            status,
            priority,
            notes: m.notes,
            assigned_to: m.assigned_to,
            response_time: m.response_time,
            resolved_at: m.resolved_at,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Build an insertable row from a domain request.
pub fn to_active_model(r: &EmergencyRequest) -> ActiveModel {
    ActiveModel {
        id: Set(r.id.to_string()),
        full_name: Set(r.full_name.clone()),
        phone_number: Set(r.phone_number.clone()),
        longitude: Set(r.location.longitude),
        latitude: Set(r.location.latitude),
        address: Set(r.address.clone()),
        status: Set(r.status.as_str().to_string()),
        priority: Set(r.priority.as_str().to_string()),
        notes: Set(r.notes.clone()),
        assigned_to: Set(r.assigned_to.clone()),
        response_time: Set(r.response_time),
        resolved_at: Set(r.resolved_at),
        created_at: Set(r.created_at),
        updated_at: Set(r.updated_at),
    }
}
