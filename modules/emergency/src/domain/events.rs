use chrono::{DateTime, Utc};

use crate::contract::model::{EmergencyRequest, RequestId, RequestStatus};

/// Transport-agnostic lifecycle event, published after the write succeeded.
#[derive(Debug, Clone)]
pub enum RequestEvent {
    Created(EmergencyRequest),
    Updated {
        id: RequestId,
        status: RequestStatus,
        notes: Option<String>,
        assigned_to: Option<String>,
        updated_at: DateTime<Utc>,
    },
}

impl RequestEvent {
    pub fn updated(request: &EmergencyRequest) -> Self {
        Self::Updated {
            id: request.id.clone(),
            status: request.status,
            notes: request.notes.clone(),
            assigned_to: request.assigned_to.clone(),
            updated_at: request.updated_at,
        }
    }
}
