use std::sync::Arc;

use axum::extract::ws::Utf8Bytes;
use modkit::RoomRegistry;
use tracing::debug;

use crate::api::rest::dto::{RequestSummaryDto, RequestUpdatedDto};
use crate::api::rest::live::{encode_frame, OPERATOR_ROOM};
use crate::domain::events::RequestEvent;
use crate::domain::ports::EventPublisher;

/// Adapter: domain lifecycle events -> operator room frames.
pub struct OperatorRoomPublisher {
    rooms: Arc<RoomRegistry<Utf8Bytes>>,
}

impl OperatorRoomPublisher {
    pub fn new(rooms: Arc<RoomRegistry<Utf8Bytes>>) -> Self {
        Self { rooms }
    }
}

fn frame(event: &RequestEvent) -> Option<Utf8Bytes> {
    match event {
        RequestEvent::Created(request) => {
            encode_frame("request-created", RequestSummaryDto::from(request))
        }
        RequestEvent::Updated {
            id,
            status,
            notes,
            assigned_to,
            updated_at,
        } => encode_frame(
            "request-updated",
            RequestUpdatedDto {
                id: id.to_string(),
                status: status.as_str().to_string(),
                notes: notes.clone(),
                assigned_to: assigned_to.clone(),
                updated_at: *updated_at,
            },
        ),
    }
}

impl EventPublisher<RequestEvent> for OperatorRoomPublisher {
    fn publish(&self, event: &RequestEvent) {
        // Encoded once; every member gets a clone of the same buffer
        let Some(text) = frame(event) else {
            return;
        };
        let report = self.rooms.publish(OPERATOR_ROOM, text);
        debug!(delivered = report.delivered, "lifecycle event fanned out");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::model::{
        EmergencyRequest, GeoPoint, Priority, RequestId, RequestStatus,
    };
    use chrono::Utc;
    use modkit::SessionId;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    fn request() -> EmergencyRequest {
        let now = Utc::now();
        EmergencyRequest {
            id: RequestId::generate(),
            full_name: "Jane Doe".into(),
            phone_number: "+15551234567".into(),
            location: GeoPoint {
                longitude: -74.0,
                latitude: 40.7,
            },
            address: None,
            status: RequestStatus::Pending,
            priority: Priority::High,
            notes: None,
            assigned_to: None,
            response_time: None,
            resolved_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn created_reaches_joined_sessions_only() {
        let rooms = Arc::new(RoomRegistry::new());
        let publisher = OperatorRoomPublisher::new(rooms.clone());

        let (tx, mut rx) = mpsc::channel(4);
        rooms.join(OPERATOR_ROOM, SessionId::new_v4(), tx);

        let req = request();
        publisher.publish(&RequestEvent::Created(req.clone()));

        let (late_tx, mut late_rx) = mpsc::channel(4);
        rooms.join(OPERATOR_ROOM, SessionId::new_v4(), late_tx);

        let frame: serde_json::Value =
            serde_json::from_str(rx.recv().await.unwrap().as_str()).unwrap();
        assert_eq!(frame["event"], "request-created");
        assert_eq!(frame["data"]["id"], req.id.to_string());
        assert_eq!(frame["data"]["location"]["type"], "Point");
        assert!(frame["data"].get("notes").is_none());

        assert!(timeout(Duration::from_millis(50), late_rx.recv())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn updated_carries_changed_fields() {
        let rooms = Arc::new(RoomRegistry::new());
        let publisher = OperatorRoomPublisher::new(rooms.clone());
        let (tx, mut rx) = mpsc::channel(4);
        rooms.join(OPERATOR_ROOM, SessionId::new_v4(), tx);

        let mut req = request();
        req.status = RequestStatus::InProgress;
        req.assigned_to = Some("Unit 7".into());
        publisher.publish(&RequestEvent::updated(&req));

        let frame: serde_json::Value =
            serde_json::from_str(rx.recv().await.unwrap().as_str()).unwrap();
        assert_eq!(frame["event"], "request-updated");
        assert_eq!(frame["data"]["status"], "in_progress");
        assert_eq!(frame["data"]["assignedTo"], "Unit 7");
        assert!(frame["data"]["updatedAt"].is_string());
    }

    #[test]
    fn publishing_to_empty_room_is_a_no_op() {
        let publisher = OperatorRoomPublisher::new(Arc::new(RoomRegistry::new()));
        publisher.publish(&RequestEvent::Created(request()));
    }
}
