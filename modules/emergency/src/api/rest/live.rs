//! Live operator channel over WebSocket.
//!
//! Client frames: `{"type":"join-operator-room"}`, `{"type":"leave-operator-room"}`,
//! `{"type":"ping"}`. Server frames: `{"event": <name>, "data": <payload>}`.
//!
//! Each session owns a bounded outbound channel drained by a writer task.
//! The operator room holds the sending half while the session is joined, so
//! lifecycle events reach it without ever waiting on its socket.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, Utf8Bytes, WebSocket},
        WebSocketUpgrade,
    },
    response::Response,
    Extension,
};
use chrono::{DateTime, Utc};
use futures::{SinkExt, StreamExt};
use modkit::{RoomRegistry, SessionId};
use operators::{model::Admin, CurrentAdmin};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Room every joined operator session belongs to.
pub const OPERATOR_ROOM: &str = "operators";

/// Shared by the WebSocket handler and the lifecycle event publisher.
#[derive(Clone)]
pub struct LiveState {
    pub rooms: Arc<RoomRegistry<Utf8Bytes>>,
    pub session_buffer: usize,
}

impl LiveState {
    pub fn new(session_buffer: usize) -> Self {
        Self {
            rooms: Arc::new(RoomRegistry::new()),
            session_buffer: session_buffer.max(1),
        }
    }
}

#[derive(Serialize)]
struct Frame<'a, T> {
    event: &'a str,
    data: T,
}

/// Encode one server frame. Serialization failures are logged and skipped.
pub fn encode_frame<T: Serialize>(event: &str, data: T) -> Option<Utf8Bytes> {
    match serde_json::to_string(&Frame { event, data }) {
        Ok(text) => Some(text.into()),
        Err(e) => {
            warn!(event, error = %e, "failed to encode live frame");
            None
        }
    }
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "kebab-case")]
enum ClientFrame {
    JoinOperatorRoom,
    LeaveOperatorRoom,
    Ping,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Joined<'a> {
    message: &'a str,
    session_id: SessionId,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Presence {
    session_id: SessionId,
    timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
struct Pong {
    timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
struct ErrorFrame<'a> {
    message: &'a str,
}

/// Upgrade an authenticated operator to a live session
#[utoipa::path(
    get,
    path = "/api/ws",
    tag = "live",
    params(("token" = Option<String>, Query, description = "Bearer token for clients that cannot set headers")),
    responses(
        (status = 101, description = "Switching to the WebSocket protocol"),
        (status = 401, description = "Missing, expired or invalid token", body = modkit::ErrorBody),
    ),
    security(("bearer" = []))
)]
pub async fn connect(
    CurrentAdmin(admin): CurrentAdmin,
    Extension(live): Extension<LiveState>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| run_session(socket, admin, live))
}

async fn run_session(socket: WebSocket, admin: Admin, live: LiveState) {
    let session = SessionId::new_v4();
    let (mut sink, mut stream) = socket.split();
    let (outbound, mut queue) = mpsc::channel::<Utf8Bytes>(live.session_buffer);
    info!(session_id = %session, admin_id = %admin.id, "live session opened");

    let mut writer = tokio::spawn(async move {
        while let Some(text) = queue.recv().await {
            if sink.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    let mut session_state = Session {
        id: session,
        live: &live,
        outbound: &outbound,
        joined: false,
    };

    loop {
        tokio::select! {
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Text(text))) => session_state.handle(text.as_str()),
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!(session_id = %session, error = %e, "live socket read failed");
                    break;
                }
            },
            _ = &mut writer => break,
        }
    }

    session_state.leave();
    writer.abort();
    info!(session_id = %session, admin_id = %admin.id, "live session closed");
}

struct Session<'a> {
    id: SessionId,
    live: &'a LiveState,
    outbound: &'a mpsc::Sender<Utf8Bytes>,
    joined: bool,
}

impl Session<'_> {
    fn handle(&mut self, text: &str) {
        match serde_json::from_str::<ClientFrame>(text) {
            Ok(ClientFrame::JoinOperatorRoom) => self.join(),
            Ok(ClientFrame::LeaveOperatorRoom) => self.leave(),
            Ok(ClientFrame::Ping) => self.reply("pong", Pong { timestamp: Utc::now() }),
            Err(e) => {
                debug!(session_id = %self.id, error = %e, "unrecognized live frame");
                self.reply(
                    "error",
                    ErrorFrame {
                        message: "Unrecognized message",
                    },
                );
            }
        }
    }

    fn join(&mut self) {
        let fresh = self
            .live
            .rooms
            .join(OPERATOR_ROOM, self.id, self.outbound.clone());
        self.joined = true;
        self.reply(
            "operator-joined",
            Joined {
                message: "Successfully joined operator room",
                session_id: self.id,
            },
        );
        if fresh {
            self.broadcast("operator-connected");
            debug!(
                session_id = %self.id,
                members = self.live.rooms.member_count(OPERATOR_ROOM),
                "joined operator room"
            );
        }
    }

    /// Presence is only announced for sessions that were in the room.
    fn leave(&mut self) {
        if std::mem::take(&mut self.joined) && self.live.rooms.leave(OPERATOR_ROOM, self.id) {
            self.broadcast("operator-disconnected");
        }
    }

    fn broadcast(&self, event: &str) {
        if let Some(frame) = encode_frame(
            event,
            Presence {
                session_id: self.id,
                timestamp: Utc::now(),
            },
        ) {
            self.live.rooms.publish_except(OPERATOR_ROOM, self.id, frame);
        }
    }

    fn reply<T: Serialize>(&self, event: &str, data: T) {
        if let Some(frame) = encode_frame(event, data) {
            if self.outbound.try_send(frame).is_err() {
                debug!(session_id = %self.id, event, "reply dropped, session buffer full");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn decode(frame: Utf8Bytes) -> Value {
        serde_json::from_str(frame.as_str()).unwrap()
    }

    fn session<'a>(live: &'a LiveState, outbound: &'a mpsc::Sender<Utf8Bytes>) -> Session<'a> {
        Session {
            id: SessionId::new_v4(),
            live,
            outbound,
            joined: false,
        }
    }

    #[test]
    fn client_frames_parse() {
        let parse = |s: &str| serde_json::from_str::<ClientFrame>(s).ok();
        assert_eq!(
            parse(r#"{"type":"join-operator-room"}"#),
            Some(ClientFrame::JoinOperatorRoom)
        );
        assert_eq!(parse(r#"{"type":"ping"}"#), Some(ClientFrame::Ping));
        assert_eq!(parse(r#"{"type":"dance"}"#), None);
    }

    #[tokio::test]
    async fn join_acks_and_announces_to_others() {
        let live = LiveState::new(8);
        let (tx_a, mut rx_a) = mpsc::channel(8);
        let (tx_b, mut rx_b) = mpsc::channel(8);
        let mut a = session(&live, &tx_a);
        let mut b = session(&live, &tx_b);

        a.handle(r#"{"type":"join-operator-room"}"#);
        let ack = decode(rx_a.recv().await.unwrap());
        assert_eq!(ack["event"], "operator-joined");
        assert_eq!(ack["data"]["sessionId"], a.id.to_string());

        b.handle(r#"{"type":"join-operator-room"}"#);
        let seen_by_a = decode(rx_a.recv().await.unwrap());
        assert_eq!(seen_by_a["event"], "operator-connected");
        assert_eq!(seen_by_a["data"]["sessionId"], b.id.to_string());
        assert_eq!(decode(rx_b.recv().await.unwrap())["event"], "operator-joined");

        b.leave();
        let gone = decode(rx_a.recv().await.unwrap());
        assert_eq!(gone["event"], "operator-disconnected");
        assert!(!b.joined);
    }

    #[tokio::test]
    async fn leaving_without_joining_is_silent() {
        let live = LiveState::new(8);
        let (tx_a, mut rx_a) = mpsc::channel(8);
        let (tx_b, _rx_b) = mpsc::channel(8);
        let mut a = session(&live, &tx_a);
        a.handle(r#"{"type":"join-operator-room"}"#);
        let _ack = rx_a.recv().await;

        session(&live, &tx_b).handle(r#"{"type":"leave-operator-room"}"#);
        assert!(rx_a.try_recv().is_err());
    }

    #[tokio::test]
    async fn ping_and_garbage() {
        let live = LiveState::new(8);
        let (tx, mut rx) = mpsc::channel(8);
        let mut s = session(&live, &tx);

        s.handle(r#"{"type":"ping"}"#);
        assert_eq!(decode(rx.recv().await.unwrap())["event"], "pong");

        s.handle("not json");
        let err = decode(rx.recv().await.unwrap());
        assert_eq!(err["event"], "error");
        assert_eq!(live.rooms.member_count(OPERATOR_ROOM), 0);
    }
}
