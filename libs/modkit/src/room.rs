//! Publish/subscribe registry keyed by room name.
//!
//! Members register the sending half of their own bounded outbound channel.
//! Publishing walks the members present at call time and uses `try_send`, so
//! it never waits on a slow session: a full buffer drops the message for that
//! session and a closed channel removes the member.

use dashmap::DashMap;
use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

/// Identifier of one live session.
pub type SessionId = Uuid;

/// Outcome of a single publish.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub delivered: usize,
    /// Members whose buffer was full.
    pub dropped: usize,
    /// Members whose channel was closed; they are no longer in the room.
    pub pruned: usize,
}

type Members<T> = DashMap<SessionId, mpsc::Sender<T>>;

pub struct RoomRegistry<T> {
    rooms: DashMap<String, Members<T>>,
}

impl<T> Default for RoomRegistry<T> {
    fn default() -> Self {
        Self {
            rooms: DashMap::new(),
        }
    }
}

impl<T: Clone + Send + 'static> RoomRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `session` to `room`. Returns false if it was already a member
    /// (its sender is replaced).
    pub fn join(&self, room: &str, session: SessionId, outbound: mpsc::Sender<T>) -> bool {
        self.rooms
            .entry(room.to_string())
            .or_default()
            .insert(session, outbound)
            .is_none()
    }

    /// Remove `session` from `room`. Returns true if it was a member.
    pub fn leave(&self, room: &str, session: SessionId) -> bool {
        let removed = self
            .rooms
            .get(room)
            .map(|members| members.remove(&session).is_some())
            .unwrap_or(false);
        self.rooms.remove_if(room, |_, members| members.is_empty());
        removed
    }

    pub fn is_member(&self, room: &str, session: SessionId) -> bool {
        self.rooms
            .get(room)
            .map(|members| members.contains_key(&session))
            .unwrap_or(false)
    }

    pub fn member_count(&self, room: &str) -> usize {
        self.rooms.get(room).map(|m| m.len()).unwrap_or(0)
    }

    /// Deliver `message` to every current member of `room`.
    pub fn publish(&self, room: &str, message: T) -> PublishReport {
        self.deliver(room, None, message)
    }

    /// Deliver `message` to every current member of `room` except `sender`.
    pub fn publish_except(&self, room: &str, sender: SessionId, message: T) -> PublishReport {
        self.deliver(room, Some(sender), message)
    }

    fn deliver(&self, room: &str, skip: Option<SessionId>, message: T) -> PublishReport {
        let mut report = PublishReport::default();
        let Some(members) = self.rooms.get(room) else {
            return report;
        };

        let mut closed = Vec::new();
        for member in members.iter() {
            if Some(*member.key()) == skip {
                continue;
            }
            match member.value().try_send(message.clone()) {
                Ok(()) => report.delivered += 1,
                Err(TrySendError::Full(_)) => report.dropped += 1,
                Err(TrySendError::Closed(_)) => closed.push(*member.key()),
            }
        }

        // Removal must wait until the iterator has released its shard locks.
        for session in closed {
            if members.remove(&session).is_some() {
                report.pruned += 1;
            }
        }

        if report.dropped > 0 || report.pruned > 0 {
            tracing::debug!(
                room,
                delivered = report.delivered,
                dropped = report.dropped,
                pruned = report.pruned,
                "room publish incomplete"
            );
        }
        report
    }
}
