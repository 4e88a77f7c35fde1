// Outbound duel events for whatever fans snapshots out to clients.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::warn;

use crate::duel::{DuelState, DuelSummary};

/// Emitted after every state change a client should see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum DuelEvent {
    Started { state: DuelState },
    MoveAccepted { user_id: String, state: DuelState },
    HintGranted { user_id: String, state: DuelState },
    Finished { state: DuelState, summary: DuelSummary },
}

impl DuelEvent {
    pub fn match_id(&self) -> &str {
        match self {
            DuelEvent::Started { state }
            | DuelEvent::MoveAccepted { state, .. }
            | DuelEvent::HintGranted { state, .. }
            | DuelEvent::Finished { state, .. } => &state.match_id,
        }
    }
}

#[async_trait]
pub trait Broadcaster: Send + Sync {
    async fn publish(&self, event: DuelEvent);
}

/// Discards every event.
pub struct NullBroadcaster;

#[async_trait]
impl Broadcaster for NullBroadcaster {
    async fn publish(&self, _event: DuelEvent) {}
}

/// Forwards events into an mpsc channel. A closed receiver is logged and
/// otherwise ignored; the engine never fails an operation over delivery.
pub struct ChannelBroadcaster {
    tx: mpsc::Sender<DuelEvent>,
}

impl ChannelBroadcaster {
    pub fn new(tx: mpsc::Sender<DuelEvent>) -> Self {
        ChannelBroadcaster { tx }
    }
}

#[async_trait]
impl Broadcaster for ChannelBroadcaster {
    async fn publish(&self, event: DuelEvent) {
        let match_id = event.match_id().to_string();
        if self.tx.send(event).await.is_err() {
            warn!("Event receiver dropped; discarding event for match {match_id}");
        }
    }
}
