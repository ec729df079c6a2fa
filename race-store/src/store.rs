//! The abstract shared room store: a document-oriented service supporting
//! atomic field-path patches and push-based subscription. Backend-agnostic;
//! the in-memory implementation lives in [`crate::memory`].

use crate::document::Patch;
use async_trait::async_trait;
use race_types::{RaceError, RaceRoom, RoomId};
use thiserror::Error;
use tokio::sync::broadcast;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("room {room_id} not found")]
    NotFound { room_id: RoomId },

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("malformed room document: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<StoreError> for RaceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { room_id } => RaceError::RoomNotFound { room_id },
            other => RaceError::StoreUnavailable(other.to_string()),
        }
    }
}

/// One document version pushed to subscribers. `None` means the document no
/// longer exists.
pub type RoomSnapshot = Option<RaceRoom>;

/// A live subscription to one room document.
///
/// Every committed document version is pushed in order. Unsubscribing is
/// explicit and idempotent; after it, `next` returns `None` immediately.
#[derive(Debug)]
pub struct RoomSubscription {
    /// The document version at subscription time, delivered before any
    /// pushed update so a new subscriber always sees the current state.
    initial: Option<RoomSnapshot>,
    rx: Option<broadcast::Receiver<RoomSnapshot>>,
}

impl RoomSubscription {
    pub(crate) fn new(initial: RoomSnapshot, rx: broadcast::Receiver<RoomSnapshot>) -> Self {
        Self {
            initial: Some(initial),
            rx: Some(rx),
        }
    }

    /// Wait for the next document version. Returns `None` once unsubscribed
    /// or when the document's channel is closed. A slow subscriber that lags
    /// behind skips to the newest versions rather than failing. A version
    /// committed while the subscription was being opened may be observed
    /// twice; snapshot consumers are derived-state reducers, so replays are
    /// harmless.
    pub async fn next(&mut self) -> Option<RoomSnapshot> {
        if self.rx.is_some() {
            if let Some(initial) = self.initial.take() {
                return Some(initial);
            }
        }
        let rx = self.rx.as_mut()?;
        loop {
            match rx.recv().await {
                Ok(snapshot) => return Some(snapshot),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "room subscription lagged, skipping to latest");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Stop receiving snapshots. Safe to call repeatedly.
    pub fn unsubscribe(&mut self) {
        self.rx = None;
        self.initial = None;
    }

    pub fn is_active(&self) -> bool {
        self.rx.is_some()
    }
}

/// Shared room store contract: create, read, patch, exists, subscribe.
///
/// Every operation is a suspension point; failures surface to the caller and
/// are never retried internally. Patches are atomic per document with
/// last-write-wins field semantics; the store performs no authorization.
#[async_trait]
pub trait RoomStore: Send + Sync {
    /// Persist a new room, assign it a unique id, and return that id.
    async fn create(&self, room: &RaceRoom) -> Result<RoomId, StoreError>;

    async fn read(&self, room_id: &str) -> Result<Option<RaceRoom>, StoreError>;

    /// Partial update; unspecified fields untouched; delete-marker removes.
    async fn patch(&self, room_id: &str, patch: Patch) -> Result<(), StoreError>;

    async fn exists(&self, room_id: &str) -> Result<bool, StoreError>;

    /// Open a push subscription for every future version of the document.
    async fn subscribe(&self, room_id: &str) -> Result<RoomSubscription, StoreError>;
}
