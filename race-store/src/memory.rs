//! In-process `RoomStore` backed by a concurrent map of JSON documents.
//!
//! Each document slot carries a broadcast channel; every committed patch
//! bumps the version and fans the full snapshot out to all subscribers.
//! Patch application holds the slot entry, which is what makes a patch
//! atomic relative to other writers of the same room.

use crate::document::Patch;
use crate::store::{RoomSnapshot, RoomStore, RoomSubscription, StoreError};
use async_trait::async_trait;
use dashmap::DashMap;
use race_types::{RaceRoom, RoomId};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, info};
use uuid::Uuid;

const SNAPSHOT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug)]
struct RoomSlot {
    doc: Value,
    version: u64,
    tx: broadcast::Sender<RoomSnapshot>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    rooms: DashMap<RoomId, RoomSlot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    fn decode(doc: &Value) -> Result<RaceRoom, StoreError> {
        Ok(serde_json::from_value(doc.clone())?)
    }
}

#[async_trait]
impl RoomStore for MemoryStore {
    async fn create(&self, room: &RaceRoom) -> Result<RoomId, StoreError> {
        let room_id = Uuid::new_v4().to_string();
        let mut doc = serde_json::to_value(room)?;
        // The store owns id assignment, mirroring create-then-write-id
        doc["id"] = Value::String(room_id.clone());

        let (tx, _) = broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY);
        self.rooms.insert(
            room_id.clone(),
            RoomSlot {
                doc,
                version: 1,
                tx,
            },
        );
        info!(room_id, "created room document");
        Ok(room_id)
    }

    async fn read(&self, room_id: &str) -> Result<Option<RaceRoom>, StoreError> {
        match self.rooms.get(room_id) {
            Some(slot) => Ok(Some(Self::decode(&slot.doc)?)),
            None => Ok(None),
        }
    }

    async fn patch(&self, room_id: &str, patch: Patch) -> Result<(), StoreError> {
        let mut emptied = false;
        {
            let mut slot = self.rooms.get_mut(room_id).ok_or(StoreError::NotFound {
                room_id: room_id.to_string(),
            })?;

            patch.apply(&mut slot.doc);
            slot.version += 1;
            debug!(room_id, version = slot.version, "applied patch");

            let players_empty = slot
                .doc
                .get("players")
                .and_then(Value::as_object)
                .map(|m| m.is_empty())
                .unwrap_or(true);

            if players_empty {
                emptied = true;
            } else {
                let snapshot = Self::decode(&slot.doc)?;
                let _ = slot.tx.send(Some(snapshot));
            }
        }

        // A room with no players left is destroyed implicitly
        if emptied {
            if let Some((_, slot)) = self.rooms.remove(room_id) {
                info!(room_id, "room emptied, deleting document");
                let _ = slot.tx.send(None);
            }
        }
        Ok(())
    }

    async fn exists(&self, room_id: &str) -> Result<bool, StoreError> {
        Ok(self.rooms.contains_key(room_id))
    }

    async fn subscribe(&self, room_id: &str) -> Result<RoomSubscription, StoreError> {
        let slot = self.rooms.get(room_id).ok_or(StoreError::NotFound {
            room_id: room_id.to_string(),
        })?;
        let initial = Some(Self::decode(&slot.doc)?);
        Ok(RoomSubscription::new(initial, slot.tx.subscribe()))
    }
}
