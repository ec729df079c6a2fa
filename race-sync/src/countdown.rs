//! Client-side countdown scheduling.
//!
//! There is no authoritative server, so every client that observes the
//! countdown arms its own timer and races to commit the same transition.
//! The transition patch is derived from `countdownStartedAt`, so concurrent
//! commits are value-identical and order does not matter.

use crate::coordinator::try_start_race;
use race_core::race_start_time;
use race_store::RoomStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Debug, Default)]
pub struct CountdownTimer {
    handle: Option<JoinHandle<()>>,
}

impl CountdownTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a timer that fires at the deterministic race start instant and
    /// attempts the countdown -> racing transition. Re-arming replaces any
    /// timer already pending.
    pub fn schedule(
        &mut self,
        store: Arc<dyn RoomStore>,
        room_id: String,
        countdown_started_at: i64,
        now_millis: i64,
    ) {
        self.cancel();

        let deadline = race_start_time(countdown_started_at);
        let wait = Duration::from_millis(deadline.saturating_sub(now_millis).max(0) as u64);
        debug!(room_id, deadline, "countdown armed");

        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(wait).await;
            // The deadline is the observed clock here, so the transition is
            // the same value on every client that fires.
            match try_start_race(store.as_ref(), &room_id, deadline).await {
                Ok(true) => debug!(room_id, "race transition committed"),
                Ok(false) => debug!(room_id, "race transition already applied"),
                Err(err) => warn!(room_id, %err, "race transition failed"),
            }
        }));
    }

    pub fn is_armed(&self) -> bool {
        self.handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Disarm without firing. Safe to call when nothing is pending.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
