//! Per-client orchestration of one room: lifecycle operations, the snapshot
//! reducer that drives the local view, and the countdown/finish transitions
//! that any observing client may commit.

use crate::config::SyncConfig;
use crate::countdown::CountdownTimer;
use crate::progress::{ProgressReporter, RaceProgress};
use race_core::{
    can_join, can_restart, can_start_countdown, can_start_race, next, on_local_finish,
    on_status_change, race_start_time, RaceEvent, ViewState,
};
use race_store::{Patch, RoomSnapshot, RoomStore, RoomSubscription};
use race_types::{Player, RaceError, RaceRoom, RoomStatus};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Room ids are shared over voice or chat; strip every whitespace character a
/// paste might carry, interior included.
pub fn normalize_room_id(raw: &str) -> String {
    raw.split_whitespace().collect()
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Commit the countdown -> racing transition if the deadline has passed.
///
/// Callable by any client. `startedAt` is derived from `countdownStartedAt`,
/// never from the caller's clock, so every writer produces the same patch and
/// duplicates are no-op writes. Returns whether this call performed the
/// transition.
pub async fn try_start_race(
    store: &dyn RoomStore,
    room_id: &str,
    now_millis: i64,
) -> Result<bool, RaceError> {
    let room = store.read(room_id).await.map_err(RaceError::from)?;
    let Some(room) = room else {
        return Err(RaceError::RoomNotFound {
            room_id: room_id.to_string(),
        });
    };
    if !can_start_race(&room, now_millis) {
        return Ok(false);
    }
    let Some(countdown_started_at) = room.countdown_started_at else {
        return Ok(false);
    };
    let Some(racing) = next(room.status, RaceEvent::CountdownElapsed) else {
        return Ok(false);
    };

    store
        .patch(
            room_id,
            Patch::new()
                .set("status", racing)
                .set("startedAt", race_start_time(countdown_started_at)),
        )
        .await
        .map_err(RaceError::from)?;
    info!(room_id, "race started");
    Ok(true)
}

/// One client's handle on a shared race room.
///
/// All mutations flow through the store; all reads of shared state come from
/// the subscription's snapshot stream. The coordinator itself holds only
/// derived local state (view, throttle, the last observed snapshot).
pub struct RaceCoordinator {
    store: Arc<dyn RoomStore>,
    config: SyncConfig,
    player_id: String,
    player_name: String,
    room_id: Option<String>,
    subscription: Option<RoomSubscription>,
    countdown: CountdownTimer,
    reporter: ProgressReporter,
    view: ViewState,
    last_status: Option<RoomStatus>,
    latest: Option<RaceRoom>,
}

impl RaceCoordinator {
    pub fn new(
        store: Arc<dyn RoomStore>,
        config: SyncConfig,
        player_id: String,
        player_name: String,
    ) -> Self {
        let reporter = ProgressReporter::new(config.progress_throttle_ms);
        Self {
            store,
            config,
            player_id,
            player_name,
            room_id: None,
            subscription: None,
            countdown: CountdownTimer::new(),
            reporter,
            view: ViewState::Menu,
            last_status: None,
            latest: None,
        }
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn room_id(&self) -> Option<&str> {
        self.room_id.as_deref()
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    /// The most recent room snapshot observed through `next_snapshot`.
    pub fn room(&self) -> Option<&RaceRoom> {
        self.latest.as_ref()
    }

    /// Create a room with this client as creator and enter its lobby.
    pub async fn create_room(&mut self, text: String) -> Result<String, RaceError> {
        let now = now_millis();
        let creator = Player::new(self.player_id.clone(), self.player_name.clone(), now);
        let mut players = HashMap::new();
        players.insert(creator.id.clone(), creator);

        let room = RaceRoom {
            id: String::new(),
            creator_id: self.player_id.clone(),
            text,
            status: RoomStatus::Waiting,
            players,
            created_at: now,
            countdown_started_at: None,
            started_at: None,
            max_players: self.config.max_players,
            selected_text: None,
        };

        let room_id = self.store.create(&room).await.map_err(RaceError::from)?;
        self.enter(room_id.clone()).await?;
        info!(room_id, player_id = self.player_id, "created room");
        Ok(room_id)
    }

    /// Join an existing room by its (possibly whitespace-mangled) id.
    pub async fn join_room(&mut self, raw_room_id: &str) -> Result<(), RaceError> {
        let room_id = normalize_room_id(raw_room_id);
        let room = self.store.read(&room_id).await.map_err(RaceError::from)?;
        let Some(room) = room else {
            return Err(RaceError::RoomNotFound { room_id });
        };
        can_join(&room)?;

        let player = Player::new(self.player_id.clone(), self.player_name.clone(), now_millis());
        self.store
            .patch(
                &room_id,
                Patch::new().set(format!("players.{}", player.id), &player),
            )
            .await
            .map_err(RaceError::from)?;
        self.enter(room_id.clone()).await?;
        info!(room_id, player_id = self.player_id, "joined room");
        Ok(())
    }

    pub async fn room_exists(&self, raw_room_id: &str) -> Result<bool, RaceError> {
        let room_id = normalize_room_id(raw_room_id);
        Ok(self.store.exists(&room_id).await.map_err(RaceError::from)?)
    }

    async fn enter(&mut self, room_id: String) -> Result<(), RaceError> {
        let subscription = self
            .store
            .subscribe(&room_id)
            .await
            .map_err(RaceError::from)?;
        self.subscription = Some(subscription);
        self.room_id = Some(room_id);
        self.view = ViewState::Lobby;
        self.last_status = None;
        self.latest = None;
        self.reporter.reset();
        Ok(())
    }

    /// Creator-only: move the lobby into the countdown.
    pub async fn start_countdown(&mut self) -> Result<(), RaceError> {
        let room_id = self.require_room()?;
        let room = self.read_room(&room_id).await?;
        can_start_countdown(&room, &self.player_id, self.config.min_players)?;
        let Some(countdown) = next(room.status, RaceEvent::CountdownStarted) else {
            return Err(RaceError::RaceAlreadyStarted);
        };

        let now = now_millis();
        self.store
            .patch(
                &room_id,
                Patch::new()
                    .set("status", countdown)
                    .set("countdownStartedAt", now),
            )
            .await
            .map_err(RaceError::from)?;
        info!(room_id, "countdown started");
        Ok(())
    }

    /// Publish typing progress for this client. Best-effort: a throttled or
    /// failed write is dropped, the next report carries the fresh totals.
    pub async fn report_progress(
        &mut self,
        input: &str,
        elapsed_seconds: u64,
    ) -> Result<(), RaceError> {
        let room_id = self.require_room()?;
        let Some(text) = self.latest.as_ref().map(|r| r.text.clone()) else {
            return Err(RaceError::NotInRoom);
        };

        let report = RaceProgress::compute(input, &text, elapsed_seconds, now_millis());
        let Some(report) = self.reporter.prepare(report, Instant::now()) else {
            return Ok(());
        };

        let patch = report.to_patch(&self.player_id);
        if let Err(err) = self.store.patch(&room_id, patch).await {
            warn!(room_id, %err, "dropping progress report");
            return Ok(());
        }
        if report.is_finished {
            debug!(room_id, player_id = self.player_id, "finished race");
            self.view = on_local_finish(self.view);
        }
        Ok(())
    }

    /// Ack (or retract) readiness for a rematch.
    pub async fn set_ready(&mut self, ready: bool) -> Result<(), RaceError> {
        let room_id = self.require_room()?;
        self.store
            .patch(
                &room_id,
                Patch::new().set(format!("players.{}.isReady", self.player_id), ready),
            )
            .await
            .map_err(RaceError::from)?;
        Ok(())
    }

    /// Creator-only rematch: new text, lobby status, every player's race
    /// fields reset in a single atomic patch.
    pub async fn restart_race(&mut self, new_text: String) -> Result<(), RaceError> {
        let room_id = self.require_room()?;
        let room = self.read_room(&room_id).await?;
        can_restart(&room, &self.player_id)?;
        let Some(waiting) = next(room.status, RaceEvent::RestartIssued) else {
            return Err(RaceError::RaceAlreadyStarted);
        };

        let mut patch = Patch::new()
            .set("status", waiting)
            .set("text", new_text)
            .delete("countdownStartedAt")
            .delete("startedAt");
        for id in room.players.keys() {
            patch = patch
                .set(format!("players.{id}.progress"), 0u32)
                .set(format!("players.{id}.wpm"), 0u32)
                .set(format!("players.{id}.accuracy"), 100u32)
                .set(format!("players.{id}.isFinished"), false)
                .set(format!("players.{id}.isReady"), false)
                .delete(format!("players.{id}.finishTime"));
        }

        self.store
            .patch(&room_id, patch)
            .await
            .map_err(RaceError::from)?;
        info!(room_id, "race restarted");
        Ok(())
    }

    /// Leave the current room. Removing the last player destroys the room in
    /// the store; a room already gone is treated as left.
    pub async fn leave_room(&mut self) -> Result<(), RaceError> {
        let Some(room_id) = self.room_id.take() else {
            return Ok(());
        };
        if let Some(mut subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        self.countdown.cancel();
        self.latest = None;
        self.last_status = None;
        self.view = ViewState::Menu;

        let patch = Patch::new().delete(format!("players.{}", self.player_id));
        match self.store.patch(&room_id, patch).await {
            Ok(()) => {}
            Err(race_store::StoreError::NotFound { .. }) => {}
            Err(err) => return Err(err.into()),
        }
        info!(room_id, player_id = self.player_id, "left room");
        Ok(())
    }

    /// Wait for the next room snapshot and fold it into local state.
    ///
    /// Returns `Some(None)` when the room was destroyed, `None` once there is
    /// no live subscription.
    pub async fn next_snapshot(&mut self) -> Option<RoomSnapshot> {
        let snapshot = self.subscription.as_mut()?.next().await?;
        match &snapshot {
            Some(room) => {
                let room = room.clone();
                self.observe(room).await;
            }
            None => {
                self.subscription = None;
                self.room_id = None;
                self.countdown.cancel();
                self.latest = None;
                self.last_status = None;
                self.view = ViewState::Menu;
            }
        }
        Some(snapshot)
    }

    async fn observe(&mut self, room: RaceRoom) {
        let status = room.status;
        if self.last_status != Some(status) {
            self.view = on_status_change(self.view, status);
            match status {
                RoomStatus::Waiting => self.reporter.reset(),
                RoomStatus::Countdown => {
                    if let Some(countdown_started_at) = room.countdown_started_at {
                        self.countdown.schedule(
                            self.store.clone(),
                            room.id.clone(),
                            countdown_started_at,
                            now_millis(),
                        );
                    }
                }
                RoomStatus::Racing => self.countdown.cancel(),
                _ => {}
            }
            self.last_status = Some(status);
        }

        // No server watches for completion, so whichever client observes the
        // last finish commits the transition. The duplicate patch other
        // observers race to write is value-equal.
        if room.all_finished() {
            if let Some(finished) = next(status, RaceEvent::AllFinished) {
                let finish = Patch::new().set("status", finished);
                if let Err(err) = self.store.patch(&room.id, finish).await {
                    warn!(room_id = room.id, %err, "finish transition failed");
                }
            }
        }

        self.latest = Some(room);
    }

    fn require_room(&self) -> Result<String, RaceError> {
        self.room_id.clone().ok_or(RaceError::NotInRoom)
    }

    async fn read_room(&self, room_id: &str) -> Result<RaceRoom, RaceError> {
        let room = self.store.read(room_id).await.map_err(RaceError::from)?;
        room.ok_or_else(|| RaceError::RoomNotFound {
            room_id: room_id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_id_normalization_strips_all_whitespace() {
        assert_eq!(normalize_room_id("  abc-123  "), "abc-123");
        assert_eq!(normalize_room_id("abc 123\tdef"), "abc123def");
        assert_eq!(normalize_room_id("a\nb"), "ab");
        assert_eq!(normalize_room_id("   "), "");
    }
}
