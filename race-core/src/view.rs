//! Derived views over a room snapshot: leaderboard and results orderings plus
//! the local view-state machine that follows `room.status` edges.

use race_types::{Player, RaceRoom, RoomStatus};

/// Which screen a client is showing. A pure function of the room status
/// stream and local completion, never polled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Menu,
    Lobby,
    Racing,
    Results,
}

/// Edge-triggered view transition, applied once per observed status change.
///
/// Mirrors the original client's transition table: a restarted room pulls the
/// results screen back to the lobby, `racing` pulls the lobby into the race,
/// and a finished room pushes racers to the results.
pub fn on_status_change(view: ViewState, status: RoomStatus) -> ViewState {
    match (view, status) {
        (ViewState::Results, RoomStatus::Waiting) => ViewState::Lobby,
        (ViewState::Lobby, RoomStatus::Racing) => ViewState::Racing,
        (ViewState::Racing, RoomStatus::Finished) => ViewState::Results,
        _ => view,
    }
}

/// Local per-client completion also navigates forward, independent of the
/// room-wide status (the room may stay `racing` for stragglers).
pub fn on_local_finish(view: ViewState) -> ViewState {
    match view {
        ViewState::Racing => ViewState::Results,
        other => other,
    }
}

/// Live leaderboard: progress descending, ties broken by join order then id
/// so the ordering is stable across snapshots.
pub fn leaderboard(room: &RaceRoom) -> Vec<&Player> {
    let mut players: Vec<&Player> = room.players.values().collect();
    players.sort_by(|a, b| {
        b.progress
            .cmp(&a.progress)
            .then_with(|| a.joined_at.cmp(&b.joined_at))
            .then_with(|| a.id.cmp(&b.id))
    });
    players
}

/// Final standings: finished players only, by finish time ascending, then WPM
/// descending, then id. A finished player without a recorded finish time
/// sorts last; the key is total so the ordering is independent of input
/// order.
pub fn final_results(room: &RaceRoom) -> Vec<&Player> {
    let mut finished: Vec<&Player> = room.players.values().filter(|p| p.is_finished).collect();
    finished.sort_by(|a, b| {
        a.finish_time
            .unwrap_or(i64::MAX)
            .cmp(&b.finish_time.unwrap_or(i64::MAX))
            .then_with(|| b.wpm.cmp(&a.wpm))
            .then_with(|| a.id.cmp(&b.id))
    });
    finished
}

/// Percentage of the shared text a player has correctly typed.
pub fn progress_percentage(player: &Player, room: &RaceRoom) -> u32 {
    let len = room.text.chars().count();
    if len == 0 {
        return 0;
    }
    ((player.progress as f64 / len as f64) * 100.0).round() as u32
}

/// mm:ss formatting for timers and finish deltas.
pub fn format_time(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
