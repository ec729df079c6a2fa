//! The room lifecycle state machine and the guard predicates evaluated before
//! every mutating store call.
//!
//! The state machine is a single pure `next(status, event)` function so it can
//! be tested without a store or UI. Guards are pure too: authorization is
//! checked client-side only, the store enforces nothing.

use race_types::{RaceError, RaceRoom, RoomStatus};

/// Countdown length between the creator starting the race and typing opening.
pub const COUNTDOWN_SECONDS: u64 = 3;
pub const COUNTDOWN_MILLIS: i64 = (COUNTDOWN_SECONDS * 1000) as i64;

/// Default minimum field size before the creator may start a countdown.
pub const DEFAULT_MIN_PLAYERS: u32 = 2;

/// Events that drive the room lifecycle forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaceEvent {
    /// Creator pressed start with enough players in the lobby.
    CountdownStarted,
    /// Wall clock passed `countdownStartedAt + COUNTDOWN_SECONDS`.
    CountdownElapsed,
    /// Every player in the room reported `isFinished`.
    AllFinished,
    /// Creator issued a rematch after gathering ready acks.
    RestartIssued,
}

/// Forward-only lifecycle transition table. Any pair not listed is rejected,
/// which is what makes duplicate transition patches harmless: the second
/// writer observes the already-advanced status and gets `None`.
pub fn next(status: RoomStatus, event: RaceEvent) -> Option<RoomStatus> {
    match (status, event) {
        (RoomStatus::Waiting, RaceEvent::CountdownStarted) => Some(RoomStatus::Countdown),
        (RoomStatus::Countdown, RaceEvent::CountdownElapsed) => Some(RoomStatus::Racing),
        (RoomStatus::Racing, RaceEvent::AllFinished) => Some(RoomStatus::Finished),
        (RoomStatus::Finished, RaceEvent::RestartIssued) => Some(RoomStatus::Waiting),
        (RoomStatus::Restart, RaceEvent::RestartIssued) => Some(RoomStatus::Waiting),
        _ => None,
    }
}

/// May a new player enter this room? Status is checked before capacity, so a
/// full room mid-race reports `RaceAlreadyStarted`, not `RoomFull`.
pub fn can_join(room: &RaceRoom) -> Result<(), RaceError> {
    if room.status != RoomStatus::Waiting {
        return Err(RaceError::RaceAlreadyStarted);
    }
    if room.is_full() {
        return Err(RaceError::RoomFull {
            max_players: room.max_players,
        });
    }
    Ok(())
}

/// Creator-only, lobby-only, and gated on a minimum field size.
pub fn can_start_countdown(
    room: &RaceRoom,
    player_id: &str,
    min_players: u32,
) -> Result<(), RaceError> {
    if !room.is_creator(player_id) {
        return Err(RaceError::Unauthorized {
            action: "start the race",
        });
    }
    if room.status != RoomStatus::Waiting {
        return Err(RaceError::RaceAlreadyStarted);
    }
    if (room.player_count() as u32) < min_players {
        return Err(RaceError::NotEnoughPlayers { min_players });
    }
    Ok(())
}

/// The countdown-expiry transition is deliberately writable by any client:
/// there is no server process to own it, so whichever subscriber observes
/// expiry first performs it. Safe because the resulting patch is value-equal
/// across writers (see `race_start_time`).
pub fn can_start_race(room: &RaceRoom, now_millis: i64) -> bool {
    match (room.status, room.countdown_started_at) {
        (RoomStatus::Countdown, Some(started)) => now_millis >= started + COUNTDOWN_MILLIS,
        _ => false,
    }
}

/// Deterministic race start time: the countdown deadline itself, not the
/// observing client's clock. Concurrent `racing` patches therefore carry
/// identical values and the duplicate is a no-op write.
pub fn race_start_time(countdown_started_at: i64) -> i64 {
    countdown_started_at + COUNTDOWN_MILLIS
}

/// Rematch is creator-only and requires every non-creator player to have
/// acked readiness.
pub fn can_restart(room: &RaceRoom, player_id: &str) -> Result<(), RaceError> {
    if !room.is_creator(player_id) {
        return Err(RaceError::Unauthorized {
            action: "restart the race",
        });
    }
    if !room.others_ready() {
        return Err(RaceError::PlayersNotReady);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use race_types::Player;
    use std::collections::HashMap;

    fn test_room(status: RoomStatus, player_names: &[&str]) -> RaceRoom {
        let mut players = HashMap::new();
        for (i, name) in player_names.iter().enumerate() {
            let id = format!("p{i}");
            players.insert(id.clone(), Player::new(id, name.to_string(), i as i64));
        }
        RaceRoom {
            id: "room-1".to_string(),
            creator_id: "p0".to_string(),
            text: "some race text".to_string(),
            status,
            players,
            created_at: 0,
            countdown_started_at: None,
            started_at: None,
            max_players: 6,
            selected_text: None,
        }
    }

    #[test]
    fn lifecycle_happy_path() {
        let status = RoomStatus::Waiting;
        let status = next(status, RaceEvent::CountdownStarted).unwrap();
        assert_eq!(status, RoomStatus::Countdown);
        let status = next(status, RaceEvent::CountdownElapsed).unwrap();
        assert_eq!(status, RoomStatus::Racing);
        let status = next(status, RaceEvent::AllFinished).unwrap();
        assert_eq!(status, RoomStatus::Finished);
        let status = next(status, RaceEvent::RestartIssued).unwrap();
        assert_eq!(status, RoomStatus::Waiting);
    }

    #[test]
    fn no_skipping_racing() {
        assert_eq!(next(RoomStatus::Countdown, RaceEvent::AllFinished), None);
        assert_eq!(next(RoomStatus::Waiting, RaceEvent::CountdownElapsed), None);
    }

    #[test]
    fn duplicate_transition_is_rejected() {
        // Second writer of the same event sees the advanced state
        assert_eq!(next(RoomStatus::Racing, RaceEvent::CountdownElapsed), None);
        assert_eq!(next(RoomStatus::Finished, RaceEvent::AllFinished), None);
    }

    #[test]
    fn join_rejected_when_race_started() {
        for status in [RoomStatus::Countdown, RoomStatus::Racing, RoomStatus::Finished] {
            let room = test_room(status, &["Alice"]);
            assert!(matches!(
                can_join(&room),
                Err(RaceError::RaceAlreadyStarted)
            ));
        }
    }

    #[test]
    fn join_rejected_when_full() {
        let mut room = test_room(RoomStatus::Waiting, &["Alice", "Bob"]);
        room.max_players = 2;
        assert!(matches!(can_join(&room), Err(RaceError::RoomFull { .. })));
    }

    #[test]
    fn join_allowed_in_waiting_room_with_space() {
        let room = test_room(RoomStatus::Waiting, &["Alice"]);
        assert!(can_join(&room).is_ok());
    }

    #[test]
    fn countdown_requires_creator_and_two_players() {
        let room = test_room(RoomStatus::Waiting, &["Alice"]);
        assert!(matches!(
            can_start_countdown(&room, "p0", DEFAULT_MIN_PLAYERS),
            Err(RaceError::NotEnoughPlayers { .. })
        ));

        let room = test_room(RoomStatus::Waiting, &["Alice", "Bob"]);
        assert!(can_start_countdown(&room, "p0", DEFAULT_MIN_PLAYERS).is_ok());
        assert!(matches!(
            can_start_countdown(&room, "p1", DEFAULT_MIN_PLAYERS),
            Err(RaceError::Unauthorized { .. })
        ));
    }

    #[test]
    fn race_starts_only_after_deadline() {
        let mut room = test_room(RoomStatus::Countdown, &["Alice", "Bob"]);
        room.countdown_started_at = Some(10_000);
        assert!(!can_start_race(&room, 10_000));
        assert!(!can_start_race(&room, 12_999));
        assert!(can_start_race(&room, 13_000));
        assert!(can_start_race(&room, 20_000));
    }

    #[test]
    fn race_start_is_not_observable_outside_countdown() {
        let mut room = test_room(RoomStatus::Racing, &["Alice", "Bob"]);
        room.countdown_started_at = Some(10_000);
        assert!(!can_start_race(&room, 20_000));
    }

    #[test]
    fn race_start_time_is_deterministic() {
        // Two clients observing expiry at different wall clocks produce the
        // same startedAt value
        assert_eq!(race_start_time(10_000), 13_000);
    }

    #[test]
    fn restart_requires_creator_and_ready_acks() {
        let mut room = test_room(RoomStatus::Finished, &["Alice", "Bob"]);
        assert!(matches!(
            can_restart(&room, "p1"),
            Err(RaceError::Unauthorized { .. })
        ));
        assert!(matches!(
            can_restart(&room, "p0"),
            Err(RaceError::PlayersNotReady)
        ));
        room.players.get_mut("p1").unwrap().is_ready = Some(true);
        assert!(can_restart(&room, "p0").is_ok());
    }
}
