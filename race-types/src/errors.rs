use thiserror::Error;

/// Failures surfaced to the user when driving a race room.
///
/// Authorization variants are advisory: checks run client-side before a store
/// patch is issued, the store itself enforces nothing. Documented trust
/// boundary for a trust-all-clients environment.
#[derive(Debug, Error)]
pub enum RaceError {
    #[error("Room not found")]
    RoomNotFound { room_id: String },

    #[error("Room is full")]
    RoomFull { max_players: u32 },

    #[error("Race has already started or finished")]
    RaceAlreadyStarted,

    #[error("Only the room creator can {action}")]
    Unauthorized { action: &'static str },

    #[error("Need at least {min_players} players to start the race")]
    NotEnoughPlayers { min_players: u32 },

    #[error("Not all players are ready")]
    PlayersNotReady,

    #[error("Not joined to a room")]
    NotInRoom,

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_visible_messages() {
        let err = RaceError::RoomNotFound {
            room_id: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "Room not found");

        let err = RaceError::RoomFull { max_players: 6 };
        assert_eq!(err.to_string(), "Room is full");

        assert_eq!(
            RaceError::RaceAlreadyStarted.to_string(),
            "Race has already started or finished"
        );

        let err = RaceError::Unauthorized {
            action: "start the race",
        };
        assert_eq!(
            err.to_string(),
            "Only the room creator can start the race"
        );
    }
}
