use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type PlayerId = String;
pub type RoomId = String;

/// One racer's slice of the shared room document. Each client owns the
/// `players.{ownId}` subtree exclusively and never patches another player's
/// fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub progress: u32,
    pub wpm: u32,
    pub accuracy: u32,
    pub is_finished: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_time: Option<i64>,
    pub joined_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_ready: Option<bool>,
}

impl Player {
    pub fn new(id: PlayerId, name: String, joined_at: i64) -> Self {
        Self {
            id,
            name,
            progress: 0,
            wpm: 0,
            accuracy: 100,
            is_finished: false,
            finish_time: None,
            joined_at,
            is_ready: None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.is_ready.unwrap_or(false)
    }
}

/// Room lifecycle status as stored in the shared document.
///
/// `Restart` exists in the document schema but is never produced by this
/// implementation; rematches go straight from `Finished` back to `Waiting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Waiting,
    Countdown,
    Racing,
    Finished,
    Restart,
}

/// The shared mutable state document for one race instance.
///
/// Field ownership convention (not store-enforced): `status`, `text`,
/// `countdownStartedAt` and `startedAt` belong to the creator, except the
/// countdown-expiry transition to `racing`, which any client may write.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RaceRoom {
    pub id: RoomId,
    pub creator_id: PlayerId,
    pub text: String,
    pub status: RoomStatus,
    pub players: HashMap<PlayerId, Player>,
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub countdown_started_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<i64>,
    pub max_players: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_text: Option<String>,
}

impl RaceRoom {
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.max_players as usize
    }

    pub fn is_creator(&self, player_id: &str) -> bool {
        self.creator_id == player_id
    }

    /// True once every player in the room has finished the current race.
    /// An empty room never counts as finished.
    pub fn all_finished(&self) -> bool {
        !self.players.is_empty() && self.players.values().all(|p| p.is_finished)
    }

    /// True when every non-creator player has acked readiness for a rematch.
    pub fn others_ready(&self) -> bool {
        self.players
            .values()
            .filter(|p| p.id != self.creator_id)
            .all(|p| p.is_ready())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room_with_players(players: Vec<Player>) -> RaceRoom {
        let creator_id = players[0].id.clone();
        RaceRoom {
            id: "room-1".to_string(),
            creator_id,
            text: "the quick brown fox".to_string(),
            status: RoomStatus::Waiting,
            players: players.into_iter().map(|p| (p.id.clone(), p)).collect(),
            created_at: 0,
            countdown_started_at: None,
            started_at: None,
            max_players: 6,
            selected_text: None,
        }
    }

    #[test]
    fn new_player_starts_clean() {
        let p = Player::new("p1".to_string(), "Alice".to_string(), 100);
        assert_eq!(p.progress, 0);
        assert_eq!(p.wpm, 0);
        assert_eq!(p.accuracy, 100);
        assert!(!p.is_finished);
        assert!(p.finish_time.is_none());
        assert!(!p.is_ready());
    }

    #[test]
    fn full_room_detection() {
        let mut room = room_with_players(vec![
            Player::new("p1".to_string(), "Alice".to_string(), 0),
            Player::new("p2".to_string(), "Bob".to_string(), 1),
        ]);
        assert!(!room.is_full());
        room.max_players = 2;
        assert!(room.is_full());
    }

    #[test]
    fn all_finished_requires_every_player() {
        let mut room = room_with_players(vec![
            Player::new("p1".to_string(), "Alice".to_string(), 0),
            Player::new("p2".to_string(), "Bob".to_string(), 1),
        ]);
        assert!(!room.all_finished());
        room.players.get_mut("p1").unwrap().is_finished = true;
        assert!(!room.all_finished());
        room.players.get_mut("p2").unwrap().is_finished = true;
        assert!(room.all_finished());
    }

    #[test]
    fn others_ready_ignores_creator() {
        let mut room = room_with_players(vec![
            Player::new("p1".to_string(), "Alice".to_string(), 0),
            Player::new("p2".to_string(), "Bob".to_string(), 1),
        ]);
        // Creator never set ready, only Bob matters
        assert!(!room.others_ready());
        room.players.get_mut("p2").unwrap().is_ready = Some(true);
        assert!(room.others_ready());
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&RoomStatus::Countdown).unwrap(),
            "\"countdown\""
        );
        let status: RoomStatus = serde_json::from_str("\"racing\"").unwrap();
        assert_eq!(status, RoomStatus::Racing);
    }

    #[test]
    fn player_field_names_are_camel_case() {
        let p = Player::new("p1".to_string(), "Alice".to_string(), 5);
        let json = serde_json::to_value(&p).unwrap();
        assert!(json.get("isFinished").is_some());
        assert!(json.get("joinedAt").is_some());
        // Unset optionals stay out of the document entirely
        assert!(json.get("finishTime").is_none());
        assert!(json.get("isReady").is_none());
    }
}
