use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Live statistics derived from a typing buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingStats {
    pub wpm: u32,
    pub accuracy: u32,
    pub time_elapsed: u64,
    pub correct_keystrokes: u32,
    pub incorrect_keystrokes: u32,
    pub total_keystrokes: u32,
}

impl Default for TypingStats {
    fn default() -> Self {
        Self {
            wpm: 0,
            accuracy: 100,
            time_elapsed: 0,
            correct_keystrokes: 0,
            incorrect_keystrokes: 0,
            total_keystrokes: 0,
        }
    }
}

/// Immutable record of one completed single-player session, appended to the
/// local history store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionResult {
    pub id: String,
    pub date: i64,
    pub text_length: u32,
    #[serde(flatten)]
    pub stats: TypingStats,
}

impl SessionResult {
    pub fn new(stats: TypingStats, text_length: u32, date: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            date,
            text_length,
            stats,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharStatus {
    Untyped,
    Correct,
    Incorrect,
    Current,
}

/// Per-character render state for the text display collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CharacterState {
    pub char: char,
    pub status: CharStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_stats_are_pristine() {
        let stats = TypingStats::default();
        assert_eq!(stats.wpm, 0);
        assert_eq!(stats.accuracy, 100);
        assert_eq!(stats.total_keystrokes, 0);
    }

    #[test]
    fn session_result_flattens_stats() {
        let result = SessionResult::new(TypingStats::default(), 50, 1_000);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["textLength"], 50);
        assert_eq!(json["accuracy"], 100);
        assert_eq!(json["date"], 1_000);
        assert!(!result.id.is_empty());
    }
}
