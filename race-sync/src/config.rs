use std::env;

/// Client-side synchronization settings, overridable through the
/// environment.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub max_players: u32,
    pub min_players: u32,
    pub progress_throttle_ms: u64,
}

impl SyncConfig {
    pub fn from_env() -> Self {
        Self {
            max_players: env::var("MAX_PLAYERS_PER_ROOM")
                .unwrap_or_else(|_| "6".to_string())
                .parse()
                .expect("Invalid MAX_PLAYERS_PER_ROOM"),
            min_players: env::var("MIN_PLAYERS_PER_ROOM")
                .unwrap_or_else(|_| "2".to_string())
                .parse()
                .expect("Invalid MIN_PLAYERS_PER_ROOM"),
            progress_throttle_ms: env::var("PROGRESS_THROTTLE_MS")
                .unwrap_or_else(|_| "500".to_string())
                .parse()
                .expect("Invalid PROGRESS_THROTTLE_MS"),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_players: 6,
            min_players: 2,
            progress_throttle_ms: 500,
        }
    }
}
