pub mod config;
pub mod coordinator;
pub mod countdown;
pub mod progress;


pub use config::SyncConfig;
pub use coordinator::{normalize_room_id, try_start_race, RaceCoordinator};
pub use countdown::CountdownTimer;
pub use progress::{ProgressReporter, RaceProgress};
