use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::info;

use race_core::{final_results, format_time, generate_text, Difficulty, Focus, ViewState};
use race_store::MemoryStore;
use race_sync::{RaceCoordinator, SyncConfig};
use race_types::{RaceRoom, RoomStatus};

/// Drive a coordinator's snapshot stream until the room reaches `status`.
async fn wait_for_status(coordinator: &mut RaceCoordinator, status: RoomStatus) -> RaceRoom {
    loop {
        let Some(Some(room)) = coordinator.next_snapshot().await else {
            panic!("room disappeared while waiting for {status:?}");
        };
        if room.status == status {
            return room;
        }
    }
}

async fn type_text(
    coordinator: &mut RaceCoordinator,
    text: &str,
    chars_per_tick: usize,
    started: Instant,
) {
    let chars: Vec<char> = text.chars().collect();
    let mut typed = 0;
    while typed < chars.len() {
        typed = (typed + chars_per_tick).min(chars.len());
        let input: String = chars[..typed].iter().collect();
        let elapsed = started.elapsed().as_secs();
        if let Err(err) = coordinator.report_progress(&input, elapsed).await {
            tracing::warn!(%err, "progress report failed");
        }
        tokio::time::sleep(Duration::from_millis(600)).await;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    info!("Starting two-client race demo");

    let config = SyncConfig::from_env();
    let store = Arc::new(MemoryStore::new());

    let mut alice = RaceCoordinator::new(
        store.clone(),
        config.clone(),
        "alice".to_string(),
        "Alice".to_string(),
    );
    let mut bob = RaceCoordinator::new(
        store.clone(),
        config,
        "bob".to_string(),
        "Bob".to_string(),
    );

    let text = generate_text(Difficulty::Easy, Focus::Random);
    info!(chars = text.chars().count(), "generated race text");

    let room_id = alice.create_room(text.clone()).await?;
    info!(room_id, "room open, share this id to join");
    bob.join_room(&room_id).await?;

    alice.start_countdown().await?;
    wait_for_status(&mut alice, RoomStatus::Countdown).await;
    wait_for_status(&mut bob, RoomStatus::Countdown).await;
    info!("countdown running");

    wait_for_status(&mut alice, RoomStatus::Racing).await;
    wait_for_status(&mut bob, RoomStatus::Racing).await;
    info!("race started");

    // Alice types faster than Bob; both run to completion
    let race_clock = Instant::now();
    let alice_text = text.clone();
    let bob_text = text.clone();
    tokio::join!(
        type_text(&mut alice, &alice_text, 14, race_clock),
        type_text(&mut bob, &bob_text, 9, race_clock),
    );

    let finished = wait_for_status(&mut alice, RoomStatus::Finished).await;
    wait_for_status(&mut bob, RoomStatus::Finished).await;
    assert_eq!(alice.view(), ViewState::Results);

    info!("final results:");
    for (place, player) in final_results(&finished).iter().enumerate() {
        let finish = player
            .finish_time
            .zip(finished.started_at)
            .map(|(t, s)| format_time(((t - s).max(0) / 1000) as u64))
            .unwrap_or_else(|| "-".to_string());
        info!(
            "  {}. {} - {} wpm, {}% accuracy, finished at {}",
            place + 1,
            player.name,
            player.wpm,
            player.accuracy,
            finish
        );
    }

    bob.leave_room().await?;
    alice.leave_room().await?;
    info!(rooms = store.room_count(), "demo complete");
    Ok(())
}
