//! Progress reporting: stat computation over the client's own keystroke
//! buffer, write throttling, and the patch that touches only the reporting
//! player's subtree.

use race_core::{calculate_accuracy, calculate_wpm, correct_chars, incorrect_chars};
use race_store::Patch;
use std::time::{Duration, Instant};

/// One progress report against the shared text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaceProgress {
    pub progress: u32,
    pub wpm: u32,
    pub accuracy: u32,
    pub is_finished: bool,
    pub timestamp: i64,
}

impl RaceProgress {
    /// Derive a report from the local input buffer. `progress` is the count
    /// of currently-correct characters; finishing means the input covers the
    /// whole text.
    pub fn compute(input: &str, text: &str, elapsed_seconds: u64, now_millis: i64) -> Self {
        let correct = correct_chars(input, text);
        let incorrect = incorrect_chars(input, text);
        Self {
            progress: correct,
            wpm: calculate_wpm(correct, elapsed_seconds),
            accuracy: calculate_accuracy(correct, incorrect),
            is_finished: input.chars().count() >= text.chars().count() && !text.is_empty(),
            timestamp: now_millis,
        }
    }

    /// The patch for this report. Scoped strictly to `players.{player_id}`;
    /// finishTime is written only on the finish event and freezes there.
    pub fn to_patch(&self, player_id: &str) -> Patch {
        let prefix = format!("players.{player_id}");
        let mut patch = Patch::new()
            .set(format!("{prefix}.progress"), self.progress)
            .set(format!("{prefix}.wpm"), self.wpm)
            .set(format!("{prefix}.accuracy"), self.accuracy)
            .set(format!("{prefix}.isFinished"), self.is_finished);
        if self.is_finished {
            patch = patch.set(format!("{prefix}.finishTime"), self.timestamp);
        }
        patch
    }
}

/// Bounds write volume: at most one patch per throttle interval, except the
/// finish event, which always goes out immediately. Also enforces the
/// monotonic-progress invariant across a race instance by high-water-marking
/// the reported correct-character count (a backspace may shrink the local
/// buffer, the shared document never moves backwards).
#[derive(Debug)]
pub struct ProgressReporter {
    throttle: Duration,
    last_sent: Option<Instant>,
    high_water: u32,
    finish_sent: bool,
}

impl ProgressReporter {
    pub fn new(throttle_ms: u64) -> Self {
        Self {
            throttle: Duration::from_millis(throttle_ms),
            last_sent: None,
            high_water: 0,
            finish_sent: false,
        }
    }

    /// Admit or suppress a report. Returns the (possibly clamped) report to
    /// send, or `None` when the throttle swallows it.
    pub fn prepare(&mut self, mut report: RaceProgress, now: Instant) -> Option<RaceProgress> {
        if self.finish_sent {
            return None;
        }
        if !report.is_finished {
            if let Some(last) = self.last_sent {
                if now.duration_since(last) < self.throttle {
                    return None;
                }
            }
        }

        report.progress = report.progress.max(self.high_water);
        self.high_water = report.progress;
        self.last_sent = Some(now);
        if report.is_finished {
            self.finish_sent = true;
        }
        Some(report)
    }

    /// Clear throttle and high-water state for a fresh race instance.
    pub fn reset(&mut self) {
        self.last_sent = None;
        self.high_water = 0;
        self.finish_sent = false;
    }
}
