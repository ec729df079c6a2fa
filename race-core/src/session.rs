//! Single-player session engine: per-keystroke diffing against a fixed target
//! text, with the same WPM/accuracy formulas the multiplayer reporter uses.

use crate::stats::{calculate_accuracy, calculate_wpm, correct_chars, incorrect_chars};
use race_types::{CharStatus, CharacterState, SessionResult, TypingStats};
use std::time::Instant;

/// A typing test in progress against a fixed prompt.
///
/// The timer starts on the first keystroke. Completion latches exactly once,
/// when the input buffer reaches the prompt length, and produces an immutable
/// `SessionResult`.
#[derive(Debug)]
pub struct LocalSession {
    text: String,
    text_len: usize,
    input: String,
    started_at: Option<Instant>,
    result: Option<SessionResult>,
}

impl LocalSession {
    pub fn new(text: String) -> Self {
        let text_len = text.chars().count();
        Self {
            text,
            text_len,
            input: String::new(),
            started_at: None,
            result: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.result.is_some()
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.started_at
            .map(|t| t.elapsed().as_secs())
            .unwrap_or(0)
    }

    /// Feed one keystroke. Input past the end of the prompt is ignored, as is
    /// anything typed after completion.
    pub fn type_char(&mut self, c: char) -> Option<&SessionResult> {
        if self.is_finished() || self.input.chars().count() >= self.text_len {
            return self.result.as_ref();
        }
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
        }
        self.input.push(c);
        if self.input.chars().count() == self.text_len {
            self.finish();
        }
        self.result.as_ref()
    }

    pub fn backspace(&mut self) {
        if !self.is_finished() {
            self.input.pop();
        }
    }

    /// Current statistics against local elapsed time.
    pub fn stats(&self) -> TypingStats {
        self.stats_at(self.elapsed_seconds())
    }

    /// Statistics at an explicit elapsed time, for deterministic callers.
    pub fn stats_at(&self, elapsed_seconds: u64) -> TypingStats {
        let correct = correct_chars(&self.input, &self.text);
        let incorrect = incorrect_chars(&self.input, &self.text);
        TypingStats {
            wpm: calculate_wpm(correct, elapsed_seconds),
            accuracy: calculate_accuracy(correct, incorrect),
            time_elapsed: elapsed_seconds,
            correct_keystrokes: correct,
            incorrect_keystrokes: incorrect,
            total_keystrokes: correct + incorrect,
        }
    }

    /// The completed result, if the session has finished.
    pub fn result(&self) -> Option<&SessionResult> {
        self.result.as_ref()
    }

    /// Render states for every character of the prompt.
    pub fn character_states(&self) -> Vec<CharacterState> {
        let typed: Vec<char> = self.input.chars().collect();
        let cursor = typed.len();
        self.text
            .chars()
            .enumerate()
            .map(|(i, c)| {
                let status = if i < cursor {
                    if typed[i] == c {
                        CharStatus::Correct
                    } else {
                        CharStatus::Incorrect
                    }
                } else if i == cursor {
                    CharStatus::Current
                } else {
                    CharStatus::Untyped
                };
                CharacterState { char: c, status }
            })
            .collect()
    }

    fn finish(&mut self) {
        let stats = self.stats();
        let date = chrono::Utc::now().timestamp_millis();
        self.result = Some(SessionResult::new(stats, self.text_len as u32, date));
    }

    /// Reset to a fresh attempt at the same text.
    pub fn reset(&mut self) {
        self.input.clear();
        self.started_at = None;
        self.result = None;
    }
}
