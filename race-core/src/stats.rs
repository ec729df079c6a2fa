//! Keystroke diffing and the WPM/accuracy formulas shared by the local
//! session engine and the multiplayer progress reporter.

/// Count of positions where the typed input matches the target text.
pub fn correct_chars(input: &str, target: &str) -> u32 {
    input
        .chars()
        .zip(target.chars())
        .filter(|(typed, expected)| typed == expected)
        .count() as u32
}

/// Typed characters that do not match the target at their position.
pub fn incorrect_chars(input: &str, target: &str) -> u32 {
    input.chars().count() as u32 - correct_chars(input, target)
}

/// Words per minute: correct characters / 5, normalized to a per-minute rate.
/// Zero elapsed time yields zero rather than a division blowup.
pub fn calculate_wpm(correct_chars: u32, time_in_seconds: u64) -> u32 {
    if time_in_seconds == 0 {
        return 0;
    }
    let words = correct_chars as f64 / 5.0;
    let minutes = time_in_seconds as f64 / 60.0;
    (words / minutes).round() as u32
}

/// Accuracy percentage over all keystrokes; 100 before anything is typed.
pub fn calculate_accuracy(correct: u32, incorrect: u32) -> u32 {
    let total = correct + incorrect;
    if total == 0 {
        return 100;
    }
    ((correct as f64 / total as f64) * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_chars_counts_matching_positions() {
        assert_eq!(correct_chars("test", "test"), 4);
        assert_eq!(correct_chars("txst", "test"), 3);
        assert_eq!(correct_chars("", "test"), 0);
        // Transposition counts neither position
        assert_eq!(correct_chars("ets", "tes"), 1);
    }

    #[test]
    fn correct_plus_incorrect_is_input_length() {
        let cases = [("hello", "world"), ("abc", "abcdef"), ("", "abc")];
        for (input, target) in cases {
            assert_eq!(
                correct_chars(input, target) + incorrect_chars(input, target),
                input.chars().count() as u32
            );
        }
    }

    #[test]
    fn wpm_formula() {
        // 250 correct chars / 5 = 50 words over exactly one minute
        assert_eq!(calculate_wpm(250, 60), 50);
        // 300 chars in 30s = 120 WPM
        assert_eq!(calculate_wpm(300, 30), 120);
        assert_eq!(calculate_wpm(250, 0), 0);
        assert_eq!(calculate_wpm(0, 60), 0);
    }

    #[test]
    fn accuracy_formula() {
        assert_eq!(calculate_accuracy(0, 0), 100);
        assert_eq!(calculate_accuracy(80, 20), 80);
        assert_eq!(calculate_accuracy(100, 0), 100);
        assert_eq!(calculate_accuracy(1, 2), 33);
    }
}
