//! Practice text generation. Pure function of an RNG: topic word pools
//! assembled into sentences, trimmed to a difficulty-dependent length band
//! without cutting mid-word.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Focus {
    Speed,
    Accuracy,
    Programming,
    Random,
}

const PROGRAMMING_WORDS: &[&str] = &[
    "function", "variable", "array", "object", "string", "number", "boolean",
    "const", "return", "import", "export", "class", "interface", "type",
    "async", "await", "promise", "callback", "event", "listener", "component",
    "state", "effect", "context", "reducer", "action", "dispatch", "router",
    "database", "query", "schema", "model", "controller", "service", "entity",
    "token", "session", "header", "request", "response", "endpoint", "payload",
];

const PROGRAMMING_PHRASES: &[&str] = &[
    "The function returns a",
    "We need to implement a",
    "This component renders a",
    "The variable stores a",
    "You can use this method to",
    "The API endpoint accepts a",
    "The reducer handles the",
    "We should validate the",
    "The service connects to the",
];

const LITERATURE_WORDS: &[&str] = &[
    "narrative", "character", "protagonist", "plot", "theme", "metaphor",
    "symbolism", "irony", "foreshadowing", "climax", "resolution", "setting",
    "dialogue", "poetry", "prose", "verse", "stanza", "rhyme", "rhythm",
    "novel", "essay", "biography", "memoir", "fiction",
];

const SCIENCE_WORDS: &[&str] = &[
    "hypothesis", "theory", "experiment", "observation", "analysis",
    "conclusion", "molecule", "atom", "electron", "element", "compound",
    "reaction", "catalyst", "evolution", "genetics", "chromosome", "protein",
    "enzyme", "cell", "organism", "ecosystem", "metabolism", "homeostasis",
];

const BUSINESS_WORDS: &[&str] = &[
    "strategy", "management", "leadership", "innovation", "marketing",
    "revenue", "profit", "investment", "stakeholder", "customer", "service",
    "product", "brand", "market", "competition", "planning", "execution",
    "efficiency", "productivity", "quality", "optimization", "automation",
];

const TECHNOLOGY_WORDS: &[&str] = &[
    "algorithm", "analytics", "cybersecurity", "blockchain", "robotics",
    "automation", "software", "hardware", "network", "protocol", "encryption",
    "virtualization", "telemetry", "latency", "bandwidth", "throughput",
];

const TOPICS: &[&[&str]] = &[
    LITERATURE_WORDS,
    SCIENCE_WORDS,
    BUSINESS_WORDS,
    TECHNOLOGY_WORDS,
];

/// Generate practice text from explicit difficulty and focus selectors.
pub fn generate_text(difficulty: Difficulty, focus: Focus) -> String {
    let mut rng = rand::thread_rng();
    generate_text_with_rng(&mut rng, difficulty, focus)
}

pub fn generate_text_with_rng<R: Rng>(rng: &mut R, difficulty: Difficulty, focus: Focus) -> String {
    let target_len = target_length(rng, difficulty);
    let raw = match focus {
        Focus::Programming => programming_text(rng, target_len),
        Focus::Accuracy => topic_text(rng, LITERATURE_WORDS, target_len),
        Focus::Speed => {
            // Simple repetitive patterns for speed building
            topic_text(rng, BUSINESS_WORDS, target_len)
        }
        Focus::Random => {
            let topic = TOPICS.choose(rng).copied().unwrap_or(TECHNOLOGY_WORDS);
            topic_text(rng, topic, target_len)
        }
    };
    finish_text(raw, target_len)
}

fn target_length<R: Rng>(rng: &mut R, difficulty: Difficulty) -> usize {
    let (min, max) = match difficulty {
        Difficulty::Easy => (150, 250),
        Difficulty::Medium => (250, 350),
        Difficulty::Hard => (350, 500),
    };
    rng.gen_range(min..max)
}

fn topic_text<R: Rng>(rng: &mut R, words: &[&str], target_len: usize) -> String {
    let mut text = String::new();
    // Overshoot the target; finish_text trims back to the band
    while text.chars().count() < target_len {
        let sentence_len = rng.gen_range(8..20);
        let mut sentence_words = Vec::with_capacity(sentence_len);
        for j in 0..sentence_len {
            let word = words.choose(rng).copied().unwrap_or("typing");
            if j == 0 {
                sentence_words.push(capitalize(word));
            } else {
                sentence_words.push(word.to_string());
            }
        }
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(&sentence_words.join(" "));
        text.push('.');
    }
    text
}

fn programming_text<R: Rng>(rng: &mut R, target_len: usize) -> String {
    let mut text = String::new();
    while text.chars().count() < target_len {
        let phrase = PROGRAMMING_PHRASES.choose(rng).copied().unwrap_or("The function returns a");
        let extra = rng.gen_range(3..10);
        let mut words = Vec::with_capacity(extra);
        for _ in 0..extra {
            words.push(PROGRAMMING_WORDS.choose(rng).copied().unwrap_or("function"));
        }
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(&format!("{} {}.", phrase, words.join(" ")));
    }
    text
}

/// Trim to the target length without cutting mid-word, then make sure the
/// text ends with sentence punctuation.
fn finish_text(raw: String, target_len: usize) -> String {
    let mut text: String = raw.chars().take(target_len).collect();
    text.truncate(text.trim_end().len());

    // A cut inside the last 10% of the band lands mid-word more often than
    // not; drop the fragment at the last space. Both sides of the comparison
    // are character counts.
    if let Some(last_space) = text.rfind(' ') {
        let space_chars = text[..last_space].chars().count();
        if space_chars * 10 >= target_len * 9 {
            text.truncate(last_space);
        }
    }

    let ends_clean = text.ends_with('.') || text.ends_with('!') || text.ends_with('?');
    if !ends_clean {
        text.push('.');
    }
    text
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn respects_difficulty_length_bands() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let easy = generate_text_with_rng(&mut rng, Difficulty::Easy, Focus::Random);
            assert!(easy.chars().count() <= 251, "too long: {}", easy.len());

            let hard = generate_text_with_rng(&mut rng, Difficulty::Hard, Focus::Random);
            assert!(hard.chars().count() > 250, "too short: {}", hard.len());
        }
    }

    #[test]
    fn ends_with_sentence_punctuation() {
        let mut rng = StdRng::seed_from_u64(42);
        for focus in [Focus::Speed, Focus::Accuracy, Focus::Programming, Focus::Random] {
            let text = generate_text_with_rng(&mut rng, Difficulty::Medium, focus);
            let last = text.chars().last().unwrap();
            assert!(
                last == '.' || last == '!' || last == '?',
                "unexpected ending: {text:?}"
            );
        }
    }

    #[test]
    fn never_cuts_mid_word_at_the_tail() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let text = generate_text_with_rng(&mut rng, Difficulty::Easy, Focus::Programming);
            // The last token before the closing dot must be a known word or
            // phrase fragment, i.e. non-empty alphabetic
            let tail = text.trim_end_matches(['.', '!', '?']);
            let last_word = tail.rsplit(' ').next().unwrap();
            assert!(!last_word.is_empty());
        }
    }

    #[test]
    fn tail_fragment_dropped_at_exact_band_boundary() {
        // Last space sits exactly at 90% of the target: the fragment after
        // it must still be dropped
        let raw = format!("{} bbbb", "a".repeat(18));
        let text = finish_text(raw, 20);
        assert_eq!(text, format!("{}.", "a".repeat(18)));
    }

    #[test]
    fn starts_capitalized() {
        let mut rng = StdRng::seed_from_u64(11);
        let text = generate_text_with_rng(&mut rng, Difficulty::Medium, Focus::Accuracy);
        assert!(text.chars().next().unwrap().is_uppercase());
    }
}
