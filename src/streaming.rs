// src/streaming.rs
//
// Client-side reveal of an already-complete response string. This is not
// network streaming: the full text is in memory before the first character
// shows.

use rand::Rng;
use std::time::{Duration, Instant};
use uuid::Uuid;

const BASE_DELAY_MS: u64 = 18;
const PUNCTUATION_DELAY_MS: u64 = 45;
const NEWLINE_DELAY_MS: u64 = 90;
const MARKDOWN_DELAY_MS: u64 = 8;
const JITTER_MAX_MS: u64 = 6;

/// Texts longer than this reveal at double speed so big answers don't
/// crawl.
const SPEEDUP_THRESHOLD_CHARS: usize = 600;

/// Reveals a target string character by character. The owner decides when
/// the message stops being "streaming"; this type only paces the reveal.
#[derive(Debug)]
pub struct TypingEffect {
    message_id: Option<Uuid>,
    target: Vec<char>,
    visible: usize,
    next_reveal_at: Option<Instant>,
}

impl TypingEffect {
    pub fn new() -> Self {
        Self {
            message_id: None,
            target: Vec::new(),
            visible: 0,
            next_reveal_at: None,
        }
    }

    /// Points the effect at a new message. Restarts from scratch when the
    /// target text changes while nothing is displayed yet; an in-progress
    /// reveal of the same text is left alone.
    pub fn set_target(&mut self, message_id: Uuid, text: &str) {
        let chars: Vec<char> = text.chars().collect();
        if self.message_id == Some(message_id) && self.target == chars && self.visible > 0 {
            return;
        }
        self.message_id = Some(message_id);
        self.target = chars;
        self.visible = 0;
        self.next_reveal_at = Some(Instant::now());
    }

    pub fn message_id(&self) -> Option<Uuid> {
        self.message_id
    }

    pub fn is_done(&self) -> bool {
        self.visible >= self.target.len()
    }

    pub fn visible_prefix(&self) -> String {
        self.target[..self.visible].iter().collect()
    }

    /// Reveals every character whose deadline has passed. Deadlines chain
    /// off each other, so a slow UI tick still averages out to the intended
    /// pace. Returns true when anything new became visible.
    pub fn advance(&mut self, now: Instant) -> bool {
        let mut changed = false;
        while !self.is_done() {
            let at = match self.next_reveal_at {
                Some(at) if at <= now => at,
                _ => break,
            };
            let c = self.target[self.visible];
            self.visible += 1;
            changed = true;
            self.next_reveal_at = Some(at + char_delay(c, self.target.len()) + jitter());
        }
        if self.is_done() {
            self.next_reveal_at = None;
        }
        changed
    }

    pub fn clear(&mut self) {
        self.message_id = None;
        self.target.clear();
        self.visible = 0;
        self.next_reveal_at = None;
    }
}

impl Default for TypingEffect {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-character pacing: newlines pause longest, punctuation breathes,
/// markdown control characters flick past, everything else gets the base
/// delay. Long texts run at half time.
pub fn char_delay(c: char, total_chars: usize) -> Duration {
    let millis = match c {
        '\n' => NEWLINE_DELAY_MS,
        '.' | ',' | '!' | '?' | ';' | ':' => PUNCTUATION_DELAY_MS,
        '#' | '*' => MARKDOWN_DELAY_MS,
        _ => BASE_DELAY_MS,
    };
    let millis = if total_chars > SPEEDUP_THRESHOLD_CHARS {
        millis / 2
    } else {
        millis
    };
    Duration::from_millis(millis)
}

fn jitter() -> Duration {
    Duration::from_millis(rand::rng().random_range(0..=JITTER_MAX_MS))
}

/// Upper-bound estimate of the full reveal time, used by the owner to size
/// the timeout that settles the message's streaming flag.
pub fn estimated_reveal_duration(text: &str) -> Duration {
    let total = text.chars().count();
    let paced: Duration = text.chars().map(|c| char_delay(c, total)).sum();
    paced + Duration::from_millis(JITTER_MAX_MS * total as u64 / 2) + Duration::from_millis(250)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_delay_ordering() {
        let newline = char_delay('\n', 10);
        let punctuation = char_delay('.', 10);
        let base = char_delay('e', 10);
        let markdown = char_delay('#', 10);

        assert!(newline > punctuation);
        assert!(punctuation > base);
        assert!(base > markdown);
    }

    #[test]
    fn test_long_text_halves_delays() {
        let short = char_delay('e', SPEEDUP_THRESHOLD_CHARS);
        let long = char_delay('e', SPEEDUP_THRESHOLD_CHARS + 1);
        assert_eq!(long, short / 2);
    }

    #[test]
    fn test_advance_reveals_everything_eventually() {
        let mut effect = TypingEffect::new();
        let id = Uuid::new_v4();
        effect.set_target(id, "Hi.\nBye");

        // Far enough in the future that every deadline has passed.
        let mut now = Instant::now();
        for _ in 0..100 {
            now += Duration::from_secs(1);
            effect.advance(now);
            if effect.is_done() {
                break;
            }
        }

        assert!(effect.is_done());
        assert_eq!(effect.visible_prefix(), "Hi.\nBye");
    }

    #[test]
    fn test_retarget_restarts_when_prefix_empty() {
        let mut effect = TypingEffect::new();
        let id = Uuid::new_v4();
        effect.set_target(id, "first");
        assert_eq!(effect.visible_prefix(), "");

        effect.set_target(id, "second");
        let mut now = Instant::now();
        for _ in 0..100 {
            now += Duration::from_secs(1);
            effect.advance(now);
            if effect.is_done() {
                break;
            }
        }
        assert_eq!(effect.visible_prefix(), "second");
    }

    #[test]
    fn test_same_target_does_not_restart_mid_reveal() {
        let mut effect = TypingEffect::new();
        let id = Uuid::new_v4();
        effect.set_target(id, "hello");

        let now = Instant::now() + Duration::from_secs(1);
        effect.advance(now);
        let revealed = effect.visible_prefix().len();
        assert!(revealed > 0);

        effect.set_target(id, "hello");
        assert_eq!(effect.visible_prefix().len(), revealed);
    }

    #[test]
    fn test_estimated_reveal_duration_scales_with_length() {
        let short = estimated_reveal_duration("short");
        let long = estimated_reveal_duration(&"long text, much longer. ".repeat(20));
        assert!(long > short);
    }
}
