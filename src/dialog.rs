//! End-of-run dialog
//!
//! A short congratulatory message shown after a medal or a new high score,
//! typed out one character at a time.

use serde::Serialize;

use crate::medals::{self, MedalTier};

/// Delay before the next character, by the character just shown (ms)
pub const TYPE_SPEED_MS: f64 = 22.0;
pub const PAUSE_SHORT_MS: f64 = 90.0;
pub const PAUSE_LONG_MS: f64 = 180.0;
pub const PAUSE_NEWLINE_MS: f64 = 120.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dialog {
    pub title: &'static str,
    pub text: String,
    /// Medal to show beside the text
    pub medal: Option<MedalTier>,
}

/// Dialog for a finished run, if it earned one
pub fn build_dialog(
    score: u32,
    new_medal: Option<MedalTier>,
    is_high_score: bool,
    unlocked_next: bool,
) -> Option<Dialog> {
    if let Some(tier) = new_medal {
        let mut text = if tier.is_secret() {
            "I am EXTREMELY impressed, and I've created a new medal just for students like you - the platinum medal!"
                .to_string()
        } else {
            format!(
                "Congratulations! You earned the {} medal!",
                tier.label().to_lowercase()
            )
        };
        if unlocked_next {
            text.push_str("\nI have now unlocked the next level!");
        }
        return Some(Dialog {
            title: "YOU GOT A MEDAL!",
            text,
            medal: Some(tier),
        });
    }

    if is_high_score {
        let text = match medals::next_visible(score) {
            Some(tier) => format!(
                "Congratulations! If you continue like this, you might get that {} medal soon!",
                tier.label().to_lowercase()
            ),
            None => {
                "Congratulations! If you continue to excel like this, I might have to create a NEW medal!"
                    .to_string()
            }
        };
        return Some(Dialog {
            title: "NEW HIGHSCORE!",
            text,
            medal: None,
        });
    }

    None
}

pub fn typing_delay(shown: char) -> f64 {
    match shown {
        '\n' => PAUSE_NEWLINE_MS,
        '.' | '!' | '?' => PAUSE_LONG_MS,
        ',' | ';' | ':' => PAUSE_SHORT_MS,
        _ => TYPE_SPEED_MS,
    }
}

/// Reveals text against absolute deadlines, so frame rate does not matter
#[derive(Debug, Clone)]
pub struct Typewriter {
    text: String,
    /// Byte length of the visible prefix
    shown: usize,
    next_at: Option<f64>,
}

impl Typewriter {
    pub fn start(text: &str, now_ms: f64) -> Self {
        Self {
            text: text.to_string(),
            shown: 0,
            next_at: (!text.is_empty()).then_some(now_ms + TYPE_SPEED_MS),
        }
    }

    pub fn visible(&self) -> &str {
        &self.text[..self.shown]
    }

    pub fn is_done(&self) -> bool {
        self.next_at.is_none()
    }

    /// Stop typing where it is
    pub fn cancel(&mut self) {
        self.next_at = None;
    }

    /// Reveal every character whose deadline has passed. Returns true if any were.
    pub fn advance(&mut self, now_ms: f64) -> bool {
        let mut changed = false;
        while let Some(deadline) = self.next_at {
            if now_ms < deadline {
                break;
            }
            let Some(c) = self.text[self.shown..].chars().next() else {
                self.next_at = None;
                break;
            };
            self.shown += c.len_utf8();
            changed = true;
            self.next_at = (self.shown < self.text.len()).then(|| deadline + typing_delay(c));
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_medal_dialog() {
        let dialog = build_dialog(20, Some(MedalTier::Bronze), true, true).unwrap();
        assert_eq!(dialog.title, "YOU GOT A MEDAL!");
        assert_eq!(
            dialog.text,
            "Congratulations! You earned the bronze medal!\nI have now unlocked the next level!"
        );
        assert_eq!(dialog.medal, Some(MedalTier::Bronze));
    }

    #[test]
    fn test_secret_medal_dialog() {
        let dialog = build_dialog(55, Some(MedalTier::Platinum), true, false).unwrap();
        assert!(dialog.text.starts_with("I am EXTREMELY impressed"));
        assert!(!dialog.text.contains('\n'));
    }

    #[test]
    fn test_high_score_dialog_teases_next_tier() {
        let dialog = build_dialog(25, None, true, false).unwrap();
        assert_eq!(dialog.title, "NEW HIGHSCORE!");
        assert!(dialog.text.contains("silver medal soon"));
        assert_eq!(dialog.medal, None);

        let top = build_dialog(47, None, true, false).unwrap();
        assert!(top.text.contains("create a NEW medal"));
    }

    #[test]
    fn test_no_dialog_without_achievement() {
        assert_eq!(build_dialog(12, None, false, true), None);
    }

    #[test]
    fn test_typewriter_pauses_on_punctuation() {
        let mut typer = Typewriter::start("Hi, yo.", 0.0);
        assert!(!typer.advance(21.0));
        assert_eq!(typer.visible(), "");

        typer.advance(66.0);
        assert_eq!(typer.visible(), "Hi,");
        typer.advance(155.0);
        assert_eq!(typer.visible(), "Hi,");
        typer.advance(156.0);
        assert_eq!(typer.visible(), "Hi, ");

        typer.advance(1000.0);
        assert_eq!(typer.visible(), "Hi, yo.");
        assert!(typer.is_done());
    }

    #[test]
    fn test_typewriter_cancel_freezes_text() {
        let mut typer = Typewriter::start("Grattis!", 0.0);
        typer.advance(50.0);
        typer.cancel();
        assert!(!typer.advance(10_000.0));
        assert_eq!(typer.visible(), "Gr");
    }
}
