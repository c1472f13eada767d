//! Tone input buffer
//!
//! Holds what the player has typed so far, whether it came from the text
//! field or the on-screen keypad. A pending answer that sits untouched is
//! cleared after an idle deadline so a stray digit does not poison the next
//! attempt.

/// Longest tone pattern in the catalog
pub const MAX_TONE_DIGITS: usize = 2;

/// Keep tone digits (1-4) only, truncated to a full pattern
pub fn sanitize(raw: &str) -> String {
    raw.chars()
        .filter(|c| matches!(c, '1'..='4'))
        .take(MAX_TONE_DIGITS)
        .collect()
}

#[derive(Debug, Clone)]
pub struct ToneBuffer {
    value: String,
    idle_ms: f64,
    clear_at: Option<f64>,
}

impl ToneBuffer {
    pub fn new(idle_ms: f64) -> Self {
        Self {
            value: String::new(),
            idle_ms,
            clear_at: None,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Pending idle-clear deadline, if armed
    pub fn clear_deadline(&self) -> Option<f64> {
        self.clear_at
    }

    /// Replace the buffer with sanitized `raw` and return the cleaned value
    pub fn set(&mut self, raw: &str, now_ms: f64) -> &str {
        self.value = sanitize(raw);
        self.rearm(now_ms);
        &self.value
    }

    /// Keypad press
    pub fn push_digit(&mut self, digit: char, now_ms: f64) -> &str {
        let mut raw = std::mem::take(&mut self.value);
        raw.push(digit);
        self.set(&raw, now_ms)
    }

    /// Remove the last digit. Returns None when there was nothing to remove.
    pub fn backspace(&mut self, now_ms: f64) -> Option<&str> {
        self.value.pop()?;
        self.rearm(now_ms);
        Some(self.value.as_str())
    }

    /// Empty the buffer and drop any pending deadline
    pub fn clear(&mut self) {
        self.value.clear();
        self.clear_at = None;
    }

    pub fn cancel_idle_clear(&mut self) {
        self.clear_at = None;
    }

    /// Fire the idle deadline if it has passed. Returns true if the buffer was cleared.
    pub fn poll(&mut self, now_ms: f64) -> bool {
        match self.clear_at {
            Some(deadline) if now_ms >= deadline => {
                self.clear_at = None;
                let had_value = !self.value.is_empty();
                self.value.clear();
                had_value
            }
            _ => false,
        }
    }

    fn rearm(&mut self, now_ms: f64) {
        self.clear_at = if self.value.is_empty() {
            None
        } else {
            Some(now_ms + self.idle_ms)
        };
    }
}
