//! Transient visual effects
//!
//! Splash rings on a correct answer, tone reveals on a miss, translation
//! captions. Each one ages independently and is dropped once its life passes
//! its duration. Renderers derive fade and drift from `progress()`.

use glam::Vec2;

use crate::consts::*;

#[derive(Debug, Clone, PartialEq)]
pub enum EffectKind {
    /// Expanding ring where a drop was cleared
    Splash { radius: f32 },
    /// The correct tone pattern for a drop that was not answered
    Reveal { tones: &'static str, size: f32 },
    /// Wrapped translation text
    Caption { lines: Vec<String>, font_size: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Effect {
    pub kind: EffectKind,
    pub pos: Vec2,
    /// Seconds alive
    pub life: f32,
    /// Seconds until removal
    pub duration: f32,
}

impl Effect {
    /// 0 at birth, 1 at end of life
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.life / self.duration).clamp(0.0, 1.0)
    }

    /// Fade-out opacity
    pub fn alpha(&self) -> f32 {
        match self.kind {
            EffectKind::Splash { .. } => 0.6 - self.progress(),
            _ => 0.95 - self.progress() * 0.95,
        }
    }

    /// Where to draw it this frame (text floats upward as it fades)
    pub fn draw_pos(&self) -> Vec2 {
        let rise = match self.kind {
            EffectKind::Splash { .. } => 0.0,
            EffectKind::Reveal { .. } => REVEAL_RISE,
            EffectKind::Caption { .. } => CAPTION_RISE,
        };
        self.pos - Vec2::new(0.0, self.progress() * rise)
    }
}

/// All live effects
#[derive(Debug, Clone, Default)]
pub struct Effects {
    items: Vec<Effect>,
}

impl Effects {
    pub fn push(&mut self, kind: EffectKind, pos: Vec2, duration: f32) {
        self.items.push(Effect {
            kind,
            pos,
            life: 0.0,
            duration,
        });
    }

    pub fn splash(&mut self, pos: Vec2, radius: f32, duration: f32) {
        self.push(EffectKind::Splash { radius }, pos, duration);
    }

    pub fn reveal(&mut self, pos: Vec2, tones: &'static str, size: f32, duration: f32) {
        self.push(EffectKind::Reveal { tones, size }, pos, duration);
    }

    /// Add a translation caption for a drop at `pos`, kept inside the arena
    pub fn caption(&mut self, pos: Vec2, text: &str, drop_radius: f32, arena_width: f32, duration: f32) {
        if text.is_empty() {
            return;
        }
        let font_size = (drop_radius * 0.55).clamp(CAPTION_FONT_MIN, CAPTION_FONT_MAX);
        let max_width = (arena_width - 2.0 * CAPTION_EDGE).clamp(CAPTION_MIN_WIDTH, CAPTION_MAX_WIDTH);
        let half = max_width / 2.0;
        // Not clamp(): on narrow arenas the bounds cross.
        let x = pos.x.max(CAPTION_EDGE + half).min(arena_width - CAPTION_EDGE - half);
        let lines = wrap_lines(text, font_size, max_width);
        self.push(
            EffectKind::Caption { lines, font_size },
            Vec2::new(x, pos.y),
            duration,
        );
    }

    /// Advance every effect and drop the expired ones
    pub fn age(&mut self, delta: f32) {
        for effect in &mut self.items {
            effect.life += delta;
        }
        self.items.retain(|effect| effect.life <= effect.duration);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Effect> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// Estimated rendered width of `text` at `font_size`
pub fn text_width(text: &str, font_size: f32) -> f32 {
    text.chars()
        .map(|c| if is_wide(c) { font_size } else { font_size * NARROW_GLYPH_EM })
        .sum()
}

fn is_wide(c: char) -> bool {
    ('\u{2E80}'..='\u{9FFF}').contains(&c) || ('\u{FF00}'..='\u{FFEF}').contains(&c)
}

/// Greedy word wrap. A single word wider than `max_width` keeps its own line.
pub fn wrap_lines(text: &str, font_size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        if line.is_empty() {
            line.push_str(word);
            continue;
        }
        let candidate = format!("{line} {word}");
        if text_width(&candidate, font_size) > max_width {
            lines.push(std::mem::replace(&mut line, word.to_string()));
        } else {
            line = candidate;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    if lines.is_empty() {
        lines.push(text.to_string());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_removes_expired() {
        let mut effects = Effects::default();
        effects.splash(Vec2::ZERO, 30.0, 0.45);
        effects.reveal(Vec2::ZERO, "23", 20.0, 0.9);
        effects.age(0.4);
        assert_eq!(effects.len(), 2);
        effects.age(0.1);
        assert_eq!(effects.len(), 1);
        effects.age(0.5);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_fade_and_rise() {
        let mut effects = Effects::default();
        effects.reveal(Vec2::new(50.0, 100.0), "4", 20.0, 1.0);
        effects.age(0.5);
        let reveal = effects.iter().next().unwrap();
        assert!((reveal.alpha() - 0.475).abs() < 1e-6);
        assert!((reveal.draw_pos().y - 91.0).abs() < 1e-4);
    }

    #[test]
    fn test_wrap_short_text_single_line() {
        assert_eq!(wrap_lines("bok", 14.0, 200.0), ["bok"]);
    }

    #[test]
    fn test_wrap_breaks_long_text() {
        let lines = wrap_lines("förstå (när man hör)", 18.0, 120.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.join(" "), "förstå (när man hör)");
        for line in &lines[..lines.len() - 1] {
            assert!(text_width(line, 18.0) <= 120.0);
        }
    }

    #[test]
    fn test_wrap_keeps_overlong_word() {
        assert_eq!(wrap_lines("mänskligheten", 18.0, 50.0), ["mänskligheten"]);
        assert_eq!(wrap_lines("   ", 18.0, 50.0), ["   "]);
    }

    #[test]
    fn test_caption_stays_inside_arena() {
        let mut effects = Effects::default();
        effects.caption(Vec2::new(5.0, 200.0), "kaffe", 30.0, 400.0, 0.9);
        let caption = effects.iter().next().unwrap();
        assert_eq!(caption.pos.x, 16.0 + 110.0);
        match &caption.kind {
            EffectKind::Caption { lines, font_size } => {
                assert_eq!(lines, &["kaffe"]);
                assert_eq!(*font_size, 16.5);
            }
            other => panic!("unexpected effect {other:?}"),
        }
    }

    #[test]
    fn test_caption_skips_empty_text() {
        let mut effects = Effects::default();
        effects.caption(Vec2::ZERO, "", 30.0, 400.0, 0.9);
        assert!(effects.is_empty());
    }
}
