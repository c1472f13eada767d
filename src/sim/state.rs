//! Game state and core simulation types

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::effects::Effects;
use crate::consts::FLOOR_INSET;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Level chosen, waiting for start
    Idle,
    /// Drops falling
    Running,
    /// Frozen mid-run; the run no longer counts
    Paused,
    /// Lives ran out; remaining drops show their answers briefly
    FinalReveal,
    /// Run finished and recorded
    GameOver,
}

/// A falling word
#[derive(Debug, Clone, Serialize)]
pub struct Raindrop {
    pub id: u64,
    pub text: &'static str,
    pub tones: &'static str,
    pub translation: &'static str,
    /// Center, arena-local
    pub pos: Vec2,
    pub radius: f32,
    /// Units per second, fixed at spawn
    pub speed: f32,
}

impl Raindrop {
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.radius
    }

    pub fn contains(&self, point: Vec2) -> bool {
        self.pos.distance(point) < self.radius
    }
}

/// Arena size in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Arena {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Line a drop's bottom edge must not cross
    pub fn safe_floor(&self) -> f32 {
        self.height - FLOOR_INSET
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new(640.0, 480.0)
    }
}

/// Live drops, effects and frame clocks for one arena
#[derive(Debug, Clone)]
pub struct Playfield {
    pub arena: Arena,
    /// Live drops in spawn order
    pub drops: Vec<Raindrop>,
    pub effects: Effects,
    /// Timestamp of the previous frame (None before the first frame of a run)
    pub last_frame_ms: Option<f64>,
    pub last_spawn_ms: f64,
    next_id: u64,
}

impl Playfield {
    pub fn new(arena: Arena) -> Self {
        Self {
            arena,
            drops: Vec::new(),
            effects: Effects::default(),
            last_frame_ms: None,
            last_spawn_ms: 0.0,
            next_id: 0,
        }
    }

    /// Allocate a drop id. Ids keep increasing across restarts.
    pub fn next_drop_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Reset the frame clocks so the next frame starts a fresh delta
    pub fn restart_clocks(&mut self, now_ms: f64) {
        self.last_frame_ms = None;
        self.last_spawn_ms = now_ms;
    }

    /// Frame delta in seconds, clamped. The first frame contributes zero.
    pub fn advance_clock(&mut self, now_ms: f64, max_delta: f32) -> f32 {
        let last = self.last_frame_ms.unwrap_or(now_ms);
        self.last_frame_ms = Some(now_ms);
        (((now_ms - last) / 1000.0) as f32).clamp(0.0, max_delta)
    }

    /// Remove every drop and effect
    pub fn clear(&mut self) {
        self.drops.clear();
        self.effects.clear();
        self.last_frame_ms = None;
        self.last_spawn_ms = 0.0;
    }

    /// Live drop under a point. Overlapping drops resolve to the closest center.
    pub fn drop_at(&self, point: Vec2) -> Option<&Raindrop> {
        self.drops
            .iter()
            .filter(|drop| drop.contains(point))
            .min_by(|a, b| a.pos.distance(point).total_cmp(&b.pos.distance(point)))
    }
}

/// Per-run counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunState {
    pub level_id: &'static str,
    pub score: u32,
    pub lives: u8,
    /// Sticky once the run is paused: the result is never recorded
    pub paused_ever: bool,
}

impl RunState {
    pub fn new(level_id: &'static str, lives: u8) -> Self {
        Self {
            level_id,
            score: 0,
            lives,
            paused_ever: false,
        }
    }
}

/// Things the host reacts to (speech, sound, UI refresh)
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// A new drop entered; its word should be pronounced
    Spawned { id: u64, text: &'static str },
    Cleared { id: u64, text: &'static str, translation: &'static str },
    Missed { id: u64, tones: &'static str },
    /// Replay requested for a word
    Replay { text: &'static str },
    FinalRevealStarted,
    /// Run finished; the summary is available from the session
    GameOver,
}
