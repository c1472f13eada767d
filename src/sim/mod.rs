//! Drop simulation
//!
//! Gameplay rules for the falling words. Kept free of rendering and platform
//! code:
//! - Time comes in as host timestamps (ms), never read from a clock
//! - Seeded RNG only
//! - Drops are processed in spawn order

pub mod difficulty;
pub mod effects;
pub mod state;
pub mod tick;

pub use difficulty::{Difficulty, difficulty};
pub use effects::{Effect, EffectKind, Effects};
pub use state::{Arena, GameEvent, GamePhase, Playfield, Raindrop, RunState};
pub use tick::{StepOutcome, clear_match, find_match, reveal_remaining, spawn_drop, step};
