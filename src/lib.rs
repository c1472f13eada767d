//! Tone Rain - a falling-word arcade game for Mandarin tone drills
//!
//! Core modules:
//! - `sim`: Drop simulation (spawning, falling, matching, effects)
//! - `session`: Run state machine and end-of-run bookkeeping
//! - `levels` / `vocab`: Level table and word catalog
//! - `progress` / `medals`: Persistent unlocks, high scores and medal tiers
//! - `platform`: Storage abstraction (LocalStorage on web)
//! - `speech`: Pronunciation playback
//! - `tuning`: Data-driven game balance

pub mod dialog;
pub mod input;
pub mod levels;
pub mod medals;
pub mod platform;
pub mod progress;
pub mod session;
pub mod settings;
pub mod sim;
pub mod speech;
pub mod tuning;
pub mod vocab;

pub use levels::{Level, LevelTable};
pub use medals::MedalTier;
pub use session::{GameSession, RunSummary, StartError};
pub use settings::{Settings, ToneLabels};
pub use tuning::Tuning;

/// Fixed arena geometry
pub mod consts {
    /// Gap between the canvas bottom and the miss line
    pub const FLOOR_INSET: f32 = 6.0;

    /// Drop radius is MIN + random * SPREAD
    pub const DROP_RADIUS_MIN: f32 = 24.0;
    pub const DROP_RADIUS_SPREAD: f32 = 14.0;
    /// Horizontal clearance beyond the radius when placing a new drop
    pub const SPAWN_MARGIN: f32 = 12.0;
    /// New drops start up to this far above the top edge
    pub const SPAWN_STAGGER: f32 = 40.0;

    /// Reveals are pinned at least this far above the floor
    pub const REVEAL_PIN: f32 = 12.0;
    pub const REVEAL_MIN_SIZE: f32 = 16.0;
    pub const REVEAL_SIZE_FACTOR: f32 = 0.7;
    pub const REVEAL_RISE: f32 = 18.0;

    /// Splash ring starts this far outside the drop
    pub const SPLASH_PAD: f32 = 6.0;
    pub const SPLASH_GROWTH: f32 = 12.0;

    pub const CAPTION_FONT_MIN: f32 = 12.0;
    pub const CAPTION_FONT_MAX: f32 = 18.0;
    pub const CAPTION_MIN_WIDTH: f32 = 120.0;
    pub const CAPTION_MAX_WIDTH: f32 = 220.0;
    pub const CAPTION_EDGE: f32 = 16.0;
    pub const CAPTION_RISE: f32 = 16.0;
    /// Latin glyph width estimate, in em
    pub const NARROW_GLYPH_EM: f32 = 0.55;
}
