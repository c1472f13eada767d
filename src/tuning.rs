//! Data-driven game balance
//!
//! Every knob has a default; a JSON overlay may replace any subset of them.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Spawn interval at score 0 (ms), before level scaling
    pub spawn_base_ms: f64,
    /// Spawn interval floor (ms), before level scaling
    pub min_spawn_interval_ms: f64,
    /// Fall speed at score 0 (units/s), before level scaling
    pub speed_base: f32,
    /// Fall speed gained per point
    pub speed_per_point: f32,
    /// Points per difficulty step (continuous)
    pub points_per_level: f32,
    /// Random extra speed added per drop, 0..jitter
    pub speed_jitter: f32,
    pub start_lives: u8,
    /// Drops live at once; spawning pauses at the cap
    pub max_live_drops: usize,
    /// Longest frame step (s), so a suspended tab cannot tunnel drops
    pub max_frame_delta: f32,
    pub reveal_duration: f32,
    /// Reveal for the miss that ends the run
    pub last_reveal_duration: f32,
    pub caption_duration: f32,
    pub splash_duration: f32,
    pub final_reveal_ms: f64,
    pub input_idle_clear_ms: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            spawn_base_ms: 1900.0,
            min_spawn_interval_ms: 850.0,
            speed_base: 70.0,
            speed_per_point: 2.5,
            points_per_level: 9.0,
            speed_jitter: 20.0,
            start_lives: 3,
            max_live_drops: 19,
            max_frame_delta: 0.08,
            reveal_duration: 0.9,
            last_reveal_duration: 0.5,
            caption_duration: 0.9,
            splash_duration: 0.45,
            final_reveal_ms: 500.0,
            input_idle_clear_ms: 1000.0,
        }
    }
}

impl Tuning {
    /// Overlay a (possibly partial) JSON document on the defaults
    pub fn from_json(json: &str) -> Self {
        serde_json::from_str(json).unwrap_or_else(|err| {
            log::warn!("Ignoring invalid tuning ({err}), using defaults");
            Self::default()
        })
    }
}
