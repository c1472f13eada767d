//! Score-driven pacing
//!
//! Difficulty rises continuously with score: drops spawn more often (down to
//! a floor) and fall faster. Level scales are applied last.

use crate::tuning::Tuning;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Difficulty {
    /// Time between spawns (ms)
    pub spawn_interval_ms: f64,
    /// Base fall speed for new drops (units/s)
    pub fall_speed: f32,
}

/// Pacing for a score under a level's speed and spawn scales
pub fn difficulty(score: u32, speed_scale: f32, spawn_scale: f32, tuning: &Tuning) -> Difficulty {
    let level = 1.0 + f64::from(score) / f64::from(tuning.points_per_level);
    let spawn = (tuning.spawn_base_ms / level).max(tuning.min_spawn_interval_ms);
    Difficulty {
        spawn_interval_ms: spawn * f64::from(spawn_scale),
        fall_speed: (tuning.speed_base + score as f32 * tuning.speed_per_point) * speed_scale,
    }
}
