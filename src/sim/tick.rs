//! Per-frame simulation step
//!
//! Spawns, advances and retires drops. Matching typed tone input against the
//! live drops also lives here, since clearing a drop is the other half of
//! the same bookkeeping.

use glam::Vec2;
use rand::Rng;

use super::difficulty::difficulty;
use super::state::{GameEvent, Playfield, Raindrop, RunState};
use crate::consts::*;
use crate::levels::Level;
use crate::tuning::Tuning;

/// What a frame left behind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    /// A miss took the last life; the run must end
    LivesDepleted,
}

/// Advance the playfield by one frame at `now_ms`
pub fn step<R: Rng + ?Sized>(
    field: &mut Playfield,
    run: &mut RunState,
    level: &Level,
    tuning: &Tuning,
    rng: &mut R,
    now_ms: f64,
    events: &mut Vec<GameEvent>,
) -> StepOutcome {
    let delta = field.advance_clock(now_ms, tuning.max_frame_delta);

    let pace = difficulty(run.score, level.speed_scale, level.spawn_scale, tuning);
    if now_ms - field.last_spawn_ms > pace.spawn_interval_ms {
        if let Some(drop) = spawn_drop(field, run, level, tuning, rng) {
            events.push(GameEvent::Spawned {
                id: drop.id,
                text: drop.text,
            });
        }
        field.last_spawn_ms = now_ms;
    }

    for drop in &mut field.drops {
        drop.pos.y += drop.speed * delta;
    }

    let floor = field.arena.safe_floor();
    let mut outcome = StepOutcome::Continue;
    let mut i = 0;
    while i < field.drops.len() {
        if field.drops[i].bottom() <= floor {
            i += 1;
            continue;
        }
        let drop = field.drops.remove(i);
        if miss_drop(field, run, &drop, tuning, events) == StepOutcome::LivesDepleted {
            outcome = StepOutcome::LivesDepleted;
            break;
        }
    }

    field.effects.age(delta);
    outcome
}

/// Add one drop if the cap and word pool allow it
pub fn spawn_drop<'a, R: Rng + ?Sized>(
    field: &'a mut Playfield,
    run: &RunState,
    level: &Level,
    tuning: &Tuning,
    rng: &mut R,
) -> Option<&'a Raindrop> {
    let pool = level.word_pool();
    if field.drops.len() >= tuning.max_live_drops || pool.is_empty() {
        return None;
    }
    let entry = pool[rng.random_range(0..pool.len())];

    let radius = DROP_RADIUS_MIN + rng.random::<f32>() * DROP_RADIUS_SPREAD;
    let margin = radius + SPAWN_MARGIN;
    let x = margin + rng.random::<f32>() * (field.arena.width - margin * 2.0).max(0.0);
    let y = -radius - rng.random::<f32>() * SPAWN_STAGGER;
    let pace = difficulty(run.score, level.speed_scale, level.spawn_scale, tuning);
    let speed = pace.fall_speed + rng.random::<f32>() * tuning.speed_jitter;

    let id = field.next_drop_id();
    log::debug!("spawn #{id} {} ({}) speed {speed:.1}", entry.text, entry.tones);
    field.drops.push(Raindrop {
        id,
        text: entry.text,
        tones: entry.tones,
        translation: entry.translation,
        pos: Vec2::new(x, y),
        radius,
        speed,
    });
    field.drops.last()
}

/// Retire a drop that reached the floor. The drop is already out of the field.
fn miss_drop(
    field: &mut Playfield,
    run: &mut RunState,
    drop: &Raindrop,
    tuning: &Tuning,
    events: &mut Vec<GameEvent>,
) -> StepOutcome {
    run.lives = run.lives.saturating_sub(1);
    let duration = if run.lives == 0 {
        tuning.last_reveal_duration
    } else {
        tuning.reveal_duration
    };
    let pinned = Vec2::new(drop.pos.x, drop.pos.y.min(field.arena.safe_floor() - REVEAL_PIN));
    field.effects.reveal(pinned, drop.tones, reveal_size(drop), duration);

    log::debug!("miss #{} ({}), {} lives left", drop.id, drop.tones, run.lives);
    events.push(GameEvent::Missed {
        id: drop.id,
        tones: drop.tones,
    });

    if run.lives == 0 {
        StepOutcome::LivesDepleted
    } else {
        StepOutcome::Continue
    }
}

fn reveal_size(drop: &Raindrop) -> f32 {
    (drop.radius * REVEAL_SIZE_FACTOR).max(REVEAL_MIN_SIZE)
}

/// Index of the drop a tone pattern should clear: the exact match closest to
/// the floor, earliest spawned on ties
pub fn find_match(drops: &[Raindrop], tones: &str) -> Option<usize> {
    drops
        .iter()
        .enumerate()
        .filter(|(_, drop)| drop.tones == tones)
        .fold(None, |best: Option<(usize, f32)>, (i, drop)| match best {
            Some((_, y)) if y >= drop.pos.y => best,
            _ => Some((i, drop.pos.y)),
        })
        .map(|(i, _)| i)
}

/// Clear the best match for `tones`, if any. Returns the cleared drop.
pub fn clear_match(
    field: &mut Playfield,
    run: &mut RunState,
    tones: &str,
    tuning: &Tuning,
    events: &mut Vec<GameEvent>,
) -> Option<Raindrop> {
    let index = find_match(&field.drops, tones)?;
    let drop = field.drops.remove(index);
    run.score += 1;

    field
        .effects
        .splash(drop.pos, drop.radius + SPLASH_PAD, tuning.splash_duration);
    let width = field.arena.width;
    field
        .effects
        .caption(drop.pos, drop.translation, drop.radius, width, tuning.caption_duration);

    log::debug!("clear #{} {} -> score {}", drop.id, drop.text, run.score);
    events.push(GameEvent::Cleared {
        id: drop.id,
        text: drop.text,
        translation: drop.translation,
    });
    Some(drop)
}

/// Turn every live drop into a reveal of its answer, pinned above the floor
pub fn reveal_remaining(field: &mut Playfield, duration: f32) {
    let pin = field.arena.safe_floor() - REVEAL_PIN;
    let drops = std::mem::take(&mut field.drops);
    for drop in &drops {
        let pos = Vec2::new(drop.pos.x, drop.pos.y.min(pin));
        field.effects.reveal(pos, drop.tones, reveal_size(drop), duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::LevelTable;
    use crate::sim::effects::EffectKind;
    use crate::sim::state::Arena;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn drop(id: u64, tones: &'static str, y: f32) -> Raindrop {
        Raindrop {
            id,
            text: "词",
            tones,
            translation: "ord",
            pos: Vec2::new(100.0, y),
            radius: 30.0,
            speed: 100.0,
        }
    }

    fn field_with(drops: Vec<Raindrop>) -> Playfield {
        let mut field = Playfield::new(Arena::new(400.0, 600.0));
        field.drops = drops;
        field
    }

    #[test]
    fn test_find_match_prefers_lowest_drop() {
        let drops = vec![drop(0, "23", 100.0), drop(1, "23", 300.0), drop(2, "14", 50.0)];
        assert_eq!(find_match(&drops, "23"), Some(1));
        assert_eq!(find_match(&drops, "14"), Some(2));
        assert_eq!(find_match(&drops, "2"), None);
        assert_eq!(find_match(&drops, "32"), None);
    }

    #[test]
    fn test_find_match_ties_take_earliest() {
        let drops = vec![drop(0, "4", 80.0), drop(1, "4", 200.0), drop(2, "4", 200.0)];
        assert_eq!(find_match(&drops, "4"), Some(1));
    }

    #[test]
    fn test_clear_scores_without_touching_lives() {
        let mut field = field_with(vec![drop(0, "23", 100.0), drop(1, "23", 300.0)]);
        let mut run = RunState::new("1-4", 3);
        let mut events = Vec::new();

        let cleared = clear_match(&mut field, &mut run, "23", &Tuning::default(), &mut events);
        assert_eq!(cleared.map(|d| d.id), Some(1));
        assert_eq!(run.score, 1);
        assert_eq!(run.lives, 3);
        assert_eq!(field.drops.len(), 1);
        assert_eq!(field.effects.len(), 2);
        assert!(matches!(events[0], GameEvent::Cleared { id: 1, .. }));

        assert!(clear_match(&mut field, &mut run, "11", &Tuning::default(), &mut events).is_none());
        assert_eq!(run.score, 1);
    }

    #[test]
    fn test_floor_miss_costs_one_life() {
        let tuning = Tuning::default();
        let level = LevelTable::standard().first().clone();
        let mut field = field_with(vec![drop(0, "3", 590.0), drop(1, "1", 100.0)]);
        let mut run = RunState::new(level.id, 3);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut events = Vec::new();

        field.restart_clocks(0.0);
        let outcome = step(&mut field, &mut run, &level, &tuning, &mut rng, 0.0, &mut events);

        assert_eq!(outcome, StepOutcome::Continue);
        assert_eq!(run.lives, 2);
        assert_eq!(run.score, 0);
        assert_eq!(field.drops.len(), 1);
        assert_eq!(events, [GameEvent::Missed { id: 0, tones: "3" }]);

        let reveal = field.effects.iter().next().unwrap();
        assert_eq!(reveal.pos.y, 600.0 - FLOOR_INSET - REVEAL_PIN);
        assert_eq!(reveal.duration, tuning.reveal_duration);
    }

    #[test]
    fn test_last_life_stops_processing() {
        let tuning = Tuning::default();
        let level = LevelTable::standard().first().clone();
        let mut field = field_with(vec![drop(0, "1", 590.0), drop(1, "2", 590.0), drop(2, "3", 10.0)]);
        let mut run = RunState::new(level.id, 1);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut events = Vec::new();

        field.restart_clocks(0.0);
        let outcome = step(&mut field, &mut run, &level, &tuning, &mut rng, 0.0, &mut events);
        assert_eq!(outcome, StepOutcome::LivesDepleted);
        assert_eq!(run.lives, 0);
        assert_eq!(field.drops.len(), 2);
        let reveal = field.effects.iter().next().unwrap();
        assert_eq!(reveal.duration, tuning.last_reveal_duration);
    }

    #[test]
    fn test_spawn_respects_interval_and_cap() {
        let tuning = Tuning::default();
        let level = LevelTable::standard().first().clone();
        let mut field = field_with(Vec::new());
        let mut run = RunState::new(level.id, 3);
        let mut rng = Pcg32::seed_from_u64(7);
        let mut events = Vec::new();

        field.restart_clocks(0.0);
        step(&mut field, &mut run, &level, &tuning, &mut rng, 1000.0, &mut events);
        assert!(field.drops.is_empty());
        step(&mut field, &mut run, &level, &tuning, &mut rng, 1901.0, &mut events);
        assert_eq!(field.drops.len(), 1);
        assert!(matches!(events[0], GameEvent::Spawned { id: 0, .. }));

        for _ in 0..40 {
            spawn_drop(&mut field, &run, &level, &tuning, &mut rng);
        }
        assert_eq!(field.drops.len(), tuning.max_live_drops);
    }

    #[test]
    fn test_spawned_drop_shape() {
        let tuning = Tuning::default();
        let level = LevelTable::standard().first().clone();
        let mut field = field_with(Vec::new());
        let run = RunState::new(level.id, 3);
        let mut rng = Pcg32::seed_from_u64(99);

        for _ in 0..tuning.max_live_drops {
            let drop = spawn_drop(&mut field, &run, &level, &tuning, &mut rng).unwrap();
            assert!((24.0..=38.0).contains(&drop.radius));
            assert!(drop.pos.x >= drop.radius + SPAWN_MARGIN);
            assert!(drop.pos.x <= 400.0 - drop.radius - SPAWN_MARGIN);
            assert!(drop.pos.y <= -drop.radius);
            assert!(drop.pos.y >= -drop.radius - SPAWN_STAGGER);
            assert!((70.0..=90.0).contains(&drop.speed));
            assert_eq!(drop.tones.len(), 1);
        }
    }

    #[test]
    fn test_empty_pool_never_spawns() {
        let tuning = Tuning::default();
        let level = Level::new("empty", "Empty", vec!["9"], 0);
        let mut field = field_with(Vec::new());
        let run = RunState::new(level.id, 3);
        let mut rng = Pcg32::seed_from_u64(3);
        assert!(spawn_drop(&mut field, &run, &level, &tuning, &mut rng).is_none());
    }

    #[test]
    fn test_same_seed_same_drops() {
        let tuning = Tuning::default();
        let level = LevelTable::standard().level_by_id("1-44").clone();
        let run = RunState::new(level.id, 3);
        let mut a = field_with(Vec::new());
        let mut b = field_with(Vec::new());
        let mut rng_a = Pcg32::seed_from_u64(42);
        let mut rng_b = Pcg32::seed_from_u64(42);
        for _ in 0..5 {
            spawn_drop(&mut a, &run, &level, &tuning, &mut rng_a);
            spawn_drop(&mut b, &run, &level, &tuning, &mut rng_b);
        }
        let key = |f: &Playfield| f.drops.iter().map(|d| (d.text, d.pos, d.speed)).collect::<Vec<_>>();
        assert_eq!(key(&a), key(&b));
    }

    #[test]
    fn test_reveal_remaining_pins_above_floor() {
        let mut field = field_with(vec![drop(0, "12", 700.0), drop(1, "3", 40.0)]);
        reveal_remaining(&mut field, 0.5);
        assert!(field.drops.is_empty());
        let ys: Vec<f32> = field.effects.iter().map(|e| e.pos.y).collect();
        assert_eq!(ys, [582.0, 40.0]);
        assert!(field
            .effects
            .iter()
            .all(|e| matches!(e.kind, EffectKind::Reveal { .. }) && e.duration == 0.5));
    }
}
