//! Session state machine
//!
//! A `GameSession` owns everything a player touches: the level table, saved
//! progress, the live playfield and the current run. Hosts drive it with
//! timestamps (`frame`) and input calls, then drain `GameEvent`s for speech
//! and UI updates.
//!
//! Phases: `Idle -> Running <-> Paused`, `Running -> FinalReveal -> GameOver`,
//! and back to `Idle` on reset.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;
use thiserror::Error;

use crate::dialog::{self, Dialog, Typewriter};
use crate::input::ToneBuffer;
use crate::levels::{Level, LevelTable};
use crate::medals::{self, MedalTier};
use crate::platform::KeyValueStore;
use crate::progress::ProgressStore;
use crate::settings::{Settings, ToneLabels};
use crate::sim::{self, Arena, GameEvent, GamePhase, Playfield, RunState, StepOutcome};
use crate::tuning::Tuning;

pub const STATUS_STARTED: &str = "Drops incoming... type the tone numbers.";
pub const STATUS_RESUMED: &str = "Resumed. Paused runs do not count for highscores or unlocks.";
pub const STATUS_PAUSED: &str = "Paused. Score will not count for highscores or unlocks.";
pub const STATUS_NO_WORDS: &str = "No words loaded for this level.";

/// Why a run could not start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StartError {
    #[error("no words loaded for this level")]
    EmptyWordPool,
    #[error("a run is already active")]
    AlreadyRunning,
    #[error("the run has ended; reset before starting again")]
    RunOver,
}

/// Outcome of a finished run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub level_id: &'static str,
    pub score: u32,
    /// False for runs that were paused at any point
    pub recorded: bool,
    pub is_high_score: bool,
    pub new_medal: Option<MedalTier>,
    /// Level unlocked by this run
    pub unlocked_level: Option<&'static str>,
    /// Player-facing summary line
    pub message: String,
    pub dialog: Option<Dialog>,
}

pub struct GameSession {
    levels: LevelTable,
    progress: ProgressStore,
    tuning: Tuning,
    settings: Settings,
    rng: Pcg32,

    phase: GamePhase,
    run: RunState,
    field: Playfield,
    input: ToneBuffer,
    events: Vec<GameEvent>,

    status: String,
    last_spoken: Option<&'static str>,
    final_reveal_until: Option<f64>,
    summary: Option<RunSummary>,
    dialog: Option<(Dialog, Typewriter)>,
}

impl GameSession {
    /// Open saved progress and settings from `storage` and pick the starting level
    pub fn new(storage: Box<dyn KeyValueStore>, levels: LevelTable, tuning: Tuning, seed: u64) -> Self {
        let settings = Settings::load(storage.as_ref());
        let mut progress = ProgressStore::open(storage, &levels);

        let level_id = progress
            .record()
            .last_level
            .as_deref()
            .filter(|id| progress.is_unlocked(id))
            .and_then(|id| levels.get(id))
            .unwrap_or_else(|| levels.first())
            .id;
        progress.set_last_level(level_id);
        log::info!("Session ready on level {level_id} (seed {seed})");

        Self {
            run: RunState::new(level_id, tuning.start_lives),
            input: ToneBuffer::new(tuning.input_idle_clear_ms),
            field: Playfield::new(Arena::default()),
            levels,
            progress,
            tuning,
            settings,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Idle,
            events: Vec::new(),
            status: String::new(),
            last_spoken: None,
            final_reveal_until: None,
            summary: None,
            dialog: None,
        }
    }

    /// Standard level table and default tuning
    pub fn with_defaults(storage: Box<dyn KeyValueStore>, seed: u64) -> Self {
        Self::new(storage, LevelTable::standard(), Tuning::default(), seed)
    }

    /// Override the label mode for this session only (not saved)
    pub fn with_tone_labels(mut self, labels: ToneLabels) -> Self {
        self.settings.tone_labels = labels;
        self
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn levels(&self) -> &LevelTable {
        &self.levels
    }

    pub fn level(&self) -> &Level {
        self.levels.level_by_id(self.run.level_id)
    }

    pub fn run(&self) -> &RunState {
        &self.run
    }

    pub fn score(&self) -> u32 {
        self.run.score
    }

    pub fn lives(&self) -> u8 {
        self.run.lives
    }

    pub fn playfield(&self) -> &Playfield {
        &self.field
    }

    pub fn progress(&self) -> &ProgressStore {
        &self.progress
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace and persist settings
    pub fn set_settings(&mut self, settings: Settings) {
        settings.save(self.progress.storage_mut());
        self.settings = settings;
    }

    pub fn input(&self) -> &str {
        self.input.value()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn last_spoken(&self) -> Option<&'static str> {
        self.last_spoken
    }

    /// Summary of the most recent finished run
    pub fn summary(&self) -> Option<&RunSummary> {
        self.summary.as_ref()
    }

    pub fn dialog(&self) -> Option<&Dialog> {
        self.dialog.as_ref().map(|(dialog, _)| dialog)
    }

    /// Dialog text typed so far
    pub fn dialog_text(&self) -> Option<&str> {
        self.dialog.as_ref().map(|(_, typer)| typer.visible())
    }

    pub fn dismiss_dialog(&mut self) {
        if let Some((_, typer)) = &mut self.dialog {
            typer.cancel();
        }
        self.dialog = None;
    }

    /// Whether a run is in progress (level selection is locked)
    pub fn run_active(&self) -> bool {
        matches!(
            self.phase,
            GamePhase::Running | GamePhase::Paused | GamePhase::FinalReveal
        )
    }

    /// Levels the player may pick right now
    pub fn selectable_levels(&self) -> impl Iterator<Item = &Level> {
        let active = self.run_active();
        self.levels
            .levels()
            .iter()
            .filter(move |level| !active && self.progress.is_unlocked(level.id))
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Take every event raised since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.field.arena = Arena::new(width, height);
    }

    /// Switch level. Only unlocked levels, and only between runs.
    pub fn select_level(&mut self, id: &str) -> bool {
        if self.run_active() || !self.progress.is_unlocked(id) {
            return false;
        }
        let Some(level) = self.levels.get(id) else {
            return false;
        };
        let level_id = level.id;
        log::info!("Level selected: {level_id}");
        self.progress.set_last_level(level_id);
        self.run.level_id = level_id;
        self.reset();
        true
    }

    /// Start a fresh run, or continue a paused one
    pub fn start(&mut self, now_ms: f64) -> Result<(), StartError> {
        match self.phase {
            GamePhase::Running => return Err(StartError::AlreadyRunning),
            GamePhase::FinalReveal | GamePhase::GameOver => return Err(StartError::RunOver),
            GamePhase::Idle | GamePhase::Paused => {}
        }
        if !self.level().is_playable() {
            self.status = STATUS_NO_WORDS.to_string();
            return Err(StartError::EmptyWordPool);
        }

        self.dismiss_dialog();
        self.field.restart_clocks(now_ms);
        self.status = if self.run.paused_ever {
            STATUS_RESUMED
        } else {
            STATUS_STARTED
        }
        .to_string();
        log::info!(
            "{} run on {}",
            if self.phase == GamePhase::Paused { "Resuming" } else { "Starting" },
            self.run.level_id
        );
        self.phase = GamePhase::Running;
        Ok(())
    }

    pub fn resume(&mut self, now_ms: f64) -> Result<(), StartError> {
        if self.phase != GamePhase::Paused {
            return Err(StartError::AlreadyRunning);
        }
        self.start(now_ms)
    }

    /// Freeze the run. Paused runs are never recorded.
    pub fn pause(&mut self) -> bool {
        if self.phase != GamePhase::Running {
            return false;
        }
        self.phase = GamePhase::Paused;
        self.run.paused_ever = true;
        self.input.cancel_idle_clear();
        self.status = STATUS_PAUSED.to_string();
        log::info!("Paused at score {}", self.run.score);
        true
    }

    /// The start/pause button: pause a running game, restart a finished one,
    /// otherwise start. Ignored while the final reveal plays.
    pub fn toggle(&mut self, now_ms: f64) -> Result<(), StartError> {
        match self.phase {
            GamePhase::FinalReveal => Ok(()),
            GamePhase::Running => {
                self.pause();
                Ok(())
            }
            GamePhase::GameOver => {
                self.reset();
                self.start(now_ms)
            }
            GamePhase::Idle | GamePhase::Paused => self.start(now_ms),
        }
    }

    /// Back to Idle with a fresh run on the current level
    pub fn reset(&mut self) {
        self.field.clear();
        self.input.clear();
        self.dismiss_dialog();
        self.run = RunState::new(self.run.level_id, self.tuning.start_lives);
        self.phase = GamePhase::Idle;
        self.final_reveal_until = None;
        self.status.clear();
    }

    /// Advance to host time `now_ms`
    pub fn frame(&mut self, now_ms: f64) {
        match self.phase {
            GamePhase::Running => self.frame_running(now_ms),
            GamePhase::FinalReveal => self.frame_final_reveal(now_ms),
            GamePhase::Idle | GamePhase::Paused | GamePhase::GameOver => {}
        }
        if let Some((_, typer)) = &mut self.dialog {
            typer.advance(now_ms);
        }
    }

    fn frame_running(&mut self, now_ms: f64) {
        self.input.poll(now_ms);

        let first_new = self.events.len();
        let level = self.levels.level_by_id(self.run.level_id);
        let outcome = sim::step(
            &mut self.field,
            &mut self.run,
            level,
            &self.tuning,
            &mut self.rng,
            now_ms,
            &mut self.events,
        );

        for event in &self.events[first_new..] {
            match event {
                GameEvent::Spawned { text, .. } => self.last_spoken = Some(*text),
                GameEvent::Missed { tones, .. } if self.run.lives > 0 => {
                    self.status = format!("Missed: {}", self.settings.tone_labels.format(tones));
                }
                _ => {}
            }
        }

        if outcome == StepOutcome::LivesDepleted {
            self.begin_final_reveal(now_ms);
        }
    }

    fn begin_final_reveal(&mut self, now_ms: f64) {
        if self.phase == GamePhase::FinalReveal {
            return;
        }
        log::info!("Out of lives at score {}", self.run.score);
        self.phase = GamePhase::FinalReveal;
        self.input.cancel_idle_clear();
        sim::reveal_remaining(&mut self.field, self.tuning.last_reveal_duration);
        self.field.last_frame_ms = Some(now_ms);
        self.final_reveal_until = Some(now_ms + self.tuning.final_reveal_ms);
        self.events.push(GameEvent::FinalRevealStarted);
    }

    fn frame_final_reveal(&mut self, now_ms: f64) {
        let delta = self.field.advance_clock(now_ms, self.tuning.max_frame_delta);
        self.field.effects.age(delta);
        if self.final_reveal_until.is_some_and(|until| now_ms >= until) {
            self.end_game(now_ms);
        }
    }

    fn end_game(&mut self, now_ms: f64) {
        self.phase = GamePhase::GameOver;
        self.final_reveal_until = None;
        self.input.cancel_idle_clear();

        let summary = self.finalize_run();
        log::info!("Game over: {}", summary.message);
        self.status = summary.message.clone();
        self.dialog = summary
            .dialog
            .clone()
            .map(|dialog| {
                let typer = Typewriter::start(&dialog.text, now_ms);
                (dialog, typer)
            });
        self.summary = Some(summary);
        self.events.push(GameEvent::GameOver);
    }

    /// Record the finished run: high score, medal, unlocks, save
    fn finalize_run(&mut self) -> RunSummary {
        let level_id = self.run.level_id;
        let score = self.run.score;
        let base = format!("Game over. Score: {score}.");

        if self.run.paused_ever {
            return RunSummary {
                level_id,
                score,
                recorded: false,
                is_high_score: false,
                new_medal: None,
                unlocked_level: None,
                message: format!("{base} Paused runs don't save."),
                dialog: None,
            };
        }

        let record = self.progress.record_mut();
        let previous_high = record.high_score(level_id);
        let is_high_score = record.record_high_score(level_id, score);
        let new_medal = medals::newly_earned(previous_high, previous_high.max(score));
        let unlock = record.unlock_after_run(&self.levels, level_id, score);
        self.progress.save();

        let mut message = base;
        if is_high_score {
            message.push_str(" New high score!");
        }
        if new_medal.is_some() {
            message.push_str(" Medal earned!");
        }
        let unlocked_level = unlock.next_level;
        if let Some(level) = unlocked_level.and_then(|id| self.levels.get(id)) {
            log::info!("Unlocked level {}", level.id);
            message.push_str(&format!(" Unlocked {}.", level.label));
        }

        RunSummary {
            level_id,
            score,
            recorded: true,
            is_high_score,
            new_medal,
            unlocked_level,
            message,
            dialog: dialog::build_dialog(score, new_medal, is_high_score, unlocked_level.is_some()),
        }
    }

    /// Text field contents changed. Returns true if a drop was cleared.
    pub fn input_text(&mut self, raw: &str, now_ms: f64) -> bool {
        self.input.set(raw, now_ms);
        if self.phase != GamePhase::Running {
            self.input.cancel_idle_clear();
            return false;
        }
        self.try_match()
    }

    /// Keypad digit. Ignored outside a running game.
    pub fn append_digit(&mut self, digit: char, now_ms: f64) -> bool {
        if self.phase != GamePhase::Running {
            return false;
        }
        self.input.push_digit(digit, now_ms);
        self.try_match()
    }

    /// Keypad backspace. Ignored outside a running game.
    pub fn backspace(&mut self, now_ms: f64) {
        if self.phase != GamePhase::Running {
            return;
        }
        self.input.backspace(now_ms);
    }

    fn try_match(&mut self) -> bool {
        if self.input.is_empty() {
            return false;
        }
        let cleared = sim::clear_match(
            &mut self.field,
            &mut self.run,
            self.input.value(),
            &self.tuning,
            &mut self.events,
        );
        if cleared.is_some() {
            self.input.clear();
        }
        cleared.is_some()
    }

    /// Say the most recent word again
    pub fn replay_last(&mut self) -> Option<&'static str> {
        let text = self.last_spoken?;
        self.replay(text);
        Some(text)
    }

    /// Say the word under a point on the arena
    pub fn replay_at(&mut self, point: Vec2) -> Option<&'static str> {
        let text = self.field.drop_at(point)?.text;
        self.last_spoken = Some(text);
        self.replay(text);
        Some(text)
    }

    fn replay(&mut self, text: &'static str) {
        self.events.push(GameEvent::Replay { text });
        self.status = format!("Replaying: {text}");
    }
}
