//! Level progression table
//!
//! Levels form a strict order. Each one drills a subset of tone patterns and
//! unlocks from a score reached on the level before it.

use crate::vocab::{self, DOUBLE_TONES, SINGLE_TONES, WordEntry};

/// A playable level
#[derive(Debug, Clone)]
pub struct Level {
    pub id: &'static str,
    pub label: &'static str,
    /// Tone patterns drilled by this level
    pub tones: Vec<&'static str>,
    /// Score needed on the previous level to unlock this one
    pub unlock_score: u32,
    /// Multiplier on fall speed
    pub speed_scale: f32,
    /// Multiplier on spawn interval
    pub spawn_scale: f32,
    /// Only unlockable once every earlier level is unlocked
    pub requires_all_previous: bool,
    word_pool: Vec<WordEntry>,
}

impl Level {
    pub fn new(id: &'static str, label: &'static str, tones: Vec<&'static str>, unlock_score: u32) -> Self {
        let word_pool = tones
            .iter()
            .flat_map(|tone| vocab::lookup(tone).iter().copied())
            .collect();
        Self {
            id,
            label,
            tones,
            unlock_score,
            speed_scale: 1.0,
            spawn_scale: 1.0,
            requires_all_previous: false,
            word_pool,
        }
    }

    pub fn scaled(mut self, speed_scale: f32, spawn_scale: f32) -> Self {
        self.speed_scale = speed_scale;
        self.spawn_scale = spawn_scale;
        self
    }

    pub fn requiring_all_previous(mut self) -> Self {
        self.requires_all_previous = true;
        self
    }

    /// Catalog words for every pattern, in catalog order
    pub fn word_pool(&self) -> &[WordEntry] {
        &self.word_pool
    }

    pub fn is_playable(&self) -> bool {
        !self.word_pool.is_empty()
    }
}

/// A retired level id that now maps onto several current levels
#[derive(Debug, Clone, Copy)]
pub struct LegacyAlias {
    pub id: &'static str,
    pub expands_to: &'static [&'static str],
}

/// Unlocking `root` also grants `grants`
#[derive(Debug, Clone, Copy)]
pub struct BranchUnlock {
    pub root: &'static str,
    pub grants: &'static [&'static str],
}

/// Ordered level list plus the migration and side-unlock rules tied to it
#[derive(Debug, Clone)]
pub struct LevelTable {
    levels: Vec<Level>,
    legacy: Vec<LegacyAlias>,
    branch: Option<BranchUnlock>,
}

impl LevelTable {
    /// Build a table from an ordered level list. None when the list is empty.
    pub fn new(levels: Vec<Level>) -> Option<Self> {
        (!levels.is_empty()).then(|| Self::from_levels(levels))
    }

    fn from_levels(levels: Vec<Level>) -> Self {
        Self {
            levels,
            legacy: Vec::new(),
            branch: None,
        }
    }

    pub fn with_legacy_alias(mut self, alias: LegacyAlias) -> Self {
        self.legacy.push(alias);
        self
    }

    pub fn with_branch(mut self, branch: BranchUnlock) -> Self {
        self.branch = Some(branch);
        self
    }

    /// The shipped eleven-level table
    pub fn standard() -> Self {
        let starting = |digit: char| -> Vec<&'static str> {
            DOUBLE_TONES.iter().copied().filter(|t| t.starts_with(digit)).collect()
        };
        let ending = |digit: char| -> Vec<&'static str> {
            DOUBLE_TONES.iter().copied().filter(|t| t.ends_with(digit)).collect()
        };
        let everything: Vec<&'static str> = SINGLE_TONES.iter().chain(DOUBLE_TONES.iter()).copied().collect();

        Self::from_levels(vec![
            Level::new("1-4", "1-4", SINGLE_TONES.to_vec(), 0),
            Level::new("1x", "1x", starting('1'), 20),
            Level::new("2x", "2x", starting('2'), 20),
            Level::new("3x", "3x", starting('3'), 20),
            Level::new("4x", "4x", starting('4'), 20),
            Level::new("x1", "x1", ending('1'), 20),
            Level::new("x2", "x2", ending('2'), 20),
            Level::new("x3", "x3", ending('3'), 20),
            Level::new("x4", "x4", ending('4'), 20),
            Level::new("1-44-slow", "1-44 (Slow)", everything.clone(), 20).scaled(0.85, 1.2),
            Level::new("1-44", "1-44", everything, 20).requiring_all_previous(),
        ])
        .with_legacy_alias(LegacyAlias {
            id: "1x-4x",
            expands_to: &["1x", "2x", "3x", "4x"],
        })
        .with_branch(BranchUnlock {
            root: "4x",
            grants: &["x1", "1-44-slow"],
        })
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn first(&self) -> &Level {
        // Non-empty: `new` refuses an empty list
        &self.levels[0]
    }

    pub fn legacy_aliases(&self) -> &[LegacyAlias] {
        &self.legacy
    }

    pub fn branch(&self) -> Option<&BranchUnlock> {
        self.branch.as_ref()
    }

    pub fn get(&self, id: &str) -> Option<&Level> {
        self.levels.iter().find(|level| level.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.levels.iter().position(|level| level.id == id)
    }

    /// Level by id, falling back to the first level for unknown ids
    pub fn level_by_id(&self, id: &str) -> &Level {
        self.get(id).unwrap_or_else(|| self.first())
    }

    /// Positional successor (None at the end or for unknown ids)
    pub fn next_level(&self, id: &str) -> Option<&Level> {
        let index = self.index_of(id)?;
        self.levels.get(index + 1)
    }
}

impl Default for LevelTable {
    fn default() -> Self {
        Self::standard()
    }
}
