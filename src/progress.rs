//! Persistent player progress
//!
//! Unlocked levels, per-level high scores and the last played level, stored
//! as one JSON document. Loading never fails: missing or damaged data reads
//! as a new player. Saving is best-effort.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::Value;

use crate::levels::LevelTable;
use crate::platform::KeyValueStore;

/// Storage key for the progress document
pub const STORAGE_KEY: &str = "toneRaindropProgress";

/// Everything persisted between sessions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProgressRecord {
    #[serde(rename = "unlocked")]
    pub unlocked: BTreeSet<String>,
    #[serde(rename = "highscores")]
    pub high_scores: BTreeMap<String, u32>,
    #[serde(rename = "lastLevel")]
    pub last_level: Option<String>,
}

/// Result of the post-run unlock check
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnlockOutcome {
    /// The next level, when this run unlocked it
    pub next_level: Option<&'static str>,
}

impl ProgressRecord {
    /// Decode a stored document, keeping whichever fields are well-formed
    pub fn from_json(json: &str) -> Self {
        let value: Value = match serde_json::from_str(json) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("Saved progress is not valid JSON ({err}), starting fresh");
                return Self::default();
            }
        };

        let unlocked = match value.get("unlocked") {
            Some(Value::Array(ids)) => ids
                .iter()
                .filter_map(|id| id.as_str().map(str::to_string))
                .collect(),
            _ => BTreeSet::new(),
        };

        let high_scores = match value.get("highscores") {
            Some(Value::Object(scores)) => scores
                .iter()
                .filter_map(|(id, score)| decode_score(score).map(|s| (id.clone(), s)))
                .collect(),
            _ => BTreeMap::new(),
        };

        let last_level = value
            .get("lastLevel")
            .and_then(Value::as_str)
            .map(str::to_string);

        Self {
            unlocked,
            high_scores,
            last_level,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn is_unlocked(&self, id: &str) -> bool {
        self.unlocked.contains(id)
    }

    /// Unlock one level. Returns whether anything changed.
    pub fn unlock(&mut self, id: &str) -> bool {
        self.unlocked.insert(id.to_string())
    }

    /// Unlock every level up to and including `id`. Returns whether anything changed.
    pub fn unlock_up_to(&mut self, id: &str, levels: &LevelTable) -> bool {
        let Some(index) = levels.index_of(id) else {
            return false;
        };
        let mut changed = false;
        for level in &levels.levels()[..=index] {
            changed |= self.unlock(level.id);
        }
        changed
    }

    /// True when every level before `id` is unlocked
    pub fn all_previous_unlocked(&self, id: &str, levels: &LevelTable) -> bool {
        match levels.index_of(id) {
            Some(index) => levels.levels()[..index]
                .iter()
                .all(|level| self.is_unlocked(level.id)),
            None => true,
        }
    }

    pub fn high_score(&self, id: &str) -> u32 {
        self.high_scores.get(id).copied().unwrap_or(0)
    }

    /// Store `score` if it beats the current best. Returns whether it did.
    pub fn record_high_score(&mut self, id: &str, score: u32) -> bool {
        if score > self.high_score(id) {
            self.high_scores.insert(id.to_string(), score);
            true
        } else {
            false
        }
    }

    /// Levels with no unlock gate are always open
    pub fn ensure_base_unlocks(&mut self, levels: &LevelTable) -> bool {
        let mut changed = false;
        for level in levels.levels().iter().filter(|l| l.unlock_score == 0) {
            changed |= self.unlock(level.id);
        }
        changed
    }

    /// Apply the branch side-unlock if its root is unlocked
    pub fn ensure_branch_unlocks(&mut self, levels: &LevelTable) -> bool {
        let Some(branch) = levels.branch() else {
            return false;
        };
        if !self.is_unlocked(branch.root) {
            return false;
        }
        let mut changed = false;
        for grant in branch.grants {
            changed |= self.unlock(grant);
        }
        changed
    }

    /// Post-run unlock check for a finished run on `level_id`
    pub fn unlock_after_run(&mut self, levels: &LevelTable, level_id: &str, score: u32) -> UnlockOutcome {
        let mut outcome = UnlockOutcome::default();

        if let Some(next) = levels.next_level(level_id) {
            let gated = next.requires_all_previous && !self.all_previous_unlocked(next.id, levels);
            if !self.is_unlocked(next.id) && score >= next.unlock_score && !gated {
                self.unlock_up_to(next.id, levels);
                outcome.next_level = Some(next.id);
            }
        }

        self.ensure_branch_unlocks(levels);
        outcome
    }
}

/// Scores may have been stored as numbers or numeric strings
fn decode_score(value: &Value) -> Option<u32> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (raw.is_finite() && raw >= 1.0).then(|| raw.min(u32::MAX as f64) as u32)
}

/// One-time migration: expand legacy ids and drop anything the table no longer defines
pub fn normalize(record: &mut ProgressRecord, levels: &LevelTable) {
    for alias in levels.legacy_aliases() {
        let Some(&first) = alias.expands_to.first() else {
            continue;
        };

        if record.unlocked.remove(alias.id) {
            for id in alias.expands_to {
                record.unlocked.insert(id.to_string());
            }
        }

        if record.last_level.as_deref() == Some(alias.id) {
            record.last_level = Some(first.to_string());
        }

        if let Some(legacy_score) = record.high_scores.remove(alias.id) {
            if legacy_score > 0 && record.high_score(first) == 0 {
                record.high_scores.insert(first.to_string(), legacy_score);
            }
        }
    }

    record.unlocked.retain(|id| levels.contains(id));
    record.high_scores.retain(|id, _| levels.contains(id));
    if record
        .last_level
        .as_deref()
        .is_some_and(|id| !levels.contains(id))
    {
        record.last_level = None;
    }
}

/// Read progress from storage, or a fresh record when absent or unreadable
pub fn load(storage: &dyn KeyValueStore) -> ProgressRecord {
    match storage.get(STORAGE_KEY) {
        Some(json) => {
            let record = ProgressRecord::from_json(&json);
            log::info!(
                "Loaded progress: {} unlocked, {} high scores",
                record.unlocked.len(),
                record.high_scores.len()
            );
            record
        }
        None => {
            log::info!("No saved progress found, starting fresh");
            ProgressRecord::default()
        }
    }
}

/// Write progress. Failures are logged and swallowed.
pub fn save(storage: &mut dyn KeyValueStore, record: &ProgressRecord) {
    let json = match record.to_json() {
        Ok(json) => json,
        Err(err) => {
            log::warn!("Could not encode progress: {err}");
            return;
        }
    };
    if let Err(err) = storage.set(STORAGE_KEY, &json) {
        log::warn!("Progress not saved: {err}");
    }
}

/// Progress record bound to its storage backend
pub struct ProgressStore {
    storage: Box<dyn KeyValueStore>,
    record: ProgressRecord,
}

impl ProgressStore {
    /// Load, migrate and re-save progress, then apply the unconditional unlocks
    pub fn open(storage: Box<dyn KeyValueStore>, levels: &LevelTable) -> Self {
        let record = load(storage.as_ref());
        let mut store = Self { storage, record };

        normalize(&mut store.record, levels);
        store.save();

        store.record.ensure_base_unlocks(levels);
        if store.record.ensure_branch_unlocks(levels) {
            store.save();
        }
        store
    }

    pub fn record(&self) -> &ProgressRecord {
        &self.record
    }

    pub fn record_mut(&mut self) -> &mut ProgressRecord {
        &mut self.record
    }

    pub fn storage(&self) -> &dyn KeyValueStore {
        self.storage.as_ref()
    }

    /// The backing store, for other records that share it
    pub fn storage_mut(&mut self) -> &mut dyn KeyValueStore {
        self.storage.as_mut()
    }

    pub fn is_unlocked(&self, id: &str) -> bool {
        self.record.is_unlocked(id)
    }

    pub fn high_score(&self, id: &str) -> u32 {
        self.record.high_score(id)
    }

    pub fn set_last_level(&mut self, id: &str) {
        self.record.last_level = Some(id.to_string());
        self.save();
    }

    pub fn save(&mut self) {
        save(self.storage.as_mut(), &self.record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{MemoryStore, StorageError};
    use proptest::prelude::*;

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable)
        }
    }

    fn table() -> LevelTable {
        LevelTable::standard()
    }

    #[test]
    fn test_from_json_malformed_is_fresh() {
        assert_eq!(ProgressRecord::from_json("{not json"), ProgressRecord::default());
        assert_eq!(ProgressRecord::from_json("null"), ProgressRecord::default());
        assert_eq!(ProgressRecord::from_json("42"), ProgressRecord::default());
    }

    #[test]
    fn test_from_json_validates_each_field() {
        let record = ProgressRecord::from_json(
            r#"{"unlocked": "1x", "highscores": [1, 2], "lastLevel": 7, "extra": true}"#,
        );
        assert_eq!(record, ProgressRecord::default());

        let record = ProgressRecord::from_json(
            r#"{"unlocked": ["1-4", 3, "2x"], "highscores": {"1-4": 12, "2x": "9", "x1": "junk", "x2": -4}, "lastLevel": "2x"}"#,
        );
        assert_eq!(record.unlocked.len(), 2);
        assert_eq!(record.high_score("1-4"), 12);
        assert_eq!(record.high_score("2x"), 9);
        assert!(!record.high_scores.contains_key("x1"));
        assert!(!record.high_scores.contains_key("x2"));
        assert_eq!(record.last_level.as_deref(), Some("2x"));
    }

    #[test]
    fn test_json_uses_stored_field_names() {
        let mut record = ProgressRecord::default();
        record.unlock("1-4");
        record.record_high_score("1-4", 21);
        let json = record.to_json().unwrap();
        assert_eq!(json, r#"{"unlocked":["1-4"],"highscores":{"1-4":21},"lastLevel":null}"#);
        assert_eq!(ProgressRecord::from_json(&json), record);
    }

    #[test]
    fn test_unlock_is_idempotent() {
        let mut record = ProgressRecord::default();
        assert!(record.unlock("1x"));
        assert!(!record.unlock("1x"));
        assert!(record.is_unlocked("1x"));
    }

    #[test]
    fn test_unlock_up_to() {
        let levels = table();
        let mut record = ProgressRecord::default();
        assert!(record.unlock_up_to("3x", &levels));
        assert!(["1-4", "1x", "2x", "3x"].iter().all(|id| record.is_unlocked(id)));
        assert!(!record.is_unlocked("4x"));
        assert!(!record.unlock_up_to("3x", &levels));
        assert!(!record.unlock_up_to("missing", &levels));
    }

    #[test]
    fn test_legacy_alias_is_expanded() {
        let levels = table();
        let mut record = ProgressRecord::from_json(
            r#"{"unlocked": ["1-4", "1x-4x", "retired"], "highscores": {"1x-4x": 33, "retired": 5}, "lastLevel": "1x-4x"}"#,
        );
        normalize(&mut record, &levels);

        assert!(!record.unlocked.contains("1x-4x"));
        assert!(!record.unlocked.contains("retired"));
        for id in ["1x", "2x", "3x", "4x"] {
            assert!(record.is_unlocked(id), "{id}");
        }
        assert_eq!(record.high_score("1x"), 33);
        assert!(!record.high_scores.contains_key("1x-4x"));
        assert!(!record.high_scores.contains_key("retired"));
        assert_eq!(record.last_level.as_deref(), Some("1x"));
    }

    #[test]
    fn test_legacy_score_does_not_overwrite() {
        let levels = table();
        let mut record = ProgressRecord::from_json(r#"{"highscores": {"1x-4x": 33, "1x": 25}}"#);
        normalize(&mut record, &levels);
        assert_eq!(record.high_score("1x"), 25);
    }

    #[test]
    fn test_unknown_last_level_is_cleared() {
        let levels = table();
        let mut record = ProgressRecord::from_json(r#"{"lastLevel": "gone"}"#);
        normalize(&mut record, &levels);
        assert!(record.last_level.is_none());
    }

    #[test]
    fn test_branch_unlocks() {
        let levels = table();
        let mut record = ProgressRecord::default();
        assert!(!record.ensure_branch_unlocks(&levels));
        record.unlock("4x");
        assert!(record.ensure_branch_unlocks(&levels));
        assert!(record.is_unlocked("x1"));
        assert!(record.is_unlocked("1-44-slow"));
        assert!(!record.ensure_branch_unlocks(&levels));
    }

    #[test]
    fn test_unlock_after_run_meets_threshold() {
        let levels = table();
        let mut record = ProgressRecord::default();
        record.ensure_base_unlocks(&levels);

        let outcome = record.unlock_after_run(&levels, "1-4", 19);
        assert_eq!(outcome, UnlockOutcome::default());

        let outcome = record.unlock_after_run(&levels, "1-4", 20);
        assert_eq!(outcome.next_level, Some("1x"));
        assert!(record.is_unlocked("1x"));
    }

    #[test]
    fn test_terminal_level_requires_all_previous() {
        let levels = table();
        let mut record = ProgressRecord::default();
        for id in ["1-4", "1x", "2x", "3x", "4x", "1-44-slow"] {
            record.unlock(id);
        }
        let outcome = record.unlock_after_run(&levels, "1-44-slow", 45);
        assert_eq!(outcome.next_level, None);
        assert!(!record.is_unlocked("1-44"));

        for id in ["x1", "x2", "x3", "x4"] {
            record.unlock(id);
        }
        let outcome = record.unlock_after_run(&levels, "1-44-slow", 45);
        assert_eq!(outcome.next_level, Some("1-44"));
    }

    #[test]
    fn test_unlock_after_run_rechecks_branch() {
        let levels = table();
        let mut record = ProgressRecord::default();
        record.unlock("4x");
        let outcome = record.unlock_after_run(&levels, "4x", 0);
        assert_eq!(outcome.next_level, None);
        assert!(record.is_unlocked("1-44-slow"));
    }

    #[test]
    fn test_open_applies_startup_rules_and_saves() {
        let levels = table();
        let storage = MemoryStore::with_entry(STORAGE_KEY, r#"{"unlocked": ["1x-4x"]}"#);
        let store = ProgressStore::open(Box::new(storage), &levels);

        assert!(store.is_unlocked("1-4"));
        assert!(store.is_unlocked("4x"));
        assert!(store.is_unlocked("x1"));
        assert!(store.is_unlocked("1-44-slow"));

        let saved = store.storage().get(STORAGE_KEY).unwrap();
        assert_eq!(&ProgressRecord::from_json(&saved), store.record());
    }

    #[test]
    fn test_open_with_broken_storage() {
        let mut store = ProgressStore::open(Box::new(BrokenStore), &table());
        assert!(store.is_unlocked("1-4"));
        store.set_last_level("1-4");
        assert_eq!(store.record().last_level.as_deref(), Some("1-4"));
    }

    fn id_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("1-4".to_string()),
            Just("1x".to_string()),
            Just("x3".to_string()),
            Just("1-44".to_string()),
            Just("1x-4x".to_string()),
            "[a-z0-9-]{1,6}",
        ]
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(
            unlocked in proptest::collection::btree_set(id_strategy(), 0..8),
            scores in proptest::collection::btree_map(id_strategy(), 0u32..80, 0..8),
            last in proptest::option::of(id_strategy()),
        ) {
            let levels = table();
            let mut once = ProgressRecord { unlocked, high_scores: scores, last_level: last };
            normalize(&mut once, &levels);
            let mut twice = once.clone();
            normalize(&mut twice, &levels);
            prop_assert_eq!(&once, &twice);
            prop_assert!(once.unlocked.iter().all(|id| levels.contains(id)));
            prop_assert!(once.high_scores.keys().all(|id| levels.contains(id)));
        }
    }
}
