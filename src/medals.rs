//! Medal tiers
//!
//! Medals are never stored; they are recomputed from a level's high score.

use serde::{Deserialize, Serialize};

/// Medal tiers in ascending order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MedalTier {
    Bronze,
    Silver,
    Gold,
    /// Hidden tier, only shown once earned
    Platinum,
}

impl MedalTier {
    /// All tiers, lowest first
    pub const ALL: [MedalTier; 4] = [
        MedalTier::Bronze,
        MedalTier::Silver,
        MedalTier::Gold,
        MedalTier::Platinum,
    ];

    /// Tiers shown as empty slots before they are earned
    pub const VISIBLE: [MedalTier; 3] = [MedalTier::Bronze, MedalTier::Silver, MedalTier::Gold];

    pub fn threshold(self) -> u32 {
        match self {
            MedalTier::Bronze => 20,
            MedalTier::Silver => 30,
            MedalTier::Gold => 40,
            MedalTier::Platinum => 50,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MedalTier::Bronze => "Bronze",
            MedalTier::Silver => "Silver",
            MedalTier::Gold => "Gold",
            MedalTier::Platinum => "Platinum",
        }
    }

    pub fn is_secret(self) -> bool {
        self == MedalTier::Platinum
    }
}

/// Every tier a score qualifies for, lowest first
pub fn earned(score: u32) -> Vec<MedalTier> {
    MedalTier::ALL
        .into_iter()
        .filter(|tier| score >= tier.threshold())
        .collect()
}

/// Highest tier earned by `new_high` that `old_high` did not already have
pub fn newly_earned(old_high: u32, new_high: u32) -> Option<MedalTier> {
    let before = earned(old_high);
    earned(new_high)
        .into_iter()
        .filter(|tier| !before.contains(tier))
        .max()
}

/// Lowest visible tier the score has not reached
pub fn next_visible(score: u32) -> Option<MedalTier> {
    MedalTier::VISIBLE
        .into_iter()
        .find(|tier| score < tier.threshold())
}

/// One slot in a level's medal row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MedalSlot {
    pub tier: MedalTier,
    pub achieved: bool,
}

/// Medal row for a high score: the visible tiers, plus the secret tier once earned
pub fn medal_row(high_score: u32) -> Vec<MedalSlot> {
    let mut row: Vec<MedalSlot> = MedalTier::VISIBLE
        .into_iter()
        .map(|tier| MedalSlot {
            tier,
            achieved: high_score >= tier.threshold(),
        })
        .collect();
    if high_score >= MedalTier::Platinum.threshold() {
        row.push(MedalSlot {
            tier: MedalTier::Platinum,
            achieved: true,
        });
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_earned_thresholds() {
        assert!(earned(19).is_empty());
        assert_eq!(earned(20), [MedalTier::Bronze]);
        assert_eq!(earned(39), [MedalTier::Bronze, MedalTier::Silver]);
        assert_eq!(earned(50), MedalTier::ALL);
    }

    #[test]
    fn test_newly_earned_picks_highest() {
        assert_eq!(newly_earned(0, 20), Some(MedalTier::Bronze));
        assert_eq!(newly_earned(10, 45), Some(MedalTier::Gold));
        assert_eq!(newly_earned(41, 55), Some(MedalTier::Platinum));
        assert_eq!(newly_earned(25, 29), None);
        assert_eq!(newly_earned(30, 30), None);
    }

    #[test]
    fn test_next_visible_skips_secret() {
        assert_eq!(next_visible(0), Some(MedalTier::Bronze));
        assert_eq!(next_visible(35), Some(MedalTier::Gold));
        assert_eq!(next_visible(40), None);
        assert_eq!(next_visible(60), None);
    }

    #[test]
    fn test_medal_row() {
        let row = medal_row(31);
        assert_eq!(row.len(), 3);
        assert!(row[0].achieved && row[1].achieved && !row[2].achieved);

        let row = medal_row(50);
        assert_eq!(row.len(), 4);
        assert_eq!(row[3].tier, MedalTier::Platinum);
    }

    proptest! {
        #[test]
        fn prop_earned_is_monotonic(a in 0u32..200, b in 0u32..200) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            let low_set = earned(low);
            let high_set = earned(high);
            prop_assert!(low_set.iter().all(|tier| high_set.contains(tier)));
        }
    }
}
