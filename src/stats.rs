//! Per-arm running reward statistics.
//!
//! Statistics are lifetime totals: they are never windowed, decayed, or cleared by an
//! elimination or a restart. Only [`RewardAccumulator::observe`] mutates them.

use std::collections::BTreeMap;

use crate::Arm;

/// Running statistics for one arm.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArmStats {
    /// Number of observed rewards.
    pub pulls: u64,
    /// Sum of observed rewards.
    pub total_reward: f64,
}

impl ArmStats {
    /// Empirical mean reward, or `0.0` for an arm with no observations.
    pub fn mean(&self) -> f64 {
        if self.pulls == 0 {
            0.0
        } else {
            self.total_reward / self.pulls as f64
        }
    }
}

/// Per-arm statistics for a fixed arm set `0..k`.
#[derive(Debug, Clone)]
pub struct RewardAccumulator {
    arms: Vec<ArmStats>,
}

impl RewardAccumulator {
    /// Create empty statistics for `k` arms.
    pub fn new(k: usize) -> Self {
        Self {
            arms: vec![ArmStats::default(); k],
        }
    }

    /// Number of arms tracked (`k`).
    pub fn len(&self) -> usize {
        self.arms.len()
    }

    /// True if no arms are tracked.
    pub fn is_empty(&self) -> bool {
        self.arms.is_empty()
    }

    /// Record one reward for `arm`.
    ///
    /// Returns `false` (and changes nothing) if `arm` is not in `0..k` or `reward` is not
    /// finite.
    pub fn observe(&mut self, arm: Arm, reward: f64) -> bool {
        if !reward.is_finite() {
            tracing::warn!(arm, reward, "dropping non-finite reward");
            return false;
        }
        let Some(s) = self.arms.get_mut(arm) else {
            tracing::warn!(arm, k = self.arms.len(), "dropping reward for unknown arm");
            return false;
        };
        s.pulls = s.pulls.saturating_add(1);
        s.total_reward += reward;
        true
    }

    /// Statistics for `arm`, if it exists.
    pub fn get(&self, arm: Arm) -> Option<&ArmStats> {
        self.arms.get(arm)
    }

    /// Observed reward count for `arm` (0 for unknown arms).
    pub fn pulls(&self, arm: Arm) -> u64 {
        self.arms.get(arm).map(|s| s.pulls).unwrap_or(0)
    }

    /// Cumulative reward for `arm` (0 for unknown arms).
    pub fn total_reward(&self, arm: Arm) -> f64 {
        self.arms.get(arm).map(|s| s.total_reward).unwrap_or(0.0)
    }

    /// Empirical mean for `arm` (0 for unknown or unobserved arms).
    pub fn mean(&self, arm: Arm) -> f64 {
        self.arms.get(arm).map(ArmStats::mean).unwrap_or(0.0)
    }

    /// Total observations across all arms.
    pub fn total_pulls(&self) -> u64 {
        self.arms.iter().map(|s| s.pulls).sum()
    }

    /// Empirical mean of every arm, eliminated or not.
    pub fn means(&self) -> BTreeMap<Arm, f64> {
        self.arms
            .iter()
            .enumerate()
            .map(|(arm, s)| (arm, s.mean()))
            .collect()
    }

    /// The arm in `candidates` with the highest mean.
    ///
    /// Ties go to the earliest candidate. Returns `None` for an empty slice.
    pub fn best_of(&self, candidates: &[Arm]) -> Option<Arm> {
        let mut best: Option<(Arm, f64)> = None;
        for &a in candidates {
            let m = self.mean(a);
            match best {
                Some((_, bm)) if m <= bm => {}
                _ => best = Some((a, m)),
            }
        }
        best.map(|(a, _)| a)
    }

    /// Forget all observations.
    pub fn clear(&mut self) {
        for s in &mut self.arms {
            *s = ArmStats::default();
        }
    }

    /// Iterate `(arm, stats)` in id order.
    pub fn iter(&self) -> impl Iterator<Item = (Arm, &ArmStats)> {
        self.arms.iter().enumerate()
    }
}
