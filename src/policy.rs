//! Unified `HalvingScheduler` trait for the three Sequential Halving variants.
//!
//! [`SequentialHalving`], [`TimedSequentialHalving`] and [`AnytimeSequentialHalving`]
//! share the same caller loop: `choose_arm() -> Arm`, obtain a reward elsewhere, then
//! `observe_reward(arm, reward)`. They differ only in how a round ends.
//! This trait makes the loop explicit so harness code can be written once.
//!
//! [`SequentialHalving`]: crate::SequentialHalving
//! [`TimedSequentialHalving`]: crate::TimedSequentialHalving
//! [`AnytimeSequentialHalving`]: crate::AnytimeSequentialHalving

use std::collections::BTreeMap;

use crate::{Arm, RewardAccumulator, RoundBoundary};

/// Where a budgeted scheduler is in its ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    /// Pulling active arms round-robin in round `round` (1-based).
    Sampling { round: u32 },
    /// One arm left and its allotment spent; `choose_arm` keeps returning it.
    Terminal,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Terminal)
    }
}

/// Common interface for Sequential Halving schedulers.
///
/// # Example
///
/// ```rust
/// use seqhalve::{BudgetConfig, HalvingScheduler, SequentialHalving};
///
/// fn drive<S: HalvingScheduler>(s: &mut S, pulls: usize) {
///     for _ in 0..pulls {
///         let arm = s.choose_arm();
///         s.observe_reward(arm, arm as f64);
///     }
/// }
///
/// let mut sh = SequentialHalving::new(BudgetConfig::new(4, 16)).unwrap();
/// drive(&mut sh, 16);
/// assert_eq!(sh.recommend(), 3);
/// ```
pub trait HalvingScheduler {
    /// Next arm to pull.
    fn choose_arm(&mut self) -> Arm;

    /// Feed back the reward for a pull of `arm`.
    ///
    /// Rewards for arms that are no longer active still update their statistics;
    /// they never put the arm back into the active set.
    fn observe_reward(&mut self, arm: Arm, reward: f64);

    /// Per-arm statistics for all `k` arms.
    fn stats(&self) -> &RewardAccumulator;

    /// Currently surviving arms, in pull order.
    fn active_set(&self) -> &[Arm];

    /// Every arm returned by `choose_arm`, if history tracking was enabled.
    fn history(&self) -> Option<&[Arm]>;

    /// Round boundaries so far, if history tracking was enabled (empty otherwise).
    fn halvings(&self) -> &[RoundBoundary];

    /// Current best guess for the best arm.
    fn recommend(&self) -> Arm;

    /// Pulls handed out by the scheduler's budget accounting.
    fn pulls_issued(&self) -> u64;

    /// Return to the freshly-constructed state, keeping the configuration.
    fn reset(&mut self);

    /// Empirical mean of every arm, including eliminated ones.
    fn total_means(&self) -> BTreeMap<Arm, f64> {
        self.stats().means()
    }

    /// Number of arms in the problem.
    fn num_arms(&self) -> usize {
        self.stats().len()
    }
}

macro_rules! impl_halving_scheduler {
    ($ty:ty $(, $gen:ident : $bound:path)?) => {
        impl$(<$gen: $bound>)? HalvingScheduler for $ty {
            fn choose_arm(&mut self) -> Arm {
                self.choose_arm()
            }
            fn observe_reward(&mut self, arm: Arm, reward: f64) {
                self.observe_reward(arm, reward);
            }
            fn stats(&self) -> &RewardAccumulator {
                self.stats()
            }
            fn active_set(&self) -> &[Arm] {
                self.active_set()
            }
            fn history(&self) -> Option<&[Arm]> {
                self.history()
            }
            fn halvings(&self) -> &[RoundBoundary] {
                self.halvings()
            }
            fn recommend(&self) -> Arm {
                self.recommend()
            }
            fn pulls_issued(&self) -> u64 {
                self.pulls_issued()
            }
            fn reset(&mut self) {
                self.reset();
            }
        }
    };
}

impl_halving_scheduler!(crate::SequentialHalving);
impl_halving_scheduler!(crate::TimedSequentialHalving<C>, C: crate::Clock);
impl_halving_scheduler!(crate::AnytimeSequentialHalving<C>, C: crate::Clock);
