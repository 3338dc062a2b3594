//! Sequential Halving with a fixed pull budget (Karnin, Koren & Somekh 2013).
//!
//! The ladder has `ceil(log2 k)` rounds. In each round every active arm is pulled
//! `quota` times, round-robin; then the worse half (by empirical mean) is dropped and
//! the budget for the next round is derived according to [`BudgetSplit`]. The last arm
//! standing receives whatever budget remains, after which the scheduler is
//! [`Phase::Terminal`].
//!
//! Rounds end lazily: the halving for a finished round happens inside the *next*
//! `choose_arm` call, after the caller has observed the round's last reward.

use crate::history::History;
use crate::{
    halve, round_quota, Arm, BoundaryKind, BudgetSplit, HalvingError, Phase, RewardAccumulator,
    RoundBoundary,
};

/// Configuration for [`SequentialHalving`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BudgetConfig {
    /// Number of arms `k` (must be ≥ 1).
    pub arms: usize,
    /// Total pull budget `B`.
    pub budget: u64,
    /// How the next round's budget is derived at each halving.
    pub split: BudgetSplit,
    /// Record every chosen arm and every round boundary.
    pub track_history: bool,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            arms: 10,
            budget: 1000,
            split: BudgetSplit::Halved,
            track_history: false,
        }
    }
}

impl BudgetConfig {
    /// `k` arms and a budget of `budget` pulls, default split, no history.
    pub fn new(arms: usize, budget: u64) -> Self {
        Self {
            arms,
            budget,
            ..Self::default()
        }
    }

    pub fn with_split(mut self, split: BudgetSplit) -> Self {
        self.split = split;
        self
    }

    pub fn with_history(mut self, track: bool) -> Self {
        self.track_history = track;
        self
    }
}

/// Fixed-budget Sequential Halving scheduler.
#[derive(Debug, Clone)]
pub struct SequentialHalving {
    cfg: BudgetConfig,
    stats: RewardAccumulator,
    active: Vec<Arm>,
    history: History,
    phase: Phase,
    /// Budget the current round was planned with.
    round_budget: u64,
    /// Pulls per active arm this round.
    quota: u64,
    /// Next position in `active`.
    cursor: usize,
    /// Completed passes over `active` this round.
    passes: u64,
    issued: u64,
    late_rewards: u64,
}

impl SequentialHalving {
    /// Create a scheduler. Fails only if `cfg.arms == 0`.
    pub fn new(cfg: BudgetConfig) -> Result<Self, HalvingError> {
        if cfg.arms == 0 {
            return Err(HalvingError::NoArms);
        }
        let mut s = Self {
            cfg,
            stats: RewardAccumulator::new(cfg.arms),
            active: Vec::new(),
            history: History::new(cfg.track_history),
            phase: Phase::Terminal,
            round_budget: 0,
            quota: 0,
            cursor: 0,
            passes: 0,
            issued: 0,
            late_rewards: 0,
        };
        s.start();
        Ok(s)
    }

    fn start(&mut self) {
        self.active = (0..self.cfg.arms).collect();
        self.round_budget = self.cfg.budget;
        self.cursor = 0;
        self.passes = 0;
        self.issued = 0;
        self.late_rewards = 0;
        if self.cfg.arms == 1 {
            self.quota = 0;
            self.phase = Phase::Terminal;
        } else {
            self.quota = round_quota(self.round_budget, self.cfg.arms);
            self.phase = Phase::Sampling { round: 1 };
        }
    }

    /// Next arm to pull.
    pub fn choose_arm(&mut self) -> Arm {
        if !self.phase.is_terminal() && self.passes >= self.quota {
            self.end_round();
        }
        let arm = match self.phase {
            Phase::Terminal => self.active[0],
            Phase::Sampling { .. } => {
                let arm = self.active[self.cursor];
                self.cursor += 1;
                if self.cursor == self.active.len() {
                    self.cursor = 0;
                    self.passes += 1;
                }
                self.issued += 1;
                arm
            }
        };
        self.history.record_pull(arm);
        arm
    }

    fn end_round(&mut self) {
        let Phase::Sampling { round } = self.phase else {
            return;
        };
        let before = self.active.len();
        if before == 1 {
            tracing::trace!(arm = self.active[0], pulls = self.issued, "budget spent");
            self.phase = Phase::Terminal;
            return;
        }

        self.active = halve(&self.active, &self.stats, 1);
        self.cursor = 0;
        self.passes = 0;
        self.history.record_boundary(RoundBoundary {
            round,
            at_pull: self.issued,
            before,
            after: self.active.len(),
            kind: BoundaryKind::Halved,
        });

        self.round_budget = self
            .cfg
            .split
            .next_budget(self.round_budget, self.cfg.budget, self.issued);
        let remaining = self.cfg.budget.saturating_sub(self.issued);
        self.quota = if self.active.len() == 1 {
            self.round_budget.min(remaining)
        } else {
            round_quota(self.round_budget, self.active.len())
        };

        tracing::debug!(
            round,
            before,
            after = self.active.len(),
            round_budget = self.round_budget,
            quota = self.quota,
            issued = self.issued,
            "halved"
        );

        self.phase = if self.active.len() == 1 && self.quota == 0 {
            tracing::trace!(arm = self.active[0], pulls = self.issued, "budget spent");
            Phase::Terminal
        } else {
            Phase::Sampling { round: round + 1 }
        };
    }

    /// Feed back the reward for a pull of `arm`.
    ///
    /// A reward for an arm that has already been eliminated updates its statistics and
    /// is counted in [`late_rewards`](Self::late_rewards).
    pub fn observe_reward(&mut self, arm: Arm, reward: f64) {
        if self.stats.observe(arm, reward) && !self.active.contains(&arm) {
            self.late_rewards += 1;
        }
    }

    /// The surviving arm with the highest mean (the sole survivor once terminal).
    pub fn recommend(&self) -> Arm {
        self.stats.best_of(&self.active).unwrap_or(self.active[0])
    }

    /// Restart from scratch with the same configuration.
    pub fn reset(&mut self) {
        self.stats.clear();
        self.history.clear();
        self.start();
    }

    /// Configuration the scheduler was built with.
    pub fn config(&self) -> &BudgetConfig {
        &self.cfg
    }

    /// Access the per-arm reward statistics.
    pub fn stats(&self) -> &RewardAccumulator {
        &self.stats
    }

    /// Surviving arms, in pull order.
    pub fn active_set(&self) -> &[Arm] {
        &self.active
    }

    /// Every arm returned by `choose_arm`, if tracking is on.
    pub fn history(&self) -> Option<&[Arm]> {
        self.history.pulls()
    }

    /// Round boundaries so far (empty unless tracking is on).
    pub fn halvings(&self) -> &[RoundBoundary] {
        self.history.boundaries()
    }

    /// Current phase of the ladder.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// True once the survivor's allotment is spent.
    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Current round (1-based); `None` once terminal.
    pub fn round(&self) -> Option<u32> {
        match self.phase {
            Phase::Sampling { round } => Some(round),
            Phase::Terminal => None,
        }
    }

    /// Pulls per active arm in the current round.
    pub fn quota(&self) -> u64 {
        self.quota
    }

    /// Budget the current round was planned with.
    ///
    /// Under [`BudgetSplit::Halved`] this is the idealized split (`B / 2^(r-1)`), not
    /// what is actually left; see [`remaining_budget`](Self::remaining_budget).
    pub fn budget_left(&self) -> u64 {
        self.round_budget
    }

    /// Pulls still available out of the initial budget: `B - pulls_issued`.
    pub fn remaining_budget(&self) -> u64 {
        self.cfg.budget.saturating_sub(self.issued)
    }

    /// Pulls handed out so far (terminal repeats excluded).
    pub fn pulls_issued(&self) -> u64 {
        self.issued
    }

    /// Accepted rewards for arms outside the active set.
    pub fn late_rewards(&self) -> u64 {
        self.late_rewards
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(s: &mut SequentialHalving, n: usize, reward: impl Fn(Arm) -> f64) {
        for _ in 0..n {
            let a = s.choose_arm();
            s.observe_reward(a, reward(a));
        }
    }

    #[test]
    fn zero_arms_is_rejected() {
        assert_eq!(
            SequentialHalving::new(BudgetConfig::new(0, 10)).unwrap_err(),
            HalvingError::NoArms
        );
    }

    #[test]
    fn single_arm_is_terminal_immediately() {
        let mut s = SequentialHalving::new(BudgetConfig::new(1, 100)).unwrap();
        assert!(s.is_terminal());
        assert_eq!(s.choose_arm(), 0);
        assert_eq!(s.pulls_issued(), 0);
    }

    #[test]
    fn first_round_is_round_robin() {
        let mut s = SequentialHalving::new(BudgetConfig::new(4, 16).with_history(true)).unwrap();
        assert_eq!(s.quota(), 2);
        run(&mut s, 8, |_| 0.0);
        assert_eq!(s.history().unwrap(), &[0, 1, 2, 3, 0, 1, 2, 3]);
        assert_eq!(s.round(), Some(1));
    }

    #[test]
    fn halving_is_lazy_and_keeps_best() {
        let mut s = SequentialHalving::new(BudgetConfig::new(4, 16)).unwrap();
        run(&mut s, 8, |a| a as f64);
        // Round 1 is complete but not yet halved.
        assert_eq!(s.active_set(), &[0, 1, 2, 3]);
        let next = s.choose_arm();
        assert_eq!(s.active_set(), &[3, 2]);
        assert_eq!(next, 3);
        assert_eq!(s.round(), Some(2));
        assert_eq!(s.budget_left(), 8);
        assert_eq!(s.quota(), 4);
    }

    #[test]
    fn remaining_split_uses_actual_consumption() {
        // k=3, B=20: round 1 quota floor(20/6)=3 → 9 pulls.
        let cfg = BudgetConfig::new(3, 20).with_split(BudgetSplit::Remaining);
        let mut s = SequentialHalving::new(cfg).unwrap();
        run(&mut s, 9, |a| a as f64);
        s.choose_arm();
        assert_eq!(s.budget_left(), 11);
        assert_eq!(s.quota(), 5);

        let mut h = SequentialHalving::new(BudgetConfig::new(3, 20)).unwrap();
        run(&mut h, 9, |a| a as f64);
        h.choose_arm();
        assert_eq!(h.budget_left(), 10);
        assert_eq!(h.quota(), 5);
    }

    #[test]
    fn planned_round_budget_differs_from_what_remains() {
        let mut s = SequentialHalving::new(BudgetConfig::new(8, 240)).unwrap();
        run(&mut s, 80, |a| a as f64);
        s.choose_arm();
        assert_eq!(s.budget_left(), 120);
        assert_eq!(s.remaining_budget(), 159);

        let cfg = BudgetConfig::new(8, 240).with_split(BudgetSplit::Remaining);
        let mut r = SequentialHalving::new(cfg).unwrap();
        run(&mut r, 80, |a| a as f64);
        r.choose_arm();
        assert_eq!(r.budget_left(), 160);
        assert_eq!(r.remaining_budget(), 159);
    }

    #[test]
    fn terminal_is_idempotent() {
        let mut s = SequentialHalving::new(BudgetConfig::new(2, 4)).unwrap();
        run(&mut s, 10, |a| if a == 1 { 1.0 } else { 0.0 });
        assert!(s.is_terminal());
        let issued = s.pulls_issued();
        let quota = s.quota();
        for _ in 0..5 {
            assert_eq!(s.choose_arm(), 1);
        }
        assert_eq!(s.pulls_issued(), issued);
        assert_eq!(s.quota(), quota);
        assert_eq!(s.active_set(), &[1]);
    }

    #[test]
    fn tiny_budget_does_not_stall() {
        let mut s = SequentialHalving::new(BudgetConfig::new(8, 0)).unwrap();
        run(&mut s, 100, |a| a as f64);
        assert!(s.is_terminal());
        // 8 + 4 + 2 clamped single pulls, nothing left for the survivor.
        assert_eq!(s.pulls_issued(), 14);
        assert_eq!(s.recommend(), 7);
    }

    #[test]
    fn late_reward_updates_stats_without_resurrecting() {
        let mut s = SequentialHalving::new(BudgetConfig::new(4, 16)).unwrap();
        run(&mut s, 8, |a| a as f64);
        s.choose_arm();
        assert!(!s.active_set().contains(&0));
        s.observe_reward(0, 100.0);
        assert_eq!(s.late_rewards(), 1);
        assert_eq!(s.stats().pulls(0), 3);
        assert!(!s.active_set().contains(&0));
        // Unknown arm: dropped, not counted as late.
        s.observe_reward(99, 1.0);
        assert_eq!(s.late_rewards(), 1);
    }

    #[test]
    fn reset_restores_fresh_state() {
        let mut s = SequentialHalving::new(BudgetConfig::new(4, 16).with_history(true)).unwrap();
        run(&mut s, 20, |a| a as f64);
        s.reset();
        assert_eq!(s.active_set(), &[0, 1, 2, 3]);
        assert_eq!(s.pulls_issued(), 0);
        assert_eq!(s.round(), Some(1));
        assert_eq!(s.quota(), 2);
        assert_eq!(s.history().unwrap().len(), 0);
        assert!(s.halvings().is_empty());
        assert_eq!(s.stats().total_pulls(), 0);
    }
}
