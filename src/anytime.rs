//! Anytime Sequential Halving: a ladder that restarts forever.
//!
//! There is no total budget. A round is one pass over the active set (every active arm
//! pulled exactly once). At each round boundary:
//!
//! - if two or fewer arms are active, the ladder **restarts**: every arm becomes active
//!   again. Statistics are kept, so each pass up the ladder ranks on sharper estimates.
//! - otherwise the active set is halved, never below two arms.
//!
//! The scheduler never reaches a terminal state; the caller stops whenever it likes and
//! reads [`recommend`](AnytimeSequentialHalving::recommend) or the per-arm means.
//! An optional [`StopCondition`] is purely advisory: [`should_stop`] reports it, but
//! `choose_arm` keeps serving arms regardless.
//!
//! [`should_stop`]: AnytimeSequentialHalving::should_stop

use std::time::Duration;

use crate::history::History;
use crate::{
    halve, Arm, BoundaryKind, Clock, HalvingError, MonotonicClock, RewardAccumulator,
    RoundBoundary,
};

/// Minimum active-set size before the ladder restarts.
const LADDER_FLOOR: usize = 2;

/// When a caller driving an anytime scheduler should stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopCondition {
    /// Stop once this much time has passed since construction (or the last reset).
    Deadline(Duration),
    /// Stop once this many pulls have been issued.
    Iterations(u64),
}

/// Configuration for [`AnytimeSequentialHalving`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnytimeConfig {
    /// Number of arms `k` (must be ≥ 1).
    pub arms: usize,
    /// Advisory stopping rule reported by `should_stop`.
    pub stop: Option<StopCondition>,
    /// Record every chosen arm and every round boundary.
    ///
    /// Both logs grow without bound; leave this off for long runs.
    pub track_history: bool,
}

impl Default for AnytimeConfig {
    fn default() -> Self {
        Self {
            arms: 10,
            stop: None,
            track_history: false,
        }
    }
}

impl AnytimeConfig {
    pub fn new(arms: usize) -> Self {
        Self {
            arms,
            ..Self::default()
        }
    }

    pub fn with_stop(mut self, stop: StopCondition) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn with_history(mut self, track: bool) -> Self {
        self.track_history = track;
        self
    }
}

/// Restarting Sequential Halving scheduler for unknown stopping times.
#[derive(Debug, Clone)]
pub struct AnytimeSequentialHalving<C = MonotonicClock> {
    cfg: AnytimeConfig,
    clock: C,
    stats: RewardAccumulator,
    active: Vec<Arm>,
    history: History,
    /// Pulls issued in the current pass; also the next position in `active`.
    round_iter: usize,
    /// Round within the current ladder (1-based).
    round: u32,
    ladders: u64,
    started: Duration,
    issued: u64,
    late_rewards: u64,
}

impl AnytimeSequentialHalving<MonotonicClock> {
    /// Create a scheduler on real time. Fails only if `cfg.arms == 0`.
    pub fn new(cfg: AnytimeConfig) -> Result<Self, HalvingError> {
        Self::with_clock(cfg, MonotonicClock::new())
    }
}

impl<C: Clock> AnytimeSequentialHalving<C> {
    /// Create a scheduler whose deadline (if any) is measured on `clock`.
    pub fn with_clock(cfg: AnytimeConfig, clock: C) -> Result<Self, HalvingError> {
        if cfg.arms == 0 {
            return Err(HalvingError::NoArms);
        }
        let started = clock.now();
        Ok(Self {
            cfg,
            clock,
            stats: RewardAccumulator::new(cfg.arms),
            active: (0..cfg.arms).collect(),
            history: History::new(cfg.track_history),
            round_iter: 0,
            round: 1,
            ladders: 0,
            started,
            issued: 0,
            late_rewards: 0,
        })
    }

    /// Next arm to pull.
    pub fn choose_arm(&mut self) -> Arm {
        if self.round_iter == self.active.len() {
            self.end_round();
        }
        let arm = self.active[self.round_iter];
        self.round_iter += 1;
        self.issued += 1;
        self.history.record_pull(arm);
        arm
    }

    fn end_round(&mut self) {
        let before = self.active.len();
        let kind = if before <= LADDER_FLOOR {
            self.active = (0..self.cfg.arms).collect();
            self.ladders += 1;
            tracing::debug!(
                ladders = self.ladders,
                rounds = self.round,
                issued = self.issued,
                "ladder restarted"
            );
            BoundaryKind::Restarted
        } else {
            self.active = halve(&self.active, &self.stats, LADDER_FLOOR);
            tracing::debug!(
                round = self.round,
                before,
                after = self.active.len(),
                issued = self.issued,
                "halved"
            );
            BoundaryKind::Halved
        };
        self.history.record_boundary(RoundBoundary {
            round: self.round,
            at_pull: self.issued,
            before,
            after: self.active.len(),
            kind,
        });
        self.round = match kind {
            BoundaryKind::Restarted => 1,
            BoundaryKind::Halved => self.round + 1,
        };
        self.round_iter = 0;
    }

    /// Feed back the reward for a pull of `arm`.
    pub fn observe_reward(&mut self, arm: Arm, reward: f64) {
        if self.stats.observe(arm, reward) && !self.active.contains(&arm) {
            self.late_rewards += 1;
        }
    }

    /// Whether the configured [`StopCondition`] has been met (`false` if none).
    pub fn should_stop(&self) -> bool {
        match self.cfg.stop {
            None => false,
            Some(StopCondition::Deadline(d)) => self.elapsed() >= d,
            Some(StopCondition::Iterations(n)) => self.issued >= n,
        }
    }

    /// Arm with the highest mean among arms observed at least once.
    ///
    /// Ranks by mean rather than pull count, since halving equalizes pulls within a
    /// round. Ties go to the lowest arm id; with no observations at all, arm 0.
    pub fn recommend(&self) -> Arm {
        let observed: Vec<Arm> = self
            .stats
            .iter()
            .filter(|(_, s)| s.pulls > 0)
            .map(|(a, _)| a)
            .collect();
        self.stats.best_of(&observed).unwrap_or(0)
    }

    /// Restart from scratch with the same configuration; the deadline restarts now.
    pub fn reset(&mut self) {
        self.stats.clear();
        self.history.clear();
        self.active = (0..self.cfg.arms).collect();
        self.round_iter = 0;
        self.round = 1;
        self.ladders = 0;
        self.started = self.clock.now();
        self.issued = 0;
        self.late_rewards = 0;
    }

    /// Configuration the scheduler was built with.
    pub fn config(&self) -> &AnytimeConfig {
        &self.cfg
    }

    /// The clock the deadline is measured on.
    pub fn clock(&self) -> &C {
        &self.clock
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

    /// Round within the current ladder (1-based).
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Number of completed ladders (restarts so far).
    pub fn ladders_completed(&self) -> u64 {
        self.ladders
    }

    /// Time since construction (or the last reset).
    pub fn elapsed(&self) -> Duration {
        self.clock.elapsed_since(self.started)
    }

    pub fn pulls_issued(&self) -> u64 {
        self.issued
    }

    /// Accepted rewards for arms outside the active set.
    pub fn late_rewards(&self) -> u64 {
        self.late_rewards
    }
}
