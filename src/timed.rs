//! Sequential Halving with a wall-clock budget.
//!
//! Every round gets the same slice of time, `round_time = time_budget / ceil(log2 k)`,
//! regardless of how many arms are still active. Within a round, arms are visited
//! strictly round-robin with no per-arm quota, so the last arms of a partial pass may
//! get one pull fewer than the first.
//!
//! A boundary never fires before the round's first full pass: if pulls are slower than
//! `round_time`, the round is stretched until every active arm has been pulled once.
//!
//! The scheduler reads its [`Clock`] on every `choose_arm` call and compares against
//! the timestamp of the last boundary. It never sleeps; the caller's own loop cadence
//! is what moves time along.

use std::time::Duration;

use crate::history::History;
use crate::{
    halve, phases, round_time, Arm, BoundaryKind, Clock, HalvingError, MonotonicClock, Phase,
    RewardAccumulator, RoundBoundary,
};

/// Configuration for [`TimedSequentialHalving`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimedConfig {
    /// Number of arms `k` (must be ≥ 1).
    pub arms: usize,
    /// Total wall-clock budget for the whole ladder.
    pub time_budget: Duration,
    /// Record every chosen arm and every round boundary.
    pub track_history: bool,
}

impl Default for TimedConfig {
    fn default() -> Self {
        Self {
            arms: 10,
            time_budget: Duration::from_secs(1),
            track_history: false,
        }
    }
}

impl TimedConfig {
    pub fn new(arms: usize, time_budget: Duration) -> Self {
        Self {
            arms,
            time_budget,
            ..Self::default()
        }
    }

    pub fn with_history(mut self, track: bool) -> Self {
        self.track_history = track;
        self
    }
}

/// Wall-clock-budget Sequential Halving scheduler.
#[derive(Debug, Clone)]
pub struct TimedSequentialHalving<C = MonotonicClock> {
    cfg: TimedConfig,
    clock: C,
    stats: RewardAccumulator,
    active: Vec<Arm>,
    history: History,
    phase: Phase,
    round_time: Duration,
    started: Duration,
    round_start: Duration,
    cursor: usize,
    /// Pulls issued in the current round.
    round_pulls: u64,
    issued: u64,
    late_rewards: u64,
}

impl TimedSequentialHalving<MonotonicClock> {
    /// Create a scheduler on real time. Fails only if `cfg.arms == 0`.
    pub fn new(cfg: TimedConfig) -> Result<Self, HalvingError> {
        Self::with_clock(cfg, MonotonicClock::new())
    }
}

impl<C: Clock> TimedSequentialHalving<C> {
    /// Create a scheduler reading time from `clock`.
    pub fn with_clock(cfg: TimedConfig, clock: C) -> Result<Self, HalvingError> {
        if cfg.arms == 0 {
            return Err(HalvingError::NoArms);
        }
        let now = clock.now();
        let mut s = Self {
            cfg,
            clock,
            stats: RewardAccumulator::new(cfg.arms),
            active: Vec::new(),
            history: History::new(cfg.track_history),
            phase: Phase::Terminal,
            round_time: round_time(cfg.time_budget, cfg.arms),
            started: now,
            round_start: now,
            cursor: 0,
            round_pulls: 0,
            issued: 0,
            late_rewards: 0,
        };
        s.start();
        Ok(s)
    }

    fn start(&mut self) {
        let now = self.clock.now();
        self.active = (0..self.cfg.arms).collect();
        self.started = now;
        self.round_start = now;
        self.cursor = 0;
        self.round_pulls = 0;
        self.issued = 0;
        self.late_rewards = 0;
        self.phase = if self.cfg.arms == 1 {
            Phase::Terminal
        } else {
            Phase::Sampling { round: 1 }
        };
    }

    /// Next arm to pull.
    pub fn choose_arm(&mut self) -> Arm {
        if let Phase::Sampling { round } = self.phase {
            let now = self.clock.now();
            if self.round_pulls >= self.active.len() as u64
                && now.saturating_sub(self.round_start) >= self.round_time
            {
                self.end_round(round, now);
            }
        }
        let arm = match self.phase {
            Phase::Terminal => self.active[0],
            Phase::Sampling { .. } => {
                let arm = self.active[self.cursor];
                self.cursor = (self.cursor + 1) % self.active.len();
                self.round_pulls += 1;
                self.issued += 1;
                arm
            }
        };
        self.history.record_pull(arm);
        arm
    }

    fn end_round(&mut self, round: u32, now: Duration) {
        let before = self.active.len();
        self.active = halve(&self.active, &self.stats, 1);
        self.cursor = 0;
        self.round_pulls = 0;
        self.round_start = now;
        self.history.record_boundary(RoundBoundary {
            round,
            at_pull: self.issued,
            before,
            after: self.active.len(),
            kind: BoundaryKind::Halved,
        });
        tracing::debug!(
            round,
            before,
            after = self.active.len(),
            round_time_ms = self.round_time.as_secs_f64() * 1e3,
            issued = self.issued,
            "halved"
        );
        self.phase = if self.active.len() == 1 {
            tracing::trace!(arm = self.active[0], pulls = self.issued, "time budget spent");
            Phase::Terminal
        } else {
            Phase::Sampling { round: round + 1 }
        };
    }

    /// Feed back the reward for a pull of `arm`.
    pub fn observe_reward(&mut self, arm: Arm, reward: f64) {
        if self.stats.observe(arm, reward) && !self.active.contains(&arm) {
            self.late_rewards += 1;
        }
    }

    /// The surviving arm with the highest mean (the sole survivor once terminal).
    pub fn recommend(&self) -> Arm {
        self.stats.best_of(&self.active).unwrap_or(self.active[0])
    }

    /// Restart from scratch with the same configuration; the round clock restarts now.
    pub fn reset(&mut self) {
        self.stats.clear();
        self.history.clear();
        self.start();
    }

    /// Configuration the scheduler was built with.
    pub fn config(&self) -> &TimedConfig {
        &self.cfg
    }

    /// The clock rounds are measured on.
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

    /// Current phase of the ladder.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// True once a single arm remains.
    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Length of every round.
    pub fn round_time(&self) -> Duration {
        self.round_time
    }

    /// Number of rounds in the ladder, `ceil(log2 k)`.
    pub fn phases(&self) -> u32 {
        phases(self.cfg.arms)
    }

    /// Time since construction (or the last reset).
    pub fn elapsed(&self) -> Duration {
        self.clock.elapsed_since(self.started)
    }

    /// Time since the current round started.
    pub fn round_elapsed(&self) -> Duration {
        self.clock.elapsed_since(self.round_start)
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
    use crate::ManualClock;

    fn timed(k: usize, ms: u64) -> (TimedSequentialHalving<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let cfg = TimedConfig::new(k, Duration::from_millis(ms)).with_history(true);
        let s = TimedSequentialHalving::with_clock(cfg, clock.clone()).unwrap();
        (s, clock)
    }

    #[test]
    fn zero_arms_is_rejected() {
        let cfg = TimedConfig::new(0, Duration::ZERO);
        let r = TimedSequentialHalving::with_clock(cfg, ManualClock::new());
        assert_eq!(r.unwrap_err(), HalvingError::NoArms);
    }

    #[test]
    fn round_robin_without_time_passing() {
        let (mut s, _clock) = timed(3, 300);
        let picks: Vec<Arm> = (0..7).map(|_| s.choose_arm()).collect();
        assert_eq!(picks, vec![0, 1, 2, 0, 1, 2, 0]);
        assert!(s.halvings().is_empty());
    }

    #[test]
    fn halves_when_round_time_elapses() {
        let (mut s, clock) = timed(4, 200);
        assert_eq!(s.round_time(), Duration::from_millis(100));
        for _ in 0..4 {
            let a = s.choose_arm();
            s.observe_reward(a, a as f64);
        }
        clock.advance(Duration::from_millis(100));
        assert_eq!(s.choose_arm(), 3);
        assert_eq!(s.active_set(), &[3, 2]);
        assert_eq!(s.choose_arm(), 2);
        assert_eq!(s.choose_arm(), 3);
        assert_eq!(s.round_elapsed(), Duration::ZERO);
    }

    #[test]
    fn slow_pulls_stretch_the_round_until_every_arm_is_seen() {
        let (mut s, clock) = timed(4, 200);
        let means = [-1.0, 3.0, 4.0, 5.0];
        let a = s.choose_arm();
        s.observe_reward(a, means[a]);
        // One pull outlasts the whole 100ms round.
        clock.advance(Duration::from_millis(150));
        for expected in 1..4 {
            let a = s.choose_arm();
            assert_eq!(a, expected);
            assert!(s.halvings().is_empty());
            s.observe_reward(a, means[a]);
            clock.advance(Duration::from_millis(150));
        }
        let pulls: Vec<u64> = (0..4).map(|a| s.stats().pulls(a)).collect();
        assert_eq!(pulls, vec![1, 1, 1, 1]);

        assert_eq!(s.choose_arm(), 3);
        assert_eq!(s.active_set(), &[3, 2]);
        assert_eq!(s.halvings()[0].at_pull, 4);
    }

    #[test]
    fn waiting_before_the_first_pull_does_not_halve() {
        let (mut s, clock) = timed(4, 200);
        clock.advance(Duration::from_secs(5));
        assert_eq!(s.choose_arm(), 0);
        assert_eq!(s.active_set().len(), 4);
    }

    #[test]
    fn backwards_clock_never_triggers_a_boundary() {
        let (mut s, clock) = timed(4, 200);
        clock.set(Duration::from_secs(1));
        s.reset();
        clock.set(Duration::ZERO);
        for _ in 0..10 {
            s.choose_arm();
        }
        assert!(s.halvings().is_empty());
        assert_eq!(s.round_elapsed(), Duration::ZERO);
        assert_eq!(s.active_set().len(), 4);
    }

    #[test]
    fn single_arm_is_terminal() {
        let (mut s, clock) = timed(1, 100);
        assert!(s.is_terminal());
        assert_eq!(s.phases(), 0);
        clock.advance(Duration::from_secs(10));
        assert_eq!(s.choose_arm(), 0);
        assert_eq!(s.pulls_issued(), 0);
    }

    #[test]
    fn terminal_after_last_round() {
        let (mut s, clock) = timed(2, 100);
        for _ in 0..4 {
            let a = s.choose_arm();
            s.observe_reward(a, if a == 0 { 1.0 } else { 0.0 });
        }
        clock.advance(Duration::from_millis(100));
        assert_eq!(s.choose_arm(), 0);
        assert!(s.is_terminal());
        let issued = s.pulls_issued();
        clock.advance(Duration::from_secs(5));
        assert_eq!(s.choose_arm(), 0);
        assert_eq!(s.pulls_issued(), issued);
        assert_eq!(s.halvings().len(), 1);
    }

    #[test]
    fn elapsed_tracks_reset() {
        let (mut s, clock) = timed(4, 100);
        clock.advance(Duration::from_millis(30));
        assert_eq!(s.elapsed(), Duration::from_millis(30));
        s.reset();
        assert_eq!(s.elapsed(), Duration::ZERO);
    }
}
