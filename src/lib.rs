//! `seqhalve`: Sequential Halving schedulers for best-arm identification.
//!
//! Designed for "which of these k options is best?" problems where each option (an
//! *arm*) can be sampled repeatedly for a noisy scalar reward, and the goal is to
//! identify the arm with the highest mean, not to maximize cumulative reward along
//! the way.
//!
//! Sequential Halving (Karnin, Koren & Somekh 2013) splits the sampling effort into
//! `ceil(log2 k)` rounds. Each round samples every surviving arm equally, then drops
//! the worse half by empirical mean. Three regimes are provided:
//!
//! - [`SequentialHalving`]: a fixed budget of pulls.
//! - [`TimedSequentialHalving`]: a fixed wall-clock budget, split into equal rounds.
//! - [`AnytimeSequentialHalving`]: no budget at all; the ladder restarts forever so
//!   the caller can stop at any moment and read the current best guess.
//!
//! All three are driven the same way (see [`HalvingScheduler`]):
//!
//! ```rust
//! use seqhalve::{BudgetConfig, SequentialHalving};
//!
//! let true_means = [0.2, 0.8, 0.5, 0.1];
//! let mut sh = SequentialHalving::new(BudgetConfig::new(4, 64)).unwrap();
//! while !sh.is_terminal() {
//!     let arm = sh.choose_arm();
//!     // Any reward source works; the scheduler never generates rewards itself.
//!     sh.observe_reward(arm, true_means[arm]);
//! }
//! assert_eq!(sh.recommend(), 1);
//! ```
//!
//! **Goals:**
//! - **Deterministic**: no randomness inside the schedulers. Ties in the ranking are
//!   broken by the order of the active set (stable sort), so a fixed reward stream
//!   always yields the same pull sequence.
//! - **Caller-driven**: `choose_arm` / `observe_reward` are plain state transitions.
//!   Nothing blocks, sleeps, or spawns; the wall-clock variants only *read* a
//!   [`Clock`].
//! - **Recoverable**: the only error is constructing a scheduler with zero arms.
//!   Late rewards, unknown arm ids, non-finite rewards and clock skew are absorbed.
//!
//! **Non-goals:**
//! - Not a regret minimizer: every surviving arm is sampled equally within a round.
//! - No non-stationary or adversarial reward handling; statistics are lifetime means.
//! - No confidence intervals, persistence, or plotting.
//!
//! **Concurrency:** schedulers are single-owner state (`&mut self`), with no internal
//! locking. Confine one to a thread or serialize access externally.
//!
//! **Features:**
//! - `stochastic` (default): seeded Gaussian reward sources for the [`harness`] module.
//! - `serde`: `Serialize`/`Deserialize` for configs, statistics and boundary events.

#![forbid(unsafe_code)]

/// Arm identifier: `0..k`, stable for the lifetime of a scheduler.
pub type Arm = usize;

mod error;
pub use error::*;

mod stats;
pub use stats::*;

mod eliminate;
pub use eliminate::*;

mod budget;
pub use budget::*;

mod clock;
pub use clock::*;

mod history;
pub use history::{BoundaryKind, RoundBoundary};

mod policy;
pub use policy::*;

mod budgeted;
pub use budgeted::*;

mod timed;
pub use timed::*;

mod anytime;
pub use anytime::*;

pub mod harness;
pub use harness::{run_pulls, run_while, RewardSource, RunReport};
#[cfg(feature = "stochastic")]
pub use harness::GaussianArms;
