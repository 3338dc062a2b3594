//! Budget accounting for Sequential Halving rounds.
//!
//! A ladder over `k` arms has `ceil(log2 k)` rounds (the number of ceiling-halvings
//! needed to reach one arm). A round over `n` arms with budget `B` gives each arm
//!
//! ```text
//!   quota(B, n) = floor(B / (n * ceil(log2 n)))
//! ```
//!
//! pulls, clamped to at least 1 so that a small budget never stalls the ladder.

use std::time::Duration;

/// `ceil(log2 n)`: number of halving rounds needed to reduce `n` arms to one.
///
/// `phases(0) == phases(1) == 0`.
///
/// ```rust
/// use seqhalve::phases;
///
/// assert_eq!(phases(1), 0);
/// assert_eq!(phases(2), 1);
/// assert_eq!(phases(5), 3);
/// assert_eq!(phases(8), 3);
/// ```
#[must_use]
pub fn phases(n: usize) -> u32 {
    if n <= 1 {
        0
    } else {
        usize::BITS - (n - 1).leading_zeros()
    }
}

/// Per-arm pull quota for a round over `n ≥ 2` arms with budget `budget`.
///
/// For `n ≤ 1` the whole budget goes to the single arm (this can be 0).
/// For `n ≥ 2` the result is at least 1.
#[must_use]
pub fn round_quota(budget: u64, n: usize) -> u64 {
    if n <= 1 {
        return budget;
    }
    let denom = (n as u64).saturating_mul(u64::from(phases(n)));
    (budget / denom).max(1)
}

/// Wall-clock length of every round: `time_budget / ceil(log2 k)`.
///
/// With a single arm there are no rounds; the whole budget is returned.
#[must_use]
pub fn round_time(time_budget: Duration, k: usize) -> Duration {
    match phases(k) {
        0 => time_budget,
        p => time_budget / p,
    }
}

/// How the discrete-budget scheduler derives the next round's budget at a halving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BudgetSplit {
    /// Classical split: the remaining budget is divided by 2 at every halving,
    /// regardless of how many pulls the round actually consumed.
    #[default]
    Halved,
    /// The remaining budget is re-derived from actual consumption:
    /// `initial_budget - pulls_issued`.
    Remaining,
}

impl BudgetSplit {
    /// Budget for the round that follows a halving.
    ///
    /// `previous` is the budget the finished round was planned with.
    #[must_use]
    pub fn next_budget(self, previous: u64, initial: u64, issued: u64) -> u64 {
        match self {
            BudgetSplit::Halved => previous / 2,
            BudgetSplit::Remaining => initial.saturating_sub(issued),
        }
    }
}
