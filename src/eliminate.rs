//! Halving: keep the better half of the active set.
//!
//! Ranking is by descending empirical mean with a **stable** sort, so arms with equal
//! means keep their relative order from the incoming active set. There is no randomized
//! tie-breaking: a fixed reward stream always produces the same survivors.

use crate::{Arm, RewardAccumulator};

/// Size of the active set after halving `n` arms: `ceil(n / 2)`, at least `floor`.
///
/// The floor is itself capped at `n`, so halving never grows the set.
///
/// ```rust
/// use seqhalve::survivor_count;
///
/// assert_eq!(survivor_count(8, 1), 4);
/// assert_eq!(survivor_count(5, 1), 3);
/// assert_eq!(survivor_count(3, 2), 2);
/// assert_eq!(survivor_count(1, 2), 1);
/// ```
#[must_use]
pub fn survivor_count(n: usize, floor: usize) -> usize {
    n.div_ceil(2).max(floor.min(n))
}

/// Return the surviving arms of `active`, best mean first.
///
/// The result has [`survivor_count`]`(active.len(), floor)` entries.
#[must_use]
pub fn halve(active: &[Arm], stats: &RewardAccumulator, floor: usize) -> Vec<Arm> {
    let keep = survivor_count(active.len(), floor);
    let mut ranked: Vec<(Arm, f64)> = active.iter().map(|&a| (a, stats.mean(a))).collect();
    // `sort_by` is stable; `total_cmp` gives a total order even for signed zeros.
    ranked.sort_by(|x, y| y.1.total_cmp(&x.1));
    ranked.truncate(keep);
    ranked.into_iter().map(|(a, _)| a).collect()
}
