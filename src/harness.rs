//! Harness-oriented glue: reward sources and caller loops.
//!
//! The schedulers never produce rewards. These helpers exist so that tests, benches and
//! experiment drivers can share one definition of "the caller loop":
//!
//! ```text
//!   arm = choose_arm(); reward = source.reward(arm); observe_reward(arm, reward)
//! ```
//!
//! Randomness is always an explicit, seeded object owned by the reward source; nothing
//! here touches a global RNG.

use crate::{Arm, HalvingScheduler};

/// Something that can produce a reward for an arm.
pub trait RewardSource {
    fn reward(&mut self, arm: Arm) -> f64;
}

impl<F> RewardSource for F
where
    F: FnMut(Arm) -> f64,
{
    fn reward(&mut self, arm: Arm) -> f64 {
        self(arm)
    }
}

/// Outcome of one driven run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// `choose_arm` calls made by the driver.
    pub steps: u64,
    /// Pulls the scheduler's budget accounting issued during the run.
    pub pulls_issued: u64,
    /// The scheduler's recommendation after the run.
    pub recommended: Arm,
}

/// Drive `scheduler` for exactly `steps` choose/observe cycles.
pub fn run_pulls<S, R>(scheduler: &mut S, source: &mut R, steps: u64) -> RunReport
where
    S: HalvingScheduler + ?Sized,
    R: RewardSource + ?Sized,
{
    let mut n = 0u64;
    run_while(scheduler, source, |_| {
        n += 1;
        n <= steps
    })
}

/// Drive `scheduler` while `keep_going(scheduler)` returns true.
///
/// The predicate is checked before every step, so a wall-clock caller can stop on a
/// deadline and a budgeted caller on [`Phase::Terminal`](crate::Phase::Terminal).
pub fn run_while<S, R, P>(scheduler: &mut S, source: &mut R, mut keep_going: P) -> RunReport
where
    S: HalvingScheduler + ?Sized,
    R: RewardSource + ?Sized,
    P: FnMut(&S) -> bool,
{
    let issued0 = scheduler.pulls_issued();
    let mut steps = 0u64;
    while keep_going(&*scheduler) {
        let arm = scheduler.choose_arm();
        let r = source.reward(arm);
        scheduler.observe_reward(arm, r);
        steps += 1;
    }
    RunReport {
        steps,
        pulls_issued: scheduler.pulls_issued().saturating_sub(issued0),
        recommended: scheduler.recommend(),
    }
}

/// Gap between the best true mean and the true mean of `chosen`.
///
/// Returns `0.0` for an empty slice and `NaN` if `chosen` is out of range.
pub fn simple_regret(true_means: &[f64], chosen: Arm) -> f64 {
    if true_means.is_empty() {
        return 0.0;
    }
    let best = true_means.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    true_means.get(chosen).map(|&m| best - m).unwrap_or(f64::NAN)
}

/// Index of the largest true mean (ties to the lowest index).
pub fn best_arm(true_means: &[f64]) -> Option<Arm> {
    let mut best: Option<(Arm, f64)> = None;
    for (a, &m) in true_means.iter().enumerate() {
        match best {
            Some((_, bm)) if m <= bm => {}
            _ => best = Some((a, m)),
        }
    }
    best.map(|(a, _)| a)
}

#[cfg(feature = "stochastic")]
mod gaussian {
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rand_distr::{Distribution, Normal, StandardNormal};

    use super::RewardSource;
    use crate::Arm;

    /// Arms with Gaussian rewards `N(mean_i, sigma)`, drawn from a seeded RNG.
    #[derive(Debug, Clone)]
    pub struct GaussianArms {
        means: Vec<f64>,
        sigma: f64,
        rng: StdRng,
    }

    impl GaussianArms {
        /// Arms with the given true means and common standard deviation.
        ///
        /// A non-finite or negative `sigma` is replaced by `1.0`.
        pub fn new(means: Vec<f64>, sigma: f64, seed: u64) -> Self {
            let sigma = if sigma.is_finite() && sigma >= 0.0 {
                sigma
            } else {
                1.0
            };
            Self {
                means,
                sigma,
                rng: StdRng::seed_from_u64(seed),
            }
        }

        /// `k` arms whose true means are themselves drawn from `N(0, 1)`, with unit noise.
        pub fn standard(k: usize, seed: u64) -> Self {
            let mut rng = StdRng::seed_from_u64(seed);
            let means: Vec<f64> = (0..k).map(|_| StandardNormal.sample(&mut rng)).collect();
            Self {
                means,
                sigma: 1.0,
                rng,
            }
        }

        pub fn means(&self) -> &[f64] {
            &self.means
        }

        pub fn sigma(&self) -> f64 {
            self.sigma
        }
    }

    impl RewardSource for GaussianArms {
        /// Sample a reward; an arm outside `0..k` yields `NaN`, which schedulers drop.
        fn reward(&mut self, arm: Arm) -> f64 {
            let Some(&mu) = self.means.get(arm) else {
                return f64::NAN;
            };
            match Normal::new(mu, self.sigma) {
                Ok(d) => d.sample(&mut self.rng),
                Err(_) => mu,
            }
        }
    }
}

#[cfg(feature = "stochastic")]
pub use gaussian::GaussianArms;
