//! Compare the three Sequential Halving variants on random Gaussian problems.
//!
//! Each trial draws `k` true means from `N(0, 1)` and gives every variant the same
//! effort: a pull budget, an equivalent simulated time budget (1ms per pull), or an
//! iteration limit. Set `RUST_LOG=seqhalve=debug` to watch the round boundaries.

use std::time::Duration;

use seqhalve::harness::{best_arm, simple_regret};
use seqhalve::{
    run_while, AnytimeConfig, AnytimeSequentialHalving, BudgetConfig, GaussianArms,
    ManualClock, RewardSource, SequentialHalving, StopCondition, TimedConfig,
    TimedSequentialHalving,
};
use tracing_subscriber::EnvFilter;

const ARMS: usize = 16;
const PULLS: u64 = 2_000;
const TRIALS: u64 = 50;

#[derive(Default)]
struct Tally {
    hits: u64,
    regret: f64,
}

impl Tally {
    fn add(&mut self, means: &[f64], chosen: usize) {
        if best_arm(means) == Some(chosen) {
            self.hits += 1;
        }
        self.regret += simple_regret(means, chosen);
    }

    fn report(&self, name: &str) {
        eprintln!(
            "{name:>8}: best arm found {}/{TRIALS}, mean simple regret {:.4}",
            self.hits,
            self.regret / TRIALS as f64
        );
    }
}

/// A reward source that advances a manual clock by 1ms per pull.
struct Ticking<'a> {
    arms: &'a mut GaussianArms,
    clock: &'a ManualClock,
}

impl RewardSource for Ticking<'_> {
    fn reward(&mut self, arm: usize) -> f64 {
        self.clock.advance(Duration::from_millis(1));
        self.arms.reward(arm)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut budgeted = Tally::default();
    let mut timed = Tally::default();
    let mut anytime = Tally::default();

    for seed in 0..TRIALS {
        let problem = GaussianArms::standard(ARMS, seed);
        let means = problem.means().to_vec();

        let mut arms = problem.clone();
        let mut sh = SequentialHalving::new(BudgetConfig::new(ARMS, PULLS))
            .expect("ARMS is nonzero");
        let rep = run_while(&mut sh, &mut arms, |s| !s.is_terminal());
        budgeted.add(&means, rep.recommended);

        let mut arms = problem.clone();
        let clock = ManualClock::new();
        let cfg = TimedConfig::new(ARMS, Duration::from_millis(PULLS));
        let mut tsh = TimedSequentialHalving::with_clock(cfg, clock.clone())
            .expect("ARMS is nonzero");
        let mut source = Ticking {
            arms: &mut arms,
            clock: &clock,
        };
        let rep = run_while(&mut tsh, &mut source, |s| !s.is_terminal());
        timed.add(&means, rep.recommended);

        let mut arms = problem;
        let cfg = AnytimeConfig::new(ARMS).with_stop(StopCondition::Iterations(PULLS));
        let mut ash = AnytimeSequentialHalving::with_clock(cfg, ManualClock::new())
            .expect("ARMS is nonzero");
        let rep = run_while(&mut ash, &mut arms, |s| !s.should_stop());
        anytime.add(&means, rep.recommended);

        tracing::info!(
            seed,
            best = ?best_arm(&means),
            budgeted = sh.recommend(),
            timed = tsh.recommend(),
            anytime = ash.recommend(),
            ladders = ash.ladders_completed(),
            "trial done"
        );
    }

    eprintln!("k={ARMS} arms, {PULLS} pulls per run, {TRIALS} trials");
    budgeted.report("budgeted");
    timed.report("timed");
    anytime.report("anytime");
}
