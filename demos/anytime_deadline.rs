//! Anytime Sequential Halving against a real wall-clock deadline.
//!
//! The ladder keeps restarting until the deadline passes; the recommendation is read
//! whenever the caller decides to stop. Set `RUST_LOG=seqhalve=debug` to see every
//! halving and restart.

use std::time::Duration;

use seqhalve::harness::simple_regret;
use seqhalve::{
    AnytimeConfig, AnytimeSequentialHalving, GaussianArms, RewardSource, StopCondition,
};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let k = 32;
    let mut arms = GaussianArms::standard(k, 7);
    let cfg = AnytimeConfig::new(k).with_stop(StopCondition::Deadline(Duration::from_millis(50)));
    let mut s = AnytimeSequentialHalving::new(cfg).expect("k is nonzero");

    let mut checkpoints = 0;
    while !s.should_stop() {
        let arm = s.choose_arm();
        let r = arms.reward(arm);
        s.observe_reward(arm, r);

        if s.pulls_issued() % 10_000 == 0 {
            checkpoints += 1;
            let pick = s.recommend();
            eprintln!(
                "t={:>6.2}ms pulls={:>8} ladders={:>6} pick={pick:>2} regret={:.4}",
                s.elapsed().as_secs_f64() * 1e3,
                s.pulls_issued(),
                s.ladders_completed(),
                simple_regret(arms.means(), pick),
            );
        }
    }

    let pick = s.recommend();
    eprintln!(
        "stopped after {:.2}ms: {} pulls, {} ladders, {checkpoints} checkpoints",
        s.elapsed().as_secs_f64() * 1e3,
        s.pulls_issued(),
        s.ladders_completed()
    );
    eprintln!(
        "recommended arm {pick} (mean {:.3}), simple regret {:.4}",
        arms.means()[pick],
        simple_regret(arms.means(), pick)
    );
}
