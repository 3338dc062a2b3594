//! Property tests for the Sequential Halving schedulers.

use std::collections::BTreeMap;
use std::time::Duration;

use proptest::prelude::*;
use seqhalve::{
    phases, survivor_count, AnytimeConfig, AnytimeSequentialHalving, Arm, BoundaryKind,
    BudgetConfig, BudgetSplit, HalvingScheduler, ManualClock, SequentialHalving, TimedConfig,
    TimedSequentialHalving,
};

fn split_strategy() -> impl Strategy<Value = BudgetSplit> {
    prop_oneof![Just(BudgetSplit::Halved), Just(BudgetSplit::Remaining)]
}

fn budgeted(means: &[f64], extra: u64, split: BudgetSplit) -> (SequentialHalving, u64) {
    let k = means.len();
    // Large enough that no round quota is clamped up to 1.
    let budget = 2 * k as u64 * u64::from(phases(k)) + extra;
    let cfg = BudgetConfig::new(k, budget)
        .with_split(split)
        .with_history(true);
    (SequentialHalving::new(cfg).unwrap(), budget)
}

fn drive<S: HalvingScheduler>(s: &mut S, means: &[f64], steps: u64) {
    for _ in 0..steps {
        let a = s.choose_arm();
        s.observe_reward(a, means[a]);
    }
}

proptest! {
    #[test]
    fn budgeted_ladder_respects_budget_and_halves_correctly(
        means in prop::collection::vec(-1.0f64..1.0, 2..20),
        extra in 0u64..2_000,
        split in split_strategy(),
    ) {
        let (mut s, budget) = budgeted(&means, extra, split);
        let k = means.len();
        drive(&mut s, &means, budget + 1);

        prop_assert!(s.is_terminal());
        prop_assert!(s.pulls_issued() <= budget);
        prop_assert_eq!(s.active_set().len(), 1);
        prop_assert_eq!(s.recommend(), s.active_set()[0]);

        let bs = s.halvings();
        prop_assert_eq!(bs.len() as u32, phases(k));
        let mut n = k;
        for b in bs {
            prop_assert_eq!(b.kind, BoundaryKind::Halved);
            prop_assert_eq!(b.before, n);
            prop_assert_eq!(b.after, survivor_count(n, 1));
            prop_assert!(b.at_pull <= budget);
            n = b.after;
        }
    }

    #[test]
    fn budgeted_rounds_pull_every_active_arm_equally(
        means in prop::collection::vec(-1.0f64..1.0, 2..16),
        extra in 0u64..1_000,
        split in split_strategy(),
    ) {
        let (mut s, budget) = budgeted(&means, extra, split);
        drive(&mut s, &means, budget + 1);

        let history = s.history().unwrap();
        let mut cuts: Vec<usize> = s.halvings().iter().map(|b| b.at_pull as usize).collect();
        cuts.push(s.pulls_issued() as usize);
        let mut start = 0;
        for end in cuts {
            let mut counts: BTreeMap<Arm, usize> = BTreeMap::new();
            for &a in &history[start..end] {
                *counts.entry(a).or_default() += 1;
            }
            let mut distinct = counts.values();
            if let Some(first) = distinct.next() {
                prop_assert!(distinct.all(|c| c == first), "uneven round: {:?}", counts);
            }
            start = end;
        }
    }

    #[test]
    fn budgeted_runs_are_deterministic(
        means in prop::collection::vec(-1.0f64..1.0, 2..12),
        extra in 0u64..500,
        split in split_strategy(),
    ) {
        let (mut a, budget) = budgeted(&means, extra, split);
        let (mut b, _) = budgeted(&means, extra, split);
        drive(&mut a, &means, budget + 5);
        drive(&mut b, &means, budget + 5);
        prop_assert_eq!(a.history(), b.history());
        prop_assert_eq!(a.halvings(), b.halvings());
        prop_assert_eq!(a.recommend(), b.recommend());
    }

    #[test]
    fn terminal_state_is_idempotent(
        means in prop::collection::vec(-1.0f64..1.0, 1..12),
        extra in 0u64..300,
        repeats in 1usize..20,
    ) {
        let (mut s, budget) = budgeted(&means, extra, BudgetSplit::Halved);
        drive(&mut s, &means, budget + 1);
        prop_assert!(s.is_terminal());

        let issued = s.pulls_issued();
        let survivor = s.active_set()[0];
        for _ in 0..repeats {
            prop_assert_eq!(s.choose_arm(), survivor);
        }
        prop_assert_eq!(s.pulls_issued(), issued);
        prop_assert_eq!(s.active_set(), &[survivor][..]);
    }

    #[test]
    fn anytime_boundaries_halve_or_restart(
        means in prop::collection::vec(-1.0f64..1.0, 1..16),
        steps in 0u64..400,
    ) {
        let k = means.len();
        let cfg = AnytimeConfig::new(k).with_history(true);
        let mut s = AnytimeSequentialHalving::with_clock(cfg, ManualClock::new()).unwrap();
        drive(&mut s, &means, steps);

        prop_assert_eq!(s.stats().total_pulls(), steps);
        prop_assert_eq!(s.pulls_issued(), steps);
        for b in s.halvings() {
            match b.kind {
                BoundaryKind::Halved => {
                    prop_assert!(b.before > 2);
                    prop_assert_eq!(b.after, survivor_count(b.before, 2));
                }
                BoundaryKind::Restarted => {
                    prop_assert!(b.before <= 2);
                    prop_assert_eq!(b.after, k);
                }
            }
        }
        let restarts = s
            .halvings()
            .iter()
            .filter(|b| b.kind == BoundaryKind::Restarted)
            .count() as u64;
        prop_assert_eq!(restarts, s.ladders_completed());

        let active = s.active_set();
        prop_assert!(!active.is_empty());
        prop_assert!(active.iter().all(|&a| a < k));
        let mut dedup = active.to_vec();
        dedup.sort_unstable();
        dedup.dedup();
        prop_assert_eq!(dedup.len(), active.len());
    }

    #[test]
    fn timed_ladder_terminates_after_all_rounds(
        means in prop::collection::vec(-1.0f64..1.0, 2..16),
        budget_ms in 10u64..2_000,
        step_ms in 1u64..20,
    ) {
        let k = means.len();
        let clock = ManualClock::new();
        let cfg = TimedConfig::new(k, Duration::from_millis(budget_ms)).with_history(true);
        let mut s = TimedSequentialHalving::with_clock(cfg, clock.clone()).unwrap();

        // Enough for every round to outlast both its time slice and its first pass.
        let calls = budget_ms / step_ms + 2 * k as u64 + 2 * u64::from(phases(k)) + 2;
        for _ in 0..calls {
            let a = s.choose_arm();
            s.observe_reward(a, means[a]);
            clock.advance(Duration::from_millis(step_ms));
        }

        prop_assert!(s.is_terminal());
        prop_assert_eq!(s.halvings().len() as u32, phases(k));
        prop_assert!(s.stats().iter().all(|(_, st)| st.pulls > 0));
        let mut n = k;
        let mut prev_at = 0;
        for b in s.halvings() {
            // Each round makes at least one full pass before halving.
            prop_assert!(b.at_pull - prev_at >= b.before as u64);
            prev_at = b.at_pull;
            prop_assert_eq!(b.before, n);
            prop_assert_eq!(b.after, survivor_count(n, 1));
            n = b.after;
        }
    }
}
