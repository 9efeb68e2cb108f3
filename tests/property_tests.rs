//! Property tests for the solver invariants.
//!
//! Random small plans are thrown at the DP engine; every produced schedule
//! must satisfy the hard checks, round-trip through the validator, and agree
//! with the constraint-programming engine on the objective triple.

use proptest::prelude::*;

use cfs_engine::{solve_dp, validate, Action, Plan, MAX_AMOUNT_CENTS, HORIZON};

fn arb_locks() -> impl Strategy<Value = [Option<Action>; HORIZON]> {
    proptest::collection::vec((1u8..=HORIZON as u8, prop_oneof![Just(Action::Off), Just(Action::Work)]), 0..3)
        .prop_map(|locks| {
            let mut actions = [None; HORIZON];
            for (day, action) in locks {
                actions[day as usize - 1] = Some(action);
            }
            actions
        })
}

prop_compose! {
    fn arb_plan()(
        start in 0..150_000i64,
        target in 0..150_000i64,
        band in 0..30_000i64,
        rent_guard in 0..100_000i64,
        deposits in proptest::collection::vec((1u8..=HORIZON as u8, 0..60_000i64), 0..4),
        bills in proptest::collection::vec((1u8..=HORIZON as u8, 0..60_000i64), 0..5),
        adjustment in proptest::option::of((1u8..=HORIZON as u8, -20_000..20_000i64)),
        actions in arb_locks(),
    ) -> Plan {
        Plan {
            start_balance_cents: start,
            target_end_cents: target,
            band_cents: band,
            rent_guard_cents: rent_guard,
            deposits: deposits
                .into_iter()
                .map(|(day, amount_cents)| cfs_engine::Deposit { day, amount_cents })
                .collect(),
            bills: bills
                .into_iter()
                .enumerate()
                .map(|(i, (day, amount_cents))| cfs_engine::Bill {
                    day,
                    name: format!("Bill {i}"),
                    amount_cents,
                })
                .collect(),
            actions,
            manual_adjustments: adjustment
                .map(|(day, amount_cents)| cfs_engine::Adjustment {
                    day,
                    amount_cents,
                    note: String::new(),
                })
                .into_iter()
                .collect(),
            metadata: serde_json::Map::new(),
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_schedules_satisfy_hard_checks(plan in arb_plan()) {
        let Ok(schedule) = solve_dp(&plan) else { return Ok(()); };

        // Ledger identity, chaining, and bounds.
        for (i, row) in schedule.ledger.iter().enumerate() {
            prop_assert_eq!(
                row.closing_cents,
                row.opening_cents + row.deposits_cents + row.net_cents - row.bills_cents
            );
            if i > 0 {
                prop_assert_eq!(row.opening_cents, schedule.ledger[i - 1].closing_cents);
            }
            prop_assert!(row.closing_cents >= 0);
            prop_assert!(row.deposits_cents.abs() <= 2 * MAX_AMOUNT_CENTS);
        }

        prop_assert_eq!(schedule.actions[0], Action::Work);
        prop_assert!(
            (schedule.final_closing_cents - plan.target_end_cents).abs() <= plan.band_cents
        );
        let last = &schedule.ledger[HORIZON - 1];
        prop_assert!(last.closing_cents + last.bills_cents >= plan.rent_guard_cents);

        for day in 1..=HORIZON as u8 {
            if let Some(locked) = plan.lock(day) {
                prop_assert_eq!(schedule.actions[day as usize - 1], locked);
            }
        }

        let report = validate(&plan, &schedule).unwrap();
        prop_assert!(report.ok);
    }

    #[test]
    fn prop_dp_is_deterministic(plan in arb_plan()) {
        let first = solve_dp(&plan);
        let second = solve_dp(&plan);
        match (first, second) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
            (Err(_), Err(_)) => {}
            _ => prop_assert!(false, "solver disagreed with itself"),
        }
    }
}

#[cfg(feature = "cpsat")]
mod agreement {
    use super::*;
    use cfs_engine::{solve, CfsError, SolverChoice, SolverConfig};

    fn cp_config() -> SolverConfig {
        SolverConfig {
            solver: SolverChoice::Cpsat,
            max_time_seconds: 30,
            ..SolverConfig::default()
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_dp_and_cpsat_agree(plan in arb_plan()) {
            let dp = solve_dp(&plan);
            let cp = solve(&plan, &cp_config());
            match (dp, cp) {
                (Ok(dp), Ok(cp)) => prop_assert_eq!(dp.objective, cp.objective),
                (Err(CfsError::Infeasible { .. }), Err(CfsError::Infeasible { .. })) => {}
                (dp, cp) => prop_assert!(
                    false,
                    "engines disagree: dp={:?} cp={:?}",
                    dp.map(|s| s.objective),
                    cp.map(|s| s.objective)
                ),
            }
        }
    }
}
