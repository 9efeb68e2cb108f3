//! Mid-month re-planning.
//!
//! `solve_from` re-solves a tail behind a locked prefix; `adjust_from_day`
//! additionally reconciles the ledger with an observed balance by appending a
//! compensating adjustment before re-solving. Locks and adjustments compose:
//! the lock prefix pins actions, the single trailing adjustment realigns the
//! cashflow, and the solver re-optimizes the free days.

use crate::solvers::{solve, SolverConfig};
use crate::types::{
    cents_to_string, Adjustment, CfsError, CfsResult, Cents, Plan, Schedule, HORIZON,
};

fn check_day(day: u8) -> CfsResult<u8> {
    if (1..=HORIZON as u8).contains(&day) {
        Ok(day)
    } else {
        Err(CfsError::invalid_day(day as i64))
    }
}

/// Solve a plan whose first `start_day` days carry a locked prefix.
///
/// The ordinary solve already restricts locked days; this helper only
/// insists the prefix really is locked before delegating.
///
/// # Errors
///
/// `InvalidDay` for a day outside 1..=30, `InvalidPlan` when any prefix day
/// is unlocked, plus whatever the solve itself returns.
pub fn solve_from(plan: &Plan, config: &SolverConfig, start_day: u8) -> CfsResult<Schedule> {
    check_day(start_day)?;
    for day in 1..=start_day {
        if plan.lock(day).is_none() {
            return Err(CfsError::invalid_plan(format!(
                "resume from day {start_day} requires day {day} to be locked"
            )));
        }
    }
    solve(plan, config)
}

/// Re-plan the rest of the month from an observed end-of-day balance.
///
/// Solves the full plan, locks the first `current_day` actions of that
/// solution into a fresh plan (remaining days free), appends an adjustment
/// on `current_day` equal to the observed minus the computed closing, and
/// re-solves. The new ledger's `current_day` closing equals the observation
/// exactly; later days are re-optimized.
///
/// # Errors
///
/// `InvalidDay` for a day outside 1..=30; `Infeasible` when either solve
/// proves no schedule exists.
pub fn adjust_from_day(
    plan: &Plan,
    current_day: u8,
    actual_eod_cents: Cents,
    config: &SolverConfig,
) -> CfsResult<Schedule> {
    check_day(current_day)?;

    let baseline = solve(plan, config)?;
    let computed = baseline.closing_on(current_day);
    let delta = actual_eod_cents - computed;

    log::info!(
        "adjust from day {current_day}: computed {}, actual {}, delta {}",
        cents_to_string(computed),
        cents_to_string(actual_eod_cents),
        cents_to_string(delta)
    );

    let mut replanned = plan.clone();
    replanned.actions = [None; HORIZON];
    for day in 0..current_day as usize {
        replanned.actions[day] = Some(baseline.actions[day]);
    }
    replanned.manual_adjustments.push(Adjustment {
        day: current_day,
        amount_cents: delta,
        note: format!("day {current_day} balance sync"),
    });

    solve(&replanned, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Action, Bill, Deposit};
    use pretty_assertions::assert_eq;

    fn make_plan() -> Plan {
        Plan {
            start_balance_cents: 10_000,
            target_end_cents: 20_000,
            band_cents: 5_000,
            rent_guard_cents: 80_000,
            deposits: vec![Deposit {
                day: 15,
                amount_cents: 50_000,
            }],
            bills: vec![
                Bill {
                    day: 5,
                    name: "Phone".to_string(),
                    amount_cents: 7_500,
                },
                Bill {
                    day: 30,
                    name: "Rent".to_string(),
                    amount_cents: 80_000,
                },
            ],
            actions: [None; HORIZON],
            manual_adjustments: vec![],
            metadata: serde_json::Map::new(),
        }
    }

    fn dp_config() -> SolverConfig {
        SolverConfig {
            solver: crate::solvers::SolverChoice::Dp,
            ..SolverConfig::default()
        }
    }

    #[test]
    fn test_adjust_is_idempotent_on_matching_balance() {
        let plan = make_plan();
        let config = dp_config();
        let baseline = solve(&plan, &config).unwrap();
        let actual = baseline.closing_on(10);

        let adjusted = adjust_from_day(&plan, 10, actual, &config).unwrap();
        assert_eq!(adjusted.actions, baseline.actions);
        assert_eq!(adjusted.objective, baseline.objective);
        assert_eq!(adjusted.final_closing_cents, baseline.final_closing_cents);
    }

    #[test]
    fn test_adjust_realigns_shortfall() {
        let plan = make_plan();
        let config = dp_config();
        let baseline = solve(&plan, &config).unwrap();
        let actual = baseline.closing_on(10) - 5_000;

        let adjusted = adjust_from_day(&plan, 10, actual, &config).unwrap();
        assert_eq!(&adjusted.actions[..10], &baseline.actions[..10]);
        assert_eq!(adjusted.closing_on(10), actual);
        // The shortfall sits within the band, so no extra work day is needed.
        assert_eq!(adjusted.objective.workdays, baseline.objective.workdays);
        assert!(adjusted.objective >= baseline.objective);
    }

    #[test]
    fn test_adjust_rejects_bad_day() {
        let plan = make_plan();
        assert!(matches!(
            adjust_from_day(&plan, 31, 0, &dp_config()),
            Err(CfsError::InvalidDay { day: 31 })
        ));
    }

    #[test]
    fn test_solve_from_requires_locked_prefix() {
        let plan = make_plan();
        assert!(matches!(
            solve_from(&plan, &dp_config(), 5),
            Err(CfsError::InvalidPlan { .. })
        ));

        let mut locked = plan.clone();
        locked.actions[0] = Some(Action::Work);
        for day in 1..5 {
            locked.actions[day] = Some(Action::Off);
        }
        let schedule = solve_from(&locked, &dp_config(), 5).unwrap();
        assert_eq!(schedule.actions[0], Action::Work);
        assert_eq!(&schedule.actions[1..5], &[Action::Off; 4]);
    }
}
