//! Cross-checking a DP schedule against the constraint model.
//!
//! A correct DP solve and a correct CP-SAT solve agree on the objective
//! triple; the action sequences may differ because ties are permitted.
//! `verify_lex_optimal` runs the sequential lexicographic stages and compares
//! objectives only.

use crate::types::{CfsResult, Plan, Schedule, VerificationReport};
use crate::solvers::SolverConfig;

/// Confirm that a schedule's objective is the lexicographic optimum.
///
/// Returns the per-stage statuses, the per-stage best known bounds, the CP
/// objective when all stages proved optimal, and `ok` when that objective
/// equals the schedule's. A stage that stops early leaves `objective` unset
/// and `ok` false; the statuses and bounds describe how far the run got.
///
/// # Errors
///
/// `SolverUnavailable` when built without the `cpsat` feature; otherwise
/// only structural errors from model building.
#[cfg(feature = "cpsat")]
pub fn verify_lex_optimal(
    plan: &Plan,
    schedule: &Schedule,
    config: &SolverConfig,
) -> CfsResult<VerificationReport> {
    let outcome = crate::solvers::cpsat::run_lex_stages(plan, config)?;
    let ok = outcome.objective == Some(schedule.objective);
    if !ok {
        log::warn!(
            "verification mismatch: dp objective ({}, {}, {}), cpsat {:?}",
            schedule.objective.workdays,
            schedule.objective.b2b,
            schedule.objective.abs_diff_cents,
            outcome.objective
        );
    }
    Ok(VerificationReport {
        statuses: outcome.statuses,
        bounds: outcome.bounds,
        objective: outcome.objective,
        dp_objective: schedule.objective,
        ok,
    })
}

/// Confirm that a schedule's objective is the lexicographic optimum.
///
/// # Errors
///
/// Always `SolverUnavailable`: this build carries no CP backend.
#[cfg(not(feature = "cpsat"))]
pub fn verify_lex_optimal(
    _plan: &Plan,
    _schedule: &Schedule,
    _config: &SolverConfig,
) -> CfsResult<VerificationReport> {
    Err(crate::types::CfsError::solver_unavailable(
        "built without the cpsat feature",
    ))
}

#[cfg(all(test, feature = "cpsat"))]
mod tests {
    use super::*;
    use crate::solvers::dp::solve_dp;
    use crate::types::{Bill, CpStatus, Deposit, Objective, HORIZON};
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

    #[test]
    fn test_confirms_dp_optimum() {
        let plan = make_plan();
        let schedule = solve_dp(&plan).unwrap();
        let report = verify_lex_optimal(&plan, &schedule, &SolverConfig::default()).unwrap();
        assert!(report.ok);
        assert_eq!(report.statuses, vec![CpStatus::Optimal; 3]);
        assert_eq!(report.objective, Some(schedule.objective));
    }

    #[test]
    fn test_flags_suboptimal_objective() {
        let plan = make_plan();
        let mut schedule = solve_dp(&plan).unwrap();
        schedule.objective = Objective {
            workdays: schedule.objective.workdays + 1,
            b2b: 0,
            abs_diff_cents: 0,
        };
        let report = verify_lex_optimal(&plan, &schedule, &SolverConfig::default()).unwrap();
        assert!(!report.ok);
        assert_eq!(report.dp_objective.workdays, 6);
    }
}
