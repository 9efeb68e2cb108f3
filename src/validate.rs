//! Feasibility validation.
//!
//! The four checks here are the sole source of truth for hard feasibility;
//! both solvers enforce an equivalent set. The validator is independent of
//! any solver: it rebuilds the ledger from the plan and the schedule's
//! actions, mutates nothing, and never retries.

use crate::ledger::build_ledger;
use crate::types::{
    cents_to_string, Action, CfsResult, Check, Plan, Schedule, ValidationReport, HORIZON,
};

/// Check names, in report order.
pub const CHECK_DAY1_WORK: &str = "Day 1 is Work";
pub const CHECK_NON_NEGATIVE: &str = "Non-negative closings";
pub const CHECK_FINAL_BAND: &str = "Final within band";
pub const CHECK_PRE_RENT: &str = "Day-30 pre-rent guard";

/// Validate a `(Plan, Schedule)` pair against the hard feasibility rules.
///
/// # Errors
///
/// Only structural errors from rebuilding the ledger (bad days or amounts in
/// the plan). A feasibility violation is not an error; it is a failed check
/// in the returned report.
pub fn validate(plan: &Plan, schedule: &Schedule) -> CfsResult<ValidationReport> {
    let ledger = build_ledger(plan, &schedule.actions)?;
    let mut checks = Vec::with_capacity(4);

    // Check 1: day 1 is Work.
    let first = schedule.actions[0];
    checks.push(Check {
        name: CHECK_DAY1_WORK.to_string(),
        pass: first == Action::Work,
        detail: format!("day 1 action is {first}"),
    });

    // Check 2: every closing is non-negative.
    let violation = ledger.iter().find(|row| row.closing_cents < 0);
    checks.push(match violation {
        None => Check {
            name: CHECK_NON_NEGATIVE.to_string(),
            pass: true,
            detail: "all 30 closings are non-negative".to_string(),
        },
        Some(row) => Check {
            name: CHECK_NON_NEGATIVE.to_string(),
            pass: false,
            detail: format!(
                "day {} closes at {}",
                row.day,
                cents_to_string(row.closing_cents)
            ),
        },
    });

    // Check 3: final closing within the band around the target.
    let closing_30 = ledger[HORIZON - 1].closing_cents;
    let low = plan.target_end_cents - plan.band_cents;
    let high = plan.target_end_cents + plan.band_cents;
    checks.push(Check {
        name: CHECK_FINAL_BAND.to_string(),
        pass: (low..=high).contains(&closing_30),
        detail: format!(
            "final closing {} against allowed [{}, {}]",
            cents_to_string(closing_30),
            cents_to_string(low),
            cents_to_string(high)
        ),
    });

    // Check 4: day-30 balance before bills meets the rent guard.
    let pre_rent = closing_30 + ledger[HORIZON - 1].bills_cents;
    checks.push(Check {
        name: CHECK_PRE_RENT.to_string(),
        pass: pre_rent >= plan.rent_guard_cents,
        detail: format!(
            "pre-rent balance {} against required floor {}",
            cents_to_string(pre_rent),
            cents_to_string(plan.rent_guard_cents)
        ),
    });

    Ok(ValidationReport::from_checks(checks))
}
