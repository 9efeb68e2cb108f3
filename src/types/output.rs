//! Output types produced by the solvers and the validator.

use serde::{Deserialize, Serialize};
use strum::Display;

use super::money::{cents_to_string, Cents};
use super::plan::{Action, HORIZON};

// ============================================================================
// OBJECTIVE
// ============================================================================

/// The lexicographic objective `(workdays, b2b, abs_diff)`.
///
/// Field order matters: the derived `Ord` compares left-to-right, which is
/// exactly the lexicographic ordering the solvers minimize.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Objective {
    /// Number of `Work` days in the schedule.
    pub workdays: u32,
    /// Number of adjacent `(Work, Work)` pairs.
    pub b2b: u32,
    /// `|closing_30 - target_end|` in cents.
    pub abs_diff_cents: Cents,
}

impl Objective {
    /// The `[workdays, b2b, abs_diff_cents]` tuple used in serialized output.
    pub fn as_tuple(&self) -> (u32, u32, Cents) {
        (self.workdays, self.b2b, self.abs_diff_cents)
    }
}

// ============================================================================
// LEDGER
// ============================================================================

/// One day of the computed ledger.
///
/// Invariant: `closing = opening + deposits + net - bills`. `deposits_cents`
/// includes manual adjustments, which apply like deposits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayLedger {
    /// Day of month, 1..=30.
    pub day: u8,
    /// Balance at the start of the day; the previous day's closing.
    pub opening_cents: Cents,
    /// Deposits plus adjustments credited during the day.
    pub deposits_cents: Cents,
    /// The action taken.
    pub action: Action,
    /// Net cents contributed by the action.
    pub net_cents: Cents,
    /// Bills paid during the day.
    pub bills_cents: Cents,
    /// End-of-day balance.
    pub closing_cents: Cents,
}

// ============================================================================
// SCHEDULE
// ============================================================================

/// Diagnostics about the solver run that produced a schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverInfo {
    /// Which engine produced the schedule (`"dp"` or `"cpsat"`).
    pub name: String,
    /// Per-stage statuses of the sequential lexicographic run (CP-SAT only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statuses: Option<Vec<String>>,
    /// Wall-clock seconds spent solving (CP-SAT only; diagnostics, not part
    /// of any computation).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seconds: Option<f64>,
    /// Why a fallback engine was used, when one was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

impl SolverInfo {
    /// Diagnostics for a plain DP solve.
    pub fn dp() -> Self {
        SolverInfo {
            name: "dp".to_string(),
            statuses: None,
            seconds: None,
            fallback_reason: None,
        }
    }

    /// Diagnostics for a CP-SAT solve.
    pub fn cpsat(statuses: Vec<String>, seconds: f64) -> Self {
        SolverInfo {
            name: "cpsat".to_string(),
            statuses: Some(statuses),
            seconds: Some(seconds),
            fallback_reason: None,
        }
    }
}

/// A complete solved schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// The chosen action for each day. `actions[0]` is always `Work`.
    pub actions: [Action; HORIZON],
    /// The minimized lexicographic objective.
    pub objective: Objective,
    /// End-of-month balance.
    pub final_closing_cents: Cents,
    /// The derived day-by-day ledger.
    pub ledger: Vec<DayLedger>,
    /// Which solver produced this schedule, and how.
    pub solver: SolverInfo,
}

impl Schedule {
    /// Closing balance at the end of a given day (1..=30).
    pub fn closing_on(&self, day: u8) -> Cents {
        self.ledger[day as usize - 1].closing_cents
    }
}

// ============================================================================
// VALIDATION
// ============================================================================

/// A single named feasibility check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Check {
    /// Check name, stable across releases.
    pub name: String,
    /// Whether the check passed.
    pub pass: bool,
    /// Human-readable outcome.
    pub detail: String,
}

/// The validator's verdict on a `(Plan, Schedule)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Conjunction of all checks.
    pub ok: bool,
    /// The individual checks, in a fixed order.
    pub checks: Vec<Check>,
}

impl ValidationReport {
    /// Assemble a report; `ok` is the conjunction of the checks.
    pub fn from_checks(checks: Vec<Check>) -> Self {
        ValidationReport {
            ok: checks.iter().all(|c| c.pass),
            checks,
        }
    }
}

// ============================================================================
// VERIFICATION (CP-SAT cross-check)
// ============================================================================

/// Status of one sequential-lexicographic solver stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum CpStatus {
    /// The stage minimum is proven.
    #[strum(serialize = "OPTIMAL")]
    #[serde(rename = "OPTIMAL")]
    Optimal,
    /// A solution exists but the deadline expired before the proof.
    #[strum(serialize = "FEASIBLE")]
    #[serde(rename = "FEASIBLE")]
    Feasible,
    /// The stage constraints admit no solution.
    #[strum(serialize = "INFEASIBLE")]
    #[serde(rename = "INFEASIBLE")]
    Infeasible,
    /// The deadline expired before any solution was found.
    #[strum(serialize = "UNKNOWN")]
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

/// Result of cross-checking a DP schedule against the CP-SAT model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// Status of each completed stage, in order.
    pub statuses: Vec<CpStatus>,
    /// Best known bound of each completed stage, in order.
    pub bounds: Vec<i64>,
    /// The CP-SAT objective, when all three stages proved optimal.
    pub objective: Option<Objective>,
    /// The DP objective being verified.
    pub dp_objective: Objective,
    /// True when both solvers agree on the objective triple. Action
    /// sequences may still differ; ties are permitted.
    pub ok: bool,
}

// ============================================================================
// SERIALIZED DOCUMENT
// ============================================================================

/// One ledger row in the external JSON shape; money as `"D.CC"` strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRow {
    /// Day of month.
    pub day: u8,
    /// Opening balance.
    pub opening: String,
    /// Deposits plus adjustments.
    pub deposits: String,
    /// The action literal.
    pub action: Action,
    /// Action net.
    pub net: String,
    /// Bills paid.
    pub bills: String,
    /// Closing balance.
    pub closing: String,
}

/// The returned schedule in the external JSON shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDocument {
    /// Action literals, one per day.
    pub actions: Vec<Action>,
    /// `[workdays, b2b, abs_diff_cents]`; the last entry is integer cents.
    pub objective: (u32, u32, Cents),
    /// Final closing balance as `"D.CC"`.
    pub final_closing: String,
    /// The day-by-day ledger.
    pub ledger: Vec<LedgerRow>,
    /// The validator's checks as `[name, ok, detail]` triples.
    pub checks: Vec<(String, bool, String)>,
    /// Solver diagnostics.
    pub solver: SolverInfo,
}

impl ScheduleDocument {
    /// Render a schedule and its validation report into the wire shape.
    pub fn assemble(schedule: &Schedule, report: &ValidationReport) -> Self {
        ScheduleDocument {
            actions: schedule.actions.to_vec(),
            objective: schedule.objective.as_tuple(),
            final_closing: cents_to_string(schedule.final_closing_cents),
            ledger: schedule
                .ledger
                .iter()
                .map(|row| LedgerRow {
                    day: row.day,
                    opening: cents_to_string(row.opening_cents),
                    deposits: cents_to_string(row.deposits_cents),
                    action: row.action,
                    net: cents_to_string(row.net_cents),
                    bills: cents_to_string(row.bills_cents),
                    closing: cents_to_string(row.closing_cents),
                })
                .collect(),
            checks: report
                .checks
                .iter()
                .map(|c| (c.name.clone(), c.pass, c.detail.clone()))
                .collect(),
            solver: schedule.solver.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_objective_lexicographic_order() {
        let a = Objective {
            workdays: 5,
            b2b: 0,
            abs_diff_cents: 2_500,
        };
        let b = Objective {
            workdays: 5,
            b2b: 1,
            abs_diff_cents: 0,
        };
        let c = Objective {
            workdays: 6,
            b2b: 0,
            abs_diff_cents: 0,
        };
        assert!(a < b);
        assert!(b < c);
        assert!(a < c);
    }

    #[test]
    fn test_validation_report_conjunction() {
        let report = ValidationReport::from_checks(vec![
            Check {
                name: "a".into(),
                pass: true,
                detail: String::new(),
            },
            Check {
                name: "b".into(),
                pass: false,
                detail: String::new(),
            },
        ]);
        assert!(!report.ok);

        let report = ValidationReport::from_checks(vec![Check {
            name: "a".into(),
            pass: true,
            detail: String::new(),
        }]);
        assert!(report.ok);
    }

    #[test]
    fn test_cp_status_display() {
        assert_eq!(CpStatus::Optimal.to_string(), "OPTIMAL");
        assert_eq!(CpStatus::Unknown.to_string(), "UNKNOWN");
    }

    #[test]
    fn test_action_serializes_as_literal() {
        let json = serde_json::to_string(&vec![Action::Work, Action::Off]).unwrap();
        assert_eq!(json, r#"["Spark","O"]"#);
    }
}
