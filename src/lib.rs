//! # Cashflow Scheduler (CFS) Engine
//!
//! A pure Rust scheduling engine for 30-day personal cashflow plans.
//! Given a monthly plan - starting balance, scheduled deposits and bills, a
//! target ending balance with tolerance, a rent-guard floor, and optional
//! per-day locks and one-off adjustments - the engine produces a 30-element
//! sequence of daily actions (work or off) together with a day-by-day
//! ledger, minimizing the lexicographic objective
//! `(workdays, back-to-back pairs, |final closing - target|)`.
//!
//! ## Features
//!
//! - **Pure functions** - No side effects, fully deterministic
//! - **Exact math** - Integer cents end to end; decimals only at the ingest
//!   boundary, never floating point
//! - **Two independent engines** - A dynamic-programming solver and a
//!   constraint-programming verifier that must agree on the objective
//! - **Mid-month re-planning** - Resume from any day against an observed
//!   balance
//!
//! ## Architecture
//!
//! ```text
//! PlanInput -> Plan -> Solver (DP | CP-SAT) -> Schedule
//!                          |                      |
//!                   prefix aggregates         Validator -> ValidationReport
//! ```
//!
//! The validator's four checks are the single source of feasibility truth:
//! day 1 is Work, every closing is non-negative, the final closing lands
//! inside the target band, and the day-30 pre-rent balance meets the rent
//! guard. Both solvers enforce an equivalent set, so a correct solve always
//! validates.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cfs_engine::{run_cfs, PlanInput};
//!
//! let input: PlanInput = serde_json::from_str(plan_json)?;
//! let output = run_cfs(input)?;
//!
//! println!("workdays: {}", output.schedule.objective.workdays);
//! println!("final closing: {}", output.to_document().final_closing);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

// Core modules
pub mod adjust;
pub mod engine;
pub mod ledger;
pub mod solvers;
pub mod types;
pub mod validate;

// Re-export commonly used types
pub use types::{
    // Plan types
    Action, Adjustment, AdjustmentInput, Bill, BillInput, Deposit, DepositInput, Plan,
    PlanInput,

    // Money primitives
    cents_to_string, to_cents, Cents, MAX_AMOUNT_CENTS,

    // Output types
    Check, CpStatus, DayLedger, LedgerRow, Objective, Schedule, ScheduleDocument,
    SolverInfo, ValidationReport, VerificationReport,

    // Common types
    CfsError, CfsResult, HORIZON, WORK_NET_CENTS,
};

// Re-export engine functions
pub use engine::{
    engine_info, engine_version, run_cfs, run_cfs_json, run_cfs_json_with_config,
    run_cfs_with_config, CfsOutput, EngineInfo,
};

// Re-export the solver surface
pub use solvers::{cpsat_available, solve, SolverChoice, SolverConfig};
pub use solvers::dp::solve_dp;
pub use solvers::verify::verify_lex_optimal;

// Re-export re-planning helpers
pub use adjust::{adjust_from_day, solve_from};

// Re-export the ledger builder
pub use ledger::{build_ledger, Aggregates};

// Re-export the validator
pub use validate::validate;

/// Prelude module for convenient imports
pub mod prelude {
    //! Commonly used types and traits.
    //!
    //! ```rust,ignore
    //! use cfs_engine::prelude::*;
    //! ```

    pub use crate::adjust::adjust_from_day;
    pub use crate::engine::{run_cfs, run_cfs_with_config, CfsOutput};
    pub use crate::solvers::{solve, SolverChoice, SolverConfig};
    pub use crate::types::{
        Action, CfsError, CfsResult, Cents, Objective, Plan, PlanInput, Schedule,
        ValidationReport,
    };
    pub use crate::validate::validate;

    pub use rust_decimal::Decimal;
    pub use rust_decimal_macros::dec;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        // Verify key types are exported
        let _action = Action::Work;
        let _config = SolverConfig::default();
        let _cents: Cents = WORK_NET_CENTS;
    }

    #[test]
    fn test_prelude_imports() {
        use crate::prelude::*;

        let _action = Action::Off;
        let _choice = SolverChoice::Auto;
    }

    #[test]
    fn test_engine_version() {
        let version = engine_version();
        assert!(!version.is_empty());
        assert!(version.contains('.'));
    }
}
