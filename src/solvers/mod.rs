//! Solver engines and dispatch.
//!
//! Two independent engines compute the same schedule: the primary
//! dynamic-programming solver in [`dp`] and the constraint-programming
//! verifier in [`cpsat`] (behind the `cpsat` cargo feature). [`solve`]
//! dispatches between them according to [`SolverConfig`]; [`verify`] holds
//! the cross-check API.

pub mod dp;
pub mod verify;

#[cfg(feature = "cpsat")]
pub mod cpsat;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::types::{CfsError, CfsResult, Plan, Schedule};

/// Which engine to run.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SolverChoice {
    /// Try CP-SAT, fall back to DP when the backend is unavailable.
    #[default]
    Auto,
    /// The dynamic-programming engine.
    Dp,
    /// The constraint-programming engine.
    Cpsat,
}

/// Engine configuration options.
///
/// Passed explicitly to every entry point; there are no process-wide
/// defaults beyond `Default::default()`, and two concurrent solves with
/// different configurations do not interfere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Which engine to run.
    pub solver: SolverChoice,

    /// Wall-clock cap in seconds for the entire sequential-lex CP run;
    /// 0 = no limit.
    pub max_time_seconds: u64,

    /// CP search workers. Accepted for API compatibility; the search is
    /// single-threaded and deterministic at any setting.
    pub num_search_workers: u32,

    /// When the CP backend is unavailable and the solver choice is `Cpsat`,
    /// silently fall back to DP instead of failing.
    pub dp_fallback: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            solver: SolverChoice::Auto,
            max_time_seconds: 60,
            num_search_workers: 8,
            dp_fallback: false,
        }
    }
}

/// Whether the CP-SAT backend was compiled in.
pub fn cpsat_available() -> bool {
    cfg!(feature = "cpsat")
}

#[cfg(feature = "cpsat")]
fn solve_cpsat_backend(plan: &Plan, config: &SolverConfig) -> CfsResult<Schedule> {
    cpsat::solve_cpsat(plan, config)
}

#[cfg(not(feature = "cpsat"))]
fn solve_cpsat_backend(_plan: &Plan, _config: &SolverConfig) -> CfsResult<Schedule> {
    Err(CfsError::solver_unavailable(
        "built without the cpsat feature",
    ))
}

fn dp_with_reason(plan: &Plan, reason: &str) -> CfsResult<Schedule> {
    let mut schedule = dp::solve_dp(plan)?;
    schedule.solver.fallback_reason = Some(reason.to_string());
    Ok(schedule)
}

/// Solve a plan with the configured engine.
///
/// `Auto` prefers CP-SAT and falls back to DP when the backend is
/// unavailable; an explicit `Cpsat` choice falls back only when
/// `dp_fallback` is set, recording the reason in the schedule diagnostics.
pub fn solve(plan: &Plan, config: &SolverConfig) -> CfsResult<Schedule> {
    match config.solver {
        SolverChoice::Dp => dp::solve_dp(plan),
        SolverChoice::Cpsat => match solve_cpsat_backend(plan, config) {
            Err(CfsError::SolverUnavailable { message }) if config.dp_fallback => {
                dp_with_reason(plan, &message)
            }
            other => other,
        },
        SolverChoice::Auto => match solve_cpsat_backend(plan, config) {
            Err(CfsError::SolverUnavailable { message }) => dp_with_reason(plan, &message),
            other => other,
        },
    }
}
