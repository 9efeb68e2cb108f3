//! Main CFS Engine
//!
//! This module provides the primary entry points for running a scheduling
//! solve end to end: ingest a plan, dispatch to the configured solver,
//! validate the result, and render the wire document.
//!
//! # Usage
//!
//! ```rust,ignore
//! use cfs_engine::{run_cfs, PlanInput};
//!
//! let output = run_cfs(plan_input)?;
//! println!("workdays: {}", output.schedule.objective.workdays);
//! ```

use crate::solvers::{self, SolverConfig};
use crate::types::{
    CfsResult, PlanInput, Schedule, ScheduleDocument, ValidationReport,
};
use crate::validate::validate;

/// The complete output of one engine run.
#[derive(Debug, Clone, PartialEq)]
pub struct CfsOutput {
    /// The solved schedule.
    pub schedule: Schedule,
    /// The validator's verdict on it.
    pub validation: ValidationReport,
}

impl CfsOutput {
    /// Render into the external JSON shape.
    pub fn to_document(&self) -> ScheduleDocument {
        ScheduleDocument::assemble(&self.schedule, &self.validation)
    }
}

/// Main entry point for CFS solves.
///
/// Ingests a plan in the external shape, solves it with the default
/// configuration, and validates the result.
///
/// # Errors
///
/// Ingest errors (`InvalidAmount`, `InvalidDay`, `InvalidActionLiteral`,
/// `InvalidPlan`) or solver errors (`Infeasible`, `SolverUnavailable`,
/// `Timeout`).
pub fn run_cfs(input: PlanInput) -> CfsResult<CfsOutput> {
    run_cfs_with_config(input, SolverConfig::default())
}

/// Run CFS with custom configuration.
///
/// See `run_cfs` for basic usage. This variant allows customizing solver
/// choice, CP time limits, and fallback policy through [`SolverConfig`].
pub fn run_cfs_with_config(input: PlanInput, config: SolverConfig) -> CfsResult<CfsOutput> {
    let plan = input.into_plan()?;

    log::info!(
        "CFS Engine starting: {:?} solver, {} deposits, {} bills",
        config.solver,
        plan.deposits.len(),
        plan.bills.len()
    );

    let schedule = solvers::solve(&plan, &config)?;
    let validation = validate(&plan, &schedule)?;
    if !validation.ok {
        log::warn!("solver output failed validation: {:?}", validation.checks);
    }

    log::info!(
        "CFS Engine completed: objective ({}, {}, {}) via {}",
        schedule.objective.workdays,
        schedule.objective.b2b,
        schedule.objective.abs_diff_cents,
        schedule.solver.name
    );

    Ok(CfsOutput {
        schedule,
        validation,
    })
}

/// Run CFS from a JSON plan (for FFI-style callers).
///
/// Accepts the plan document as a JSON string and returns the schedule
/// document as a JSON string, with errors flattened to messages.
pub fn run_cfs_json(plan_json: &str) -> Result<String, String> {
    run_cfs_json_with_config(plan_json, SolverConfig::default())
}

/// JSON-in/JSON-out variant of [`run_cfs_with_config`].
pub fn run_cfs_json_with_config(
    plan_json: &str,
    config: SolverConfig,
) -> Result<String, String> {
    let input: PlanInput = serde_json::from_str(plan_json)
        .map_err(|e| format!("Failed to parse plan: {e}"))?;

    let output = run_cfs_with_config(input, config).map_err(|e| e.to_string())?;

    serde_json::to_string(&output.to_document())
        .map_err(|e| format!("Failed to serialize schedule: {e}"))
}

/// Get engine version information.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Engine build information
#[derive(Debug, Clone)]
pub struct EngineInfo {
    pub version: &'static str,
    pub name: &'static str,
    pub features: Vec<&'static str>,
}

/// Get engine build information.
pub fn engine_info() -> EngineInfo {
    EngineInfo {
        version: env!("CARGO_PKG_VERSION"),
        name: env!("CARGO_PKG_NAME"),
        features: get_enabled_features(),
    }
}

fn get_enabled_features() -> Vec<&'static str> {
    let mut features = vec![];

    #[cfg(feature = "cpsat")]
    features.push("cpsat");

    features
}
