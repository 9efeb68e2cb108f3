//! Type definitions for the CFS Engine.
//!
//! This module contains all the core data structures used throughout
//! the cashflow scheduling pipeline.
//!
//! # Module Organization
//!
//! - `money` - Integer-cent primitives and the dollar ingest boundary
//! - `plan` - Plan input types (bills, deposits, adjustments, locks)
//! - `output` - Solver results (schedule, ledger, validation, verification)

pub mod money;
pub mod output;
pub mod plan;

// Money primitives
pub use money::{cents_to_string, check_amount, to_cents, Cents, MAX_AMOUNT_CENTS};

// Plan types
pub use plan::{
    Action, Adjustment, AdjustmentInput, Bill, BillInput, Deposit, DepositInput, Plan,
    PlanInput, HORIZON, WORK_NET_CENTS,
};

// Output types
pub use output::*;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Common error type for CFS operations
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum CfsError {
    #[error("Invalid amount: {message}")]
    InvalidAmount { message: String },

    #[error("Invalid day {day}: must be in 1..=30")]
    InvalidDay { day: i64 },

    #[error("Invalid action literal {literal:?}: expected \"O\", \"Spark\", or null")]
    InvalidActionLiteral { literal: String },

    #[error("Invalid plan: {message}")]
    InvalidPlan { message: String },

    #[error("Infeasible: {message}")]
    Infeasible { message: String },

    #[error("Solver unavailable: {message}")]
    SolverUnavailable { message: String },

    #[error("Timeout: {message}")]
    Timeout { message: String },
}

impl CfsError {
    pub fn invalid_amount(message: impl Into<String>) -> Self {
        CfsError::InvalidAmount {
            message: message.into(),
        }
    }

    pub fn invalid_day(day: i64) -> Self {
        CfsError::InvalidDay { day }
    }

    pub fn invalid_action_literal(literal: impl Into<String>) -> Self {
        CfsError::InvalidActionLiteral {
            literal: literal.into(),
        }
    }

    pub fn invalid_plan(message: impl Into<String>) -> Self {
        CfsError::InvalidPlan {
            message: message.into(),
        }
    }

    pub fn infeasible(message: impl Into<String>) -> Self {
        CfsError::Infeasible {
            message: message.into(),
        }
    }

    pub fn solver_unavailable(message: impl Into<String>) -> Self {
        CfsError::SolverUnavailable {
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        CfsError::Timeout {
            message: message.into(),
        }
    }
}

/// Result type alias for CFS operations
pub type CfsResult<T> = Result<T, CfsError>;
