//! Plan input types for the scheduling engine.
//!
//! A [`Plan`] is the fully validated, cent-denominated month description the
//! solvers consume. [`PlanInput`] is its serde mirror in the external JSON
//! shape, with dollar amounts; `PlanInput::into_plan` is the single
//! conversion point between the two.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::money::{cents_to_string, to_cents, Cents};
use super::{CfsError, CfsResult};

/// The scheduling horizon is fixed at 30 days.
pub const HORIZON: usize = 30;

/// Net cashflow contributed by one `Work` day ($100).
pub const WORK_NET_CENTS: Cents = 10_000;

/// The daily action choice.
///
/// A closed alphabet: `Off` earns nothing, `Work` earns a fixed
/// [`WORK_NET_CENTS`]. The serialized literals are `"O"` and `"Spark"`.
/// Ordering is `Off < Work`; sequence comparisons rely on it.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
)]
pub enum Action {
    /// No earnings.
    #[serde(rename = "O")]
    #[strum(serialize = "O")]
    Off,
    /// A work day.
    #[serde(rename = "Spark")]
    #[strum(serialize = "Spark")]
    Work,
}

impl Action {
    /// Net cents this action contributes to the day's balance.
    #[inline]
    pub fn net(self) -> Cents {
        match self {
            Action::Off => 0,
            Action::Work => WORK_NET_CENTS,
        }
    }

    /// Parse a serialized action literal.
    ///
    /// # Errors
    ///
    /// `InvalidActionLiteral` for anything other than `"O"` or `"Spark"`.
    pub fn from_literal(literal: &str) -> CfsResult<Self> {
        literal
            .parse()
            .map_err(|_| CfsError::invalid_action_literal(literal))
    }
}

/// A scheduled outflow on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
    /// Day of month, 1..=30.
    pub day: u8,
    /// Label only; never consulted by the solvers.
    pub name: String,
    /// Non-negative amount in cents.
    pub amount_cents: Cents,
}

/// A scheduled inflow on a given day. Multiple same-day deposits are summed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    /// Day of month, 1..=30.
    pub day: u8,
    /// Non-negative amount in cents.
    pub amount_cents: Cents,
}

/// A one-off correction applied like a deposit; the amount may be negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjustment {
    /// Day of month, 1..=30.
    pub day: u8,
    /// Signed amount in cents.
    pub amount_cents: Cents,
    /// Free-form annotation.
    pub note: String,
}

/// A fully validated monthly plan, in cents.
///
/// Read-only through a solve. `actions[i] = Some(a)` locks day `i + 1` to
/// action `a`; `None` leaves the choice to the solver. Locks are an input
/// constraint, never a solver output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// Opening balance on day 1. Non-negative.
    pub start_balance_cents: Cents,
    /// Desired day-30 closing balance. Non-negative.
    pub target_end_cents: Cents,
    /// Half-width of the allowed interval around the target. Non-negative.
    pub band_cents: Cents,
    /// Minimum required day-30 balance before that day's bills. Non-negative.
    pub rent_guard_cents: Cents,
    /// Scheduled inflows.
    pub deposits: Vec<Deposit>,
    /// Scheduled outflows.
    pub bills: Vec<Bill>,
    /// Per-day action locks.
    pub actions: [Option<Action>; HORIZON],
    /// One-off corrections.
    pub manual_adjustments: Vec<Adjustment>,
    /// Opaque caller data, carried through untouched.
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl Plan {
    /// The lock on a given day (1..=30), if any.
    #[inline]
    pub fn lock(&self, day: u8) -> Option<Action> {
        self.actions[day as usize - 1]
    }
}

fn check_day(day: i64) -> CfsResult<u8> {
    if (1..=HORIZON as i64).contains(&day) {
        Ok(day as u8)
    } else {
        Err(CfsError::invalid_day(day))
    }
}

fn non_negative(cents: Cents, what: &str) -> CfsResult<Cents> {
    if cents < 0 {
        return Err(CfsError::invalid_amount(format!(
            "{what} cannot be negative, got {}",
            cents_to_string(cents)
        )));
    }
    Ok(cents)
}

// ============================================================================
// INGEST (dollars -> cents)
// ============================================================================

/// A deposit as it appears on the wire, in decimal dollars.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositInput {
    /// Day of month.
    pub day: i64,
    /// Dollar amount, up to two fractional digits.
    pub amount: Decimal,
}

/// A bill as it appears on the wire, in decimal dollars.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillInput {
    /// Day of month.
    pub day: i64,
    /// Label only.
    pub name: String,
    /// Dollar amount, up to two fractional digits.
    pub amount: Decimal,
}

/// An adjustment as it appears on the wire, in decimal dollars.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustmentInput {
    /// Day of month.
    pub day: i64,
    /// Signed dollar amount, up to two fractional digits.
    pub amount: Decimal,
    /// Free-form annotation.
    #[serde(default)]
    pub note: Option<String>,
}

/// Primary input structure for the CFS engine, in the external JSON shape.
///
/// Amounts are decimal dollars; `actions` is a 30-element array of
/// `null | "O" | "Spark"`. Missing optional fields default to empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanInput {
    /// Opening balance on day 1.
    pub start_balance: Decimal,

    /// Desired day-30 closing balance.
    pub target_end: Decimal,

    /// Half-width of the allowed interval around the target.
    pub band: Decimal,

    /// Minimum required day-30 pre-rent balance.
    pub rent_guard: Decimal,

    /// Scheduled inflows.
    #[serde(default)]
    pub deposits: Vec<DepositInput>,

    /// Scheduled outflows.
    #[serde(default)]
    pub bills: Vec<BillInput>,

    /// Per-day action locks; absent means all days free.
    #[serde(default)]
    pub actions: Option<Vec<Option<String>>>,

    /// One-off corrections.
    #[serde(default)]
    pub manual_adjustments: Vec<AdjustmentInput>,

    /// Opaque caller data.
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl PlanInput {
    /// Convert and validate into a cent-denominated [`Plan`].
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` - unparseable, over-ceiling, over-precise, or
    ///   negative where non-negative is required
    /// - `InvalidDay` - any day outside 1..=30
    /// - `InvalidActionLiteral` - an action entry other than the two literals
    /// - `InvalidPlan` - structural problems (`actions` length != 30)
    pub fn into_plan(self) -> CfsResult<Plan> {
        let start_balance_cents = non_negative(to_cents(self.start_balance)?, "start_balance")?;
        let target_end_cents = non_negative(to_cents(self.target_end)?, "target_end")?;
        let band_cents = non_negative(to_cents(self.band)?, "band")?;
        let rent_guard_cents = non_negative(to_cents(self.rent_guard)?, "rent_guard")?;

        let mut deposits = Vec::with_capacity(self.deposits.len());
        for d in self.deposits {
            deposits.push(Deposit {
                day: check_day(d.day)?,
                amount_cents: non_negative(to_cents(d.amount)?, "deposit amount")?,
            });
        }

        let mut bills = Vec::with_capacity(self.bills.len());
        for b in self.bills {
            bills.push(Bill {
                day: check_day(b.day)?,
                name: b.name,
                amount_cents: non_negative(to_cents(b.amount)?, "bill amount")?,
            });
        }

        let mut manual_adjustments = Vec::with_capacity(self.manual_adjustments.len());
        for a in self.manual_adjustments {
            manual_adjustments.push(Adjustment {
                day: check_day(a.day)?,
                amount_cents: to_cents(a.amount)?,
                note: a.note.unwrap_or_default(),
            });
        }

        let mut actions = [None; HORIZON];
        if let Some(entries) = self.actions {
            if entries.len() != HORIZON {
                return Err(CfsError::invalid_plan(format!(
                    "actions must have exactly {HORIZON} entries, got {}",
                    entries.len()
                )));
            }
            for (slot, entry) in actions.iter_mut().zip(entries) {
                *slot = entry.as_deref().map(Action::from_literal).transpose()?;
            }
        }

        Ok(Plan {
            start_balance_cents,
            target_end_cents,
            band_cents,
            rent_guard_cents,
            deposits,
            bills,
            actions,
            manual_adjustments,
            metadata: self.metadata,
        })
    }
}
