//! Ledger construction.
//!
//! Given a plan and a 30-element action sequence, derive the day-by-day
//! ledger. Intra-day order is fixed:
//!
//! ```text
//! opening_d = closing_{d-1}            (opening_1 = start_balance)
//! closing_d = opening_d + deposits_d + adjustments_d + net(action_d) - bills_d
//! ```
//!
//! Building a ledger performs no feasibility checks; that is the validator's
//! job. Both solvers and the validator share the [`Aggregates`] precomputed
//! here, so balance at the end of any day is a pure function of
//! `(day, net_so_far)`.

use crate::types::{
    check_amount, Action, CfsError, CfsResult, Cents, DayLedger, Plan, HORIZON,
};

/// Per-day cashflow totals and their prefix sums, computed once per solve
/// from a [`Plan`] and never mutated. Index 0 is unused; days are 1..=30.
#[derive(Debug, Clone)]
pub struct Aggregates {
    start_balance: Cents,
    deposits: [Cents; HORIZON + 1],
    bills: [Cents; HORIZON + 1],
    adjustments: [Cents; HORIZON + 1],
    /// `prefix[d]` = sum of `deposits + adjustments - bills` through day `d`.
    prefix: [Cents; HORIZON + 1],
}

impl Aggregates {
    /// Sum the plan's dated entries into per-day arrays and prefix sums.
    ///
    /// # Errors
    ///
    /// `InvalidDay` for an out-of-range day, `InvalidAmount` for an amount
    /// past the ceiling or a sum that overflows.
    pub fn from_plan(plan: &Plan) -> CfsResult<Self> {
        let mut agg = Aggregates {
            start_balance: plan.start_balance_cents,
            deposits: [0; HORIZON + 1],
            bills: [0; HORIZON + 1],
            adjustments: [0; HORIZON + 1],
            prefix: [0; HORIZON + 1],
        };

        for deposit in &plan.deposits {
            let slot = day_slot(deposit.day)?;
            agg.deposits[slot] = add_amount(agg.deposits[slot], deposit.amount_cents)?;
        }
        for bill in &plan.bills {
            let slot = day_slot(bill.day)?;
            agg.bills[slot] = add_amount(agg.bills[slot], bill.amount_cents)?;
        }
        for adjustment in &plan.manual_adjustments {
            let slot = day_slot(adjustment.day)?;
            agg.adjustments[slot] =
                add_amount(agg.adjustments[slot], adjustment.amount_cents)?;
        }

        let mut running: Cents = 0;
        for day in 1..=HORIZON {
            let day_total = agg.deposits[day] + agg.adjustments[day] - agg.bills[day];
            running = running
                .checked_add(day_total)
                .ok_or_else(|| CfsError::invalid_amount("prefix sum overflows".to_string()))?;
            agg.prefix[day] = running;
        }

        Ok(agg)
    }

    /// Deposits credited on a day.
    #[inline]
    pub fn deposits_on(&self, day: u8) -> Cents {
        self.deposits[day as usize]
    }

    /// Bills due on a day.
    #[inline]
    pub fn bills_on(&self, day: u8) -> Cents {
        self.bills[day as usize]
    }

    /// Adjustments applied on a day.
    #[inline]
    pub fn adjustments_on(&self, day: u8) -> Cents {
        self.adjustments[day as usize]
    }

    /// Cumulative `deposits + adjustments - bills` through a day.
    #[inline]
    pub fn prefix_through(&self, day: u8) -> Cents {
        self.prefix[day as usize]
    }

    /// End-of-day balance given the total action net earned through that day.
    #[inline]
    pub fn closing(&self, day: u8, net_so_far: Cents) -> Cents {
        self.start_balance + self.prefix[day as usize] + net_so_far
    }

    /// Day-30 balance immediately before that day's bills, given the total
    /// action net earned through day 30.
    #[inline]
    pub fn pre_rent_day30(&self, net_through_30: Cents) -> Cents {
        self.closing(HORIZON as u8, net_through_30) + self.bills[HORIZON]
    }
}

fn day_slot(day: u8) -> CfsResult<usize> {
    if (1..=HORIZON as u8).contains(&day) {
        Ok(day as usize)
    } else {
        Err(CfsError::invalid_day(day as i64))
    }
}

fn add_amount(total: Cents, amount: Cents) -> CfsResult<Cents> {
    check_amount(amount)?;
    total
        .checked_add(amount)
        .ok_or_else(|| CfsError::invalid_amount("day total overflows".to_string()))
}

/// Build the 30-row ledger for a plan and a complete action sequence.
///
/// Pure: same inputs, same rows. Same-day deposits, bills, and adjustments
/// are summed before the day is built; adjustments land in the deposits
/// column.
pub fn build_ledger(plan: &Plan, actions: &[Action; HORIZON]) -> CfsResult<Vec<DayLedger>> {
    let agg = Aggregates::from_plan(plan)?;
    let mut ledger = Vec::with_capacity(HORIZON);
    let mut opening = plan.start_balance_cents;

    for (i, &action) in actions.iter().enumerate() {
        let day = (i + 1) as u8;
        let deposits = agg.deposits_on(day) + agg.adjustments_on(day);
        let bills = agg.bills_on(day);
        let net = action.net();
        let closing = opening + deposits + net - bills;

        ledger.push(DayLedger {
            day,
            opening_cents: opening,
            deposits_cents: deposits,
            action,
            net_cents: net,
            bills_cents: bills,
            closing_cents: closing,
        });

        opening = closing;
    }

    Ok(ledger)
}
