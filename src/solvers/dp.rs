//! Dynamic-programming solver.
//!
//! The primary engine. Walks the 30-day horizon keeping, per day, a table of
//! states `(work_used, net_so_far, prev_worked)` with the minimum
//! back-to-back count seen for each, plus a backpointer for action recovery.
//! Balance at the end of any day is a pure function of `(day, net_so_far)`
//! through the prefix aggregates, so it is not part of the state key.
//!
//! # Algorithm
//! 1. Seed day 1 from the empty state; day 1 is forced to `Work`.
//! 2. For each later day, expand every surviving state with every allowed
//!    action on that day, rejecting transitions that close negative, break
//!    the day-30 pre-rent guard, or can no longer land inside the target
//!    band.
//! 3. Merge transitions reaching the same state key, keeping the lower
//!    back-to-back count; ties keep the first encountered.
//! 4. At day 30, scan in-band states for the lexicographic minimum of
//!    `(workdays, b2b, abs_diff)`, breaking exact ties by the
//!    lexicographically smallest action sequence (`Off < Work`).
//!
//! The state tables are per-day `Vec`s with a `HashMap` key index; iteration
//! always follows insertion order, so the solve is deterministic. Backpointers
//! are integer indices into the previous day's table, never references.
//!
//! # Complexity
//! - Time: O(days x states x actions); the per-day state count is bounded by
//!   `2 x (day + 1)`, so a full solve is a few thousand transitions.
//! - Space: O(days x states) for the backpointer tables.

use std::collections::HashMap;

use crate::ledger::{build_ledger, Aggregates};
use crate::types::{
    Action, CfsError, CfsResult, Cents, Objective, Plan, Schedule, SolverInfo, HORIZON,
    WORK_NET_CENTS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct StateKey {
    work_used: u8,
    net_cents: Cents,
    prev_worked: bool,
}

#[derive(Debug, Clone, Copy)]
struct Back {
    /// Index into the previous day's table; 0 (the implicit root) for day 1.
    prev: u32,
    action: Action,
}

#[derive(Debug, Clone, Copy)]
struct StateNode {
    key: StateKey,
    b2b: u16,
    back: Back,
}

struct Dp<'p> {
    plan: &'p Plan,
    agg: Aggregates,
    /// Total action net must end in `[net_low, net_high]` to land the final
    /// closing inside the band.
    net_low: Cents,
    net_high: Cents,
}

impl Dp<'_> {
    /// Apply one action to one state and merge the result into `table`.
    fn expand(
        &self,
        day: u8,
        prev_index: u32,
        key: StateKey,
        b2b: u16,
        action: Action,
        table: &mut Vec<StateNode>,
        index: &mut HashMap<StateKey, u32>,
    ) {
        let worked = action == Action::Work;
        let net_new = key.net_cents + action.net();
        let work_new = key.work_used + worked as u8;
        let b2b_new = b2b + (worked && key.prev_worked) as u16;

        let closing = self.agg.closing(day, net_new);
        if closing < 0 {
            return;
        }
        if day as usize == HORIZON
            && self.agg.pre_rent_day30(net_new) < self.plan.rent_guard_cents
        {
            return;
        }

        // Band reachability: remaining days can add at most one work net each
        // and at least nothing.
        let remaining = (HORIZON - day as usize) as Cents;
        if net_new + remaining * WORK_NET_CENTS < self.net_low {
            return;
        }
        if net_new > self.net_high {
            return;
        }

        let new_key = StateKey {
            work_used: work_new,
            net_cents: net_new,
            prev_worked: worked,
        };
        let back = Back {
            prev: prev_index,
            action,
        };
        match index.get(&new_key) {
            Some(&i) => {
                let node = &mut table[i as usize];
                if b2b_new < node.b2b {
                    node.b2b = b2b_new;
                    node.back = back;
                }
            }
            None => {
                index.insert(new_key, table.len() as u32);
                table.push(StateNode {
                    key: new_key,
                    b2b: b2b_new,
                    back,
                });
            }
        }
    }
}

/// The action alphabet for a day, after locks and the day-1 rule.
fn allowed_actions(plan: &Plan, day: u8) -> &'static [Action] {
    match (plan.lock(day), day) {
        (Some(Action::Off), 1) => &[],
        (Some(Action::Work), _) | (None, 1) => &[Action::Work],
        (Some(Action::Off), _) => &[Action::Off],
        (None, _) => &[Action::Off, Action::Work],
    }
}

/// Walk the backpointer chain from a terminal state back to day 1.
fn reconstruct(layers: &[Vec<StateNode>], terminal: usize) -> [Action; HORIZON] {
    let mut actions = [Action::Off; HORIZON];
    let mut idx = terminal;
    for day in (1..=HORIZON).rev() {
        let node = &layers[day - 1][idx];
        actions[day - 1] = node.back.action;
        idx = node.back.prev as usize;
    }
    actions
}

/// Solve a plan with the DP engine.
///
/// Returns the feasible schedule minimizing `(workdays, b2b, abs_diff)`
/// lexicographically, or `Infeasible` when no action sequence satisfies the
/// hard checks. Holds no state across calls.
pub fn solve_dp(plan: &Plan) -> CfsResult<Schedule> {
    let agg = Aggregates::from_plan(plan)?;
    let base_30 = agg.closing(HORIZON as u8, 0);
    let dp = Dp {
        plan,
        net_low: plan.target_end_cents - plan.band_cents - base_30,
        net_high: plan.target_end_cents + plan.band_cents - base_30,
        agg,
    };

    let mut layers: Vec<Vec<StateNode>> = Vec::with_capacity(HORIZON);
    for day in 1..=HORIZON as u8 {
        let mut table = Vec::new();
        let mut index = HashMap::new();
        match layers.last() {
            None => {
                let root = StateKey {
                    work_used: 0,
                    net_cents: 0,
                    prev_worked: false,
                };
                for &action in allowed_actions(plan, day) {
                    dp.expand(day, 0, root, 0, action, &mut table, &mut index);
                }
            }
            Some(prev) => {
                for (pi, node) in prev.iter().enumerate() {
                    for &action in allowed_actions(plan, day) {
                        dp.expand(day, pi as u32, node.key, node.b2b, action, &mut table, &mut index);
                    }
                }
            }
        }
        if table.is_empty() {
            return Err(CfsError::infeasible(format!(
                "no feasible action assignment survives day {day}"
            )));
        }
        log::debug!("dp day {day}: {} states", table.len());
        layers.push(table);
    }

    // Terminal selection over in-band day-30 states.
    let last = &layers[HORIZON - 1];
    let mut best: Option<(Objective, Vec<usize>)> = None;
    for (i, node) in last.iter().enumerate() {
        let closing = dp.agg.closing(HORIZON as u8, node.key.net_cents);
        let diff = (closing - plan.target_end_cents).abs();
        if diff > plan.band_cents {
            continue;
        }
        let objective = Objective {
            workdays: node.key.work_used as u32,
            b2b: node.b2b as u32,
            abs_diff_cents: diff,
        };
        match &mut best {
            Some((incumbent, tied)) => {
                if objective < *incumbent {
                    *incumbent = objective;
                    tied.clear();
                    tied.push(i);
                } else if objective == *incumbent {
                    tied.push(i);
                }
            }
            None => best = Some((objective, vec![i])),
        }
    }

    let (objective, tied) = best
        .ok_or_else(|| CfsError::infeasible("no day-30 state lands inside the target band"))?;

    // Exact objective ties resolve to the lexicographically smallest
    // recovered sequence.
    let mut actions = reconstruct(&layers, tied[0]);
    for &i in &tied[1..] {
        let candidate = reconstruct(&layers, i);
        if candidate < actions {
            actions = candidate;
        }
    }

    let ledger = build_ledger(plan, &actions)?;
    let final_closing_cents = ledger[HORIZON - 1].closing_cents;

    log::info!(
        "dp solve complete: objective ({}, {}, {}), final closing {}",
        objective.workdays,
        objective.b2b,
        objective.abs_diff_cents,
        final_closing_cents
    );

    Ok(Schedule {
        actions,
        objective,
        final_closing_cents,
        ledger,
        solver: SolverInfo::dp(),
    })
}
