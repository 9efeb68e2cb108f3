//! Constraint-programming verifier.
//!
//! An independent encoding of the scheduling problem, used to confirm the DP
//! engine's optimum and to enumerate ties.
//!
//! # Model
//!
//! For each day `d` and action `a` there is a Boolean `x[d, a]` with an
//! exactly-one constraint per day; [`DayDomain`] holds the two Booleans'
//! domains after locks and the day-1 rule are applied. `work_used` is the sum
//! of the `x[d, Work]`; the back-to-back count sums the auxiliary
//! `y[d] = x[d, Work] AND x[d+1, Work]`; `closing_d` is the linear expression
//! `start + prefix[d] + WORK_NET_CENTS * sum x[i, Work], i <= d`. Hard
//! constraints: every `closing_d >= 0`, `closing_30` inside the target band,
//! and the day-30 pre-rent balance at or above the rent guard.
//!
//! # Sequential lexicographic minimization
//!
//! Three stages, each binding its minimum as an equality for the next:
//! minimize `work_used`, then `b2b`, then `abs_diff`. Every stage records a
//! [`CpStatus`]; a non-`Optimal` stage stops the run and later stages are not
//! attempted.
//!
//! The search itself is a chronological branch-and-bound: days are assigned
//! in order, `Off` branch first, with interval propagation on the remaining
//! work count and admissible lower bounds per stage objective. Branching
//! order makes the search deterministic and makes enumeration yield
//! sequences in lexicographic order (`Off < Work`). The search is
//! single-threaded; `num_search_workers` is accepted for API compatibility
//! and does not affect results.

use std::time::{Duration, Instant};

use crate::ledger::{build_ledger, Aggregates};
use crate::solvers::SolverConfig;
use crate::types::{
    Action, CfsError, CfsResult, Cents, CpStatus, Objective, Plan, Schedule, SolverInfo,
    HORIZON, WORK_NET_CENTS,
};

/// Domains of the one-hot pair `x[d, Off]`, `x[d, Work]` after locks.
#[derive(Debug, Clone, Copy)]
struct DayDomain {
    off: bool,
    work: bool,
}

/// The built constraint model. Immutable once built; the search borrows it.
struct CpModel<'p> {
    plan: &'p Plan,
    agg: Aggregates,
    domains: [DayDomain; HORIZON],
    /// Minimum total action net: the tighter of the band's lower edge and
    /// the rent guard, both expressed on the total net.
    net_min: Cents,
    /// Maximum total action net: the band's upper edge.
    net_max: Cents,
    /// Work-allowed day count in `d..=30`.
    suffix_work_allowed: [u32; HORIZON + 2],
    /// Locked-Work day count in `d..=30`.
    suffix_locked_work: [u32; HORIZON + 2],
}

impl<'p> CpModel<'p> {
    fn build(plan: &'p Plan) -> CfsResult<Self> {
        let agg = Aggregates::from_plan(plan)?;
        let base_30 = agg.closing(HORIZON as u8, 0);
        let band_low = plan.target_end_cents - plan.band_cents - base_30;
        let rent_low = plan.rent_guard_cents - agg.pre_rent_day30(0);
        let net_min = band_low.max(rent_low);
        let net_max = plan.target_end_cents + plan.band_cents - base_30;

        let mut domains = [DayDomain {
            off: true,
            work: true,
        }; HORIZON];
        for day in 1..=HORIZON as u8 {
            let domain = &mut domains[day as usize - 1];
            match plan.lock(day) {
                Some(Action::Off) => domain.work = false,
                Some(Action::Work) => domain.off = false,
                None => {}
            }
            if day == 1 {
                domain.off = false;
            }
        }

        let mut suffix_work_allowed = [0; HORIZON + 2];
        let mut suffix_locked_work = [0; HORIZON + 2];
        for day in (1..=HORIZON).rev() {
            let domain = domains[day - 1];
            suffix_work_allowed[day] = suffix_work_allowed[day + 1] + domain.work as u32;
            suffix_locked_work[day] =
                suffix_locked_work[day + 1] + (domain.work && !domain.off) as u32;
        }

        Ok(CpModel {
            plan,
            agg,
            domains,
            net_min,
            net_max,
            suffix_work_allowed,
            suffix_locked_work,
        })
    }

    /// Bounds on the number of additional work days from `day` onward, given
    /// the net earned so far and an optional bound `work_used == fw`.
    /// `None` when the node admits no completion.
    fn additional_work_bounds(
        &self,
        day: usize,
        work: u32,
        net: Cents,
        fixed_work: Option<u32>,
    ) -> Option<(u32, u32)> {
        let needed = {
            let shortfall = self.net_min - net;
            if shortfall > 0 {
                ((shortfall + WORK_NET_CENTS - 1) / WORK_NET_CENTS) as u32
            } else {
                0
            }
        };
        let mut add_min = needed.max(self.suffix_locked_work[day]);
        let mut add_max = self.suffix_work_allowed[day];
        if let Some(fw) = fixed_work {
            if work > fw {
                return None;
            }
            add_min = add_min.max(fw - work);
            add_max = add_max.min(fw - work);
        }
        if add_min > add_max {
            return None;
        }
        if net + add_min as Cents * WORK_NET_CENTS > self.net_max {
            return None;
        }
        Some((add_min, add_max))
    }

    /// Minimum additional back-to-back pairs forced by placing `r` more work
    /// days into the remaining `s` slots, `prev` telling whether the last
    /// assigned day worked. Ignores locks, so it never overestimates.
    fn min_extra_b2b(r: u32, s: u32, prev: bool) -> u32 {
        (2 * r as i64 - s as i64 - (!prev) as i64).max(0) as u32
    }

    /// Closing-difference interval reachable from a node, as
    /// `(lower_bound, upper_bound)` on `|closing_30 - target|`.
    fn abs_diff_bounds(&self, net: Cents, add_min: u32, add_max: u32) -> (Cents, Cents) {
        let base_30 = self.agg.closing(HORIZON as u8, 0);
        let low = base_30 + net + add_min as Cents * WORK_NET_CENTS;
        let high = base_30 + net + add_max as Cents * WORK_NET_CENTS;
        let target = self.plan.target_end_cents;
        let lb = if (low..=high).contains(&target) {
            0
        } else {
            (low - target).abs().min((high - target).abs())
        };
        (lb, (low - target).abs().max((high - target).abs()))
    }
}

/// Which objective component a stage minimizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Workdays,
    BackToBack,
    AbsDiff,
}

struct Search<'m, 'p> {
    model: &'m CpModel<'p>,
    deadline: Option<Instant>,
    stage: Stage,
    fixed_work: Option<u32>,
    fixed_b2b: Option<u32>,
    incumbent: Option<(i64, [Action; HORIZON])>,
    assignment: [Action; HORIZON],
    nodes: u64,
    timed_out: bool,
}

impl<'m, 'p> Search<'m, 'p> {
    fn new(
        model: &'m CpModel<'p>,
        deadline: Option<Instant>,
        stage: Stage,
        fixed_work: Option<u32>,
        fixed_b2b: Option<u32>,
    ) -> Self {
        Search {
            model,
            deadline,
            stage,
            fixed_work,
            fixed_b2b,
            incumbent: None,
            assignment: [Action::Off; HORIZON],
            nodes: 0,
            timed_out: false,
        }
    }

    fn out_of_time(&mut self) -> bool {
        if self.timed_out {
            return true;
        }
        self.nodes += 1;
        if self.nodes & 0x3ff == 0 {
            if let Some(deadline) = self.deadline {
                if Instant::now() >= deadline {
                    self.timed_out = true;
                }
            }
        }
        self.timed_out
    }

    fn minimize(&mut self) -> CpStatus {
        self.dfs(1, 0, 0, 0, false);
        match (self.timed_out, self.incumbent.is_some()) {
            (false, true) => CpStatus::Optimal,
            (false, false) => CpStatus::Infeasible,
            (true, true) => CpStatus::Feasible,
            (true, false) => CpStatus::Unknown,
        }
    }

    fn dfs(&mut self, day: usize, work: u32, b2b: u32, net: Cents, prev_worked: bool) {
        if self.out_of_time() {
            return;
        }

        if day > HORIZON {
            self.accept_leaf(work, b2b, net);
            return;
        }

        let Some((add_min, add_max)) =
            self.model
                .additional_work_bounds(day, work, net, self.fixed_work)
        else {
            return;
        };

        let s = (HORIZON - day + 1) as u32;
        if let Some(fb) = self.fixed_b2b {
            if b2b > fb {
                return;
            }
            let max_add = if add_max == 0 {
                0
            } else {
                add_max - (!prev_worked) as u32
            };
            if b2b + max_add < fb {
                return;
            }
        }

        // Admissible lower bound on the stage objective.
        let bound = match self.stage {
            Stage::Workdays => (work + add_min) as i64,
            Stage::BackToBack => (b2b + CpModel::min_extra_b2b(add_min, s, prev_worked)) as i64,
            Stage::AbsDiff => self.model.abs_diff_bounds(net, add_min, add_max).0,
        };
        if let Some((best, _)) = self.incumbent {
            if bound >= best {
                return;
            }
        }

        // Value ordering: `Off` first, which keeps descents lexicographic.
        // The b2b stage branches `Work` first while the remaining quota is
        // dense; that stage only reports a value, never the final
        // assignment.
        let dense = self.stage == Stage::BackToBack && 2 * add_min > s;
        let order = if dense {
            [Action::Work, Action::Off]
        } else {
            [Action::Off, Action::Work]
        };
        for action in order {
            self.branch(day, work, b2b, net, prev_worked, action);
        }
    }

    fn branch(
        &mut self,
        day: usize,
        work: u32,
        b2b: u32,
        net: Cents,
        prev_worked: bool,
        action: Action,
    ) {
        let domain = self.model.domains[day - 1];
        match action {
            Action::Off => {
                if domain.off && self.model.agg.closing(day as u8, net) >= 0 {
                    self.assignment[day - 1] = Action::Off;
                    self.dfs(day + 1, work, b2b, net, false);
                }
            }
            Action::Work => {
                if domain.work {
                    let net_new = net + WORK_NET_CENTS;
                    if net_new <= self.model.net_max
                        && self.model.agg.closing(day as u8, net_new) >= 0
                    {
                        self.assignment[day - 1] = Action::Work;
                        self.dfs(day + 1, work + 1, b2b + prev_worked as u32, net_new, true);
                    }
                }
            }
        }
    }

    fn accept_leaf(&mut self, work: u32, b2b: u32, net: Cents) {
        if net < self.model.net_min || net > self.model.net_max {
            return;
        }
        if self.fixed_work.is_some_and(|fw| fw != work) {
            return;
        }
        if self.fixed_b2b.is_some_and(|fb| fb != b2b) {
            return;
        }
        let value = match self.stage {
            Stage::Workdays => work as i64,
            Stage::BackToBack => b2b as i64,
            Stage::AbsDiff => {
                (self.model.agg.closing(HORIZON as u8, net) - self.model.plan.target_end_cents)
                    .abs()
            }
        };
        let better = match self.incumbent {
            None => true,
            Some((best, _)) => value < best,
        };
        if better {
            self.incumbent = Some((value, self.assignment));
        }
    }
}

/// Result of a sequential lexicographic run.
pub(crate) struct LexOutcome {
    pub statuses: Vec<CpStatus>,
    pub bounds: Vec<i64>,
    pub objective: Option<Objective>,
    pub assignment: Option<[Action; HORIZON]>,
    pub seconds: f64,
}

/// Run the three minimization stages, binding each proven minimum into the
/// next stage.
pub(crate) fn run_lex_stages(plan: &Plan, config: &SolverConfig) -> CfsResult<LexOutcome> {
    let started = Instant::now();
    let model = CpModel::build(plan)?;
    let deadline = (config.max_time_seconds > 0)
        .then(|| started + Duration::from_secs(config.max_time_seconds));

    log::debug!(
        "cpsat: starting sequential lex run ({} workers requested, single-threaded search)",
        config.num_search_workers
    );

    let mut statuses = Vec::with_capacity(3);
    let mut bounds = Vec::with_capacity(3);
    let incomplete = |statuses: Vec<CpStatus>, bounds: Vec<i64>| LexOutcome {
        statuses,
        bounds,
        objective: None,
        assignment: None,
        seconds: started.elapsed().as_secs_f64(),
    };

    // Stage 1: minimize work_used.
    let mut search = Search::new(&model, deadline, Stage::Workdays, None, None);
    let status = search.minimize();
    statuses.push(status);
    if let Some((value, _)) = search.incumbent {
        bounds.push(value);
    }
    if status != CpStatus::Optimal {
        return Ok(incomplete(statuses, bounds));
    }
    let min_work = match search.incumbent {
        Some((value, _)) => value as u32,
        None => return Ok(incomplete(statuses, bounds)),
    };

    // Stage 2: minimize b2b with work_used bound.
    let mut search = Search::new(&model, deadline, Stage::BackToBack, Some(min_work), None);
    let status = search.minimize();
    statuses.push(status);
    if let Some((value, _)) = search.incumbent {
        bounds.push(value);
    }
    if status != CpStatus::Optimal {
        return Ok(incomplete(statuses, bounds));
    }
    let min_b2b = match search.incumbent {
        Some((value, _)) => value as u32,
        None => return Ok(incomplete(statuses, bounds)),
    };

    // Stage 3: minimize abs_diff with both prior bindings.
    let mut search = Search::new(
        &model,
        deadline,
        Stage::AbsDiff,
        Some(min_work),
        Some(min_b2b),
    );
    let status = search.minimize();
    statuses.push(status);
    if let Some((value, _)) = search.incumbent {
        bounds.push(value);
    }
    let (min_abs, assignment) = match (status, search.incumbent) {
        (CpStatus::Optimal, Some((value, assignment))) => (value, assignment),
        _ => return Ok(incomplete(statuses, bounds)),
    };

    Ok(LexOutcome {
        statuses,
        bounds,
        objective: Some(Objective {
            workdays: min_work,
            b2b: min_b2b,
            abs_diff_cents: min_abs,
        }),
        assignment: Some(assignment),
        seconds: started.elapsed().as_secs_f64(),
    })
}

fn incomplete_error(outcome: &LexOutcome) -> CfsError {
    if outcome.statuses.contains(&CpStatus::Infeasible) {
        CfsError::infeasible("constraint model admits no schedule")
    } else {
        let statuses: Vec<String> = outcome.statuses.iter().map(CpStatus::to_string).collect();
        CfsError::timeout(format!(
            "sequential lex run stopped before proving optimality (statuses: {})",
            statuses.join(", ")
        ))
    }
}

/// Solve a plan with the constraint-programming engine.
///
/// # Errors
///
/// `Infeasible` when any stage proves the model empty; `Timeout` when the
/// wall-clock deadline expires before all three stages prove optimality.
pub fn solve_cpsat(plan: &Plan, config: &SolverConfig) -> CfsResult<Schedule> {
    let outcome = run_lex_stages(plan, config)?;
    let (Some(objective), Some(actions)) = (outcome.objective, outcome.assignment) else {
        return Err(incomplete_error(&outcome));
    };

    let ledger = build_ledger(plan, &actions)?;
    let final_closing_cents = ledger[HORIZON - 1].closing_cents;
    let statuses = outcome.statuses.iter().map(CpStatus::to_string).collect();

    log::info!(
        "cpsat solve complete: objective ({}, {}, {}) in {:.3}s",
        objective.workdays,
        objective.b2b,
        objective.abs_diff_cents,
        outcome.seconds
    );

    Ok(Schedule {
        actions,
        objective,
        final_closing_cents,
        ledger,
        solver: SolverInfo::cpsat(statuses, outcome.seconds),
    })
}

/// Enumerate distinct optimal action sequences, up to `limit`.
///
/// Runs the sequential lex stages, binds all three minima as equalities, and
/// collects satisfying sequences in lexicographic order (`Off < Work`); the
/// first entry is therefore the canonical tie-break choice. If the deadline
/// expires mid-enumeration the sequences found so far are returned.
pub fn enumerate_optimal(
    plan: &Plan,
    config: &SolverConfig,
    limit: usize,
) -> CfsResult<Vec<[Action; HORIZON]>> {
    let outcome = run_lex_stages(plan, config)?;
    let Some(objective) = outcome.objective else {
        return Err(incomplete_error(&outcome));
    };

    let model = CpModel::build(plan)?;
    let deadline = (config.max_time_seconds > 0)
        .then(|| Instant::now() + Duration::from_secs(config.max_time_seconds));
    let mut enumeration = Enumeration {
        model: &model,
        deadline,
        objective,
        limit,
        found: Vec::new(),
        assignment: [Action::Off; HORIZON],
        nodes: 0,
        timed_out: false,
    };
    enumeration.dfs(1, 0, 0, 0, false);
    Ok(enumeration.found)
}

struct Enumeration<'m, 'p> {
    model: &'m CpModel<'p>,
    deadline: Option<Instant>,
    objective: Objective,
    limit: usize,
    found: Vec<[Action; HORIZON]>,
    assignment: [Action; HORIZON],
    nodes: u64,
    timed_out: bool,
}

impl<'m, 'p> Enumeration<'m, 'p> {
    fn done(&mut self) -> bool {
        if self.timed_out || self.found.len() >= self.limit {
            return true;
        }
        self.nodes += 1;
        if self.nodes & 0x3ff == 0 {
            if let Some(deadline) = self.deadline {
                if Instant::now() >= deadline {
                    self.timed_out = true;
                }
            }
        }
        self.timed_out
    }

    fn dfs(&mut self, day: usize, work: u32, b2b: u32, net: Cents, prev_worked: bool) {
        if self.done() {
            return;
        }

        if day > HORIZON {
            let closing = self.model.agg.closing(HORIZON as u8, net);
            let diff = (closing - self.model.plan.target_end_cents).abs();
            if net >= self.model.net_min
                && net <= self.model.net_max
                && work == self.objective.workdays
                && b2b == self.objective.b2b
                && diff == self.objective.abs_diff_cents
            {
                self.found.push(self.assignment);
            }
            return;
        }

        let Some((add_min, add_max)) = self.model.additional_work_bounds(
            day,
            work,
            net,
            Some(self.objective.workdays),
        ) else {
            return;
        };

        if b2b > self.objective.b2b {
            return;
        }
        let max_add_b2b = if add_max == 0 {
            0
        } else {
            add_max - (!prev_worked) as u32
        };
        if b2b + max_add_b2b < self.objective.b2b {
            return;
        }

        let (diff_lb, diff_ub) = self.model.abs_diff_bounds(net, add_min, add_max);
        if self.objective.abs_diff_cents < diff_lb || self.objective.abs_diff_cents > diff_ub {
            return;
        }

        let domain = self.model.domains[day - 1];
        if domain.off && self.model.agg.closing(day as u8, net) >= 0 {
            self.assignment[day - 1] = Action::Off;
            self.dfs(day + 1, work, b2b, net, false);
        }
        if domain.work {
            let net_new = net + WORK_NET_CENTS;
            if net_new <= self.model.net_max
                && self.model.agg.closing(day as u8, net_new) >= 0
            {
                self.assignment[day - 1] = Action::Work;
                self.dfs(day + 1, work + 1, b2b + prev_worked as u32, net_new, true);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solvers::dp::solve_dp;
    use crate::types::{Bill, Deposit};
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
    fn test_all_stages_optimal() {
        let outcome = run_lex_stages(&make_plan(), &SolverConfig::default()).unwrap();
        assert_eq!(
            outcome.statuses,
            vec![CpStatus::Optimal, CpStatus::Optimal, CpStatus::Optimal]
        );
        assert_eq!(outcome.bounds, vec![5, 0, 2_500]);
        assert_eq!(
            outcome.objective,
            Some(Objective {
                workdays: 5,
                b2b: 0,
                abs_diff_cents: 2_500
            })
        );
    }

    #[test]
    fn test_agrees_with_dp_objective() {
        let plan = make_plan();
        let dp = solve_dp(&plan).unwrap();
        let cp = solve_cpsat(&plan, &SolverConfig::default()).unwrap();
        assert_eq!(dp.objective, cp.objective);
        assert_eq!(dp.final_closing_cents, cp.final_closing_cents);
    }

    #[test]
    fn test_infeasible_model() {
        let mut plan = make_plan();
        plan.actions = [Some(Action::Off); HORIZON];
        let result = solve_cpsat(&plan, &SolverConfig::default());
        assert!(matches!(result, Err(CfsError::Infeasible { .. })));
    }

    #[test]
    fn test_honors_locks() {
        let mut plan = make_plan();
        plan.actions[9] = Some(Action::Work);
        let schedule = solve_cpsat(&plan, &SolverConfig::default()).unwrap();
        assert_eq!(schedule.actions[9], Action::Work);
    }

    #[test]
    fn test_enumerates_ties_in_lex_order() {
        let plan = make_plan();
        let ties = enumerate_optimal(&plan, &SolverConfig::default(), 10).unwrap();
        assert!(!ties.is_empty());
        assert!(ties.len() <= 10);
        for pair in ties.windows(2) {
            assert!(pair[0] < pair[1], "enumeration out of lexicographic order");
        }
        // The first tie is the canonical choice: work days pushed latest.
        let dp = solve_dp(&plan).unwrap();
        assert_eq!(ties[0], dp.actions);
    }

    #[test]
    fn test_enumeration_respects_limit() {
        let ties = enumerate_optimal(&make_plan(), &SolverConfig::default(), 3).unwrap();
        assert_eq!(ties.len(), 3);
    }

    #[test]
    fn test_deterministic_across_runs() {
        let plan = make_plan();
        let first = solve_cpsat(&plan, &SolverConfig::default()).unwrap();
        let second = solve_cpsat(&plan, &SolverConfig::default()).unwrap();
        assert_eq!(first.actions, second.actions);
        assert_eq!(first.objective, second.objective);
    }
}
