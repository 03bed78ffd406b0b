//! Exact branch-and-bound backend.
//!
//! Depth-first search over the binary variables with unit-style
//! propagation on the linear rows and objective-bound pruning. The
//! search is exact: a run that exhausts the tree proves optimality (or
//! infeasibility); a run stopped by the deadline or the stop flag
//! returns the best incumbent with the tightest bound seen.
//!
//! Parallelism is a portfolio: each worker explores the full tree in a
//! different seeded branching order, sharing the incumbent objective for
//! pruning. One worker is fully deterministic for a fixed seed.
//!
//! # Reference
//! Wolsey (1998), "Integer Programming", Ch. 7: Branch and Bound

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::{
    Comparator, CpModel, CpSolution, CpSolver, SolveStatus, SolverConfig, StopReason, VarId,
};

const NO_BEST: i64 = i64::MIN;
const DEADLINE_CHECK_INTERVAL: u64 = 256;

/// Exact branch-and-bound solver for binary linear models.
#[derive(Debug, Clone, Default)]
pub struct BranchBoundSolver {
    stop_flag: Arc<AtomicBool>,
}

impl BranchBoundSolver {
    /// Creates a solver with a fresh stop flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses an externally owned stop flag.
    pub fn with_stop_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.stop_flag = flag;
        self
    }

    /// Handle for cooperative cancellation: store `true` to stop the
    /// search at the next node boundary.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop_flag)
    }
}

impl CpSolver for BranchBoundSolver {
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution {
        let prepared = Prepared::build(model);
        let shared = SharedState {
            best: AtomicI64::new(NO_BEST),
            finished: AtomicBool::new(false),
            external_stop: Arc::clone(&self.stop_flag),
        };
        let deadline = Instant::now().checked_add(config.time_budget);
        let workers = config.worker_count.max(1);

        let results: Vec<WorkerResult> = if workers == 1 {
            vec![run_worker(model, &prepared, &shared, config.random_seed, 0, deadline)]
        } else {
            std::thread::scope(|scope| {
                let handles: Vec<_> = (0..workers)
                    .map(|worker| {
                        let prepared = &prepared;
                        let shared = &shared;
                        let seed = config.random_seed;
                        scope.spawn(move || {
                            run_worker(model, prepared, shared, seed, worker, deadline)
                        })
                    })
                    .collect();
                handles
                    .into_iter()
                    .map(|handle| handle.join().unwrap_or_else(|_| WorkerResult::failed()))
                    .collect()
            })
        };

        let completed = results.iter().any(|r| r.completed);
        // Best incumbent across workers; ties go to the lowest worker index.
        let incumbent = results
            .iter()
            .enumerate()
            .filter_map(|(worker, r)| r.best.as_ref().map(|(obj, values)| (*obj, worker, values)))
            .max_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));
        let open_bound = results
            .iter()
            .map(|r| r.open_bound)
            .fold(NO_BEST, i64::max);
        let stop_reason = if completed {
            None
        } else if self.stop_flag.load(Ordering::Relaxed) {
            Some(StopReason::Cancelled)
        } else {
            Some(StopReason::DeadlineExpired)
        };

        debug!(
            "solve '{}': {} vars, {} constraints, completed={completed}",
            model.name(),
            model.var_count(),
            model.constraint_count(),
        );

        match (completed, incumbent) {
            (true, Some((objective, _, values))) => CpSolution::new(
                SolveStatus::Optimal,
                values.clone(),
                objective,
                objective,
                None,
            ),
            (true, None) => CpSolution::new(SolveStatus::Infeasible, Vec::new(), 0, 0, None),
            (false, Some((objective, _, values))) => CpSolution::new(
                SolveStatus::Feasible,
                values.clone(),
                objective,
                open_bound.max(objective),
                stop_reason,
            ),
            (false, None) => CpSolution::new(
                SolveStatus::Unknown,
                Vec::new(),
                0,
                open_bound.max(0),
                stop_reason,
            ),
        }
    }
}

/// Immutable search data derived from the model once, shared by workers.
struct Prepared {
    /// var → (constraint index, coefficient) adjacency.
    var_cons: Vec<Vec<(usize, i64)>>,
    /// Exactly-one-style groups used by the objective bound.
    groups: Vec<ChoiceGroup>,
    /// Whether a var belongs exclusively to one choice group.
    exclusive: Vec<bool>,
}

/// An equality row with all-unit coefficients: at most `rhs` of its
/// variables can be 1, and propagation enforces exactly `rhs`.
struct ChoiceGroup {
    constraint: usize,
    rhs: i64,
    /// Variables appearing in this group and no other.
    vars: Vec<VarId>,
}

impl Prepared {
    fn build(model: &CpModel) -> Self {
        let n = model.var_count();
        let mut var_cons: Vec<Vec<(usize, i64)>> = vec![Vec::new(); n];
        for (c, constraint) in model.constraints().iter().enumerate() {
            for &(var, coefficient) in &constraint.terms {
                if coefficient != 0 {
                    var_cons[var].push((c, coefficient));
                }
            }
        }

        // A var is exclusive when it appears in exactly one unit-eq group.
        let mut membership: Vec<Option<usize>> = vec![None; n];
        let mut shared: Vec<bool> = vec![false; n];
        let mut group_rows: Vec<(usize, i64)> = Vec::new();
        for (c, constraint) in model.constraints().iter().enumerate() {
            let is_unit_eq = constraint.comparator == Comparator::Eq
                && constraint.rhs >= 1
                && constraint.terms.iter().all(|&(_, a)| a == 1);
            if !is_unit_eq {
                continue;
            }
            let group = group_rows.len();
            group_rows.push((c, constraint.rhs));
            for &(var, _) in &constraint.terms {
                match membership[var] {
                    None => membership[var] = Some(group),
                    Some(_) => shared[var] = true,
                }
            }
        }

        let mut groups: Vec<ChoiceGroup> = group_rows
            .iter()
            .map(|&(constraint, rhs)| ChoiceGroup {
                constraint,
                rhs,
                vars: Vec::new(),
            })
            .collect();
        let mut exclusive = vec![false; n];
        for var in 0..n {
            if let Some(group) = membership[var] {
                if !shared[var] {
                    exclusive[var] = true;
                    groups[group].vars.push(var);
                }
            }
        }

        Self {
            var_cons,
            groups,
            exclusive,
        }
    }
}

struct SharedState {
    best: AtomicI64,
    finished: AtomicBool,
    external_stop: Arc<AtomicBool>,
}

impl SharedState {
    fn best(&self) -> i64 {
        self.best.load(Ordering::Relaxed)
    }

    fn offer(&self, objective: i64) {
        let mut current = self.best.load(Ordering::Relaxed);
        while objective > current {
            match self.best.compare_exchange(
                current,
                objective,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return,
                Err(observed) => current = observed,
            }
        }
    }

    fn stop_requested(&self) -> bool {
        self.finished.load(Ordering::Relaxed) || self.external_stop.load(Ordering::Relaxed)
    }
}

struct WorkerResult {
    completed: bool,
    best: Option<(i64, Vec<bool>)>,
    open_bound: i64,
}

impl WorkerResult {
    fn failed() -> Self {
        Self {
            completed: false,
            best: None,
            open_bound: NO_BEST,
        }
    }
}

fn run_worker(
    model: &CpModel,
    prepared: &Prepared,
    shared: &SharedState,
    seed: u64,
    worker: usize,
    deadline: Option<Instant>,
) -> WorkerResult {
    let mut order: Vec<VarId> = (0..model.var_count()).collect();
    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(worker as u64));
    order.shuffle(&mut rng);

    let mut search = Search::new(model, prepared, shared, deadline, order);
    let mut queue: Vec<usize> = (0..model.constraint_count()).collect();
    if !search.propagate(&mut queue) {
        // Root conflict: the model is infeasible regardless of branching.
        return WorkerResult {
            completed: true,
            best: None,
            open_bound: NO_BEST,
        };
    }
    search.dfs();

    let completed = !search.stopped;
    if completed {
        shared.finished.store(true, Ordering::Relaxed);
    }
    WorkerResult {
        completed,
        best: search.best.take(),
        open_bound: search.open_bound,
    }
}

/// One worker's depth-first search state.
struct Search<'a> {
    model: &'a CpModel,
    prepared: &'a Prepared,
    shared: &'a SharedState,
    deadline: Option<Instant>,
    order: Vec<VarId>,

    /// -1 unfixed, 0/1 fixed.
    value: Vec<i8>,
    /// Per constraint: Σ coefficient · value over fixed vars.
    fixed_sum: Vec<i64>,
    /// Per constraint: Σ positive coefficients over unfixed vars.
    pos_unfixed: Vec<i64>,
    /// Per constraint: Σ negative coefficients over unfixed vars.
    neg_unfixed: Vec<i64>,
    trail: Vec<VarId>,
    current_objective: i64,

    nodes: u64,
    stopped: bool,
    /// Max upper bound over subtrees abandoned by an early stop.
    open_bound: i64,
    best: Option<(i64, Vec<bool>)>,
}

impl<'a> Search<'a> {
    fn new(
        model: &'a CpModel,
        prepared: &'a Prepared,
        shared: &'a SharedState,
        deadline: Option<Instant>,
        order: Vec<VarId>,
    ) -> Self {
        let constraints = model.constraints();
        let pos_unfixed = constraints
            .iter()
            .map(|c| c.terms.iter().map(|&(_, a)| a.max(0)).sum())
            .collect();
        let neg_unfixed = constraints
            .iter()
            .map(|c| c.terms.iter().map(|&(_, a)| a.min(0)).sum())
            .collect();
        Self {
            model,
            prepared,
            shared,
            deadline,
            order,
            value: vec![-1; model.var_count()],
            fixed_sum: vec![0; constraints.len()],
            pos_unfixed,
            neg_unfixed,
            trail: Vec::new(),
            current_objective: 0,
            nodes: 0,
            stopped: false,
            open_bound: NO_BEST,
            best: None,
        }
    }

    fn dfs(&mut self) {
        self.nodes += 1;
        if self.check_stop() {
            self.stopped = true;
            let bound = self.upper_bound();
            self.open_bound = self.open_bound.max(bound);
            return;
        }

        let bound = self.upper_bound();
        let best = self.shared.best();
        if best != NO_BEST && bound <= best {
            return;
        }

        let Some(var) = self.pick_branch_var() else {
            self.record_incumbent();
            return;
        };

        let prefer_one = self.model.objective_coefficient(var) >= 0;
        let order: [bool; 2] = if prefer_one {
            [true, false]
        } else {
            [false, true]
        };
        for val in order {
            let mark = self.trail.len();
            let objective_mark = self.current_objective;
            let mut queue = Vec::new();
            if self.assign(var, val, &mut queue) && self.propagate(&mut queue) {
                self.dfs();
            }
            self.undo_to(mark, objective_mark);
            if self.stopped {
                self.open_bound = self.open_bound.max(bound);
                return;
            }
        }
    }

    fn check_stop(&mut self) -> bool {
        if self.stopped {
            return true;
        }
        if self.shared.stop_requested() {
            return true;
        }
        if self.nodes % DEADLINE_CHECK_INTERVAL == 0 {
            if let Some(deadline) = self.deadline {
                if Instant::now() >= deadline {
                    return true;
                }
            }
        }
        false
    }

    fn pick_branch_var(&self) -> Option<VarId> {
        self.order.iter().copied().find(|&v| self.value[v] == -1)
    }

    fn record_incumbent(&mut self) {
        let objective = self.current_objective;
        let improved = match &self.best {
            Some((best, _)) => objective > *best,
            None => true,
        };
        if improved {
            let values = self.value.iter().map(|&v| v == 1).collect();
            self.best = Some((objective, values));
        }
        self.shared.offer(objective);
    }

    fn bounds(&self, constraint: usize) -> (i64, i64) {
        (
            self.fixed_sum[constraint] + self.neg_unfixed[constraint],
            self.fixed_sum[constraint] + self.pos_unfixed[constraint],
        )
    }

    /// Fixes a variable and updates constraint aggregates. Returns false
    /// on contradiction with an existing fixation.
    fn assign(&mut self, var: VarId, val: bool, queue: &mut Vec<usize>) -> bool {
        match self.value[var] {
            -1 => {}
            fixed => return (fixed == 1) == val,
        }
        self.value[var] = val as i8;
        self.trail.push(var);
        if val {
            self.current_objective += self.model.objective_coefficient(var);
        }
        for i in 0..self.prepared.var_cons[var].len() {
            let (constraint, coefficient) = self.prepared.var_cons[var][i];
            if coefficient > 0 {
                self.pos_unfixed[constraint] -= coefficient;
            } else {
                self.neg_unfixed[constraint] -= coefficient;
            }
            if val {
                self.fixed_sum[constraint] += coefficient;
            }
            queue.push(constraint);
        }
        true
    }

    /// Propagates forced values to a fixpoint. Returns false on conflict.
    fn propagate(&mut self, queue: &mut Vec<usize>) -> bool {
        let model = self.model;
        while let Some(c) = queue.pop() {
            let constraint = &model.constraints()[c];
            let rhs = constraint.rhs;
            let (mut low, mut high) = self.bounds(c);
            if low > rhs || (constraint.comparator == Comparator::Eq && high < rhs) {
                return false;
            }

            for idx in 0..constraint.terms.len() {
                let (var, a) = constraint.terms[idx];
                if self.value[var] != -1 {
                    continue;
                }
                let forced = match constraint.comparator {
                    Comparator::Leq => {
                        if a > 0 && low + a > rhs {
                            Some(false)
                        } else if a < 0 && low - a > rhs {
                            Some(true)
                        } else {
                            None
                        }
                    }
                    Comparator::Eq => {
                        if a > 0 {
                            if low + a > rhs {
                                Some(false)
                            } else if high - a < rhs {
                                Some(true)
                            } else {
                                None
                            }
                        } else if high + a < rhs {
                            Some(false)
                        } else if low - a > rhs {
                            Some(true)
                        } else {
                            None
                        }
                    }
                };
                if let Some(val) = forced {
                    if !self.assign(var, val, queue) {
                        return false;
                    }
                    let (l, h) = self.bounds(c);
                    low = l;
                    high = h;
                    if low > rhs || (constraint.comparator == Comparator::Eq && high < rhs) {
                        return false;
                    }
                }
            }
        }
        true
    }

    fn undo_to(&mut self, mark: usize, objective_mark: i64) {
        while self.trail.len() > mark {
            let Some(var) = self.trail.pop() else { break };
            let was_one = self.value[var] == 1;
            self.value[var] = -1;
            for i in 0..self.prepared.var_cons[var].len() {
                let (constraint, coefficient) = self.prepared.var_cons[var][i];
                if coefficient > 0 {
                    self.pos_unfixed[constraint] += coefficient;
                } else {
                    self.neg_unfixed[constraint] += coefficient;
                }
                if was_one {
                    self.fixed_sum[constraint] -= coefficient;
                }
            }
        }
        self.current_objective = objective_mark;
    }

    /// Admissible upper bound on the best completion of the current
    /// partial assignment.
    ///
    /// Exactly-one groups contribute their top remaining positive
    /// objective coefficients; every other unfixed variable contributes
    /// max(0, coefficient).
    fn upper_bound(&self) -> i64 {
        let mut bound = self.current_objective;
        for group in &self.prepared.groups {
            let need = group.rhs - self.fixed_sum[group.constraint];
            if need <= 0 {
                continue;
            }
            let mut coefficients: Vec<i64> = group
                .vars
                .iter()
                .filter(|&&v| self.value[v] == -1)
                .map(|&v| self.model.objective_coefficient(v))
                .filter(|&c| c > 0)
                .collect();
            coefficients.sort_unstable_by(|a, b| b.cmp(a));
            bound += coefficients.iter().take(need as usize).sum::<i64>();
        }
        for var in 0..self.value.len() {
            if self.value[var] == -1 && !self.prepared.exclusive[var] {
                let coefficient = self.model.objective_coefficient(var);
                if coefficient > 0 {
                    bound += coefficient;
                }
            }
        }
        bound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config() -> SolverConfig {
        SolverConfig::default().with_time_budget(Duration::from_secs(10))
    }

    /// sessions × physicians assignment model: one eq row per session,
    /// one capacity row per physician.
    fn assignment_model(
        sessions: usize,
        physicians: usize,
        capacity: i64,
        scores: &[(usize, usize, i64)],
    ) -> (CpModel, Vec<Vec<VarId>>) {
        let mut model = CpModel::new("test");
        let mut vars = vec![vec![0; physicians]; sessions];
        for (s, row) in vars.iter_mut().enumerate() {
            for (p, var) in row.iter_mut().enumerate() {
                *var = model.add_binary_var(format!("x_{s}_{p}"));
            }
        }
        for row in &vars {
            model.add_linear_eq(row.iter().map(|&v| (v, 1)).collect(), 1);
        }
        for p in 0..physicians {
            model.add_linear_leq((0..sessions).map(|s| (vars[s][p], 1)).collect(), capacity);
        }
        let objective: Vec<(VarId, i64)> = scores
            .iter()
            .map(|&(s, p, score)| (vars[s][p], score))
            .collect();
        model.set_objective_max(&objective);
        (model, vars)
    }

    #[test]
    fn test_picks_highest_score() {
        let (model, vars) = assignment_model(1, 2, 5, &[(0, 0, 5), (0, 1, -3)]);
        let solution = BranchBoundSolver::new().solve(&model, &config());
        assert_eq!(solution.status, SolveStatus::Optimal);
        assert_eq!(solution.objective, 5);
        assert_eq!(solution.best_bound, 5);
        assert!(solution.value(vars[0][0]));
        assert!(!solution.value(vars[0][1]));
    }

    #[test]
    fn test_infeasible_capacity() {
        // 3 sessions, 2 physicians with capacity 1 each.
        let (model, _) = assignment_model(3, 2, 1, &[]);
        let solution = BranchBoundSolver::new().solve(&model, &config());
        assert_eq!(solution.status, SolveStatus::Infeasible);
        assert!(!solution.has_assignment());
    }

    #[test]
    fn test_negative_only_choice() {
        let (model, vars) = assignment_model(1, 2, 5, &[(0, 0, -5), (0, 1, -3)]);
        let solution = BranchBoundSolver::new().solve(&model, &config());
        assert_eq!(solution.status, SolveStatus::Optimal);
        assert_eq!(solution.objective, -3);
        assert!(solution.value(vars[0][1]));
    }

    #[test]
    fn test_overlap_pair_forces_split() {
        // Two overlapping sessions, two physicians with plenty of
        // capacity; the pair cuts forbid giving both to one physician.
        let (mut model, vars) = assignment_model(2, 2, 2, &[(0, 0, 1), (1, 0, 1)]);
        for p in 0..2 {
            model.add_linear_leq(vec![(vars[0][p], 1), (vars[1][p], 1)], 1);
        }
        let solution = BranchBoundSolver::new().solve(&model, &config());
        assert_eq!(solution.status, SolveStatus::Optimal);
        for p in 0..2 {
            let both = solution.value(vars[0][p]) && solution.value(vars[1][p]);
            assert!(!both, "physician {p} got both overlapping sessions");
        }
        // Preference pushes one of the two sessions to physician 0.
        assert_eq!(solution.objective, 1);
    }

    #[test]
    fn test_empty_model_is_trivially_optimal() {
        let model = CpModel::new("empty");
        let solution = BranchBoundSolver::new().solve(&model, &config());
        assert_eq!(solution.status, SolveStatus::Optimal);
        assert_eq!(solution.objective, 0);
    }

    #[test]
    fn test_contradictory_empty_eq_is_infeasible() {
        let mut model = CpModel::new("bad");
        model.add_linear_eq(Vec::new(), 1);
        let solution = BranchBoundSolver::new().solve(&model, &config());
        assert_eq!(solution.status, SolveStatus::Infeasible);
    }

    #[test]
    fn test_deterministic_for_fixed_seed() {
        // Plenty of equal-score ties.
        let (model, vars) = assignment_model(4, 3, 2, &[(0, 0, 1), (1, 1, 1)]);
        let cfg = config().with_random_seed(7);
        let first = BranchBoundSolver::new().solve(&model, &cfg);
        let second = BranchBoundSolver::new().solve(&model, &cfg);
        assert_eq!(first.status, SolveStatus::Optimal);
        for row in &vars {
            for &v in row {
                assert_eq!(first.value(v), second.value(v));
            }
        }
        assert_eq!(first.objective, second.objective);
    }

    #[test]
    fn test_workers_agree_on_objective() {
        let (model, _) = assignment_model(5, 3, 2, &[(0, 0, 4), (1, 1, 2), (2, 2, 7), (3, 0, 1)]);
        let single = BranchBoundSolver::new().solve(&model, &config().with_worker_count(1));
        let quad = BranchBoundSolver::new().solve(&model, &config().with_worker_count(4));
        assert_eq!(single.status, SolveStatus::Optimal);
        assert_eq!(quad.status, SolveStatus::Optimal);
        assert_eq!(single.objective, quad.objective);
    }

    #[test]
    fn test_cancellation_yields_unknown() {
        let (model, _) = assignment_model(3, 2, 2, &[]);
        let solver = BranchBoundSolver::new();
        solver.stop_handle().store(true, Ordering::Relaxed);
        let solution = solver.solve(&model, &config());
        assert_eq!(solution.status, SolveStatus::Unknown);
        assert_eq!(solution.stop_reason, Some(StopReason::Cancelled));
    }

    #[test]
    fn test_capacity_zero_propagates_to_zero() {
        // One session, one physician with capacity 0: eq wants a 1,
        // capacity forces 0.
        let (model, _) = assignment_model(1, 1, 0, &[]);
        let solution = BranchBoundSolver::new().solve(&model, &config());
        assert_eq!(solution.status, SolveStatus::Infeasible);
    }
}
