//! CP-SAT-style solving over binary linear models.
//!
//! Bridges the roster domain to an integer-programming backend. The
//! model layer is deliberately small: binary variables, linear `=` and
//! `≤` rows, and a maximization objective — everything the roster
//! formulation needs, behind a trait so the model builder stays testable
//! against a mock and backends stay swappable.
//!
//! The bundled backend is [`BranchBoundSolver`], an exact
//! branch-and-bound engine with constraint propagation.
//!
//! # Reference
//! Wolsey (1998), "Integer Programming", Ch. 7: Branch and Bound

mod branch_bound;

use std::time::Duration;

pub use branch_bound::BranchBoundSolver;

/// Handle of a model variable.
pub type VarId = usize;

/// Row sense of a linear constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    /// Σ terms ≤ rhs
    Leq,
    /// Σ terms = rhs
    Eq,
}

/// A linear constraint over binary variables.
#[derive(Debug, Clone)]
pub struct LinearConstraint {
    /// (variable, coefficient) terms.
    pub terms: Vec<(VarId, i64)>,
    /// Row sense.
    pub comparator: Comparator,
    /// Right-hand side.
    pub rhs: i64,
}

/// A binary integer program: variables, linear rows, and a
/// maximization objective.
#[derive(Debug, Clone)]
pub struct CpModel {
    name: String,
    var_names: Vec<String>,
    objective: Vec<i64>,
    constraints: Vec<LinearConstraint>,
}

impl CpModel {
    /// Creates an empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            var_names: Vec::new(),
            objective: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// Model name (used in logs).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a binary variable and returns its handle.
    pub fn add_binary_var(&mut self, name: impl Into<String>) -> VarId {
        self.var_names.push(name.into());
        self.objective.push(0);
        self.var_names.len() - 1
    }

    /// Adds Σ terms ≤ rhs.
    pub fn add_linear_leq(&mut self, terms: Vec<(VarId, i64)>, rhs: i64) {
        self.constraints.push(LinearConstraint {
            terms,
            comparator: Comparator::Leq,
            rhs,
        });
    }

    /// Adds Σ terms = rhs.
    pub fn add_linear_eq(&mut self, terms: Vec<(VarId, i64)>, rhs: i64) {
        self.constraints.push(LinearConstraint {
            terms,
            comparator: Comparator::Eq,
            rhs,
        });
    }

    /// Sets the objective to maximize Σ terms. Variables not mentioned
    /// keep coefficient 0.
    pub fn set_objective_max(&mut self, terms: &[(VarId, i64)]) {
        for coefficient in self.objective.iter_mut() {
            *coefficient = 0;
        }
        for &(var, coefficient) in terms {
            self.objective[var] = coefficient;
        }
    }

    /// Debug name of a variable.
    pub fn var_name(&self, var: VarId) -> &str {
        &self.var_names[var]
    }

    /// Objective coefficient of a variable.
    pub fn objective_coefficient(&self, var: VarId) -> i64 {
        self.objective[var]
    }

    /// Number of variables.
    pub fn var_count(&self) -> usize {
        self.var_names.len()
    }

    /// Number of constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// The constraint rows.
    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }
}

/// Solver settings: wall-clock budget, parallelism, and seed.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Wall-clock budget.
    pub time_budget: Duration,
    /// Worker threads; 1 guarantees a deterministic assignment.
    pub worker_count: usize,
    /// Seed for the branching order.
    pub random_seed: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_budget: Duration::from_secs(30),
            worker_count: 1,
            random_seed: 0,
        }
    }
}

impl SolverConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the time budget.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = budget;
        self
    }

    /// Sets the worker count (minimum 1).
    pub fn with_worker_count(mut self, workers: usize) -> Self {
        self.worker_count = workers.max(1);
        self
    }

    /// Sets the random seed.
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }
}

/// Result classification of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// Proven optimum within the budget.
    Optimal,
    /// Best known solution; optimality not proven.
    Feasible,
    /// No assignment satisfies the constraints.
    Infeasible,
    /// Budget exhausted without any feasible assignment.
    Unknown,
}

/// Why a solve stopped before completing its search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The wall-clock deadline expired.
    DeadlineExpired,
    /// The stop flag was raised by the caller.
    Cancelled,
}

/// Outcome of a solve: status, variable values, objective, and bound.
#[derive(Debug, Clone)]
pub struct CpSolution {
    /// Result classification.
    pub status: SolveStatus,
    /// Objective of the returned assignment (0 when none).
    pub objective: i64,
    /// Best proven upper bound on the objective.
    pub best_bound: i64,
    /// Set when the search stopped early.
    pub stop_reason: Option<StopReason>,
    values: Vec<bool>,
}

impl CpSolution {
    pub(crate) fn new(
        status: SolveStatus,
        values: Vec<bool>,
        objective: i64,
        best_bound: i64,
        stop_reason: Option<StopReason>,
    ) -> Self {
        Self {
            status,
            objective,
            best_bound,
            stop_reason,
            values,
        }
    }

    /// Whether the solution carries an assignment.
    pub fn has_assignment(&self) -> bool {
        matches!(self.status, SolveStatus::Optimal | SolveStatus::Feasible)
    }

    /// Value of a variable in the returned assignment.
    pub fn value(&self, var: VarId) -> bool {
        self.values.get(var).copied().unwrap_or(false)
    }
}

/// A CP-SAT-style backend.
pub trait CpSolver {
    /// Solves the model under the given settings.
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution;
}
