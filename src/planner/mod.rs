//! Planning pipeline.
//!
//! Strictly staged, leaves first: eligibility preprocessing, model
//! construction, the solve, and schedule materialization. Each stage
//! consumes the previous stage's output fully; inputs are immutable for
//! the duration of the run.
//!
//! [`plan`] is the single entry point used by the CLI; [`plan_with`]
//! accepts any [`CpSolver`] backend.

mod builder;
mod driver;
mod materialize;

pub use builder::{RosterModelBuilder, VariableMap};
pub use driver::{saturation_witness, RosterAssignment, SolveOutcome, SolverDriver};
pub use materialize::materialize;

use log::{info, warn};

use crate::config::{InfeasibleSessionPolicy, PlannerConfig};
use crate::error::{PlanError, PlanResult};
use crate::feasibility::{compute_eligibility, SessionDiagnostic};
use crate::io::PlanningInput;
use crate::models::{Schedule, TravelTimes};
use crate::solver::{BranchBoundSolver, CpSolver};

/// Result of a successful planning run.
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    /// The materialized roster, one row per input session.
    pub schedule: Schedule,
    /// Total preference score reported by the solver.
    pub objective: i64,
    /// Whether the solver proved optimality within the budget.
    pub proven_optimal: bool,
    /// Diagnostics for sessions excluded as structurally infeasible.
    pub infeasible_sessions: Vec<SessionDiagnostic>,
    /// Travel-time matrix, carried through for downstream diagnostics.
    pub travel_times: TravelTimes,
}

/// Plans a roster with the bundled branch-and-bound backend.
pub fn plan(input: &PlanningInput, config: &PlannerConfig) -> PlanResult<PlanOutcome> {
    plan_with(&BranchBoundSolver::new(), input, config)
}

/// Plans a roster with a caller-supplied solver backend.
pub fn plan_with<S: CpSolver>(
    solver: &S,
    input: &PlanningInput,
    config: &PlannerConfig,
) -> PlanResult<PlanOutcome> {
    let eligibility = compute_eligibility(input);
    for diagnostic in &eligibility.infeasible {
        warn!(
            "session '{}' has no eligible physician ({})",
            diagnostic.session_id, diagnostic.removed
        );
    }
    if eligibility.has_infeasible()
        && config.infeasible_session_policy == InfeasibleSessionPolicy::Fail
    {
        return Err(PlanError::ModelInfeasible {
            witness: driver::saturation_witness_all(input, &eligibility),
        });
    }

    let (model, map) = RosterModelBuilder::new(input, &eligibility)
        .with_default_score(config.default_preference_score)
        .build();
    info!(
        "roster model: {} variables, {} constraints over {} sessions",
        model.var_count(),
        model.constraint_count(),
        input.session_count()
    );

    let outcome = SolverDriver::new(config).drive(solver, &model, &map, input, &eligibility);
    let (assignment, proven_optimal) = match outcome {
        SolveOutcome::Optimal(assignment) => (assignment, true),
        SolveOutcome::Feasible(assignment, _bound) => (assignment, false),
        SolveOutcome::Infeasible(witness) => return Err(PlanError::ModelInfeasible { witness }),
        SolveOutcome::Unknown(reason) => return Err(PlanError::SolverTimeout { reason }),
    };

    let schedule = materialize(input, &assignment, config.default_preference_score)?;
    Ok(PlanOutcome {
        objective: assignment.objective,
        schedule,
        proven_optimal,
        infeasible_sessions: eligibility.infeasible,
        travel_times: input.travel_times.clone(),
    })
}
