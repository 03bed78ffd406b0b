//! Solver orchestration.
//!
//! Owns the solve: submits the model to a [`CpSolver`] backend under the
//! configured budget, seed, and worker count, classifies the result, and
//! reconstructs the per-session assignment. Infeasibility is explained
//! with a saturation witness computed greedily from the eligibility sets.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use log::{info, warn};

use crate::config::PlannerConfig;
use crate::error::{SaturationWitness, WitnessScope};
use crate::feasibility::Eligibility;
use crate::io::PlanningInput;
use crate::solver::{CpModel, CpSolver, SolveStatus, SolverConfig, StopReason};

use super::builder::VariableMap;

/// A reconstructed per-session assignment with its objective value.
#[derive(Debug, Clone)]
pub struct RosterAssignment {
    /// session index → assigned physician index (`None` for pruned
    /// sessions).
    pub by_session: Vec<Option<usize>>,
    /// Objective value reported by the solver.
    pub objective: i64,
}

/// Classified outcome of a solve.
#[derive(Debug, Clone)]
pub enum SolveOutcome {
    /// Proven optimum within the budget.
    Optimal(RosterAssignment),
    /// Best known assignment plus the tightest proven bound.
    Feasible(RosterAssignment, i64),
    /// No assignment satisfies the hard constraints.
    Infeasible(SaturationWitness),
    /// No feasible assignment found before the stop; carries the reason.
    Unknown(String),
}

/// Drives a CP-SAT-style backend over the roster model.
pub struct SolverDriver {
    config: SolverConfig,
}

impl SolverDriver {
    /// Creates a driver from the planner configuration.
    pub fn new(config: &PlannerConfig) -> Self {
        Self {
            config: SolverConfig::new()
                .with_time_budget(config.time_budget)
                .with_worker_count(config.worker_count)
                .with_random_seed(config.random_seed),
        }
    }

    /// Solves the model and classifies the outcome.
    pub fn drive<S: CpSolver>(
        &self,
        solver: &S,
        model: &CpModel,
        map: &VariableMap,
        input: &PlanningInput,
        eligibility: &Eligibility,
    ) -> SolveOutcome {
        let solution = solver.solve(model, &self.config);
        match solution.status {
            SolveStatus::Optimal => {
                info!("solver proved optimality, objective {}", solution.objective);
                SolveOutcome::Optimal(extract(map, input, &solution))
            }
            SolveStatus::Feasible => {
                warn!(
                    "solver stopped with a feasible roster, objective {} (bound {})",
                    solution.objective, solution.best_bound
                );
                SolveOutcome::Feasible(extract(map, input, &solution), solution.best_bound)
            }
            SolveStatus::Infeasible => {
                SolveOutcome::Infeasible(saturation_witness(input, eligibility))
            }
            SolveStatus::Unknown => SolveOutcome::Unknown(match solution.stop_reason {
                Some(StopReason::Cancelled) => "cancelled before a feasible roster".to_string(),
                _ => "deadline reached before a feasible roster".to_string(),
            }),
        }
    }
}

fn extract(
    map: &VariableMap,
    input: &PlanningInput,
    solution: &crate::solver::CpSolution,
) -> RosterAssignment {
    let mut by_session = vec![None; input.session_count()];
    for (session, vars) in map.by_session.iter().enumerate() {
        for &(var, physician) in vars {
            if solution.value(var) {
                by_session[session] = Some(physician);
                break;
            }
        }
    }
    RosterAssignment {
        by_session,
        objective: solution.objective,
    }
}

/// Finds the tightest over-saturated (scope, required, available) triple.
///
/// Greedy estimate over the eligibility sets: per date, the sessions of
/// that date versus what eligible physicians could cover there; falling
/// back to the whole horizon against total capacity. Sessions already
/// pruned as structurally infeasible are excluded (they never reached
/// the model), except when none survive at all.
pub fn saturation_witness(input: &PlanningInput, eligibility: &Eligibility) -> SaturationWitness {
    saturation_witness_over(input, eligibility, false)
}

/// Like [`saturation_witness`] but counting structurally infeasible
/// sessions too; used when those sessions themselves fail the run.
pub fn saturation_witness_all(
    input: &PlanningInput,
    eligibility: &Eligibility,
) -> SaturationWitness {
    saturation_witness_over(input, eligibility, true)
}

fn saturation_witness_over(
    input: &PlanningInput,
    eligibility: &Eligibility,
    include_pruned: bool,
) -> SaturationWitness {
    let counted: Vec<usize> = (0..input.session_count())
        .filter(|&s| include_pruned || eligibility.is_feasible(s))
        .collect();

    // Sessions and eligible-session counts per physician, per date.
    let mut dates: BTreeMap<NaiveDate, (usize, Vec<usize>)> = BTreeMap::new();
    for &session in &counted {
        let entry = dates
            .entry(input.sessions[session].date)
            .or_insert_with(|| (0, vec![0; input.physician_count()]));
        entry.0 += 1;
        for &physician in &eligibility.eligible[session] {
            entry.1[physician] += 1;
        }
    }

    let capacity = |physician: usize, reachable: usize| -> usize {
        (input.physicians[physician].max_sessions as usize).min(reachable)
    };

    let mut best: Option<SaturationWitness> = None;
    for (&date, (required, reachable)) in &dates {
        let available: usize = reachable
            .iter()
            .enumerate()
            .map(|(physician, &count)| capacity(physician, count))
            .sum();
        let candidate = SaturationWitness {
            scope: WitnessScope::Date(date),
            required: *required,
            available,
        };
        let tighter = match &best {
            Some(current) => deficit(&candidate) > deficit(current),
            None => true,
        };
        if tighter {
            best = Some(candidate);
        }
    }

    // Horizon-level capacity check.
    let mut totals = vec![0usize; input.physician_count()];
    for &session in &counted {
        for &physician in &eligibility.eligible[session] {
            totals[physician] += 1;
        }
    }
    let horizon = SaturationWitness {
        scope: WitnessScope::Horizon,
        required: counted.len(),
        available: totals
            .iter()
            .enumerate()
            .map(|(physician, &count)| capacity(physician, count))
            .sum(),
    };

    match best {
        Some(date_witness) if deficit(&date_witness) >= deficit(&horizon) => date_witness,
        _ => horizon,
    }
}

fn deficit(witness: &SaturationWitness) -> i64 {
    witness.required as i64 - witness.available as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feasibility::compute_eligibility;
    use crate::models::{
        Location, Physician, PreferenceTable, Session, TravelTimes, WorkdayRules,
    };
    use crate::planner::builder::RosterModelBuilder;
    use crate::solver::{CpSolution, SolverConfig as BackendConfig};
    use chrono::NaiveTime;

    fn t(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    fn capacity_bound_input() -> PlanningInput {
        // 3 sessions on distinct days, 2 physicians with capacity 1.
        PlanningInput::assemble(
            vec![
                Physician::new("D1").with_max_sessions(1),
                Physician::new("D2").with_max_sessions(1),
            ],
            vec![Location::new("L1")],
            Vec::new(),
            vec![
                Session::new("S1", d(2), "L1", t(9), t(12)),
                Session::new("S2", d(3), "L1", t(9), t(12)),
                Session::new("S3", d(4), "L1", t(9), t(12)),
            ],
            PreferenceTable::new(),
            TravelTimes::new(),
            WorkdayRules::new(),
            Vec::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_horizon_witness() {
        let input = capacity_bound_input();
        let eligibility = compute_eligibility(&input);
        let witness = saturation_witness(&input, &eligibility);
        assert_eq!(witness.scope, WitnessScope::Horizon);
        assert_eq!(witness.required, 3);
        assert_eq!(witness.available, 2);
    }

    #[test]
    fn test_date_witness_beats_horizon() {
        // 2 sessions on one day, single physician with capacity 5 but
        // only one assignable per slot-free day: overlap-free but the
        // day itself is over-saturated via eligibility: D2 blocked.
        let input = PlanningInput::assemble(
            vec![
                Physician::new("D1").with_max_sessions(5).with_unavailable(d(2)),
                Physician::new("D2").with_max_sessions(5),
            ],
            vec![Location::new("L1")],
            Vec::new(),
            vec![
                Session::new("S1", d(2), "L1", t(9), t(10)),
                Session::new("S2", d(2), "L1", t(9), t(10)),
                Session::new("S3", d(2), "L1", t(9), t(10)),
            ],
            PreferenceTable::new(),
            TravelTimes::new(),
            WorkdayRules::new(),
            Vec::new(),
        )
        .unwrap();
        let eligibility = compute_eligibility(&input);
        let witness = saturation_witness(&input, &eligibility);
        // Only D2 is eligible on 2025-06-02: 3 required, 3 reachable but
        // capped by what one physician can reach (3) — horizon says the
        // same, so the earlier date scope wins on equal deficit.
        assert_eq!(witness.scope, WitnessScope::Date(d(2)));
        assert_eq!(witness.required, 3);
        assert_eq!(witness.available, 3);
    }

    /// Canned backend driving the driver through each classification.
    struct MockSolver {
        solution: CpSolution,
    }

    impl CpSolver for MockSolver {
        fn solve(&self, _model: &CpModel, _config: &BackendConfig) -> CpSolution {
            self.solution.clone()
        }
    }

    #[test]
    fn test_drive_classifies_with_mock() {
        let input = capacity_bound_input();
        let eligibility = compute_eligibility(&input);
        let (model, map) = RosterModelBuilder::new(&input, &eligibility).build();
        let driver = SolverDriver::new(&PlannerConfig::default());

        let mock = MockSolver {
            solution: CpSolution::new(SolveStatus::Infeasible, Vec::new(), 0, 0, None),
        };
        match driver.drive(&mock, &model, &map, &input, &eligibility) {
            SolveOutcome::Infeasible(witness) => {
                assert_eq!(witness.required, 3);
                assert_eq!(witness.available, 2);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        let mock = MockSolver {
            solution: CpSolution::new(
                SolveStatus::Unknown,
                Vec::new(),
                0,
                0,
                Some(StopReason::DeadlineExpired),
            ),
        };
        assert!(matches!(
            driver.drive(&mock, &model, &map, &input, &eligibility),
            SolveOutcome::Unknown(_)
        ));
    }

    #[test]
    fn test_extract_assignment_with_mock() {
        let input = capacity_bound_input();
        let eligibility = compute_eligibility(&input);
        let (model, map) = RosterModelBuilder::new(&input, &eligibility).build();
        let driver = SolverDriver::new(&PlannerConfig::default());

        // Fabricate: S1→D1 (first var of session 0), others unset.
        let mut values = vec![false; model.var_count()];
        let (var, physician) = map.by_session[0][0];
        values[var] = true;
        let mock = MockSolver {
            solution: CpSolution::new(SolveStatus::Optimal, values, 0, 0, None),
        };
        match driver.drive(&mock, &model, &map, &input, &eligibility) {
            SolveOutcome::Optimal(assignment) => {
                assert_eq!(assignment.by_session[0], Some(physician));
                assert_eq!(assignment.by_session[1], None);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
