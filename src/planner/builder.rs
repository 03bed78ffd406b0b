//! Constraint model construction.
//!
//! Translates the roster problem into a binary integer program:
//!
//! - one variable per (session, eligible physician) pair;
//! - an exactly-one row per non-pruned session;
//! - a capacity row per physician;
//! - a pairwise cut per physician for same-day overlapping sessions;
//! - objective: maximize the summed preference scores.
//!
//! Skills, unavailability, workdays, and week rules never become rows:
//! they were already eliminated from the variable set by preprocessing,
//! which keeps the model compact. No tie-breaking terms are added; the
//! driver's fixed seed makes equal-score optima reproducible.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use crate::feasibility::Eligibility;
use crate::io::PlanningInput;
use crate::solver::{CpModel, VarId};

/// Mapping between model variables and (session, physician) pairs.
#[derive(Debug, Clone, Default)]
pub struct VariableMap {
    /// var → (session index, physician index).
    pub pairs: Vec<(usize, usize)>,
    /// session index → (var, physician index); empty for pruned sessions.
    pub by_session: Vec<Vec<(VarId, usize)>>,
}

/// Builds the roster integer program from preprocessed input.
pub struct RosterModelBuilder<'a> {
    input: &'a PlanningInput,
    eligibility: &'a Eligibility,
    default_score: i64,
}

impl<'a> RosterModelBuilder<'a> {
    /// Creates a builder over the input and its eligibility sets.
    pub fn new(input: &'a PlanningInput, eligibility: &'a Eligibility) -> Self {
        Self {
            input,
            eligibility,
            default_score: 0,
        }
    }

    /// Sets the score used for pairs without a preference row.
    pub fn with_default_score(mut self, score: i64) -> Self {
        self.default_score = score;
        self
    }

    /// Preference score of assigning a physician to a session.
    pub fn score(&self, session: usize, physician: usize) -> i64 {
        let location = self.input.session_location[session];
        self.input
            .preference(physician, location)
            .unwrap_or(self.default_score)
    }

    /// Builds the model and its variable map.
    pub fn build(&self) -> (CpModel, VariableMap) {
        let mut model = CpModel::new("duty-roster");
        let mut map = VariableMap {
            pairs: Vec::new(),
            by_session: vec![Vec::new(); self.input.session_count()],
        };
        let mut var_of: HashMap<(usize, usize), VarId> = HashMap::new();

        // Variables only for allowed pairs; pruned sessions get none.
        for (session, candidates) in self.eligibility.eligible.iter().enumerate() {
            for &physician in candidates {
                let var = model.add_binary_var(format!(
                    "x_{}_{}",
                    self.input.sessions[session].id, self.input.physicians[physician].id
                ));
                map.pairs.push((session, physician));
                map.by_session[session].push((var, physician));
                var_of.insert((session, physician), var);
            }
        }

        // Exactly one physician per non-pruned session.
        for vars in map.by_session.iter().filter(|v| !v.is_empty()) {
            model.add_linear_eq(vars.iter().map(|&(var, _)| (var, 1)).collect(), 1);
        }

        // Monthly capacity per physician.
        let mut per_physician: Vec<Vec<VarId>> = vec![Vec::new(); self.input.physician_count()];
        for (var, &(_, physician)) in map.pairs.iter().enumerate() {
            per_physician[physician].push(var);
        }
        for (physician, vars) in per_physician.iter().enumerate() {
            if !vars.is_empty() {
                model.add_linear_leq(
                    vars.iter().map(|&var| (var, 1)).collect(),
                    i64::from(self.input.physicians[physician].max_sessions),
                );
            }
        }

        // Same-day overlap cuts per physician.
        let mut by_date: BTreeMap<NaiveDate, Vec<usize>> = BTreeMap::new();
        for (session, vars) in map.by_session.iter().enumerate() {
            if !vars.is_empty() {
                by_date
                    .entry(self.input.sessions[session].date)
                    .or_default()
                    .push(session);
            }
        }
        for sessions in by_date.values() {
            for (i, &a) in sessions.iter().enumerate() {
                for &b in &sessions[i + 1..] {
                    if !self.input.sessions[a].overlaps(&self.input.sessions[b]) {
                        continue;
                    }
                    for &(var_a, physician) in &map.by_session[a] {
                        if let Some(&var_b) = var_of.get(&(b, physician)) {
                            model.add_linear_leq(vec![(var_a, 1), (var_b, 1)], 1);
                        }
                    }
                }
            }
        }

        // Objective: summed preference scores of chosen pairs.
        let objective: Vec<(VarId, i64)> = map
            .pairs
            .iter()
            .enumerate()
            .map(|(var, &(session, physician))| (var, self.score(session, physician)))
            .filter(|&(_, score)| score != 0)
            .collect();
        model.set_objective_max(&objective);

        (model, map)
    }
}
