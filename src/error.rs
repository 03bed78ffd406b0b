//! Error taxonomy for planning runs.
//!
//! Distinguishes the failure classes callers react to differently:
//! malformed input rows, cross-table inconsistencies, an infeasible
//! constraint model, solver timeouts, and internal invariant breaches.
//! Each class maps to a stable process exit code for the CLI.

use chrono::NaiveDate;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type PlanResult<T> = Result<T, PlanError>;

/// A planning-run failure.
#[derive(Debug, Clone, Error)]
pub enum PlanError {
    /// Row/column-level parse failure. Always fatal.
    #[error("{source_name} row {row}, column '{column}': {reason}")]
    InputMalformed {
        /// Table or file the row came from.
        source_name: String,
        /// 1-based data row index; 0 for header-level failures.
        row: usize,
        /// Offending column name.
        column: String,
        /// What went wrong.
        reason: String,
    },

    /// Cross-table reference failure. Fatal for sessions; ancillary
    /// tables recover row-level with a warning instead of raising this.
    #[error("{source_name} row {row}: {reason}")]
    InputInconsistent {
        /// Table or file the row came from.
        source_name: String,
        /// 1-based data row index.
        row: usize,
        /// What went wrong.
        reason: String,
    },

    /// The integer program has no solution.
    #[error("no roster satisfies the hard constraints ({witness})")]
    ModelInfeasible {
        /// Tightest over-saturation explaining the infeasibility.
        witness: SaturationWitness,
    },

    /// Deadline reached without any feasible roster.
    #[error("solver stopped without a feasible roster: {reason}")]
    SolverTimeout {
        /// Stop reason or underlying solver message.
        reason: String,
    },

    /// Unexpected state; a bug, not an input problem.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PlanError {
    /// Process exit code for the CLI surface.
    pub fn exit_code(&self) -> i32 {
        match self {
            PlanError::InputMalformed { .. } | PlanError::InputInconsistent { .. } => 1,
            PlanError::ModelInfeasible { .. } => 2,
            PlanError::SolverTimeout { .. } => 3,
            PlanError::Internal(_) => 4,
        }
    }
}

/// A minimal over-saturation explaining model infeasibility: somewhere in
/// the horizon more sessions are required than eligible physicians can
/// cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaturationWitness {
    /// The over-saturated scope: a single date, or the whole horizon.
    pub scope: WitnessScope,
    /// Sessions that must be staffed in the scope.
    pub required: usize,
    /// Assignments the eligible physicians can provide in the scope.
    pub available: usize,
}

/// Scope of a [`SaturationWitness`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WitnessScope {
    /// A single over-saturated date.
    Date(NaiveDate),
    /// The whole planning horizon.
    Horizon,
}

impl std::fmt::Display for SaturationWitness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.scope {
            WitnessScope::Date(date) => write!(
                f,
                "{date}: {} sessions required, {} assignable",
                self.required, self.available
            ),
            WitnessScope::Horizon => write!(
                f,
                "horizon: {} sessions required, {} capacity available",
                self.required, self.available
            ),
        }
    }
}
