//! Planner configuration.
//!
//! One record for the knobs that were previously scattered defaults:
//! solver budget, parallelism, seed, the default preference score, and
//! the policy for structurally infeasible sessions.

use std::time::Duration;

/// What to do when preprocessing finds a session no physician can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InfeasibleSessionPolicy {
    /// Exclude the session from the model; it appears in the output with
    /// an empty assignment.
    #[default]
    Skip,
    /// Fail the run with the session diagnostics.
    Fail,
}

/// Configuration for a planning run.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Wall-clock budget for the solver.
    pub time_budget: Duration,
    /// Solver worker threads. 1 (the default) guarantees determinism.
    pub worker_count: usize,
    /// Random seed for the solver's branching order.
    pub random_seed: u64,
    /// Score used for (physician, location) pairs without a preference row.
    pub default_preference_score: i64,
    /// Policy for structurally infeasible sessions.
    pub infeasible_session_policy: InfeasibleSessionPolicy,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            time_budget: Duration::from_secs(30),
            worker_count: 1,
            random_seed: 0,
            default_preference_score: 0,
            infeasible_session_policy: InfeasibleSessionPolicy::Skip,
        }
    }
}

impl PlannerConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the solver time budget in seconds.
    pub fn with_time_budget_seconds(mut self, seconds: f64) -> Self {
        self.time_budget = Duration::from_secs_f64(seconds.max(0.0));
        self
    }

    /// Sets the solver worker count (minimum 1).
    pub fn with_worker_count(mut self, workers: usize) -> Self {
        self.worker_count = workers.max(1);
        self
    }

    /// Sets the random seed.
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    /// Sets the default preference score.
    pub fn with_default_preference_score(mut self, score: i64) -> Self {
        self.default_preference_score = score;
        self
    }

    /// Sets the infeasible-session policy.
    pub fn with_infeasible_session_policy(mut self, policy: InfeasibleSessionPolicy) -> Self {
        self.infeasible_session_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PlannerConfig::default();
        assert_eq!(config.time_budget, Duration::from_secs(30));
        assert_eq!(config.worker_count, 1);
        assert_eq!(config.random_seed, 0);
        assert_eq!(config.default_preference_score, 0);
        assert_eq!(
            config.infeasible_session_policy,
            InfeasibleSessionPolicy::Skip
        );
    }

    #[test]
    fn test_builder() {
        let config = PlannerConfig::new()
            .with_time_budget_seconds(2.5)
            .with_worker_count(0)
            .with_random_seed(7)
            .with_default_preference_score(-1)
            .with_infeasible_session_policy(InfeasibleSessionPolicy::Fail);

        assert_eq!(config.time_budget, Duration::from_secs_f64(2.5));
        assert_eq!(config.worker_count, 1); // clamped
        assert_eq!(config.random_seed, 7);
        assert_eq!(config.default_preference_score, -1);
        assert_eq!(config.infeasible_session_policy, InfeasibleSessionPolicy::Fail);
    }
}
