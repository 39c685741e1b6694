//! Search configuration shared read-only by every worker.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::rules::{AgentIndex, DEFAULT_NO_WINNER};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("thread count must be at least 1")]
    ZeroThreadCount,
    #[error("node capacity per thread must be at least 1")]
    ZeroNodeCapacity,
    #[error("iteration budget per thread must be at least 1")]
    ZeroIterationBudget,
    #[error("time budget must be a non-negative number of seconds that fits a duration (got {0})")]
    InvalidTimeBudget(f64),
    #[error("exploration constant must be finite and non-negative (got {0})")]
    InvalidExplorationConstant(f64),
    #[error("search depth must be at least 1")]
    DepthTooLow,
}

/// Knobs for both engines. Fields irrelevant to an engine are ignored by it:
/// minimax only reads `max_search_depth` and `no_winner`.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchSetting {
    /// The `C` in UCB1.
    pub exploration_constant: f64,
    pub iteration_budget_per_thread: u64,
    /// Wall-clock budget per MCTS worker; 0 means unbounded.
    pub time_budget_seconds: f64,
    pub thread_count: usize,
    pub node_capacity_per_thread: usize,
    pub no_winner: AgentIndex,
    pub max_search_depth: usize,
    /// Rollouts give up (with no winner) after this many plies.
    pub max_rollout_depth: usize,
    /// Master seed for worker random streams. `None` draws one per search.
    pub seed: Option<u64>,
}

impl Default for SearchSetting {
    fn default() -> Self {
        Self {
            exploration_constant: std::f64::consts::SQRT_2,
            iteration_budget_per_thread: 10_000,
            time_budget_seconds: 30.0,
            thread_count: 4,
            node_capacity_per_thread: 100_000,
            no_winner: DEFAULT_NO_WINNER,
            max_search_depth: 2,
            max_rollout_depth: 512,
            seed: None,
        }
    }
}

impl SearchSetting {
    pub fn with_exploration_constant(mut self, exploration_constant: f64) -> Self {
        self.exploration_constant = exploration_constant;
        self
    }

    pub fn with_iteration_budget(mut self, iterations: u64) -> Self {
        self.iteration_budget_per_thread = iterations;
        self
    }

    pub fn with_time_budget(mut self, seconds: f64) -> Self {
        self.time_budget_seconds = seconds;
        self
    }

    pub fn with_thread_count(mut self, thread_count: usize) -> Self {
        self.thread_count = thread_count;
        self
    }

    pub fn with_node_capacity(mut self, capacity: usize) -> Self {
        self.node_capacity_per_thread = capacity;
        self
    }

    pub fn with_no_winner(mut self, no_winner: AgentIndex) -> Self {
        self.no_winner = no_winner;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_search_depth = depth;
        self
    }

    pub fn with_max_rollout_depth(mut self, depth: usize) -> Self {
        self.max_rollout_depth = depth;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// `None` when the time budget is unbounded or does not fit a `Duration`.
    pub fn time_budget(&self) -> Option<Duration> {
        Duration::try_from_secs_f64(self.time_budget_seconds)
            .ok()
            .filter(|budget| !budget.is_zero())
    }

    pub fn validate_mcts(&self) -> Result<(), ConfigError> {
        if self.thread_count == 0 {
            return Err(ConfigError::ZeroThreadCount);
        }
        if self.node_capacity_per_thread == 0 {
            return Err(ConfigError::ZeroNodeCapacity);
        }
        if self.iteration_budget_per_thread == 0 {
            return Err(ConfigError::ZeroIterationBudget);
        }
        if Duration::try_from_secs_f64(self.time_budget_seconds).is_err() {
            return Err(ConfigError::InvalidTimeBudget(self.time_budget_seconds));
        }
        if !self.exploration_constant.is_finite() || self.exploration_constant < 0.0 {
            return Err(ConfigError::InvalidExplorationConstant(
                self.exploration_constant,
            ));
        }
        Ok(())
    }

    pub fn validate_minimax(&self) -> Result<(), ConfigError> {
        if self.max_search_depth == 0 {
            return Err(ConfigError::DepthTooLow);
        }
        Ok(())
    }
}

impl fmt::Display for SearchSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<28}{}", "exploration_constant", self.exploration_constant)?;
        writeln!(f, "{:<28}{}", "iteration_budget_per_thread", self.iteration_budget_per_thread)?;
        writeln!(f, "{:<28}{}", "time_budget_seconds", self.time_budget_seconds)?;
        writeln!(f, "{:<28}{}", "thread_count", self.thread_count)?;
        writeln!(f, "{:<28}{}", "node_capacity_per_thread", self.node_capacity_per_thread)?;
        writeln!(f, "{:<28}{}", "no_winner", self.no_winner)?;
        writeln!(f, "{:<28}{}", "max_search_depth", self.max_search_depth)?;
        writeln!(f, "{:<28}{}", "max_rollout_depth", self.max_rollout_depth)?;
        match self.seed {
            Some(seed) => write!(f, "{:<28}{}", "seed", seed),
            None => write!(f, "{:<28}random", "seed"),
        }
    }
}
