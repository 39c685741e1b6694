//! Optional, human-facing side channel of a search.
//!
//! Nothing in here feeds back into the algorithms: formatters only turn
//! states, actions and outcomes into text for log lines, and the visual tree
//! only receives copies of facts the engines already computed.

mod visual_tree;


pub use visual_tree::{NodeValue, VisualId, VisualNode, VisualTree};

use std::fmt::Debug;

use log::Level;

pub type StateFormatter<S> = Box<dyn Fn(&S) -> String + Send + Sync>;
pub type ActionFormatter<A> = Box<dyn Fn(&A) -> String + Send + Sync>;
pub type OutcomeFormatter<O> = Box<dyn Fn(&O) -> String + Send + Sync>;

// Keys shared by both engines when they record nodes.
pub const STATE_KEY: &str = "state";
pub const ACTION_KEY: &str = "action";
pub const DEPTH_KEY: &str = "depth";
pub const WINNER_KEY: &str = "winner";
pub const TERMINAL_KEY: &str = "is_terminal_state";
pub const EVALUATION_KEY: &str = "eval";
pub const LEAF_COUNT_KEY: &str = "leaf_count";
pub const ALPHA_KEY: &str = "alpha";
pub const BETA_KEY: &str = "beta";
pub const VISITS_KEY: &str = "visits";
pub const VALUE_KEY: &str = "value";
pub const MEAN_KEY: &str = "mean";
pub const WORKER_KEY: &str = "worker";
/// Outcome of the first rollout played from an MCTS node.
pub const OUTCOME_KEY: &str = "rollout_outcome";

/// Turns search values into text. Unset formatters print nothing, except
/// actions, which fall back to their `Debug` form.
pub struct SearchLog<S, A, O> {
    state_to_str: StateFormatter<S>,
    action_to_str: ActionFormatter<A>,
    outcome_to_str: OutcomeFormatter<O>,
    log_enabled: bool,
    record_tree: bool,
    tree: Option<VisualTree>,
}

impl<S, A: Debug, O> Default for SearchLog<S, A, O> {
    fn default() -> Self {
        Self {
            state_to_str: Box::new(|_| String::new()),
            action_to_str: Box::new(|action| format!("{:?}", action)),
            outcome_to_str: Box::new(|_| String::new()),
            log_enabled: false,
            record_tree: false,
            tree: None,
        }
    }
}

impl<S, A, O> SearchLog<S, A, O> {
    pub fn install_formatters(
        &mut self,
        state_to_str: impl Fn(&S) -> String + Send + Sync + 'static,
        action_to_str: impl Fn(&A) -> String + Send + Sync + 'static,
        outcome_to_str: impl Fn(&O) -> String + Send + Sync + 'static,
    ) {
        self.state_to_str = Box::new(state_to_str);
        self.action_to_str = Box::new(action_to_str);
        self.outcome_to_str = Box::new(outcome_to_str);
    }

    pub fn state_str(&self, state: &S) -> String {
        (self.state_to_str)(state)
    }

    pub fn action_str(&self, action: &A) -> String {
        (self.action_to_str)(action)
    }

    pub fn outcome_str(&self, outcome: &O) -> String {
        (self.outcome_to_str)(outcome)
    }

    /// Promotes search summaries from `debug` to `info`.
    pub fn enable_log(&mut self) {
        self.log_enabled = true;
    }

    pub fn disable_log(&mut self) {
        self.log_enabled = false;
    }

    pub fn log_enabled(&self) -> bool {
        self.log_enabled
    }

    /// Level search summaries are emitted at.
    pub fn summary_level(&self) -> Level {
        if self.log_enabled {
            Level::Info
        } else {
            Level::Debug
        }
    }

    pub fn enable_visual_tree(&mut self) {
        self.record_tree = true;
    }

    pub fn disable_visual_tree(&mut self) {
        self.record_tree = false;
    }

    pub fn visual_tree_enabled(&self) -> bool {
        self.record_tree
    }

    /// Tree recorded by the last search, if recording was enabled.
    pub fn take_visual_tree(&mut self) -> Option<VisualTree> {
        self.tree.take()
    }

    pub(crate) fn store_visual_tree(&mut self, tree: VisualTree) {
        self.tree = Some(tree);
    }
}
