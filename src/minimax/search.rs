//! Depth-bounded negamax, with optional alpha-beta pruning.
//!
//! # Algorithm
//!
//! Negamax relies on the zero-sum symmetry `max(a, b) = -min(-a, -b)`: every
//! node returns its value from the point of view of the agent to move, and the
//! parent negates it. Leaves (depth 0, or a decided game) are scored by the
//! caller's [`Evaluator`].
//!
//! With alpha-beta enabled the window `[alpha, beta]` is negated and swapped
//! on every ply, and a node returns `beta` as soon as one child reaches it
//! (fail-hard). At the root each later action is searched with
//! `beta = -best`, so an action only replaces the incumbent on strict
//! improvement. This keeps the chosen action and its score identical to
//! plain negamax; only the number of visited nodes changes.
//!
//! # Node lifecycle
//!
//! Actions are tried in enumeration order, without reordering. Each child is
//! constructed in a [`StackAllocator`] sized to the depth limit, searched,
//! and destroyed before the next sibling, so at most one line of nodes is
//! alive at any time.

use std::time::{Duration, Instant};

use log::{debug, log, log_enabled, warn, Level};
#[cfg(feature = "instrumentation")]
use tracing::instrument;

use super::node::MinimaxNode;
use crate::arena::{Handle, StackAllocator};
use crate::error::SearchError;
use crate::rules::{AgentIndex, Evaluator, GameRules};
use crate::search_log::{
    SearchLog, VisualId, VisualTree, ALPHA_KEY, BETA_KEY, DEPTH_KEY, EVALUATION_KEY,
    LEAF_COUNT_KEY, STATE_KEY, TERMINAL_KEY, WINNER_KEY,
};
use crate::setting::SearchSetting;

type NodeOf<R> = MinimaxNode<<R as GameRules>::State, <R as GameRules>::Action>;
type LogOf<R> =
    SearchLog<<R as GameRules>::State, <R as GameRules>::Action, <R as GameRules>::Outcome>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pruning {
    Disabled,
    AlphaBeta,
}

/// Result of a root search.
#[derive(Clone, Debug)]
pub struct MinimaxDecision<A> {
    pub action: Option<A>,
    pub best_index: Option<usize>,
    /// `None` when a single legal action short-circuited the search.
    pub evaluation: Option<f64>,
    /// Score of every root action, in enumeration order. With pruning, scores
    /// of actions that could not beat the incumbent are upper bounds.
    pub action_evaluations: Vec<(A, f64)>,
}

#[derive(Default)]
struct SearchStats {
    leaf_count: usize,
    node_count: usize,
    last_evaluation: Option<f64>,
    last_duration: Option<Duration>,
}

/// Synchronous minimax engine. Results are a pure function of the root state,
/// the depth limit and the evaluator.
pub struct MinimaxSearch<R: GameRules, E> {
    rules: R,
    evaluator: E,
    log: LogOf<R>,
    stats: SearchStats,
}

impl<R, E> MinimaxSearch<R, E>
where
    R: GameRules,
    E: Evaluator<R::State>,
{
    pub fn new(rules: R, evaluator: E) -> Self {
        Self {
            rules,
            evaluator,
            log: SearchLog::default(),
            stats: SearchStats::default(),
        }
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    pub fn install_formatters(
        &mut self,
        state_to_str: impl Fn(&R::State) -> String + Send + Sync + 'static,
        action_to_str: impl Fn(&R::Action) -> String + Send + Sync + 'static,
        outcome_to_str: impl Fn(&R::Outcome) -> String + Send + Sync + 'static,
    ) {
        self.log
            .install_formatters(state_to_str, action_to_str, outcome_to_str);
    }

    pub fn search_log(&self) -> &LogOf<R> {
        &self.log
    }

    pub fn search_log_mut(&mut self) -> &mut LogOf<R> {
        &mut self.log
    }

    pub fn enable_log(&mut self) {
        self.log.enable_log();
    }

    pub fn disable_log(&mut self) {
        self.log.disable_log();
    }

    pub fn enable_visual_tree(&mut self) {
        self.log.enable_visual_tree();
    }

    pub fn take_visual_tree(&mut self) -> Option<VisualTree> {
        self.log.take_visual_tree()
    }

    /// Leaves evaluated by the last search.
    pub fn leaf_count(&self) -> usize {
        self.stats.leaf_count
    }

    /// Nodes constructed by the last search, root included.
    pub fn node_count(&self) -> usize {
        self.stats.node_count
    }

    pub fn last_evaluation(&self) -> Option<f64> {
        self.stats.last_evaluation
    }

    pub fn last_search_duration(&self) -> Option<Duration> {
        self.stats.last_duration
    }

    /// Plain negamax over every node up to `max_search_depth`.
    pub fn run_negamax(
        &mut self,
        state: &R::State,
        setting: &SearchSetting,
    ) -> Result<R::Action, SearchError> {
        self.search(state, setting, Pruning::Disabled, true)?
            .action
            .ok_or(SearchError::NoAvailableActions)
    }

    /// Negamax with alpha-beta pruning; same decision as [`run_negamax`].
    ///
    /// [`run_negamax`]: MinimaxSearch::run_negamax
    pub fn run_alpha_beta(
        &mut self,
        state: &R::State,
        setting: &SearchSetting,
    ) -> Result<R::Action, SearchError> {
        self.search(state, setting, Pruning::AlphaBeta, true)?
            .action
            .ok_or(SearchError::NoAvailableActions)
    }

    /// Minimax value of `state` for the agent to move. Unlike the `run_*`
    /// entry points, a single legal action is still searched.
    pub fn evaluation(
        &mut self,
        state: &R::State,
        setting: &SearchSetting,
    ) -> Result<f64, SearchError> {
        self.search(state, setting, Pruning::AlphaBeta, false)?
            .evaluation
            .ok_or(SearchError::NoAvailableActions)
    }

    #[must_use = "search returns the decision found"]
    #[cfg_attr(feature = "instrumentation", instrument(skip_all))]
    pub fn search(
        &mut self,
        state: &R::State,
        setting: &SearchSetting,
        pruning: Pruning,
        return_single_action: bool,
    ) -> Result<MinimaxDecision<R::Action>, SearchError> {
        setting.validate_minimax()?;
        self.stats = SearchStats::default();

        let level = self.log.summary_level();
        log!(
            level,
            "minimax search ({:?}) to depth {}",
            pruning,
            setting.max_search_depth
        );
        log!(level, "setting:\n{}", setting);

        let start = Instant::now();
        let mut run = NegamaxRun {
            rules: &self.rules,
            evaluator: &self.evaluator,
            log: &self.log,
            no_winner: setting.no_winner,
            pruning,
            // root plus one node per ply
            arena: StackAllocator::new(setting.max_search_depth + 1),
            tree: self.log.visual_tree_enabled().then(VisualTree::new),
            leaf_count: 0,
            node_count: 0,
        };
        let result = run.search_root(state, setting.max_search_depth, return_single_action);

        let NegamaxRun {
            leaf_count,
            node_count,
            tree,
            ..
        } = run;
        self.stats.leaf_count = leaf_count;
        self.stats.node_count = node_count;
        self.stats.last_duration = Some(start.elapsed());

        let decision = result?;
        self.stats.last_evaluation = decision.evaluation;
        if let Some(tree) = tree {
            self.log.store_visual_tree(tree);
        }

        self.log_decision(&decision, level);
        Ok(decision)
    }

    fn log_decision(&self, decision: &MinimaxDecision<R::Action>, level: Level) {
        if !log_enabled!(level) {
            return;
        }

        log!(level, "{:>5}  {:<20}  {:>10}", "index", "action", "eval");
        for (index, (action, evaluation)) in decision.action_evaluations.iter().enumerate() {
            let marker = if decision.best_index == Some(index) {
                " <- best"
            } else {
                ""
            };
            log!(
                level,
                "{:>5}  {:<20}  {:>10.3}{}",
                index,
                self.log.action_str(action),
                evaluation,
                marker
            );
        }
        log!(
            level,
            "leaf evaluations: {}, nodes: {}, time: {:?}",
            self.stats.leaf_count,
            self.stats.node_count,
            self.stats.last_duration.unwrap_or_default()
        );
    }
}

/// State of one root search: the node stack and the counters.
struct NegamaxRun<'a, R: GameRules, E> {
    rules: &'a R,
    evaluator: &'a E,
    log: &'a LogOf<R>,
    no_winner: AgentIndex,
    pruning: Pruning,
    arena: StackAllocator<NodeOf<R>>,
    tree: Option<VisualTree>,
    leaf_count: usize,
    node_count: usize,
}

impl<'a, R, E> NegamaxRun<'a, R, E>
where
    R: GameRules,
    E: Evaluator<R::State>,
{
    fn search_root(
        &mut self,
        state: &R::State,
        max_depth: usize,
        return_single_action: bool,
    ) -> Result<MinimaxDecision<R::Action>, SearchError> {
        let root = self.construct(state.clone(), max_depth)?;
        let root_visual = self.record_node(root, None)?;
        let (is_terminal, action_count) = {
            let node = self.arena.get(root)?;
            (node.is_terminal(self.no_winner), node.action_count())
        };

        if is_terminal {
            warn!("minimax search started from a terminal state; evaluating it without descent");
            let evaluation = self.evaluate_leaf(root, root_visual)?;
            let action = self.rules.actions(state).into_iter().next();
            let best_index = action.as_ref().map(|_| 0);
            return Ok(MinimaxDecision {
                action,
                best_index,
                evaluation: Some(evaluation),
                action_evaluations: Vec::new(),
            });
        }

        if action_count == 0 {
            warn!("minimax search started from a non-terminal state without actions");
            return Err(SearchError::NoAvailableActions);
        }

        if action_count == 1 && return_single_action {
            let action = self.arena.get(root)?.actions()[0].clone();
            debug!(
                "only one action is available: {}",
                self.log.action_str(&action)
            );
            return Ok(MinimaxDecision {
                action: Some(action),
                best_index: Some(0),
                evaluation: None,
                action_evaluations: Vec::new(),
            });
        }

        let mut best_value = f64::NEG_INFINITY;
        let mut best_index = 0;
        let mut action_evaluations = Vec::with_capacity(action_count);

        for index in 0..action_count {
            let child_beta = match self.pruning {
                Pruning::AlphaBeta => -best_value,
                Pruning::Disabled => f64::INFINITY,
            };
            let child = self.expand(root, index)?;
            let value = -self.negamax(child, f64::NEG_INFINITY, child_beta, root_visual)?;
            self.arena.destroy(child)?;

            if value > best_value {
                best_value = value;
                best_index = index;
            }
            let action = self.arena.get(root)?.actions()[index].clone();
            action_evaluations.push((action, value));
        }

        if let (Some(tree), Some(id)) = (self.tree.as_mut(), root_visual) {
            tree.add_value(id, EVALUATION_KEY, best_value);
            tree.add_value(id, LEAF_COUNT_KEY, self.leaf_count);
        }

        Ok(MinimaxDecision {
            action: Some(action_evaluations[best_index].0.clone()),
            best_index: Some(best_index),
            evaluation: Some(best_value),
            action_evaluations,
        })
    }

    /// Value of the node at `handle` for the agent to move in it.
    #[cfg_attr(feature = "instrumentation", instrument(skip_all))]
    fn negamax(
        &mut self,
        handle: Handle,
        alpha: f64,
        beta: f64,
        parent_visual: Option<VisualId>,
    ) -> Result<f64, SearchError> {
        let visual = self.record_node(handle, parent_visual)?;
        let (depth, is_terminal, action_count) = {
            let node = self.arena.get(handle)?;
            (
                node.depth(),
                node.is_terminal(self.no_winner),
                node.action_count(),
            )
        };

        if depth == 0 || is_terminal || action_count == 0 {
            if depth > 0 && !is_terminal {
                warn!("empty action set on a non-terminal state; evaluating it as a leaf");
            }
            return self.evaluate_leaf(handle, visual);
        }

        let leaves_before = self.leaf_count;
        let mut best = match self.pruning {
            Pruning::AlphaBeta => alpha,
            Pruning::Disabled => f64::NEG_INFINITY,
        };

        for index in 0..action_count {
            let child = self.expand(handle, index)?;
            let value = -self.negamax(child, -beta, -best, visual)?;
            self.arena.destroy(child)?;

            if self.pruning == Pruning::AlphaBeta && value >= beta {
                self.record_interior(visual, alpha, beta, beta, leaves_before);
                return Ok(beta);
            }
            if value > best {
                best = value;
            }
        }

        self.record_interior(visual, alpha, beta, best, leaves_before);
        Ok(best)
    }

    fn evaluate_leaf(
        &mut self,
        handle: Handle,
        visual: Option<VisualId>,
    ) -> Result<f64, SearchError> {
        let node = self.arena.get(handle)?;
        let evaluation = self.evaluator.evaluate(node.state(), node.winner());
        self.leaf_count += 1;

        if let (Some(tree), Some(id)) = (self.tree.as_mut(), visual) {
            tree.add_value(id, EVALUATION_KEY, evaluation);
        }
        Ok(evaluation)
    }

    fn expand(&mut self, parent: Handle, index: usize) -> Result<Handle, SearchError> {
        let node = self.arena.get(parent)?;
        let mut state = node.state().clone();
        self.rules.apply(&mut state, &node.actions()[index]);
        let depth = node.depth() - 1;
        self.construct(state, depth)
    }

    fn construct(&mut self, state: R::State, depth: usize) -> Result<Handle, SearchError> {
        let node = MinimaxNode::new(self.rules, state, depth, self.no_winner);
        let handle = self.arena.construct(node)?;
        self.node_count += 1;
        Ok(handle)
    }

    fn record_node(
        &mut self,
        handle: Handle,
        parent: Option<VisualId>,
    ) -> Result<Option<VisualId>, SearchError> {
        let tree = match self.tree.as_mut() {
            Some(tree) => tree,
            None => return Ok(None),
        };
        let node = self.arena.get(handle)?;

        let id = match parent {
            Some(parent) => tree.create_child(parent),
            None => tree.root(),
        };
        tree.add_value(id, STATE_KEY, self.log.state_str(node.state()));
        tree.add_value(id, DEPTH_KEY, node.depth());
        tree.add_value(id, WINNER_KEY, node.winner());
        tree.add_value(id, TERMINAL_KEY, node.is_terminal(self.no_winner));
        Ok(Some(id))
    }

    fn record_interior(
        &mut self,
        visual: Option<VisualId>,
        alpha: f64,
        beta: f64,
        value: f64,
        leaves_before: usize,
    ) {
        if let (Some(tree), Some(id)) = (self.tree.as_mut(), visual) {
            if self.pruning == Pruning::AlphaBeta {
                tree.add_value(id, ALPHA_KEY, alpha);
                tree.add_value(id, BETA_KEY, beta);
            }
            tree.add_value(id, LEAF_COUNT_KEY, self.leaf_count - leaves_before);
            tree.add_value(id, EVALUATION_KEY, value);
        }
    }
}
