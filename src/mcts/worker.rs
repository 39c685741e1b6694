//! One root-parallel MCTS worker: a private tree, arena and random stream.

use std::fmt;
use std::time::Instant;

use log::{trace, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rustc_hash::FxHashMap;
#[cfg(feature = "instrumentation")]
use tracing::instrument;

use super::node::MctsNode;
use super::rollout::RolloutPolicy;
use crate::arena::{ArenaError, Handle, LinearAllocator};
use crate::error::SearchError;
use crate::rules::GameRules;
use crate::search_log::{
    SearchLog, VisualId, VisualTree, ACTION_KEY, DEPTH_KEY, MEAN_KEY, OUTCOME_KEY, STATE_KEY,
    TERMINAL_KEY, VALUE_KEY, VISITS_KEY, WINNER_KEY,
};
use crate::setting::SearchSetting;

type NodeOf<R> = MctsNode<<R as GameRules>::State, <R as GameRules>::Action>;
type LogOf<R> =
    SearchLog<<R as GameRules>::State, <R as GameRules>::Action, <R as GameRules>::Outcome>;

/// Why a worker stopped iterating.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    IterationBudget,
    TimeBudget,
    /// The node arena filled up; the partial tree still counts.
    ArenaExhausted,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::IterationBudget => write!(f, "iteration budget"),
            StopReason::TimeBudget => write!(f, "time budget"),
            StopReason::ArenaExhausted => write!(f, "arena exhausted"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkerReport {
    pub worker: usize,
    pub iterations: u64,
    /// Nodes allocated in the worker's arena, root included.
    pub node_count: usize,
    pub stop_reason: StopReason,
    pub root_visits: u64,
}

/// Visits and credit of one root child.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct ChildStats {
    pub visits: u64,
    pub value: f64,
}

/// Everything a worker hands back to the reduction step.
pub(crate) struct WorkerResult<A> {
    pub report: WorkerReport,
    pub root_actions: Vec<A>,
    /// One entry per root action; unexpanded actions stay at zero.
    pub child_stats: Vec<ChildStats>,
    pub tree: Option<VisualTree>,
}

pub(crate) struct Worker<'a, R: GameRules, P> {
    index: usize,
    rules: &'a R,
    policy: &'a P,
    setting: &'a SearchSetting,
    log: &'a LogOf<R>,
    arena: LinearAllocator<NodeOf<R>>,
    rng: StdRng,
    /// Formatted first rollout outcome per arena slot, kept only while the
    /// visual tree is recorded.
    rollout_outcomes: Option<FxHashMap<usize, String>>,
}

impl<'a, R, P> Worker<'a, R, P>
where
    R: GameRules,
    P: RolloutPolicy<R::State, R::Action>,
{
    pub fn new(
        index: usize,
        rules: &'a R,
        policy: &'a P,
        setting: &'a SearchSetting,
        log: &'a LogOf<R>,
        master_seed: u64,
    ) -> Self {
        Self {
            index,
            rules,
            policy,
            setting,
            log,
            arena: LinearAllocator::new(setting.node_capacity_per_thread),
            rng: StdRng::seed_from_u64(master_seed.wrapping_add(index as u64)),
            rollout_outcomes: log.visual_tree_enabled().then(FxHashMap::default),
        }
    }

    /// Iterates until the first budget runs out, then summarises the root.
    #[cfg_attr(feature = "instrumentation", instrument(skip_all))]
    pub fn run(mut self, state: &R::State) -> Result<WorkerResult<R::Action>, SearchError> {
        let start = Instant::now();
        let time_budget = self.setting.time_budget();
        let root = self.arena.construct(MctsNode::new(
            self.rules,
            state.clone(),
            None,
            0,
            self.setting.no_winner,
        ))?;

        let mut iterations = 0;
        let stop_reason = loop {
            if iterations >= self.setting.iteration_budget_per_thread {
                break StopReason::IterationBudget;
            }
            if let Some(budget) = time_budget {
                if start.elapsed() >= budget {
                    break StopReason::TimeBudget;
                }
            }
            match self.iterate(root) {
                Ok(()) => iterations += 1,
                Err(SearchError::Arena(ArenaError::Exhausted { capacity })) => {
                    trace!(
                        "worker {} filled its arena ({} nodes) after {} iterations",
                        self.index,
                        capacity,
                        iterations
                    );
                    break StopReason::ArenaExhausted;
                }
                Err(error) => return Err(error),
            }
        };

        let root_node = self.arena.get(root)?;
        let root_actions = root_node.actions().to_vec();
        let mut child_stats = vec![ChildStats::default(); root_actions.len()];
        for (stats, &child) in child_stats.iter_mut().zip(root_node.children()) {
            let child = self.arena.get(child)?;
            stats.visits = child.visits();
            stats.value = child.value();
        }

        let report = WorkerReport {
            worker: self.index,
            iterations,
            node_count: self.arena.len(),
            stop_reason,
            root_visits: root_node.visits(),
        };
        let tree = if self.log.visual_tree_enabled() {
            Some(self.visual_tree()?)
        } else {
            None
        };

        Ok(WorkerResult {
            report,
            root_actions,
            child_stats,
            tree,
        })
    }

    /// Selection, expansion, rollout and backpropagation. Fails with
    /// `Exhausted` before touching any statistics if the arena is full.
    #[cfg_attr(feature = "instrumentation", instrument(skip_all))]
    fn iterate(&mut self, root: Handle) -> Result<(), SearchError> {
        let mut leaf = self.select(root)?;

        let node = self.arena.get(leaf)?;
        if !node.is_terminal(self.setting.no_winner) && !node.is_fully_expanded() {
            leaf = self.expand(leaf)?;
        }

        let state = self.arena.get(leaf)?.state().clone();
        let outcome = self.rollout(state);
        trace!(
            "worker {} rollout from slot {}: {}",
            self.index,
            leaf.index(),
            self.log.outcome_str(&outcome)
        );
        if let Some(outcomes) = self.rollout_outcomes.as_mut() {
            let log = self.log;
            outcomes
                .entry(leaf.index())
                .or_insert_with(|| log.outcome_str(&outcome));
        }
        self.backpropagate(leaf, &outcome)
    }

    /// Descends through fully expanded nodes by UCB1.
    fn select(&self, root: Handle) -> Result<Handle, SearchError> {
        let exploration = self.setting.exploration_constant;
        let mut current = root;

        loop {
            let node = self.arena.get(current)?;
            if node.is_terminal(self.setting.no_winner) || !node.is_fully_expanded() {
                return Ok(current);
            }

            let mut best = None;
            let mut best_score = f64::NEG_INFINITY;
            for &child in node.children() {
                let score = self.arena.get(child)?.ucb1(node.visits(), exploration);
                if best.is_none() || score > best_score {
                    best = Some(child);
                    best_score = score;
                }
            }

            match best {
                Some(child) => current = child,
                // non-terminal and no actions at all
                None => return Ok(current),
            }
        }
    }

    fn expand(&mut self, parent: Handle) -> Result<Handle, SearchError> {
        let node = self.arena.get(parent)?;
        let index = node.children().len();
        let depth = node.depth() + 1;
        let mut state = node.state().clone();
        if let Some(action) = node.next_untried() {
            self.rules.apply(&mut state, action);
        }

        let child = MctsNode::new(
            self.rules,
            state,
            Some((parent, index)),
            depth,
            self.setting.no_winner,
        );
        let handle = self.arena.construct(child)?;
        self.arena.get_mut(parent)?.push_child(handle);
        Ok(handle)
    }

    /// Plays `state` out with the rollout policy. Stops at a decided game or
    /// after `max_rollout_depth` plies, whichever comes first.
    #[cfg_attr(feature = "instrumentation", instrument(skip_all))]
    fn rollout(&mut self, mut state: R::State) -> R::Outcome {
        let no_winner = self.setting.no_winner;
        let mut winner = self.rules.winner(&state);
        let mut plies = 0;

        while winner == no_winner && plies < self.setting.max_rollout_depth {
            let actions = self.rules.actions(&state);
            if actions.is_empty() {
                warn!("empty action set on a non-terminal state during rollout");
                break;
            }
            let index = self.policy.choose(&state, &actions, &mut self.rng);
            self.rules.apply(&mut state, &actions[index]);
            winner = self.rules.winner(&state);
            plies += 1;
        }

        self.rules.outcome(&state, winner)
    }

    fn backpropagate(&mut self, leaf: Handle, outcome: &R::Outcome) -> Result<(), SearchError> {
        let mut current = Some(leaf);
        while let Some(handle) = current {
            let node = self.arena.get_mut(handle)?;
            let credited = self.rules.credits(node.state(), outcome);
            node.record_visit(credited);
            current = node.parent();
        }
        Ok(())
    }

    /// Copies the arena into a [`VisualTree`]. Parents are always constructed
    /// before their children, so one pass in slot order suffices.
    fn visual_tree(&self) -> Result<VisualTree, SearchError> {
        let log = self.log;
        let mut tree = VisualTree::new();
        let mut ids: Vec<VisualId> = Vec::with_capacity(self.arena.len());

        for (handle, node) in self.arena.iter() {
            let id = match node.parent() {
                Some(parent) => {
                    let id = tree.create_child(ids[parent.index()]);
                    let parent = self.arena.get(parent)?;
                    if let Some(action) = node.action_index().and_then(|i| parent.actions().get(i)) {
                        tree.add_value(id, ACTION_KEY, log.action_str(action));
                    }
                    id
                }
                None => tree.root(),
            };

            tree.add_value(id, STATE_KEY, log.state_str(node.state()));
            tree.add_value(id, VISITS_KEY, node.visits());
            tree.add_value(id, VALUE_KEY, node.value());
            tree.add_value(id, MEAN_KEY, node.mean());
            tree.add_value(id, DEPTH_KEY, node.depth());
            tree.add_value(id, WINNER_KEY, node.winner());
            tree.add_value(id, TERMINAL_KEY, node.is_terminal(self.setting.no_winner));
            if let Some(outcome) = self
                .rollout_outcomes
                .as_ref()
                .and_then(|outcomes| outcomes.get(&handle.index()))
            {
                tree.add_value(id, OUTCOME_KEY, outcome.as_str());
            }
            ids.push(id);
        }

        Ok(tree)
    }
}
