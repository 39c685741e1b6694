//! Root-parallel Monte Carlo Tree Search.
//!
//! # Algorithm
//!
//! Every worker grows its own tree from the same root, one iteration at a
//! time:
//!
//! 1. **Selection**: descend through fully expanded nodes, picking the child
//!    with the highest UCB1 score `mean + C * sqrt(ln(N) / n)`.
//! 2. **Expansion**: add the next untried action of the reached node, in
//!    enumeration order.
//! 3. **Rollout**: play the new child out with a [`RolloutPolicy`].
//! 4. **Backpropagation**: walk the parent handles back to the root, adding
//!    one visit everywhere and one unit of value wherever
//!    [`GameRules::credits`] holds.
//!
//! # Parallelism
//!
//! The pool has `thread_count` threads and every one of them runs exactly
//! one worker, whose index is the thread's index in the pool.
//! Workers share nothing mutable. Each owns a [`LinearAllocator`] of
//! `node_capacity_per_thread` nodes and a `StdRng` seeded with the master
//! seed plus its index, so a fixed seed reproduces the whole search. The
//! trees are merged only at the root: visits and values of each root action
//! are summed, and the action with the most visits wins.
//!
//! [`LinearAllocator`]: crate::arena::LinearAllocator

use std::time::{Duration, Instant};

use log::{debug, log, log_enabled, warn, Level};
use rayon::ThreadPoolBuilder;
#[cfg(feature = "instrumentation")]
use tracing::instrument;

use super::rollout::{RolloutPolicy, UniformRollout};
use super::worker::{Worker, WorkerReport, WorkerResult};
use crate::error::SearchError;
use crate::rules::GameRules;
use crate::search_log::{SearchLog, VisualTree, STATE_KEY, VISITS_KEY, WORKER_KEY};
use crate::setting::SearchSetting;

type LogOf<R> =
    SearchLog<<R as GameRules>::State, <R as GameRules>::Action, <R as GameRules>::Outcome>;

/// Aggregated statistics of one root action over all workers.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionStats<A> {
    pub action: A,
    pub visits: u64,
    pub value: f64,
}

impl<A> ActionStats<A> {
    fn new(action: A) -> Self {
        Self {
            action,
            visits: 0,
            value: 0.0,
        }
    }

    pub fn mean(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.value / self.visits as f64
        }
    }
}

/// Outcome of an MCTS search.
#[derive(Clone, Debug)]
pub struct MctsReport<A> {
    pub action: A,
    pub best_index: usize,
    /// One entry per root action, in enumeration order.
    pub action_stats: Vec<ActionStats<A>>,
    /// Sum of the root visit counts of every worker.
    pub root_visits: u64,
    /// Empty when the search returned without iterating.
    pub workers: Vec<WorkerReport>,
    /// Nodes allocated over all workers, root included.
    pub node_count: usize,
    pub duration: Duration,
}

impl<A: Clone> MctsReport<A> {
    /// Report for a decision taken without running any iteration.
    fn immediate(action: A, duration: Duration) -> Self {
        Self {
            action: action.clone(),
            best_index: 0,
            action_stats: vec![ActionStats::new(action)],
            root_visits: 0,
            workers: Vec::new(),
            node_count: 1,
            duration,
        }
    }

    /// Aggregated visits of the returned action.
    pub fn best_visits(&self) -> u64 {
        self.action_stats
            .get(self.best_index)
            .map_or(0, |stats| stats.visits)
    }

    pub fn total_iterations(&self) -> u64 {
        self.workers.iter().map(|worker| worker.iterations).sum()
    }
}

/// Parallel, anytime MCTS engine.
pub struct MctsSearch<R: GameRules, P = UniformRollout> {
    rules: R,
    policy: P,
    log: LogOf<R>,
    last_report: Option<MctsReport<R::Action>>,
}

impl<R: GameRules> MctsSearch<R> {
    pub fn new(rules: R) -> Self {
        Self::with_rollout_policy(rules, UniformRollout)
    }
}

impl<R, P> MctsSearch<R, P>
where
    R: GameRules,
    P: RolloutPolicy<R::State, R::Action>,
{
    pub fn with_rollout_policy(rules: R, policy: P) -> Self {
        Self {
            rules,
            policy,
            log: SearchLog::default(),
            last_report: None,
        }
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    pub fn rollout_policy(&self) -> &P {
        &self.policy
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

    pub fn last_report(&self) -> Option<&MctsReport<R::Action>> {
        self.last_report.as_ref()
    }

    /// Nodes allocated by the last search over all workers.
    pub fn node_count(&self) -> usize {
        self.last_report.as_ref().map_or(0, |report| report.node_count)
    }

    /// Best action for the agent to move in `state`.
    pub fn search(
        &mut self,
        state: &R::State,
        setting: &SearchSetting,
    ) -> Result<R::Action, SearchError> {
        self.search_with_report(state, setting)
            .map(|report| report.action)
    }

    #[must_use = "the report carries the chosen action"]
    #[cfg_attr(feature = "instrumentation", instrument(skip_all))]
    pub fn search_with_report(
        &mut self,
        state: &R::State,
        setting: &SearchSetting,
    ) -> Result<MctsReport<R::Action>, SearchError> {
        setting.validate_mcts()?;
        self.last_report = None;

        let level = self.log.summary_level();
        log!(
            level,
            "mcts search with {} threads, {} iterations per thread",
            setting.thread_count,
            setting.iteration_budget_per_thread
        );
        log!(level, "setting:\n{}", setting);

        let start = Instant::now();
        let winner = self.rules.winner(state);
        let actions = self.rules.actions(state);

        if winner != setting.no_winner {
            warn!("mcts search started from a terminal state; no iterations are run");
            let action = actions
                .into_iter()
                .next()
                .ok_or(SearchError::NoAvailableActions)?;
            return Ok(self.finish(MctsReport::immediate(action, start.elapsed())));
        }

        if actions.is_empty() {
            warn!("mcts search started from a non-terminal state without actions");
            return Err(SearchError::NoAvailableActions);
        }

        if actions.len() == 1 {
            let action = actions[0].clone();
            debug!(
                "only one action is available: {}",
                self.log.action_str(&action)
            );
            return Ok(self.finish(MctsReport::immediate(action, start.elapsed())));
        }

        let mut results = self.run_workers(state, setting)?;
        let tree = self.merge_visual_trees(state, &mut results);
        let mut report = reduce(results)?;
        report.duration = start.elapsed();

        if let Some(tree) = tree {
            self.log.store_visual_tree(tree);
        }
        self.log_report(&report, level);
        Ok(self.finish(report))
    }

    fn finish(&mut self, report: MctsReport<R::Action>) -> MctsReport<R::Action> {
        self.last_report = Some(report.clone());
        report
    }

    /// Runs one worker per pool thread and waits for all of them.
    fn run_workers(
        &self,
        state: &R::State,
        setting: &SearchSetting,
    ) -> Result<Vec<WorkerResult<R::Action>>, SearchError> {
        let master_seed = setting.seed.unwrap_or_else(rand::random);
        debug!("master seed {}", master_seed);

        let pool = ThreadPoolBuilder::new()
            .num_threads(setting.thread_count)
            .build()?;

        let rules = &self.rules;
        let policy = &self.policy;
        let log = &self.log;
        // broadcast returns the results in thread index order
        let results: Vec<Result<WorkerResult<R::Action>, SearchError>> = pool.broadcast(|ctx| {
            Worker::new(ctx.index(), rules, policy, setting, log, master_seed).run(state)
        });

        results.into_iter().collect()
    }

    /// Hangs every worker's tree under a shared root.
    fn merge_visual_trees(
        &self,
        state: &R::State,
        results: &mut [WorkerResult<R::Action>],
    ) -> Option<VisualTree> {
        if !self.log.visual_tree_enabled() {
            return None;
        }

        let mut tree = VisualTree::new();
        let root = tree.root();
        tree.add_value(root, STATE_KEY, self.log.state_str(state));

        let mut root_visits = 0;
        for result in results.iter_mut() {
            root_visits += result.report.root_visits;
            if let Some(subtree) = result.tree.take() {
                let id = tree.graft(root, subtree);
                tree.add_value(id, WORKER_KEY, result.report.worker);
            }
        }
        tree.add_value(root, VISITS_KEY, root_visits);
        Some(tree)
    }

    fn log_report(&self, report: &MctsReport<R::Action>, level: Level) {
        if !log_enabled!(level) {
            return;
        }

        for worker in &report.workers {
            log!(
                level,
                "worker {}: {} iterations, {} nodes, stopped on {}",
                worker.worker,
                worker.iterations,
                worker.node_count,
                worker.stop_reason
            );
        }

        log!(
            level,
            "{:>5}  {:<20}  {:>10}  {:>10}  {:>8}",
            "index",
            "action",
            "visits",
            "value",
            "mean"
        );
        for (index, stats) in report.action_stats.iter().enumerate() {
            let marker = if index == report.best_index {
                " <- best"
            } else {
                ""
            };
            log!(
                level,
                "{:>5}  {:<20}  {:>10}  {:>10.1}  {:>8.3}{}",
                index,
                self.log.action_str(&stats.action),
                stats.visits,
                stats.value,
                stats.mean(),
                marker
            );
        }
        log!(
            level,
            "root visits: {}, nodes: {}, time: {:?}",
            report.root_visits,
            report.node_count,
            report.duration
        );
    }
}

/// Sums root statistics across workers and picks the most visited action,
/// keeping the first one on ties.
fn reduce<A>(results: Vec<WorkerResult<A>>) -> Result<MctsReport<A>, SearchError>
where
    A: Clone + PartialEq,
{
    let reference = match results.first() {
        Some(first) => first.root_actions.clone(),
        None => return Err(SearchError::NoAvailableActions),
    };

    let mut action_stats: Vec<ActionStats<A>> =
        reference.iter().cloned().map(ActionStats::new).collect();
    let mut workers = Vec::with_capacity(results.len());
    let mut root_visits = 0;
    let mut node_count = 0;

    for (worker, result) in results.into_iter().enumerate() {
        if result.root_actions != reference {
            return Err(SearchError::InconsistentEnumeration { worker });
        }
        for (total, child) in action_stats.iter_mut().zip(&result.child_stats) {
            total.visits += child.visits;
            total.value += child.value;
        }
        root_visits += result.report.root_visits;
        node_count += result.report.node_count;
        workers.push(result.report);
    }

    let mut best_index = None;
    let mut best_visits = 0;
    for (index, stats) in action_stats.iter().enumerate() {
        if best_index.is_none() || stats.visits > best_visits {
            best_index = Some(index);
            best_visits = stats.visits;
        }
    }
    let best_index = best_index.ok_or(SearchError::NoAvailableActions)?;

    Ok(MctsReport {
        action: action_stats[best_index].action.clone(),
        best_index,
        action_stats,
        root_visits,
        workers,
        node_count,
        duration: Duration::default(),
    })
}
