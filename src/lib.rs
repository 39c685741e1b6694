//! Game-tree search for two-agent, perfect-information games: a root-parallel
//! Monte Carlo Tree Search engine, a negamax/alpha-beta engine, and the
//! fixed-capacity node arenas both of them allocate from.
//!
//! A game plugs in by implementing [`GameRules`] (or by bundling closures in
//! [`FnRules`]); both engines are configured with a [`SearchSetting`].

pub mod arena;
pub mod error;
pub mod games;
pub mod mcts;
pub mod minimax;
pub mod rules;
pub mod search_log;
pub mod setting;

#[cfg(feature = "instrumentation")]
pub mod instrumentation;

pub use error::SearchError;
pub use mcts::{MctsReport, MctsSearch};
pub use minimax::{MinimaxSearch, Pruning};
pub use rules::{AgentIndex, Evaluator, FnRules, GameRules};
pub use setting::{ConfigError, SearchSetting};
