//! Parallel Monte Carlo Tree Search.

mod node;
mod rollout;
mod search;
mod worker;


pub use node::MctsNode;
pub use rollout::{RolloutPolicy, UniformRollout};
pub use search::{ActionStats, MctsReport, MctsSearch};
pub use worker::{StopReason, WorkerReport};
