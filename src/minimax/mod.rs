//! Minimax search for two-agent zero-sum games.

mod node;
mod search;

#[cfg(test)]
mod tests;

pub use node::MinimaxNode;
pub use search::{MinimaxDecision, MinimaxSearch, Pruning};
