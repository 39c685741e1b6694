use crate::rules::{AgentIndex, GameRules};

/// One position on the current minimax line. Nodes are created when the
/// recursion descends and destroyed when it returns.
pub struct MinimaxNode<S, A> {
    state: S,
    depth: usize,
    actions: Vec<A>,
    winner: AgentIndex,
}

impl<S, A> MinimaxNode<S, A> {
    /// Builds a node with `depth` plies left. Actions are only enumerated
    /// when the node can actually be expanded.
    pub fn new<R>(rules: &R, state: S, depth: usize, no_winner: AgentIndex) -> Self
    where
        R: GameRules<State = S, Action = A>,
    {
        let winner = rules.winner(&state);
        let actions = if depth > 0 && winner == no_winner {
            rules.actions(&state)
        } else {
            Vec::new()
        };

        Self {
            state,
            depth,
            actions,
            winner,
        }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn actions(&self) -> &[A] {
        &self.actions
    }

    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    pub fn winner(&self) -> AgentIndex {
        self.winner
    }

    pub fn is_terminal(&self, no_winner: AgentIndex) -> bool {
        self.winner != no_winner
    }
}
