use smallvec::SmallVec;

use crate::arena::Handle;
use crate::rules::{AgentIndex, GameRules};

/// Tree node owned by a single worker's arena. Links to the parent and to the
/// children are arena handles.
pub struct MctsNode<S, A> {
    state: S,
    parent: Option<Handle>,
    /// Position of the action that led here in the parent's action list.
    action_index: Option<usize>,
    actions: Vec<A>,
    children: SmallVec<[Handle; 8]>,
    visits: u64,
    value: f64,
    winner: AgentIndex,
    depth: usize,
}

impl<S, A> MctsNode<S, A> {
    /// Terminal nodes never enumerate their actions.
    pub fn new<R>(
        rules: &R,
        state: S,
        parent: Option<(Handle, usize)>,
        depth: usize,
        no_winner: AgentIndex,
    ) -> Self
    where
        R: GameRules<State = S, Action = A>,
    {
        let winner = rules.winner(&state);
        let actions = if winner == no_winner {
            rules.actions(&state)
        } else {
            Vec::new()
        };

        Self {
            state,
            parent: parent.map(|(handle, _)| handle),
            action_index: parent.map(|(_, index)| index),
            actions,
            children: SmallVec::new(),
            visits: 0,
            value: 0.0,
            winner,
            depth,
        }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn parent(&self) -> Option<Handle> {
        self.parent
    }

    pub fn action_index(&self) -> Option<usize> {
        self.action_index
    }

    pub fn actions(&self) -> &[A] {
        &self.actions
    }

    /// Children in expansion order; child `i` was reached by `actions()[i]`.
    pub fn children(&self) -> &[Handle] {
        &self.children
    }

    pub fn visits(&self) -> u64 {
        self.visits
    }

    /// Accumulated credit from backpropagation.
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn mean(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.value / self.visits as f64
        }
    }

    pub fn winner(&self) -> AgentIndex {
        self.winner
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_terminal(&self, no_winner: AgentIndex) -> bool {
        self.winner != no_winner
    }

    /// The next action to expand, in enumeration order.
    pub fn next_untried(&self) -> Option<&A> {
        self.actions.get(self.children.len())
    }

    pub fn is_fully_expanded(&self) -> bool {
        self.children.len() >= self.actions.len()
    }

    /// UCB1 score of this node as seen from a parent with `parent_visits`.
    /// Unvisited nodes score infinity.
    #[inline]
    pub fn ucb1(&self, parent_visits: u64, exploration_constant: f64) -> f64 {
        if self.visits == 0 {
            return f64::INFINITY;
        }
        let visits = self.visits as f64;
        self.value / visits + exploration_constant * ((parent_visits as f64).ln() / visits).sqrt()
    }

    pub(crate) fn push_child(&mut self, child: Handle) {
        self.children.push(child);
    }

    pub(crate) fn record_visit(&mut self, credited: bool) {
        self.visits += 1;
        if credited {
            self.value += 1.0;
        }
    }
}
