//! The contract binding a game to the search engines.
//!
//! Both engines are generic over [`GameRules`]. A game supplies five pure
//! functions: apply an action, enumerate legal actions, determine the winner,
//! project a finished state onto an outcome, and decide whether an outcome
//! credits the agent that moved into a state.

use std::fmt::Debug;
use std::sync::Arc;

/// Identifies an agent. The value configured as `SearchSetting::no_winner`
/// means "nobody has won yet".
pub type AgentIndex = i8;

/// Sentinel returned by [`GameRules::winner`] while a game is still running,
/// unless a setting overrides it.
pub const DEFAULT_NO_WINNER: AgentIndex = 0;

/// Rules of a two-agent, perfect-information, zero-sum game.
///
/// `apply` is the only function allowed to mutate a state, and it must be free
/// of side effects outside of the state it is given: MCTS calls it
/// concurrently on independent copies from several threads.
pub trait GameRules: Send + Sync {
    type State: Clone + Send + Sync;
    type Action: Clone + Send + Sync + PartialEq + Debug;
    type Outcome: Clone + Send + Sync;

    /// Applies `action` to `state`.
    fn apply(&self, state: &mut Self::State, action: &Self::Action);

    /// Legal actions for the agent to move, in a stable order.
    fn actions(&self, state: &Self::State) -> Vec<Self::Action>;

    /// Winner of `state`, or the no-winner sentinel if the game goes on.
    fn winner(&self, state: &Self::State) -> AgentIndex;

    /// Projects a finished (or abandoned) state onto an outcome.
    fn outcome(&self, state: &Self::State, winner: AgentIndex) -> Self::Outcome;

    /// Returns true if `outcome` counts as a win for the agent that moved into
    /// `state`. Backpropagation only credits value where this holds.
    fn credits(&self, state: &Self::State, outcome: &Self::Outcome) -> bool;
}

/// Static evaluation for minimax leaves.
///
/// Scores are from the point of view of the agent to move in `state`; the
/// negamax recursion flips the sign on every ply.
pub trait Evaluator<S>: Send + Sync {
    fn evaluate(&self, state: &S, winner: AgentIndex) -> f64;
}

impl<S, F> Evaluator<S> for F
where
    F: Fn(&S, AgentIndex) -> f64 + Send + Sync,
{
    #[inline]
    fn evaluate(&self, state: &S, winner: AgentIndex) -> f64 {
        self(state, winner)
    }
}

type ApplyFn<S, A> = Arc<dyn Fn(&mut S, &A) + Send + Sync>;
type ActionsFn<S, A> = Arc<dyn Fn(&S) -> Vec<A> + Send + Sync>;
type WinnerFn<S> = Arc<dyn Fn(&S) -> AgentIndex + Send + Sync>;
type OutcomeFn<S, O> = Arc<dyn Fn(&S, AgentIndex) -> O + Send + Sync>;
type CreditsFn<S, O> = Arc<dyn Fn(&S, &O) -> bool + Send + Sync>;

/// [`GameRules`] assembled from five closures, for games that are easier to
/// describe as free functions than as a type.
pub struct FnRules<S, A, O> {
    apply: ApplyFn<S, A>,
    actions: ActionsFn<S, A>,
    winner: WinnerFn<S>,
    outcome: OutcomeFn<S, O>,
    credits: CreditsFn<S, O>,
}

impl<S, A, O> FnRules<S, A, O> {
    pub fn new(
        apply: impl Fn(&mut S, &A) + Send + Sync + 'static,
        actions: impl Fn(&S) -> Vec<A> + Send + Sync + 'static,
        winner: impl Fn(&S) -> AgentIndex + Send + Sync + 'static,
        outcome: impl Fn(&S, AgentIndex) -> O + Send + Sync + 'static,
        credits: impl Fn(&S, &O) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            apply: Arc::new(apply),
            actions: Arc::new(actions),
            winner: Arc::new(winner),
            outcome: Arc::new(outcome),
            credits: Arc::new(credits),
        }
    }
}

impl<S, A, O> Clone for FnRules<S, A, O> {
    fn clone(&self) -> Self {
        Self {
            apply: Arc::clone(&self.apply),
            actions: Arc::clone(&self.actions),
            winner: Arc::clone(&self.winner),
            outcome: Arc::clone(&self.outcome),
            credits: Arc::clone(&self.credits),
        }
    }
}

impl<S, A, O> GameRules for FnRules<S, A, O>
where
    S: Clone + Send + Sync,
    A: Clone + Send + Sync + PartialEq + Debug,
    O: Clone + Send + Sync,
{
    type State = S;
    type Action = A;
    type Outcome = O;

    fn apply(&self, state: &mut S, action: &A) {
        (self.apply)(state, action)
    }

    fn actions(&self, state: &S) -> Vec<A> {
        (self.actions)(state)
    }

    fn winner(&self, state: &S) -> AgentIndex {
        (self.winner)(state)
    }

    fn outcome(&self, state: &S, winner: AgentIndex) -> O {
        (self.outcome)(state, winner)
    }

    fn credits(&self, state: &S, outcome: &O) -> bool {
        (self.credits)(state, outcome)
    }
}
