use rand::rngs::StdRng;
use rand::Rng;

/// Picks the action to play at each step of a rollout.
///
/// Implementations are shared by every worker and must not keep mutable
/// state; all randomness comes from the worker's own `rng`.
pub trait RolloutPolicy<S, A>: Send + Sync {
    /// Index into `actions`, which is never empty.
    fn choose(&self, state: &S, actions: &[A], rng: &mut StdRng) -> usize;
}

/// Plays uniformly random legal actions.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformRollout;

impl<S, A> RolloutPolicy<S, A> for UniformRollout {
    #[inline]
    fn choose(&self, _state: &S, actions: &[A], rng: &mut StdRng) -> usize {
        rng.gen_range(0..actions.len())
    }
}
