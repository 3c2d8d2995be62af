//! The agents that can play a two-player Markov game.
//!
//! Every playing style lives behind the [`Agent`] trait: fixed
//! distributions, independent Q-learning, minimax-Q with an equilibrium
//! solver, and particle-filter opponent modelling. The simulation only
//! ever sees trait objects, so the variants can be mixed freely in a
//! match.

mod independent_q;
mod minimax_q;
mod particle;
mod stationary;

use crate::errors::AgentError;
use crate::strategy::Strategy;

/// Multiplicative decay applied to a learner's step size after every
/// committed update.
pub(crate) const ALPHA_DECAY: f64 = 0.999_995_4;

/// The trait a playing strategy implements to participate in a
/// simulation, generic over the game's state type.
///
/// The simulation drives a fixed call pattern each step: both agents
/// `act` on the current state, the game resolves the joint action, and
/// then each trainable agent gets one `update` with the full transition.
/// `done` is called exactly once, after the final step.
pub trait Agent<S> {
    /// Which seat this agent plays, `0` or `1`.
    fn player(&self) -> usize;

    /// A short name identifying the agent variant. Also the stem of the
    /// file the agent persists its model under.
    fn name(&self) -> &str;

    /// How many actions this agent chooses between.
    fn num_actions(&self) -> usize;

    /// How many actions the opponent chooses between.
    fn opp_num_actions(&self) -> usize;

    /// Whether the simulation should feed transitions back into this
    /// agent. Loaded models report `false` and play greedily.
    fn is_trainable(&self) -> bool;

    /// Choose an action at `state`.
    fn act(&mut self, state: &S) -> usize;

    /// Learn from one transition: this agent played `action`, the
    /// opponent played `opp_action`, and the game paid `reward` while
    /// moving to `next_state`.
    ///
    /// An update either commits entirely or returns an error leaving the
    /// agent's learned state untouched.
    fn update(
        &mut self,
        state: &S,
        action: usize,
        opp_action: usize,
        reward: f64,
        next_state: &S,
    ) -> Result<(), AgentError>;

    /// The agent's current strategy at `state`, without exploration.
    fn policy(&mut self, state: &S) -> Strategy;

    /// Called once when the simulation ends. Trainable agents with a
    /// model store persist their tables here.
    fn done(&mut self) -> Result<(), AgentError>;
}

/// Index of the largest value, breaking ties toward the earliest index.
pub(crate) fn argmax(values: &[f64]) -> usize {
    debug_assert!(!values.is_empty());
    let mut best = 0;
    for (idx, &value) in values.iter().enumerate().skip(1) {
        if value > values[best] {
            best = idx;
        }
    }
    best
}

pub use independent_q::IndependentQAgent;
pub use minimax_q::MinimaxQAgent;
pub use particle::{Particle, ParticleFilterAgent};
pub use stationary::{RandomAgent, StationaryAgent};
