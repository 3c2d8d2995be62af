use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::event;

use super::Agent;
use crate::errors::AgentError;
use crate::game::GameParams;
use crate::strategy::Strategy;

/// An agent that plays one fixed mixed strategy forever.
///
/// Useful as a known-quantity opponent when training or evaluating a
/// learner. It ignores every transition it is shown.
#[derive(Debug)]
pub struct StationaryAgent {
    player: usize,
    opp_num_actions: usize,
    strategy: Strategy,
    rng: StdRng,
}

impl StationaryAgent {
    pub fn new(player: usize, params: GameParams, strategy: Strategy) -> Self {
        assert_eq!(
            params.num_actions(player),
            strategy.num_actions(),
            "strategy must cover the player's action set"
        );
        Self {
            player,
            opp_num_actions: params.opp_num_actions(player),
            strategy,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Replace the os-seeded rng with a deterministic one.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }
}

impl<S> Agent<S> for StationaryAgent {
    fn player(&self) -> usize {
        self.player
    }

    fn name(&self) -> &str {
        "stationary"
    }

    fn num_actions(&self) -> usize {
        self.strategy.num_actions()
    }

    fn opp_num_actions(&self) -> usize {
        self.opp_num_actions
    }

    fn is_trainable(&self) -> bool {
        false
    }

    fn act(&mut self, _state: &S) -> usize {
        self.strategy.sample(&mut self.rng)
    }

    fn update(
        &mut self,
        _state: &S,
        _action: usize,
        _opp_action: usize,
        _reward: f64,
        _next_state: &S,
    ) -> Result<(), AgentError> {
        Ok(())
    }

    fn policy(&mut self, _state: &S) -> Strategy {
        self.strategy.clone()
    }

    fn done(&mut self) -> Result<(), AgentError> {
        event!(tracing::Level::INFO, "agent stationary_{} done", self.player);
        Ok(())
    }
}

/// A stationary agent locked to the uniform distribution.
#[derive(Debug)]
pub struct RandomAgent(StationaryAgent);

impl RandomAgent {
    pub fn new(player: usize, params: GameParams) -> Self {
        let uniform = Strategy::uniform(params.num_actions(player));
        Self(StationaryAgent::new(player, params, uniform))
    }

    pub fn with_seed(self, seed: u64) -> Self {
        Self(self.0.with_seed(seed))
    }
}

impl<S> Agent<S> for RandomAgent {
    fn player(&self) -> usize {
        Agent::<S>::player(&self.0)
    }

    fn name(&self) -> &str {
        "random"
    }

    fn num_actions(&self) -> usize {
        Agent::<S>::num_actions(&self.0)
    }

    fn opp_num_actions(&self) -> usize {
        Agent::<S>::opp_num_actions(&self.0)
    }

    fn is_trainable(&self) -> bool {
        false
    }

    fn act(&mut self, state: &S) -> usize {
        self.0.act(state)
    }

    fn update(
        &mut self,
        state: &S,
        action: usize,
        opp_action: usize,
        reward: f64,
        next_state: &S,
    ) -> Result<(), AgentError> {
        self.0.update(state, action, opp_action, reward, next_state)
    }

    fn policy(&mut self, state: &S) -> Strategy {
        self.0.policy(state)
    }

    fn done(&mut self) -> Result<(), AgentError> {
        event!(
            tracing::Level::INFO,
            "agent random_{} done",
            Agent::<S>::player(&self.0)
        );
        Ok(())
    }
}
