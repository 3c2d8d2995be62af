use crate::agent::Agent;
use crate::errors::MarkovSimulationError;
use crate::game::Game;
use crate::simulation::MarkovSimulation;

const DEFAULT_HORIZON: usize = 1000;

/// Builder for [`MarkovSimulation`].
///
/// A game and exactly two agents are required, and each agent has to
/// sit in the seat matching its player index. The horizon defaults to
/// 1000 steps. The starting state always comes from the game itself.
pub struct MarkovSimulationBuilder<G: Game> {
    game: Option<G>,
    agents: Option<Vec<Box<dyn Agent<G::State>>>>,
    horizon: Option<usize>,
}

impl<G: Game> Default for MarkovSimulationBuilder<G> {
    fn default() -> Self {
        Self {
            game: None,
            agents: None,
            horizon: None,
        }
    }
}

impl<G: Game> MarkovSimulationBuilder<G> {
    pub fn game(mut self, game: G) -> Self {
        self.game = Some(game);
        self
    }

    pub fn agents(mut self, agents: Vec<Box<dyn Agent<G::State>>>) -> Self {
        self.agents = Some(agents);
        self
    }

    pub fn horizon(mut self, horizon: usize) -> Self {
        self.horizon = Some(horizon);
        self
    }

    pub fn build(self) -> Result<MarkovSimulation<G>, MarkovSimulationError> {
        let game = self.game.ok_or(MarkovSimulationError::NeedGame)?;
        let agents = self.agents.ok_or(MarkovSimulationError::NeedAgents)?;
        if agents.len() != 2 {
            return Err(MarkovSimulationError::AgentCount(agents.len()));
        }
        for (seat, agent) in agents.iter().enumerate() {
            if agent.player() != seat {
                return Err(MarkovSimulationError::AgentPlayerMismatch {
                    seat,
                    player: agent.player(),
                });
            }
        }
        Ok(MarkovSimulation::new(
            game,
            agents,
            self.horizon.unwrap_or(DEFAULT_HORIZON),
        ))
    }
}
