use std::fmt;

use tracing::{event, trace_span};

use crate::agent::Agent;
use crate::errors::MarkovSimulationError;
use crate::game::Game;

/// A repeated two-player Markov game between boxed agents.
///
/// The simulation owns the only copy of the current state and drives the
/// fixed step pattern: both agents act on the same state, the game
/// resolves the joint action, and each trainable agent sees the full
/// transition from its own side before the state advances. Agents never
/// hold a reference back into the game or the simulation.
pub struct MarkovSimulation<G: Game> {
    pub game: G,
    agents: Vec<Box<dyn Agent<G::State>>>,
    pub state: G::State,
    pub horizon: usize,
    pub steps: usize,
}

impl<G: Game> MarkovSimulation<G> {
    /// Seat checks live in [`crate::sim_builder::MarkovSimulationBuilder`];
    /// `step` trusts that agent `i` sits in seat `i`.
    pub(crate) fn new(game: G, agents: Vec<Box<dyn Agent<G::State>>>, horizon: usize) -> Self {
        let state = game.initial_state();
        Self {
            game,
            agents,
            state,
            horizon,
            steps: 0,
        }
    }

    /// The seated agents, in player order.
    pub fn agents_mut(&mut self) -> &mut [Box<dyn Agent<G::State>>] {
        &mut self.agents
    }

    /// True while the simulation has not yet played out its horizon.
    pub fn more_steps(&self) -> bool {
        self.steps < self.horizon
    }

    /// Play all remaining steps.
    pub fn run(&mut self) -> Result<(), MarkovSimulationError> {
        let span = trace_span!("MarkovSimulation::run");
        let _enter = span.enter();
        while self.more_steps() {
            self.step()?;
        }
        event!(
            tracing::Level::INFO,
            "simulation finished after {} steps",
            self.steps
        );
        Ok(())
    }

    /// Play one step of the game.
    pub fn step(&mut self) -> Result<(), MarkovSimulationError> {
        let actions = [
            self.agents[0].act(&self.state),
            self.agents[1].act(&self.state),
        ];
        let (next_state, rewards) = self.game.simulate(&self.state, actions);
        event!(
            tracing::Level::TRACE,
            "step {}: actions {:?} rewards {:?}",
            self.steps,
            actions,
            rewards
        );

        for player in 0..2 {
            if self.agents[player].is_trainable() {
                self.agents[player].update(
                    &self.state,
                    actions[player],
                    actions[1 - player],
                    rewards[player],
                    &next_state,
                )?;
            }
        }

        self.state = next_state;
        self.steps += 1;
        Ok(())
    }

    /// Tell every agent the match is over, consuming the simulation.
    /// Agents that persist models do so here.
    pub fn finish(self) -> Result<(), MarkovSimulationError> {
        for mut agent in self.agents {
            agent.done()?;
        }
        Ok(())
    }
}

impl<G: Game> fmt::Debug for MarkovSimulation<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkovSimulation")
            .field("state", &self.state)
            .field("horizon", &self.horizon)
            .field("steps", &self.steps)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;
    use crate::agent::{MinimaxQAgent, RandomAgent};
    use crate::errors::AgentError;
    use crate::game::GameParams;
    use crate::sim_builder::MarkovSimulationBuilder;
    use crate::strategy::Strategy;
    use crate::test_util::{MatchingPennies, assert_valid_strategy};

    type TransitionLog = Rc<RefCell<Vec<(u8, usize, usize, f64, u8)>>>;

    /// Plays a fixed action and records every transition it is shown.
    struct ProbeAgent {
        player: usize,
        action: usize,
        train: bool,
        log: TransitionLog,
        dones: Rc<Cell<usize>>,
    }

    impl ProbeAgent {
        fn boxed(
            player: usize,
            action: usize,
            train: bool,
        ) -> (Box<Self>, TransitionLog, Rc<Cell<usize>>) {
            let log = Rc::new(RefCell::new(Vec::new()));
            let dones = Rc::new(Cell::new(0));
            let agent = Box::new(ProbeAgent {
                player,
                action,
                train,
                log: log.clone(),
                dones: dones.clone(),
            });
            (agent, log, dones)
        }
    }

    impl Agent<u8> for ProbeAgent {
        fn player(&self) -> usize {
            self.player
        }

        fn name(&self) -> &str {
            "probe"
        }

        fn num_actions(&self) -> usize {
            2
        }

        fn opp_num_actions(&self) -> usize {
            2
        }

        fn is_trainable(&self) -> bool {
            self.train
        }

        fn act(&mut self, _state: &u8) -> usize {
            self.action
        }

        fn update(
            &mut self,
            state: &u8,
            action: usize,
            opp_action: usize,
            reward: f64,
            next_state: &u8,
        ) -> Result<(), AgentError> {
            self.log
                .borrow_mut()
                .push((*state, action, opp_action, reward, *next_state));
            Ok(())
        }

        fn policy(&mut self, _state: &u8) -> Strategy {
            Strategy::uniform(2)
        }

        fn done(&mut self) -> Result<(), AgentError> {
            self.dones.set(self.dones.get() + 1);
            Ok(())
        }
    }

    #[test]
    fn test_run_plays_out_the_horizon() {
        let game = MatchingPennies::default();
        let params = GameParams::from_game(&game);
        let agents: Vec<Box<dyn Agent<u8>>> = vec![
            Box::new(RandomAgent::new(0, params).with_seed(420)),
            Box::new(RandomAgent::new(1, params).with_seed(421)),
        ];
        let mut sim = MarkovSimulationBuilder::default()
            .game(game)
            .agents(agents)
            .horizon(25)
            .build()
            .unwrap();

        sim.run().unwrap();
        assert_eq!(25, sim.steps);
        assert!(!sim.more_steps());
        // The pennies board alternates, so an odd horizon ends off the
        // initial state.
        assert_eq!(1, sim.state);
    }

    #[test]
    fn test_step_feeds_each_agent_its_own_view() {
        let (probe0, log0, _) = ProbeAgent::boxed(0, 0, true);
        let (probe1, log1, _) = ProbeAgent::boxed(1, 1, true);
        let mut sim = MarkovSimulationBuilder::default()
            .game(MatchingPennies::default())
            .agents(vec![probe0, probe1])
            .horizon(2)
            .build()
            .unwrap();

        sim.run().unwrap();

        // Player 0 played 0 against 1 and lost both steps.
        assert_eq!(
            vec![(0, 0, 1, -1.0, 1), (1, 0, 1, -1.0, 0)],
            log0.borrow().clone()
        );
        // Player 1 saw the mirrored transition.
        assert_eq!(
            vec![(0, 1, 0, 1.0, 1), (1, 1, 0, 1.0, 0)],
            log1.borrow().clone()
        );
    }

    #[test]
    fn test_non_trainable_agents_are_never_updated() {
        let (probe0, log0, _) = ProbeAgent::boxed(0, 0, false);
        let (probe1, log1, _) = ProbeAgent::boxed(1, 1, true);
        let mut sim = MarkovSimulationBuilder::default()
            .game(MatchingPennies::default())
            .agents(vec![probe0, probe1])
            .horizon(10)
            .build()
            .unwrap();

        sim.run().unwrap();
        assert!(log0.borrow().is_empty());
        assert_eq!(10, log1.borrow().len());
    }

    #[test]
    fn test_agents_mut_exposes_the_seats_in_order() {
        let game = MatchingPennies::default();
        let params = GameParams::from_game(&game);
        let agents: Vec<Box<dyn Agent<u8>>> = vec![
            Box::new(RandomAgent::new(0, params).with_seed(420)),
            Box::new(RandomAgent::new(1, params).with_seed(421)),
        ];
        let mut sim = MarkovSimulationBuilder::default()
            .game(game)
            .agents(agents)
            .build()
            .unwrap();

        let seats: Vec<usize> = sim.agents_mut().iter().map(|agent| agent.player()).collect();
        assert_eq!(vec![0, 1], seats);
    }

    #[test]
    fn test_debug_format_reports_progress_without_agents() {
        let (probe0, _, _) = ProbeAgent::boxed(0, 0, false);
        let (probe1, _, _) = ProbeAgent::boxed(1, 1, false);
        let mut sim = MarkovSimulationBuilder::default()
            .game(MatchingPennies::default())
            .agents(vec![probe0, probe1])
            .horizon(3)
            .build()
            .unwrap();

        sim.step().unwrap();
        let repr = format!("{sim:?}");
        assert!(repr.starts_with("MarkovSimulation"));
        assert!(repr.contains("steps: 1"));
        assert!(!repr.contains("agents"));
    }

    #[test]
    fn test_finish_tells_every_agent_once() {
        let (probe0, _, dones0) = ProbeAgent::boxed(0, 0, true);
        let (probe1, _, dones1) = ProbeAgent::boxed(1, 1, true);
        let mut sim = MarkovSimulationBuilder::default()
            .game(MatchingPennies::default())
            .agents(vec![probe0, probe1])
            .horizon(1)
            .build()
            .unwrap();

        sim.run().unwrap();
        sim.finish().unwrap();
        assert_eq!(1, dones0.get());
        assert_eq!(1, dones1.get());
    }

    #[test_log::test]
    fn test_minimax_self_play_finds_the_mixed_equilibrium() {
        let game = MatchingPennies::default();
        let params = GameParams::from_game(&game);
        let agents: Vec<Box<dyn Agent<u8>>> = vec![
            Box::new(MinimaxQAgent::<u8>::new(0, params).with_seed(420)),
            Box::new(MinimaxQAgent::<u8>::new(1, params).with_seed(421)),
        ];
        let mut sim = MarkovSimulationBuilder::default()
            .game(game)
            .agents(agents)
            .horizon(1000)
            .build()
            .unwrap();

        sim.run().unwrap();

        // Matching pennies only has the fully mixed equilibrium, so both
        // players should be close to 50/50 in both states.
        for state in [0u8, 1] {
            for agent in sim.agents_mut().iter_mut() {
                let policy = agent.policy(&state);
                assert_valid_strategy(&policy);
                for &p in policy.probs() {
                    assert!(
                        (p - 0.5).abs() < 0.1,
                        "state {} policy {:?} is too far from uniform",
                        state,
                        policy.probs()
                    );
                }
            }
        }
    }
}
