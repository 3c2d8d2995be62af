//! `markov_games` is a library for training and evaluating learning
//! agents in two-player stochastic games.
//!
//! A game exposes its dynamics through the [`game::Game`] trait and a
//! [`simulation::MarkovSimulation`] plays it out step by step between two
//! boxed [`agent::Agent`]s. The agents range from fixed mixed strategies
//! through independent tabular Q-learning up to minimax-Q, which re-solves
//! a maximin linear program after every table write, and a particle-filter
//! agent that searches strategy space directly. Learned models can be
//! saved to and restored from JSON files through [`store::ModelStore`].
//!
//! # Quick Start
//!
//! Define a game, pick two agents, and let the builder wire them up:
//!
//! ```
//! use markov_games::agent::{Agent, MinimaxQAgent, RandomAgent};
//! use markov_games::game::{Game, GameParams};
//! use markov_games::sim_builder::MarkovSimulationBuilder;
//!
//! struct Pennies;
//!
//! impl Game for Pennies {
//!     type State = u8;
//!
//!     fn num_actions(&self, _player: usize) -> usize {
//!         2
//!     }
//!
//!     fn gamma(&self) -> f64 {
//!         0.9
//!     }
//!
//!     fn initial_state(&self) -> u8 {
//!         0
//!     }
//!
//!     fn simulate(&mut self, _state: &u8, actions: [usize; 2]) -> (u8, [f64; 2]) {
//!         let reward = if actions[0] == actions[1] { 1.0 } else { -1.0 };
//!         (0, [reward, -reward])
//!     }
//! }
//!
//! let params = GameParams::from_game(&Pennies);
//! let agents: Vec<Box<dyn Agent<u8>>> = vec![
//!     Box::new(MinimaxQAgent::<u8>::new(0, params)),
//!     Box::new(RandomAgent::new(1, params)),
//! ];
//!
//! let mut sim = MarkovSimulationBuilder::default()
//!     .game(Pennies)
//!     .agents(agents)
//!     .horizon(100)
//!     .build()
//!     .unwrap();
//!
//! sim.run().unwrap();
//! sim.finish().unwrap();
//! ```
//!
//! Mixed strategies are explicit probability vectors that can be sampled
//! directly:
//!
//! ```
//! use markov_games::strategy::Strategy;
//!
//! let strategy = Strategy::new(vec![0.7, 0.2, 0.1]);
//! let mut rng = rand::rng();
//! assert!(strategy.sample(&mut rng) < 3);
//! ```

pub mod agent;
pub mod errors;
pub mod game;
pub mod sim_builder;
pub mod simulation;
pub mod solver;
pub mod store;
pub mod strategy;

#[cfg(any(test, feature = "test-util"))]
pub mod test_util;
