use std::fmt::Debug;
use std::hash::Hash;

/// A two-player Markov game with a finite, dense action set per player.
///
/// The game owns the transition and reward dynamics but no control flow:
/// [`crate::simulation::MarkovSimulation`] drives the state forward, so
/// `simulate` is a pure step from an explicit state rather than a method
/// that mutates some hidden current position.
pub trait Game {
    /// The environment state the agents condition on. Tabular learners
    /// key their value tables on this type.
    type State: Clone + Eq + Hash + Debug;

    /// How many actions the given player can take. The two players may
    /// have differently sized action sets.
    fn num_actions(&self, player: usize) -> usize;

    /// The discount factor applied to bootstrapped future value.
    fn gamma(&self) -> f64;

    /// The state a fresh simulation starts from.
    fn initial_state(&self) -> Self::State;

    /// Apply one joint action at `state`, returning the successor state
    /// and one reward per player.
    fn simulate(&mut self, state: &Self::State, actions: [usize; 2]) -> (Self::State, [f64; 2]);
}

/// The fixed shape of a game, captured once at agent construction.
///
/// Agents size their tables from this instead of holding a reference back
/// into the game, which keeps them free to outlive the game they were
/// trained on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameParams {
    gamma: f64,
    num_actions: [usize; 2],
}

impl GameParams {
    pub fn new(gamma: f64, num_actions: [usize; 2]) -> Self {
        assert!(
            (0.0..1.0).contains(&gamma),
            "discount factor must be in [0, 1), got {gamma}"
        );
        assert!(
            num_actions.iter().all(|&n| n > 0),
            "every player needs at least one action"
        );
        Self { gamma, num_actions }
    }

    /// Capture the shape of an existing game.
    pub fn from_game<G: Game>(game: &G) -> Self {
        Self::new(game.gamma(), [game.num_actions(0), game.num_actions(1)])
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// The action count for the given player.
    pub fn num_actions(&self, player: usize) -> usize {
        self.num_actions[player]
    }

    /// The action count for the given player's opponent.
    pub fn opp_num_actions(&self, player: usize) -> usize {
        self.num_actions[1 - player]
    }
}
