//! Small helpers shared by tests, benchmarks, and examples.

use approx::assert_abs_diff_eq;

use crate::game::Game;
use crate::strategy::Strategy;

/// Matching pennies on a two-cell board.
///
/// Both players pick heads or tails; player 0 wins one point on a match
/// and loses one otherwise. The board cell flips every step so there are
/// two distinct states for tabular learners to key on, even though the
/// payoffs in both are identical. The only equilibrium is 50/50 for both
/// players, which makes convergence easy to check.
#[derive(Debug, Clone, Copy)]
pub struct MatchingPennies {
    gamma: f64,
}

impl MatchingPennies {
    pub fn new(gamma: f64) -> Self {
        Self { gamma }
    }
}

impl Default for MatchingPennies {
    fn default() -> Self {
        Self::new(0.9)
    }
}

impl Game for MatchingPennies {
    type State = u8;

    fn num_actions(&self, _player: usize) -> usize {
        2
    }

    fn gamma(&self) -> f64 {
        self.gamma
    }

    fn initial_state(&self) -> u8 {
        0
    }

    fn simulate(&mut self, state: &u8, actions: [usize; 2]) -> (u8, [f64; 2]) {
        let reward = if actions[0] == actions[1] { 1.0 } else { -1.0 };
        ((state + 1) % 2, [reward, -reward])
    }
}

/// Panics unless the strategy is a valid probability distribution.
pub fn assert_valid_strategy(strategy: &Strategy) {
    for &p in strategy.probs() {
        assert!((0.0..=1.0).contains(&p), "probability {p} is out of range");
    }
    assert_abs_diff_eq!(1.0, strategy.probs().iter().sum::<f64>(), epsilon = 1e-6);
}

/// Panics unless the two rewards cancel out.
pub fn assert_zero_sum(rewards: [f64; 2]) {
    assert_abs_diff_eq!(0.0, rewards[0] + rewards[1], epsilon = 1e-9);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pennies_rewards() {
        let mut game = MatchingPennies::default();
        let (_, matched) = game.simulate(&0, [1, 1]);
        assert_eq!([1.0, -1.0], matched);
        let (_, mismatched) = game.simulate(&0, [0, 1]);
        assert_eq!([-1.0, 1.0], mismatched);
        assert_zero_sum(matched);
        assert_zero_sum(mismatched);
    }

    #[test]
    fn test_pennies_board_alternates() {
        let mut game = MatchingPennies::default();
        assert_eq!(0, game.initial_state());
        let (next, _) = game.simulate(&0, [0, 0]);
        assert_eq!(1, next);
        let (back, _) = game.simulate(&next, [0, 1]);
        assert_eq!(0, back);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_invalid_strategy_is_caught() {
        assert_valid_strategy(&Strategy::new(vec![1.5, -0.5]));
    }
}
