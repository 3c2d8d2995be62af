use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use serde::{Deserialize, Serialize};

use crate::errors::StrategyError;

/// An explicit mixed strategy over a fixed, dense set of actions.
///
/// The probability vector always has one entry per action and always sums
/// to one. The action count is fixed at construction; learning code swaps
/// the whole vector at once via [`Strategy::replace`] rather than editing
/// entries in place, so a strategy is never observable in a half-updated
/// state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    pi: Vec<f64>,
}

impl Strategy {
    /// The uniform distribution over `num_actions` actions.
    pub fn uniform(num_actions: usize) -> Self {
        debug_assert!(num_actions > 0, "a strategy needs at least one action");
        Self {
            pi: vec![1.0 / num_actions as f64; num_actions],
        }
    }

    /// A strategy from an explicit probability vector.
    pub fn new(pi: Vec<f64>) -> Self {
        debug_assert!(!pi.is_empty(), "a strategy needs at least one action");
        debug_assert!(
            (pi.iter().sum::<f64>() - 1.0).abs() < 1e-6,
            "probabilities should sum to one"
        );
        Self { pi }
    }

    /// A random point on the probability simplex, drawn by normalizing
    /// uniform weights.
    pub fn random<R: Rng>(num_actions: usize, rng: &mut R) -> Self {
        let mut weights: Vec<f64> = (0..num_actions).map(|_| rng.random::<f64>()).collect();
        let total: f64 = weights.iter().sum();
        if total <= f64::EPSILON {
            return Self::uniform(num_actions);
        }
        for weight in &mut weights {
            *weight /= total;
        }
        Self { pi: weights }
    }

    /// How many actions this strategy covers.
    pub fn num_actions(&self) -> usize {
        self.pi.len()
    }

    /// The full probability vector, indexed by action.
    pub fn probs(&self) -> &[f64] {
        &self.pi
    }

    /// The probability of playing a single action.
    pub fn prob(&self, action: usize) -> f64 {
        self.pi[action]
    }

    /// Draw an action index according to the current probabilities. The
    /// weights are re-read on every call, so a sample taken after a
    /// [`Strategy::replace`] always reflects the replacement.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> usize {
        let dist = WeightedIndex::new(&self.pi).expect("probabilities sum to one");
        dist.sample(rng)
    }

    /// Swap in a full replacement distribution.
    ///
    /// The replacement must cover exactly the same action set. On error
    /// the current probabilities are left untouched.
    pub fn replace(&mut self, new_pi: Vec<f64>) -> Result<(), StrategyError> {
        if new_pi.len() != self.pi.len() {
            return Err(StrategyError::InvalidDistribution {
                expected: self.pi.len(),
                got: new_pi.len(),
            });
        }
        debug_assert!(
            (new_pi.iter().sum::<f64>() - 1.0).abs() < 1e-6,
            "probabilities should sum to one"
        );
        self.pi = new_pi;
        Ok(())
    }

    /// Euclidean distance between two strategies' probability vectors.
    /// Useful as a convergence diagnostic against a known equilibrium.
    pub fn distance(&self, other: &Strategy) -> f64 {
        debug_assert_eq!(self.pi.len(), other.pi.len());
        self.pi
            .iter()
            .zip(other.pi.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }
}
