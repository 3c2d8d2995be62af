use minilp::{ComparisonOp, LinearExpr, OptimizationDirection, Problem, Variable};
use ndarray::ArrayView2;

use crate::errors::SolverError;

/// An optimal mixed strategy for the row player together with the payoff
/// it guarantees against a worst-case column response.
#[derive(Debug, Clone, PartialEq)]
pub struct Equilibrium {
    pub value: f64,
    pub strategy: Vec<f64>,
}

/// The seam between learning code and whatever optimizer computes
/// equilibrium strategies.
///
/// Learners hold a solver chosen at construction and treat every failure
/// as fatal for the triggering update. There is no fallback backend, so a
/// misconfigured solver surfaces on the first solve instead of silently
/// degrading the learned strategy.
pub trait EquilibriumSolver {
    /// Solve `max_pi min_o sum_a pi[a] * payoffs[a][o]` over the
    /// probability simplex. Rows index the maximizing player's actions,
    /// columns the opponent's.
    fn maximin(&self, payoffs: ArrayView2<f64>) -> Result<Equilibrium, SolverError>;
}

/// Maximin solver backed by the `minilp` simplex implementation.
///
/// The standard LP formulation: maximize a free variable `v` subject to
/// the strategy guaranteeing at least `v` against every opponent column,
/// with the strategy weights constrained to the probability simplex.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimplexSolver;

impl EquilibriumSolver for SimplexSolver {
    fn maximin(&self, payoffs: ArrayView2<f64>) -> Result<Equilibrium, SolverError> {
        let (num_actions, opp_num_actions) = payoffs.dim();
        debug_assert!(num_actions > 0 && opp_num_actions > 0);

        let mut problem = Problem::new(OptimizationDirection::Maximize);
        let value = problem.add_var(1.0, (f64::NEG_INFINITY, f64::INFINITY));
        let weights: Vec<Variable> = (0..num_actions)
            .map(|_| problem.add_var(0.0, (0.0, 1.0)))
            .collect();

        // One guarantee constraint per opponent column.
        for opp_action in 0..opp_num_actions {
            let mut guarantee = LinearExpr::empty();
            for (action, &weight) in weights.iter().enumerate() {
                guarantee.add(weight, payoffs[[action, opp_action]]);
            }
            guarantee.add(value, -1.0);
            problem.add_constraint(guarantee, ComparisonOp::Ge, 0.0);
        }

        // The weights form a probability distribution.
        let mut simplex = LinearExpr::empty();
        for &weight in &weights {
            simplex.add(weight, 1.0);
        }
        problem.add_constraint(simplex, ComparisonOp::Eq, 1.0);

        let solution = problem
            .solve()
            .map_err(|e| SolverError::NoSolution(e.to_string()))?;
        // Basic variables can land a rounding error outside their bounds.
        let strategy = weights
            .iter()
            .map(|&weight| solution[weight].clamp(0.0, 1.0))
            .collect();
        Ok(Equilibrium {
            value: solution.objective(),
            strategy,
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::array;

    use super::*;

    #[test]
    fn test_maximin_equalizing_matrix() {
        let payoffs = array![[3.0, -1.0], [-2.0, 1.0]];
        let eq = SimplexSolver.maximin(payoffs.view()).unwrap();
        // The optimal mix equalizes the two column payoffs at 1/7.
        assert_relative_eq!(1.0 / 7.0, eq.value, epsilon = 1e-6);
        assert_relative_eq!(3.0 / 7.0, eq.strategy[0], epsilon = 1e-6);
        assert_relative_eq!(4.0 / 7.0, eq.strategy[1], epsilon = 1e-6);
    }

    #[test]
    fn test_maximin_rock_paper_scissors() {
        let payoffs = array![[0.0, -1.0, 1.0], [1.0, 0.0, -1.0], [-1.0, 1.0, 0.0]];
        let eq = SimplexSolver.maximin(payoffs.view()).unwrap();
        assert_relative_eq!(0.0, eq.value, epsilon = 1e-6);
        for weight in eq.strategy {
            assert_relative_eq!(1.0 / 3.0, weight, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_maximin_dominant_row() {
        let payoffs = array![[1.0, 1.0], [0.0, 0.0]];
        let eq = SimplexSolver.maximin(payoffs.view()).unwrap();
        assert_relative_eq!(1.0, eq.value, epsilon = 1e-6);
        assert_relative_eq!(1.0, eq.strategy[0], epsilon = 1e-6);
        assert_relative_eq!(0.0, eq.strategy[1], epsilon = 1e-6);
    }

    #[test]
    fn test_maximin_rectangular_matrix() {
        // Three opponent responses against two actions. The all-zero
        // column pins the value at zero and the other two force an even
        // mix.
        let payoffs = array![[1.0, -1.0, 0.0], [-1.0, 1.0, 0.0]];
        let eq = SimplexSolver.maximin(payoffs.view()).unwrap();
        assert_relative_eq!(0.0, eq.value, epsilon = 1e-6);
        assert_relative_eq!(0.5, eq.strategy[0], epsilon = 1e-6);
        assert_relative_eq!(0.5, eq.strategy[1], epsilon = 1e-6);
    }

    #[test]
    fn test_strategy_stays_on_the_simplex() {
        let payoffs = array![[2.5, -0.5], [0.25, 1.75]];
        let eq = SimplexSolver.maximin(payoffs.view()).unwrap();
        assert_eq!(2, eq.strategy.len());
        assert!(eq.strategy.iter().all(|&w| (-1e-9..=1.0 + 1e-9).contains(&w)));
        assert_relative_eq!(1.0, eq.strategy.iter().sum::<f64>(), epsilon = 1e-6);
    }
}
