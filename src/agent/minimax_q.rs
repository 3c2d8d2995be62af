use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use ndarray::{Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::event;

use super::{ALPHA_DECAY, Agent};
use crate::errors::AgentError;
use crate::game::GameParams;
use crate::solver::{EquilibriumSolver, SimplexSolver};
use crate::store::ModelStore;
use crate::strategy::Strategy;

const MODEL_NAME: &str = "minimax";
const DEFAULT_EPSILON: f64 = 0.2;
const DEFAULT_ALPHA: f64 = 1.0;

/// Minimax-Q: joint-action Q-learning for zero-sum play.
///
/// Each visited state carries a Q matrix over `(own action, opponent
/// action)` pairs and the maximin mixed strategy for that matrix. After
/// every Q write the equilibrium is re-solved through the configured
/// [`EquilibriumSolver`]; a failed solve aborts the whole update, so the
/// stored strategy always matches the stored matrix.
pub struct MinimaxQAgent<S> {
    player: usize,
    gamma: f64,
    num_actions: usize,
    opp_num_actions: usize,
    epsilon: f64,
    alpha: f64,
    train: bool,
    q: HashMap<S, Array2<f64>>,
    strategies: HashMap<S, Strategy>,
    solver: Box<dyn EquilibriumSolver>,
    store: Option<ModelStore>,
    rng: StdRng,
}

/// Both tables in one file so a partial save can never split them.
#[derive(Serialize, Deserialize)]
struct SavedTables<S> {
    q: Vec<(S, Array2<f64>)>,
    strategies: Vec<(S, Strategy)>,
}

impl<S: Clone + Eq + Hash> MinimaxQAgent<S> {
    /// A fresh trainable agent using the default simplex solver.
    pub fn new(player: usize, params: GameParams) -> Self {
        Self {
            player,
            gamma: params.gamma(),
            num_actions: params.num_actions(player),
            opp_num_actions: params.opp_num_actions(player),
            epsilon: DEFAULT_EPSILON,
            alpha: DEFAULT_ALPHA,
            train: true,
            q: HashMap::new(),
            strategies: HashMap::new(),
            solver: Box::new(SimplexSolver),
            store: None,
            rng: StdRng::from_os_rng(),
        }
    }

    /// A frozen agent restored from a previous save. It plays its saved
    /// equilibrium strategies and skips updates.
    pub fn load(player: usize, params: GameParams, store: ModelStore) -> Result<Self, AgentError>
    where
        S: DeserializeOwned,
    {
        let saved: SavedTables<S> = store.load(MODEL_NAME, player)?;
        let mut agent = Self::new(player, params);
        agent.train = false;
        agent.q = saved.q.into_iter().collect();
        agent.strategies = saved.strategies.into_iter().collect();
        agent.store = Some(store);
        Ok(agent)
    }

    /// Swap in a different equilibrium backend. There is no fallback: if
    /// this solver fails, updates fail.
    pub fn with_solver(mut self, solver: Box<dyn EquilibriumSolver>) -> Self {
        self.solver = solver;
        self
    }

    /// Persist the learned tables through this store when the simulation
    /// finishes.
    pub fn with_store(mut self, store: ModelStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Replace the os-seeded rng with a deterministic one.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Override the exploration rate.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Override the initial learning rate.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// The current learning rate, after any decay so far.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// The state's worst-case expected payoff when playing the stored
    /// strategy against the most punishing opponent response.
    pub fn value(&mut self, state: &S) -> f64 {
        self.ensure_state(state);
        let q = &self.q[state];
        let strategy = ArrayView1::from(self.strategies[state].probs());
        (0..self.opp_num_actions)
            .map(|opp_action| strategy.dot(&q.column(opp_action)))
            .fold(f64::INFINITY, f64::min)
    }

    /// Create the Q matrix and strategy for `state` together on first
    /// touch. The two maps always hold the same key set.
    fn ensure_state(&mut self, state: &S) {
        if !self.q.contains_key(state) {
            let rng = &mut self.rng;
            let q = Array2::from_shape_fn((self.num_actions, self.opp_num_actions), |_| {
                rng.random::<f64>()
            });
            self.q.insert(state.clone(), q);
            self.strategies
                .insert(state.clone(), Strategy::uniform(self.num_actions));
        }
    }
}

impl<S: Clone + Eq + Hash + Serialize> Agent<S> for MinimaxQAgent<S> {
    fn player(&self) -> usize {
        self.player
    }

    fn name(&self) -> &str {
        MODEL_NAME
    }

    fn num_actions(&self) -> usize {
        self.num_actions
    }

    fn opp_num_actions(&self) -> usize {
        self.opp_num_actions
    }

    fn is_trainable(&self) -> bool {
        self.train
    }

    fn act(&mut self, state: &S) -> usize {
        if self.train && self.rng.random_bool(self.epsilon) {
            return self.rng.random_range(0..self.num_actions);
        }
        self.ensure_state(state);
        let strategy = &self.strategies[state];
        strategy.sample(&mut self.rng)
    }

    fn update(
        &mut self,
        state: &S,
        action: usize,
        opp_action: usize,
        reward: f64,
        next_state: &S,
    ) -> Result<(), AgentError> {
        let bootstrap = self.value(next_state);
        self.ensure_state(state);
        let target = reward + self.gamma * bootstrap;

        // Work on a copy and commit everything after the solve succeeds,
        // so a solver failure leaves the table, the strategy, and the
        // learning rate exactly as they were.
        let mut q = self.q[state].clone();
        q[[action, opp_action]] += self.alpha * (target - q[[action, opp_action]]);
        let equilibrium = self.solver.maximin(q.view())?;

        self.strategies
            .get_mut(state)
            .expect("state entry was just ensured")
            .replace(equilibrium.strategy)?;
        self.q.insert(state.clone(), q);
        self.alpha *= ALPHA_DECAY;
        Ok(())
    }

    fn policy(&mut self, state: &S) -> Strategy {
        self.ensure_state(state);
        self.strategies[state].clone()
    }

    fn done(&mut self) -> Result<(), AgentError> {
        event!(
            tracing::Level::INFO,
            "agent minimax_{} done with alpha {}",
            self.player,
            self.alpha
        );
        if self.train {
            if let Some(store) = &self.store {
                let saved = SavedTables {
                    q: self.q.iter().map(|(s, q)| (s.clone(), q.clone())).collect(),
                    strategies: self
                        .strategies
                        .iter()
                        .map(|(s, strategy)| (s.clone(), strategy.clone()))
                        .collect(),
                };
                store.save(MODEL_NAME, self.player, &saved)?;
            }
        }
        Ok(())
    }
}

impl<S: fmt::Debug> fmt::Debug for MinimaxQAgent<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MinimaxQAgent")
            .field("player", &self.player)
            .field("alpha", &self.alpha)
            .field("train", &self.train)
            .field("q", &self.q)
            .field("strategies", &self.strategies)
            .finish()
    }
}
