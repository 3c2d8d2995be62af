use std::collections::HashMap;
use std::hash::Hash;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::event;

use super::{ALPHA_DECAY, Agent, argmax};
use crate::errors::AgentError;
use crate::game::GameParams;
use crate::store::ModelStore;
use crate::strategy::Strategy;

const MODEL_NAME: &str = "q";
const DEFAULT_EPSILON: f64 = 0.2;
const DEFAULT_ALPHA: f64 = 1.0;

/// Tabular Q-learning that treats the opponent as part of the
/// environment.
///
/// The table keys rows on states it has actually seen; a row for an
/// unseen state is initialized with uniform random values in `[0, 1)` on
/// first touch, whether that touch comes from acting, updating, or
/// reading the policy. Exploration and the learning rate both apply only
/// while the agent is trainable.
#[derive(Debug)]
pub struct IndependentQAgent<S> {
    player: usize,
    gamma: f64,
    num_actions: usize,
    opp_num_actions: usize,
    epsilon: f64,
    alpha: f64,
    train: bool,
    q: HashMap<S, Vec<f64>>,
    store: Option<ModelStore>,
    rng: StdRng,
}

impl<S: Clone + Eq + Hash> IndependentQAgent<S> {
    /// A fresh trainable agent with an empty table.
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
            store: None,
            rng: StdRng::from_os_rng(),
        }
    }

    /// A frozen agent restored from a previous save. It plays greedily
    /// and skips updates.
    pub fn load(player: usize, params: GameParams, store: ModelStore) -> Result<Self, AgentError>
    where
        S: DeserializeOwned,
    {
        let table: Vec<(S, Vec<f64>)> = store.load(MODEL_NAME, player)?;
        let mut agent = Self::new(player, params);
        agent.train = false;
        agent.q = table.into_iter().collect();
        agent.store = Some(store);
        Ok(agent)
    }

    /// Persist the learned table through this store when the simulation
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

    /// The Q row for `state`, creating it on first touch.
    fn q_row(&mut self, state: &S) -> &mut Vec<f64> {
        let num_actions = self.num_actions;
        let rng = &mut self.rng;
        self.q
            .entry(state.clone())
            .or_insert_with(|| (0..num_actions).map(|_| rng.random::<f64>()).collect())
    }
}

impl<S: Clone + Eq + Hash + Serialize> Agent<S> for IndependentQAgent<S> {
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
            self.rng.random_range(0..self.num_actions)
        } else {
            argmax(self.q_row(state))
        }
    }

    fn update(
        &mut self,
        state: &S,
        action: usize,
        _opp_action: usize,
        reward: f64,
        next_state: &S,
    ) -> Result<(), AgentError> {
        // Bootstrap from the successor row before touching the current
        // one, so a self-transition reads pre-update values.
        let bootstrap = self
            .q_row(next_state)
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        let target = reward + self.gamma * bootstrap;
        let alpha = self.alpha;
        let row = self.q_row(state);
        row[action] += alpha * (target - row[action]);
        self.alpha *= ALPHA_DECAY;
        Ok(())
    }

    fn policy(&mut self, state: &S) -> Strategy {
        let row = self.q_row(state);
        let mut pi = vec![0.0; row.len()];
        pi[argmax(row)] = 1.0;
        Strategy::new(pi)
    }

    fn done(&mut self) -> Result<(), AgentError> {
        event!(
            tracing::Level::INFO,
            "agent q_{} done with alpha {}",
            self.player,
            self.alpha
        );
        if self.train {
            if let Some(store) = &self.store {
                let table: Vec<(&S, &Vec<f64>)> = self.q.iter().collect();
                store.save(MODEL_NAME, self.player, &table)?;
            }
        }
        Ok(())
    }
}
