use std::cmp::Ordering;

use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::event;

use super::{Agent, argmax};
use crate::errors::AgentError;
use crate::game::GameParams;
use crate::strategy::Strategy;

const DEFAULT_NUM_PARTICLES: usize = 25;
const DEFAULT_EPSILON: f64 = 0.1;
const DEFAULT_ALPHA: f64 = 0.01;

/// One hypothesis about how to play: a candidate mixed strategy plus a
/// per-opponent-action payoff estimate `k` for following it.
#[derive(Debug, Clone)]
pub struct Particle {
    strategy: Strategy,
    k: Vec<f64>,
    weight: f64,
}

impl Particle {
    fn random(num_actions: usize, opp_num_actions: usize, weight: f64, rng: &mut StdRng) -> Self {
        Self {
            strategy: Strategy::random(num_actions, rng),
            k: (0..opp_num_actions).map(|_| rng.random::<f64>()).collect(),
            weight,
        }
    }

    /// The hypothesis' worst-case estimate across opponent actions.
    pub fn val(&self) -> f64 {
        self.k.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }
}

/// A particle-filter agent that keeps a population of candidate
/// strategies instead of a value table.
///
/// Acting picks the particle with the best worst-case estimate (or a
/// uniformly random one while exploring) and samples its strategy. Every
/// particle learns from every observed transition, importance-weighted by
/// how likely it was to have produced the taken action relative to the
/// particle that actually acted. The whole population is state-agnostic,
/// so the agent works in any game without keying on states.
#[derive(Debug)]
pub struct ParticleFilterAgent {
    player: usize,
    gamma: f64,
    num_actions: usize,
    opp_num_actions: usize,
    epsilon: f64,
    alpha: f64,
    train: bool,
    resample: bool,
    particles: Vec<Particle>,
    acting: Option<usize>,
    rng: StdRng,
}

impl ParticleFilterAgent {
    pub fn new(player: usize, params: GameParams) -> Self {
        Self::new_with_population(player, params, DEFAULT_NUM_PARTICLES)
    }

    pub fn new_with_population(player: usize, params: GameParams, num_particles: usize) -> Self {
        assert!(num_particles > 0, "need at least one particle");
        let mut agent = Self {
            player,
            gamma: params.gamma(),
            num_actions: params.num_actions(player),
            opp_num_actions: params.opp_num_actions(player),
            epsilon: DEFAULT_EPSILON,
            alpha: DEFAULT_ALPHA,
            train: true,
            resample: false,
            particles: Vec::new(),
            acting: None,
            rng: StdRng::from_os_rng(),
        };
        agent.reset_population(num_particles);
        agent
    }

    /// Replace the os-seeded rng with a deterministic one and redraw the
    /// population from it.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        let num_particles = self.particles.len();
        self.reset_population(num_particles);
        self
    }

    /// Turn multinomial resampling after each update on or off.
    pub fn with_resampling(mut self, resample: bool) -> Self {
        self.resample = resample;
        self
    }

    /// Override the exploration rate.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Override the learning rate.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Freeze or unfreeze learning and exploration.
    pub fn with_training(mut self, train: bool) -> Self {
        self.train = train;
        self
    }

    /// The current particle population.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    fn reset_population(&mut self, num_particles: usize) {
        let weight = 1.0 / num_particles as f64;
        self.particles = (0..num_particles)
            .map(|_| {
                Particle::random(self.num_actions, self.opp_num_actions, weight, &mut self.rng)
            })
            .collect();
        // Pin the last particle to uniform so the population always
        // contains a fully mixed candidate.
        if let Some(last) = self.particles.last_mut() {
            last.strategy = Strategy::uniform(self.num_actions);
        }
        self.acting = None;
    }

    fn best_particle(&self) -> usize {
        let vals: Vec<f64> = self.particles.iter().map(Particle::val).collect();
        argmax(&vals)
    }

    /// Draw a fresh population by sampling particles in proportion to
    /// the probability they give the taken action. Survivors restart at
    /// uniform weight.
    fn resample_population(&mut self, action: usize) {
        let weights: Vec<f64> = self
            .particles
            .iter()
            .map(|particle| particle.strategy.prob(action))
            .collect();
        let dist = WeightedIndex::new(&weights)
            .expect("the acting particle gives the taken action positive probability");
        let num_particles = self.particles.len();
        let weight = 1.0 / num_particles as f64;
        let survivors = (0..num_particles)
            .map(|_| {
                let mut particle = self.particles[dist.sample(&mut self.rng)].clone();
                particle.weight = weight;
                particle
            })
            .collect();
        self.particles = survivors;
        // Indexes into the old population do not survive the rebuild.
        self.acting = None;
    }

    /// Log the population sorted by distance from the uniform strategy,
    /// closest first.
    pub fn report(&self) {
        let uniform = Strategy::uniform(self.num_actions);
        let mut lines: Vec<(f64, f64, &Particle)> = self
            .particles
            .iter()
            .map(|particle| (particle.strategy.distance(&uniform), particle.val(), particle))
            .collect();
        lines.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
        for (idx, (distance, val, particle)) in lines.iter().enumerate() {
            event!(
                tracing::Level::DEBUG,
                "particle {}: distance {:.4} val {:.4} strategy {:?}",
                idx,
                distance,
                val,
                particle.strategy.probs()
            );
        }
    }
}

impl<S> Agent<S> for ParticleFilterAgent {
    fn player(&self) -> usize {
        self.player
    }

    fn name(&self) -> &str {
        "kappa"
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

    fn act(&mut self, _state: &S) -> usize {
        let acting = if self.train && self.rng.random_bool(self.epsilon) {
            self.rng.random_range(0..self.particles.len())
        } else {
            self.best_particle()
        };
        self.acting = Some(acting);
        let strategy = &self.particles[acting].strategy;
        strategy.sample(&mut self.rng)
    }

    fn update(
        &mut self,
        _state: &S,
        action: usize,
        opp_action: usize,
        reward: f64,
        _next_state: &S,
    ) -> Result<(), AgentError> {
        let acting = self.acting.unwrap_or_else(|| self.best_particle());
        let acting_prob = self.particles[acting].strategy.prob(action);
        if acting_prob <= 0.0 {
            return Err(AgentError::ImpossibleAction { action });
        }

        // One-step sample of the Bellman target under the current best
        // hypothesis, taken before any particle moves.
        let best = self.particles[self.best_particle()].val();
        let target = reward + self.gamma * best;
        let alpha = self.alpha;
        for particle in &mut self.particles {
            let weight = particle.strategy.prob(action) / acting_prob;
            particle.k[opp_action] += alpha * weight * (target - particle.k[opp_action]);
        }

        if self.resample {
            self.resample_population(action);
        }
        Ok(())
    }

    fn policy(&mut self, _state: &S) -> Strategy {
        self.particles[self.best_particle()].strategy.clone()
    }

    fn done(&mut self) -> Result<(), AgentError> {
        event!(tracing::Level::INFO, "agent kappa_{} done", self.player);
        self.report();
        Ok(())
    }
}
