extern crate markov_games;

use markov_games::agent::{Agent, MinimaxQAgent, ParticleFilterAgent};
use markov_games::game::GameParams;
use markov_games::sim_builder::MarkovSimulationBuilder;
use markov_games::store::ModelStore;
use markov_games::test_util::MatchingPennies;

const TRAIN_STEPS: usize = 5_000;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let game = MatchingPennies::default();
    let params = GameParams::from_game(&game);
    let store = ModelStore::new("models");

    // Self-play between two minimax-Q learners. Both should end up
    // close to the 50/50 equilibrium.
    let agents: Vec<Box<dyn Agent<u8>>> = vec![
        Box::new(MinimaxQAgent::<u8>::new(0, params).with_store(store.clone())),
        Box::new(MinimaxQAgent::<u8>::new(1, params).with_store(store.clone())),
    ];
    let mut sim = MarkovSimulationBuilder::default()
        .game(game)
        .agents(agents)
        .horizon(TRAIN_STEPS)
        .build()
        .expect("simulation should build");
    sim.run().expect("training failed");

    for state in [0u8, 1] {
        for agent in sim.agents_mut().iter_mut() {
            println!(
                "player {} state {}: {:?}",
                agent.player(),
                state,
                agent.policy(&state).probs()
            );
        }
    }
    sim.finish().expect("saving models failed");

    // Reload player 0's saved strategy frozen and pit it against a
    // particle filter that is still learning.
    let frozen = MinimaxQAgent::<u8>::load(0, params, store).expect("model should load");
    let kappa = ParticleFilterAgent::new(1, params).with_resampling(true);
    let agents: Vec<Box<dyn Agent<u8>>> = vec![Box::new(frozen), Box::new(kappa)];
    let mut sim = MarkovSimulationBuilder::default()
        .game(MatchingPennies::default())
        .agents(agents)
        .horizon(1_000)
        .build()
        .expect("simulation should build");
    sim.run().expect("evaluation failed");
    sim.finish().expect("evaluation finish failed");
}
