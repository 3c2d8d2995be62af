use std::path::PathBuf;

use thiserror::Error;

/// Errors raised when mutating a mixed strategy.
#[derive(Error, Debug, PartialEq)]
pub enum StrategyError {
    /// The replacement vector does not cover the strategy's fixed action set.
    #[error("Replacement distribution has {got} entries, expected {expected}")]
    InvalidDistribution { expected: usize, got: usize },
}

/// Errors raised by an equilibrium solver backend.
#[derive(Error, Debug, PartialEq)]
pub enum SolverError {
    /// The underlying linear program could not be solved.
    #[error("No optimal strategy found: {0}")]
    NoSolution(String),
}

/// Errors raised by agents while acting, learning, or persisting models.
#[derive(Error, Debug)]
pub enum AgentError {
    /// Asked to load a model that was never saved.
    #[error("No saved model at {}", .path.display())]
    MissingModelFile { path: PathBuf },
    /// An equilibrium re-solve failed. The update that triggered it is
    /// not committed.
    #[error("Equilibrium solve failed: {0}")]
    SolverFailure(#[from] SolverError),
    #[error(transparent)]
    Strategy(#[from] StrategyError),
    /// The observed action has zero probability under the strategy that
    /// was credited with producing it.
    #[error("Action {action} has zero probability under the acting strategy")]
    ImpossibleAction { action: usize },
    #[error("Error reading or writing model file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Error serializing model: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Errors raised while building or running a simulation.
#[derive(Error, Debug)]
pub enum MarkovSimulationError {
    #[error("Need a game")]
    NeedGame,
    #[error("Need agents")]
    NeedAgents,
    #[error("A two player game needs exactly 2 agents, got {0}")]
    AgentCount(usize),
    #[error("Agent at seat {seat} reports player index {player}")]
    AgentPlayerMismatch { seat: usize, player: usize },
    #[error(transparent)]
    Agent(#[from] AgentError),
}
