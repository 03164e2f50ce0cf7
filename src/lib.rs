/// The moves available to the agent
pub mod action;

/// Training and evaluation loops
pub mod agent;

/// Implemented RL algorithms
pub mod algo;

/// Configuration for training and evaluation
pub mod config;

/// Implementations of strategies for time-decaying hyperparameters
pub mod decay;

/// Environment channel
pub mod env;

/// Error types
pub mod error;

/// Exploration policies
pub mod exploration;

mod util;

pub use action::{Action, NUM_ACTIONS};
pub use agent::{Evaluator, Trainer};
pub use algo::tabular::QTable;
pub use config::{AgentConfig, EvalConfig};
