use std::{io, path::PathBuf};

use thiserror::Error;

/// Failures talking to the environment
///
/// These are never recovered by the agent and always reach the caller of
/// [`Trainer::train`](crate::agent::Trainer::train) or
/// [`Evaluator::evaluate`](crate::agent::Evaluator::evaluate).
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("environment i/o failed: {0}")]
    Io(#[from] io::Error),

    #[error("environment closed the connection")]
    Disconnected,

    #[error("malformed state encoding `{0}`")]
    MalformedState(String),

    #[error("state {state} is outside the state space [0, {num_states})")]
    StateOutOfRange { state: usize, num_states: usize },

    #[error("malformed reward `{0}`")]
    MalformedReward(String),

    #[error("malformed reply `{reply}`: {reason}")]
    MalformedReply { reply: String, reason: String },
}

/// Failures of an [`Evaluator::evaluate`](crate::agent::Evaluator::evaluate) run
#[derive(Debug, Error)]
pub enum EvalError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Env(#[from] EnvError),
}

/// Failures reading or writing a persisted [`QTable`](crate::algo::tabular::QTable)
#[derive(Debug, Error)]
pub enum TableError {
    #[error("table file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("expected {expected} rows, found {found}")]
    RowCount { expected: usize, found: usize },

    #[error("row {row}: expected {expected} values, found {found}")]
    ColumnCount {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("row {row}: `{token}` is not a finite number")]
    BadValue { row: usize, token: String },
}

/// An invalid [`AgentConfig`](crate::config::AgentConfig) or
/// [`EvalConfig`](crate::config::EvalConfig)
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("`{name}` = {value} is outside {range}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        range: &'static str,
    },

    #[error("`num_states` must be positive")]
    EmptyStateSpace,

    #[error("`initial_state` {initial_state} is outside [0, {num_states})")]
    InitialState {
        initial_state: usize,
        num_states: usize,
    },

    #[error("success and failure rewards must differ, both are {0}")]
    SameSentinels(f64),

    #[error("value table has {found} states, expected {expected}")]
    TableShape { expected: usize, found: usize },

    #[error("invalid exploration weights {weights:?}: {reason}")]
    ExplorationWeights { weights: Vec<f64>, reason: String },

    #[error("invalid decay schedule: {0}")]
    Decay(#[from] DecayError),
}

/// An invalid [decay schedule](crate::decay)
#[derive(Debug, Error, PartialEq)]
pub enum DecayError {
    #[error("initial value {vi} is below the floor {vf}")]
    Direction { vi: f64, vf: f64 },

    #[error("multiplicative rate {0} must be in [0, 1]")]
    Factor(f64),
}
