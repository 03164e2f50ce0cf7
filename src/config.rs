//! Constructor-time configuration for training and evaluation.

use std::path::PathBuf;

use crate::{
    action::NUM_ACTIONS,
    agent::Termination,
    algo::tabular::{
        q_table::{NUM_STATES, OPTIMISTIC_VALUE},
        QLearner, SelfTransition,
    },
    decay::Multiplicative,
    error::ConfigError,
    exploration::{EpsilonGreedy, LOOP_THRESHOLD},
};

/// Configuration for the [`Trainer`](crate::agent::Trainer)
///
/// Defaults describe a long training run: 2000 episodes, epsilon decaying
/// from 1.0 by 0.995 per episode down to 0.01.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    /// Learning rate, in `(0, 1]`
    ///
    /// **Default**: `0.1`
    pub alpha: f64,
    /// Discount factor, in `[0, 1)`
    ///
    /// **Default**: `0.95`
    pub gamma: f64,
    /// Exploration rate of the first episode
    ///
    /// **Default**: `1.0`
    pub epsilon: f64,
    /// Factor applied to epsilon after every episode
    ///
    /// **Default**: `0.995`
    pub epsilon_decay: f64,
    /// Floor below which epsilon never decays
    ///
    /// **Default**: `0.01`
    pub min_epsilon: f64,
    /// **Default**: `2000`
    pub episodes: u32,
    /// Visits to one state within an episode before the escape action is forced
    ///
    /// **Default**: `5`
    pub loop_threshold: u32,
    /// An episode times out once its step count exceeds this
    ///
    /// **Default**: `300`
    pub max_steps: u32,
    /// Reward that marks reaching the goal
    ///
    /// **Default**: `300.0`
    pub success_reward: f64,
    /// Reward that marks falling or dying
    ///
    /// **Default**: `-100.0`
    pub failure_reward: f64,
    /// Where the value table is loaded from and saved to
    ///
    /// **Default**: `resultado.txt`
    pub table_path: PathBuf,
    /// Relative sampling weight of each action when exploring, in [`Action`](crate::action::Action) order
    ///
    /// **Default**: `[0.25, 0.25, 0.5]`, favouring jumps
    pub exploration_weights: [f64; NUM_ACTIONS],
    /// Episodes between checkpoints of the value table, `0` disables checkpoints
    ///
    /// **Default**: `100`
    pub checkpoint_interval: u32,
    /// Value given to every cell of a table that has never been trained
    ///
    /// **Default**: `5.0`
    pub optimistic_value: f64,
    /// **Default**: `96`
    pub num_states: usize,
    /// State every episode starts in
    ///
    /// **Default**: `0`
    pub initial_state: usize,
    /// **Default**: [`SelfTransition::ZeroReward`]
    pub self_transition: SelfTransition,
    /// Factor applied to rewards before learning
    ///
    /// **Default**: `1.0`
    pub reward_scale: f64,
    /// Seed for the trainer's random number generator, `None` seeds from entropy
    ///
    /// **Default**: `None`
    pub seed: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            gamma: 0.95,
            epsilon: 1.0,
            epsilon_decay: 0.995,
            min_epsilon: 0.01,
            episodes: 2000,
            loop_threshold: LOOP_THRESHOLD,
            max_steps: 300,
            success_reward: 300.0,
            failure_reward: -100.0,
            table_path: PathBuf::from("resultado.txt"),
            exploration_weights: [0.25, 0.25, 0.5],
            checkpoint_interval: 100,
            optimistic_value: OPTIMISTIC_VALUE,
            num_states: NUM_STATES,
            initial_state: 0,
            self_transition: SelfTransition::ZeroReward,
            reward_scale: 1.0,
            seed: None,
        }
    }
}

fn check(
    name: &'static str,
    value: f64,
    range: &'static str,
    ok: impl Fn(f64) -> bool,
) -> Result<(), ConfigError> {
    if ok(value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { name, value, range })
    }
}

fn check_sentinels(success: f64, failure: f64) -> Result<(), ConfigError> {
    check("success_reward", success, "finite values", f64::is_finite)?;
    check("failure_reward", failure, "finite values", f64::is_finite)?;
    if success == failure {
        return Err(ConfigError::SameSentinels(success));
    }
    Ok(())
}

fn check_initial_state(initial_state: usize, num_states: usize) -> Result<(), ConfigError> {
    if initial_state >= num_states {
        return Err(ConfigError::InitialState {
            initial_state,
            num_states,
        });
    }
    Ok(())
}

impl AgentConfig {
    /// Check every parameter, reporting the first invalid one
    pub fn validate(&self) -> Result<(), ConfigError> {
        check("alpha", self.alpha, "(0, 1]", |v| v > 0.0 && v <= 1.0)?;
        check("gamma", self.gamma, "[0, 1)", |v| (0.0..1.0).contains(&v))?;
        check("epsilon", self.epsilon, "[0, 1]", |v| (0.0..=1.0).contains(&v))?;
        check("min_epsilon", self.min_epsilon, "[0, epsilon]", |v| {
            (0.0..=self.epsilon).contains(&v)
        })?;
        check("optimistic_value", self.optimistic_value, "finite values", f64::is_finite)?;
        check("reward_scale", self.reward_scale, "finite values", f64::is_finite)?;
        check_sentinels(self.success_reward, self.failure_reward)?;
        if self.num_states == 0 {
            return Err(ConfigError::EmptyStateSpace);
        }
        check_initial_state(self.initial_state, self.num_states)?;
        self.exploration()?;
        Ok(())
    }

    /// The exploration policy described by this configuration
    pub fn exploration(&self) -> Result<EpsilonGreedy<Multiplicative>, ConfigError> {
        let schedule = Multiplicative::new(self.epsilon_decay, self.epsilon, self.min_epsilon)?;
        EpsilonGreedy::new(schedule, self.exploration_weights)
    }

    /// The learner described by this configuration
    ///
    /// **Panics** if `alpha` or `gamma` is out of range, see [`AgentConfig::validate`]
    pub fn learner(&self) -> QLearner {
        QLearner::new(self.alpha, self.gamma)
            .with_reward_scale(self.reward_scale)
            .with_self_transition(self.self_transition)
    }

    /// The termination predicate used while training
    pub fn termination(&self) -> Termination {
        Termination {
            success_reward: self.success_reward,
            failure_reward: self.failure_reward,
            max_steps: self.max_steps,
        }
    }
}

/// Configuration for the [`Evaluator`](crate::agent::Evaluator)
#[derive(Debug, Clone, PartialEq)]
pub struct EvalConfig {
    /// Number of greedy rollouts
    ///
    /// **Default**: `100`
    pub num_tests: u32,
    /// A rollout is abandoned once its step count exceeds this
    ///
    /// **Default**: `300`
    pub max_steps: u32,
    /// **Default**: `300.0`
    pub success_reward: f64,
    /// **Default**: `-100.0`
    pub failure_reward: f64,
    /// **Default**: `0`
    pub initial_state: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self::for_agent(&AgentConfig::default(), 100)
    }
}

impl EvalConfig {
    /// Evaluation settings matching the sentinels and start state of `agent`
    pub fn for_agent(agent: &AgentConfig, num_tests: u32) -> Self {
        Self {
            num_tests,
            max_steps: agent.max_steps,
            success_reward: agent.success_reward,
            failure_reward: agent.failure_reward,
            initial_state: agent.initial_state,
        }
    }

    /// Check the sentinels, and the start state against a table of `num_states` rows
    pub fn validate(&self, num_states: usize) -> Result<(), ConfigError> {
        check_sentinels(self.success_reward, self.failure_reward)?;
        check_initial_state(self.initial_state, num_states)
    }

    pub fn termination(&self) -> Termination {
        Termination {
            success_reward: self.success_reward,
            failure_reward: self.failure_reward,
            max_steps: self.max_steps,
        }
    }
}
