use log::{debug, info, warn};
use rand::{rngs::StdRng, SeedableRng};

use super::{Outcome, Termination};
use crate::{
    algo::tabular::{QLearner, QTable, Transition},
    config::AgentConfig,
    decay::Multiplicative,
    env::Environment,
    error::{ConfigError, EnvError},
    exploration::{EpsilonGreedy, LoopGuard},
};

/// What happened during one training episode
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeSummary {
    /// Zero-based index of the episode
    pub episode: u32,
    pub outcome: Outcome,
    pub steps: u32,
    /// Sum of the rewards reported by the environment, before any shaping
    pub total_reward: f64,
    /// Steps on which the loop guard overrode the policy
    pub forced_escapes: u32,
    /// Exploration rate the episode ran with
    pub epsilon: f64,
}

/// Aggregate statistics of a [`Trainer::train`] run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingReport {
    pub episodes: Vec<EpisodeSummary>,
}

impl TrainingReport {
    fn count(&self, outcome: Outcome) -> usize {
        self.episodes.iter().filter(|e| e.outcome == outcome).count()
    }

    pub fn successes(&self) -> usize {
        self.count(Outcome::Success)
    }

    pub fn failures(&self) -> usize {
        self.count(Outcome::Failure)
    }

    pub fn timeouts(&self) -> usize {
        self.count(Outcome::Timeout)
    }

    /// Fraction of episodes that ended in success, `0.0` if there were none
    pub fn success_rate(&self) -> f64 {
        if self.episodes.is_empty() {
            0.0
        } else {
            self.successes() as f64 / self.episodes.len() as f64
        }
    }
}

/// Drives Q-learning episodes against an [`Environment`]
///
/// Each step records the visit with the [`LoopGuard`], takes the forced escape action
/// or asks the [`EpsilonGreedy`] policy, exchanges the action with the environment and
/// feeds the transition to the [`QLearner`]. Epsilon decays once per episode and the
/// value table is checkpointed every `checkpoint_interval` episodes.
pub struct Trainer {
    config: AgentConfig,
    table: QTable,
    exploration: EpsilonGreedy<Multiplicative>,
    learner: QLearner,
    guard: LoopGuard,
    termination: Termination,
    rng: StdRng,
    episode: u32,
}

impl Trainer {
    /// Initialize a trainer, warm-starting from the table at `config.table_path` if there is one
    pub fn new(config: AgentConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let table = QTable::load(&config.table_path, config.num_states, config.optimistic_value);
        Self::with_table(config, table)
    }

    /// Initialize a trainer that continues from `table`
    pub fn with_table(config: AgentConfig, table: QTable) -> Result<Self, ConfigError> {
        config.validate()?;
        if table.num_states() != config.num_states {
            return Err(ConfigError::TableShape {
                expected: config.num_states,
                found: table.num_states(),
            });
        }

        let rng = config
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Ok(Self {
            exploration: config.exploration()?,
            learner: config.learner(),
            guard: LoopGuard::new(config.num_states, config.loop_threshold),
            termination: config.termination(),
            table,
            rng,
            episode: 0,
            config,
        })
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    pub fn into_table(self) -> QTable {
        self.table
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Number of episodes completed so far
    pub fn episode(&self) -> u32 {
        self.episode
    }

    /// Exploration rate of the next episode
    pub fn epsilon(&self) -> f64 {
        self.exploration.epsilon(self.episode)
    }

    /// Run `config.episodes` episodes, then save the table
    ///
    /// **Errors** only when the environment fails; failing to save is logged and ignored
    pub fn train<E: Environment>(&mut self, env: &mut E) -> Result<TrainingReport, EnvError> {
        let total = self.config.episodes;
        let mut report = TrainingReport {
            episodes: Vec::with_capacity(total as usize),
        };

        for _ in 0..total {
            let summary = self.run_episode(env)?;
            info!(
                "episode {}/{total}: {} after {} steps (reward {}, epsilon {:.4})",
                summary.episode + 1,
                summary.outcome,
                summary.steps,
                summary.total_reward,
                summary.epsilon,
            );
            report.episodes.push(summary);
        }

        self.save();
        info!(
            "training complete: {} successes, {} failures, {} timeouts in {} episodes ({:.1}% success)",
            report.successes(),
            report.failures(),
            report.timeouts(),
            report.episodes.len(),
            report.success_rate() * 100.0,
        );
        Ok(report)
    }

    /// Run a single episode from the initial state until it terminates
    pub fn run_episode<E: Environment>(
        &mut self,
        env: &mut E,
    ) -> Result<EpisodeSummary, EnvError> {
        let epsilon = self.epsilon();
        let num_states = self.config.num_states;
        let mut state = self.config.initial_state;
        let mut steps = 0;
        let mut total_reward = 0.0;
        let mut forced_escapes = 0;
        self.guard.reset();

        let outcome = loop {
            let action = match self.guard.check(state) {
                Some(escape) => {
                    forced_escapes += 1;
                    escape
                }
                None => self
                    .exploration
                    .select(&self.table, state, epsilon, &mut self.rng),
            };

            let (next_state, reward) = env.step(action, num_states)?;
            steps += 1;
            total_reward += reward;
            let outcome = self.termination.outcome(reward, steps);
            debug!("step {steps}: {state} --{action}--> {next_state} reward {reward}");

            self.learner.update(
                &mut self.table,
                Transition {
                    state,
                    action,
                    reward,
                    next_state,
                    done: outcome.is_some(),
                },
            );

            if let Some(outcome) = outcome {
                break outcome;
            }
            state = next_state;
        };

        let summary = EpisodeSummary {
            episode: self.episode,
            outcome,
            steps,
            total_reward,
            forced_escapes,
            epsilon,
        };
        self.end_episode();
        Ok(summary)
    }

    fn end_episode(&mut self) {
        self.episode += 1;
        let interval = self.config.checkpoint_interval;
        if interval > 0 && self.episode % interval == 0 {
            self.save();
        }
    }

    /// Persist the table to `config.table_path`, logging rather than returning failures
    ///
    /// **Returns** whether the table was written
    pub fn save(&self) -> bool {
        let path = &self.config.table_path;
        match self.table.save(path) {
            Ok(()) => {
                info!("saved value table to {}", path.display());
                true
            }
            Err(e) => {
                warn!("could not save value table: {e}");
                false
            }
        }
    }
}
