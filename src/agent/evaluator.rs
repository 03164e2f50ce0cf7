use log::{debug, info};

use super::Outcome;
use crate::{
    algo::tabular::QTable,
    config::EvalConfig,
    env::Environment,
    error::{EnvError, EvalError},
};

/// Results of an [`Evaluator::evaluate`] run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvalReport {
    pub num_tests: u32,
    pub successes: u32,
    pub failures: u32,
    pub timeouts: u32,
}

impl EvalReport {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Success => self.successes += 1,
            Outcome::Failure => self.failures += 1,
            Outcome::Timeout => self.timeouts += 1,
        }
    }

    /// Percentage of rollouts that reached the goal, `0.0` if none were run
    pub fn success_rate(&self) -> f64 {
        if self.num_tests == 0 {
            0.0
        } else {
            self.successes as f64 / self.num_tests as f64 * 100.0
        }
    }
}

/// Measures a learned table with purely greedy rollouts
pub struct Evaluator {
    config: EvalConfig,
}

impl Evaluator {
    pub fn new(config: EvalConfig) -> Self {
        Self { config }
    }

    /// Run `num_tests` greedy rollouts of `table` in `env`
    ///
    /// **Errors** if the configuration does not fit `table`, before anything is sent,
    /// or if the environment fails
    pub fn evaluate<E: Environment>(
        &self,
        table: &QTable,
        env: &mut E,
    ) -> Result<EvalReport, EvalError> {
        self.config.validate(table.num_states())?;
        let mut report = EvalReport {
            num_tests: self.config.num_tests,
            ..Default::default()
        };

        for test in 0..self.config.num_tests {
            let (outcome, steps) = self.rollout(table, env)?;
            debug!("test {}: {outcome} after {steps} steps", test + 1);
            report.record(outcome);
        }

        info!(
            "evaluation: {}/{} successful ({:.1}%)",
            report.successes,
            report.num_tests,
            report.success_rate()
        );
        Ok(report)
    }

    fn rollout<E: Environment>(
        &self,
        table: &QTable,
        env: &mut E,
    ) -> Result<(Outcome, u32), EnvError> {
        let termination = self.config.termination();
        let mut state = self.config.initial_state;
        let mut steps = 0;
        loop {
            let (next_state, reward) = env.step(table.best_action(state), table.num_states())?;
            steps += 1;
            if let Some(outcome) = termination.outcome(reward, steps) {
                return Ok((outcome, steps));
            }
            state = next_state;
        }
    }
}
