use strum::Display;

/// How an episode ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Outcome {
    /// The environment paid the success reward
    Success,
    /// The environment paid the failure reward
    Failure,
    /// The step cap ran out first
    Timeout,
}

/// Decides after every step whether the episode is over
///
/// Environment versions disagree on the sentinel rewards (`-1`/`-14` in some,
/// `300`/`-100` in others) and on the step cap, so all three are configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Termination {
    pub success_reward: f64,
    pub failure_reward: f64,
    pub max_steps: u32,
}

impl Termination {
    /// The outcome of a step that paid `reward` as step number `step_count` of the episode
    ///
    /// At most one outcome fires, checked in the order success, failure, timeout.
    pub fn outcome(&self, reward: f64, step_count: u32) -> Option<Outcome> {
        if reward == self.success_reward {
            Some(Outcome::Success)
        } else if reward == self.failure_reward {
            Some(Outcome::Failure)
        } else if step_count > self.max_steps {
            Some(Outcome::Timeout)
        } else {
            None
        }
    }

    pub fn is_done(&self, reward: f64, step_count: u32) -> bool {
        self.outcome(reward, step_count).is_some()
    }
}
