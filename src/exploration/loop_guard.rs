use log::debug;

use crate::action::Action;

/// Default number of visits to a single state tolerated within one episode
pub const LOOP_THRESHOLD: u32 = 5;

/// Detects an agent circling through the same states and forces it out
///
/// Counts how often each state is visited during the current episode. Once any state
/// has been visited more than `threshold` times, every following step of the episode
/// takes [`Action::ESCAPE`] instead of consulting the policy.
#[derive(Debug, Clone)]
pub struct LoopGuard {
    visits: Vec<u32>,
    threshold: u32,
}

impl LoopGuard {
    pub fn new(num_states: usize, threshold: u32) -> Self {
        Self {
            visits: vec![0; num_states],
            threshold,
        }
    }

    /// Forget every visit, called at the start of each episode
    pub fn reset(&mut self) {
        self.visits.fill(0);
    }

    /// Record a visit to `state`
    pub fn visit(&mut self, state: usize) {
        self.visits[state] = self.visits[state].saturating_add(1);
    }

    /// Number of visits to `state` in this episode
    pub fn visits(&self, state: usize) -> u32 {
        self.visits[state]
    }

    pub fn should_force_escape(&self) -> bool {
        self.visits.iter().any(|&n| n > self.threshold)
    }

    /// Record a visit to `state` and return the action to force, if any
    pub fn check(&mut self, state: usize) -> Option<Action> {
        self.visit(state);
        self.should_force_escape().then(|| {
            debug!(
                "state {state} visited {} times, forcing {}",
                self.visits[state],
                Action::ESCAPE
            );
            Action::ESCAPE
        })
    }
}
