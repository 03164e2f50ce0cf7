use log::{trace, warn};

use super::QTable;
use crate::{action::Action, assert_interval};

/// One observed step of interaction, consumed by [`QLearner::update`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub state: usize,
    pub action: Action,
    pub reward: f64,
    pub next_state: usize,
    /// The episode ended on this step, so there is no future value to bootstrap from
    pub done: bool,
}

/// How to treat a non-terminal step that left the agent in the same state
///
/// The environment reports an action that had no effect (walking into a wall,
/// turning in place) as a self-transition, often carrying a reward meant for some
/// other event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelfTransition {
    /// Learn from the reward as reported
    Keep,
    /// Learn as if the reward were zero
    #[default]
    ZeroReward,
    /// Do not learn from the step at all
    Skip,
}

/// One-step tabular Q-learning
///
/// Q(s,a) ← Q(s,a) + α[r + γ max<sub>a'</sub> Q(s',a') - Q(s,a)]
#[derive(Debug, Clone)]
pub struct QLearner {
    alpha: f64,
    gamma: f64,
    reward_scale: f64,
    self_transition: SelfTransition,
}

impl QLearner {
    /// **Panics** if `alpha` is not in `(0, 1]` or `gamma` is not in `[0, 1)`
    pub fn new(alpha: f64, gamma: f64) -> Self {
        assert_interval!(alpha, f64::MIN_POSITIVE, 1.0);
        assert!(
            (0.0..1.0).contains(&gamma),
            "Invalid value for `gamma`. Must be in the interval [0, 1)."
        );
        Self {
            alpha,
            gamma,
            reward_scale: 1.0,
            self_transition: SelfTransition::default(),
        }
    }

    /// Multiply every reward by `scale` before it enters the target
    pub fn with_reward_scale(mut self, scale: f64) -> Self {
        self.reward_scale = scale;
        self
    }

    pub fn with_self_transition(mut self, rule: SelfTransition) -> Self {
        self.self_transition = rule;
        self
    }

    /// The reward the update will actually learn from, `None` if the step is skipped
    fn shaped_reward(&self, t: &Transition) -> Option<f64> {
        if t.done || t.state != t.next_state {
            return Some(t.reward * self.reward_scale);
        }
        match self.self_transition {
            SelfTransition::Keep => Some(t.reward * self.reward_scale),
            SelfTransition::ZeroReward => Some(0.0),
            SelfTransition::Skip => None,
        }
    }

    /// Apply the Bellman backup for `transition` to `table`
    ///
    /// **Returns** the new value of `Q(state, action)`, or `None` if the step was skipped
    /// or its target overflowed
    pub fn update(&self, table: &mut QTable, transition: Transition) -> Option<f64> {
        let reward = self.shaped_reward(&transition)?;
        let Transition {
            state,
            action,
            next_state,
            done,
            ..
        } = transition;

        let future = if done { 0.0 } else { table.max_value(next_state) };
        let target = reward + self.gamma * future;
        let q = table.get(state, action);
        let updated = q + self.alpha * (target - q);
        if !updated.is_finite() {
            warn!("skipping update of Q({state}, {action}): reward {reward} gives target {target}");
            return None;
        }
        table.set(state, action, updated);

        trace!("Q({state}, {action}) {q} -> {updated} (target {target})");
        Some(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    fn table() -> QTable {
        let mut table = QTable::zeros(3);
        table.set(0, Action::Left, 1.0);
        table.set(1, Action::Left, 4.0);
        table.set(1, Action::Right, 10.0);
        table.set(1, Action::Jump, -2.0);
        table
    }

    fn step(state: usize, next_state: usize, reward: f64, done: bool) -> Transition {
        Transition {
            state,
            action: Action::Left,
            reward,
            next_state,
            done,
        }
    }

    #[test]
    fn bellman_update_moves_alpha_of_the_gap() {
        let learner = QLearner::new(0.1, 0.9);
        let mut table = table();

        let before = table.get(0, Action::Left);
        let target = 2.0 + 0.9 * 10.0;
        let after = learner.update(&mut table, step(0, 1, 2.0, false)).unwrap();

        assert!((after - (before + 0.1 * (target - before))).abs() < EPS);
        assert_eq!(table.get(0, Action::Left), after);
        assert!((target - after) < (target - before));
    }

    #[test]
    fn terminal_update_ignores_next_state() {
        let learner = QLearner::new(0.5, 0.9);
        let mut table = table();

        let after = learner.update(&mut table, step(0, 1, 3.0, true)).unwrap();
        assert!((after - (1.0 + 0.5 * (3.0 - 1.0))).abs() < EPS);
    }

    #[test]
    fn only_the_updated_cell_changes() {
        let learner = QLearner::new(1.0, 0.0);
        let mut table = table();
        let mut expected = table.clone();

        learner.update(&mut table, step(2, 1, 7.0, false));
        expected.set(2, Action::Left, 7.0);
        assert_eq!(table, expected);
    }

    #[test]
    fn self_transition_zeroes_reward_by_default() {
        let learner = QLearner::new(0.5, 0.5);
        let mut table = table();

        // 1.0 + 0.5 * (0 + 0.5 * 1.0 - 1.0)
        let after = learner.update(&mut table, step(0, 0, -14.0, false)).unwrap();
        assert!((after - 0.75).abs() < EPS);
    }

    #[test]
    fn self_transition_rules() {
        let mut table = table();
        let keep = QLearner::new(0.5, 0.5).with_self_transition(SelfTransition::Keep);
        let after = keep.update(&mut table, step(0, 0, -1.0, false)).unwrap();
        assert!((after - 0.25).abs() < EPS);

        let skip = QLearner::new(0.5, 0.5).with_self_transition(SelfTransition::Skip);
        let before = table.clone();
        assert_eq!(skip.update(&mut table, step(0, 0, -1.0, false)), None);
        assert_eq!(table, before);
    }

    #[test]
    fn terminal_self_transition_is_never_shaped() {
        let mut table = table();
        let skip = QLearner::new(0.5, 0.5).with_self_transition(SelfTransition::Skip);
        let after = skip.update(&mut table, step(0, 0, -3.0, true)).unwrap();
        assert!((after - (1.0 + 0.5 * (-3.0 - 1.0))).abs() < EPS);

        let zero = QLearner::new(0.5, 0.5);
        let after = zero.update(&mut table, step(0, 0, -3.0, true)).unwrap();
        assert!((after - (-1.0 + 0.5 * (-3.0 + 1.0))).abs() < EPS);
    }

    #[test]
    fn reward_scale_applies_before_target() {
        let learner = QLearner::new(1.0, 0.0).with_reward_scale(1.0 / 14.0);
        let mut table = table();
        let after = learner.update(&mut table, step(0, 1, -14.0, true)).unwrap();
        assert!((after + 1.0).abs() < EPS);
    }

    #[test]
    fn overflowing_target_leaves_table_untouched() {
        let learner = QLearner::new(0.5, 0.5).with_reward_scale(1e10);
        let mut table = table();
        let before = table.clone();
        assert_eq!(learner.update(&mut table, step(0, 1, 1e300, false)), None);
        assert_eq!(learner.update(&mut table, step(0, 1, -1e300, true)), None);
        assert_eq!(table, before);
    }

    #[test]
    #[should_panic(expected = "gamma")]
    fn gamma_of_one_panics() {
        QLearner::new(0.1, 1.0);
    }

    #[test]
    #[should_panic(expected = "alpha")]
    fn zero_alpha_panics() {
        QLearner::new(0.0, 0.5);
    }
}
