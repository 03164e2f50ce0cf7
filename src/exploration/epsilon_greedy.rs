use rand::{
    distributions::{Distribution, WeightedIndex},
    Rng,
};

use super::Choice;
use crate::{
    action::{Action, NUM_ACTIONS},
    algo::tabular::QTable,
    decay::Decay,
    error::ConfigError,
};

/// Epsilon greedy exploration policy with a time-decaying epsilon and weighted exploration
///
/// When exploring, actions are drawn from a categorical distribution rather than
/// uniformly, so exploration can favour moves that are more likely to make progress.
#[derive(Debug, Clone)]
pub struct EpsilonGreedy<D: Decay> {
    epsilon: D,
    weights: WeightedIndex<f64>,
}

impl<D: Decay> EpsilonGreedy<D> {
    /// Initialize epsilon greedy policy with a decay strategy and per-action exploration weights
    ///
    /// **Errors** if the weights are negative, not finite, or all zero
    pub fn new(decay: D, weights: [f64; NUM_ACTIONS]) -> Result<Self, ConfigError> {
        let dist = WeightedIndex::new(weights).map_err(|e| ConfigError::ExplorationWeights {
            weights: weights.to_vec(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            epsilon: decay,
            weights: dist,
        })
    }

    /// Exploration rate for the given episode
    pub fn epsilon(&self, episode: u32) -> f64 {
        self.epsilon.evaluate(episode as f64)
    }

    /// Decide whether to explore at exploration rate `epsilon`
    pub fn choose<R: Rng + ?Sized>(&self, epsilon: f64, rng: &mut R) -> Choice {
        if rng.gen::<f64>() < epsilon {
            Choice::Explore
        } else {
            Choice::Exploit
        }
    }

    /// Sample an exploratory action from the weighted distribution
    pub fn explore<R: Rng + ?Sized>(&self, rng: &mut R) -> Action {
        let i = self.weights.sample(rng);
        Action::from_repr(i).unwrap_or(Action::ESCAPE)
    }

    /// Pick an action in `state` at exploration rate `epsilon`
    pub fn select<R: Rng + ?Sized>(
        &self,
        table: &QTable,
        state: usize,
        epsilon: f64,
        rng: &mut R,
    ) -> Action {
        match self.choose(epsilon, rng) {
            Choice::Explore => self.explore(rng),
            Choice::Exploit => table.best_action(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::decay::Multiplicative;

    fn policy(epsilon: f64, weights: [f64; NUM_ACTIONS]) -> EpsilonGreedy<Multiplicative> {
        EpsilonGreedy::new(Multiplicative::new(1.0, epsilon, epsilon).unwrap(), weights).unwrap()
    }

    fn table() -> QTable {
        let mut table = QTable::zeros(2);
        table.set(0, Action::Right, 1.0);
        table.set(1, Action::Jump, 1.0);
        table
    }

    #[test]
    fn zero_epsilon_is_greedy() {
        let policy = policy(0.0, [1.0; NUM_ACTIONS]);
        let mut rng = StdRng::seed_from_u64(7);
        let table = table();
        for _ in 0..1000 {
            assert_eq!(policy.select(&table, 0, 0.0, &mut rng), Action::Right);
            assert_eq!(policy.select(&table, 1, 0.0, &mut rng), Action::Jump);
        }
    }

    #[test]
    fn exploration_follows_weights() {
        let policy = policy(1.0, [0.0, 0.0, 1.0]);
        let mut rng = StdRng::seed_from_u64(7);
        let table = table();
        for _ in 0..1000 {
            assert_eq!(policy.select(&table, 0, 1.0, &mut rng), Action::Jump);
        }
    }

    #[test]
    fn weighted_exploration_frequencies() {
        let policy = policy(1.0, [1.0, 1.0, 2.0]);
        let mut rng = StdRng::seed_from_u64(42);
        let mut counts = [0usize; NUM_ACTIONS];
        let n = 40_000;
        for _ in 0..n {
            counts[policy.explore(&mut rng).index()] += 1;
        }
        let freq = counts.map(|c| c as f64 / n as f64);
        assert!((freq[0] - 0.25).abs() < 0.02, "{freq:?}");
        assert!((freq[1] - 0.25).abs() < 0.02, "{freq:?}");
        assert!((freq[2] - 0.5).abs() < 0.02, "{freq:?}");
    }

    #[test]
    fn epsilon_follows_schedule() {
        let decay = Multiplicative::new(0.5, 1.0, 0.2).unwrap();
        let policy = EpsilonGreedy::new(decay, [1.0; NUM_ACTIONS]).unwrap();
        assert_eq!(policy.epsilon(0), 1.0);
        assert_eq!(policy.epsilon(1), 0.5);
        assert_eq!(policy.epsilon(5), 0.2);
    }

    #[test]
    fn invalid_weights_are_rejected() {
        for weights in [[0.0; 3], [1.0, -1.0, 1.0], [f64::NAN, 1.0, 1.0]] {
            assert!(matches!(
                EpsilonGreedy::new(Multiplicative::new(1.0, 0.1, 0.1).unwrap(), weights),
                Err(ConfigError::ExplorationWeights { .. })
            ));
        }
    }
}
