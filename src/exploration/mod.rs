/// Exploration policy result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Explore,
    Exploit,
}

mod epsilon_greedy;
mod loop_guard;

pub use epsilon_greedy::EpsilonGreedy;
pub use loop_guard::{LoopGuard, LOOP_THRESHOLD};
