pub mod learner;
pub mod q_table;

pub use learner::{QLearner, SelfTransition, Transition};
pub use q_table::QTable;
