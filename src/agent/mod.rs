mod evaluator;
mod termination;
mod trainer;

pub use evaluator::{EvalReport, Evaluator};
pub use termination::{Outcome, Termination};
pub use trainer::{EpisodeSummary, Trainer, TrainingReport};
