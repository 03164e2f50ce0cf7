use std::error::Error;

use platform_q::{
    agent::{Evaluator, Trainer},
    config::{AgentConfig, EvalConfig},
    env::TcpEnvironment,
};

const NUM_EPISODES: u32 = 2000;
const NUM_TESTS: u32 = 100;

/// Train against the platform game server on localhost:2037, then evaluate greedily.
///
/// Pass `eval` as the first argument to skip training and only evaluate the saved table.
fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let eval_only = std::env::args().nth(1).is_some_and(|arg| arg == "eval");
    let config = AgentConfig {
        episodes: NUM_EPISODES,
        ..Default::default()
    };
    let mut env = TcpEnvironment::connect_local()?;

    let mut trainer = Trainer::new(config.clone())?;
    if !eval_only {
        let report = trainer.train(&mut env)?;
        println!(
            "trained {} episodes, {:.1}% successful",
            report.episodes.len(),
            report.success_rate() * 100.0
        );
    }

    let evaluator = Evaluator::new(EvalConfig::for_agent(&config, NUM_TESTS));
    let report = evaluator.evaluate(trainer.table(), &mut env)?;
    println!("greedy success rate: {:.1}%", report.success_rate());

    Ok(())
}
