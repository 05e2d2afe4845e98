// Demonstration: run a baseline glimpse policy over an ImageNet-style dataset.
//
// Expects IMAGENET_DIR to point at a directory `<dir>` with a listing file
// `<dir>.txt` next to it. Build/run from this repo root:
//   IMAGENET_DIR=/data/imagenet/train cargo run --example random_glimpse -- --policy sweep --episodes 50

use std::env;
use std::process::ExitCode;

use glimpse_env::{EvaluationMetrics, GlimpseConfig, GlimpseEnv, Policy, RandomPolicy, SweepPolicy};

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    let policy_name = arg_value(&args, "--policy").unwrap_or("random");
    let episodes: usize = arg_value(&args, "--episodes")
        .and_then(|s| s.parse().ok())
        .unwrap_or(25);
    let seed: u64 = arg_value(&args, "--seed")
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);

    let config = match GlimpseConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };

    let mut policy: Box<dyn Policy> = match policy_name {
        "random" => Box::new(RandomPolicy::new(config.num_categories, seed)),
        "sweep" => Box::new(SweepPolicy::new(config.max_steps, 0)),
        other => {
            eprintln!("Unknown --policy '{}'; expected 'random' or 'sweep'.", other);
            return ExitCode::from(2);
        }
    };

    let result = GlimpseEnv::from_config(config)
        .and_then(|mut env| EvaluationMetrics::evaluate(&mut env, policy.as_mut(), episodes));
    match result {
        Ok(metrics) => {
            println!("Policy: {}", policy.name());
            println!("{}", metrics);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("evaluation failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn arg_value<'a>(args: &'a [String], key: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
}
