mod config;
use anyhow::{Context, Result};
use clap::Parser;
use config::SeekerConfig;
use log::info;
use seeker_candle_agent::a2c::A2c;
use seeker_core::{record::Record, Agent, DefaultEvaluator, Evaluator, Trainer};
use seeker_env::HideAndSeekEnv;
use seeker_tensorboard::TensorboardRecorder;
use std::path::Path;

type Env = HideAndSeekEnv;
type Seeker = A2c<Env>;

/// Train an actor-critic seeker in the hide-and-seek environment
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// YAML file with env_config, agent_config and trainer_config sections
    #[arg(short, long)]
    config: Option<String>,

    /// Overrides the number of training episodes
    #[arg(long)]
    episodes: Option<usize>,

    /// Directory of tensorboard logs
    #[arg(long, default_value = "runs/seeker")]
    logdir: String,

    /// Evaluates the given final-model file instead of training
    #[arg(long)]
    eval: Option<String>,

    /// The number of evaluation episodes
    #[arg(long, default_value_t = 5)]
    eval_episodes: usize,

    /// Seed of the environment and the action sampler
    #[arg(long)]
    seed: Option<u64>,
}

fn create_config(args: &Args) -> Result<SeekerConfig> {
    let mut config = match &args.config {
        Some(path) => SeekerConfig::load(path)
            .with_context(|| format!("Failed to load config {:?}", path))?,
        None => SeekerConfig::default(),
    };
    if let Some(n) = args.episodes {
        config.trainer_config = config.trainer_config.max_episodes(n);
    }
    if let Some(seed) = args.seed {
        config = config.seed(seed);
    }
    Ok(config)
}

fn train(config: &SeekerConfig, logdir: &str) -> Result<()> {
    let mut recorder = TensorboardRecorder::new(logdir);
    let mut agent = Seeker::build(config.agent_config.clone())?;
    let mut trainer =
        Trainer::<Env>::build(config.trainer_config.clone(), config.env_config.clone());
    trainer.train(&mut agent, &mut recorder)?;
    Ok(())
}

fn eval(config: &SeekerConfig, model_path: &str, n_episodes: usize) -> Result<Record> {
    let mut agent = {
        let mut agent = Seeker::build(config.agent_config.clone())?;
        agent
            .load_params(Path::new(model_path))
            .with_context(|| format!("Failed to load model {:?}", model_path))?;
        agent.eval();
        agent
    };

    let seed = config.trainer_config.seed;
    let record =
        DefaultEvaluator::<Env>::new(&config.env_config, seed, n_episodes)?.evaluate(&mut agent)?;
    info!(
        "Eval: Avg Reward: {:.2}, Success Rate: {:.2}",
        record.get_scalar("eval_reward")?,
        record.get_scalar("eval_success_rate")?
    );
    Ok(record)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stdout)
        .init();

    let args = Args::parse();
    let config = create_config(&args)?;

    match &args.eval {
        Some(model_path) => {
            eval(&config, model_path, args.eval_episodes)?;
        }
        None => train(&config, &args.logdir)?,
    }

    Ok(())
}
