//! Train [`Agent`].
mod collector;
mod config;
use crate::{
    metrics::EpisodeWindows,
    record::{RecordValue::Scalar, Recorder},
    Agent, Env,
};
use anyhow::{Context, Result};
pub use collector::{EpisodeSummary, RolloutCollector};
pub use config::TrainerConfig;
use log::{debug, info};
use std::path::Path;

/// Manages the on-policy training loop.
///
/// # Training loop
///
/// 0. Given an agent implementing [`Agent`] and a recorder implementing [`Recorder`].
/// 1. If a checkpoint exists at `checkpoint_path`, restore it and start from the
///    episode after the stored one; otherwise start from episode 0.
/// 2. For each episode:
///     1. Collect one full episode with [`RolloutCollector`].
///     2. Hand the trajectory to [`Agent::opt_with_record`], one optimization step.
///     3. Push the episode outcome into the metric windows.
///     4. If `episode % record_interval == 0`, write the agent's losses and the
///        window averages to the recorder, keyed by `"episode"`.
///     5. If `episode > 0 && episode % save_interval == 0`, save a checkpoint.
/// 3. Save the final parameters to `final_model_path`.
pub struct Trainer<E: Env> {
    /// Configuration of the environment for training.
    env_config: E::Config,

    config: TrainerConfig,
}

fn is_due(episode: usize, interval: usize) -> bool {
    interval > 0 && episode % interval == 0
}

impl<E: Env> Trainer<E> {
    /// Constructs a trainer.
    pub fn build(config: TrainerConfig, env_config: E::Config) -> Self {
        Self { env_config, config }
    }

    /// The configuration.
    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Returns the episode training starts from.
    ///
    /// A missing checkpoint means a fresh start. A checkpoint that exists but
    /// cannot be read is an error.
    pub fn resume<A: Agent<E>>(&self, agent: &mut A) -> Result<usize> {
        let path = Path::new(&self.config.checkpoint_path);
        if !path.exists() {
            info!("No checkpoint at {:?}, starting from episode 0", path);
            return Ok(0);
        }
        let episode = agent
            .load_checkpoint(path)
            .with_context(|| format!("Failed to load checkpoint {:?}", path))?;
        info!("Loaded checkpoint {:?}, resuming from episode {}", path, episode + 1);
        Ok(episode + 1)
    }

    /// Train the agent.
    ///
    /// Returns the index of the first episode run by this call.
    pub fn train<A: Agent<E>>(&mut self, agent: &mut A, recorder: &mut dyn Recorder) -> Result<usize> {
        let start = self.resume(agent)?;
        let env = E::build(&self.env_config, self.config.seed)?;
        let mut collector = RolloutCollector::new(env);
        let mut windows = EpisodeWindows::new(self.config.window_size);
        agent.train();

        for episode in start..self.config.max_episodes {
            let (trajectory, summary) = collector.collect(agent)?;
            let record_agent = agent.opt_with_record(trajectory)?;
            windows.push(&summary);
            debug!("Episode {}: {:?}", episode, summary);

            if is_due(episode, self.config.record_interval) {
                let mut record = record_agent;
                record.insert("episode", Scalar(episode as f32));
                record.merge_inplace(windows.record());
                info!(
                    "Episode: {}, Avg Reward: {:.2}, Success Rate: {:.2}, Loss: {:.4}",
                    episode,
                    windows.avg_reward(),
                    windows.success_rate(),
                    record.get_scalar("loss").unwrap_or(f32::NAN),
                );
                recorder.write(record);
            }

            if episode > 0 && is_due(episode, self.config.save_interval) {
                let path = Path::new(&self.config.checkpoint_path);
                agent.save_checkpoint(path, episode)?;
                info!("Saved checkpoint of episode {} in {:?}", episode, path);
            }
        }

        let path = Path::new(&self.config.final_model_path);
        agent.save_params(path)?;
        info!("Saved the final model in {:?}", path);
        recorder.flush();

        Ok(start)
    }
}
