//! Configuration of [`Trainer`](super::Trainer).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Trainer`](super::Trainer).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(default)]
pub struct TrainerConfig {
    /// The number of training episodes, counted from episode 0.
    pub max_episodes: usize,

    /// Interval of writing metrics, in episodes.
    pub record_interval: usize,

    /// Interval of checkpointing, in episodes. Episode 0 is never saved.
    pub save_interval: usize,

    /// The number of most recent episodes the metric windows cover.
    pub window_size: usize,

    /// Where the resumable checkpoint lives.
    pub checkpoint_path: String,

    /// Where the final parameters are written after training.
    pub final_model_path: String,

    /// Random seed of the training environment.
    pub seed: i64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            max_episodes: 50000,
            record_interval: 10,
            save_interval: 50,
            window_size: 100,
            checkpoint_path: "seeker_checkpoint.safetensors".to_string(),
            final_model_path: "seeker_final.safetensors".to_string(),
            seed: 42,
        }
    }
}

impl TrainerConfig {
    /// Sets the number of training episodes.
    pub fn max_episodes(mut self, v: usize) -> Self {
        self.max_episodes = v;
        self
    }

    /// Sets the interval of writing metrics in episodes.
    pub fn record_interval(mut self, v: usize) -> Self {
        self.record_interval = v;
        self
    }

    /// Sets the interval of checkpointing in episodes.
    pub fn save_interval(mut self, v: usize) -> Self {
        self.save_interval = v;
        self
    }

    /// Sets the size of the metric windows.
    pub fn window_size(mut self, v: usize) -> Self {
        self.window_size = v;
        self
    }

    /// Sets the checkpoint path.
    pub fn checkpoint_path(mut self, v: impl Into<String>) -> Self {
        self.checkpoint_path = v.into();
        self
    }

    /// Sets the path of the final parameters.
    pub fn final_model_path(mut self, v: impl Into<String>) -> Self {
        self.final_model_path = v.into();
        self
    }

    /// Sets the random seed of the training environment.
    pub fn seed(mut self, v: i64) -> Self {
        self.seed = v;
        self
    }

    /// Constructs [`TrainerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`TrainerConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_trainer_config() -> Result<()> {
        let config = TrainerConfig::default()
            .max_episodes(100)
            .save_interval(7)
            .checkpoint_path("some/ckpt.safetensors");

        let dir = TempDir::new("trainer_config")?;
        let path = dir.path().join("trainer_config.yaml");
        config.save(&path)?;
        let config_ = TrainerConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }

    #[test]
    fn test_partial_yaml_uses_defaults() -> Result<()> {
        let config: TrainerConfig = serde_yaml::from_str("max_episodes: 3\n")?;
        assert_eq!(config.max_episodes, 3);
        assert_eq!(config.record_interval, 10);
        assert_eq!(config.save_interval, 50);
        assert_eq!(config.window_size, 100);
        Ok(())
    }
}
