//! Configuration of a training run.
use anyhow::Result;
use seeker_candle_agent::a2c::A2cConfig;
use seeker_core::TrainerConfig;
use seeker_env::HideAndSeekConfig;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Environment, agent and trainer configuration in one YAML document.
///
/// Missing sections take their defaults.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeekerConfig {
    pub env_config: HideAndSeekConfig,
    pub agent_config: A2cConfig,
    pub trainer_config: TrainerConfig,
}

impl SeekerConfig {
    /// Sets the seed of the environment and of the action sampler.
    pub fn seed(mut self, seed: u64) -> Self {
        self.trainer_config = self.trainer_config.seed(seed as i64);
        self.agent_config = self.agent_config.seed(seed);
        self
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
