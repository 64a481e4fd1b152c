//! Configuration of the A2C agent.
use super::ActorCriticConfig;
use crate::{opt::OptimizerConfig, Device};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`A2c`](super::A2c) agent.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(default)]
pub struct A2cConfig {
    /// Policy-value network.
    pub model_config: ActorCriticConfig,

    /// Optimizer of the network.
    pub opt_config: OptimizerConfig,

    /// Discount factor of returns.
    pub discount_factor: f32,

    /// Device of the network.
    pub device: Device,

    /// Seed of the action sampler.
    pub seed: u64,

    /// Start in training mode.
    pub train: bool,
}

impl Default for A2cConfig {
    fn default() -> Self {
        Self {
            model_config: ActorCriticConfig::default(),
            opt_config: OptimizerConfig::default(),
            discount_factor: 0.99,
            device: Device::Cpu,
            seed: 42,
            train: true,
        }
    }
}

impl A2cConfig {
    /// Sets the configuration of the network.
    pub fn model_config(mut self, v: ActorCriticConfig) -> Self {
        self.model_config = v;
        self
    }

    /// Sets the optimizer configuration.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }

    /// Sets the discount factor.
    pub fn discount_factor(mut self, v: f32) -> Self {
        self.discount_factor = v;
        self
    }

    /// Sets the device.
    pub fn device(mut self, v: Device) -> Self {
        self.device = v;
        self
    }

    /// Sets the seed of the action sampler.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Constructs [`A2cConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`A2cConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
