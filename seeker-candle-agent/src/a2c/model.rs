use crate::{
    mlp::{Mlp, MlpConfig},
    model::SubModel1,
};
use anyhow::{anyhow, Result};
use candle_core::{DType, Device, Tensor, Var, D};
use candle_nn::{linear, ops::log_softmax, Linear, Module, VarBuilder, VarMap};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`ActorCriticModel`].
pub struct ActorCriticConfig {
    /// Shared trunk.
    pub trunk: MlpConfig,

    /// The number of discrete actions, the width of the actor head.
    pub n_actions: usize,
}

impl Default for ActorCriticConfig {
    fn default() -> Self {
        Self {
            trunk: MlpConfig::default(),
            n_actions: 5,
        }
    }
}

impl ActorCriticConfig {
    /// Sets the trunk configuration.
    pub fn trunk(mut self, v: MlpConfig) -> Self {
        self.trunk = v;
        self
    }

    /// Sets the number of actions.
    pub fn n_actions(mut self, v: usize) -> Self {
        self.n_actions = v;
        self
    }

    /// Constructs [`ActorCriticConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`ActorCriticConfig`] to as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Policy-value network with a shared trunk.
///
/// The trunk feeds an actor head, normalised to log-probabilities, and a
/// scalar critic head. Parameters are named `trunk.ln<i>.*`, `actor.*` and
/// `critic.*` in the owned [`VarMap`].
pub struct ActorCriticModel {
    device: Device,
    varmap: VarMap,
    config: ActorCriticConfig,
    trunk: Mlp,
    actor: Linear,
    critic: Linear,
}

impl ActorCriticModel {
    /// Constructs [`ActorCriticModel`] with freshly initialised parameters.
    pub fn build(config: ActorCriticConfig, device: Device) -> Result<Self> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let trunk = Mlp::build(vb.pp("trunk"), config.trunk.clone())?;
        let hidden = config.trunk.out_dim();
        let actor = linear(hidden, config.n_actions, vb.pp("actor"))?;
        let critic = linear(hidden, 1, vb.pp("critic"))?;

        Ok(Self {
            device,
            varmap,
            config,
            trunk,
            actor,
            critic,
        })
    }

    /// Returns log-probabilities of actions, `[batch, n_actions]`, and state
    /// values, `[batch]`, for observations of shape `[batch, in_dim]`.
    pub fn forward(&self, obs: &Tensor) -> Result<(Tensor, Tensor)> {
        let h = self.trunk.forward(obs)?;
        let log_probs = log_softmax(&self.actor.forward(&h)?, D::Minus1)?;
        let values = self.critic.forward(&h)?.squeeze(D::Minus1)?;
        Ok((log_probs, values))
    }

    /// The device of the parameters.
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// The configuration.
    pub fn config(&self) -> &ActorCriticConfig {
        &self.config
    }

    /// Parameters with their names, in name order.
    pub fn named_vars(&self) -> Result<Vec<(String, Var)>> {
        let data = self
            .varmap
            .data()
            .lock()
            .map_err(|e| anyhow!("VarMap lock is poisoned: {}", e))?;
        let mut vars = data
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect::<Vec<_>>();
        vars.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(vars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_shapes() -> Result<()> {
        let model = ActorCriticModel::build(ActorCriticConfig::default(), Device::Cpu)?;
        let obs = Tensor::randn(0f32, 1., (3, 9), &Device::Cpu)?;
        let (log_probs, values) = model.forward(&obs)?;
        assert_eq!(log_probs.dims(), &[3, 5]);
        assert_eq!(values.dims(), &[3]);

        let sums = log_probs.exp()?.sum(1)?.to_vec1::<f32>()?;
        assert!(sums.iter().all(|s| (s - 1.0).abs() < 1e-5));
        Ok(())
    }

    #[test]
    fn test_parameter_names() -> Result<()> {
        let model = ActorCriticModel::build(ActorCriticConfig::default(), Device::Cpu)?;
        let names = model
            .named_vars()?
            .into_iter()
            .map(|(k, _)| k)
            .collect::<Vec<_>>();
        assert_eq!(
            names,
            vec![
                "actor.bias",
                "actor.weight",
                "critic.bias",
                "critic.weight",
                "trunk.ln0.bias",
                "trunk.ln0.weight",
                "trunk.ln1.bias",
                "trunk.ln1.weight",
            ]
        );
        Ok(())
    }
}
