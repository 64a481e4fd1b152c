//! Checkpoint and final-model files.
//!
//! A checkpoint is one safetensors file holding
//!
//! * `episode`: i64 scalar, the last completed episode,
//! * `model.<param>`: parameters of [`ActorCriticModel`],
//! * `opt.m.<param>`, `opt.v.<param>`: Adam moments,
//! * `opt.step`: i64 scalar, the number of Adam updates.
//!
//! A final-model file holds only the `model.<param>` tensors. Both are
//! written to `<path>.tmp` and renamed into place.
use crate::{a2c::ActorCriticModel, opt::Optimizer};
use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor, Var};
use seeker_core::util::write_atomic;
use std::{collections::HashMap, convert::TryFrom, path::Path};
use thiserror::Error;

/// Key of the episode index.
pub const EPISODE_KEY: &str = "episode";

/// Key of the optimizer step count.
pub const OPT_STEP_KEY: &str = "opt.step";

const MODEL_PREFIX: &str = "model.";
const OPT_PREFIX: &str = "opt.";

/// Errors on reading checkpoints.
#[derive(Error, Debug, PartialEq)]
pub enum CheckpointError {
    /// A tensor the model or optimizer needs is not in the file.
    #[error("Missing tensor in checkpoint: {0}")]
    MissingTensor(String),

    /// A tensor does not have the shape of its parameter.
    #[error("Shape mismatch of {name}: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        /// Key of the tensor.
        name: String,
        /// Shape of the parameter.
        expected: Vec<usize>,
        /// Shape in the file.
        found: Vec<usize>,
    },

    /// A scalar entry has an unusable value.
    #[error("Invalid value of {0} in checkpoint")]
    InvalidValue(String),
}

fn read(path: &Path) -> Result<HashMap<String, Tensor>> {
    candle_core::safetensors::load(path, &Device::Cpu)
        .with_context(|| format!("Failed to read safetensors file {:?}", path))
}

fn write(path: &Path, tensors: &HashMap<String, Tensor>) -> Result<()> {
    write_atomic(path, |tmp| Ok(candle_core::safetensors::save(tensors, tmp)?))
}

fn model_tensors(model: &ActorCriticModel) -> Result<HashMap<String, Tensor>> {
    Ok(model
        .named_vars()?
        .into_iter()
        .map(|(k, v)| (format!("{}{}", MODEL_PREFIX, k), v.as_tensor().detach()))
        .collect())
}

fn scalar(v: usize) -> Result<Tensor> {
    Ok(Tensor::new(v as i64, &Device::Cpu)?)
}

fn read_scalar(tensors: &HashMap<String, Tensor>, key: &str) -> Result<usize> {
    let t = tensors
        .get(key)
        .ok_or_else(|| CheckpointError::MissingTensor(key.to_string()))?;
    let vs = t.flatten_all()?.to_dtype(DType::I64)?.to_vec1::<i64>()?;
    match vs.as_slice() {
        [v] => Ok(usize::try_from(*v).map_err(|_| CheckpointError::InvalidValue(key.to_string()))?),
        _ => Err(CheckpointError::InvalidValue(key.to_string()).into()),
    }
}

/// Checks `model.<param>` tensors against the parameters of `model`.
///
/// Returns every parameter with its new value, converted to the parameter's
/// device and dtype. Fails unless every parameter is present with its shape.
fn model_values(tensors: &HashMap<String, Tensor>, model: &ActorCriticModel) -> Result<Vec<(Var, Tensor)>> {
    let mut values = vec![];
    for (name, var) in model.named_vars()? {
        let key = format!("{}{}", MODEL_PREFIX, name);
        let t = tensors
            .get(&key)
            .ok_or_else(|| CheckpointError::MissingTensor(key.clone()))?;
        if t.dims() != var.dims() {
            return Err(CheckpointError::ShapeMismatch {
                name: key,
                expected: var.dims().to_vec(),
                found: t.dims().to_vec(),
            }
            .into());
        }
        let value = t.to_device(var.device())?.to_dtype(var.dtype())?;
        values.push((var, value));
    }
    Ok(values)
}

fn set_values(values: Vec<(Var, Tensor)>) -> Result<()> {
    for (var, value) in values {
        var.set(&value)?;
    }
    Ok(())
}

/// Writes the parameters of `model` to a final-model file.
pub fn save_model(path: &Path, model: &ActorCriticModel) -> Result<()> {
    write(path, &model_tensors(model)?)
}

/// Loads the parameters of `model` from a final-model or checkpoint file.
pub fn load_model(path: &Path, model: &ActorCriticModel) -> Result<()> {
    set_values(model_values(&read(path)?, model)?)
}

/// Writes `(episode, parameters, optimizer state)` to a checkpoint file.
pub fn save_checkpoint(
    path: &Path,
    episode: usize,
    model: &ActorCriticModel,
    opt: &Optimizer,
) -> Result<()> {
    let mut tensors = model_tensors(model)?;
    for (k, v) in opt.state() {
        tensors.insert(format!("{}{}", OPT_PREFIX, k), v);
    }
    tensors.insert(EPISODE_KEY.to_string(), scalar(episode)?);
    tensors.insert(OPT_STEP_KEY.to_string(), scalar(opt.step_count())?);
    write(path, &tensors)
}

/// Restores a checkpoint into `model` and `opt`, returning the stored episode.
///
/// Fails on unreadable files, missing tensors and shape mismatches. Both the
/// parameters and the optimizer state are checked before either is written.
pub fn load_checkpoint(path: &Path, model: &ActorCriticModel, opt: &mut Optimizer) -> Result<usize> {
    let tensors = read(path)?;
    let episode = read_scalar(&tensors, EPISODE_KEY)?;
    let step_t = read_scalar(&tensors, OPT_STEP_KEY)?;
    let opt_state = tensors
        .iter()
        .filter_map(|(k, v)| {
            k.strip_prefix(OPT_PREFIX)
                .map(|name| (name.to_string(), v.clone()))
        })
        .collect::<HashMap<_, _>>();

    let values = model_values(&tensors, model)?;
    let state = opt.check_state(&opt_state, step_t)?;
    set_values(values)?;
    opt.install_state(state);
    Ok(episode)
}
