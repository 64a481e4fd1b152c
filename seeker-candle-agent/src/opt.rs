//! Optimizers.
//!
//! Adam is implemented here rather than taken from candle so that its moments
//! and step count are visible as named tensors and can go into checkpoints.
use anyhow::{anyhow, Result};
use candle_core::{backprop::GradStore, Tensor, Var};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration of optimizer for training neural networks in an agent.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub enum OptimizerConfig {
    /// Adam optimizer.
    Adam {
        /// Learning rate.
        lr: f64,
        #[serde(default = "default_beta1")]
        beta1: f64,
        #[serde(default = "default_beta2")]
        beta2: f64,
        #[serde(default = "default_eps")]
        eps: f64,
    },
}

fn default_beta1() -> f64 {
    0.9
}

fn default_beta2() -> f64 {
    0.999
}

fn default_eps() -> f64 {
    1e-8
}

impl OptimizerConfig {
    /// Constructs the optimizer over the given named variables.
    pub fn build(&self, vars: Vec<(String, Var)>) -> Result<Optimizer> {
        match &self {
            OptimizerConfig::Adam {
                lr,
                beta1,
                beta2,
                eps,
            } => {
                let params = ParamsAdam {
                    lr: *lr,
                    beta1: *beta1,
                    beta2: *beta2,
                    eps: *eps,
                };
                Ok(Optimizer::Adam(Adam::new(vars, params)?))
            }
        }
    }

    /// Override learning rate.
    pub fn learning_rate(self, lr: f64) -> Self {
        match self {
            Self::Adam {
                lr: _,
                beta1,
                beta2,
                eps,
            } => Self::Adam {
                lr,
                beta1,
                beta2,
                eps,
            },
        }
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self::Adam {
            lr: 5e-4,
            beta1: default_beta1(),
            beta2: default_beta2(),
            eps: default_eps(),
        }
    }
}

/// Hyperparameters of [`Adam`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamsAdam {
    /// Learning rate.
    pub lr: f64,
    /// Decay of the first moment.
    pub beta1: f64,
    /// Decay of the second moment.
    pub beta2: f64,
    /// Added to the denominator.
    pub eps: f64,
}

struct AdamVar {
    name: String,
    var: Var,
    m: Tensor,
    v: Tensor,
}

/// Adam with bias correction.
///
/// ```text
/// m = b1 * m + (1 - b1) * g
/// v = b2 * v + (1 - b2) * g^2
/// theta -= lr * (m / (1 - b1^t)) / (sqrt(v / (1 - b2^t)) + eps)
/// ```
pub struct Adam {
    vars: Vec<AdamVar>,
    params: ParamsAdam,
    step_t: usize,
}

impl Adam {
    /// Constructs the optimizer with zero moments.
    ///
    /// Variables are kept in name order.
    pub fn new(mut vars: Vec<(String, Var)>, params: ParamsAdam) -> Result<Self> {
        vars.sort_by(|a, b| a.0.cmp(&b.0));
        let vars = vars
            .into_iter()
            .filter(|(_, var)| var.dtype().is_float())
            .map(|(name, var)| {
                let m = var.as_tensor().zeros_like()?;
                let v = var.as_tensor().zeros_like()?;
                Ok(AdamVar { name, var, m, v })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            vars,
            params,
            step_t: 0,
        })
    }

    /// The number of updates done.
    pub fn step_count(&self) -> usize {
        self.step_t
    }

    /// Learning rate.
    pub fn learning_rate(&self) -> f64 {
        self.params.lr
    }

    /// Applies one update with the given gradients.
    ///
    /// Variables without a gradient are left untouched.
    pub fn step(&mut self, grads: &GradStore) -> Result<()> {
        self.step_t += 1;
        let ParamsAdam {
            lr,
            beta1,
            beta2,
            eps,
        } = self.params;
        let t = self.step_t as i32;
        let scale_m = 1.0 / (1.0 - beta1.powi(t));
        let scale_v = 1.0 / (1.0 - beta2.powi(t));

        for av in self.vars.iter_mut() {
            let theta = av.var.as_tensor();
            if let Some(g) = grads.get(theta) {
                let m = ((av.m.affine(beta1, 0.)? + g.affine(1. - beta1, 0.)?)?).detach();
                let v = ((av.v.affine(beta2, 0.)? + g.sqr()?.affine(1. - beta2, 0.)?)?).detach();
                let m_hat = m.affine(scale_m, 0.)?;
                let v_hat = v.affine(scale_v, 0.)?;
                let delta = (m_hat / v_hat.sqrt()?.affine(1., eps)?)?.affine(lr, 0.)?;
                av.var.set(&theta.sub(&delta)?)?;
                av.m = m;
                av.v = v;
            }
        }
        Ok(())
    }

    /// Computes gradients of `loss` and applies one update.
    pub fn backward_step(&mut self, loss: &Tensor) -> Result<()> {
        let grads = loss.backward()?;
        self.step(&grads)
    }

    /// Moments by variable name, `m.<name>` and `v.<name>`.
    pub fn state(&self) -> HashMap<String, Tensor> {
        let mut state = HashMap::with_capacity(2 * self.vars.len());
        for av in self.vars.iter() {
            state.insert(format!("m.{}", av.name), av.m.clone());
            state.insert(format!("v.{}", av.name), av.v.clone());
        }
        state
    }

    /// Checks the moments returned by [`Adam::state`] against the variables.
    ///
    /// Every moment must be present with the shape of its variable. Nothing
    /// changes until the result is passed to [`Adam::install_state`].
    pub fn check_state(&self, state: &HashMap<String, Tensor>, step_t: usize) -> Result<OptimizerState> {
        let mut moments = Vec::with_capacity(self.vars.len());
        for av in self.vars.iter() {
            let get = |key: String| -> Result<Tensor> {
                let t = state
                    .get(&key)
                    .ok_or_else(|| anyhow!("Missing optimizer state {}", key))?;
                if t.dims() != av.var.dims() {
                    return Err(anyhow!(
                        "Shape mismatch of optimizer state {}: expected {:?}, found {:?}",
                        key,
                        av.var.dims(),
                        t.dims()
                    ));
                }
                Ok(t.to_device(av.var.device())?.to_dtype(av.var.dtype())?)
            };
            moments.push((get(format!("m.{}", av.name))?, get(format!("v.{}", av.name))?));
        }
        Ok(OptimizerState { moments, step_t })
    }

    /// Replaces the moments and the step count.
    pub fn install_state(&mut self, state: OptimizerState) {
        for (av, (m, v)) in self.vars.iter_mut().zip(state.moments) {
            av.m = m;
            av.v = v;
        }
        self.step_t = state.step_t;
    }
}

/// Optimizer state checked against the variables of an optimizer.
pub struct OptimizerState {
    moments: Vec<(Tensor, Tensor)>,
    step_t: usize,
}

/// Optimizers.
pub enum Optimizer {
    /// Adam optimizer.
    Adam(Adam),
}

impl Optimizer {
    /// Applies a backward step pass.
    pub fn backward_step(&mut self, loss: &Tensor) -> Result<()> {
        match self {
            Self::Adam(opt) => opt.backward_step(loss),
        }
    }

    /// Named state tensors, see [`Adam::state`].
    pub fn state(&self) -> HashMap<String, Tensor> {
        match self {
            Self::Adam(opt) => opt.state(),
        }
    }

    /// The number of updates done.
    pub fn step_count(&self) -> usize {
        match self {
            Self::Adam(opt) => opt.step_count(),
        }
    }

    /// See [`Adam::check_state`].
    pub fn check_state(&self, state: &HashMap<String, Tensor>, step_t: usize) -> Result<OptimizerState> {
        match self {
            Self::Adam(opt) => opt.check_state(state, step_t),
        }
    }

    /// See [`Adam::install_state`].
    pub fn install_state(&mut self, state: OptimizerState) {
        match self {
            Self::Adam(opt) => opt.install_state(state),
        }
    }
}
