use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`Mlp`](super::Mlp).
pub struct MlpConfig {
    /// Input dimension.
    pub in_dim: usize,

    /// Output dimensions of the hidden layers.
    pub units: Vec<usize>,
}

impl MlpConfig {
    /// Creates configuration of MLP.
    pub fn new(in_dim: usize, units: Vec<usize>) -> Self {
        Self { in_dim, units }
    }

    /// Output dimension, the last entry of `units`, or `in_dim` without hidden layers.
    pub fn out_dim(&self) -> usize {
        self.units.last().copied().unwrap_or(self.in_dim)
    }
}

impl Default for MlpConfig {
    fn default() -> Self {
        Self {
            in_dim: 9,
            units: vec![128, 128],
        }
    }
}
