//! Agent.
use super::{Env, Policy, Trajectory};
use crate::record::Record;
use anyhow::Result;
use std::path::Path;

/// Represents a trainable policy on an environment.
pub trait Agent<E: Env>: Policy<E> {
    /// Set the policy to training mode.
    fn train(&mut self);

    /// Set the policy to evaluation mode.
    fn eval(&mut self);

    /// Return if it is in training mode.
    fn is_train(&self) -> bool;

    /// Performs an optimization step with the trajectory of one episode.
    fn opt(&mut self, trajectory: Trajectory<Self::Estimate>) -> Result<()> {
        let _ = self.opt_with_record(trajectory)?;
        Ok(())
    }

    /// Performs an optimization step and returns some information.
    ///
    /// The trajectory is consumed.
    fn opt_with_record(&mut self, trajectory: Trajectory<Self::Estimate>) -> Result<Record>;

    /// Save the parameters of the agent to the given file.
    fn save_params(&self, path: &Path) -> Result<()>;

    /// Load the parameters of the agent from the given file.
    fn load_params(&mut self, path: &Path) -> Result<()>;

    /// Saves the training progress, i.e. the episode index, the parameters
    /// and the optimizer state, to the given file.
    fn save_checkpoint(&self, path: &Path, episode: usize) -> Result<()>;

    /// Restores the training progress saved with [`Agent::save_checkpoint`]
    /// and returns the stored episode index.
    fn load_checkpoint(&mut self, path: &Path) -> Result<usize>;
}
