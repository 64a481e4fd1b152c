//! Errors of the environment.
use crate::Phase;
use thiserror::Error;

/// Errors of [`HideAndSeekEnv`](crate::HideAndSeekEnv).
#[derive(Error, Debug, PartialEq)]
pub enum EnvError {
    /// `step` was called while no episode is running.
    #[error("Environment is not running (phase: {0:?}); call reset() first")]
    NotRunning(Phase),

    /// An action code outside `0..5`.
    #[error("Invalid action code: {0}")]
    InvalidAction(i64),

    /// An argument that does not fit the current environment.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The configuration cannot produce a valid environment.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
