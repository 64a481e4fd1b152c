//! Advantage actor-critic agent.
mod base;
mod config;
mod model;
pub use base::{A2c, A2cEstimate};
pub use config::A2cConfig;
pub use model::{ActorCriticConfig, ActorCriticModel};
