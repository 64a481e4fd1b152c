#![warn(missing_docs)]
//! Core of the seeker workspace: the environment, policy and agent traits,
//! records, metric windows and the episodic on-policy [`Trainer`].
pub mod dummy;
pub mod error;
pub mod metrics;
pub mod record;
pub mod util;

mod base;
pub use base::{Act, Agent, Env, Info, Obs, Policy, Step, Trajectory};

mod evaluator;
pub use evaluator::{DefaultEvaluator, Evaluator};

mod trainer;
pub use trainer::{EpisodeSummary, RolloutCollector, Trainer, TrainerConfig};
