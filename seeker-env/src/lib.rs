//! A headless hide-and-seek environment.
//!
//! A seeker moves through an office-like arena of props. A few props are
//! secretly designated hiders at the start of every episode; the seeker has
//! to find them by firing a ray at them before it runs out of ammo or time.
//!
//! ```no_run
//! use seeker_core::Env;
//! use seeker_env::{Action, HideAndSeekConfig, HideAndSeekEnv};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut env = HideAndSeekEnv::build(&HideAndSeekConfig::default(), 42)?;
//! let obs = env.reset()?;
//! assert_eq!(obs.as_slice().len(), 9);
//! let (step, _record) = env.step(&Action::Fire)?;
//! println!("reward: {}", step.reward);
//! # Ok(())
//! # }
//! ```
mod act;
mod config;
mod env;
mod error;
mod obs;
mod prop;

pub use act::{Action, N_ACTIONS};
pub use config::{HideAndSeekConfig, LayoutEntry, RewardConfig};
pub use env::{HideAndSeekEnv, HideAndSeekInfo, Phase, Seeker};
pub use error::EnvError;
pub use obs::{HideAndSeekObs, MAX_TRACKED_PROPS, OBS_DIM};
pub use prop::{Part, Prop, PropCategory, PropId};
