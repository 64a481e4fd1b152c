//! Policy.
use super::Env;
use anyhow::Result;

/// A policy on an environment.
///
/// Policy is a mapping from an observation to an action.
/// The mapping can be either of deterministic or stochastic.
///
/// Along with the action, a policy returns an [`Policy::Estimate`], the
/// per-step quantities an on-policy learner needs later, for example the
/// log-probability of the chosen action and the value of the observation.
pub trait Policy<E: Env> {
    /// Per-step estimate kept in a [`Trajectory`](crate::Trajectory).
    type Estimate;

    /// Sample an action given an observation.
    fn sample(&mut self, obs: &E::Obs) -> Result<(E::Act, Self::Estimate)>;
}
