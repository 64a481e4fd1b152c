//! Episode rollouts.
use crate::{Env, Info, Policy, Trajectory};
use anyhow::Result;
use log::trace;

/// Outcome of an episode.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeSummary {
    /// Sum of rewards.
    pub total_reward: f32,

    /// The number of environment steps.
    pub steps: usize,

    /// If the episode reached its goal.
    pub success: bool,

    /// Ammo spent in the episode.
    pub ammo_used: usize,
}

/// Runs whole episodes of a policy on an environment it owns.
pub struct RolloutCollector<E: Env> {
    env: E,
}

impl<E: Env> RolloutCollector<E> {
    /// Creates a collector.
    pub fn new(env: E) -> Self {
        Self { env }
    }

    /// The environment.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// Consumes the collector and returns the environment.
    pub fn into_env(self) -> E {
        self.env
    }

    /// Resets the environment and steps it with actions sampled from `policy`
    /// until the episode ends.
    ///
    /// Every step contributes the policy's estimate and the reward to the
    /// returned trajectory.
    pub fn collect<P: Policy<E>>(
        &mut self,
        policy: &mut P,
    ) -> Result<(Trajectory<P::Estimate>, EpisodeSummary)> {
        let mut obs = self.env.reset()?;
        let mut trajectory = Trajectory::new();

        loop {
            let (act, estimate) = policy.sample(&obs)?;
            let (step, record) = self.env.step(&act)?;
            trace!("step {}: {:?}", trajectory.len(), record);
            trajectory.push(estimate, step.reward);

            if step.is_done() {
                let summary = EpisodeSummary {
                    total_reward: trajectory.total_reward(),
                    steps: trajectory.len(),
                    success: step.info.is_success(),
                    ammo_used: step.info.ammo_used(),
                };
                return Ok((trajectory, summary));
            }
            obs = step.obs;
        }
    }
}
