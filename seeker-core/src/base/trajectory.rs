//! Trajectory of an episode.

/// Ordered per-step estimates and rewards of one episode.
///
/// A trajectory is created by [`RolloutCollector`](crate::RolloutCollector),
/// handed to [`Agent::opt_with_record`](crate::Agent::opt_with_record) and
/// dropped after the update.
#[derive(Debug)]
pub struct Trajectory<T> {
    estimates: Vec<T>,
    rewards: Vec<f32>,
}

impl<T> Default for Trajectory<T> {
    fn default() -> Self {
        Self {
            estimates: Vec::new(),
            rewards: Vec::new(),
        }
    }
}

impl<T> Trajectory<T> {
    /// Creates an empty trajectory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the estimate and reward of a step.
    pub fn push(&mut self, estimate: T, reward: f32) {
        self.estimates.push(estimate);
        self.rewards.push(reward);
    }

    /// The number of steps.
    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    /// Returns `true` if no step was pushed.
    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }

    /// Rewards in step order.
    pub fn rewards(&self) -> &[f32] {
        &self.rewards
    }

    /// Estimates in step order.
    pub fn estimates(&self) -> &[T] {
        &self.estimates
    }

    /// Sum of the rewards.
    pub fn total_reward(&self) -> f32 {
        self.rewards.iter().sum()
    }

    /// Splits the trajectory into estimates and rewards.
    pub fn into_parts(self) -> (Vec<T>, Vec<f32>) {
        (self.estimates, self.rewards)
    }
}
