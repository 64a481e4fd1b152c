//! Trailing windows of episode outcomes.
use crate::{
    record::{Record, RecordValue::Scalar},
    EpisodeSummary,
};
use std::collections::VecDeque;

/// Keeps the last `window_size` episode outcomes.
///
/// Rewards and success flags are windowed over all episodes. Steps and ammo
/// are windowed over successful episodes only, so they describe how efficient
/// the agent is when it wins.
#[derive(Debug, Clone)]
pub struct EpisodeWindows {
    window_size: usize,
    rewards: VecDeque<f32>,
    successes: VecDeque<bool>,
    steps_on_success: VecDeque<usize>,
    ammo_on_success: VecDeque<usize>,
}

fn push_bounded<T>(q: &mut VecDeque<T>, v: T, cap: usize) {
    if cap == 0 {
        return;
    }
    if q.len() == cap {
        q.pop_front();
    }
    q.push_back(v);
}

fn mean<I: ExactSizeIterator<Item = f32>>(it: I) -> f32 {
    let n = it.len();
    if n == 0 {
        0.0
    } else {
        it.sum::<f32>() / n as f32
    }
}

impl EpisodeWindows {
    /// Creates empty windows of size `window_size`.
    pub fn new(window_size: usize) -> Self {
        Self {
            window_size,
            rewards: VecDeque::with_capacity(window_size),
            successes: VecDeque::with_capacity(window_size),
            steps_on_success: VecDeque::with_capacity(window_size),
            ammo_on_success: VecDeque::with_capacity(window_size),
        }
    }

    /// Adds the outcome of an episode.
    pub fn push(&mut self, summary: &EpisodeSummary) {
        let cap = self.window_size;
        push_bounded(&mut self.rewards, summary.total_reward, cap);
        push_bounded(&mut self.successes, summary.success, cap);
        if summary.success {
            push_bounded(&mut self.steps_on_success, summary.steps, cap);
            push_bounded(&mut self.ammo_on_success, summary.ammo_used, cap);
        }
    }

    /// Mean total reward, 0 when empty.
    pub fn avg_reward(&self) -> f32 {
        mean(self.rewards.iter().copied())
    }

    /// Fraction of successful episodes, 0 when empty.
    pub fn success_rate(&self) -> f32 {
        mean(self.successes.iter().map(|&s| if s { 1.0 } else { 0.0 }))
    }

    /// Mean episode length over successful episodes, 0 when there are none.
    pub fn avg_steps_on_success(&self) -> f32 {
        mean(self.steps_on_success.iter().map(|&v| v as f32))
    }

    /// Mean ammo used over successful episodes, 0 when there are none.
    pub fn avg_ammo_on_success(&self) -> f32 {
        mean(self.ammo_on_success.iter().map(|&v| v as f32))
    }

    /// Returns `true` if any successful episode is in the window.
    pub fn has_successes(&self) -> bool {
        !self.steps_on_success.is_empty()
    }

    /// The window averages as a record.
    ///
    /// `avg_steps_on_success` and `avg_ammo_on_success` are left out while
    /// there is no successful episode.
    pub fn record(&self) -> Record {
        let mut record = Record::empty();
        record.insert("avg_reward", Scalar(self.avg_reward()));
        record.insert("success_rate", Scalar(self.success_rate()));
        if self.has_successes() {
            record.insert("avg_steps_on_success", Scalar(self.avg_steps_on_success()));
            record.insert("avg_ammo_on_success", Scalar(self.avg_ammo_on_success()));
        }
        record
    }
}
