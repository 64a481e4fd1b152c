//! Evaluate [`Policy`].
use crate::{
    metrics::EpisodeWindows,
    record::{Record, RecordValue::Scalar},
    Env, Policy, RolloutCollector,
};
use anyhow::Result;
use log::info;

/// Evaluate [`Policy`].
pub trait Evaluator<E: Env> {
    /// Evaluate [`Policy`].
    ///
    /// The caller of this method needs to handle the internal state of the
    /// policy, like training/evaluation mode.
    fn evaluate<P: Policy<E>>(&mut self, policy: &mut P) -> Result<Record>;
}

/// Runs a fixed number of episodes and reports their averages.
///
/// The returned record has `eval_reward`, `eval_success_rate` and, when any
/// episode succeeded, `eval_steps_on_success` and `eval_ammo_on_success`.
pub struct DefaultEvaluator<E: Env> {
    n_episodes: usize,
    collector: RolloutCollector<E>,
}

impl<E: Env> DefaultEvaluator<E> {
    /// Constructs a new [`DefaultEvaluator`].
    pub fn new(config: &E::Config, seed: i64, n_episodes: usize) -> Result<Self> {
        Ok(Self {
            n_episodes,
            collector: RolloutCollector::new(E::build(config, seed)?),
        })
    }
}

impl<E: Env> Evaluator<E> for DefaultEvaluator<E> {
    fn evaluate<P: Policy<E>>(&mut self, policy: &mut P) -> Result<Record> {
        let mut windows = EpisodeWindows::new(self.n_episodes);

        for ix in 0..self.n_episodes {
            let (_, summary) = self.collector.collect(policy)?;
            info!(
                "Eval episode {}: reward {:.2}, steps {}, success {}",
                ix, summary.total_reward, summary.steps, summary.success
            );
            windows.push(&summary);
        }

        let mut record = Record::empty();
        record.insert("eval_reward", Scalar(windows.avg_reward()));
        record.insert("eval_success_rate", Scalar(windows.success_rate()));
        if windows.has_successes() {
            record.insert("eval_steps_on_success", Scalar(windows.avg_steps_on_success()));
            record.insert("eval_ammo_on_success", Scalar(windows.avg_ammo_on_success()));
        }
        Ok(record)
    }
}
