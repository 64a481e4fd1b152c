//! A2C agent implemented with candle.
use super::{A2cConfig, ActorCriticModel};
use crate::{checkpoint, opt::Optimizer};
use anyhow::Result;
use candle_core::{Device, Tensor};
use log::{info, trace};
use rand::{distributions::WeightedIndex, rngs::SmallRng, Rng, SeedableRng};
use seeker_core::{
    record::{Record, RecordValue},
    util::discounted_returns,
    Agent, Env, Policy, Trajectory,
};
use std::{convert::TryFrom, error::Error, marker::PhantomData, path::Path};

/// Per-step output of [`A2c`] kept for the update.
///
/// Both tensors are scalars attached to the autograd graph of the forward pass.
pub struct A2cEstimate {
    /// Log-probability of the chosen action.
    pub log_prob: Tensor,

    /// Value estimate of the observation.
    pub value: Tensor,
}

/// Advantage actor-critic agent.
///
/// One update per episode: with returns `G_t` and values `V_t`, the advantage
/// is `A_t = G_t - V_t`, the actor loss `-mean(log_prob_t * A_t)` with `A_t`
/// treated as a constant, and the critic loss `mean(A_t^2)`.
pub struct A2c<E> {
    model: ActorCriticModel,
    opt: Optimizer,
    discount_factor: f32,
    device: Device,
    rng: SmallRng,
    train: bool,
    phantom: PhantomData<E>,
}

impl<E> A2c<E> {
    /// Constructs the agent.
    pub fn build(config: A2cConfig) -> Result<Self> {
        let device = Device::try_from(config.device)?;
        let model = ActorCriticModel::build(config.model_config.clone(), device.clone())?;
        let opt = config.opt_config.build(model.named_vars()?)?;

        Ok(Self {
            model,
            opt,
            discount_factor: config.discount_factor,
            device,
            rng: SmallRng::seed_from_u64(config.seed),
            train: config.train,
            phantom: PhantomData,
        })
    }

    /// The policy-value network.
    pub fn model(&self) -> &ActorCriticModel {
        &self.model
    }

    fn update(&mut self, trajectory: Trajectory<A2cEstimate>) -> Result<Record> {
        let (estimates, rewards) = trajectory.into_parts();
        let n = rewards.len();
        let returns = discounted_returns(&rewards, self.discount_factor);
        let returns = Tensor::from_vec(returns, n, &self.device)?;

        let (log_probs, values): (Vec<_>, Vec<_>) = estimates
            .into_iter()
            .map(|e| (e.log_prob, e.value))
            .unzip();
        let log_probs = Tensor::stack(log_probs.as_slice(), 0)?;
        let values = Tensor::stack(values.as_slice(), 0)?;

        let (loss_actor, loss_critic) = losses(&log_probs, &values, &returns)?;
        let loss = (&loss_actor + &loss_critic)?;
        self.opt.backward_step(&loss)?;

        Ok(Record::from_slice(&[
            ("loss", RecordValue::Scalar(loss.to_scalar::<f32>()?)),
            ("loss_actor", RecordValue::Scalar(loss_actor.to_scalar::<f32>()?)),
            ("loss_critic", RecordValue::Scalar(loss_critic.to_scalar::<f32>()?)),
        ]))
    }
}

/// Actor and critic losses of one trajectory.
///
/// The advantage is detached in the actor term, so only the critic term
/// reaches the critic head.
fn losses(log_probs: &Tensor, values: &Tensor, returns: &Tensor) -> Result<(Tensor, Tensor)> {
    let adv = (returns - values)?;
    let loss_actor = (log_probs * &adv.detach())?.mean_all()?.neg()?;
    let loss_critic = adv.sqr()?.mean_all()?;
    Ok((loss_actor, loss_critic))
}

impl<E> Policy<E> for A2c<E>
where
    E: Env,
    E::Obs: AsRef<[f32]>,
    E::Act: TryFrom<i64>,
    <E::Act as TryFrom<i64>>::Error: Error + Send + Sync + 'static,
{
    type Estimate = A2cEstimate;

    /// Samples from the categorical distribution of the actor in training mode,
    /// takes the most probable action in evaluation mode.
    fn sample(&mut self, obs: &E::Obs) -> Result<(E::Act, A2cEstimate)> {
        let xs = obs.as_ref();
        let xs = Tensor::from_slice(xs, (1, xs.len()), &self.device)?;
        let (log_probs, values) = self.model.forward(&xs)?;
        let log_probs = log_probs.squeeze(0)?;
        let value = values.squeeze(0)?;

        let ix = if self.train {
            let probs = log_probs.exp()?.to_vec1::<f32>()?;
            self.rng.sample(WeightedIndex::new(&probs)?)
        } else {
            log_probs.argmax(0)?.to_scalar::<u32>()? as usize
        };
        trace!("sampled action {}", ix);

        let estimate = A2cEstimate {
            log_prob: log_probs.get(ix)?,
            value,
        };
        Ok((<E::Act as TryFrom<i64>>::try_from(ix as i64)?, estimate))
    }
}

impl<E> Agent<E> for A2c<E>
where
    E: Env,
    E::Obs: AsRef<[f32]>,
    E::Act: TryFrom<i64>,
    <E::Act as TryFrom<i64>>::Error: Error + Send + Sync + 'static,
{
    fn train(&mut self) {
        self.train = true;
    }

    fn eval(&mut self) {
        self.train = false;
    }

    fn is_train(&self) -> bool {
        self.train
    }

    fn opt_with_record(&mut self, trajectory: Trajectory<A2cEstimate>) -> Result<Record> {
        if trajectory.is_empty() {
            return Ok(Record::empty());
        }
        self.update(trajectory)
    }

    fn save_params(&self, path: &Path) -> Result<()> {
        checkpoint::save_model(path, &self.model)?;
        info!("Save a2c model to {:?}", path);
        Ok(())
    }

    fn load_params(&mut self, path: &Path) -> Result<()> {
        checkpoint::load_model(path, &self.model)?;
        info!("Load a2c model from {:?}", path);
        Ok(())
    }

    fn save_checkpoint(&self, path: &Path, episode: usize) -> Result<()> {
        checkpoint::save_checkpoint(path, episode, &self.model, &self.opt)
    }

    fn load_checkpoint(&mut self, path: &Path) -> Result<usize> {
        checkpoint::load_checkpoint(path, &self.model, &mut self.opt)
    }
}
