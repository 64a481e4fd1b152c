//! Backend-free environment and agent used for tests.
//!
//! [`DummyEnv`] runs episodes of a fixed length with reward 1 per step.
//! [`DummyAgent`] counts its optimization steps and persists its state as YAML.
use crate::{
    record::Record,
    util::write_atomic,
    Act, Agent, Env, Info, Obs, Policy, Step, Trajectory,
};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Dummy observation, the step index in the episode.
#[derive(Clone, Debug)]
pub struct DummyObs(pub usize);

impl Obs for DummyObs {
    fn len(&self) -> usize {
        1
    }
}

/// Dummy action.
#[derive(Clone, Debug)]
pub struct DummyAct;

impl Act for DummyAct {}

/// Outcome of the last step of a [`DummyEnv`] episode.
#[derive(Clone, Debug, Default)]
pub struct DummyInfo {
    /// Copied from [`DummyEnvConfig::success`] on the last step.
    pub success: bool,
}

impl Info for DummyInfo {
    fn is_success(&self) -> bool {
        self.success
    }
}

/// Configuration of [`DummyEnv`].
#[derive(Clone, Debug)]
pub struct DummyEnvConfig {
    /// The number of steps in an episode.
    pub episode_len: usize,

    /// If episodes end with success.
    pub success: bool,
}

impl Default for DummyEnvConfig {
    fn default() -> Self {
        Self {
            episode_len: 3,
            success: true,
        }
    }
}

/// Dummy environment.
pub struct DummyEnv {
    config: DummyEnvConfig,
    t: Option<usize>,
}

impl Env for DummyEnv {
    type Config = DummyEnvConfig;
    type Obs = DummyObs;
    type Act = DummyAct;
    type Info = DummyInfo;

    fn build(config: &Self::Config, _seed: i64) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            t: None,
        })
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        self.t = Some(0);
        Ok(DummyObs(0))
    }

    fn step(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)> {
        let t = match self.t {
            Some(t) => t + 1,
            None => bail!("DummyEnv is not running"),
        };
        let done = t >= self.config.episode_len;
        self.t = if done { None } else { Some(t) };
        let info = DummyInfo {
            success: done && self.config.success,
        };
        let step = Step::new(DummyObs(t), a.clone(), 1.0, done, false, info);
        Ok((step, Record::from_scalar("t", t as f32)))
    }
}

/// State of [`DummyAgent`] written by checkpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DummyAgentState {
    /// Episode index of the checkpoint.
    pub episode: usize,

    /// The number of optimization steps.
    pub n_opts: usize,
}

/// Dummy agent.
#[derive(Default)]
pub struct DummyAgent {
    /// The number of optimization steps done.
    pub n_opts: usize,

    /// Lengths of the trajectories passed to `opt_with_record`.
    pub trajectory_lens: Vec<usize>,

    train: bool,
}

impl Policy<DummyEnv> for DummyAgent {
    type Estimate = ();

    fn sample(&mut self, _obs: &DummyObs) -> Result<(DummyAct, ())> {
        Ok((DummyAct, ()))
    }
}

impl Agent<DummyEnv> for DummyAgent {
    fn train(&mut self) {
        self.train = true;
    }

    fn eval(&mut self) {
        self.train = false;
    }

    fn is_train(&self) -> bool {
        self.train
    }

    fn opt_with_record(&mut self, trajectory: Trajectory<()>) -> Result<Record> {
        self.n_opts += 1;
        self.trajectory_lens.push(trajectory.len());
        Ok(Record::from_scalar("loss", trajectory.total_reward()))
    }

    fn save_params(&self, path: &Path) -> Result<()> {
        write_atomic(path, |p| Ok(fs::write(p, format!("{}\n", self.n_opts))?))
    }

    fn load_params(&mut self, path: &Path) -> Result<()> {
        self.n_opts = fs::read_to_string(path)?.trim().parse()?;
        Ok(())
    }

    fn save_checkpoint(&self, path: &Path, episode: usize) -> Result<()> {
        let state = DummyAgentState {
            episode,
            n_opts: self.n_opts,
        };
        write_atomic(path, |p| Ok(fs::write(p, serde_yaml::to_string(&state)?)?))
    }

    fn load_checkpoint(&mut self, path: &Path) -> Result<usize> {
        let state: DummyAgentState = serde_yaml::from_str(&fs::read_to_string(path)?)?;
        self.n_opts = state.n_opts;
        Ok(state.episode)
    }
}
