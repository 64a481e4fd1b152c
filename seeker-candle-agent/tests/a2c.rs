use anyhow::Result;
use seeker_candle_agent::{
    a2c::{A2c, A2cConfig, ActorCriticConfig},
    checkpoint::{self, CheckpointError},
    mlp::MlpConfig,
};
use seeker_core::{record::BufferedRecorder, Agent, Env, Policy, RolloutCollector, Trainer, TrainerConfig};
use seeker_env::{HideAndSeekConfig, HideAndSeekEnv};
use std::{collections::HashMap, fs, path::Path};
use tempdir::TempDir;

type Seeker = A2c<HideAndSeekEnv>;

fn params(agent: &Seeker) -> Result<HashMap<String, Vec<f32>>> {
    agent
        .model()
        .named_vars()?
        .into_iter()
        .map(|(k, v)| Ok((k, v.as_tensor().flatten_all()?.to_vec1::<f32>()?)))
        .collect()
}

fn small_env_config() -> HideAndSeekConfig {
    HideAndSeekConfig::default().max_steps(30)
}

/// Runs one collected episode through an update.
fn train_one_episode(agent: &mut Seeker) -> Result<()> {
    let env = HideAndSeekEnv::build(&small_env_config(), 0)?;
    let mut collector = RolloutCollector::new(env);
    let (trajectory, _) = collector.collect(agent)?;
    agent.opt_with_record(trajectory)?;
    Ok(())
}

#[test]
fn test_sample_and_update() -> Result<()> {
    let mut agent = Seeker::build(A2cConfig::default())?;
    let mut env = HideAndSeekEnv::build(&small_env_config(), 0)?;
    let obs = env.reset()?;
    let (_act, estimate) = agent.sample(&obs)?;
    assert!(estimate.log_prob.to_scalar::<f32>()? <= 0.0);
    assert!(estimate.value.dims().is_empty());

    let before = params(&agent)?;
    let mut collector = RolloutCollector::new(env);
    let (trajectory, summary) = collector.collect(&mut agent)?;
    assert_eq!(trajectory.len(), summary.steps);
    let record = agent.opt_with_record(trajectory)?;
    for key in ["loss", "loss_actor", "loss_critic"] {
        assert!(record.get_scalar(key)?.is_finite());
    }
    assert_ne!(before, params(&agent)?);
    Ok(())
}

#[test]
fn test_eval_mode_is_greedy_and_deterministic() -> Result<()> {
    let mut agent = Seeker::build(A2cConfig::default())?;
    agent.eval();
    let mut env = HideAndSeekEnv::build(&small_env_config(), 0)?;
    let obs = env.reset()?;
    let (a1, _) = agent.sample(&obs)?;
    let (a2, _) = agent.sample(&obs)?;
    assert_eq!(a1, a2);
    Ok(())
}

#[test]
fn test_checkpoint_round_trip() -> Result<()> {
    let dir = TempDir::new("a2c_checkpoint")?;
    let path = dir.path().join("ckpt.safetensors");

    let mut agent = Seeker::build(A2cConfig::default())?;
    train_one_episode(&mut agent)?;
    agent.save_checkpoint(&path, 150)?;

    let mut restored = Seeker::build(A2cConfig::default())?;
    assert_ne!(params(&agent)?, params(&restored)?);
    let episode = restored.load_checkpoint(&path)?;
    assert_eq!(episode, 150);
    assert_eq!(params(&agent)?, params(&restored)?);

    Ok(())
}

#[test]
fn test_final_model_round_trip() -> Result<()> {
    let dir = TempDir::new("a2c_final")?;
    let path = dir.path().join("final.safetensors");
    let agent = Seeker::build(A2cConfig::default())?;
    agent.save_params(&path)?;
    assert!(!Path::new(&format!("{}.tmp", path.display())).exists());

    let mut loaded = Seeker::build(A2cConfig::default())?;
    loaded.load_params(&path)?;
    assert_eq!(params(&agent)?, params(&loaded)?);

    // A final-model file is not a checkpoint.
    let e = loaded.load_checkpoint(&path).err().unwrap();
    assert_eq!(
        e.downcast_ref::<CheckpointError>(),
        Some(&CheckpointError::MissingTensor(checkpoint::EPISODE_KEY.to_string()))
    );
    Ok(())
}

#[test]
fn test_corrupt_checkpoint_fails() -> Result<()> {
    let dir = TempDir::new("a2c_corrupt")?;
    let path = dir.path().join("ckpt.safetensors");
    fs::write(&path, b"definitely not safetensors")?;
    let mut agent = Seeker::build(A2cConfig::default())?;
    let before = params(&agent)?;
    assert!(agent.load_checkpoint(&path).is_err());
    assert_eq!(before, params(&agent)?);
    Ok(())
}

#[test]
fn test_shape_mismatch_fails() -> Result<()> {
    let dir = TempDir::new("a2c_mismatch")?;
    let path = dir.path().join("ckpt.safetensors");
    let small = A2cConfig::default()
        .model_config(ActorCriticConfig::default().trunk(MlpConfig::new(9, vec![32, 32])));
    Seeker::build(small)?.save_checkpoint(&path, 1)?;

    let mut agent = Seeker::build(A2cConfig::default())?;
    let before = params(&agent)?;
    let e = agent.load_checkpoint(&path).err().unwrap();
    assert!(matches!(
        e.downcast_ref::<CheckpointError>(),
        Some(CheckpointError::ShapeMismatch { .. })
    ));
    assert_eq!(before, params(&agent)?);
    Ok(())
}

#[test]
fn test_trainer_with_hide_and_seek() -> Result<()> {
    let dir = TempDir::new("a2c_trainer")?;
    let config = TrainerConfig::default()
        .max_episodes(4)
        .record_interval(2)
        .save_interval(2)
        .checkpoint_path(dir.path().join("ckpt.safetensors").to_string_lossy())
        .final_model_path(dir.path().join("final.safetensors").to_string_lossy());

    let mut agent = Seeker::build(A2cConfig::default())?;
    let mut recorder = BufferedRecorder::new();
    let mut trainer = Trainer::<HideAndSeekEnv>::build(config.clone(), small_env_config());
    assert_eq!(trainer.train(&mut agent, &mut recorder)?, 0);

    assert_eq!(recorder.len(), 2);
    for r in recorder.iter() {
        for key in ["episode", "loss", "loss_actor", "loss_critic", "avg_reward", "success_rate"] {
            assert!(r.get_scalar(key).is_ok(), "{}", key);
        }
    }
    assert!(Path::new(&config.final_model_path).exists());

    // The checkpoint of episode 2 makes the next run start at 3.
    let mut agent = Seeker::build(A2cConfig::default())?;
    let mut recorder = BufferedRecorder::new();
    let mut trainer = Trainer::<HideAndSeekEnv>::build(config.max_episodes(6), small_env_config());
    assert_eq!(trainer.train(&mut agent, &mut recorder)?, 3);
    Ok(())
}
