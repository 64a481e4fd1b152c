use anyhow::Result;
use seeker_core::{
    dummy::{DummyAgent, DummyAgentState, DummyEnv, DummyEnvConfig},
    record::{BufferedRecorder, NullRecorder},
    Agent, DefaultEvaluator, Evaluator, Trainer, TrainerConfig,
};
use std::{fs, path::Path};
use tempdir::TempDir;

fn config(dir: &TempDir, max_episodes: usize) -> TrainerConfig {
    TrainerConfig::default()
        .max_episodes(max_episodes)
        .record_interval(1)
        .save_interval(5)
        .checkpoint_path(dir.path().join("ckpt.yaml").to_string_lossy())
        .final_model_path(dir.path().join("final.txt").to_string_lossy())
}

fn episodes(recorder: &BufferedRecorder) -> Vec<f32> {
    recorder
        .iter()
        .map(|r| r.get_scalar("episode").unwrap())
        .collect()
}

#[test]
fn test_fresh_run_writes_checkpoint_and_final_model() -> Result<()> {
    let dir = TempDir::new("trainer")?;
    let config = config(&dir, 12);
    let mut trainer = Trainer::<DummyEnv>::build(config.clone(), DummyEnvConfig::default());
    let mut agent = DummyAgent::default();
    let mut recorder = BufferedRecorder::new();

    let start = trainer.train(&mut agent, &mut recorder)?;

    assert_eq!(start, 0);
    assert_eq!(agent.n_opts, 12);
    assert!(agent.trajectory_lens.iter().all(|&l| l == 3));
    assert_eq!(recorder.len(), 12);

    // Saved at episodes 5 and 10, never at 0.
    let state: DummyAgentState = serde_yaml::from_str(&fs::read_to_string(&config.checkpoint_path)?)?;
    assert_eq!(state.episode, 10);
    assert_eq!(fs::read_to_string(&config.final_model_path)?.trim(), "12");
    Ok(())
}

#[test]
fn test_resumes_after_checkpointed_episode() -> Result<()> {
    let dir = TempDir::new("trainer")?;
    let config = config(&dir, 60);
    DummyAgent::default().save_checkpoint(Path::new(&config.checkpoint_path), 50)?;

    let mut trainer = Trainer::<DummyEnv>::build(config.clone(), DummyEnvConfig::default());
    let mut agent = DummyAgent::default();
    let mut recorder = BufferedRecorder::new();
    let start = trainer.train(&mut agent, &mut recorder)?;

    assert_eq!(start, 51);
    assert_eq!(agent.n_opts, 9);
    assert_eq!(episodes(&recorder).first().copied(), Some(51.0));
    assert!(fs::metadata(&config.final_model_path).is_ok());
    Ok(())
}

#[test]
fn test_resume_past_the_end_still_writes_final_model() -> Result<()> {
    let dir = TempDir::new("trainer")?;
    let config = config(&dir, 10);
    DummyAgent::default().save_checkpoint(Path::new(&config.checkpoint_path), 20)?;

    let mut trainer = Trainer::<DummyEnv>::build(config.clone(), DummyEnvConfig::default());
    let mut agent = DummyAgent::default();
    let mut recorder = BufferedRecorder::new();
    trainer.train(&mut agent, &mut recorder)?;

    assert_eq!(agent.n_opts, 0);
    assert!(recorder.is_empty());
    assert!(fs::metadata(&config.final_model_path).is_ok());
    Ok(())
}

#[test]
fn test_corrupt_checkpoint_is_fatal() -> Result<()> {
    let dir = TempDir::new("trainer")?;
    let config = config(&dir, 10);
    fs::write(&config.checkpoint_path, "episode: [not a number")?;

    let mut trainer = Trainer::<DummyEnv>::build(config, DummyEnvConfig::default());
    let mut agent = DummyAgent::default();
    assert!(trainer.train(&mut agent, &mut NullRecorder::new()).is_err());
    assert_eq!(agent.n_opts, 0);
    Ok(())
}

#[test]
fn test_record_interval_and_metric_keys() -> Result<()> {
    let dir = TempDir::new("trainer")?;
    let config = config(&dir, 25).record_interval(10);
    let env_config = DummyEnvConfig {
        episode_len: 4,
        success: false,
    };
    let mut trainer = Trainer::<DummyEnv>::build(config, env_config);
    let mut agent = DummyAgent::default();
    let mut recorder = BufferedRecorder::new();
    trainer.train(&mut agent, &mut recorder)?;

    assert_eq!(episodes(&recorder), vec![0.0, 10.0, 20.0]);
    for r in recorder.iter() {
        assert_eq!(r.get_scalar("avg_reward")?, 4.0);
        assert_eq!(r.get_scalar("success_rate")?, 0.0);
        assert_eq!(r.get_scalar("loss")?, 4.0);
        assert!(!r.contains_key("avg_steps_on_success"));
        assert!(!r.contains_key("avg_ammo_on_success"));
    }
    Ok(())
}

#[test]
fn test_default_evaluator() -> Result<()> {
    let mut evaluator = DefaultEvaluator::<DummyEnv>::new(&DummyEnvConfig::default(), 0, 4)?;
    let mut agent = DummyAgent::default();
    let record = evaluator.evaluate(&mut agent)?;
    assert_eq!(record.get_scalar("eval_reward")?, 3.0);
    assert_eq!(record.get_scalar("eval_success_rate")?, 1.0);
    assert_eq!(record.get_scalar("eval_steps_on_success")?, 3.0);
    assert_eq!(agent.n_opts, 0);
    Ok(())
}
