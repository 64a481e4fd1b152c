use anyhow::Result;
use seeker_core::{Env, Info};
use seeker_env::{
    Action, EnvError, HideAndSeekConfig, HideAndSeekEnv, LayoutEntry, Phase, PropCategory,
    PropId, OBS_DIM,
};

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

/// Three chairs; the first is 5 units straight ahead of the start pose.
fn ahead_layout() -> Vec<LayoutEntry> {
    vec![
        LayoutEntry::new(PropCategory::Chair, 0.0, -10.0),
        LayoutEntry::new(PropCategory::Chair, 15.0, 15.0),
        LayoutEntry::new(PropCategory::Chair, -15.0, 15.0),
    ]
}

fn env_with(config: HideAndSeekConfig, hiders: &[usize]) -> Result<HideAndSeekEnv> {
    let mut env = HideAndSeekEnv::build(&config, 0)?;
    env.reset()?;
    let ids = hiders.iter().map(|&i| PropId(i)).collect::<Vec<_>>();
    env.set_hiders(&ids)?;
    Ok(env)
}

fn env_error(e: &anyhow::Error) -> Option<&EnvError> {
    e.downcast_ref::<EnvError>()
}

#[test]
fn test_observation_length() -> Result<()> {
    let mut env = HideAndSeekEnv::build(&HideAndSeekConfig::default(), 1)?;
    assert_eq!(env.reset()?.as_slice().len(), OBS_DIM);
    for code in [0, 2, 0, 3, 4, 1, 4, 2].iter().cycle().take(40) {
        if env.is_done() {
            break;
        }
        let (step, _) = env.step_code(*code)?;
        assert_eq!(step.obs.as_slice().len(), 9);
    }
    Ok(())
}

#[test]
fn test_reset_state() -> Result<()> {
    let config = HideAndSeekConfig::default().starting_ammo(2);
    let mut env = HideAndSeekEnv::build(&config, 3)?;
    assert_eq!(env.phase(), Phase::Ready);

    for _ in 0..3 {
        env.reset()?;
        assert_eq!(env.phase(), Phase::Running);
        assert_eq!(env.props().len(), 22);
        assert_eq!(env.props().iter().filter(|p| p.is_hider).count(), 3);
        assert!(env.props().iter().all(|p| !p.shot && !p.checked));
        assert_eq!(env.ammo(), 2);
        assert_eq!(env.hiders_found(), 0);
        assert_eq!(env.step_count(), 0);
        assert!(approx(env.seeker().z, -15.0));

        // Run the episode out of ammo so the next reset starts from a terminal env.
        env.step(&Action::Forward)?;
        env.step(&Action::Fire)?;
        env.step(&Action::Fire)?;
        assert!(env.is_done());
    }
    Ok(())
}

#[test]
fn test_fire_miss_costs_ammo_and_reward() -> Result<()> {
    // Nothing within range straight ahead of the start pose.
    let mut env = HideAndSeekEnv::build(&HideAndSeekConfig::default(), 0)?;
    env.reset()?;
    assert!(env.cast_ray().is_none());
    let (step, record) = env.step(&Action::Fire)?;
    assert_eq!(env.ammo(), 9);
    assert!(approx(step.reward, -0.11));
    assert_eq!(step.info.ammo_used(), 1);
    assert_eq!(record.get_scalar("ammo")?, 9.0);
    Ok(())
}

#[test]
fn test_hider_directly_ahead() -> Result<()> {
    let config = HideAndSeekConfig::default().layout(ahead_layout()).num_hiders(3);
    let mut env = env_with(config, &[0, 1, 2])?;

    let (step, record) = env.step(&Action::Fire)?;
    assert!(approx(step.reward, 9.89));
    assert_eq!(env.hiders_found(), 1);
    assert_eq!(env.ammo(), 9);
    assert!(env.props()[0].shot && env.props()[0].checked);
    assert!(!step.is_done());
    assert_eq!(record.get_scalar("hiders_found")?, 1.0);
    Ok(())
}

#[test]
fn test_repeat_and_wrong_hits() -> Result<()> {
    let config = HideAndSeekConfig::default().layout(ahead_layout()).num_hiders(2);
    let mut env = env_with(config.clone(), &[0, 1])?;
    env.step(&Action::Fire)?;
    let (step, _) = env.step(&Action::Fire)?;
    assert!(approx(step.reward, -1.11));
    assert_eq!(env.hiders_found(), 1);
    assert_eq!(env.ammo(), 8);

    let mut env = env_with(config, &[1, 2])?;
    let (step, _) = env.step(&Action::Fire)?;
    assert!(approx(step.reward, -1.11));
    assert!(env.props()[0].checked);
    assert!(!env.props()[0].shot);
    assert_eq!(env.hiders_found(), 0);
    Ok(())
}

#[test]
fn test_finding_all_hiders_ends_with_bonus() -> Result<()> {
    let config = HideAndSeekConfig::default().layout(ahead_layout()).num_hiders(1);
    let mut env = env_with(config, &[0])?;
    let (step, _) = env.step(&Action::Fire)?;
    assert!(approx(step.reward, 109.89));
    assert!(step.is_terminated);
    assert!(!step.is_truncated);
    assert!(step.info.is_success());
    assert_eq!(env.phase(), Phase::Terminal);
    Ok(())
}

#[test]
fn test_ammo_exhausted_without_success() -> Result<()> {
    let config = HideAndSeekConfig::default().starting_ammo(2);
    let mut env = HideAndSeekEnv::build(&config, 0)?;
    env.reset()?;
    let (step, _) = env.step(&Action::Fire)?;
    assert!(!step.is_done());
    let (step, _) = env.step(&Action::Fire)?;
    assert!(step.is_terminated);
    assert!(!step.info.is_success());
    assert!(approx(step.reward, -0.11));
    assert_eq!(env.ammo(), 0);
    Ok(())
}

#[test]
fn test_move_only_episode_is_truncated() -> Result<()> {
    let config = HideAndSeekConfig::default().max_steps(50);
    let mut env = HideAndSeekEnv::build(&config, 0)?;
    env.reset()?;
    let mut n = 0;
    loop {
        let (step, _) = env.step(&Action::Forward)?;
        n += 1;
        if step.is_done() {
            assert!(step.is_truncated);
            assert!(!step.is_terminated);
            break;
        }
        assert!(n < 50);
    }
    assert_eq!(n, 50);
    assert_eq!(env.step_count(), 50);
    Ok(())
}

#[test]
fn test_invalid_action_code() -> Result<()> {
    let mut env = HideAndSeekEnv::build(&HideAndSeekConfig::default(), 0)?;
    env.reset()?;
    for code in [5, -1, 100] {
        let e = env.step_code(code).err().unwrap();
        assert_eq!(env_error(&e), Some(&EnvError::InvalidAction(code)));
    }
    assert_eq!(env.step_count(), 0);
    Ok(())
}

#[test]
fn test_step_outside_episode_fails() -> Result<()> {
    let config = HideAndSeekConfig::default().starting_ammo(1);
    let mut env = HideAndSeekEnv::build(&config, 0)?;
    let e = env.step(&Action::Forward).err().unwrap();
    assert_eq!(env_error(&e), Some(&EnvError::NotRunning(Phase::Ready)));

    env.reset()?;
    env.step(&Action::Fire)?;
    let e = env.step(&Action::Forward).err().unwrap();
    assert_eq!(env_error(&e), Some(&EnvError::NotRunning(Phase::Terminal)));

    env.reset()?;
    assert!(env.step(&Action::Forward).is_ok());
    Ok(())
}

#[test]
fn test_plant_parts_resolve_to_one_prop() -> Result<()> {
    let layout = vec![
        LayoutEntry::new(PropCategory::Plant, 0.0, -10.0),
        LayoutEntry::new(PropCategory::Desk, 15.0, 15.0),
    ];
    let config = HideAndSeekConfig::default().layout(layout).num_hiders(2);
    let mut env = env_with(config, &[0, 1])?;

    let (id, dist) = env.cast_ray().unwrap();
    assert_eq!(id, PropId(0));
    // The pot is the outer part.
    assert!(approx(dist, 4.25));

    let (step, _) = env.step(&Action::Fire)?;
    assert!(approx(step.reward, 9.89));
    // A second hit, on whichever part, resolves to the same shot prop.
    let (step, _) = env.step(&Action::Fire)?;
    assert!(approx(step.reward, -1.11));
    assert_eq!(env.hiders_found(), 1);
    Ok(())
}

#[test]
fn test_monitor_hider_in_default_layout_is_found() -> Result<()> {
    // North of the desk at (-12, -10), facing south.
    let config = HideAndSeekConfig::default()
        .num_hiders(1)
        .start_pose((-12.0, -5.0), 180.0);
    let mut env = env_with(config, &[7])?;
    let monitor = &env.props()[7];
    assert_eq!(monitor.category, PropCategory::Monitor);
    assert_eq!(monitor.resting_on, Some(PropId(6)));

    let (id, dist) = env.cast_ray().unwrap();
    assert_eq!(id, PropId(7));
    assert!(approx(dist, 4.9));

    let (step, _) = env.step(&Action::Fire)?;
    assert!(approx(step.reward, 109.89));
    assert!(step.is_terminated);
    assert!(env.props()[7].shot);
    assert!(!env.props()[6].checked);
    Ok(())
}

#[test]
fn test_every_default_monitor_rests_on_a_desk() -> Result<()> {
    let mut env = HideAndSeekEnv::build(&HideAndSeekConfig::default(), 0)?;
    env.reset()?;
    let props = env.props();
    for monitor in props.iter().filter(|p| p.category == PropCategory::Monitor) {
        let base = monitor.resting_on.unwrap();
        assert_eq!(props[base.0].category, PropCategory::Desk);
    }
    assert!(props
        .iter()
        .filter(|p| p.category != PropCategory::Monitor)
        .all(|p| p.resting_on.is_none()));
    Ok(())
}

#[test]
fn test_set_hiders_validates_ids() -> Result<()> {
    let config = HideAndSeekConfig::default().layout(ahead_layout()).num_hiders(2);
    let mut env = HideAndSeekEnv::build(&config, 0)?;
    assert!(env.set_hiders(&[PropId(0), PropId(1)]).is_err());
    env.reset()?;
    assert!(env.set_hiders(&[PropId(0)]).is_err());
    assert!(env.set_hiders(&[PropId(0), PropId(0)]).is_err());
    assert!(env.set_hiders(&[PropId(0), PropId(3)]).is_err());
    env.set_hiders(&[PropId(2), PropId(0)])?;
    let hiders = env
        .props()
        .iter()
        .filter(|p| p.is_hider)
        .map(|p| p.id)
        .collect::<Vec<_>>();
    assert_eq!(hiders, vec![PropId(0), PropId(2)]);
    Ok(())
}
