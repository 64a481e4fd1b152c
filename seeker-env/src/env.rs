//! The hide-and-seek environment.
use crate::{
    Action, EnvError, HideAndSeekConfig, HideAndSeekObs, Prop, PropId, MAX_TRACKED_PROPS,
    OBS_DIM,
};
use anyhow::Result;
use log::{debug, trace};
use rand::{rngs::SmallRng, seq::index, SeedableRng};
use seeker_core::{
    record::{Record, RecordValue::Scalar},
    Env, Info, Step,
};
use std::convert::TryFrom;

/// Lifecycle phase of [`HideAndSeekEnv`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Built, never reset.
    Ready,
    /// An episode is running.
    Running,
    /// The last episode ended; `reset` starts the next one.
    Terminal,
}

/// Planar pose of the seeker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Seeker {
    /// Position on the x axis.
    pub x: f32,

    /// Position on the z axis.
    pub z: f32,

    /// Heading in degrees, in `[0, 360)`. Heading 0 faces `+z`.
    pub heading: f32,
}

impl Seeker {
    /// Unit vector `(sin h, cos h)` along the heading.
    pub fn forward(&self) -> (f32, f32) {
        let h = self.heading.to_radians();
        (h.sin(), h.cos())
    }
}

/// Information attached to every [`Step`] of [`HideAndSeekEnv`].
#[derive(Debug, Clone, PartialEq)]
pub struct HideAndSeekInfo {
    /// Hiders found so far.
    pub hiders_found: usize,

    /// The number of hiders in the episode.
    pub num_hiders: usize,

    /// Ammo spent so far.
    pub ammo_used: usize,

    /// Steps taken so far.
    pub step_count: usize,
}

impl Info for HideAndSeekInfo {
    fn is_success(&self) -> bool {
        self.hiders_found == self.num_hiders
    }

    fn ammo_used(&self) -> usize {
        self.ammo_used
    }
}

/// Hide-and-seek environment.
///
/// The world is owned by the environment and only changes in
/// [`reset`](Env::reset) and [`step`](Env::step). Time advances by the fixed
/// tick `dt` of the configuration per step.
pub struct HideAndSeekEnv {
    config: HideAndSeekConfig,
    rng: SmallRng,
    props: Vec<Prop>,
    seeker: Seeker,
    ammo: usize,
    hiders_found: usize,
    step_count: usize,
    phase: Phase,
}

impl HideAndSeekEnv {
    /// Props of the registry, indexed by [`PropId`].
    pub fn props(&self) -> &[Prop] {
        &self.props
    }

    /// The prop with the given id.
    pub fn prop(&self, id: PropId) -> Option<&Prop> {
        self.props.get(id.0)
    }

    /// Pose of the seeker.
    pub fn seeker(&self) -> &Seeker {
        &self.seeker
    }

    /// Remaining ammo.
    pub fn ammo(&self) -> usize {
        self.ammo
    }

    /// Hiders found in the current episode.
    pub fn hiders_found(&self) -> usize {
        self.hiders_found
    }

    /// Steps taken in the current episode.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// Lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns `true` once the current episode has ended.
    pub fn is_done(&self) -> bool {
        self.phase == Phase::Terminal
    }

    /// The configuration.
    pub fn config(&self) -> &HideAndSeekConfig {
        &self.config
    }

    /// Casts a ray from the seeker along its heading, up to `fire_range`.
    ///
    /// Returns the prop owning the nearest hit part and the distance to it.
    /// Ties go to the prop that comes first in the registry. When the nearest
    /// prop carries props resting on it, a ray that crosses one of them hits
    /// that top prop instead, so a monitor is hit rather than its desk.
    pub fn cast_ray(&self) -> Option<(PropId, f32)> {
        let (base, t) = self.nearest_hit(self.props.iter())?;
        let on_top = self.props.iter().filter(|p| p.resting_on == Some(base));
        Some(self.nearest_hit(on_top).unwrap_or((base, t)))
    }

    fn nearest_hit<'a>(&self, props: impl Iterator<Item = &'a Prop>) -> Option<(PropId, f32)> {
        let origin = (self.seeker.x, self.seeker.z);
        let dir = self.seeker.forward();
        let mut nearest: Option<(PropId, f32)> = None;

        for prop in props {
            if let Some(t) = prop.ray_distance(origin, dir) {
                if t > self.config.fire_range {
                    continue;
                }
                match nearest {
                    Some((_, best)) if best <= t => {}
                    _ => nearest = Some((prop.id, t)),
                }
            }
        }
        nearest
    }

    /// Converts a raw action code and performs a step.
    pub fn step_code(&mut self, code: i64) -> Result<(Step<Self>, Record)> {
        let a = Action::try_from(code)?;
        self.step(&a)
    }

    /// Re-designates the hiders of the running episode.
    ///
    /// Exactly `num_hiders` distinct ids are required. Meant to be called right
    /// after `reset` to set up deterministic scenarios.
    pub fn set_hiders(&mut self, ids: &[PropId]) -> Result<()> {
        if self.phase != Phase::Running {
            return Err(EnvError::NotRunning(self.phase).into());
        }
        if ids.len() != self.config.num_hiders {
            return Err(EnvError::InvalidArgument(format!(
                "expected {} hiders, got {}",
                self.config.num_hiders,
                ids.len()
            ))
            .into());
        }
        for (i, id) in ids.iter().enumerate() {
            if id.0 >= self.props.len() {
                return Err(EnvError::InvalidArgument(format!("unknown prop {:?}", id)).into());
            }
            if ids[..i].contains(id) {
                return Err(EnvError::InvalidArgument(format!("duplicate prop {:?}", id)).into());
            }
        }

        for prop in self.props.iter_mut() {
            prop.is_hider = ids.contains(&prop.id);
        }
        Ok(())
    }

    fn info(&self) -> HideAndSeekInfo {
        HideAndSeekInfo {
            hiders_found: self.hiders_found,
            num_hiders: self.config.num_hiders,
            ammo_used: self.config.starting_ammo - self.ammo,
            step_count: self.step_count,
        }
    }

    fn observe(&self) -> HideAndSeekObs {
        let scale = self.config.arena_half_extent;
        let (x, z) = (self.seeker.x, self.seeker.z);
        let mut values = [0f32; OBS_DIM];
        values[0] = x / scale;
        values[1] = z / scale;
        values[2] = self.seeker.heading / 360.0;

        let mut targets = self
            .props
            .iter()
            .filter(|p| !p.checked)
            .map(|p| {
                let (dx, dz) = (p.position.0 - x, p.position.1 - z);
                (dx * dx + dz * dz, dx, dz)
            })
            .collect::<Vec<_>>();
        // Stable, so registry order breaks ties.
        targets.sort_by(|a, b| a.0.total_cmp(&b.0));

        for (i, (_, dx, dz)) in targets.into_iter().take(MAX_TRACKED_PROPS).enumerate() {
            values[3 + 2 * i] = dx / scale;
            values[4 + 2 * i] = dz / scale;
        }
        HideAndSeekObs::new(values)
    }

    fn translate(&mut self, sign: f32) {
        let (fx, fz) = self.seeker.forward();
        let d = sign * self.config.speed * self.config.dt;
        let e = self.config.arena_half_extent;
        self.seeker.x = (self.seeker.x + fx * d).clamp(-e, e);
        self.seeker.z = (self.seeker.z + fz * d).clamp(-e, e);
    }

    fn turn(&mut self, sign: f32) {
        let dh = sign * self.config.turn_rate * self.config.dt;
        self.seeker.heading = (self.seeker.heading + dh).rem_euclid(360.0);
    }

    /// Spends one ammo and resolves the ray cast. Returns the reward.
    fn fire(&mut self) -> f32 {
        let rewards = &self.config.reward;
        let mut reward = rewards.fire;
        self.ammo = self.ammo.saturating_sub(1);

        if let Some((id, dist)) = self.cast_ray() {
            let prop = &mut self.props[id.0];
            prop.checked = true;
            if prop.is_hider && !prop.shot {
                prop.shot = true;
                self.hiders_found += 1;
                reward += rewards.hit;
                debug!("Hit hider {:?} ({:?}) at {:.2}", id, prop.category, dist);
            } else if prop.is_hider {
                reward += rewards.repeat_hit;
                trace!("Hit shot hider {:?} again", id);
            } else {
                reward += rewards.wrong_hit;
                trace!("Hit decoy {:?} ({:?})", id, prop.category);
            }
        }
        reward
    }
}

impl Env for HideAndSeekEnv {
    type Config = HideAndSeekConfig;
    type Obs = HideAndSeekObs;
    type Act = Action;
    type Info = HideAndSeekInfo;

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        config.validate()?;
        let mut props = config
            .layout
            .iter()
            .enumerate()
            .map(|(i, e)| Prop::new(PropId(i), e.category, (e.x, e.z)))
            .collect::<Vec<_>>();
        for i in 0..props.len() {
            let base = props.iter().find(|b| props[i].fits_on(b)).map(|b| b.id);
            props[i].resting_on = base;
        }
        Ok(Self {
            config: config.clone(),
            rng: SmallRng::seed_from_u64(seed as u64),
            props,
            seeker: Seeker {
                x: config.start_position.0,
                z: config.start_position.1,
                heading: config.start_heading.rem_euclid(360.0),
            },
            ammo: config.starting_ammo,
            hiders_found: 0,
            step_count: 0,
            phase: Phase::Ready,
        })
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        for prop in self.props.iter_mut() {
            prop.clear_flags();
        }
        for ix in index::sample(&mut self.rng, self.props.len(), self.config.num_hiders) {
            self.props[ix].is_hider = true;
        }

        self.seeker = Seeker {
            x: self.config.start_position.0,
            z: self.config.start_position.1,
            heading: self.config.start_heading.rem_euclid(360.0),
        };
        self.ammo = self.config.starting_ammo;
        self.hiders_found = 0;
        self.step_count = 0;
        self.phase = Phase::Running;
        Ok(self.observe())
    }

    fn step(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)> {
        if self.phase != Phase::Running {
            return Err(EnvError::NotRunning(self.phase).into());
        }

        let mut reward = match a {
            Action::Forward => {
                self.translate(1.0);
                0.0
            }
            Action::Backward => {
                self.translate(-1.0);
                0.0
            }
            Action::TurnLeft => {
                self.turn(-1.0);
                0.0
            }
            Action::TurnRight => {
                self.turn(1.0);
                0.0
            }
            Action::Fire => self.fire(),
        };
        reward += self.config.reward.time;
        self.step_count += 1;

        let success = self.hiders_found == self.config.num_hiders;
        let out_of_ammo = self.ammo == 0;
        let out_of_time = self.step_count >= self.config.max_steps;
        let is_terminated = success || out_of_ammo;
        let is_truncated = !is_terminated && out_of_time;
        if success {
            reward += self.config.reward.success;
        }
        if is_terminated || is_truncated {
            self.phase = Phase::Terminal;
            debug!(
                "Episode ended at step {}: found {}/{}, ammo {}",
                self.step_count, self.hiders_found, self.config.num_hiders, self.ammo
            );
        }

        let record = Record::from_slice(&[
            ("hiders_found", Scalar(self.hiders_found as f32)),
            ("ammo", Scalar(self.ammo as f32)),
        ]);
        let step = Step::new(
            self.observe(),
            *a,
            reward,
            is_terminated,
            is_truncated,
            self.info(),
        );
        Ok((step, record))
    }
}
