//! Configuration of [`HideAndSeekEnv`](crate::HideAndSeekEnv).
use crate::{EnvError, PropCategory};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// A prop of the layout, placed at `(x, z)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutEntry {
    /// Kind of prop.
    pub category: PropCategory,

    /// Position on the x axis.
    pub x: f32,

    /// Position on the z axis.
    pub z: f32,
}

impl LayoutEntry {
    /// Constructs an entry.
    pub fn new(category: PropCategory, x: f32, z: f32) -> Self {
        Self { category, x, z }
    }
}

/// Reward constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Added at every step.
    pub time: f32,

    /// Added at every fire action, hit or miss.
    pub fire: f32,

    /// Added when a hider is hit for the first time.
    pub hit: f32,

    /// Added when a prop that is not a hider is hit.
    pub wrong_hit: f32,

    /// Added when a hider that was already shot is hit again.
    pub repeat_hit: f32,

    /// Added once when the last hider is found.
    pub success: f32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            time: -0.01,
            fire: -0.1,
            hit: 10.0,
            wrong_hit: -1.0,
            repeat_hit: -1.0,
            success: 100.0,
        }
    }
}

/// The reference office: three desk rows on each side, two partitions and
/// two plants in the middle aisle.
fn default_layout() -> Vec<LayoutEntry> {
    use PropCategory::*;
    let mut layout = Vec::with_capacity(22);
    for &x in &[-12f32, 12.0] {
        for &z in &[10f32, 0.0, -10.0] {
            layout.push(LayoutEntry::new(Desk, x, z));
            layout.push(LayoutEntry::new(Monitor, x, z));
            layout.push(LayoutEntry::new(Chair, x, z - 2.0));
        }
        layout.push(LayoutEntry::new(Partition, x.signum() * 8.0, 5.0));
    }
    layout.push(LayoutEntry::new(Plant, 0.0, 0.0));
    layout.push(LayoutEntry::new(Plant, 0.0, 5.0));
    layout
}

/// Configuration of [`HideAndSeekEnv`](crate::HideAndSeekEnv).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HideAndSeekConfig {
    /// Props of the arena. One registry slot per entry.
    pub layout: Vec<LayoutEntry>,

    /// The number of hiders drawn from the layout at every reset.
    pub num_hiders: usize,

    /// Ammo at the start of an episode.
    pub starting_ammo: usize,

    /// Episodes are cut after this many steps.
    pub max_steps: usize,

    /// Start position `(x, z)` of the seeker.
    pub start_position: (f32, f32),

    /// Start heading of the seeker in degrees.
    pub start_heading: f32,

    /// Movement speed in units per second.
    pub speed: f32,

    /// Turn rate in degrees per second.
    pub turn_rate: f32,

    /// Simulation tick in seconds.
    pub dt: f32,

    /// Maximum distance of a fire ray.
    pub fire_range: f32,

    /// The seeker is kept inside `[-arena_half_extent, arena_half_extent]^2`.
    /// Also the normalisation scale of positions in observations.
    pub arena_half_extent: f32,

    /// Reward constants.
    pub reward: RewardConfig,
}

impl Default for HideAndSeekConfig {
    fn default() -> Self {
        Self {
            layout: default_layout(),
            num_hiders: 3,
            starting_ammo: 10,
            max_steps: 1000,
            start_position: (0.0, -15.0),
            start_heading: 0.0,
            speed: 5.0,
            turn_rate: 90.0,
            dt: 0.1,
            fire_range: 10.0,
            arena_half_extent: 20.0,
            reward: RewardConfig::default(),
        }
    }
}

impl HideAndSeekConfig {
    /// Sets the layout.
    pub fn layout(mut self, v: Vec<LayoutEntry>) -> Self {
        self.layout = v;
        self
    }

    /// Sets the number of hiders.
    pub fn num_hiders(mut self, v: usize) -> Self {
        self.num_hiders = v;
        self
    }

    /// Sets the ammo at the start of an episode.
    pub fn starting_ammo(mut self, v: usize) -> Self {
        self.starting_ammo = v;
        self
    }

    /// Sets the maximum number of steps in an episode.
    pub fn max_steps(mut self, v: usize) -> Self {
        self.max_steps = v;
        self
    }

    /// Sets the start pose of the seeker.
    pub fn start_pose(mut self, position: (f32, f32), heading: f32) -> Self {
        self.start_position = position;
        self.start_heading = heading;
        self
    }

    /// Sets the movement speed.
    pub fn speed(mut self, v: f32) -> Self {
        self.speed = v;
        self
    }

    /// Sets the turn rate.
    pub fn turn_rate(mut self, v: f32) -> Self {
        self.turn_rate = v;
        self
    }

    /// Sets the simulation tick.
    pub fn dt(mut self, v: f32) -> Self {
        self.dt = v;
        self
    }

    /// Sets the range of fire rays.
    pub fn fire_range(mut self, v: f32) -> Self {
        self.fire_range = v;
        self
    }

    /// Sets the reward constants.
    pub fn reward(mut self, v: RewardConfig) -> Self {
        self.reward = v;
        self
    }

    /// Checks that the configuration can produce a valid environment.
    pub fn validate(&self) -> Result<(), EnvError> {
        let invalid = |msg: String| Err(EnvError::InvalidConfig(msg));
        if self.num_hiders == 0 {
            return invalid("num_hiders must be positive".into());
        }
        if self.num_hiders > self.layout.len() {
            return invalid(format!(
                "num_hiders ({}) exceeds the number of props ({})",
                self.num_hiders,
                self.layout.len()
            ));
        }
        if !(self.dt > 0.0) {
            return invalid(format!("dt must be positive, got {}", self.dt));
        }
        if !(self.fire_range > 0.0) {
            return invalid(format!("fire_range must be positive, got {}", self.fire_range));
        }
        if !(self.arena_half_extent > 0.0) {
            return invalid(format!(
                "arena_half_extent must be positive, got {}",
                self.arena_half_extent
            ));
        }
        Ok(())
    }

    /// Constructs [`HideAndSeekConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`HideAndSeekConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
