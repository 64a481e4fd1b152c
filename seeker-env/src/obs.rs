//! Observation of the seeker.
use seeker_core::Obs;

/// The number of props whose offsets are part of the observation.
pub const MAX_TRACKED_PROPS: usize = 3;

/// Length of the observation vector.
pub const OBS_DIM: usize = 3 + 2 * MAX_TRACKED_PROPS;

/// Normalised observation.
///
/// Layout: `[x, z, heading, dx1, dz1, dx2, dz2, dx3, dz3]`. Positions and
/// offsets are divided by the arena half extent, the heading by 360. The
/// offsets point at the nearest unchecked props and are zero padded.
#[derive(Debug, Clone, PartialEq)]
pub struct HideAndSeekObs([f32; OBS_DIM]);

impl HideAndSeekObs {
    pub(crate) fn new(values: [f32; OBS_DIM]) -> Self {
        Self(values)
    }

    /// Values of the observation.
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Copies the values into a vector.
    pub fn to_vec(&self) -> Vec<f32> {
        self.0.to_vec()
    }
}

impl AsRef<[f32]> for HideAndSeekObs {
    fn as_ref(&self) -> &[f32] {
        &self.0
    }
}

impl Obs for HideAndSeekObs {
    fn len(&self) -> usize {
        OBS_DIM
    }
}
