//! Actions of the seeker.
use crate::EnvError;
use seeker_core::Act;
use std::convert::TryFrom;

/// The number of discrete actions.
pub const N_ACTIONS: usize = 5;

/// Discrete action of the seeker, integer-coded `0..5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Move along the heading.
    Forward = 0,
    /// Move against the heading.
    Backward = 1,
    /// Decrease the heading.
    TurnLeft = 2,
    /// Increase the heading.
    TurnRight = 3,
    /// Spend one ammo and cast a ray along the heading.
    Fire = 4,
}

impl Action {
    /// All actions in code order.
    pub const ALL: [Action; N_ACTIONS] = [
        Action::Forward,
        Action::Backward,
        Action::TurnLeft,
        Action::TurnRight,
        Action::Fire,
    ];

    /// The integer code of the action.
    pub fn code(self) -> i64 {
        self as i64
    }
}

impl Act for Action {}

impl TryFrom<i64> for Action {
    type Error = EnvError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        usize::try_from(code)
            .ok()
            .and_then(|ix| Action::ALL.get(ix).copied())
            .ok_or(EnvError::InvalidAction(code))
    }
}

impl From<Action> for i64 {
    fn from(a: Action) -> i64 {
        a.code()
    }
}
