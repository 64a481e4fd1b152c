//! Core functionalities.
mod agent;
mod env;
mod policy;
mod step;
mod trajectory;
pub use agent::Agent;
pub use env::Env;
pub use policy::Policy;
use std::fmt::Debug;
pub use step::{Info, Step};
pub use trajectory::Trajectory;

/// An observation of an environment.
pub trait Obs: Clone + Debug {
    /// Returns the number of elements in the observation.
    fn len(&self) -> usize;
}

/// An action of an environment.
pub trait Act: Clone + Debug {
    /// Returns the number of actions in the object.
    ///
    /// Environments in this library are not vectorized, so the default is 1.
    fn len(&self) -> usize {
        1
    }
}
