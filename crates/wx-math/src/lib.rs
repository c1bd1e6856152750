//! Weather intelligence math utilities.

pub mod math;

pub use math::linalg::*;
pub use math::rng::*;
pub use math::stable::*;
