//! Core math modules.

pub mod linalg;
pub mod rng;
pub mod stable;
