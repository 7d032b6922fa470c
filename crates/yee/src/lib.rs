//! yee — FDTD electromagnetic simulation with Gaussian line sources.
//!
//! This is the umbrella crate that re-exports the solver, grid and source
//! types from `yee-em`.

pub use yee_em::{self, *};
