//! Electromagnetic field simulation using FDTD (Finite-Difference Time-Domain).
//!
//! Implements a Yee grid FDTD solver for Maxwell's equations with:
//! - Electric (E) and magnetic (H) field evolution in normalized units
//! - Per-cell, per-component permittivity and permeability
//! - Gaussian-apodized sinusoidal line sources
//! - Lengths and times in grid units or SI units
//!
//! # Example
//!
//! ```
//! use yee_em::{FdtdSolver, LineSource, Time, YeeGrid};
//!
//! // 1 µm × 1 µm × 1 cell slab with 10 nm spacing
//! let grid = YeeGrid::new([100, 100, 1], 1e-8, 1.0, 1.0, None)?;
//! let mut solver = FdtdSolver::new(grid);
//!
//! // Line source along y, 20 timesteps per period
//! solver.add_source(
//!     LineSource::new([30, 20, 0], [30, 80, 0])
//!         .period(Time::Steps(20))
//!         .power(1.0),
//! )?;
//!
//! solver.run(Time::Steps(50))?;
//! assert_eq!(solver.grid.timesteps_passed, 50);
//! # Ok::<(), yee_em::EmError>(())
//! ```

pub mod config;
pub mod error;
pub mod fdtd;
pub mod grid;
pub mod solver;
pub mod source;
pub mod units;

pub use config::{GridConfig, LineSourceConfig, SimulationConfig};
pub use error::{EmError, Result};
pub use grid::{Component, FieldArray, SPEED_LIGHT, YeeGrid};
pub use solver::FdtdSolver;
pub use source::{BoundLineSource, LineSource, Source, gaussian_weights, line_points};
pub use units::{Length, Point, Time};

/// 3D vector alias.
pub type Vec3 = nalgebra::Vector3<f64>;
