//! Yee grid structure for FDTD simulation.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::{EmError, Result};
use crate::units::{Length, Point, Time};

/// Speed of light in vacuum (m/s).
pub const SPEED_LIGHT: f64 = 299_792_458.0;

/// Cartesian field component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Component {
    X,
    Y,
    Z,
}

impl Component {
    pub const ALL: [Component; 3] = [Component::X, Component::Y, Component::Z];

    /// Index of the component in the last axis of a [`FieldArray`].
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Component::X => 0,
            Component::Y => 1,
            Component::Z => 2,
        }
    }
}

/// 4D array storage `[x, y, z, component]` for vector fields and
/// per-component material properties.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldArray {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
    data: Vec<f64>,
}

impl FieldArray {
    /// Create a new array filled with zeros.
    pub fn zeros(nx: usize, ny: usize, nz: usize) -> Self {
        Self::filled(nx, ny, nz, 0.0)
    }

    /// Create a new array filled with a constant value.
    pub fn filled(nx: usize, ny: usize, nz: usize, value: f64) -> Self {
        Self {
            nx,
            ny,
            nz,
            data: vec![value; nx * ny * nz * 3],
        }
    }

    pub fn shape(&self) -> [usize; 3] {
        [self.nx, self.ny, self.nz]
    }

    /// Flat offset of `(i, j, k, c)`, or `None` outside the array.
    #[inline]
    pub fn offset(&self, i: usize, j: usize, k: usize, c: Component) -> Option<usize> {
        if i < self.nx && j < self.ny && k < self.nz {
            Some(((i * self.ny + j) * self.nz + k) * 3 + c.index())
        } else {
            None
        }
    }

    /// Get value at (i, j, k, c); zero outside the array.
    #[inline]
    pub fn get(&self, i: usize, j: usize, k: usize, c: Component) -> f64 {
        self.offset(i, j, k, c).map_or(0.0, |n| self.data[n])
    }

    /// Set value at (i, j, k, c); ignored outside the array.
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, k: usize, c: Component, value: f64) {
        if let Some(n) = self.offset(i, j, k, c) {
            self.data[n] = value;
        }
    }

    /// Add to value at (i, j, k, c); ignored outside the array.
    #[inline]
    pub fn add(&mut self, i: usize, j: usize, k: usize, c: Component, value: f64) {
        if let Some(n) = self.offset(i, j, k, c) {
            self.data[n] += value;
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Clear all values to zero.
    pub fn clear(&mut self) {
        self.data.fill(0.0);
    }

    /// Sum all values in the array.
    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    /// Compute squared norm of all values.
    pub fn norm_squared(&self) -> f64 {
        self.data.iter().map(|&x| x * x).sum()
    }
}

/// Yee grid for FDTD simulation.
///
/// Fields and material properties are stored per cell and per component.
/// Quantities are in normalized units: the update coefficients fold the
/// vacuum constants into the Courant number.
#[derive(Debug, Clone)]
pub struct YeeGrid {
    /// Number of cells in x, y, z directions.
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,

    /// Grid spacing (m).
    pub grid_spacing: f64,

    /// Courant number `c * dt / dx`.
    pub courant_number: f64,

    /// Timestep (s).
    pub time_step: f64,

    /// Inverse relative permittivity (1/ε_r) per cell and component.
    pub inverse_permittivity: FieldArray,

    /// Inverse relative permeability (1/μ_r) per cell and component.
    pub inverse_permeability: FieldArray,

    /// Electric field.
    pub e: FieldArray,

    /// Magnetic field.
    pub h: FieldArray,

    /// Number of completed steps.
    pub timesteps_passed: u64,
}

impl YeeGrid {
    /// Create a new grid with uniform material.
    ///
    /// `courant_number` defaults to 99% of the stability limit `1/sqrt(D)`,
    /// where `D` counts the axes with more than one cell.
    pub fn new(
        shape: impl Into<Point>,
        grid_spacing: f64,
        permittivity: f64,
        permeability: f64,
        courant_number: Option<f64>,
    ) -> Result<Self> {
        if !(grid_spacing.is_finite() && grid_spacing > 0.0) {
            return Err(EmError::InvalidGrid(format!(
                "grid spacing must be positive, got {grid_spacing}"
            )));
        }
        check_material("permittivity", permittivity)?;
        check_material("permeability", permeability)?;

        let Point(shape) = shape.into();
        let nx = length_to_cells(shape[0], grid_spacing)?;
        let ny = length_to_cells(shape[1], grid_spacing)?;
        let nz = length_to_cells(shape[2], grid_spacing)?;
        if nx == 0 || ny == 0 || nz == 0 {
            return Err(EmError::InvalidGrid(format!(
                "every dimension needs at least one cell, got ({nx}, {ny}, {nz})"
            )));
        }

        let (dims, max_courant) = stability_limit([nx, ny, nz]);
        let courant_number = match courant_number {
            None => 0.99 * max_courant,
            Some(value) if value.is_finite() && value > 0.0 && value <= max_courant => value,
            Some(value) => {
                return Err(EmError::Courant {
                    value,
                    max: max_courant,
                    dims,
                });
            }
        };
        let time_step = courant_number * grid_spacing / SPEED_LIGHT;

        Ok(Self {
            nx,
            ny,
            nz,
            grid_spacing,
            courant_number,
            time_step,
            inverse_permittivity: FieldArray::filled(nx, ny, nz, 1.0 / permittivity),
            inverse_permeability: FieldArray::filled(nx, ny, nz, 1.0 / permeability),
            e: FieldArray::zeros(nx, ny, nz),
            h: FieldArray::zeros(nx, ny, nz),
            timesteps_passed: 0,
        })
    }

    pub fn shape(&self) -> [usize; 3] {
        [self.nx, self.ny, self.nz]
    }

    /// Simulated time (s).
    pub fn time(&self) -> f64 {
        self.timesteps_passed as f64 * self.time_step
    }

    /// Convert a length to a number of cells.
    pub fn resolve_length(&self, length: Length) -> Result<usize> {
        length_to_cells(length, self.grid_spacing)
    }

    /// Convert a duration to a number of timesteps.
    pub fn resolve_time(&self, time: Time) -> Result<f64> {
        match time {
            Time::Steps(n) => Ok(n as f64),
            Time::Seconds(s) if s.is_finite() && s >= 0.0 => {
                Ok((s / self.time_step + 0.5).floor())
            }
            Time::Seconds(s) => Err(EmError::InvalidTime(format!(
                "{s} s is not a finite non-negative duration"
            ))),
        }
    }

    /// Convert a point to grid indices, rejecting points outside the grid.
    pub fn resolve_point(&self, point: impl Into<Point>) -> Result<[usize; 3]> {
        let Point([x, y, z]) = point.into();
        let idx = [
            self.resolve_length(x)?,
            self.resolve_length(y)?,
            self.resolve_length(z)?,
        ];
        let shape = self.shape();
        if idx.iter().zip(shape.iter()).any(|(i, n)| i >= n) {
            return Err(EmError::OutOfBounds { point: idx, shape });
        }
        Ok(idx)
    }

    /// Inverse permittivity seen by component `c` at cell `idx`.
    #[inline]
    pub fn inverse_permittivity_at(&self, idx: [usize; 3], c: Component) -> f64 {
        self.inverse_permittivity.get(idx[0], idx[1], idx[2], c)
    }

    /// Set relative permittivity for a region.
    pub fn set_permittivity(
        &mut self,
        i_range: Range<usize>,
        j_range: Range<usize>,
        k_range: Range<usize>,
        permittivity: f64,
    ) -> Result<()> {
        check_material("permittivity", permittivity)?;
        for i in i_range.start..i_range.end.min(self.nx) {
            for j in j_range.start..j_range.end.min(self.ny) {
                for k in k_range.start..k_range.end.min(self.nz) {
                    for c in Component::ALL {
                        self.inverse_permittivity.set(i, j, k, c, 1.0 / permittivity);
                    }
                }
            }
        }
        Ok(())
    }

    /// Compute total electromagnetic energy in normalized units.
    ///
    /// Energy density: u = (1/2)(ε|E|² + μ|H|²)
    pub fn total_energy(&self) -> f64 {
        let e = self.e.as_slice().iter().zip(self.inverse_permittivity.as_slice());
        let h = self.h.as_slice().iter().zip(self.inverse_permeability.as_slice());
        e.chain(h).map(|(f, inv)| 0.5 * f * f / inv).sum()
    }
}

/// Dimensionality `D` of a grid and its Courant limit `1/sqrt(D)`.
pub(crate) fn stability_limit(shape: [usize; 3]) -> (usize, f64) {
    let dims = shape.iter().filter(|&&n| n > 1).count();
    (dims, (dims.max(1) as f64).powf(-0.5))
}

fn length_to_cells(length: Length, grid_spacing: f64) -> Result<usize> {
    match length {
        Length::Cells(n) => Ok(n),
        Length::Meters(m) if m.is_finite() && m >= 0.0 => {
            Ok((m / grid_spacing + 0.5).floor() as usize)
        }
        Length::Meters(m) => Err(EmError::InvalidLength(format!(
            "{m} m is not a finite non-negative length"
        ))),
    }
}

fn check_material(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(EmError::InvalidGrid(format!(
            "{name} must be positive, got {value}"
        )))
    }
}
