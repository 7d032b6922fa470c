//! Quantities given either in grid units or in physical units.
//!
//! Lengths, times and points are stored as given and only resolved into
//! canonical grid units against a [`YeeGrid`](crate::YeeGrid). Integers are
//! grid units (cells, timesteps), floats are SI units (meters, seconds).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Vec3;

/// A length along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Length {
    /// Number of grid cells.
    Cells(usize),
    /// Physical length (m).
    Meters(f64),
}

impl From<usize> for Length {
    fn from(cells: usize) -> Self {
        Length::Cells(cells)
    }
}

impl From<f64> for Length {
    fn from(meters: f64) -> Self {
        Length::Meters(meters)
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Length::Cells(n) => write!(f, "{n}"),
            Length::Meters(m) => write!(f, "{m:e}m"),
        }
    }
}

/// A duration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Time {
    /// Number of timesteps.
    Steps(u64),
    /// Physical time (s).
    Seconds(f64),
}

impl From<u64> for Time {
    fn from(steps: u64) -> Self {
        Time::Steps(steps)
    }
}

impl From<f64> for Time {
    fn from(seconds: f64) -> Self {
        Time::Seconds(seconds)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Time::Steps(n) => write!(f, "{n}"),
            Time::Seconds(s) => write!(f, "{s:e}s"),
        }
    }
}

/// A 3D point whose components may mix grid and physical units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point(pub [Length; 3]);

impl Point {
    pub fn new(x: impl Into<Length>, y: impl Into<Length>, z: impl Into<Length>) -> Self {
        Point([x.into(), y.into(), z.into()])
    }
}

impl From<[usize; 3]> for Point {
    fn from([x, y, z]: [usize; 3]) -> Self {
        Point([Length::Cells(x), Length::Cells(y), Length::Cells(z)])
    }
}

/// Physical position in meters.
impl From<Vec3> for Point {
    fn from(v: Vec3) -> Self {
        Point([Length::Meters(v.x), Length::Meters(v.y), Length::Meters(v.z)])
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [x, y, z] = &self.0;
        write!(f, "({x}, {y}, {z})")
    }
}
