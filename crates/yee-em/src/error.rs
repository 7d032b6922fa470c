//! Error types for yee-em.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmError {
    #[error("degenerate line source: endpoints {p0:?} and {p1:?} coincide")]
    DegenerateLine { p0: [usize; 3], p1: [usize; 3] },

    #[error("invalid period: {0}")]
    InvalidPeriod(String),

    #[error("invalid power: {0} (must be finite and positive)")]
    InvalidPower(f64),

    #[error("invalid phase shift: {0} (must be finite)")]
    InvalidPhase(f64),

    #[error("invalid length: {0}")]
    InvalidLength(String),

    #[error("invalid time: {0}")]
    InvalidTime(String),

    #[error("point {point:?} outside grid of shape {shape:?}")]
    OutOfBounds { point: [usize; 3], shape: [usize; 3] },

    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    #[error("courant number {value} exceeds the stability limit {max} for a {dims}D grid")]
    Courant { value: f64, max: f64, dims: usize },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EmError>;
