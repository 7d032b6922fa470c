//! JSON simulation setup.
//!
//! ```json
//! {
//!   "grid": { "shape": [64, 64, 1], "grid_spacing": 1.55e-7 },
//!   "sources": [
//!     { "p0": [10, 20, 0], "p1": [10, 44, 0], "period": 2.0e-14, "power": 1.0 }
//!   ]
//! }
//! ```
//!
//! Integers are grid units, floats are physical units.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::grid::YeeGrid;
use crate::solver::FdtdSolver;
use crate::source::LineSource;
use crate::units::{Point, Time};

fn one() -> f64 {
    1.0
}

fn one_step() -> Time {
    Time::Steps(1)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    pub shape: Point,
    pub grid_spacing: f64,
    #[serde(default = "one")]
    pub permittivity: f64,
    #[serde(default = "one")]
    pub permeability: f64,
    #[serde(default)]
    pub courant_number: Option<f64>,
}

impl GridConfig {
    pub fn build(&self) -> Result<YeeGrid> {
        YeeGrid::new(
            self.shape,
            self.grid_spacing,
            self.permittivity,
            self.permeability,
            self.courant_number,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSourceConfig {
    pub p0: Point,
    pub p1: Point,
    #[serde(default = "one_step")]
    pub period: Time,
    #[serde(default = "one")]
    pub power: f64,
    #[serde(default)]
    pub phase_shift: f64,
}

impl From<&LineSourceConfig> for LineSource {
    fn from(cfg: &LineSourceConfig) -> Self {
        LineSource::new(cfg.p0, cfg.p1)
            .period(cfg.period)
            .power(cfg.power)
            .phase_shift(cfg.phase_shift)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub grid: GridConfig,
    #[serde(default)]
    pub sources: Vec<LineSourceConfig>,
}

impl SimulationConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build the grid and register every source on it.
    pub fn build(&self) -> Result<FdtdSolver> {
        let mut solver = FdtdSolver::new(self.grid.build()?);
        for source in &self.sources {
            solver.add_source(source.into())?;
        }
        Ok(solver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EmError;
    use crate::units::Length;

    const JSON: &str = r#"{
        "grid": { "shape": [32, 32, 1], "grid_spacing": 1e-7, "permittivity": 2.0 },
        "sources": [
            { "p0": [4, 10, 0], "p1": [4, 22, 0], "period": 20 },
            { "p0": [2.0e-6, 1.0e-6, 0], "p1": [2.0e-6, 2.0e-6, 0], "power": 0.5, "phase_shift": 1.0 }
        ]
    }"#;

    #[test]
    fn test_parse_defaults_and_units() {
        let cfg = SimulationConfig::from_json(JSON).unwrap();
        assert_eq!(cfg.grid.permeability, 1.0);
        assert_eq!(cfg.grid.courant_number, None);
        assert_eq!(cfg.sources[0].period, Time::Steps(20));
        assert_eq!(cfg.sources[0].power, 1.0);
        assert_eq!(cfg.sources[1].period, Time::Steps(1));
        assert_eq!(cfg.sources[1].p0.0[0], Length::Meters(2.0e-6));
        assert_eq!(cfg.sources[1].p0.0[2], Length::Cells(0));
    }

    #[test]
    fn test_build_solver() {
        let solver = SimulationConfig::from_json(JSON).unwrap().build().unwrap();
        assert_eq!(solver.grid.shape(), [32, 32, 1]);
        assert_eq!(solver.sources().len(), 2);
        assert_eq!(
            solver.sources()[1].to_string(),
            "LineSource(p0=(20, 10, 0), p1=(20, 20, 0), period=1, power=0.5)"
        );
    }

    #[test]
    fn test_round_trip() {
        let cfg = SimulationConfig::from_json(JSON).unwrap();
        let again = SimulationConfig::from_json(&cfg.to_json().unwrap()).unwrap();
        assert_eq!(cfg, again);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            SimulationConfig::from_json("{ \"grid\": 3 }"),
            Err(EmError::Json(_))
        ));

        let bad = r#"{ "grid": { "shape": [8, 8, 8], "grid_spacing": 1e-7 },
                       "sources": [ { "p0": [1, 1, 1], "p1": [1, 1, 1] } ] }"#;
        let err = SimulationConfig::from_json(bad).unwrap().build().unwrap_err();
        assert!(matches!(err, EmError::DegenerateLine { .. }));
    }
}
