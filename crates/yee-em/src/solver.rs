//! FDTD solver with sources.

use tracing::{info, instrument, trace};

use crate::error::Result;
use crate::grid::YeeGrid;
use crate::source::{LineSource, Source};
use crate::units::Time;

/// FDTD solver for Maxwell's equations.
#[derive(Debug)]
pub struct FdtdSolver {
    /// Yee grid.
    pub grid: YeeGrid,

    /// Registered sources.
    sources: Vec<Box<dyn Source>>,
}

impl FdtdSolver {
    /// Create a new FDTD solver.
    pub fn new(grid: YeeGrid) -> Self {
        Self {
            grid,
            sources: Vec::new(),
        }
    }

    /// Register a line source on the grid. Returns its index.
    pub fn add_source(&mut self, source: LineSource) -> Result<usize> {
        let bound = source.register(&self.grid)?;
        self.sources.push(Box::new(bound));
        Ok(self.sources.len() - 1)
    }

    pub fn sources(&self) -> &[Box<dyn Source>] {
        &self.sources
    }

    /// Advance simulation by one timestep.
    ///
    /// Sources see the index of the step being computed, so the first step
    /// evaluates their waveforms at zero.
    pub fn step(&mut self) {
        trace!(q = self.grid.timesteps_passed, "step");

        self.grid.update_e_field();
        for source in &self.sources {
            source.update_e(&mut self.grid);
        }

        self.grid.update_h_field();
        for source in &self.sources {
            source.update_h(&mut self.grid);
        }

        self.grid.timesteps_passed += 1;
    }

    /// Run simulation for a duration given in timesteps or seconds.
    /// Returns the number of steps taken.
    #[instrument(skip(self), name = "fdtd_run")]
    pub fn run(&mut self, duration: Time) -> Result<u64> {
        let steps = self.grid.resolve_time(duration)? as u64;
        info!(
            steps,
            time_step = self.grid.time_step,
            sources = self.sources.len(),
            "running simulation"
        );
        for _ in 0..steps {
            self.step();
        }
        info!(
            timesteps_passed = self.grid.timesteps_passed,
            time = self.grid.time(),
            "simulation finished"
        );
        Ok(steps)
    }

    /// Get total electromagnetic energy.
    pub fn total_energy(&self) -> f64 {
        self.grid.total_energy()
    }
}
