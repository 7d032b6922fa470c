//! Drive a 2D slab with a line source and report the field at a probe cell.
//!
//! Run with `RUST_LOG=debug` to see source registration.

use tracing_subscriber::EnvFilter;
use yee::{Component, FdtdSolver, LineSource, Time, Vec3, YeeGrid};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let wavelength = 1.55e-6;
    let grid_spacing = 0.1 * wavelength;
    let mut grid = YeeGrid::new([120, 120, 1], grid_spacing, 1.0, 1.0, None)?;

    // Dielectric block on the right half
    grid.set_permittivity(60..120, 0..120, 0..1, 2.25)?;

    let mut solver = FdtdSolver::new(grid);
    solver.add_source(
        LineSource::new(
            Vec3::new(20.0 * grid_spacing, 30.0 * grid_spacing, 0.0),
            Vec3::new(20.0 * grid_spacing, 90.0 * grid_spacing, 0.0),
        )
        .period(Time::Seconds(wavelength / yee::SPEED_LIGHT))
        .power(1.0),
    )?;
    for source in solver.sources() {
        println!("{source}");
    }

    for _ in 0..10 {
        solver.run(Time::Steps(25))?;
        let ez = solver.grid.e.get(40, 60, 0, Component::Z);
        println!(
            "step {:4}: Ez(40, 60) = {ez:+.4e}, energy = {:.4e}",
            solver.grid.timesteps_passed,
            solver.total_energy()
        );
    }

    Ok(())
}
