//! Electromagnetic sources for FDTD simulation.
//!
//! A [`LineSource`] spans a straight segment of grid cells and drives one
//! component of the E-field with a sinusoid. Its spatial envelope is a
//! Gaussian peaked at the middle cell of the line, weighted by the local
//! material response. The envelope width is pinned to half the largest
//! distance from the middle cell and is not configurable.

use std::f64::consts::PI;
use std::fmt;

use tracing::debug;

use crate::error::{EmError, Result};
use crate::grid::{Component, FieldArray, YeeGrid};
use crate::units::{Point, Time};

/// A source registered on a grid and driven once per timestep.
pub trait Source: fmt::Debug + fmt::Display {
    /// Add the source to the electric field.
    fn update_e(&self, grid: &mut YeeGrid);

    /// Add the source to the magnetic field.
    fn update_h(&self, grid: &mut YeeGrid);
}

/// A line source that has not been attached to a grid yet.
///
/// Endpoints and period may be given in grid units or physical units; they
/// are resolved once by [`LineSource::register`].
#[derive(Debug, Clone, PartialEq)]
pub struct LineSource {
    p0: Point,
    p1: Point,
    period: Time,
    power: f64,
    phase_shift: f64,
}

impl LineSource {
    /// Field component driven by line sources.
    pub const POLARIZATION: Component = Component::Z;

    /// Create a source spanning from `p0` to `p1` with a period of one
    /// timestep, unit power and no phase shift.
    pub fn new(p0: impl Into<Point>, p1: impl Into<Point>) -> Self {
        Self {
            p0: p0.into(),
            p1: p1.into(),
            period: Time::Steps(1),
            power: 1.0,
            phase_shift: 0.0,
        }
    }

    pub fn period(mut self, period: impl Into<Time>) -> Self {
        self.period = period.into();
        self
    }

    pub fn power(mut self, power: f64) -> Self {
        self.power = power;
        self
    }

    /// Phase offset of the waveform (rad).
    pub fn phase_shift(mut self, phase_shift: f64) -> Self {
        self.phase_shift = phase_shift;
        self
    }

    /// Resolve the source against `grid` and build its spatial profile.
    ///
    /// Consumes the source: a registered source stays bound to the grid it
    /// was registered on.
    pub fn register(self, grid: &YeeGrid) -> Result<BoundLineSource> {
        if !(self.power.is_finite() && self.power > 0.0) {
            return Err(EmError::InvalidPower(self.power));
        }
        if !self.phase_shift.is_finite() {
            return Err(EmError::InvalidPhase(self.phase_shift));
        }
        let period = grid.resolve_time(self.period)?;
        if period <= 0.0 {
            return Err(EmError::InvalidPeriod(format!(
                "{} resolves to {period} timesteps",
                self.period
            )));
        }

        let p0 = grid.resolve_point(self.p0)?;
        let p1 = grid.resolve_point(self.p1)?;
        if p0 == p1 {
            return Err(EmError::DegenerateLine { p0, p1 });
        }

        let coordinates = line_points(p0, p1);
        let weights = gaussian_weights(&coordinates);
        let profile: Vec<f64> = coordinates
            .iter()
            .zip(&weights)
            .map(|(&idx, w)| {
                let inv_eps = grid.inverse_permittivity_at(idx, Self::POLARIZATION);
                w * (self.power * inv_eps).sqrt()
            })
            .collect();

        let offsets = coordinates
            .iter()
            .map(|&[i, j, k]| {
                grid.e
                    .offset(i, j, k, Self::POLARIZATION)
                    .ok_or_else(|| EmError::OutOfBounds {
                        point: [i, j, k],
                        shape: grid.shape(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            ?p0,
            ?p1,
            period,
            power = self.power,
            points = coordinates.len(),
            "line source registered"
        );

        Ok(BoundLineSource {
            p0,
            p1,
            period,
            power: self.power,
            phase_shift: self.phase_shift,
            coordinates,
            profile,
            offsets,
            shape: grid.shape(),
        })
    }
}

impl fmt::Display for LineSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LineSource(p0={}, p1={}, period={}, power={})",
            self.p0, self.p1, self.period, self.power
        )
    }
}

/// A line source bound to a grid.
///
/// Coordinates and profile are fixed at registration and aligned by index.
#[derive(Debug, Clone)]
pub struct BoundLineSource {
    p0: [usize; 3],
    p1: [usize; 3],
    period: f64,
    power: f64,
    phase_shift: f64,
    coordinates: Vec<[usize; 3]>,
    profile: Vec<f64>,
    /// Flat offsets of the driven component in the grid's field arrays.
    offsets: Vec<usize>,
    shape: [usize; 3],
}

impl BoundLineSource {
    pub fn p0(&self) -> [usize; 3] {
        self.p0
    }

    pub fn p1(&self) -> [usize; 3] {
        self.p1
    }

    /// Period in timesteps.
    pub fn period(&self) -> f64 {
        self.period
    }

    pub fn power(&self) -> f64 {
        self.power
    }

    pub fn phase_shift(&self) -> f64 {
        self.phase_shift
    }

    pub fn polarization(&self) -> Component {
        LineSource::POLARIZATION
    }

    /// Grid cells covered by the source, in order along the line.
    pub fn coordinates(&self) -> &[[usize; 3]] {
        &self.coordinates
    }

    /// Amplitude per cell, aligned with [`Self::coordinates`].
    pub fn profile(&self) -> &[f64] {
        &self.profile
    }

    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    /// Temporal waveform at timestep `q`.
    #[inline]
    pub fn waveform(&self, q: u64) -> f64 {
        (2.0 * PI * q as f64 / self.period + self.phase_shift).sin()
    }

    /// Add `profile * waveform(q)` to the driven component of `field`.
    pub fn inject(&self, field: &mut FieldArray, q: u64) {
        debug_assert_eq!(field.shape(), self.shape);
        let value = self.waveform(q);
        let data = field.as_mut_slice();
        for (&n, &p) in self.offsets.iter().zip(&self.profile) {
            data[n] += p * value;
        }
    }
}

impl Source for BoundLineSource {
    fn update_e(&self, grid: &mut YeeGrid) {
        let q = grid.timesteps_passed;
        self.inject(&mut grid.e, q);
    }

    /// Line sources only drive the electric field.
    fn update_h(&self, _grid: &mut YeeGrid) {}
}

impl fmt::Display for BoundLineSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [x0, y0, z0] = self.p0;
        let [x1, y1, z1] = self.p1;
        write!(
            f,
            "LineSource(p0=({x0}, {y0}, {z0}), p1=({x1}, {y1}, {z1}), period={}, power={})",
            self.period, self.power
        )
    }
}

/// Grid cells on the segment from `p0` towards `p1`.
///
/// Produces `L = max(|Δx|, |Δy|, |Δz|)` points; `p0` is included and `p1`
/// is not. Each axis is sampled at `a0 + i (a1 - a0) / L`, floored. A zero
/// length segment yields the single point `p0`.
pub fn line_points(p0: [usize; 3], p1: [usize; 3]) -> Vec<[usize; 3]> {
    let delta = [0usize, 1, 2].map(|a| p1[a] as i64 - p0[a] as i64);
    let len = delta.iter().map(|d| d.abs()).max().unwrap_or(0);
    if len == 0 {
        return vec![p0];
    }
    (0..len)
        .map(|i| {
            [0usize, 1, 2].map(|a| (p0[a] as i64 * len + i * delta[a]).div_euclid(len) as usize)
        })
        .collect()
}

/// Normalized Gaussian weights for the cells of a line.
///
/// `d` is the squared index distance of each cell to the middle cell
/// `L / 2`; the weights are `exp(-d² / (2 (max(d) / 2)²))` scaled to sum
/// to one. A line whose cells all coincide with the middle cell gets equal
/// weights.
pub fn gaussian_weights(coordinates: &[[usize; 3]]) -> Vec<f64> {
    let Some(mid) = coordinates.get(coordinates.len() / 2) else {
        return Vec::new();
    };
    let dist: Vec<f64> = coordinates
        .iter()
        .map(|c| {
            (0..3)
                .map(|a| {
                    let d = c[a] as f64 - mid[a] as f64;
                    d * d
                })
                .sum()
        })
        .collect();

    let max = dist.iter().copied().fold(0.0, f64::max);
    let mut weights: Vec<f64> = if max == 0.0 {
        vec![1.0; dist.len()]
    } else {
        let sigma = 0.5 * max;
        dist.iter()
            .map(|d| (-d * d / (2.0 * sigma * sigma)).exp())
            .collect()
    };

    let total: f64 = weights.iter().sum();
    for w in &mut weights {
        *w /= total;
    }
    weights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vec3;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn grid(n: usize) -> YeeGrid {
        YeeGrid::new([n, n, n], 1e-9, 1.0, 1.0, None).unwrap()
    }

    #[test]
    fn test_line_points_along_axis() {
        let pts = line_points([0, 0, 0], [4, 0, 0]);
        assert_eq!(pts, vec![[0, 0, 0], [1, 0, 0], [2, 0, 0], [3, 0, 0]]);
    }

    #[test]
    fn test_line_points_fractional_slope() {
        let pts = line_points([0, 0, 0], [5, 3, 0]);
        let ys: Vec<usize> = pts.iter().map(|p| p[1]).collect();
        assert_eq!(ys, vec![0, 0, 1, 1, 2]);

        // Descending axes floor towards zero like the ascending ones
        let pts = line_points([3, 0, 2], [0, 5, 2]);
        let xs: Vec<usize> = pts.iter().map(|p| p[0]).collect();
        assert_eq!(xs, vec![3, 2, 1, 1, 0]);
        assert!(pts.iter().all(|p| p[2] == 2));
    }

    #[test]
    fn test_line_points_zero_length() {
        assert_eq!(line_points([2, 2, 2], [2, 2, 2]), vec![[2, 2, 2]]);
    }

    #[test]
    fn test_line_length_is_max_delta() {
        let mut rng = StdRng::seed_from_u64(123);
        for _ in 0..200 {
            let p0 = [0, 1, 2].map(|_| rng.gen_range(0..32usize));
            let p1 = [0, 1, 2].map(|_| rng.gen_range(0..32usize));
            if p0 == p1 {
                continue;
            }
            let expected = (0..3).map(|a| p0[a].abs_diff(p1[a])).max().unwrap();
            let pts = line_points(p0, p1);
            assert_eq!(pts.len(), expected);
            assert_eq!(pts[0], p0);

            // Consecutive cells touch
            for w in pts.windows(2) {
                assert!((0..3).all(|a| w[0][a].abs_diff(w[1][a]) <= 1));
            }
        }
    }

    #[test]
    fn test_gaussian_weights_normalized_and_centered() {
        let pts = line_points([0, 0, 0], [4, 0, 0]);
        let w = gaussian_weights(&pts);

        // d = [4, 1, 0, 1], sigma = 2
        let raw = [(-2.0f64).exp(), (-0.125f64).exp(), 1.0, (-0.125f64).exp()];
        let total: f64 = raw.iter().sum();
        for (wi, ri) in w.iter().zip(raw) {
            assert_relative_eq!(*wi, ri / total, epsilon = 1e-12);
        }
        assert_relative_eq!(w.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_gaussian_weights_single_point() {
        let w = gaussian_weights(&[[3, 3, 3]]);
        assert_eq!(w, vec![1.0]);
        assert!(gaussian_weights(&[]).is_empty());
    }

    #[test]
    fn test_profile_symmetric_about_middle() {
        let g = grid(16);
        for p1 in [[9, 1, 1], [10, 1, 1], [9, 9, 1], [1, 12, 12]] {
            let src = LineSource::new([1, 1, 1], p1).register(&g).unwrap();
            let profile = src.profile();
            let l = profile.len();
            let mid = l / 2;
            for k in 1..=mid.min(l - 1 - mid) {
                assert_relative_eq!(profile[mid - k], profile[mid + k], epsilon = 1e-12);
            }
            // Peak at the middle cell
            let max = profile.iter().copied().fold(0.0, f64::max);
            assert_eq!(profile[mid], max);
        }
    }

    #[test]
    fn test_profile_sums_to_amplitude() {
        let mut g = grid(16);
        g.set_permittivity(0..16, 0..16, 0..16, 2.25).unwrap();
        let src = LineSource::new([2, 3, 4], [12, 8, 4])
            .power(4.0)
            .register(&g)
            .unwrap();

        // sqrt(power / eps_r) = sqrt(4 / 2.25)
        let amplitude = (4.0f64 / 2.25).sqrt();
        let total: f64 = src.profile().iter().sum();
        assert_relative_eq!(total / amplitude, 1.0, epsilon = 1e-12);
        assert!(src.profile().iter().all(|&p| p >= 0.0));
        assert_eq!(src.coordinates().len(), src.profile().len());
    }

    #[test]
    fn test_profile_follows_local_permittivity() {
        let mut g = grid(16);
        g.set_permittivity(0..4, 0..16, 0..16, 4.0).unwrap();
        let uniform = LineSource::new([0, 5, 5], [8, 5, 5]).register(&grid(16)).unwrap();
        let mixed = LineSource::new([0, 5, 5], [8, 5, 5]).register(&g).unwrap();

        for (i, c) in mixed.coordinates().iter().enumerate() {
            let scale = if c[0] < 4 { 0.5 } else { 1.0 };
            let expected = scale * uniform.profile()[i];
            assert_relative_eq!(mixed.profile()[i], expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_single_cell_line() {
        let src = LineSource::new([3, 3, 3], [4, 3, 3]).register(&grid(8)).unwrap();
        assert_eq!(src.coordinates(), &[[3, 3, 3]]);
        assert_eq!(src.profile(), &[1.0]);
    }

    #[test]
    fn test_degenerate_line_rejected() {
        let err = LineSource::new([3, 3, 3], [3, 3, 3]).register(&grid(8)).unwrap_err();
        assert!(matches!(err, EmError::DegenerateLine { .. }));

        // Physical endpoints that round onto the same cell
        let p0 = Vec3::new(3.0e-9, 3.0e-9, 3.0e-9);
        let p1 = Vec3::new(3.2e-9, 3.0e-9, 3.0e-9);
        let err = LineSource::new(p0, p1).register(&grid(8)).unwrap_err();
        assert!(matches!(err, EmError::DegenerateLine { .. }));
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let g = grid(8);
        let line = || LineSource::new([0, 0, 0], [4, 0, 0]);

        assert!(matches!(line().power(0.0).register(&g), Err(EmError::InvalidPower(_))));
        assert!(matches!(line().power(-1.0).register(&g), Err(EmError::InvalidPower(_))));
        assert!(matches!(
            line().phase_shift(f64::NAN).register(&g),
            Err(EmError::InvalidPhase(_))
        ));
        assert!(matches!(
            line().period(Time::Steps(0)).register(&g),
            Err(EmError::InvalidPeriod(_))
        ));
        // Shorter than half a timestep rounds to zero
        assert!(matches!(
            line().period(Time::Seconds(0.4 * g.time_step)).register(&g),
            Err(EmError::InvalidPeriod(_))
        ));
        assert!(matches!(
            LineSource::new([0, 0, 0], [8, 0, 0]).register(&g),
            Err(EmError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_physical_period() {
        let g = grid(8);
        let src = LineSource::new([0, 0, 0], [4, 0, 0])
            .period(Time::Seconds(20.0 * g.time_step))
            .register(&g)
            .unwrap();
        assert_eq!(src.period(), 20.0);
    }

    #[test]
    fn test_injection_adds_profile_times_waveform() {
        let mut g = grid(8);
        g.e.set(1, 0, 0, Component::Z, 0.5);
        let src = LineSource::new([0, 0, 0], [4, 0, 0])
            .period(Time::Steps(4))
            .register(&g)
            .unwrap();

        g.timesteps_passed = 1;
        let before = g.e.clone();
        src.update_e(&mut g);

        // sin(2π/4) = 1
        for (c, p) in src.coordinates().iter().zip(src.profile()) {
            let [i, j, k] = *c;
            let expected = before.get(i, j, k, Component::Z) + p;
            assert_relative_eq!(g.e.get(i, j, k, Component::Z), expected, epsilon = 1e-12);
        }

        // Nothing outside the line or the driven component changes
        let touched = src.coordinates().len();
        let changed = g
            .e
            .as_slice()
            .iter()
            .zip(before.as_slice())
            .filter(|(a, b)| a != b)
            .count();
        assert_eq!(changed, touched);
        assert_eq!(g.e.get(1, 0, 0, Component::X), 0.0);
    }

    #[test]
    fn test_waveform_phase_and_periodicity() {
        let g = grid(8);
        let src = LineSource::new([0, 0, 0], [4, 0, 0])
            .period(Time::Steps(7))
            .phase_shift(0.3)
            .register(&g)
            .unwrap();

        assert_relative_eq!(src.waveform(0), 0.3f64.sin());
        for q in 0..20 {
            assert_abs_diff_eq!(src.waveform(q), src.waveform(q + 7), epsilon = 1e-9);
        }

        let mut a = FieldArray::zeros(8, 8, 8);
        let mut b = FieldArray::zeros(8, 8, 8);
        src.inject(&mut a, 3);
        src.inject(&mut b, 10);
        for (x, y) in a.as_slice().iter().zip(b.as_slice()) {
            assert_abs_diff_eq!(*x, *y, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_magnetic_update_is_noop() {
        let mut g = grid(8);
        g.h.set(2, 0, 0, Component::Z, 1.5);
        let src = LineSource::new([0, 0, 0], [4, 0, 0]).register(&g).unwrap();

        let h_before = g.h.clone();
        let e_before = g.e.clone();
        src.update_h(&mut g);
        assert_eq!(g.h, h_before);
        assert_eq!(g.e, e_before);
    }

    #[test]
    fn test_display() {
        let unbound = LineSource::new([0, 0, 0], [4, 0, 0])
            .period(Time::Steps(4))
            .power(2.0);
        assert_eq!(
            unbound.to_string(),
            "LineSource(p0=(0, 0, 0), p1=(4, 0, 0), period=4, power=2)"
        );
        let bound = unbound.register(&grid(8)).unwrap();
        assert_eq!(
            bound.to_string(),
            "LineSource(p0=(0, 0, 0), p1=(4, 0, 0), period=4, power=2)"
        );
    }
}
