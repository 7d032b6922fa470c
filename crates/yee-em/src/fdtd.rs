//! FDTD update equations for Maxwell's equations.

use crate::grid::Component::{self, X, Y, Z};
use crate::grid::{FieldArray, YeeGrid, stability_limit};

/// Forward difference of component `c` along `axis` at (i, j, k).
///
/// Zero on the last cell of the axis.
#[inline]
fn forward(f: &FieldArray, i: usize, j: usize, k: usize, axis: Component, c: Component) -> f64 {
    let (n, idx) = match axis {
        X => (f.nx, i),
        Y => (f.ny, j),
        Z => (f.nz, k),
    };
    if idx + 1 >= n {
        return 0.0;
    }
    let next = match axis {
        X => f.get(i + 1, j, k, c),
        Y => f.get(i, j + 1, k, c),
        Z => f.get(i, j, k + 1, c),
    };
    next - f.get(i, j, k, c)
}

/// Backward difference of component `c` along `axis` at (i, j, k).
///
/// Zero on the first cell of the axis.
#[inline]
fn backward(f: &FieldArray, i: usize, j: usize, k: usize, axis: Component, c: Component) -> f64 {
    let prev = match axis {
        X if i > 0 => f.get(i - 1, j, k, c),
        Y if j > 0 => f.get(i, j - 1, k, c),
        Z if k > 0 => f.get(i, j, k - 1, c),
        _ => return 0.0,
    };
    f.get(i, j, k, c) - prev
}

/// Curl of the electric field using forward differences (E on cell edges).
pub fn curl_e(e: &FieldArray) -> FieldArray {
    let mut curl = FieldArray::zeros(e.nx, e.ny, e.nz);
    for i in 0..e.nx {
        for j in 0..e.ny {
            for k in 0..e.nz {
                // ∂Ez/∂y - ∂Ey/∂z
                let cx = forward(e, i, j, k, Y, Z) - forward(e, i, j, k, Z, Y);
                // ∂Ex/∂z - ∂Ez/∂x
                let cy = forward(e, i, j, k, Z, X) - forward(e, i, j, k, X, Z);
                // ∂Ey/∂x - ∂Ex/∂y
                let cz = forward(e, i, j, k, X, Y) - forward(e, i, j, k, Y, X);
                curl.set(i, j, k, X, cx);
                curl.set(i, j, k, Y, cy);
                curl.set(i, j, k, Z, cz);
            }
        }
    }
    curl
}

/// Curl of the magnetic field using backward differences (H on cell faces).
pub fn curl_h(h: &FieldArray) -> FieldArray {
    let mut curl = FieldArray::zeros(h.nx, h.ny, h.nz);
    for i in 0..h.nx {
        for j in 0..h.ny {
            for k in 0..h.nz {
                let cx = backward(h, i, j, k, Y, Z) - backward(h, i, j, k, Z, Y);
                let cy = backward(h, i, j, k, Z, X) - backward(h, i, j, k, X, Z);
                let cz = backward(h, i, j, k, X, Y) - backward(h, i, j, k, Y, X);
                curl.set(i, j, k, X, cx);
                curl.set(i, j, k, Y, cy);
                curl.set(i, j, k, Z, cz);
            }
        }
    }
    curl
}

/// FDTD update functions on the Yee grid.
///
/// In normalized units the curl equations reduce to
///   E += S / ε ∇ × H
///   H -= S / μ ∇ × E
/// with S the Courant number. Sources are applied by the solver between
/// the two half steps.
impl YeeGrid {
    /// Update E-field using ∇ × H.
    pub fn update_e_field(&mut self) {
        let curl = curl_h(&self.h);
        let sc = self.courant_number;
        for ((e, inv), c) in self
            .e
            .as_mut_slice()
            .iter_mut()
            .zip(self.inverse_permittivity.as_slice())
            .zip(curl.as_slice())
        {
            *e += sc * inv * c;
        }
    }

    /// Update H-field using ∇ × E.
    pub fn update_h_field(&mut self) {
        let curl = curl_e(&self.e);
        let sc = self.courant_number;
        for ((h, inv), c) in self
            .h
            .as_mut_slice()
            .iter_mut()
            .zip(self.inverse_permeability.as_slice())
            .zip(curl.as_slice())
        {
            *h -= sc * inv * c;
        }
    }

    /// Maximum stable Courant number, 1/√D.
    pub fn max_courant_number(&self) -> f64 {
        stability_limit(self.shape()).1
    }

    /// Check if the simulation is stable according to CFL condition.
    pub fn is_stable(&self) -> bool {
        self.courant_number <= self.max_courant_number()
    }
}
