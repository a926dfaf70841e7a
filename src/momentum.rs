//! This module implements some domain-specific 4-momentum handling logic.

use crate::numeric::{
    floats::consts::{PI, TAU},
    Float,
};
use nalgebra::SVector;
use prefix_num_ops::real::*;

/// 4-momentum dimension
pub const MOMENTUM_DIM: usize = 4;

/// Relativistic 4-momentum
pub type Momentum = SVector<Float, MOMENTUM_DIM>;

/// Convenience const for accessing the X coordinate of a 4-vector
pub const X: usize = 0;

/// Convenience const for accessing the Y coordinate of a 4-vector
pub const Y: usize = 1;

/// Convenience const for accessing the Z coordinate of a 4-vector
pub const Z: usize = 2;

/// Convenience const for accessing the E coordinate of a 4-vector
pub const E: usize = 3;

/// Build a 4-momentum from collider coordinates (pT, η, φ, m)
pub fn from_pt_eta_phi_m(pt: Float, eta: Float, phi: Float, mass: Float) -> Momentum {
    let px = pt * phi.cos();
    let py = pt * phi.sin();
    let pz = pt * eta.sinh();
    let p_norm = pt * eta.cosh();
    let e = sqrt(p_norm.powi(2) + mass.powi(2));
    Momentum::new(px, py, pz, e)
}

/// Invariant mass of a 4-momentum
///
/// Space-like vectors (which only arise from rounding errors on nearly
/// massless systems) get a negative mass, following the usual HEP convention.
///
pub fn invariant_mass(p: &Momentum) -> Float {
    let m2 = p[E].powi(2) - p.xyz().norm_squared();
    if m2 >= 0. {
        sqrt(m2)
    } else {
        -sqrt(-m2)
    }
}

/// Azimuthal angle difference, wrapped into [-π, π)
pub fn delta_phi(phi1: Float, phi2: Float) -> Float {
    (phi1 - phi2 + PI).rem_euclid(TAU) - PI
}

/// Angular distance ΔR = √(Δη² + Δφ²) between two directions
pub fn delta_r(eta1: Float, phi1: Float, eta2: Float, phi2: Float) -> Float {
    sqrt((eta1 - eta2).powi(2) + delta_phi(phi1, phi2).powi(2))
}
