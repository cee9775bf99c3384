//! Physical constants for the micron-based unit system of the solver.
//!
//! Lengths are microns throughout, so the electromagnetic constants carry
//! per-micron units. Shared here to avoid ad hoc per-module literals.

pub const PI: f64 = std::f64::consts::PI;
pub const TWO_PI: f64 = 2.0 * PI;

/// Speed of light in microns per second.
pub const SPEED_OF_LIGHT: f64 = 3.0e14;
/// Permittivity of free space in Farads per micron.
pub const EPSILON_0: f64 = 8.85e-18;
/// Permeability of free space in Henrys per micron.
pub const MU_0: f64 = 12.566e-13;
/// Impedance of free space, sqrt(MU_0 / EPSILON_0), in Ohms.
pub const ETA_0: f64 = 376.813_879_8_f64;

/// Convergence epsilon used by the bracketed root refinement.
pub const CONVERGENCE_EPS: f64 = 3.0e-12;
