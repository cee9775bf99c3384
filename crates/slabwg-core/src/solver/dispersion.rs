//! Transcendental dispersion relation of the three-layer slab.
//!
//! For a trial effective index strictly inside the guided interval the
//! transverse problem separates into an oscillatory core wavenumber and
//! two evanescent decay constants. A guided mode of order m satisfies the
//! phase-matching condition
//!
//! ```text
//! h * width = m * pi + atan(s_sub * p / h) + atan(s_clad * q / h)
//! ```
//!
//! with `s_*` equal to 1 for TE and (n_core / n_side)^2 for TM. The scan
//! residual exposed here is `sin(phase)` where `phase` is the left-hand
//! side minus both arctangents: it vanishes exactly where the condition
//! holds for some integer m, and unlike the tangent form it is smooth and
//! bounded over the whole interval, so every sign change brackets a true
//! root.

use crate::domain::{Polarization, WaveguideParameters};
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum DispersionError {
    #[error(
        "trial effective index {neff} lies outside the guided interval ({lower}, {upper}); \
         no propagating/evanescent split exists there"
    )]
    OutsideGuidedInterval { neff: f64, lower: f64, upper: f64 },
}

/// Transverse wavenumber in the core and decay constants in the outer
/// layers, all per micron.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransverseWavenumbers {
    pub core: f64,
    pub substrate: f64,
    pub cladding: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct DispersionRelation<'a> {
    polarization: Polarization,
    parameters: &'a WaveguideParameters,
}

impl<'a> DispersionRelation<'a> {
    pub fn new(polarization: Polarization, parameters: &'a WaveguideParameters) -> Self {
        Self {
            polarization,
            parameters,
        }
    }

    pub const fn polarization(&self) -> Polarization {
        self.polarization
    }

    /// Computes h, p, q for a trial effective index, refusing evaluation
    /// outside the open guided interval.
    pub fn wavenumbers(&self, neff: f64) -> Result<TransverseWavenumbers, DispersionError> {
        let (lower, upper) = self.parameters.guided_interval();
        if !neff.is_finite() || neff <= lower || neff >= upper {
            return Err(DispersionError::OutsideGuidedInterval { neff, lower, upper });
        }

        let k0 = self.parameters.free_space_wavenumber();
        let n_core = self.parameters.core_index();
        let n_sub = self.parameters.substrate_index();
        let n_clad = self.parameters.cladding_index();

        Ok(TransverseWavenumbers {
            core: k0 * (n_core * n_core - neff * neff).sqrt(),
            substrate: k0 * (neff * neff - n_sub * n_sub).sqrt(),
            cladding: k0 * (neff * neff - n_clad * n_clad).sqrt(),
        })
    }

    /// Accumulated transverse phase `h*width - atan(s_sub*p/h) -
    /// atan(s_clad*q/h)`. Strictly increasing as neff decreases; equals
    /// m*pi exactly at the order-m mode.
    pub fn phase(&self, neff: f64) -> Result<f64, DispersionError> {
        let k = self.wavenumbers(neff)?;
        let s_sub = self.polarization.substrate_scaling(self.parameters);
        let s_clad = self.polarization.cladding_scaling(self.parameters);

        Ok(k.core * self.parameters.width()
            - (s_sub * k.substrate / k.core).atan()
            - (s_clad * k.cladding / k.core).atan())
    }

    /// Scan residual `sin(phase)`: zero exactly at the guided-mode roots,
    /// bounded and pole-free across the interval.
    pub fn residual(&self, neff: f64) -> Result<f64, DispersionError> {
        self.phase(neff).map(f64::sin)
    }

    /// Distance of the accumulated phase from the order-m branch, in
    /// radians. Zero at the converged order-m root.
    pub fn phase_defect(&self, neff: f64, order: usize) -> Result<f64, DispersionError> {
        self.phase(neff).map(|phase| phase - order as f64 * PI)
    }
}
