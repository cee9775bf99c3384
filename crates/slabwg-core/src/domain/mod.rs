pub mod errors;

pub use errors::{ExitClass, SlabError, SlabErrorCategory, SlabResult};

use crate::common::constants::TWO_PI;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Guided-mode polarization family of the planar slab.
///
/// The legacy solver encoded this as paired boolean flags (`TE`/`TM`,
/// equivalently `Ex`/`Ey` propagation); here the boundary-condition
/// weighting of the dispersion relation lives on the variant itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Polarization {
    Te,
    Tm,
}

impl Polarization {
    pub const ALL: [Polarization; 2] = [Polarization::Te, Polarization::Tm];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Te => "TE",
            Self::Tm => "TM",
        }
    }

    /// Arctangent weighting at the core/substrate interface: 1 for TE,
    /// (n_core / n_sub)^2 for TM.
    pub fn substrate_scaling(self, parameters: &WaveguideParameters) -> f64 {
        match self {
            Self::Te => 1.0,
            Self::Tm => (parameters.core_index() / parameters.substrate_index()).powi(2),
        }
    }

    /// Arctangent weighting at the core/cladding interface: 1 for TE,
    /// (n_core / n_clad)^2 for TM.
    pub fn cladding_scaling(self, parameters: &WaveguideParameters) -> f64 {
        match self {
            Self::Te => 1.0,
            Self::Tm => (parameters.core_index() / parameters.cladding_index()).powi(2),
        }
    }
}

impl Display for Polarization {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

/// Validated, immutable description of the three-layer slab.
///
/// Construction enforces the guidance invariant (core index strictly
/// greater than both surrounding indices), so every downstream consumer
/// can assume a guidable geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveguideParameters {
    width: f64,
    wavelength: f64,
    n_core: f64,
    n_sub: f64,
    n_clad: f64,
}

impl WaveguideParameters {
    pub fn new(
        width: f64,
        wavelength: f64,
        n_core: f64,
        n_sub: f64,
        n_clad: f64,
    ) -> SlabResult<Self> {
        if !width.is_finite() || width <= 0.0 {
            return Err(SlabError::input_validation(
                "INPUT.WIDTH",
                format!("waveguide width must be positive and finite, got {width}"),
            ));
        }
        if !wavelength.is_finite() || wavelength <= 0.0 {
            return Err(SlabError::input_validation(
                "INPUT.WAVELENGTH",
                format!("operating wavelength must be positive and finite, got {wavelength}"),
            ));
        }
        for (label, index) in [("core", n_core), ("substrate", n_sub), ("cladding", n_clad)] {
            if !index.is_finite() || index < 1.0 {
                return Err(SlabError::input_validation(
                    "INPUT.REFRACTIVE_INDEX",
                    format!("{label} refractive index must be finite and >= 1, got {index}"),
                ));
            }
        }
        if n_core <= n_sub.max(n_clad) {
            return Err(SlabError::input_validation(
                "INPUT.GUIDANCE",
                format!(
                    "core index {n_core} must strictly exceed substrate index {n_sub} and \
                     cladding index {n_clad} for guided modes to exist"
                ),
            ));
        }

        Ok(Self {
            width,
            wavelength,
            n_core,
            n_sub,
            n_clad,
        })
    }

    pub const fn width(&self) -> f64 {
        self.width
    }

    pub const fn wavelength(&self) -> f64 {
        self.wavelength
    }

    pub const fn core_index(&self) -> f64 {
        self.n_core
    }

    pub const fn substrate_index(&self) -> f64 {
        self.n_sub
    }

    pub const fn cladding_index(&self) -> f64 {
        self.n_clad
    }

    /// Free-space wavenumber k0 = 2 pi / lambda, per micron.
    pub fn free_space_wavenumber(&self) -> f64 {
        TWO_PI / self.wavelength
    }

    /// Open interval of effective indices that can carry a guided mode:
    /// (max(n_sub, n_clad), n_core).
    pub fn guided_interval(&self) -> (f64, f64) {
        (self.n_sub.max(self.n_clad), self.n_core)
    }

    /// Normalized frequency V = k0 * width * sqrt(n_core^2 - max_side^2).
    pub fn normalized_frequency(&self) -> f64 {
        let (lower, upper) = self.guided_interval();
        self.free_space_wavenumber() * self.width * (upper * upper - lower * lower).sqrt()
    }
}

/// One guided mode discovered by the root finder. Order 0 is the
/// fundamental (highest effective index) of its polarization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mode {
    pub polarization: Polarization,
    pub order: usize,
    pub neff: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSample {
    pub position: f64,
    pub amplitude: f64,
}

/// Transverse field shape of one mode, sampled over the requested window.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldProfile {
    samples: Vec<FieldSample>,
}

impl FieldProfile {
    pub fn new(samples: Vec<FieldSample>) -> Self {
        Self { samples }
    }

    pub fn samples(&self) -> &[FieldSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn positions(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|sample| sample.position)
    }

    pub fn amplitudes(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|sample| sample.amplitude)
    }
}

/// Amplitude convention for sampled profiles.
///
/// `Relative` is the documented default: piecewise amplitudes matched at
/// the interfaces, with the core oscillation peaking near 1. `UnitPower`
/// rescales so the trapezoid integral of amplitude^2 over the sampled
/// window equals 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Normalization {
    #[default]
    Relative,
    UnitPower,
}

/// Sampling specification for field profiles: `points` positions spanning
/// [-extent/2, +extent/2], centered on the waveguide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSampling {
    pub points: usize,
    pub extent: f64,
    pub normalization: Normalization,
}

impl FieldSampling {
    pub fn new(points: usize, extent: f64) -> Self {
        Self {
            points,
            extent,
            normalization: Normalization::default(),
        }
    }

    pub fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }

    pub fn validate(&self) -> SlabResult<()> {
        if self.points < 2 {
            return Err(SlabError::input_validation(
                "INPUT.SAMPLE_COUNT",
                format!("field sampling needs at least 2 points, got {}", self.points),
            ));
        }
        if !self.extent.is_finite() || self.extent <= 0.0 {
            return Err(SlabError::input_validation(
                "INPUT.SAMPLE_EXTENT",
                format!(
                    "field sampling extent must be positive and finite, got {}",
                    self.extent
                ),
            ));
        }
        Ok(())
    }
}

/// Serializable digest of one solver run, consumed by the CLI summary
/// artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub width: f64,
    pub wavelength: f64,
    pub n_core: f64,
    pub n_sub: f64,
    pub n_clad: f64,
    pub normalized_frequency: f64,
    pub te: PolarizationSummary,
    pub tm: PolarizationSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolarizationSummary {
    pub mode_count: usize,
    pub effective_indices: Vec<f64>,
    pub discarded_brackets: usize,
}
