//! Piecewise transverse field reconstruction for converged modes.

use super::dispersion::DispersionRelation;
use crate::domain::{
    FieldProfile, FieldSample, FieldSampling, Mode, Normalization, SlabError, SlabResult,
    WaveguideParameters,
};

/// Closed-form transverse field of one converged mode: cosine in the
/// core, exponential decay outside, matched at both interfaces through
/// the interface phase. Continuity is inherited from the dispersion
/// root, not re-imposed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeField {
    core_wavenumber: f64,
    substrate_decay: f64,
    cladding_decay: f64,
    interface_phase: f64,
    half_width: f64,
}

impl ModeField {
    pub fn new(parameters: &WaveguideParameters, mode: &Mode) -> SlabResult<Self> {
        let relation = DispersionRelation::new(mode.polarization, parameters);
        let k = relation.wavenumbers(mode.neff).map_err(|source| {
            SlabError::internal(
                "SYS.FIELD_DOMAIN",
                format!(
                    "cached {} mode of order {} is outside the guided interval: {}",
                    mode.polarization, mode.order, source
                ),
            )
        })?;
        let scaling = mode.polarization.substrate_scaling(parameters);

        Ok(Self {
            core_wavenumber: k.core,
            substrate_decay: k.substrate,
            cladding_decay: k.cladding,
            interface_phase: (scaling * k.substrate / k.core).atan(),
            half_width: parameters.width() / 2.0,
        })
    }

    /// Relative amplitude at transverse position x (microns, waveguide
    /// centered on zero).
    pub fn amplitude(&self, x: f64) -> f64 {
        let h = self.core_wavenumber;
        let phi = self.interface_phase;
        if x < -self.half_width {
            // substrate side, matched to the core value at x = -w/2
            phi.cos() * (self.substrate_decay * (x + self.half_width)).exp()
        } else if x > self.half_width {
            let core_exit = (2.0 * h * self.half_width - phi).cos();
            core_exit * (-self.cladding_decay * (x - self.half_width)).exp()
        } else {
            (h * (x + self.half_width) - phi).cos()
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldProfileBuilder<'a> {
    parameters: &'a WaveguideParameters,
}

impl<'a> FieldProfileBuilder<'a> {
    pub fn new(parameters: &'a WaveguideParameters) -> Self {
        Self { parameters }
    }

    /// Samples the mode field at `sampling.points` positions spanning
    /// [-extent/2, +extent/2] inclusive.
    pub fn profile(&self, mode: &Mode, sampling: &FieldSampling) -> SlabResult<FieldProfile> {
        sampling.validate()?;
        let field = ModeField::new(self.parameters, mode)?;

        let half_extent = sampling.extent / 2.0;
        let step = sampling.extent / (sampling.points - 1) as f64;
        let mut samples: Vec<FieldSample> = (0..sampling.points)
            .map(|i| {
                let position = -half_extent + i as f64 * step;
                FieldSample {
                    position,
                    amplitude: field.amplitude(position),
                }
            })
            .collect();

        if sampling.normalization == Normalization::UnitPower {
            normalize_unit_power(&mut samples, step)?;
        }

        Ok(FieldProfile::new(samples))
    }
}

/// Rescales so the trapezoid integral of amplitude^2 over the sampled
/// window equals one.
fn normalize_unit_power(samples: &mut [FieldSample], step: f64) -> SlabResult<()> {
    let mut power = 0.0;
    for (i, sample) in samples.iter().enumerate() {
        let weight = if i == 0 || i + 1 == samples.len() {
            0.5
        } else {
            1.0
        };
        power += weight * sample.amplitude * sample.amplitude * step;
    }

    if !power.is_finite() || power <= 0.0 {
        return Err(SlabError::computation(
            "RUN.FIELD_NORMALIZATION",
            format!("field power integral {power} cannot be normalized"),
        ));
    }

    let scale = power.sqrt().recip();
    for sample in samples.iter_mut() {
        sample.amplitude *= scale;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{FieldProfileBuilder, ModeField};
    use crate::domain::{FieldSampling, Normalization, Polarization, WaveguideParameters};
    use crate::solver::roots::ModeRootFinder;

    fn reference_parameters() -> WaveguideParameters {
        WaveguideParameters::new(2.0, 1.55, 3.38, 3.17, 3.17).expect("reference slab is guidable")
    }

    #[test]
    fn amplitude_is_continuous_across_both_interfaces() {
        let parameters = reference_parameters();
        let finder = ModeRootFinder::new(&parameters);

        for polarization in Polarization::ALL {
            for mode in finder.find_modes(polarization).modes {
                let field = ModeField::new(&parameters, &mode).expect("converged mode");
                let half_width = parameters.width() / 2.0;
                let epsilon = 1.0e-9;

                for interface in [-half_width, half_width] {
                    let inside = field.amplitude(interface - epsilon * interface.signum());
                    let outside = field.amplitude(interface + epsilon * interface.signum());
                    assert!(
                        (inside - outside).abs() <= 1.0e-6,
                        "{polarization} order {} jumps by {} at x={interface}",
                        mode.order,
                        inside - outside
                    );
                }
            }
        }
    }

    #[test]
    fn symmetric_slab_fundamental_is_even_and_first_order_is_odd() {
        let parameters = reference_parameters();
        let scan = ModeRootFinder::new(&parameters).find_modes(Polarization::Te);
        assert!(scan.modes.len() >= 2, "reference slab should be multimode");

        let fundamental = ModeField::new(&parameters, &scan.modes[0]).expect("fundamental");
        let first_order = ModeField::new(&parameters, &scan.modes[1]).expect("first order");

        for x in [0.1, 0.4, 0.9, 1.3, 2.5] {
            let even_defect = fundamental.amplitude(x) - fundamental.amplitude(-x);
            let odd_defect = first_order.amplitude(x) + first_order.amplitude(-x);
            assert!(even_defect.abs() <= 1.0e-6, "even defect {even_defect} at {x}");
            assert!(odd_defect.abs() <= 1.0e-6, "odd defect {odd_defect} at {x}");
        }
    }

    #[test]
    fn profile_spans_the_requested_window_with_exact_sample_count() {
        let parameters = reference_parameters();
        let scan = ModeRootFinder::new(&parameters).find_modes(Polarization::Te);
        let builder = FieldProfileBuilder::new(&parameters);

        let sampling = FieldSampling::new(50, 10.0);
        let profile = builder
            .profile(&scan.modes[0], &sampling)
            .expect("profile builds");

        assert_eq!(profile.len(), 50);
        let positions: Vec<f64> = profile.positions().collect();
        assert!((positions[0] + 5.0).abs() <= 1.0e-12);
        assert!((positions[49] - 5.0).abs() <= 1.0e-12);
    }

    #[test]
    fn unit_power_normalization_yields_unit_trapezoid_integral() {
        let parameters = reference_parameters();
        let scan = ModeRootFinder::new(&parameters).find_modes(Polarization::Te);
        let builder = FieldProfileBuilder::new(&parameters);

        let sampling =
            FieldSampling::new(2001, 10.0).with_normalization(Normalization::UnitPower);
        let profile = builder
            .profile(&scan.modes[0], &sampling)
            .expect("profile builds");

        let step = 10.0 / 2000.0;
        let samples = profile.samples();
        let mut power = 0.0;
        for (i, sample) in samples.iter().enumerate() {
            let weight = if i == 0 || i + 1 == samples.len() {
                0.5
            } else {
                1.0
            };
            power += weight * sample.amplitude * sample.amplitude * step;
        }
        assert!((power - 1.0).abs() <= 1.0e-9, "power was {power}");
    }

    #[test]
    fn degenerate_sampling_is_rejected_before_evaluation() {
        let parameters = reference_parameters();
        let scan = ModeRootFinder::new(&parameters).find_modes(Polarization::Te);
        let builder = FieldProfileBuilder::new(&parameters);

        let error = builder
            .profile(&scan.modes[0], &FieldSampling::new(1, 10.0))
            .expect_err("single-point sampling should be rejected");
        assert_eq!(error.code(), "INPUT.SAMPLE_COUNT");
    }
}
