//! Slab waveguide orchestration: drives the root finder and profile
//! builder for both polarizations and feeds results to a sink.

pub mod dispersion;
pub mod field;
pub mod roots;

pub use dispersion::{DispersionError, DispersionRelation, TransverseWavenumbers};
pub use field::{FieldProfileBuilder, ModeField};
pub use roots::{BracketDiagnostic, ModeRootFinder, ModeScan, ScanSettings};

use crate::domain::{
    FieldSampling, Mode, Polarization, PolarizationSummary, RunSummary, SlabError, SlabResult,
    WaveguideParameters,
};
use crate::output::ResultSink;
use tracing::info;

/// Resolution of the sampled dispersion-equation curves handed to the
/// sink alongside the mode data.
const DISPERSION_CURVE_POINTS: usize = 500;

/// Owns validated waveguide parameters and the per-polarization mode
/// collections computed from them.
#[derive(Debug, Clone)]
pub struct SlabWaveguide {
    parameters: WaveguideParameters,
    settings: ScanSettings,
    te_scan: Option<ModeScan>,
    tm_scan: Option<ModeScan>,
}

impl SlabWaveguide {
    pub fn new(parameters: WaveguideParameters) -> Self {
        Self::with_settings(parameters, ScanSettings::default())
    }

    pub fn with_settings(parameters: WaveguideParameters, settings: ScanSettings) -> Self {
        Self {
            parameters,
            settings,
            te_scan: None,
            tm_scan: None,
        }
    }

    pub const fn parameters(&self) -> &WaveguideParameters {
        &self.parameters
    }

    /// Cached modes for one polarization; empty until solved.
    pub fn modes(&self, polarization: Polarization) -> &[Mode] {
        match self.scan_slot_ref(polarization) {
            Some(scan) => &scan.modes,
            None => &[],
        }
    }

    /// Discards cached results for one polarization, forcing the next
    /// operation to re-solve.
    pub fn clear(&mut self, polarization: Polarization) {
        *self.scan_slot(polarization) = None;
    }

    /// Runs the root finder for one polarization (once; results are
    /// cached until cleared). A polarization whose every bracketed
    /// candidate failed to converge is a computation error; an empty
    /// scan without brackets is the valid below-cutoff outcome.
    pub fn solve(&mut self, polarization: Polarization) -> SlabResult<&ModeScan> {
        if self.scan_slot_ref(polarization).is_none() {
            let finder = ModeRootFinder::with_settings(&self.parameters, self.settings);
            let scan = finder.find_modes(polarization);
            info!(
                polarization = polarization.as_str(),
                modes = scan.modes.len(),
                discarded = scan.discarded.len(),
                "polarization solved"
            );

            if scan.modes.is_empty() && !scan.discarded.is_empty() {
                return Err(SlabError::computation(
                    "RUN.CONVERGENCE",
                    format!(
                        "all {} bracketed {} candidates failed to converge within {} iterations",
                        scan.discarded.len(),
                        polarization,
                        self.settings.max_iterations
                    ),
                ));
            }
            *self.scan_slot(polarization) = Some(scan);
        }

        Ok(self
            .scan_slot_ref(polarization)
            .expect("scan cached by the branch above"))
    }

    /// Effective indices only: solve both polarizations and report the
    /// ordered neff lists through the sink.
    pub fn calculate_all_neffs(&mut self, sink: &mut dyn ResultSink) -> SlabResult<()> {
        for polarization in Polarization::ALL {
            let neffs = self.effective_indices(polarization)?;
            sink.write_effective_indices(polarization, &neffs)?;
        }
        sink.finish()
    }

    /// Full run: effective indices, sampled dispersion curves, and one
    /// field profile per discovered mode, for both polarizations.
    pub fn calculate_all_modes(
        &mut self,
        sampling: &FieldSampling,
        sink: &mut dyn ResultSink,
    ) -> SlabResult<()> {
        sampling.validate()?;

        for polarization in Polarization::ALL {
            let neffs = self.effective_indices(polarization)?;
            sink.write_effective_indices(polarization, &neffs)?;
            sink.write_dispersion_scan(polarization, &self.dispersion_curve(polarization))?;

            let modes = self.modes(polarization).to_vec();
            let builder = FieldProfileBuilder::new(&self.parameters);
            for mode in &modes {
                let profile = builder.profile(mode, sampling)?;
                sink.write_field_profile(polarization, mode.order, &profile)?;
            }
        }
        sink.finish()
    }

    /// Serializable digest of the solved state (solving on demand).
    pub fn summary(&mut self) -> SlabResult<RunSummary> {
        let te = self.polarization_summary(Polarization::Te)?;
        let tm = self.polarization_summary(Polarization::Tm)?;

        Ok(RunSummary {
            width: self.parameters.width(),
            wavelength: self.parameters.wavelength(),
            n_core: self.parameters.core_index(),
            n_sub: self.parameters.substrate_index(),
            n_clad: self.parameters.cladding_index(),
            normalized_frequency: self.parameters.normalized_frequency(),
            te,
            tm,
        })
    }

    fn polarization_summary(
        &mut self,
        polarization: Polarization,
    ) -> SlabResult<PolarizationSummary> {
        let scan = self.solve(polarization)?;
        Ok(PolarizationSummary {
            mode_count: scan.modes.len(),
            effective_indices: scan.modes.iter().map(|mode| mode.neff).collect(),
            discarded_brackets: scan.discarded.len(),
        })
    }

    fn effective_indices(&mut self, polarization: Polarization) -> SlabResult<Vec<f64>> {
        Ok(self
            .solve(polarization)?
            .modes
            .iter()
            .map(|mode| mode.neff)
            .collect())
    }

    /// Samples (beta, residual) across the guided interval for the
    /// dispersion-equation artifact.
    fn dispersion_curve(&self, polarization: Polarization) -> Vec<(f64, f64)> {
        let relation = DispersionRelation::new(polarization, &self.parameters);
        let (lower, upper) = self.parameters.guided_interval();
        let span = upper - lower;
        let edge = span * 1.0e-6;
        let step = (span - 2.0 * edge) / (DISPERSION_CURVE_POINTS - 1) as f64;
        let k0 = self.parameters.free_space_wavenumber();

        (0..DISPERSION_CURVE_POINTS)
            .filter_map(|i| {
                let neff = lower + edge + i as f64 * step;
                relation
                    .residual(neff)
                    .ok()
                    .map(|residual| (k0 * neff, residual))
            })
            .collect()
    }

    fn scan_slot(&mut self, polarization: Polarization) -> &mut Option<ModeScan> {
        match polarization {
            Polarization::Te => &mut self.te_scan,
            Polarization::Tm => &mut self.tm_scan,
        }
    }

    fn scan_slot_ref(&self, polarization: Polarization) -> Option<&ModeScan> {
        match polarization {
            Polarization::Te => self.te_scan.as_ref(),
            Polarization::Tm => self.tm_scan.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SlabWaveguide;
    use crate::domain::{FieldSampling, Polarization, WaveguideParameters};
    use crate::output::MemorySink;

    fn reference_waveguide() -> SlabWaveguide {
        let parameters = WaveguideParameters::new(2.0, 1.55, 3.38, 3.17, 3.17)
            .expect("reference slab is guidable");
        SlabWaveguide::new(parameters)
    }

    #[test]
    fn clear_discards_cached_modes_for_one_polarization_only() {
        let mut waveguide = reference_waveguide();
        waveguide.solve(Polarization::Te).expect("TE solve");
        waveguide.solve(Polarization::Tm).expect("TM solve");
        assert!(!waveguide.modes(Polarization::Te).is_empty());

        waveguide.clear(Polarization::Te);
        assert!(waveguide.modes(Polarization::Te).is_empty());
        assert!(!waveguide.modes(Polarization::Tm).is_empty());
    }

    #[test]
    fn calculate_all_neffs_reports_both_polarizations_without_profiles() {
        let mut waveguide = reference_waveguide();
        let mut sink = MemorySink::default();
        waveguide
            .calculate_all_neffs(&mut sink)
            .expect("neff-only run succeeds");

        assert_eq!(sink.effective_indices.len(), 2);
        assert!(sink.profiles.is_empty());
        assert!(sink.finished);
    }

    #[test]
    fn calculate_all_modes_writes_one_profile_per_mode() {
        let mut waveguide = reference_waveguide();
        let mut sink = MemorySink::default();
        let sampling = FieldSampling::new(50, 10.0);
        waveguide
            .calculate_all_modes(&sampling, &mut sink)
            .expect("full run succeeds");

        let te_count = waveguide.modes(Polarization::Te).len();
        let tm_count = waveguide.modes(Polarization::Tm).len();
        assert_eq!(sink.profiles.len(), te_count + tm_count);
        for (_, _, profile) in &sink.profiles {
            assert_eq!(profile.len(), 50);
        }
        assert_eq!(sink.dispersion_scans.len(), 2);
    }

    #[test]
    fn summary_reflects_the_solved_state() {
        let mut waveguide = reference_waveguide();
        let summary = waveguide.summary().expect("summary builds");

        assert_eq!(summary.te.mode_count, waveguide.modes(Polarization::Te).len());
        assert_eq!(summary.tm.mode_count, waveguide.modes(Polarization::Tm).len());
        assert!(summary.te.mode_count >= 1);
        assert_eq!(summary.te.discarded_brackets, 0);
        assert!((summary.width - 2.0).abs() <= f64::EPSILON);
    }
}
