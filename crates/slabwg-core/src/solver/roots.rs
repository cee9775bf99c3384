//! Grid scan and bracketed bisection over the guided-index interval.

use super::dispersion::DispersionRelation;
use crate::common::constants::CONVERGENCE_EPS;
use crate::domain::{Mode, Polarization, WaveguideParameters};
use tracing::{debug, warn};

/// Tunables for the root scan.
///
/// `grid_points` sets the uniform scan resolution across the guided
/// interval. Adjacent mode roots are separated by pi in a phase that
/// spans at most V radians, so the default of 2000 leaves dozens of grid
/// samples between neighboring roots for any slab up to V of a few
/// hundred; raise it for extremely multimode guides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanSettings {
    pub grid_points: usize,
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            grid_points: 2000,
            tolerance: CONVERGENCE_EPS,
            max_iterations: 100,
        }
    }
}

/// A bracketed sign change that failed to refine below tolerance within
/// the iteration budget. The candidate is dropped; the scan continues.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BracketDiagnostic {
    pub polarization: Polarization,
    pub lower: f64,
    pub upper: f64,
    pub residual: f64,
    pub iterations: usize,
}

/// Outcome of one polarization scan: converged modes in strictly
/// decreasing-neff order, plus diagnostics for discarded brackets. An
/// empty mode list is a valid below-cutoff outcome.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModeScan {
    pub modes: Vec<Mode>,
    pub discarded: Vec<BracketDiagnostic>,
}

#[derive(Debug, Clone, Copy)]
pub struct ModeRootFinder<'a> {
    parameters: &'a WaveguideParameters,
    settings: ScanSettings,
}

impl<'a> ModeRootFinder<'a> {
    pub fn new(parameters: &'a WaveguideParameters) -> Self {
        Self {
            parameters,
            settings: ScanSettings::default(),
        }
    }

    pub fn with_settings(parameters: &'a WaveguideParameters, settings: ScanSettings) -> Self {
        Self {
            parameters,
            settings,
        }
    }

    pub const fn settings(&self) -> ScanSettings {
        self.settings
    }

    /// Scans from just below n_core down to just above max(n_sub, n_clad),
    /// bracketing residual sign changes and refining each by bisection.
    pub fn find_modes(&self, polarization: Polarization) -> ModeScan {
        let relation = DispersionRelation::new(polarization, self.parameters);
        let (lower, upper) = self.parameters.guided_interval();
        let span = upper - lower;
        // keep strictly inside the open interval where the relation is defined
        let edge = span * 1.0e-9;
        let steps = self.settings.grid_points.max(2);
        let step = (span - 2.0 * edge) / steps as f64;

        let mut scan = ModeScan::default();
        let mut previous: Option<(f64, f64)> = None;

        for i in 0..=steps {
            let neff = upper - edge - i as f64 * step;
            let residual = match relation.residual(neff) {
                Ok(value) => value,
                Err(_) => {
                    previous = None;
                    continue;
                }
            };

            if residual == 0.0 {
                self.push_root(&mut scan, polarization, neff, residual);
                previous = None;
                continue;
            }

            if let Some((previous_neff, previous_residual)) = previous
                && previous_residual * residual < 0.0
            {
                // bracket endpoints ordered low to high in neff
                self.refine_bracket(&relation, polarization, neff, previous_neff, &mut scan);
            }
            previous = Some((neff, residual));
        }

        debug!(
            polarization = polarization.as_str(),
            modes = scan.modes.len(),
            discarded = scan.discarded.len(),
            "mode scan complete"
        );
        scan
    }

    fn refine_bracket(
        &self,
        relation: &DispersionRelation<'_>,
        polarization: Polarization,
        bracket_low: f64,
        bracket_high: f64,
        scan: &mut ModeScan,
    ) {
        let mut low = bracket_low;
        let mut high = bracket_high;
        let Ok(mut low_residual) = relation.residual(low) else {
            return;
        };

        let mut midpoint = 0.5 * (low + high);
        let mut residual = f64::INFINITY;
        let mut iterations = 0;

        while iterations < self.settings.max_iterations {
            iterations += 1;
            midpoint = 0.5 * (low + high);
            residual = match relation.residual(midpoint) {
                Ok(value) => value,
                Err(_) => break,
            };

            if residual.abs() <= self.settings.tolerance {
                break;
            }
            if low_residual * residual < 0.0 {
                high = midpoint;
            } else {
                low = midpoint;
                low_residual = residual;
            }
            if (high - low).abs() <= f64::EPSILON * midpoint.abs() {
                break;
            }
        }

        if residual.abs() <= self.settings.tolerance {
            self.push_root(scan, polarization, midpoint, residual);
        } else {
            warn!(
                polarization = polarization.as_str(),
                lower = bracket_low,
                upper = bracket_high,
                residual,
                iterations,
                "bracketed candidate failed to converge; discarding"
            );
            scan.discarded.push(BracketDiagnostic {
                polarization,
                lower: bracket_low,
                upper: bracket_high,
                residual,
                iterations,
            });
        }
    }

    fn push_root(&self, scan: &mut ModeScan, polarization: Polarization, neff: f64, residual: f64) {
        // the scan walks downward, so discovery order is descending neff
        if let Some(last) = scan.modes.last()
            && neff >= last.neff
        {
            debug!(
                polarization = polarization.as_str(),
                neff, "duplicate root candidate skipped"
            );
            return;
        }

        debug!(
            polarization = polarization.as_str(),
            order = scan.modes.len(),
            neff,
            residual,
            "guided mode converged"
        );
        scan.modes.push(Mode {
            polarization,
            order: scan.modes.len(),
            neff,
        });
    }
}
