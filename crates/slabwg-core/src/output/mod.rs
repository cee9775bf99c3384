//! Result persistence behind a narrow sink interface.
//!
//! The numerical core never touches storage formats directly; it hands
//! ordered effective indices, sampled dispersion curves, and field
//! profiles to a [`ResultSink`]. The text-file sink reproduces the
//! comma-delimited artifact set consumed by the legacy plotting scripts;
//! the memory sink backs the test suite.

pub mod serialization;

use crate::domain::{FieldProfile, Polarization, SlabError, SlabResult};
use serialization::{format_fixed_f64, write_text_artifact};
use std::fs;
use std::path::{Path, PathBuf};

pub trait ResultSink {
    fn write_effective_indices(
        &mut self,
        polarization: Polarization,
        neffs: &[f64],
    ) -> SlabResult<()>;

    fn write_field_profile(
        &mut self,
        polarization: Polarization,
        order: usize,
        profile: &FieldProfile,
    ) -> SlabResult<()>;

    /// Sampled (beta, residual) pairs across the guided interval.
    fn write_dispersion_scan(
        &mut self,
        polarization: Polarization,
        samples: &[(f64, f64)],
    ) -> SlabResult<()>;

    /// Called once after all writes; file-backed sinks flush here.
    fn finish(&mut self) -> SlabResult<()> {
        Ok(())
    }
}

/// In-memory capture of every sink call, in call order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemorySink {
    pub effective_indices: Vec<(Polarization, Vec<f64>)>,
    pub profiles: Vec<(Polarization, usize, FieldProfile)>,
    pub dispersion_scans: Vec<(Polarization, Vec<(f64, f64)>)>,
    pub finished: bool,
}

impl ResultSink for MemorySink {
    fn write_effective_indices(
        &mut self,
        polarization: Polarization,
        neffs: &[f64],
    ) -> SlabResult<()> {
        self.effective_indices.push((polarization, neffs.to_vec()));
        Ok(())
    }

    fn write_field_profile(
        &mut self,
        polarization: Polarization,
        order: usize,
        profile: &FieldProfile,
    ) -> SlabResult<()> {
        self.profiles.push((polarization, order, profile.clone()));
        Ok(())
    }

    fn write_dispersion_scan(
        &mut self,
        polarization: Polarization,
        samples: &[(f64, f64)],
    ) -> SlabResult<()> {
        self.dispersion_scans.push((polarization, samples.to_vec()));
        Ok(())
    }

    fn finish(&mut self) -> SlabResult<()> {
        self.finished = true;
        Ok(())
    }
}

/// Comma-delimited text artifacts under one directory:
///
/// - `{POL}_neff.txt`: one effective index per line, fundamental first;
/// - `{POL}_Mode_Profiles.txt`: column 0 position, one column per mode;
/// - `{POL}_Dispersion_Eqn.txt`: propagation constant and residual.
///
/// Everything is buffered and written on [`ResultSink::finish`] with
/// fixed-width formatting, so repeated identical runs produce identical
/// bytes.
#[derive(Debug, Clone, Default)]
pub struct TextFileSink {
    directory: PathBuf,
    buffered: MemorySink,
}

const VALUE_WIDTH: usize = 18;
const VALUE_PRECISION: usize = 12;

impl TextFileSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            buffered: MemorySink::default(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn write_artifact(&self, name: &str, content: &str) -> SlabResult<()> {
        let path = self.directory.join(name);
        write_text_artifact(&path, content).map_err(|source| {
            SlabError::io_system(
                "IO.SINK_WRITE",
                format!("failed to write artifact '{}': {}", path.display(), source),
            )
        })
    }

    fn render_neffs(neffs: &[f64]) -> String {
        let lines: Vec<String> = neffs
            .iter()
            .map(|neff| format_fixed_f64(*neff, VALUE_WIDTH, VALUE_PRECISION))
            .collect();
        lines.join("\n")
    }

    fn render_dispersion(samples: &[(f64, f64)]) -> String {
        let lines: Vec<String> = samples
            .iter()
            .map(|(beta, residual)| {
                format!(
                    "{}, {}",
                    format_fixed_f64(*beta, VALUE_WIDTH, VALUE_PRECISION),
                    format_fixed_f64(*residual, VALUE_WIDTH, VALUE_PRECISION)
                )
            })
            .collect();
        lines.join("\n")
    }

    fn render_profiles(profiles: &[&FieldProfile]) -> SlabResult<String> {
        let Some(first) = profiles.first() else {
            return Ok(String::new());
        };
        for profile in profiles {
            if profile.len() != first.len() {
                return Err(SlabError::internal(
                    "SYS.SINK_PROFILE_SHAPE",
                    format!(
                        "mode profiles disagree on sample count: {} vs {}",
                        profile.len(),
                        first.len()
                    ),
                ));
            }
        }

        let mut lines = Vec::with_capacity(first.len());
        for row in 0..first.len() {
            let mut fields =
                vec![format_fixed_f64(first.samples()[row].position, VALUE_WIDTH, VALUE_PRECISION)];
            for profile in profiles {
                fields.push(format_fixed_f64(
                    profile.samples()[row].amplitude,
                    VALUE_WIDTH,
                    VALUE_PRECISION,
                ));
            }
            lines.push(fields.join(", "));
        }
        Ok(lines.join("\n"))
    }

    fn flush_polarization(&self, polarization: Polarization) -> SlabResult<()> {
        let label = polarization.as_str();

        for (written, neffs) in &self.buffered.effective_indices {
            if *written == polarization {
                self.write_artifact(&format!("{label}_neff.txt"), &Self::render_neffs(neffs))?;
            }
        }

        for (written, samples) in &self.buffered.dispersion_scans {
            if *written == polarization {
                self.write_artifact(
                    &format!("{label}_Dispersion_Eqn.txt"),
                    &Self::render_dispersion(samples),
                )?;
            }
        }

        let mut profiles: Vec<(usize, &FieldProfile)> = self
            .buffered
            .profiles
            .iter()
            .filter(|(written, _, _)| *written == polarization)
            .map(|(_, order, profile)| (*order, profile))
            .collect();
        if !profiles.is_empty() {
            profiles.sort_by_key(|(order, _)| *order);
            let columns: Vec<&FieldProfile> =
                profiles.iter().map(|(_, profile)| *profile).collect();
            self.write_artifact(
                &format!("{label}_Mode_Profiles.txt"),
                &Self::render_profiles(&columns)?,
            )?;
        }

        Ok(())
    }
}

impl ResultSink for TextFileSink {
    fn write_effective_indices(
        &mut self,
        polarization: Polarization,
        neffs: &[f64],
    ) -> SlabResult<()> {
        self.buffered.write_effective_indices(polarization, neffs)
    }

    fn write_field_profile(
        &mut self,
        polarization: Polarization,
        order: usize,
        profile: &FieldProfile,
    ) -> SlabResult<()> {
        self.buffered
            .write_field_profile(polarization, order, profile)
    }

    fn write_dispersion_scan(
        &mut self,
        polarization: Polarization,
        samples: &[(f64, f64)],
    ) -> SlabResult<()> {
        self.buffered.write_dispersion_scan(polarization, samples)
    }

    fn finish(&mut self) -> SlabResult<()> {
        fs::create_dir_all(&self.directory).map_err(|source| {
            SlabError::io_system(
                "IO.SINK_DIRECTORY",
                format!(
                    "failed to create output directory '{}': {}",
                    self.directory.display(),
                    source
                ),
            )
        })?;

        for polarization in Polarization::ALL {
            self.flush_polarization(polarization)?;
        }
        self.buffered.finished = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ResultSink, TextFileSink};
    use crate::domain::{FieldProfile, FieldSample, Polarization};
    use std::fs;
    use tempfile::TempDir;

    fn sample_profile(offset: f64) -> FieldProfile {
        FieldProfile::new(
            (0..5)
                .map(|i| FieldSample {
                    position: -1.0 + 0.5 * i as f64,
                    amplitude: offset + 0.1 * i as f64,
                })
                .collect(),
        )
    }

    #[test]
    fn finish_writes_the_expected_artifact_set() {
        let temp = TempDir::new().expect("tempdir should be created");
        let mut sink = TextFileSink::new(temp.path());

        sink.write_effective_indices(Polarization::Te, &[3.30, 3.22])
            .expect("neff write buffers");
        sink.write_dispersion_scan(Polarization::Te, &[(13.0, -0.5), (13.5, 0.5)])
            .expect("scan write buffers");
        sink.write_field_profile(Polarization::Te, 0, &sample_profile(1.0))
            .expect("profile write buffers");
        sink.write_field_profile(Polarization::Te, 1, &sample_profile(2.0))
            .expect("profile write buffers");
        sink.finish().expect("finish flushes");

        let neff_text = fs::read_to_string(temp.path().join("TE_neff.txt"))
            .expect("neff artifact exists");
        assert_eq!(neff_text.lines().count(), 2);
        assert!(neff_text.lines().next().expect("first line").contains("3.3"));

        let profile_text = fs::read_to_string(temp.path().join("TE_Mode_Profiles.txt"))
            .expect("profile artifact exists");
        assert_eq!(profile_text.lines().count(), 5);
        for line in profile_text.lines() {
            assert_eq!(line.split(',').count(), 3, "position plus two mode columns");
        }

        assert!(temp.path().join("TE_Dispersion_Eqn.txt").exists());
        assert!(!temp.path().join("TM_neff.txt").exists());
    }

    #[test]
    fn empty_mode_list_still_writes_an_empty_neff_artifact() {
        let temp = TempDir::new().expect("tempdir should be created");
        let mut sink = TextFileSink::new(temp.path());

        sink.write_effective_indices(Polarization::Tm, &[])
            .expect("empty neff write buffers");
        sink.finish().expect("finish flushes");

        let neff_text = fs::read_to_string(temp.path().join("TM_neff.txt"))
            .expect("empty artifact exists");
        assert!(neff_text.is_empty());
        assert!(!temp.path().join("TM_Mode_Profiles.txt").exists());
    }

    #[test]
    fn repeated_runs_produce_identical_bytes() {
        let temp = TempDir::new().expect("tempdir should be created");

        let write_once = || {
            let mut sink = TextFileSink::new(temp.path());
            sink.write_effective_indices(Polarization::Te, &[3.391_257_803_1])
                .expect("neff write buffers");
            sink.write_field_profile(Polarization::Te, 0, &sample_profile(0.5))
                .expect("profile write buffers");
            sink.finish().expect("finish flushes");
            fs::read(temp.path().join("TE_Mode_Profiles.txt")).expect("artifact exists")
        };

        assert_eq!(write_once(), write_once());
    }

    #[test]
    fn mismatched_profile_lengths_are_an_internal_error() {
        let temp = TempDir::new().expect("tempdir should be created");
        let mut sink = TextFileSink::new(temp.path());

        sink.write_field_profile(Polarization::Te, 0, &sample_profile(1.0))
            .expect("profile write buffers");
        sink.write_field_profile(
            Polarization::Te,
            1,
            &FieldProfile::new(vec![FieldSample {
                position: 0.0,
                amplitude: 1.0,
            }]),
        )
        .expect("profile write buffers");

        let error = sink.finish().expect_err("shape mismatch should fail");
        assert_eq!(error.code(), "SYS.SINK_PROFILE_SHAPE");
    }
}
