use super::CliError;
use anyhow::Context;
use slabwg_core::domain::{FieldSampling, Polarization, RunSummary, WaveguideParameters};
use slabwg_core::output::TextFileSink;
use slabwg_core::solver::SlabWaveguide;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default transverse samples per profile, matching the legacy plotting
/// resolution.
const DEFAULT_SAMPLES: usize = 201;

const SUMMARY_FILE_NAME: &str = "mode_summary.json";

#[derive(clap::Args)]
pub(super) struct ModesArgs {
    #[command(flatten)]
    geometry: GeometryArgs,

    /// Transverse samples per field profile
    #[arg(long, default_value_t = DEFAULT_SAMPLES)]
    samples: usize,

    /// Sampling window width in um (default: 3x the core width)
    #[arg(long)]
    extent: Option<f64>,

    /// Directory receiving the text artifacts
    #[arg(long, default_value = ".")]
    output: PathBuf,
}

#[derive(clap::Args)]
pub(super) struct NeffsArgs {
    #[command(flatten)]
    geometry: GeometryArgs,

    /// Directory receiving the text artifacts
    #[arg(long, default_value = ".")]
    output: PathBuf,
}

#[derive(clap::Args)]
pub(super) struct GeometryArgs {
    /// Core width in um
    #[arg(value_name = "width")]
    width: f64,

    /// Free-space wavelength in um
    #[arg(value_name = "wavelength")]
    wavelength: f64,

    /// Core refractive index
    #[arg(value_name = "n_core")]
    n_core: f64,

    /// Substrate refractive index
    #[arg(value_name = "n_sub")]
    n_sub: f64,

    /// Cladding refractive index
    #[arg(value_name = "n_clad")]
    n_clad: f64,
}

impl GeometryArgs {
    fn into_parameters(self) -> Result<WaveguideParameters, CliError> {
        WaveguideParameters::new(
            self.width,
            self.wavelength,
            self.n_core,
            self.n_sub,
            self.n_clad,
        )
        .map_err(CliError::Compute)
    }
}

pub(super) fn run_modes_command(args: ModesArgs) -> Result<i32, CliError> {
    let parameters = args.geometry.into_parameters()?;
    let extent = args.extent.unwrap_or(3.0 * parameters.width());
    let sampling = FieldSampling::new(args.samples, extent);
    info!(
        width = parameters.width(),
        wavelength = parameters.wavelength(),
        samples = args.samples,
        extent,
        "solving modes"
    );

    let mut waveguide = SlabWaveguide::new(parameters);
    let mut sink = TextFileSink::new(&args.output);
    waveguide
        .calculate_all_modes(&sampling, &mut sink)
        .map_err(CliError::Compute)?;

    let summary = waveguide.summary().map_err(CliError::Compute)?;
    print_human_summary(&summary);
    write_summary_json(&args.output, &summary)?;
    println!("Artifacts written to: {}", args.output.display());

    Ok(0)
}

pub(super) fn run_neffs_command(args: NeffsArgs) -> Result<i32, CliError> {
    let parameters = args.geometry.into_parameters()?;
    info!(
        width = parameters.width(),
        wavelength = parameters.wavelength(),
        "solving effective indices"
    );

    let mut waveguide = SlabWaveguide::new(parameters);
    let mut sink = TextFileSink::new(&args.output);
    waveguide
        .calculate_all_neffs(&mut sink)
        .map_err(CliError::Compute)?;

    let summary = waveguide.summary().map_err(CliError::Compute)?;
    print_human_summary(&summary);
    write_summary_json(&args.output, &summary)?;
    println!("Artifacts written to: {}", args.output.display());

    Ok(0)
}

fn print_human_summary(summary: &RunSummary) {
    println!(
        "Slab: width {} um, wavelength {} um, indices {} / {} / {}",
        summary.width, summary.wavelength, summary.n_core, summary.n_sub, summary.n_clad
    );
    println!("Normalized frequency V = {:.6}", summary.normalized_frequency);

    for polarization in Polarization::ALL {
        let per_polarization = match polarization {
            Polarization::Te => &summary.te,
            Polarization::Tm => &summary.tm,
        };
        println!(
            "{}: {} guided mode(s)",
            polarization,
            per_polarization.mode_count
        );
        for (order, neff) in per_polarization.effective_indices.iter().enumerate() {
            println!("  {}{}  neff = {:.12}", polarization, order, neff);
        }
    }

    if summary.te.mode_count == 0 && summary.tm.mode_count == 0 {
        println!("no guided modes: the slab is below cutoff at this wavelength");
    }
}

fn write_summary_json(output: &Path, summary: &RunSummary) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(summary)
        .context("failed to encode run summary")
        .map_err(CliError::from)?;

    let path = output.join(SUMMARY_FILE_NAME);
    std::fs::write(&path, rendered.as_bytes())
        .with_context(|| format!("failed to write run summary '{}'", path.display()))
        .map_err(CliError::from)
}
