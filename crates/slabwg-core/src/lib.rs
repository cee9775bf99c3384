//! Guided-mode solver for three-layer dielectric slab waveguides.
//!
//! Given a symmetric or asymmetric slab (core, substrate, cladding) and a
//! free-space wavelength, the crate finds the TE and TM guided modes by
//! bracketing the phase-matching residual over the guided interval,
//! reconstructs each mode's transverse field profile, and hands ordered
//! results to a pluggable sink.
//!
//! The crate is deliberately deterministic: the same inputs always yield
//! bit-identical effective indices, profiles, and artifacts.

pub mod common;
pub mod domain;
pub mod output;
pub mod solver;

pub use domain::{
    FieldProfile, FieldSample, FieldSampling, Mode, Normalization, Polarization, RunSummary,
    SlabError, SlabErrorCategory, SlabResult, WaveguideParameters,
};
pub use output::{MemorySink, ResultSink, TextFileSink};
pub use solver::{
    DispersionRelation, FieldProfileBuilder, ModeRootFinder, ScanSettings, SlabWaveguide,
};
