//! Errors reported by geometry construction, kernel generation and
//! reconstruction.
//!
//! All of them are detected before any numerical work starts: nothing is
//! clamped or coerced into validity.

use thiserror::Error;

use crate::sino_geom::GeomKind;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid detector curvature: dfs = {dfs} mm, but only 0 (arc) or infinity (flat) are supported")]
    InvalidDfs { dfs: f32 },

    #[error(transparent)]
    IncompatibleUnits(#[from] units::UnitError),

    #[error("`{quantity}` is not available for {kind} geometry")]
    CapabilityMismatch { quantity: &'static str, kind: GeomKind },

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("{what} has shape {actual:?}, but {expected:?} is required")]
    DimensionMismatch { what: &'static str, expected: (usize, usize), actual: (usize, usize) },

    #[error("arc detector half-aperture {half_aperture_deg:.1}° exceeds the {limit_deg:.1}° limit (N = {n}, spacing = {spacing} mm, D = {dsd} mm)")]
    UnphysicalGeometry { n: usize, spacing: f32, dsd: f32, half_aperture_deg: f32, limit_deg: f32 },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse configuration: {0}")]
    Config(#[from] toml::de::Error),
}

/// Coarse classification of `Error`s
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Detector curvature selector, unit families, wrong geometry variant
    InvalidGeometry,
    /// Sizes, counts, spacings, array shapes
    InvalidParameter,
    /// Arc aperture beyond the sanity bound
    UnphysicalGeometry,
    /// Reading data or configuration
    Io,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        use Error::*;
        match self {
            InvalidDfs {..} | IncompatibleUnits(_) | CapabilityMismatch {..} => ErrorKind::InvalidGeometry,
            InvalidParameter {..} | DimensionMismatch {..}                    => ErrorKind::InvalidParameter,
            UnphysicalGeometry {..}                                           => ErrorKind::UnphysicalGeometry,
            Io(_) | Config(_)                                                 => ErrorKind::Io,
        }
    }

    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter { name, reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
