//! Two-dimensional filtered backprojection (FBP) for parallel-beam and
//! fan-beam tomography.
//!
//! + `sino_geom`: acquisition geometries and the quantities derived from them
//!
//! + `ramp`: ramp filter kernels
//!
//! + `filter`: cosine weighting and ramp filtering of sinograms
//!
//! + `backproject`: pixel-driven fan-beam backprojection
//!
//! + `fbp`: the three combined
//!
//! Sinograms are `(nb, na)` arrays (detector bins × angles), images are
//! `(nx, ny)` arrays.

pub mod error;
pub mod sino_geom;
pub mod grid;
pub mod ramp;
pub mod filter;
pub mod backproject;
pub mod fbp;
pub mod config;
pub mod io;
pub mod utils;

pub use error::{Error, ErrorKind, Result};
pub use sino_geom::{SinoGeom, GeomKind, Detector};
pub use grid::ImageGrid;
pub use geometry::{Point, Vector};
