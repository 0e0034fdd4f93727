//! Checking that a group of parameters agrees on whether it carries units.
//!
//! Geometry parameters may be given either as plain numbers (in the default
//! unit of the quantity: mm for lengths, degrees for angles) or as `uom`
//! quantities. Within a group of related parameters the two styles may not be
//! mixed: `d = 1.0` next to `dsd = cm(40.0)` almost certainly means that the
//! caller forgot the units of `d`.

use std::ops::Mul;
use thiserror::Error;

use crate::{Angle, Length, deg, mm};

/// A parameter value which may or may not carry units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Measure<Q> {
    /// Plain number, interpreted in the quantity's default unit
    Bare(f32),
    /// Quantity with explicit units
    Dimensioned(Q),
}

/// Whether a `Measure` carries units
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Family { Bare, Dimensioned }

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitError {
    #[error("incompatible units: `{bare}` is a bare number, but `{dimensioned}` carries units")]
    Incompatible { bare: &'static str, dimensioned: &'static str },
}

impl<Q: Copy> Measure<Q> {

    pub fn family(&self) -> Family {
        match self {
            Self::Bare(_)        => Family::Bare,
            Self::Dimensioned(_) => Family::Dimensioned,
        }
    }

    /// Multiply by `k`, staying in the same family
    pub fn scale(self, k: f32) -> Self
    where
        Q: Mul<f32, Output = Q>,
    {
        match self {
            Self::Bare(x)        => Self::Bare(x * k),
            Self::Dimensioned(q) => Self::Dimensioned(q * k),
        }
    }

    /// Convert to the dimensioned representation, interpreting bare values
    /// with `bare_unit`
    pub fn resolve(self, bare_unit: impl Fn(f32) -> Q) -> Q {
        match self {
            Self::Bare(x)        => bare_unit(x),
            Self::Dimensioned(q) => q,
        }
    }
}

/// Check that all the named measures in `group` belong to the same family,
/// and return them in a common representation.
///
/// Bare values are interpreted with `bare_unit`. On failure, the error names
/// the first bare and the first dimensioned member of the group.
pub fn promote<Q: Copy, const N: usize>(
    group: [(&'static str, Measure<Q>); N],
    bare_unit: impl Fn(f32) -> Q,
) -> Result<[Q; N], UnitError> {
    let first_of = |family| group.iter()
        .find(|(_, m)| m.family() == family)
        .map(|(name, _)| *name);
    if let (Some(bare), Some(dimensioned)) = (first_of(Family::Bare), first_of(Family::Dimensioned)) {
        return Err(UnitError::Incompatible { bare, dimensioned })
    }
    Ok(group.map(|(_, m)| m.resolve(&bare_unit)))
}

/// Lengths given as plain numbers are in mm
pub fn promote_lengths<const N: usize>(group: [(&'static str, Measure<Length>); N]) -> Result<[Length; N], UnitError> {
    promote(group, mm)
}

/// Angles given as plain numbers are in degrees
pub fn promote_angles<const N: usize>(group: [(&'static str, Measure<Angle>); N]) -> Result<[Angle; N], UnitError> {
    promote(group, deg)
}

// `f64` is accepted so that unsuffixed float literals can be used directly
impl From<f32>    for Measure<Length> { fn from(x: f32   ) -> Self { Self::Bare(x)        } }
impl From<f64>    for Measure<Length> { fn from(x: f64   ) -> Self { Self::Bare(x as f32) } }
impl From<Length> for Measure<Length> { fn from(x: Length) -> Self { Self::Dimensioned(x) } }
impl From<f32>    for Measure<Angle > { fn from(x: f32   ) -> Self { Self::Bare(x)        } }
impl From<f64>    for Measure<Angle > { fn from(x: f64   ) -> Self { Self::Bare(x as f32) } }
impl From<Angle > for Measure<Angle > { fn from(x: Angle ) -> Self { Self::Dimensioned(x) } }
