//! Sinogram geometries: the acquisition configuration of a 2D sinogram.
//!
//! A `SinoGeom` stores only the minimal set of physical parameters of the
//! scan. Everything else (sample locations, angles, fan angles, field of view,
//! detector positions) is computed from them on demand, in `derived`, so it can
//! never drift out of sync with the stored parameters.
//!
//! The set of geometries is closed:
//!
//! + `Par`: parallel rays
//!
//! + `Moj`: parallel rays with pixel-driven (angle-dependent) sample spacing
//!
//! + `FanArc`: divergent rays onto an arc (equiangular) detector centred on the
//!   source
//!
//! + `FanFlat`: divergent rays onto a flat (equally spaced) detector
//!
//! Instances are immutable: they are created with the builders in `builder`
//! (`SinoGeom::par()`, `SinoGeom::fan()`, ...) and resampling (`down`,
//! `oversample`) returns a new geometry.

mod builder;
mod derived;
mod resample;

pub use builder::{ParBuilder, FanBuilder};
pub(crate) use derived::FanRays;

use std::fmt;

use units::{Angle, Length, deg_, mm, mm_, todo::Ratiof32};

use crate::{Error, Result};

/// Tag identifying the variant of a `SinoGeom`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GeomKind { Par, Moj, FanArc, FanFlat }

impl fmt::Display for GeomKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            GeomKind::Par     => "parallel-beam",
            GeomKind::Moj     => "mojette",
            GeomKind::FanArc  => "fan-beam (arc detector)",
            GeomKind::FanFlat => "fan-beam (flat detector)",
        };
        write!(f, "{name}")
    }
}

/// Shape of a fan-beam detector, as selected by `dfs`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Detector {
    /// `dfs == 0`: detector elements on an arc centred on the source
    Arc,
    /// `dfs == ∞`: detector elements on a straight line
    Flat,
}

impl Detector {
    /// Focal-spot-to-source distance: 0 (arc) or ∞ (flat)
    pub fn dfs(self) -> Length {
        match self {
            Detector::Arc  => mm(0.0),
            Detector::Flat => mm(f32::INFINITY),
        }
    }
}

/// Radial and angular sampling, common to all geometries
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sampling {
    /// Number of radial samples (detector bins)
    pub(crate) nb: usize,
    /// Number of projection angles
    pub(crate) na: usize,
    /// Radial sample spacing
    pub(crate) d: Length,
    /// Total angular sweep
    pub(crate) orbit: Angle,
    /// Angle of the first projection
    pub(crate) orbit_start: Angle,
    /// Detector offset, in units of bins
    pub(crate) offset: Ratiof32,
    /// Width of a detector element
    pub(crate) strip_width: Length,
}

/// Parameters specific to divergent-beam geometries
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fan {
    /// Lateral misalignment of the source
    pub(crate) source_offset: Length,
    /// Source-to-detector distance
    pub(crate) dsd: Length,
    /// Isocentre-to-detector distance
    pub(crate) dod: Length,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SinoGeom {
    Par    (Sampling),
    Moj    (Sampling),
    FanArc (Sampling, Fan),
    FanFlat(Sampling, Fan),
}

impl SinoGeom {

    /// Builder for a parallel-beam geometry
    pub fn par() -> ParBuilder { ParBuilder::new(false) }

    /// Builder for a mojette geometry
    pub fn moj() -> ParBuilder { ParBuilder::new(true) }

    /// Builder for a fan-beam geometry; the detector shape is selected by `dfs`
    pub fn fan() -> FanBuilder { FanBuilder::new(Detector::Arc) }

    /// Builder for a fan-beam geometry whose `dfs` defaults to 0
    pub fn fan_arc() -> FanBuilder { FanBuilder::new(Detector::Arc) }

    /// Builder for a fan-beam geometry whose `dfs` defaults to ∞
    pub fn fan_flat() -> FanBuilder { FanBuilder::new(Detector::Flat) }

    pub fn kind(&self) -> GeomKind {
        match self {
            Self::Par    (..) => GeomKind::Par,
            Self::Moj    (..) => GeomKind::Moj,
            Self::FanArc (..) => GeomKind::FanArc,
            Self::FanFlat(..) => GeomKind::FanFlat,
        }
    }

    /// Shape of the detector, for divergent-beam geometries only
    pub fn detector(&self) -> Option<Detector> {
        match self {
            Self::FanArc (..) => Some(Detector::Arc),
            Self::FanFlat(..) => Some(Detector::Flat),
            Self::Par(_) | Self::Moj(_) => None,
        }
    }

    pub(crate) fn sampling(&self) -> &Sampling {
        match self {
            Self::Par(s) | Self::Moj(s) | Self::FanArc(s, _) | Self::FanFlat(s, _) => s,
        }
    }

    /// The fan-specific parameters, or a `CapabilityMismatch` naming `quantity`
    pub(crate) fn fan_params(&self, quantity: &'static str) -> Result<(&Sampling, &Fan, Detector)> {
        match self {
            Self::FanArc (s, f) => Ok((s, f, Detector::Arc)),
            Self::FanFlat(s, f) => Ok((s, f, Detector::Flat)),
            Self::Par(_) | Self::Moj(_) => Err(self.mismatch(quantity)),
        }
    }

    pub(crate) fn mismatch(&self, quantity: &'static str) -> Error {
        Error::CapabilityMismatch { quantity, kind: self.kind() }
    }

    // ----- Stored parameters -----------------------------------------------------

    pub fn nb         (&self) -> usize      { self.sampling().nb }
    pub fn na         (&self) -> usize      { self.sampling().na }
    pub fn d          (&self) -> Length     { self.sampling().d }
    pub fn orbit      (&self) -> Angle      { self.sampling().orbit }
    pub fn orbit_start(&self) -> Angle      { self.sampling().orbit_start }
    pub fn offset     (&self) -> Ratiof32   { self.sampling().offset }
    pub fn strip_width(&self) -> Length     { self.sampling().strip_width }

    pub fn source_offset(&self) -> Result<Length> { Ok(self.fan_params("source_offset")?.1.source_offset) }
    pub fn dsd          (&self) -> Result<Length> { Ok(self.fan_params("dsd"          )?.1.dsd) }
    pub fn dod          (&self) -> Result<Length> { Ok(self.fan_params("dod"          )?.1.dod) }
    pub fn dfs          (&self) -> Result<Length> { Ok(self.fan_params("dfs"          )?.2.dfs()) }

    /// Source-to-isocentre distance
    pub fn dso(&self) -> Result<Length> {
        let (_, fan, _) = self.fan_params("dso")?;
        Ok(fan.dso())
    }

}

impl Fan {
    pub(crate) fn dso(&self) -> Length { self.dsd - self.dod }
}

impl fmt::Display for SinoGeom {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = self.sampling();
        write!(f, "<{} nb={} na={} d={}mm orbit={}° start={}° offset={} strip={}mm",
               self.kind(), s.nb, s.na, mm_(s.d), deg_(s.orbit), deg_(s.orbit_start),
               s.offset, mm_(s.strip_width))?;
        if let Self::FanArc(_, fan) | Self::FanFlat(_, fan) = self {
            write!(f, " dsd={}mm dod={}mm source_offset={}mm",
                   mm_(fan.dsd), mm_(fan.dod), mm_(fan.source_offset))?;
        }
        write!(f, ">")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use rstest::rstest;

    #[rstest(/**/ geom,                                   kind,
             case(SinoGeom::par     ().build().unwrap(), GeomKind::Par),
             case(SinoGeom::moj     ().build().unwrap(), GeomKind::Moj),
             case(SinoGeom::fan     ().build().unwrap(), GeomKind::FanArc),
             case(SinoGeom::fan_arc ().build().unwrap(), GeomKind::FanArc),
             case(SinoGeom::fan_flat().build().unwrap(), GeomKind::FanFlat),
    )]
    fn builders_produce_requested_kind(geom: SinoGeom, kind: GeomKind) {
        assert_eq!(geom.kind(), kind);
    }

    #[rstest(/**/ quantity,
             case("dso"), case("dsd"), case("dod"), case("dfs"), case("source_offset"),
    )]
    fn fan_quantities_unavailable_for_parallel(quantity: &str) {
        let geom = SinoGeom::par().build().unwrap();
        let result = match quantity {
            "dso" => geom.dso(),
            "dsd" => geom.dsd(),
            "dod" => geom.dod(),
            "dfs" => geom.dfs(),
            _     => geom.source_offset(),
        };
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidGeometry);
        assert!(matches!(err, Error::CapabilityMismatch { kind: GeomKind::Par, .. }));
    }

    // The detector shape is carried by the variant alone, so moving the
    // parameters of one fan variant into the other cannot desynchronize `dfs`
    #[test]
    fn dfs_follows_variant() {
        let flat = SinoGeom::fan_flat().build().unwrap();
        let arc = match flat {
            SinoGeom::FanFlat(s, f) => SinoGeom::FanArc(s, f),
            other => other,
        };
        assert_eq!(arc.kind(), GeomKind::FanArc);
        assert_eq!(arc.detector(), Some(Detector::Arc));
        assert_eq!(arc.dfs().unwrap(), mm(0.0));
        assert_eq!(mm_(flat.dfs().unwrap()), f32::INFINITY);
    }

    #[test]
    fn display_mentions_fan_distances() {
        let geom = SinoGeom::fan().nb(8).build().unwrap();
        let text = geom.to_string();
        assert!(text.contains("nb=8"), "{text}");
        assert!(text.contains("dsd=32mm"), "{text}");
    }
}
