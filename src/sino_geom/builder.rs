//! Named-parameter construction of `SinoGeom`s, with defaults and validation.
//!
//! Lengths and angles may be given as bare numbers (mm and degrees) or as
//! `uom` quantities, but related parameters must agree: see
//! `units::promote`. Defaults which are derived from another parameter (e.g.
//! `strip_width = d`, `dsd = 4 nb d`) inherit that parameter's style.
//!
//! | parameter       | default                 |
//! |-----------------|-------------------------|
//! | `nb`            | 128                     |
//! | `na`            | `2 ⌊nb π/4⌋`            |
//! | `d`             | 1 mm                    |
//! | `orbit`         | 180° (par/moj), 360° (fan) |
//! | `orbit_start`   | 0                       |
//! | `offset`        | 0                       |
//! | `strip_width`   | `d`                     |
//! | `source_offset` | 0                       |
//! | `dsd`           | `4 nb d`                |
//! | `dod`           | `nb d`                  |
//! | `dfs`           | 0 (`fan_flat`: ∞)       |

use log::debug;

use units::{Angle, Length, Measure, deg, mm, mm_, radian_, todo::Ratiof32};
use units::promote::{promote_angles, promote_lengths};

use super::{Detector, Fan, Sampling, SinoGeom};
use crate::{Error, Result};

#[derive(Clone, Debug, Default)]
struct SamplingArgs {
    nb         : Option<usize>,
    na         : Option<usize>,
    d          : Option<Measure<Length>>,
    orbit      : Option<Measure<Angle>>,
    orbit_start: Option<Measure<Angle>>,
    offset     : Option<Ratiof32>,
    strip_width: Option<Measure<Length>>,
}

/// Generate the setters for the parameters shared by all geometries
macro_rules! sampling_setters {
    () => {
        /// Number of radial samples (detector bins)
        pub fn nb(mut self, nb: usize) -> Self { self.sampling.nb = Some(nb); self }

        /// Number of projection angles
        pub fn na(mut self, na: usize) -> Self { self.sampling.na = Some(na); self }

        /// Radial sample spacing
        pub fn d(mut self, d: impl Into<Measure<Length>>) -> Self { self.sampling.d = Some(d.into()); self }

        /// Total angular sweep
        pub fn orbit(mut self, orbit: impl Into<Measure<Angle>>) -> Self { self.sampling.orbit = Some(orbit.into()); self }

        /// Angle of the first projection
        pub fn orbit_start(mut self, start: impl Into<Measure<Angle>>) -> Self { self.sampling.orbit_start = Some(start.into()); self }

        /// Detector offset, in bins
        pub fn offset(mut self, offset: Ratiof32) -> Self { self.sampling.offset = Some(offset); self }

        /// Width of a detector element
        pub fn strip_width(mut self, width: impl Into<Measure<Length>>) -> Self { self.sampling.strip_width = Some(width.into()); self }
    };
}

/// Builder for parallel-beam and mojette geometries
#[derive(Clone, Debug)]
pub struct ParBuilder {
    mojette: bool,
    sampling: SamplingArgs,
}

/// Builder for fan-beam geometries
#[derive(Clone, Debug)]
pub struct FanBuilder {
    default_detector: Detector,
    sampling     : SamplingArgs,
    source_offset: Option<Measure<Length>>,
    dsd          : Option<Measure<Length>>,
    dod          : Option<Measure<Length>>,
    dfs          : Option<Measure<Length>>,
}

impl ParBuilder {

    pub(super) fn new(mojette: bool) -> Self { Self { mojette, sampling: SamplingArgs::default() } }

    sampling_setters!();

    pub fn build(self) -> Result<SinoGeom> {
        let d = self.sampling.d_or_default(&[self.sampling.strip_width]);
        let [d, strip_width] = promote_lengths([
            ("d"          , d),
            ("strip_width", self.sampling.strip_width.unwrap_or(d)),
        ])?;
        let sampling = self.sampling.build(180.0, d, strip_width)?;
        let geom = if self.mojette { SinoGeom::Moj(sampling) } else { SinoGeom::Par(sampling) };
        debug!("Constructed {geom}");
        Ok(geom)
    }
}

impl FanBuilder {

    pub(super) fn new(default_detector: Detector) -> Self {
        Self {
            default_detector,
            sampling     : SamplingArgs::default(),
            source_offset: None,
            dsd          : None,
            dod          : None,
            dfs          : None,
        }
    }

    sampling_setters!();

    /// Lateral misalignment of the source
    pub fn source_offset(mut self, x: impl Into<Measure<Length>>) -> Self { self.source_offset = Some(x.into()); self }

    /// Source-to-detector distance
    pub fn dsd(mut self, x: impl Into<Measure<Length>>) -> Self { self.dsd = Some(x.into()); self }

    /// Isocentre-to-detector distance
    pub fn dod(mut self, x: impl Into<Measure<Length>>) -> Self { self.dod = Some(x.into()); self }

    /// Focal-spot-to-source distance: exactly 0 for an arc detector, exactly
    /// infinity for a flat one
    pub fn dfs(mut self, x: impl Into<Measure<Length>>) -> Self { self.dfs = Some(x.into()); self }

    pub fn build(self) -> Result<SinoGeom> {
        let nb = self.sampling.nb_or_default() as f32;
        let d  = self.sampling.d_or_default(&[self.sampling.strip_width, self.source_offset,
                                              self.dsd, self.dod, self.dfs]);
        let default_dfs = match self.default_detector {
            Detector::Arc  => 0.0,
            Detector::Flat => f32::INFINITY,
        };
        let [d, strip_width, source_offset, dsd, dod, dfs] = promote_lengths([
            ("d"            , d),
            ("strip_width"  , self.sampling.strip_width.unwrap_or(d)),
            ("source_offset", self.source_offset.unwrap_or(like(d, 0.0))),
            ("dsd"          , self.dsd          .unwrap_or(d.scale(4.0 * nb))),
            ("dod"          , self.dod          .unwrap_or(d.scale(nb))),
            ("dfs"          , self.dfs          .unwrap_or(like(d, default_dfs))),
        ])?;

        let sampling = self.sampling.build(360.0, d, strip_width)?;

        finite("source_offset", mm_(source_offset))?;
        finite("dod"          , mm_(dod          ))?;
        positive("dsd", mm_(dsd))?;
        let fan = Fan { source_offset, dsd, dod };
        if !(mm_(fan.dso()) > 0.0) {
            return Err(Error::invalid("dod", format!(
                "source-to-isocentre distance dsd - dod = {} mm must be positive",
                mm_(fan.dso()))))
        }

        let dfs_mm = mm_(dfs);
        let geom = if dfs_mm == 0.0 {
            SinoGeom::FanArc(sampling, fan)
        } else if dfs_mm == f32::INFINITY {
            SinoGeom::FanFlat(sampling, fan)
        } else {
            return Err(Error::InvalidDfs { dfs: dfs_mm })
        };
        debug!("Constructed {geom}");
        Ok(geom)
    }
}

impl SamplingArgs {

    fn nb_or_default(&self) -> usize { self.nb.unwrap_or(128) }

    /// `d` as given, or 1 mm in the style of the first of `others` which was
    /// given explicitly
    fn d_or_default(&self, others: &[Option<Measure<Length>>]) -> Measure<Length> {
        self.d.unwrap_or_else(|| {
            match others.iter().flatten().next() {
                Some(other) => like(*other, 1.0),
                None        => Measure::Bare(1.0),
            }
        })
    }

    fn build(&self, default_orbit_degrees: f32, d: Length, strip_width: Length) -> Result<Sampling> {
        let nb = self.nb_or_default();
        let na = self.na.unwrap_or_else(|| default_na(nb));
        if nb == 0 { return Err(Error::invalid("nb", "number of radial samples must be positive")) }
        if na == 0 { return Err(Error::invalid("na", "number of angles must be positive")) }

        // Default orbit follows the style of orbit_start, and vice versa
        let orbit = self.orbit.unwrap_or(match self.orbit_start {
            Some(start) => like_angle(start, default_orbit_degrees),
            None        => Measure::Bare(default_orbit_degrees),
        });
        let orbit_start = self.orbit_start.unwrap_or(orbit.scale(0.0));
        let [orbit, orbit_start] = promote_angles([
            ("orbit"      , orbit),
            ("orbit_start", orbit_start),
        ])?;

        let offset = self.offset.unwrap_or(0.0);
        positive("d", mm_(d))?;
        finite("strip_width", mm_(strip_width))?;
        if mm_(strip_width) < 0.0 {
            return Err(Error::invalid("strip_width", format!("{} mm is negative", mm_(strip_width))))
        }
        finite("offset", offset)?;
        finite("orbit", radian_(orbit))?;
        finite("orbit_start", radian_(orbit_start))?;

        Ok(Sampling { nb, na, d, orbit, orbit_start, offset, strip_width })
    }
}

/// `2 ⌊nb π/4⌋`, but at least 1
fn default_na(nb: usize) -> usize {
    (2 * (nb as f32 * std::f32::consts::FRAC_PI_4).floor() as usize).max(1)
}

/// A length of `mm_value` mm, bare or dimensioned like `template`
fn like(template: Measure<Length>, mm_value: f32) -> Measure<Length> {
    match template {
        Measure::Bare(_)        => Measure::Bare(mm_value),
        Measure::Dimensioned(_) => Measure::Dimensioned(mm(mm_value)),
    }
}

/// An angle of `degrees`, bare or dimensioned like `template`
fn like_angle(template: Measure<Angle>, degrees: f32) -> Measure<Angle> {
    match template {
        Measure::Bare(_)        => Measure::Bare(degrees),
        Measure::Dimensioned(_) => Measure::Dimensioned(deg(degrees)),
    }
}

fn finite(name: &'static str, x: f32) -> Result<()> {
    if x.is_finite() { Ok(()) }
    else             { Err(Error::invalid(name, format!("{x} is not finite"))) }
}

fn positive(name: &'static str, x: f32) -> Result<()> {
    finite(name, x)?;
    if x > 0.0 { Ok(()) }
    else       { Err(Error::invalid(name, format!("{x} must be positive"))) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, sino_geom::GeomKind};
    use float_eq::assert_float_eq;
    use rstest::rstest;
    use units::{cm, turn, assert_uom_eq};
    use units::uom::si::{length::millimeter, angle::degree};

    #[test]
    fn parallel_defaults() {
        let g = SinoGeom::par().build().unwrap();
        assert_eq!(g.nb(), 128);
        assert_eq!(g.na(), 200);
        assert_eq!(g.d(), mm(1.0));
        assert_eq!(g.strip_width(), mm(1.0));
        assert_eq!(g.offset(), 0.0);
        assert_float_eq!(units::deg_(g.orbit()), 180.0, r2nd <= 1e-6);
        assert_float_eq!(units::deg_(g.orbit_start()), 0.0, abs <= 1e-6);
    }

    #[test]
    fn fan_defaults_scale_with_nb_and_d() {
        let g = SinoGeom::fan().nb(64).d(2.0).build().unwrap();
        assert_eq!(g.na(), 100);
        assert_eq!(g.strip_width(), mm(2.0));
        assert_uom_eq!(millimeter, g.dsd().unwrap(), mm(512.0), ulps <= 1);
        assert_uom_eq!(millimeter, g.dod().unwrap(), mm(128.0), ulps <= 1);
        assert_uom_eq!(millimeter, g.dso().unwrap(), mm(384.0), ulps <= 1);
        assert_eq!(g.dfs().unwrap(), mm(0.0));
        assert_float_eq!(units::deg_(g.orbit()), 360.0, r2nd <= 1e-6);
    }

    #[test]
    fn fan_flat_defaults_to_infinite_dfs() {
        let g = SinoGeom::fan_flat().build().unwrap();
        assert_eq!(g.kind(), GeomKind::FanFlat);
        assert_eq!(mm_(g.dfs().unwrap()), f32::INFINITY);
    }

    #[rstest(/**/ dfs,                  expected,
             case(0.0,                  Some(GeomKind::FanArc)),
             case(f32::INFINITY,        Some(GeomKind::FanFlat)),
             case(1.0,                  None),
             case(-1.0,                 None),
             case(f32::NEG_INFINITY,    None),
             case(f32::NAN,             None),
    )]
    fn dfs_selects_detector(dfs: f32, expected: Option<GeomKind>) {
        let result = SinoGeom::fan().dfs(dfs).build();
        match expected {
            Some(kind) => assert_eq!(result.unwrap().kind(), kind),
            None => {
                let err = result.unwrap_err();
                assert_eq!(err.kind(), ErrorKind::InvalidGeometry);
                assert!(matches!(err, Error::InvalidDfs { .. }), "{err}");
            }
        }
    }

    #[test]
    fn dimensioned_parameters_throughout() {
        let g = SinoGeom::fan()
            .nb(100)
            .d(mm(1.5))
            .dsd(cm(95.0))
            .dod(cm(40.0))
            .dfs(mm(f32::INFINITY))
            .orbit(turn(1.0))
            .build().unwrap();
        assert_eq!(g.kind(), GeomKind::FanFlat);
        assert_uom_eq!(millimeter, g.dso().unwrap(), mm(550.0), r2nd <= 1e-6);
        // Defaults derived from dimensioned `d` are dimensioned too
        assert_eq!(g.strip_width(), mm(1.5));
    }

    #[test]
    fn default_d_follows_style_of_other_lengths() {
        // No `d` given: default must not clash with dimensioned `dsd`
        let g = SinoGeom::fan().dsd(cm(50.0)).dod(cm(10.0)).build().unwrap();
        assert_eq!(g.d(), mm(1.0));
    }

    #[rstest(/**/ builder,
             case(SinoGeom::par().d(1.0).strip_width(mm(1.0))),
             case(SinoGeom::par().d(mm(1.0)).strip_width(1.0)),
             case(SinoGeom::par().orbit(180.0).orbit_start(deg(10.0))),
             case(SinoGeom::par().orbit(turn(0.5)).orbit_start(10.0)),
    )]
    fn mixed_units_in_sampling_fail(builder: ParBuilder) {
        let err = builder.build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidGeometry);
        assert!(matches!(err, Error::IncompatibleUnits(_)), "{err}");
    }

    #[rstest(/**/ builder,
             case(SinoGeom::fan().d(1.0).dsd(cm(50.0))),
             case(SinoGeom::fan().dod(1.0).dsd(cm(50.0))),
             case(SinoGeom::fan().d(mm(1.0)).dfs(f32::INFINITY)),
             case(SinoGeom::fan().source_offset(mm(0.5)).d(1.0)),
    )]
    fn mixed_units_in_fan_lengths_fail(builder: FanBuilder) {
        assert!(matches!(builder.build(), Err(Error::IncompatibleUnits(_))));
    }

    #[test]
    fn dimensioned_orbit_start_gets_dimensioned_default_orbit() {
        let g = SinoGeom::par().orbit_start(deg(45.0)).build().unwrap();
        assert_uom_eq!(degree, g.orbit(), deg(180.0), r2nd <= 1e-6);
    }

    #[rstest(/**/ builder,                                  name,
             case(SinoGeom::par().nb(0).into(),             "nb"),
             case(SinoGeom::par().na(0).into(),             "na"),
             case(SinoGeom::par().d(0.0).into(),            "d"),
             case(SinoGeom::par().d(-1.0).into(),           "d"),
             case(SinoGeom::par().strip_width(-1.0).into(), "strip_width"),
             case(SinoGeom::par().offset(f32::NAN).into(),  "offset"),
             case(SinoGeom::fan().dsd(0.0).into(),          "dsd"),
             case(SinoGeom::fan().dsd(10.0).dod(10.0).into(), "dod"),
    )]
    fn non_positive_parameters_fail(builder: AnyBuilder, name: &str) {
        let err = builder.build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        match err {
            Error::InvalidParameter { name: n, .. } => assert_eq!(n, name),
            other => panic!("unexpected error {other}"),
        }
    }

    // ----- Test helpers -------------------------------------------------------------
    enum AnyBuilder { Par(ParBuilder), Fan(FanBuilder) }
    impl From<ParBuilder> for AnyBuilder { fn from(b: ParBuilder) -> Self { Self::Par(b) } }
    impl From<FanBuilder> for AnyBuilder { fn from(b: FanBuilder) -> Self { Self::Fan(b) } }
    impl AnyBuilder {
        fn build(self) -> Result<SinoGeom> {
            match self { Self::Par(b) => b.build(), Self::Fan(b) => b.build() }
        }
    }
}
