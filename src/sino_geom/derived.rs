//! Quantities derived from the stored parameters of a `SinoGeom`.
//!
//! None of these are stored: each is recomputed from the base parameters
//! whenever it is requested. Quantities which only make sense for some
//! variants return a `CapabilityMismatch` error for the others.

use ndarray::Array2;

use geometry::Point;
use units::{Angle, Length, deg_, mm, mm_, radian, radian_};
use units::todo::{Intensityf32, Lengthf32, Ratiof32};

use super::{Detector, Fan, Sampling, SinoGeom};
use crate::Result;

impl Sampling {

    /// Position of the detector centre, in (fractional, 0-based) bins
    pub(crate) fn w(&self) -> Ratiof32 { (self.nb as f32 - 1.0) / 2.0 + self.offset }

    /// Radial sample locations `d (i - w)`
    pub(crate) fn s(&self) -> impl Iterator<Item = Length> + '_ {
        let w = self.w();
        (0..self.nb).map(move |i| self.d * (i as f32 - w))
    }

    /// Angle of the `i`th projection
    pub(crate) fn angle(&self, i: usize) -> Angle {
        self.orbit_start + self.orbit * (i as f32 / self.na as f32)
    }

    /// Pixel-driven sample spacing at projection angle `phi`
    fn d_moj(&self, phi: Angle) -> Length {
        let (s, c) = radian_(phi).sin_cos();
        self.d * s.abs().max(c.abs())
    }
}

impl Fan {
    /// Angle subtended at the source by the detector sample at `s`
    fn gamma(&self, detector: Detector, s: Length) -> Angle {
        let ratio = mm_(s) / mm_(self.dsd);
        match detector {
            Detector::Arc  => radian(ratio),
            Detector::Flat => radian(ratio.atan()),
        }
    }

    fn rfov(&self, sampling: &Sampling, detector: Detector) -> Length {
        let gamma_max = sampling.s()
            .map(|s| radian_(self.gamma(detector, s)).abs())
            .fold(0.0, f32::max);
        self.dso() * gamma_max.sin()
    }
}

/// Fan-beam ray geometry as bare `f32`s (mm), for use in inner loops.
///
/// Maps a point `(x, y)` in the image plane onto the detector, at a
/// projection angle `β` given through `sin β` and `cos β`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FanRays {
    detector     : Detector,
    dso          : Lengthf32,
    dsd          : Lengthf32,
    ds           : Lengthf32,
    source_offset: Lengthf32,
    dsd_over_ds  : Ratiof32,
    dsd2         : f32,
}

impl FanRays {

    pub(crate) fn new(sampling: &Sampling, fan: &Fan, detector: Detector) -> Self {
        let dsd = mm_(fan.dsd);
        let ds  = mm_(sampling.d);
        Self {
            detector,
            dso          : mm_(fan.dso()),
            dsd,
            ds,
            source_offset: mm_(fan.source_offset),
            dsd_over_ds  : dsd / ds,
            dsd2         : dsd * dsd,
        }
    }

    /// Fractional detector bin (relative to the detector centre) hit by the
    /// ray through `(x, y)`, and the fan-beam weight with which that bin is
    /// backprojected onto `(x, y)`.
    #[inline]
    pub(crate) fn bin_and_weight(&self, x: Lengthf32, y: Lengthf32, sin_b: f32, cos_b: f32) -> (f32, f32) {
        // Distance from source to point, along the central ray
        let d_loop = self.dso + x * sin_b - y * cos_b;
        // Distance of point from the central ray
        let r_loop = x * cos_b + y * sin_b - self.source_offset;
        match self.detector {
            Detector::Arc => (
                self.dsd_over_ds * r_loop.atan2(d_loop),
                self.dsd2 / (d_loop * d_loop + r_loop * r_loop),
            ),
            Detector::Flat => {
                let magnification = self.dsd / d_loop;
                (magnification * r_loop / self.ds, magnification * magnification)
            }
        }
    }

    pub(crate) fn ds(&self) -> Lengthf32 { self.ds }
}

impl SinoGeom {

    /// Detector sample spacing
    pub fn ds(&self) -> Length { self.d() }

    /// Radial sample spacing at the isocentre.
    ///
    /// Not defined for mojette geometries, whose radial spacing depends on
    /// the angle: see `d_moj`.
    pub fn dr(&self) -> Result<Length> {
        match self {
            Self::Par(s) => Ok(s.d),
            Self::FanArc(s, fan) | Self::FanFlat(s, fan) => Ok(s.d * (mm_(fan.dso()) / mm_(fan.dsd))),
            Self::Moj(_) => Err(self.mismatch("dr")),
        }
    }

    /// Position of the detector centre in (fractional, 0-based) bins:
    /// `(nb - 1)/2 + offset`
    pub fn w(&self) -> Ratiof32 { self.sampling().w() }

    /// Shape of sinograms in this geometry: `(nb, na)`
    pub fn dim(&self) -> (usize, usize) { (self.nb(), self.na()) }

    /// Sinogram of zeros with shape `dim()`
    pub fn zeros(&self) -> Array2<Intensityf32> { Array2::zeros(self.dim()) }

    /// Sinogram of ones with shape `dim()`
    pub fn ones(&self) -> Array2<Intensityf32> { Array2::ones(self.dim()) }

    /// Radial (detector) sample locations `d (i - w)`, `i = 0 .. nb-1`
    pub fn sample_locations(&self) -> Vec<Length> { self.sampling().s().collect() }

    /// Projection angles, `orbit_start + orbit i / na`, `i = 0 .. na-1`
    pub fn angles(&self) -> Vec<Angle> {
        let s = self.sampling();
        (0..s.na).map(|i| s.angle(i)).collect()
    }

    pub fn angles_degrees(&self) -> Vec<f32> { self.angles().into_iter().map(deg_   ).collect() }
    pub fn angles_radians(&self) -> Vec<f32> { self.angles().into_iter().map(radian_).collect() }

    /// Angle subtended at the source by each detector sample: `s / dsd` for
    /// arc detectors, `atan(s / dsd)` for flat ones
    pub fn gamma(&self) -> Result<Vec<Angle>> {
        let (sampling, fan, detector) = self.fan_params("gamma")?;
        Ok(sampling.s().map(|s| fan.gamma(detector, s)).collect())
    }

    /// Largest `|gamma|`: the half-aperture of the fan
    pub fn gamma_max(&self) -> Result<Angle> {
        let max = self.gamma()?.into_iter()
            .map(|g| radian_(g).abs())
            .fold(0.0, f32::max);
        Ok(radian(max))
    }

    /// Angle-dependent sample spacing of mojette geometries:
    /// `d max(|sin φ|, |cos φ|)` for each projection angle `φ`
    pub fn d_moj(&self) -> Result<Vec<Length>> {
        match self {
            Self::Moj(s) => Ok((0..s.na).map(|i| s.d_moj(s.angle(i))).collect()),
            _            => Err(self.mismatch("d_moj")),
        }
    }

    /// Radius of the field of view: the disk which is sampled at every
    /// projection angle
    pub fn rfov(&self) -> Length {
        match self {
            Self::Par(s) => {
                let max = s.s().map(|s| mm_(s).abs()).fold(0.0, f32::max);
                mm(max)
            },
            Self::Moj(s) => {
                let min = (0..s.na).map(|i| mm_(s.d_moj(s.angle(i)))).fold(f32::INFINITY, f32::min);
                mm(s.nb as f32 / 2.0 * min)
            },
            Self::FanArc (s, fan) => fan.rfov(s, Detector::Arc),
            Self::FanFlat(s, fan) => fan.rfov(s, Detector::Flat),
        }
    }

    /// Positions of the centres of the detector elements, when the
    /// projection angle is zero
    pub fn detector_centers(&self) -> Vec<Point> {
        let zero = mm(0.0);
        match self {
            Self::Par(s) | Self::Moj(s) => s.s().map(|s| Point::new(s, zero)).collect(),
            Self::FanArc(s, fan) => s.s().map(|s| {
                let gamma = radian_(fan.gamma(Detector::Arc, s));
                Point::new(fan.dsd * gamma.sin() + fan.source_offset,
                           fan.dso() - fan.dsd * gamma.cos())
            }).collect(),
            Self::FanFlat(s, fan) => s.s().map(|s| {
                Point::new(s + fan.source_offset, -fan.dod)
            }).collect(),
        }
    }

    /// Detector coordinate (mm, relative to the detector centre) onto which
    /// each of `points` is projected, at each projection angle.
    ///
    /// The result has shape `(points.len(), na)`.
    pub fn taufun(&self, points: &[Point]) -> Array2<Lengthf32> {
        let sampling = self.sampling();
        let trig: Vec<(f32, f32)> = (0..sampling.na)
            .map(|i| radian_(sampling.angle(i)).sin_cos())
            .collect();
        let rays = match self {
            Self::FanArc(s, fan)  => Some(FanRays::new(s, fan, Detector::Arc)),
            Self::FanFlat(s, fan) => Some(FanRays::new(s, fan, Detector::Flat)),
            Self::Par(_) | Self::Moj(_) => None,
        };
        Array2::from_shape_fn((points.len(), sampling.na), |(p, a)| {
            let (x, y) = points[p].to_mm();
            let (sin_b, cos_b) = trig[a];
            match rays {
                Some(rays) => rays.bin_and_weight(x, y, sin_b, cos_b).0 * rays.ds(),
                None       => x * cos_b + y * sin_b,
            }
        })
    }
}
