//! Band-limited ramp filter kernels, sampled in the spatial domain.
//!
//! A kernel of (even) length `N` is returned together with the lags at which
//! its taps apply, `-N/2 .. N/2 - 1`:
//!
//! + `h[0]    = 1 / 4s²`
//!
//! + `h[even] = 0`
//!
//! + `h[odd]  = -1 / (π n s)²` on flat detectors, and
//!   `-1 / (π D sin(n s / D))²` on arc detectors of radius `D`.
//!
//! The taps are in units of mm⁻²: the caller multiplies by the sample spacing
//! when convolving.

use std::f64::consts::PI;

use log::debug;
use units::{Length, mm_};
use units::todo::{Lengthf32, PerAreaf32};

use crate::{Error, Result};
use crate::sino_geom::SinoGeom;

/// Kernel taps and the lags (in samples) at which they apply
pub type Kernel = (Vec<PerAreaf32>, Vec<isize>);

/// Upper bound on the half-aperture `(N/2) s / D` of an arc kernel
const ARC_APERTURE_LIMIT: f64 = 0.9 * PI / 2.0;

/// Ramp kernel for equally spaced samples on a line
pub fn ramp_flat(n: usize, spacing: Length) -> Result<Kernel> {
    let s = check_kernel_args(n, spacing)?;
    let kernel = make_kernel(n, s, |lag| PI * lag * s);
    debug!("flat ramp kernel: N = {n}, spacing = {s} mm");
    Ok(kernel)
}

/// Ramp kernel for samples equally spaced along an arc of radius `dsd`
pub fn ramp_arc(n: usize, spacing: Length, dsd: Length) -> Result<Kernel> {
    let s = check_kernel_args(n, spacing)?;
    let d = mm_(dsd) as f64;
    if !(d.is_finite() && d > 0.0) {
        return Err(Error::invalid("dsd", format!("must be positive and finite, got {d} mm")))
    }
    let half_aperture = (n / 2) as f64 * s / d;
    if half_aperture > ARC_APERTURE_LIMIT {
        return Err(Error::UnphysicalGeometry {
            n,
            spacing  : s as Lengthf32,
            dsd      : d as Lengthf32,
            half_aperture_deg: half_aperture.to_degrees() as f32,
            limit_deg: ARC_APERTURE_LIMIT.to_degrees() as f32,
        })
    }
    let kernel = make_kernel(n, s, |lag| PI * d * (lag * s / d).sin());
    debug!("arc ramp kernel: N = {n}, spacing = {s} mm, D = {d} mm");
    Ok(kernel)
}

/// Ramp kernel of length `n` matching the detector of `geometry`.
///
/// Parallel-beam and flat fan-beam geometries get the flat kernel with the
/// detector spacing `d`; arc fan-beam geometries get the arc kernel with `d`
/// and `dsd`. Mojette sampling varies with angle and has no single kernel.
pub fn ramp_filter(geometry: &SinoGeom, n: usize) -> Result<Kernel> {
    match geometry {
        SinoGeom::Par(s) | SinoGeom::FanFlat(s, _) => ramp_flat(n, s.d),
        SinoGeom::FanArc(s, fan) => ramp_arc(n, s.d, fan.dsd),
        SinoGeom::Moj(_) => Err(geometry.mismatch("ramp_filter")),
    }
}

fn check_kernel_args(n: usize, spacing: Length) -> Result<f64> {
    if n == 0 || n % 2 != 0 {
        return Err(Error::invalid("N", format!("kernel length must be even and positive, got {n}")))
    }
    let s = mm_(spacing);
    if !(s.is_finite() && s > 0.0) {
        return Err(Error::invalid("spacing", format!("must be positive and finite, got {s} mm")))
    }
    Ok(s as f64)
}

/// Build the kernel, given the denominator `π n s` (or its arc equivalent) of
/// the odd taps
fn make_kernel(n: usize, s: f64, denominator: impl Fn(f64) -> f64) -> Kernel {
    let half = (n / 2) as isize;
    let offsets: Vec<isize> = (-half..half).collect();
    let kernel = offsets.iter()
        .map(|&lag| match lag {
            0                 => 0.25 / (s * s),
            lag if lag % 2 == 0 => 0.0,
            lag               => -1.0 / denominator(lag as f64).powi(2),
        })
        .map(|h| h as PerAreaf32)
        .collect();
    (kernel, offsets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use float_eq::assert_float_eq;
    use rstest::rstest;
    use units::{cm, mm};

    #[rstest(/**/ n, case(2), case(8), case(64), case(256))]
    fn kernel_layout(n: usize) {
        let (kernel, offsets) = ramp_flat(n, mm(1.0)).unwrap();
        assert_eq!(kernel.len(), n);
        assert_eq!(offsets.len(), n);
        let half = n as isize / 2;
        assert_eq!(offsets[0], -half);
        assert_eq!(offsets[n - 1], half - 1);
        assert_eq!(offsets[n / 2], 0);
    }

    #[rstest(/**/ spacing, case(mm(1.0)), case(mm(0.5)), case(cm(0.2)))]
    fn central_tap_and_even_taps(spacing: Length) {
        let s = mm_(spacing);
        for (kernel, offsets) in [
            ramp_flat(32, spacing).unwrap(),
            ramp_arc (32, spacing, mm(500.0)).unwrap(),
        ] {
            for (h, lag) in kernel.into_iter().zip(offsets) {
                match lag {
                    0                   => assert_float_eq!(h, 0.25 / (s * s), r2nd <= 1e-6),
                    lag if lag % 2 == 0 => assert_eq!(h, 0.0),
                    _                   => assert!(h < 0.0),
                }
            }
        }
    }

    #[test]
    fn flat_odd_taps() {
        let (kernel, offsets) = ramp_flat(8, mm(2.0)).unwrap();
        for (h, lag) in kernel.into_iter().zip(offsets) {
            if lag % 2 != 0 {
                let expected = -1.0 / (std::f32::consts::PI * lag as f32 * 2.0).powi(2);
                assert_float_eq!(h, expected, r2nd <= 1e-6);
            }
        }
    }

    #[test]
    fn flat_kernel_has_no_dc_response() {
        let (kernel, _) = ramp_flat(2048, mm(1.0)).unwrap();
        let total: f32 = kernel.iter().sum();
        assert_float_eq!(total, 0.0, abs <= 5e-4);
    }

    #[test]
    fn arc_kernel_tends_to_flat_kernel() {
        let spacing = mm(0.8);
        let (flat, _) = ramp_flat(64, spacing).unwrap();
        let (arc , _) = ramp_arc (64, spacing, mm(0.8e6)).unwrap();
        for (a, f) in arc.into_iter().zip(flat) {
            assert_float_eq!(a, f, r2nd <= 1e-4);
        }
    }

    #[rstest(/**/ n, case(0), case(1), case(65))]
    fn odd_or_empty_kernels_are_rejected(n: usize) {
        assert_eq!(ramp_flat(n, mm(1.0)).unwrap_err().kind(), ErrorKind::InvalidParameter);
        assert_eq!(ramp_arc (n, mm(1.0), mm(100.0)).unwrap_err().kind(), ErrorKind::InvalidParameter);
    }

    #[rstest(/**/ dsd,   ok,
             case(50.0, true),
             case(40.0, false),
    )]
    fn arc_aperture_guard(dsd: f32, ok: bool) {
        // half aperture 64 / dsd against a limit of 0.45 π ≈ 1.414
        let result = ramp_arc(128, mm(1.0), mm(dsd));
        assert_eq!(result.is_ok(), ok);
        if let Err(err) = result {
            assert_eq!(err.kind(), ErrorKind::UnphysicalGeometry);
        }
    }

    #[test]
    fn kernel_follows_geometry() {
        let par = SinoGeom::par().d(0.5).build().unwrap();
        assert_eq!(ramp_filter(&par, 16).unwrap(), ramp_flat(16, mm(0.5)).unwrap());

        let flat = SinoGeom::fan_flat().d(0.5).build().unwrap();
        assert_eq!(ramp_filter(&flat, 16).unwrap(), ramp_flat(16, mm(0.5)).unwrap());

        let arc = SinoGeom::fan_arc().nb(16).d(2.0).dsd(40.0).dod(10.0).build().unwrap();
        assert_eq!(ramp_filter(&arc, 16).unwrap(), ramp_arc(16, mm(2.0), mm(40.0)).unwrap());
    }

    #[test]
    fn mojette_has_no_ramp_kernel() {
        let moj = SinoGeom::moj().build().unwrap();
        let err = ramp_filter(&moj, 16).unwrap_err();
        assert!(matches!(err, Error::CapabilityMismatch { quantity: "ramp_filter", .. }));
    }

    #[test]
    fn ramp_filter_rejects_odd_length() {
        let arc = SinoGeom::fan().build().unwrap();
        assert_eq!(ramp_filter(&arc, 65).unwrap_err().kind(), ErrorKind::InvalidParameter);
    }
}
