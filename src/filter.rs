//! Sinogram pre-processing for filtered backprojection: fan-beam cosine
//! weighting and ramp filtering along the detector.

use log::debug;
use ndarray::{Array2, ArrayView1, ArrayViewMut1, Axis, Zip};

use units::{mm_, radian_};
use units::todo::{Intensityf32, PerAreaf32};

use crate::{Error, Result};
use crate::ramp::ramp_filter;
use crate::sino_geom::SinoGeom;

/// Weight each detector bin of a fan-beam sinogram by `(dso/dsd) cos γ`.
///
/// Parallel-beam sinograms are returned unchanged.
pub fn fan_weight(geometry: &SinoGeom, sino: &Array2<Intensityf32>) -> Result<Array2<Intensityf32>> {
    check_shape(geometry, sino)?;
    let mut weighted = sino.clone();
    if geometry.detector().is_none() { return Ok(weighted) }
    let scale = mm_(geometry.dso()?) / mm_(geometry.dsd()?);
    for (mut row, gamma) in weighted.axis_iter_mut(Axis(0)).zip(geometry.gamma()?) {
        row *= scale * radian_(gamma).cos();
    }
    Ok(weighted)
}

/// Convolve every projection with the ramp kernel of `geometry`.
///
/// The convolution is linear (not circular): a kernel of length `2 nb` covers
/// every lag between two bins of the same projection. The result is scaled by
/// the detector spacing.
pub fn filter_sinogram(geometry: &SinoGeom, sino: &Array2<Intensityf32>) -> Result<Array2<Intensityf32>> {
    check_shape(geometry, sino)?;
    let nb = geometry.nb();
    let (kernel, _) = ramp_filter(geometry, 2 * nb)?;
    let ds = mm_(geometry.ds());
    debug!("ramp filtering {} projections of {nb} bins", geometry.na());

    let mut filtered = Array2::<Intensityf32>::zeros(sino.dim());
    Zip::from(filtered.lanes_mut(Axis(0)))
        .and(sino.lanes(Axis(0)))
        .par_for_each(|out, projection| convolve(out, projection, &kernel, ds));
    Ok(filtered)
}

/// `out[i] = ds Σⱼ p[j] h[i - j]`, where `kernel[nb + lag] = h[lag]`
fn convolve(
    mut out   : ArrayViewMut1<Intensityf32>,
    projection: ArrayView1<Intensityf32>,
    kernel    : &[PerAreaf32],
    ds        : f32,
) {
    let nb = projection.len();
    for (i, o) in out.iter_mut().enumerate() {
        *o = ds * projection.iter().enumerate()
            .map(|(j, p)| p * kernel[nb + i - j])
            .sum::<f32>();
    }
}

pub(crate) fn check_shape(geometry: &SinoGeom, sino: &Array2<Intensityf32>) -> Result<()> {
    if sino.dim() != geometry.dim() {
        return Err(Error::DimensionMismatch { what: "sinogram", expected: geometry.dim(), actual: sino.dim() })
    }
    Ok(())
}
