//! Pixel-driven fan-beam backprojection.
//!
//! For each sampled projection angle, every active pixel is mapped onto the
//! detector (see `FanRays`), the sinogram is interpolated linearly between
//! the two neighbouring bins, and the result is accumulated with the fan-beam
//! distance weight.
//!
//! The angles are shared out among `rayon` threads, each of which accumulates
//! into a private image with a private scratch copy of the current projection.
//! The per-thread images are summed at the end, so the order of summation (and
//! hence the least significant bits of the result) may vary between runs.
//! Build with the `serial` feature for a fixed, sequential order.

use std::f32::consts::PI;

use log::debug;
use ndarray::Array2;
#[cfg(not(feature = "serial"))]
use rayon::prelude::*;

use units::radian_;
use units::todo::{Intensityf32, Lengthf32};

use crate::{Error, Result};
use crate::filter::check_shape;
use crate::grid::ImageGrid;
use crate::sino_geom::{Sampling, SinoGeom, FanRays};

/// Backproject `sino` (shape `(nb, na)`) onto `grid`, using every
/// `angle_skip`th projection angle.
///
/// Only pixels which are active in the grid's mask and lie inside the field of
/// view of `geometry` are computed; all others are exactly zero. The result is
/// scaled by `π / (number of angles used)`.
pub fn backproject(
    geometry  : &SinoGeom,
    grid      : &ImageGrid,
    sino      : &Array2<Intensityf32>,
    angle_skip: usize,
) -> Result<Array2<Intensityf32>> {
    let (sampling, fan, detector) = geometry.fan_params("backproject")?;
    if angle_skip == 0 { return Err(Error::invalid("angle_skip", "must be at least 1")) }
    check_shape(geometry, sino)?;

    let job = Job {
        rays  : FanRays::new(sampling, fan, detector),
        pixels: active_pixels(geometry, grid),
        centre: (sampling.nb as f32 + 1.0) / 2.0 + sampling.offset,
        sampling,
        sino,
    };
    let angles: Vec<usize> = (0..sampling.na).step_by(angle_skip).collect();
    debug!("backprojecting {} of {} angles onto {} of {} pixels",
           angles.len(), sampling.na, job.pixels.len(), grid.mask().len());

    // Closure preparing the state needed by `fold`: will be called by
    // `fold` at the start of every job that is launched.
    let initial_thread_state = || FoldState {
        image: grid.zeros(),
        row  : vec![0.0; sampling.nb + 2],
    };

    #[cfg(not(feature = "serial"))]
    let image = {
        // One job per thread: each job allocates a whole image
        let job_size = angles.len().div_ceil(rayon::current_num_threads()).max(1);
        angles
            .par_iter()
            .fold_chunks(job_size, initial_thread_state, |state, &a| job.add_angle(state, a))
            .map(|state| state.image)
            .reduce(|| grid.zeros(), |a, b| a + b)
    };

    #[cfg(feature = "serial")]
    let image = angles
        .iter()
        .fold(initial_thread_state(), |state, &a| job.add_angle(state, a))
        .image;

    Ok(image * (PI / angles.len() as f32))
}

/// Data needed to be passed efficiently between the backprojection of one
/// angle and the next. Needs to work in conjunction with `rayon`'s `fold`s.
struct FoldState {
    image: Array2<Intensityf32>,
    /// Current projection, 1-based, with zeros at index `0` and `nb + 1`
    row: Vec<Intensityf32>,
}

/// An active pixel: its index and centre (mm)
#[derive(Clone, Copy, Debug)]
struct Pixel {
    i: usize,
    j: usize,
    x: Lengthf32,
    y: Lengthf32,
}

/// Read-only data shared by all threads
struct Job<'a> {
    rays    : FanRays,
    pixels  : Vec<Pixel>,
    /// 1-based bin position of the detector centre
    centre  : f32,
    sampling: &'a Sampling,
    sino    : &'a Array2<Intensityf32>,
}

impl Job<'_> {

    fn add_angle(&self, state: FoldState, a: usize) -> FoldState {
        let FoldState { mut image, mut row } = state;
        let nb = self.sampling.nb;
        let zero_slot = nb + 1;

        // Copy this angle's projection into the scratch row
        row[0] = 0.0;
        row[zero_slot] = 0.0;
        for (r, &s) in row[1..=nb].iter_mut().zip(self.sino.column(a)) { *r = s; }

        let (sin_b, cos_b) = radian_(self.sampling.angle(a)).sin_cos();
        for &Pixel { i, j, x, y } in &self.pixels {
            let (bin, weight) = self.rays.bin_and_weight(x, y, sin_b, cos_b);
            let bb = bin + self.centre;
            let left = bb.floor();
            // Out-of-range (and NaN) positions read both taps from the zero slot
            let (l, r, frac) = if left >= 1.0 && left + 1.0 <= nb as f32 {
                let l = left as usize;
                (l, l + 1, bb - left)
            } else {
                (zero_slot, zero_slot, 0.0)
            };
            image[[i, j]] += weight * ((1.0 - frac) * row[l] + frac * row[r]);
        }
        FoldState { image, row }
    }
}

/// Pixels in the grid's mask whose centres lie within the field of view
fn active_pixels(geometry: &SinoGeom, grid: &ImageGrid) -> Vec<Pixel> {
    let rfov = geometry.rfov();
    grid.mask().indexed_iter()
        .filter(|&(_, &active)| active)
        .map(|((i, j), _)| (i, j, grid.pixel_centre([i, j])))
        .filter(|(_, _, centre)| centre.radius() <= rfov)
        .map(|(i, j, centre)| {
            let (x, y) = centre.to_mm();
            Pixel { i, j, x, y }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use float_eq::assert_float_eq;
    use rstest::rstest;
    use units::{mm, mm_};

    fn grid(n: usize, dx: f32) -> ImageGrid { ImageGrid::new((n, n), (mm(dx), mm(dx))).unwrap() }

    fn arc () -> SinoGeom { SinoGeom::fan_arc ().nb(64).na(90).build().unwrap() }
    fn flat() -> SinoGeom { SinoGeom::fan_flat().nb(64).na(90).build().unwrap() }

    /// Deterministic, irregular test data
    fn wiggly(geometry: &SinoGeom, seed: f32) -> Array2<Intensityf32> {
        Array2::from_shape_fn(geometry.dim(), |(b, a)| (seed + 0.37 * b as f32 + 1.3 * a as f32).sin())
    }

    #[rstest(/**/ geometry, case(SinoGeom::par().build().unwrap()), case(SinoGeom::moj().build().unwrap()))]
    fn needs_fan_beam_geometry(geometry: SinoGeom) {
        let err = backproject(&geometry, &grid(8, 1.0), &geometry.ones(), 1).unwrap_err();
        assert!(matches!(err, Error::CapabilityMismatch { quantity: "backproject", .. }));
    }

    #[test]
    fn angle_skip_must_be_positive() {
        let geometry = arc();
        let err = backproject(&geometry, &grid(8, 1.0), &geometry.ones(), 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }

    #[test]
    fn sinogram_shape_must_match_geometry() {
        let geometry = arc();
        let wrong = Array2::ones((geometry.na(), geometry.nb()));
        let err = backproject(&geometry, &grid(8, 1.0), &wrong, 1).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { what: "sinogram", .. }));
    }

    #[rstest(/**/ geometry, case(arc()), case(flat()))]
    fn zeros_backproject_to_zeros(geometry: SinoGeom) {
        let image = backproject(&geometry, &grid(16, 2.0), &geometry.zeros(), 1).unwrap();
        assert_eq!(image.dim(), (16, 16));
        assert!(image.iter().all(|&v| v == 0.0));
    }

    // Every ray through the isocentre hits the middle of the detector with
    // weight (dsd/dso)²
    #[rstest(/**/ geometry, skip,
             case(arc(),  1), case(arc(),  2), case(arc(),  7),
             case(flat(), 1), case(flat(), 3), case(flat(), 89),
    )]
    fn isocentre_of_uniform_backprojection(geometry: SinoGeom, skip: usize) {
        let image = backproject(&geometry, &grid(33, 1.0), &geometry.ones(), skip).unwrap();
        let ratio = mm_(geometry.dsd().unwrap()) / mm_(geometry.dso().unwrap());
        assert_float_eq!(image[[16, 16]], PI * ratio * ratio, r2nd <= 1e-5);
    }

    #[rstest(/**/ geometry, case(arc()), case(flat()))]
    fn masked_pixels_are_exactly_zero(geometry: SinoGeom) {
        let sino = wiggly(&geometry, 0.1);
        let full = backproject(&geometry, &grid(12, 2.0), &sino, 1).unwrap();
        let mask = Array2::from_shape_fn((12, 12), |(i, j)| (i + j) % 3 != 0);
        let masked_grid = grid(12, 2.0).with_mask(mask.clone()).unwrap();
        let masked = backproject(&geometry, &masked_grid, &sino, 1).unwrap();
        for ((ij, &active), (&m, &f)) in mask.indexed_iter().zip(masked.iter().zip(full.iter())) {
            if active { assert_float_eq!(m, f, abs <= 1e-4, "pixel {ij:?}") }
            else      { assert_eq!(m, 0.0, "pixel {ij:?}") }
        }
    }

    #[test]
    fn pixels_outside_field_of_view_are_exactly_zero() {
        let geometry = SinoGeom::fan_arc().nb(16).na(30).build().unwrap();
        let rfov = mm_(geometry.rfov());
        let image = backproject(&geometry, &grid(41, 1.0), &geometry.ones(), 1).unwrap();
        let xs = grid(41, 1.0).xs();
        for ((i, j), &v) in image.indexed_iter() {
            if xs[i].hypot(xs[j]) > rfov { assert_eq!(v, 0.0) }
            else                         { assert!(v > 0.0) }
        }
    }

    #[rstest(/**/ geometry, case(arc()), case(flat()))]
    fn backprojection_is_linear(geometry: SinoGeom) {
        let g = grid(20, 1.5);
        let (s1, s2) = (wiggly(&geometry, 0.0), wiggly(&geometry, 2.0));
        let combined = &s1 * 3.0 - &s2;
        let lhs = backproject(&geometry, &g, &combined, 1).unwrap();
        let rhs = backproject(&geometry, &g, &s1, 1).unwrap() * 3.0
                - backproject(&geometry, &g, &s2, 1).unwrap();
        for (l, r) in lhs.iter().zip(rhs.iter()) {
            assert_float_eq!(l, r, abs <= 1e-3);
        }
    }

    #[test]
    fn detector_offset_shifts_the_projection() {
        // A single hot bin, moved along with the detector offset, yields the
        // same image
        let plain   = SinoGeom::fan_flat().nb(32).na(60).build().unwrap();
        let shifted = SinoGeom::fan_flat().nb(32).na(60).offset(2.0).build().unwrap();
        let mut s_plain   = plain.zeros();
        let mut s_shifted = shifted.zeros();
        s_plain  .row_mut(15).fill(1.0);
        s_shifted.row_mut(17).fill(1.0);
        let g = grid(15, 1.0);
        let a = backproject(&plain  , &g, &s_plain  , 1).unwrap();
        let b = backproject(&shifted, &g, &s_shifted, 1).unwrap();
        let max = a.iter().cloned().fold(0.0, f32::max);
        assert!(max > 0.0);
        for (x, y) in a.iter().zip(b.iter()) {
            assert_float_eq!(x, y, abs <= 1e-4 * max);
        }
    }
}
