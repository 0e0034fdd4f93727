/// The size and granularity of the image into which sinograms are
/// backprojected, and the mask selecting which of its pixels are computed

use ndarray::Array2;

use geometry::Point;
use units::{Length, mm_};
use units::todo::{Intensityf32, Lengthf32, Ratiof32};

use crate::{Error, Result};

/// 2D index of a pixel: `[ix, iy]`
#[allow(nonstandard_style)]
pub type Index2_u = [usize; 2];

#[derive(Clone, Debug, PartialEq)]
pub struct ImageGrid {
    nx: usize,
    ny: usize,
    dx: Length,
    dy: Length,
    /// Shift of the image centre, in pixels
    offset_x: Ratiof32,
    offset_y: Ratiof32,
    mask: Array2<bool>,
}

impl ImageGrid {

    /// Grid of `nx × ny` pixels of size `dx × dy`, centred on the isocentre,
    /// with every pixel active
    pub fn new((nx, ny): (usize, usize), (dx, dy): (Length, Length)) -> Result<Self> {
        if nx == 0 { return Err(Error::invalid("nx", "must be at least 1")) }
        if ny == 0 { return Err(Error::invalid("ny", "must be at least 1")) }
        for (name, d) in [("dx", dx), ("dy", dy)] {
            let d = mm_(d);
            if !(d.is_finite() && d > 0.0) {
                return Err(Error::invalid(name, format!("must be positive and finite, got {d} mm")))
            }
        }
        let mask = Array2::from_elem((nx, ny), true);
        Ok(Self { nx, ny, dx, dy, offset_x: 0.0, offset_y: 0.0, mask })
    }

    /// Grid of `nx × ny` pixels covering a region of `sx × sy`
    pub fn from_size(n: (usize, usize), (sx, sy): (Length, Length)) -> Result<Self> {
        let (nx, ny) = n;
        Self::new(n, (sx / nx.max(1) as f32, sy / ny.max(1) as f32))
    }

    /// Shift the image centre by the given number of pixels
    pub fn with_offsets(self, offset_x: Ratiof32, offset_y: Ratiof32) -> Result<Self> {
        if !(offset_x.is_finite() && offset_y.is_finite()) {
            return Err(Error::invalid("offset", "pixel offsets must be finite"))
        }
        Ok(Self { offset_x, offset_y, ..self })
    }

    /// Restrict computation to the pixels where `mask` is true
    pub fn with_mask(self, mask: Array2<bool>) -> Result<Self> {
        if mask.dim() != self.dim() {
            return Err(Error::DimensionMismatch { what: "mask", expected: self.dim(), actual: mask.dim() })
        }
        Ok(Self { mask, ..self })
    }

    /// Deactivate pixels whose centres lie further than `radius` from the
    /// isocentre
    pub fn with_circular_mask(mut self, radius: Length) -> Self {
        let r2 = mm_(radius).powi(2);
        let (xs, ys) = (self.xs(), self.ys());
        self.mask.indexed_iter_mut().for_each(|((i, j), active)| {
            *active = *active && xs[i] * xs[i] + ys[j] * ys[j] <= r2;
        });
        self
    }

    pub fn dim(&self) -> (usize, usize) { (self.nx, self.ny) }
    pub fn dx (&self) -> Length { self.dx }
    pub fn dy (&self) -> Length { self.dy }
    pub fn offsets(&self) -> (Ratiof32, Ratiof32) { (self.offset_x, self.offset_y) }
    pub fn mask(&self) -> &Array2<bool> { &self.mask }

    /// x-coordinates (mm) of the pixel centres
    pub fn xs(&self) -> Vec<Lengthf32> { centres(self.nx, mm_(self.dx), self.offset_x) }

    /// y-coordinates (mm) of the pixel centres
    pub fn ys(&self) -> Vec<Lengthf32> { centres(self.ny, mm_(self.dy), self.offset_y) }

    /// Find centre of pixel with given 2D index
    pub fn pixel_centre(&self, [i, j]: Index2_u) -> Point {
        let wx = (self.nx as f32 - 1.0) / 2.0 + self.offset_x;
        let wy = (self.ny as f32 - 1.0) / 2.0 + self.offset_y;
        Point::new(self.dx * (i as f32 - wx),
                   self.dy * (j as f32 - wy))
    }

    /// Image of zeros on this grid
    pub fn zeros(&self) -> Array2<Intensityf32> { Array2::zeros(self.dim()) }
}

fn centres(n: usize, d: Lengthf32, offset: Ratiof32) -> Vec<Lengthf32> {
    let w = (n as f32 - 1.0) / 2.0 + offset;
    (0..n).map(|i| d * (i as f32 - w)).collect()
}
