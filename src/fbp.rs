//! Filtered backprojection of full-orbit fan-beam sinograms.

use log::info;
use ndarray::Array2;

use units::{deg_, todo::Intensityf32};

use crate::{Error, Result};
use crate::backproject::backproject;
use crate::filter::{fan_weight, filter_sinogram};
use crate::grid::ImageGrid;
use crate::sino_geom::SinoGeom;

/// Reconstruct an image on `grid` from the fan-beam `sino`.
///
/// The sinogram is cosine-weighted, ramp-filtered and backprojected using
/// every angle. Only full 360° orbits are supported: there is no short-scan
/// (Parker) weighting.
pub fn fbp(geometry: &SinoGeom, grid: &ImageGrid, sino: &Array2<Intensityf32>) -> Result<Array2<Intensityf32>> {
    geometry.fan_params("fbp")?;
    let orbit = deg_(geometry.orbit()).abs();
    if (orbit - 360.0).abs() > 1e-3 {
        return Err(Error::invalid("orbit", format!("fbp requires a 360° orbit, got {orbit}°")))
    }
    info!("FBP: {geometry}");
    let weighted = fan_weight(geometry, sino)?;
    let filtered = filter_sinogram(geometry, &weighted)?;
    backproject(geometry, grid, &filtered, 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use units::mm;

    #[test]
    fn short_scans_are_rejected() {
        let geometry = SinoGeom::fan().nb(16).orbit(200.0).build().unwrap();
        let grid = ImageGrid::new((8, 8), (mm(1.0), mm(1.0))).unwrap();
        let err = fbp(&geometry, &grid, &geometry.zeros()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }

    #[test]
    fn clockwise_full_orbit_is_accepted() {
        let geometry = SinoGeom::fan().nb(16).na(24).orbit(-360.0).build().unwrap();
        let grid = ImageGrid::new((8, 8), (mm(1.0), mm(1.0))).unwrap();
        let image = fbp(&geometry, &grid, &geometry.zeros()).unwrap();
        assert!(image.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn parallel_beam_is_not_supported() {
        let geometry = SinoGeom::par().nb(16).orbit(360.0).build().unwrap();
        let grid = ImageGrid::new((8, 8), (mm(1.0), mm(1.0))).unwrap();
        let err = fbp(&geometry, &grid, &geometry.zeros()).unwrap_err();
        assert!(matches!(err, Error::CapabilityMismatch { quantity: "fbp", .. }));
    }
}
