//! Points and vectors in the 2D plane of a tomographic slice, with `uom`
//! lengths as coordinates.

mod point;
mod vector;

pub use point::Point;
pub use vector::Vector;
