use std::ops::Sub;
use units::{Length, mm, mm_};
use crate::Vector;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: Length,
    pub y: Length,
}

impl Point {
    pub fn new(x: Length, y: Length) -> Self { Self { x, y } }

    /// Point with coordinates given in mm
    pub fn mm(x: f32, y: f32) -> Self { Self::new(mm(x), mm(y)) }

    pub fn origin() -> Self { Self::mm(0.0, 0.0) }

    /// Coordinates in mm, for use in inner loops
    pub fn to_mm(self) -> (f32, f32) { (mm_(self.x), mm_(self.y)) }

    /// Distance from the origin
    pub fn radius(self) -> Length { (self - Self::origin()).magnitude() }
}

impl Sub for Point {
    type Output = Vector;
    fn sub(self, rhs: Self) -> Self::Output {
        Vector { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}
