use units::Length;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vector {
    pub x: Length,
    pub y: Length,
}

impl Vector {

    pub fn new(x: Length, y: Length) -> Self { Self { x, y } }

    pub fn magnitude(&self) -> Length {
        let &Self { x, y } = self;
        (x*x + y*y).sqrt()
    }

}
