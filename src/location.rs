use std::num::NonZero;

use ndarray::Ix;

use crate::step::SquareStep;

pub(crate) type Coord = usize;
/// A nonzero grid extent, used for both width and height.
pub type Dimension = NonZero<Coord>;

/// A location `(x, y)` on a lawn. The top left corner is `Location(0, 0)`.
#[derive(Clone, Eq, Hash, Copy, PartialEq, Ord, PartialOrd, Debug)]
pub struct Location(pub Coord, pub Coord);

impl Location {
    pub(crate) fn as_index(&self) -> (Coord, Coord) {
        (self.1, self.0)
    }

    // wraps on underflow; the wrapped value is always out of bounds for any real lawn
    pub(crate) fn offset_by(self, rhs: (isize, isize)) -> Self {
        Self(self.0.wrapping_add_signed(rhs.0), self.1.wrapping_add_signed(rhs.1))
    }

    /// The location one unit step away in `direction`.
    pub fn step(self, direction: SquareStep) -> Self {
        direction.attempt_from(self)
    }

    /// All four orthogonal neighbors, in [`SquareStep::VARIANTS`](strum::VariantArray) order.
    /// Neighbors off the top or left edge wrap around and are never in bounds.
    pub fn neighbors(self) -> impl Iterator<Item = Location> {
        SquareStep::ALL.into_iter().map(move |dir| dir.attempt_from(self))
    }

    /// True if `other` is exactly one unit step away.
    pub fn is_adjacent(&self, other: Location) -> bool {
        self.0.abs_diff(other.0) + self.1.abs_diff(other.1) == 1
    }
}

impl From<(Ix, Ix)> for Location {
    fn from(value: (Ix, Ix)) -> Self {
        Self(value.1, value.0)
    }
}
