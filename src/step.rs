use strum::VariantArray;

use crate::location::Location;

/// One unit move on the lawn.
///
/// Each direction has a fixed instruction symbol: `W` up, `A` left, `S` down and `D` right.
#[derive(Copy, Clone, VariantArray, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub enum SquareStep {
    /// Towards row 0.
    Up,
    /// Towards the last row.
    Down,
    /// Towards column 0.
    Left,
    /// Towards the last column.
    Right,
}

impl SquareStep {
    pub(crate) const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// Attempt the step from `location` and return the resultant [`Location`].
    /// No bounds checking takes place.
    pub fn attempt_from(&self, location: Location) -> Location {
        location.offset_by(self.offset())
    }

    /// The `(dx, dy)` unit vector of this step.
    pub fn offset(&self) -> (isize, isize) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// Invert the direction specified by `self`.
    pub fn invert(&self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Rotate a quarter turn counterclockwise.
    pub fn turn_left(&self) -> Self {
        match self {
            Self::Up => Self::Left,
            Self::Left => Self::Down,
            Self::Down => Self::Right,
            Self::Right => Self::Up,
        }
    }

    /// Rotate a quarter turn clockwise.
    pub fn turn_right(&self) -> Self {
        self.turn_left().invert()
    }

    /// True for [`Left`](Self::Left) and [`Right`](Self::Right).
    pub fn is_horizontal(&self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    /// The two directions at right angles to `self`.
    pub fn perpendicular(&self) -> [Self; 2] {
        if self.is_horizontal() {
            [Self::Up, Self::Down]
        } else {
            [Self::Left, Self::Right]
        }
    }

    /// The instruction symbol for this step.
    pub fn symbol(&self) -> char {
        match self {
            Self::Up => 'W',
            Self::Left => 'A',
            Self::Down => 'S',
            Self::Right => 'D',
        }
    }

    /// Inverse of [`Self::symbol`].
    pub fn from_symbol(symbol: char) -> Option<Self> {
        Self::VARIANTS.iter().copied().find(|dir| dir.symbol() == symbol)
    }

    /// Determine the direction from `a` to `b`.
    /// Returns [`None`] unless the two locations are orthogonally adjacent.
    pub fn direction_to(a: Location, b: Location) -> Option<Self> {
        Self::VARIANTS.iter().copied().find(|dir| dir.attempt_from(a) == b)
    }
}

#[cfg(test)]
mod tests {
    use strum::VariantArray;

    use super::SquareStep;
    use crate::location::Location;

    #[test]
    fn turns_compose() {
        for dir in SquareStep::VARIANTS {
            assert_eq!(dir.turn_left().turn_right(), *dir);
            assert_eq!(dir.turn_left().turn_left(), dir.invert());
            assert!(!dir.perpendicular().contains(dir));
        }
    }

    #[test]
    fn symbols_round_trip() {
        assert_eq!(SquareStep::from_symbol('W'), Some(SquareStep::Up));
        assert_eq!(SquareStep::from_symbol('D'), Some(SquareStep::Right));
        assert_eq!(SquareStep::from_symbol('x'), None);
    }

    #[test]
    fn direction_between_neighbors() {
        assert_eq!(SquareStep::direction_to(Location(1, 1), Location(1, 0)), Some(SquareStep::Up));
        assert_eq!(SquareStep::direction_to(Location(1, 1), Location(2, 2)), None);
        // stepping off the top edge never lands back on the lawn
        assert_eq!(SquareStep::direction_to(Location(0, 0), Location(0, 1)), Some(SquareStep::Down));
        assert!(SquareStep::Up.attempt_from(Location(0, 0)).1 > 1_000_000);
    }
}
