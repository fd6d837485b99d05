use crate::location::{Coord, Location};
use crate::step::SquareStep;

/// An axis-aligned rectangle of cells, inclusive on all four sides.
///
/// Obstacles are stored as 1x1 rectangles so that strokes and obstacles share one intersection test.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Rect {
    left: Coord,
    right: Coord,
    top: Coord,
    bottom: Coord,
}

impl Rect {
    /// Construct from inclusive bounds. The bounds are reordered if given backwards.
    pub fn new(left: Coord, right: Coord, top: Coord, bottom: Coord) -> Self {
        Self {
            left: left.min(right),
            right: left.max(right),
            top: top.min(bottom),
            bottom: top.max(bottom),
        }
    }

    /// The smallest rectangle containing both corners.
    pub fn spanning(a: Location, b: Location) -> Self {
        Self::new(a.0, b.0, a.1, b.1)
    }

    /// A single cell.
    pub fn cell(location: Location) -> Self {
        Self::spanning(location, location)
    }

    /// Leftmost column, inclusive.
    pub fn left(&self) -> Coord {
        self.left
    }

    /// Rightmost column, inclusive.
    pub fn right(&self) -> Coord {
        self.right
    }

    /// Topmost row, inclusive.
    pub fn top(&self) -> Coord {
        self.top
    }

    /// Bottom row, inclusive.
    pub fn bottom(&self) -> Coord {
        self.bottom
    }

    /// Columns spanned.
    pub fn width(&self) -> usize {
        self.right - self.left + 1
    }

    /// Rows spanned.
    pub fn height(&self) -> usize {
        self.bottom - self.top + 1
    }

    /// Cells covered.
    pub fn area(&self) -> usize {
        self.width() * self.height()
    }

    /// Number of cells along the axis of `direction`.
    pub fn extent(&self, direction: SquareStep) -> usize {
        if direction.is_horizontal() { self.width() } else { self.height() }
    }

    /// The coordinate of the side faced when moving in `direction`; an x value for horizontal steps, y otherwise.
    pub fn side(&self, direction: SquareStep) -> Coord {
        match direction {
            SquareStep::Up => self.top,
            SquareStep::Down => self.bottom,
            SquareStep::Left => self.left,
            SquareStep::Right => self.right,
        }
    }

    /// Whether `location` is one of the cells.
    pub fn contains(&self, location: Location) -> bool {
        (self.left..=self.right).contains(&location.0) && (self.top..=self.bottom).contains(&location.1)
    }

    /// True if the two rectangles share at least one cell.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left <= other.right
            && self.right >= other.left
            && self.top <= other.bottom
            && self.bottom >= other.top
    }
}
