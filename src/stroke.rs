use std::cell::OnceCell;

use crate::location::Location;
use crate::rect::Rect;
use crate::step::SquareStep;

/// How a stroke sweeps its rectangle.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Sweep {
    /// A single cell; the stroke ends where it starts.
    Point,
    /// A straight line run to the far side of the rectangle.
    Straight(SquareStep),
    /// Boustrophedon: run along `primary`, advance one cell along `secondary`, run back, and so on.
    Meander { primary: SquareStep, secondary: SquareStep },
}

/// A rectangle annotated with a start corner and a sweep, covering every cell of the rectangle exactly once.
#[derive(Clone, Debug)]
pub struct Stroke {
    rect: Rect,
    start: Location,
    sweep: Sweep,
    exit: Location,
    cells: OnceCell<Vec<Location>>,
}

impl Stroke {
    /// Build a stroke and derive its exit cell.
    ///
    /// `start` must be a corner of `rect` for a [`Sweep::Meander`], and an end of the line for a [`Sweep::Straight`].
    pub fn new(rect: Rect, start: Location, sweep: Sweep) -> Self {
        let exit = match sweep {
            Sweep::Point => start,
            Sweep::Straight(direction) => with_axis(start, direction, rect.side(direction)),
            Sweep::Meander { primary, secondary } => {
                // an odd number of passes leaves the mower on the far side of the primary axis
                let passes = rect.extent(secondary);
                let along = if passes % 2 == 1 { rect.side(primary) } else { axis(start, primary) };
                with_axis(with_axis(start, primary, along), secondary, rect.side(secondary))
            }
        };

        Self {
            rect,
            start,
            sweep,
            exit,
            cells: OnceCell::new(),
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn area(&self) -> usize {
        self.rect.area()
    }

    pub fn start(&self) -> Location {
        self.start
    }

    pub fn sweep(&self) -> Sweep {
        self.sweep
    }

    /// Where the stroke ends.
    pub fn exit(&self) -> Location {
        self.exit
    }

    /// The ordered cells from [`start`](Self::start) to [`exit`](Self::exit), generated on first use.
    ///
    /// # Panics
    /// Panics if the sweep does not visit exactly `area` cells or does not end at the exit cell, which means the
    /// stroke geometry is inconsistent.
    pub fn cells(&self) -> &[Location] {
        self.cells.get_or_init(|| {
            let (primary, secondary, run, passes) = match self.sweep {
                Sweep::Point => (None, None, 1, 1),
                Sweep::Straight(direction) => (Some(direction), None, self.rect.extent(direction), 1),
                Sweep::Meander { primary, secondary } => {
                    (Some(primary), Some(secondary), self.rect.extent(primary), self.rect.extent(secondary))
                }
            };

            let mut cells = Vec::with_capacity(self.area());
            let mut at = self.start;
            for pass in 0..passes {
                cells.push(at);
                if let Some(primary) = primary {
                    let direction = if pass % 2 == 0 { primary } else { primary.invert() };
                    for _ in 1..run {
                        at = at.step(direction);
                        cells.push(at);
                    }
                }
                if let Some(secondary) = secondary.filter(|_| pass + 1 < passes) {
                    at = at.step(secondary);
                }
            }

            assert_eq!(cells.len(), self.area(), "stroke {:?} swept the wrong number of cells", self);
            assert_eq!(cells.last(), Some(&self.exit), "stroke {:?} ended away from its exit", self);
            cells
        })
    }
}

fn axis(location: Location, direction: SquareStep) -> usize {
    if direction.is_horizontal() { location.0 } else { location.1 }
}

fn with_axis(location: Location, direction: SquareStep, value: usize) -> Location {
    if direction.is_horizontal() {
        Location(value, location.1)
    } else {
        Location(location.0, value)
    }
}
