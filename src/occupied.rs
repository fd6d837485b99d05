use std::rc::Rc;

use crate::lawn::Lawn;
use crate::location::Location;
use crate::rect::Rect;

struct Layer {
    rect: Rect,
    below: Option<Rc<Layer>>,
}

/// Obstacles plus every stroke committed so far, as an immutable stack of rectangles.
///
/// Adding a rectangle yields a new set sharing everything beneath it, so sibling search branches each hold their
/// own snapshot and never observe one another.
#[derive(Clone, Default)]
pub(crate) struct Occupied {
    top: Option<Rc<Layer>>,
    len: usize,
}

impl Occupied {
    /// One 1x1 layer per obstacle.
    pub(crate) fn from_lawn(lawn: &Lawn) -> Self {
        lawn.obstacles()
            .iter()
            .fold(Self::default(), |occupied, tree| occupied.with(Rect::cell(*tree)))
    }

    pub(crate) fn with(&self, rect: Rect) -> Self {
        Self {
            top: Some(Rc::new(Layer { rect, below: self.top.clone() })),
            len: self.len + 1,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Most recent first.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Rect> {
        std::iter::successors(self.top.as_deref(), |layer| layer.below.as_deref()).map(|layer| &layer.rect)
    }

    pub(crate) fn intersects(&self, rect: &Rect) -> bool {
        self.iter().any(|occupied| occupied.intersects(rect))
    }

    pub(crate) fn contains(&self, location: Location) -> bool {
        self.iter().any(|occupied| occupied.contains(location))
    }

    /// In bounds and neither an obstacle nor swept.
    pub(crate) fn is_open(&self, lawn: &Lawn, location: Location) -> bool {
        lawn.in_bounds(location) && !self.contains(location)
    }
}

impl Drop for Occupied {
    // unlink iteratively so a deep stack is not freed by recursion
    fn drop(&mut self) {
        let mut next = self.top.take();
        while let Some(layer) = next {
            match Rc::try_unwrap(layer) {
                Ok(mut layer) => next = layer.below.take(),
                Err(_) => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Occupied;
    use crate::location::Location;
    use crate::rect::Rect;

    #[test]
    fn snapshots_are_independent() {
        let base = Occupied::default().with(Rect::cell(Location(0, 0)));
        let left = base.with(Rect::new(1, 2, 0, 0));
        let right = base.with(Rect::new(0, 0, 1, 3));

        assert_eq!(base.len(), 1);
        assert_eq!(left.len(), 2);
        assert!(left.contains(Location(2, 0)));
        assert!(!right.contains(Location(2, 0)));
        assert!(right.intersects(&Rect::new(0, 5, 2, 2)));
        assert!(!base.intersects(&Rect::new(0, 5, 2, 2)));

        drop(base);
        assert!(left.contains(Location(0, 0)));
    }
}
