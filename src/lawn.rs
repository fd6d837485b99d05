use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use itertools::Itertools;
use ndarray::Array2;

use crate::location::{Dimension, Location};
use crate::rect::Rect;

/// A rectangular lawn with obstacle cells ("trees").
///
/// [`Lawn`]s should be built using a [`LawnBuilder`](crate::builder::LawnBuilder), which guarantees that every
/// obstacle is in bounds and listed once. A lawn is read-only once built.
#[derive(Clone, Debug)]
pub struct Lawn {
    pub(crate) dims: (Dimension, Dimension),
    pub(crate) obstacles: Vec<Location>,
    // row major, true where an obstacle stands
    pub(crate) blocked: Array2<bool>,
}

impl Lawn {
    /// Number of columns.
    pub fn width(&self) -> usize {
        self.dims.0.get()
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.dims.1.get()
    }

    /// Obstacles in the order they were added.
    pub fn obstacles(&self) -> &[Location] {
        &self.obstacles
    }

    /// Number of cells a full-coverage path must visit.
    pub fn free_count(&self) -> usize {
        self.width() * self.height() - self.obstacles.len()
    }

    /// Whether `location` lies on the lawn at all.
    pub fn in_bounds(&self, location: Location) -> bool {
        location.0 < self.width() && location.1 < self.height()
    }

    /// Whether a tree stands at `location`. False off the lawn.
    pub fn is_obstacle(&self, location: Location) -> bool {
        self.blocked.get(location.as_index()).copied().unwrap_or(false)
    }

    /// In bounds and not an obstacle.
    pub fn is_free(&self, location: Location) -> bool {
        self.blocked.get(location.as_index()).is_some_and(|blocked| !blocked)
    }

    /// The whole lawn as a rectangle.
    pub fn bounds(&self) -> Rect {
        Rect::new(0, self.width() - 1, 0, self.height() - 1)
    }

    /// Free cells in row-major order.
    pub fn free_cells(&self) -> impl Iterator<Item = Location> + '_ {
        self.blocked.indexed_iter()
            .filter(|(_, blocked)| !**blocked)
            .map(|(index, _)| Location::from(index))
    }

    /// Derive the cells a stroke search may start from.
    ///
    /// - Without obstacles, the four corners.
    /// - With a single obstacle, the cross product of the interesting columns (both edges and the obstacle's column
    ///   and its neighbors) with the interesting rows, plus the cell squeezed between the obstacle and a wall when
    ///   the obstacle stands one cell away from that wall.
    /// - Otherwise, every free cell touching an obstacle or the lawn edge.
    pub fn start_positions(&self) -> Vec<Location> {
        let max = Location(self.width() - 1, self.height() - 1);

        match self.obstacles.as_slice() {
            [] => [Location(0, 0), Location(max.0, 0), Location(0, max.1), max]
                .into_iter()
                .unique()
                .collect_vec(),
            [tree] => {
                let mut xs = BTreeSet::from([0, max.0, tree.0]);
                let mut ys = BTreeSet::from([0, max.1, tree.1]);
                xs.extend([tree.0.checked_sub(1), Some(tree.0 + 1)].into_iter().flatten().filter(|x| *x <= max.0));
                ys.extend([tree.1.checked_sub(1), Some(tree.1 + 1)].into_iter().flatten().filter(|y| *y <= max.1));

                let mut starts = xs.iter()
                    .cartesian_product(ys.iter())
                    .map(|(x, y)| Location(*x, *y))
                    .filter(|location| location != tree)
                    .collect_vec();

                // squeezed between the tree and a wall
                let squeezed = [
                    (tree.0 == 1).then_some(Location(0, tree.1)),
                    (tree.0 + 2 == self.width()).then_some(Location(max.0, tree.1)),
                    (tree.1 == 1).then_some(Location(tree.0, 0)),
                    (tree.1 + 2 == self.height()).then_some(Location(tree.0, max.1)),
                ];
                for location in squeezed.into_iter().flatten() {
                    if !starts.contains(&location) {
                        starts.push(location);
                    }
                }

                starts
            }
            _ => self.free_cells()
                .filter(|location| location.neighbors().any(|neighbor| !self.is_free(neighbor)))
                .collect_vec(),
        }
    }

    /// Render the lawn with `map` deciding the character of every cell.
    pub(crate) fn render(&self, map: impl Fn(Location, bool) -> char) -> String {
        let mut out = String::with_capacity(self.height() * (self.width() + 1));

        for (y, row) in self.blocked.rows().into_iter().enumerate() {
            for (x, blocked) in row.iter().enumerate() {
                out.push(map(Location(x, y), *blocked));
            }
            out.push('\n');
        }

        out
    }
}

impl Display for Lawn {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render(|_, blocked| if blocked { 'X' } else { '.' }))
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZero;

    use crate::builder::LawnBuilder;
    use crate::location::Location;

    #[test]
    fn corners_without_obstacles() {
        let lawn = LawnBuilder::with_dims((NonZero::new(3).unwrap(), NonZero::new(1).unwrap()))
            .build()
            .unwrap();

        assert_eq!(lawn.start_positions(), vec![Location(0, 0), Location(2, 0)]);
    }

    #[test]
    fn starts_around_single_tree() {
        let lawn = LawnBuilder::with_dims((NonZero::new(3).unwrap(), NonZero::new(3).unwrap()))
            .add_obstacle(Location(1, 1))
            .build()
            .unwrap();

        let starts = lawn.start_positions();
        assert_eq!(starts.len(), 8);
        assert!(!starts.contains(&Location(1, 1)));
    }

    #[test]
    fn starts_touch_walls_or_trees() {
        let lawn = LawnBuilder::with_dims((NonZero::new(5).unwrap(), NonZero::new(5).unwrap()))
            .add_obstacle(Location(1, 1))
            .add_obstacle(Location(3, 3))
            .build()
            .unwrap();

        let starts = lawn.start_positions();
        // 16 edge cells, plus (2,1) (1,2) (2,3) (3,2) next to the trees
        assert_eq!(starts.len(), 20);
        assert!(!starts.contains(&Location(2, 2)));
    }

    #[test]
    fn free_cells_skip_trees() {
        let lawn = LawnBuilder::with_dims((NonZero::new(2).unwrap(), NonZero::new(2).unwrap()))
            .add_obstacle(Location(1, 0))
            .build()
            .unwrap();

        assert_eq!(lawn.free_count(), 3);
        assert_eq!(lawn.free_cells().collect::<Vec<_>>(), vec![Location(0, 0), Location(0, 1), Location(1, 1)]);
        assert!(lawn.is_obstacle(Location(1, 0)));
        assert!(!lawn.is_free(Location(2, 0)));
        assert_eq!(format!("{}", lawn), ".X\n..\n");
    }
}
