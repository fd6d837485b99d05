use std::cmp::Reverse;
use std::collections::BTreeSet;

use itertools::Itertools;

use crate::lawn::Lawn;
use crate::location::Location;
use crate::occupied::Occupied;
use crate::rect::Rect;
use crate::step::SquareStep;
use crate::stroke::{Stroke, Sweep};

/// Enumerate every stroke that may begin at `start` without overlapping anything in `occupied`, largest first.
///
/// Strokes only end on coordinates where something stops them: the walls, the start itself, and the cells on and
/// beside every obstacle inside the free span around `start`.
pub(crate) fn strokes_from(lawn: &Lawn, occupied: &Occupied, start: Location) -> Vec<Stroke> {
    let bound = free_span(lawn, occupied, start);

    // whatever stands inside the span bounds the strokes drawn in it
    let obstacles = occupied.iter()
        .filter(|rect| rect.intersects(&bound) || is_nearest_wall(rect, &bound, start))
        .collect_vec();

    let mut edge_x = BTreeSet::from([start.0, bound.left(), bound.right()]);
    let mut edge_y = BTreeSet::from([start.1, bound.top(), bound.bottom()]);
    for obstacle in obstacles {
        edge_x.extend(beside(obstacle.left(), obstacle.right(), lawn.width()));
        edge_y.extend(beside(obstacle.top(), obstacle.bottom(), lawn.height()));
    }

    let mut strokes = Vec::new();
    for (x, y) in edge_x.iter().cartesian_product(edge_y.iter()) {
        let target = Location(*x, *y);
        let rect = Rect::spanning(start, target);
        if occupied.intersects(&rect) {
            continue;
        }

        let horizontal = direction_along(start.0, target.0, SquareStep::Left, SquareStep::Right);
        let vertical = direction_along(start.1, target.1, SquareStep::Up, SquareStep::Down);

        match (horizontal, vertical) {
            (Some(horizontal), Some(vertical)) => {
                let across = Stroke::new(rect, start, Sweep::Meander { primary: horizontal, secondary: vertical });
                let down = Stroke::new(rect, start, Sweep::Meander { primary: vertical, secondary: horizontal });
                // same cells, same exit: the second order adds nothing to the search
                let distinct = across.exit() != down.exit();
                strokes.push(across);
                if distinct {
                    strokes.push(down);
                }
            }
            (Some(direction), None) | (None, Some(direction)) => {
                strokes.push(Stroke::new(rect, start, Sweep::Straight(direction)))
            }
            (None, None) => strokes.push(Stroke::new(rect, start, Sweep::Point)),
        }
    }

    sort_largest_first(&mut strokes);
    strokes
}

/// Stable, so equal areas keep their generation order.
pub(crate) fn sort_largest_first(strokes: &mut [Stroke]) {
    strokes.sort_by_key(|stroke| Reverse(stroke.area()));
}

/// The rectangle bounded by the nearest occupied rectangle in each cardinal direction along `start`'s row and
/// column, or by the walls where nothing is in the way.
fn free_span(lawn: &Lawn, occupied: &Occupied, start: Location) -> Rect {
    let on_row = occupied.iter().filter(|rect| (rect.top()..=rect.bottom()).contains(&start.1)).collect_vec();
    let on_column = occupied.iter().filter(|rect| (rect.left()..=rect.right()).contains(&start.0)).collect_vec();

    let min_x = on_row.iter().filter(|rect| rect.right() < start.0).map(|rect| rect.right() + 1).max().unwrap_or(0);
    let max_x = on_row.iter()
        .filter(|rect| rect.left() > start.0)
        .map(|rect| rect.left() - 1)
        .min()
        .unwrap_or(lawn.width() - 1);
    let min_y = on_column.iter().filter(|rect| rect.bottom() < start.1).map(|rect| rect.bottom() + 1).max().unwrap_or(0);
    let max_y = on_column.iter()
        .filter(|rect| rect.top() > start.1)
        .map(|rect| rect.top() - 1)
        .min()
        .unwrap_or(lawn.height() - 1);

    Rect::new(min_x, max_x, min_y, max_y)
}

// the rectangles that produced the span's sides sit just outside it
fn is_nearest_wall(rect: &Rect, bound: &Rect, start: Location) -> bool {
    let on_row = (rect.top()..=rect.bottom()).contains(&start.1);
    let on_column = (rect.left()..=rect.right()).contains(&start.0);

    (on_row && (rect.right() + 1 == bound.left() || rect.left() == bound.right() + 1))
        || (on_column && (rect.bottom() + 1 == bound.top() || rect.top() == bound.bottom() + 1))
}

/// Both sides of `low..=high` and the cells just outside them, clipped to `0..limit`.
fn beside(low: usize, high: usize, limit: usize) -> impl Iterator<Item = usize> {
    [low.checked_sub(1), Some(low), Some(high), Some(high + 1)]
        .into_iter()
        .flatten()
        .filter(move |coord| *coord < limit)
}

fn direction_along(from: usize, to: usize, decreasing: SquareStep, increasing: SquareStep) -> Option<SquareStep> {
    match from.cmp(&to) {
        std::cmp::Ordering::Less => Some(increasing),
        std::cmp::Ordering::Equal => None,
        std::cmp::Ordering::Greater => Some(decreasing),
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZero;

    use super::strokes_from;
    use crate::builder::LawnBuilder;
    use crate::location::Location;
    use crate::occupied::Occupied;
    use crate::rect::Rect;
    use crate::stroke::Sweep;

    #[test]
    fn open_lawn_offers_whole_lawn_first() {
        let lawn = LawnBuilder::with_dims((NonZero::new(3).unwrap(), NonZero::new(3).unwrap())).build().unwrap();
        let strokes = strokes_from(&lawn, &Occupied::from_lawn(&lawn), Location(0, 0));

        assert_eq!(strokes[0].area(), 9);
        // both sweep orders of the 3x3 end in the same corner, so only one is kept
        assert_eq!(strokes.iter().filter(|stroke| stroke.area() == 9).count(), 1);
        assert!(strokes.iter().any(|stroke| stroke.sweep() == Sweep::Point));
        assert!(strokes.windows(2).all(|pair| pair[0].area() >= pair[1].area()));
    }

    #[test]
    fn strokes_avoid_obstacles() {
        let lawn = LawnBuilder::with_dims((NonZero::new(3).unwrap(), NonZero::new(3).unwrap()))
            .add_obstacle(Location(1, 1))
            .build()
            .unwrap();
        let occupied = Occupied::from_lawn(&lawn);
        let strokes = strokes_from(&lawn, &occupied, Location(0, 0));

        assert!(!strokes.is_empty());
        for stroke in &strokes {
            assert!(!occupied.intersects(&stroke.rect()));
            assert_eq!(stroke.cells().len(), stroke.area());
        }
        assert_eq!(strokes[0].area(), 3);
    }

    #[test]
    fn strokes_stop_at_swept_rows() {
        let lawn = LawnBuilder::with_dims((NonZero::new(3).unwrap(), NonZero::new(3).unwrap()))
            .add_obstacle(Location(1, 1))
            .build()
            .unwrap();
        let occupied = Occupied::from_lawn(&lawn).with(Rect::new(0, 2, 0, 0));
        let strokes = strokes_from(&lawn, &occupied, Location(2, 1));

        assert_eq!(strokes[0].rect(), Rect::new(2, 2, 1, 2));
        assert_eq!(strokes[0].exit(), Location(2, 2));
        assert_eq!(strokes.len(), 2);
    }
}
