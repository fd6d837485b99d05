use std::collections::HashSet;

use ndarray::Array2;
use petgraph::graphmap::UnGraphMap;
use petgraph::visit::Bfs;

use crate::lawn::Lawn;
use crate::location::Location;
use crate::occupied::Occupied;
use crate::step::SquareStep;

/// Cells still open for mowing: true where neither an obstacle nor a committed stroke covers the cell.
pub(crate) fn open_mask(lawn: &Lawn, occupied: &Occupied) -> Array2<bool> {
    let mut open = free_mask(lawn);
    for rect in occupied.iter() {
        for y in rect.top()..=rect.bottom() {
            for x in rect.left()..=rect.right() {
                if let Some(cell) = open.get_mut((y, x)) {
                    *cell = false;
                }
            }
        }
    }

    open
}

/// Cells free of obstacles.
pub(crate) fn free_mask(lawn: &Lawn) -> Array2<bool> {
    lawn.blocked.map(|blocked| !blocked)
}

/// Undirected graph of open cells, connected to their open neighbors below and to the right.
pub(crate) fn open_graph(open: &Array2<bool>) -> UnGraphMap<Location, ()> {
    let (rows, cols) = open.dim();
    let mut graph = UnGraphMap::with_capacity(
        open.len(),
        // "horizontal" edges
        rows * cols.saturating_sub(1)
            // "vertical" edges
            + cols * rows.saturating_sub(1),
    );

    for (index, _) in open.indexed_iter().filter(|(_, open)| **open) {
        let location = Location::from(index);
        graph.add_node(location);

        for neighbor in [SquareStep::Down.attempt_from(location), SquareStep::Right.attempt_from(location)] {
            if open.get(neighbor.as_index()).is_some_and(|open| *open) {
                graph.add_edge(location, neighbor, ());
            }
        }
    }

    graph
}

/// Number of open cells reachable from `start` through open cells, including `start` itself.
/// Zero if `start` is not open.
pub(crate) fn reachable_area(open: &Array2<bool>, start: Location) -> usize {
    let graph = open_graph(open);
    if !graph.contains_node(start) {
        return 0;
    }

    let mut bfs = Bfs::new(&graph, start);
    let mut count = 0;
    while bfs.next(&graph).is_some() {
        count += 1;
    }

    count
}

/// Open cells of each checkerboard colour. The colour of `Location(x, y)` is `(x + y) % 2`.
pub(crate) fn colour_counts(open: &Array2<bool>) -> [usize; 2] {
    let mut counts = [0; 2];
    for (index, _) in open.indexed_iter().filter(|(_, open)| **open) {
        let location = Location::from(index);
        counts[colour(location)] += 1;
    }

    counts
}

fn colour(location: Location) -> usize {
    (location.0 + location.1) % 2
}

/// Cheap necessary conditions for one path, entered next to `exit`, to cover every open cell.
///
/// A path alternates colours, so the colour it starts on holds as many open cells as the other or one more. Every
/// cell of the path except its two ends has two open neighbors, and only the first cell can sit next to `exit`.
pub(crate) fn can_finish_from(open: &Array2<bool>, exit: Location) -> bool {
    let is_open = |location: Location| open.get(location.as_index()).is_some_and(|open| *open);

    // every neighbor of exit has the opposite colour to exit
    let start_colour = 1 - colour(exit);
    let counts = colour_counts(open);
    let (same, other) = (counts[start_colour], counts[1 - start_colour]);
    if same != other && same != other + 1 {
        return false;
    }

    let mut ends = 0;
    let mut far_ends = 0;
    for (index, _) in open.indexed_iter().filter(|(_, open)| **open) {
        let location = Location::from(index);
        if location.neighbors().filter(|neighbor| is_open(*neighbor)).count() <= 1 {
            ends += 1;
            if !location.is_adjacent(exit) {
                far_ends += 1;
            }
        }
    }

    ends <= 2 && far_ends <= 1
}

/// Number of separate regions the free cells of `lawn` fall into.
pub(crate) fn free_regions(lawn: &Lawn) -> usize {
    let graph = open_graph(&free_mask(lawn));
    let mut seen = HashSet::with_capacity(graph.node_count());
    let mut regions = 0;

    for node in graph.nodes() {
        if seen.contains(&node) {
            continue;
        }

        regions += 1;
        let mut bfs = Bfs::new(&graph, node);
        while let Some(reached) = bfs.next(&graph) {
            seen.insert(reached);
        }
    }

    regions
}
