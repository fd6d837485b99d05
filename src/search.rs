use std::mem;

use itertools::Itertools;
use log::{debug, trace};

use crate::config::SearchConfig;
use crate::generator::{sort_largest_first, strokes_from};
use crate::lawn::Lawn;
use crate::location::Location;
use crate::occupied::Occupied;
use crate::reach::{can_finish_from, open_mask, reachable_area};
use crate::solver::{CoverageEngine, SolverFailure, StepOutcome};
use crate::stroke::Stroke;

/// Index of a node in the [`StrokeSearch`] arena.
pub(crate) type NodeId = usize;

enum Progress {
    Alive,
    Dead,
    Finished,
}

/// One node of the search tree: the stroke taken to get here and everything it leaves behind.
struct SearchNode {
    // none for the root
    stroke: Option<Stroke>,
    occupied: Occupied,
    covered: usize,
    depth: usize,
    // start cell of the first stroke on the way here
    origin: Option<Location>,
    // cells the next stroke may start from; strokes are generated on expansion
    next_starts: Vec<Location>,
    children: Vec<NodeId>,
    expanded: bool,
    finished: bool,
    // the child leading to full coverage, once found
    success: Option<NodeId>,
}

impl SearchNode {
    fn root(lawn: &Lawn, occupied: Occupied, next_starts: Vec<Location>) -> Self {
        debug_assert_eq!(occupied.len(), lawn.obstacles().len());
        Self {
            stroke: None,
            occupied,
            covered: 0,
            depth: 0,
            origin: None,
            next_starts,
            children: Vec::new(),
            expanded: false,
            finished: false,
            success: None,
        }
    }

    fn child(stroke: Stroke, occupied: Occupied, covered: usize, depth: usize, origin: Location, next_starts: Vec<Location>) -> Self {
        Self {
            stroke: Some(stroke),
            occupied,
            covered,
            depth,
            origin: Some(origin),
            next_starts,
            children: Vec::new(),
            expanded: false,
            finished: false,
            success: None,
        }
    }
}

enum Tentative {
    Finished(SearchNode),
    Live(SearchNode),
    Invalid,
}

/// Backtracking search over sequences of strokes, for lawns with at most one obstacle.
///
/// Each [`step`](CoverageEngine::step) advances the whole live frontier by one level: unexpanded nodes build their
/// children from the strokes starting at their next start cells, expanded nodes recurse into their children. Nodes that can no longer
/// reach full coverage are released from the arena immediately and their slots reused.
pub(crate) struct StrokeSearch {
    config: SearchConfig,
    starts: Option<Vec<Location>>,
    nodes: Vec<Option<SearchNode>>,
    vacant: Vec<NodeId>,
    root: Option<NodeId>,
    status: Option<StepOutcome>,
}

impl StrokeSearch {
    /// `starts` overrides [`Lawn::start_positions`].
    pub(crate) fn new(config: SearchConfig, starts: Option<Vec<Location>>) -> Self {
        Self {
            config,
            starts,
            nodes: Vec::new(),
            vacant: Vec::new(),
            root: None,
            status: None,
        }
    }

    fn node(&self, id: NodeId) -> &SearchNode {
        self.nodes.get(id)
            .and_then(Option::as_ref)
            .unwrap_or_else(|| panic!("search node {} was released while still referenced", id))
    }

    fn node_mut(&mut self, id: NodeId) -> &mut SearchNode {
        self.nodes.get_mut(id)
            .and_then(Option::as_mut)
            .unwrap_or_else(|| panic!("search node {} was released while still referenced", id))
    }

    fn alloc(&mut self, node: SearchNode) -> NodeId {
        match self.vacant.pop() {
            Some(id) => {
                self.nodes[id] = Some(node);
                id
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        }
    }

    /// Free `id` and everything below it.
    fn release(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.get_mut(id).and_then(Option::take) {
            for child in node.children {
                self.release(child);
            }
            self.vacant.push(id);
        }
    }

    fn seed(&mut self, lawn: &Lawn) -> NodeId {
        let occupied = Occupied::from_lawn(lawn);
        let starts = self.starts.clone()
            .unwrap_or_else(|| lawn.start_positions())
            .into_iter()
            .filter(|start| lawn.is_free(*start))
            .collect_vec();

        debug!("seeding stroke search from {} start cells", starts.len());
        let root = self.alloc(SearchNode::root(lawn, occupied, starts));
        self.root = Some(root);
        root
    }

    /// Build the node reached from `parent` by taking `stroke`, or reject it.
    fn tentative(&self, lawn: &Lawn, parent: NodeId, stroke: Stroke) -> Tentative {
        let parent = self.node(parent);
        let free = lawn.free_count();
        let covered = parent.covered + stroke.area();
        let depth = parent.depth + 1;
        let origin = parent.origin.unwrap_or(stroke.start());
        let occupied = parent.occupied.with(stroke.rect());

        if covered == free {
            let closes = !self.config.use_cycle || covered == 1 || stroke.exit().is_adjacent(origin);
            return if closes {
                Tentative::Finished(SearchNode::child(stroke, occupied, covered, depth, origin, Vec::new()))
            } else {
                Tentative::Invalid
            };
        }

        let next_starts = stroke.exit()
            .neighbors()
            .filter(|location| occupied.is_open(lawn, *location))
            .collect_vec();
        let Some(first) = next_starts.first() else {
            return Tentative::Invalid;
        };

        let open = open_mask(lawn, &occupied);
        if !can_finish_from(&open, stroke.exit()) {
            trace!("{:?} swept {:?} leaves cells no single path can finish", stroke.rect(), stroke.sweep());
            return Tentative::Invalid;
        }

        // necessary, not sufficient: everything left must at least be reachable
        if self.config.pruning.applies_at(depth) && covered + reachable_area(&open, *first) < free {
            trace!("pruned {:?} at depth {}", stroke.rect(), depth);
            return Tentative::Invalid;
        }

        Tentative::Live(SearchNode::child(stroke, occupied, covered, depth, origin, next_starts))
    }

    fn expand(&mut self, lawn: &Lawn, id: NodeId) -> Progress {
        let next_starts = mem::take(&mut self.node_mut(id).next_starts);
        self.node_mut(id).expanded = true;

        let occupied = &self.node(id).occupied;
        let mut candidates = next_starts.iter()
            .flat_map(|start| strokes_from(lawn, occupied, *start))
            .collect_vec();
        sort_largest_first(&mut candidates);

        let mut children = Vec::with_capacity(candidates.len());
        for stroke in candidates {
            match self.tentative(lawn, id, stroke) {
                Tentative::Finished(child) => {
                    let child = self.alloc(child);
                    children.push(child);

                    let node = self.node_mut(id);
                    node.children = children;
                    node.success = Some(child);
                    node.finished = true;
                    return Progress::Finished;
                }
                Tentative::Live(child) => children.push(self.alloc(child)),
                Tentative::Invalid => {}
            }
        }

        trace!("node {} at depth {} expanded into {} children", id, self.node(id).depth, children.len());
        let alive = !children.is_empty();
        self.node_mut(id).children = children;
        if alive { Progress::Alive } else { Progress::Dead }
    }

    fn advance(&mut self, lawn: &Lawn, id: NodeId) -> Progress {
        let node = self.node(id);
        if node.finished {
            return Progress::Finished;
        }
        if !node.expanded {
            return self.expand(lawn, id);
        }

        let children = mem::take(&mut self.node_mut(id).children);
        let mut live = Vec::with_capacity(children.len());

        for (index, child) in children.iter().copied().enumerate() {
            match self.advance(lawn, child) {
                Progress::Dead => self.release(child),
                Progress::Alive => live.push(child),
                Progress::Finished => {
                    // siblings stay untouched once one branch succeeds
                    live.push(child);
                    live.extend_from_slice(&children[index + 1..]);

                    let node = self.node_mut(id);
                    node.children = live;
                    node.success = Some(child);
                    node.finished = true;
                    return Progress::Finished;
                }
            }
        }

        let alive = !live.is_empty();
        self.node_mut(id).children = live;
        if alive { Progress::Alive } else { Progress::Dead }
    }

    fn finish(&mut self, outcome: StepOutcome) -> StepOutcome {
        self.status = Some(outcome);
        outcome
    }

    /// The strokes from the root to the finished node, in order.
    pub(crate) fn committed_strokes(&self) -> Vec<&Stroke> {
        let mut strokes = Vec::new();
        let mut at = self.root;
        while let Some(id) = at {
            let node = self.node(id);
            strokes.extend(node.stroke.as_ref());
            at = node.success;
        }

        strokes
    }
}

impl CoverageEngine for StrokeSearch {
    fn step(&mut self, lawn: &Lawn) -> StepOutcome {
        if let Some(status) = self.status {
            return status;
        }

        let root = match self.root {
            Some(root) => root,
            None => self.seed(lawn),
        };

        match self.advance(lawn, root) {
            Progress::Alive => StepOutcome::Searching,
            Progress::Finished => {
                debug!("stroke search finished with {} strokes", self.committed_strokes().len());
                self.finish(StepOutcome::Solved)
            }
            Progress::Dead => {
                debug!("stroke search exhausted every start");
                self.release(root);
                self.finish(StepOutcome::Exhausted(SolverFailure::Exhausted))
            }
        }
    }

    fn reset(&mut self) {
        self.nodes.clear();
        self.vacant.clear();
        self.root = None;
        self.status = None;
    }

    fn path(&self) -> Option<Vec<Location>> {
        if self.status != Some(StepOutcome::Solved) {
            return None;
        }

        Some(self.committed_strokes()
            .into_iter()
            .flat_map(|stroke| stroke.cells().iter().copied())
            .collect())
    }

    fn frontier(&self) -> usize {
        self.nodes.len() - self.vacant.len()
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZero;

    use super::StrokeSearch;
    use crate::builder::LawnBuilder;
    use crate::config::SearchConfig;
    use crate::location::Location;
    use crate::solver::{CoverageEngine, SolverFailure, StepOutcome};

    #[test]
    fn open_square_is_one_stroke() {
        let lawn = LawnBuilder::with_dims((NonZero::new(3).unwrap(), NonZero::new(3).unwrap())).build().unwrap();
        let mut search = StrokeSearch::new(SearchConfig::default(), Some(vec![Location(0, 0)]));

        assert_eq!(search.step(&lawn), StepOutcome::Solved);
        assert_eq!(search.committed_strokes().len(), 1);
        let path = search.path().unwrap();
        assert_eq!(path.len(), 9);
        assert_eq!(path.first(), Some(&Location(0, 0)));
        assert_eq!(path.last(), Some(&Location(2, 2)));
    }

    #[test]
    fn steps_until_solved() {
        let lawn = LawnBuilder::with_dims((NonZero::new(3).unwrap(), NonZero::new(3).unwrap()))
            .add_obstacle(Location(1, 1))
            .build()
            .unwrap();
        let mut search = StrokeSearch::new(SearchConfig::default(), Some(vec![Location(0, 0)]));

        let mut steps = 1;
        while search.step(&lawn) == StepOutcome::Searching {
            steps += 1;
            assert!(search.frontier() > 0);
            assert!(steps < 50);
        }
        // row, column, row, single cell
        assert_eq!(search.step(&lawn), StepOutcome::Solved);
        assert_eq!(search.committed_strokes().len(), 4);
        assert_eq!(steps, 4);
        assert_eq!(search.path().unwrap().len(), 8);

        search.reset();
        assert_eq!(search.frontier(), 0);
        assert_eq!(search.path(), None);
    }

    #[test]
    fn dead_ends_release_their_nodes() {
        // the only start is walled in: one cell, no way onwards
        let lawn = LawnBuilder::from_map("3 1\n.X.\n").unwrap();
        let mut search = StrokeSearch::new(SearchConfig::default(), None);

        assert!(matches!(search.step(&lawn), StepOutcome::Exhausted(_)));
        assert_eq!(search.frontier(), 0);
        assert!(matches!(search.step(&lawn), StepOutcome::Exhausted(_)));
    }

    #[test]
    fn unbalanced_lawn_dies_on_first_level() {
        // 13 cells of one checkerboard colour and 11 of the other
        let lawn = LawnBuilder::from_map("5 5\n.....\nX....\n.....\n.....\n.....\n").unwrap();
        let mut search = StrokeSearch::new(SearchConfig::default(), None);

        assert_eq!(search.step(&lawn), StepOutcome::Exhausted(SolverFailure::Exhausted));
        assert_eq!(search.frontier(), 0);
    }
}
