use std::collections::HashSet;

use log::{debug, trace};
use unordered_pair::UnorderedPair;

use crate::lawn::Lawn;
use crate::location::Location;
use crate::solver::{CoverageEngine, SolverFailure, StepOutcome};
use crate::step::SquareStep;

/// Pushing the loop edge `edge` one cell towards `toward`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) struct FoldPoint {
    edge: UnorderedPair<Location>,
    toward: SquareStep,
}

/// A fold that can be applied to the current loop.
struct Fold {
    // the edge runs from cells[index] to cells[index + 1], wrapping
    index: usize,
    point: FoldPoint,
    added: [Location; 2],
}

/// One closed loop on the revision stack.
struct Revision {
    cells: Vec<Location>,
    members: HashSet<Location>,
    // folds tried from this revision that led nowhere
    forbidden: HashSet<FoldPoint>,
    // the fold that produced this revision from the one below
    fold: Option<FoldPoint>,
}

impl Revision {
    fn new(cells: Vec<Location>, fold: Option<FoldPoint>) -> Self {
        Self {
            members: cells.iter().copied().collect(),
            cells,
            forbidden: HashSet::new(),
            fold,
        }
    }

    fn is_spare(&self, lawn: &Lawn, location: Location) -> bool {
        lawn.is_free(location) && !self.members.contains(&location)
    }

    /// The first fold, in loop order, that is neither forbidden nor blocked.
    fn next_fold(&self, lawn: &Lawn) -> Option<Fold> {
        let len = self.cells.len();
        if len < 2 {
            return None;
        }

        for index in 0..len {
            let (a, b) = (self.cells[index], self.cells[(index + 1) % len]);
            let Some(along) = SquareStep::direction_to(a, b) else {
                continue;
            };

            for toward in along.perpendicular() {
                let point = FoldPoint { edge: UnorderedPair::from((a, b)), toward };
                if self.forbidden.contains(&point) {
                    continue;
                }

                let added = [a.step(toward), b.step(toward)];
                if added.iter().all(|cell| self.is_spare(lawn, *cell)) {
                    return Some(Fold { index, point, added });
                }
            }
        }

        None
    }

    /// Splice the fold in, or [`None`] if it would leave a free cell with no way to be reached later.
    fn folded(&self, lawn: &Lawn, fold: &Fold) -> Option<Revision> {
        let mut cells = Vec::with_capacity(self.cells.len() + 2);
        cells.extend_from_slice(&self.cells[..=fold.index]);
        cells.extend(fold.added);
        cells.extend_from_slice(&self.cells[fold.index + 1..]);

        let revision = Revision::new(cells, Some(fold.point));
        let strands = fold.added
            .iter()
            .flat_map(|cell| cell.neighbors())
            .filter(|neighbor| revision.is_spare(lawn, *neighbor))
            .any(|neighbor| !neighbor.neighbors().any(|next| revision.is_spare(lawn, next)));

        (!strands).then_some(revision)
    }
}

/// Trace the outer boundary of the free region containing the first free cell, clockwise, keeping a hand on the
/// wall.
///
/// Returns [`None`] when the boundary pinches through a cell twice and so is not a simple loop.
pub(crate) fn perimeter(lawn: &Lawn) -> Option<Vec<Location>> {
    let start = lawn.free_cells().next()?;
    let mut cells = vec![start];
    let mut seen = HashSet::from([start]);
    let mut at = start;
    let mut heading = SquareStep::Right;

    for _ in 0..4 * lawn.width() * lawn.height() + 4 {
        let Some(next_heading) = [heading.turn_left(), heading, heading.turn_right(), heading.invert()]
            .into_iter()
            .find(|direction| lawn.is_free(at.step(*direction)))
        else {
            // a lone cell
            return Some(cells);
        };

        let next = at.step(next_heading);
        if next == start {
            return Some(cells);
        }
        if !seen.insert(next) {
            return None;
        }

        cells.push(next);
        at = next;
        heading = next_heading;
    }

    None
}

/// Grows a closed loop from the lawn's perimeter by repeatedly folding one of its edges outwards onto two unvisited
/// free cells, backtracking through a stack of revisions when no fold is possible.
///
/// Every revision is a closed loop, so a finished search always yields a cycle.
#[derive(Default)]
pub(crate) struct LoopFolder {
    revisions: Vec<Revision>,
    status: Option<StepOutcome>,
}

impl LoopFolder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn finish(&mut self, outcome: StepOutcome) -> StepOutcome {
        self.status = Some(outcome);
        outcome
    }

    fn push(&mut self, lawn: &Lawn, revision: Revision) -> StepOutcome {
        let covered = revision.cells.len();
        self.revisions.push(revision);

        if covered == lawn.free_count() {
            debug!("loop covers all {} free cells after {} folds", covered, self.revisions.len() - 1);
            self.finish(StepOutcome::Solved)
        } else {
            StepOutcome::Searching
        }
    }

    /// The current loop, if any revision is live.
    pub(crate) fn current(&self) -> Option<&[Location]> {
        self.revisions.last().map(|revision| revision.cells.as_slice())
    }
}

impl CoverageEngine for LoopFolder {
    fn step(&mut self, lawn: &Lawn) -> StepOutcome {
        if let Some(status) = self.status {
            return status;
        }

        let Some(top) = self.revisions.last_mut() else {
            return match perimeter(lawn) {
                Some(cells) => {
                    debug!("perimeter loop of {} cells", cells.len());
                    self.push(lawn, Revision::new(cells, None))
                }
                None => {
                    debug!("free cells have no simple perimeter");
                    self.finish(StepOutcome::Exhausted(SolverFailure::NoPerimeter))
                }
            };
        };

        match top.next_fold(lawn) {
            Some(fold) => match top.folded(lawn, &fold) {
                Some(revision) => {
                    trace!("folded {:?} towards {:?}", fold.added, fold.point.toward);
                    self.push(lawn, revision)
                }
                None => {
                    trace!("fold towards {:?} at {} strands a cell", fold.point.toward, fold.index);
                    top.forbidden.insert(fold.point);
                    StepOutcome::Searching
                }
            },
            None => {
                let failed = self.revisions.pop().and_then(|revision| revision.fold);
                match (self.revisions.last_mut(), failed) {
                    (Some(parent), Some(point)) => {
                        trace!("backtracking to a loop of {} cells", parent.cells.len());
                        parent.forbidden.insert(point);
                        StepOutcome::Searching
                    }
                    _ => {
                        debug!("every fold from the perimeter was exhausted");
                        self.finish(StepOutcome::Exhausted(SolverFailure::Exhausted))
                    }
                }
            }
        }
    }

    fn reset(&mut self) {
        self.revisions.clear();
        self.status = None;
    }

    fn path(&self) -> Option<Vec<Location>> {
        match self.status {
            Some(StepOutcome::Solved) => self.current().map(<[Location]>::to_vec),
            _ => None,
        }
    }

    fn frontier(&self) -> usize {
        self.revisions.len()
    }
}

impl LoopFolder {
    /// Every cell of the current loop is adjacent to the next one, wrapping around.
    #[cfg(test)]
    fn is_closed(&self) -> bool {
        use itertools::Itertools;

        self.current().is_some_and(|cells| {
            cells.len() == 1
                || cells.iter().circular_tuple_windows().all(|(a, b): (&Location, &Location)| a.is_adjacent(*b))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use unordered_pair::UnorderedPair;

    use super::{perimeter, FoldPoint, LoopFolder};
    use crate::builder::LawnBuilder;
    use crate::location::Location;
    use crate::solver::{CoverageEngine, SolverFailure, StepOutcome};
    use crate::step::SquareStep;

    fn run(folder: &mut LoopFolder, map: &str) -> (StepOutcome, usize) {
        let lawn = LawnBuilder::from_map(map).unwrap();
        let mut steps = 1;
        let mut outcome = folder.step(&lawn);
        while outcome == StepOutcome::Searching {
            assert!(folder.is_closed());
            steps += 1;
            assert!(steps < 10_000);
            outcome = folder.step(&lawn);
        }
        (outcome, steps)
    }

    #[test]
    fn traces_outer_boundary() {
        let lawn = LawnBuilder::from_map("4 3\n....\n.XX.\n....\n").unwrap();
        let cells = perimeter(&lawn).unwrap();
        assert_eq!(cells.len(), 10);
        assert_eq!(&cells[..5], &[Location(0, 0), Location(1, 0), Location(2, 0), Location(3, 0), Location(3, 1)]);

        // interior obstacles leave the boundary alone
        let lawn = LawnBuilder::from_map("6 5\n......\n.X....\n......\n....X.\n......\n").unwrap();
        assert_eq!(perimeter(&lawn).unwrap().len(), 18);

        // notches in the wall are followed into
        let lawn = LawnBuilder::from_map("5 4\n..X..\n.....\n..X..\n.....\n").unwrap();
        assert_eq!(perimeter(&lawn).unwrap().len(), 16);
    }

    #[test]
    fn pinched_boundary_is_rejected() {
        let lawn = LawnBuilder::from_map("3 3\n.X.\n...\n.X.\n").unwrap();
        assert_eq!(perimeter(&lawn), None);
    }

    #[test]
    fn perimeter_alone_can_cover() {
        let mut folder = LoopFolder::new();
        let (outcome, steps) = run(&mut folder, "4 3\n....\n.XX.\n....\n");
        assert_eq!(outcome, StepOutcome::Solved);
        assert_eq!(steps, 1);
        assert_eq!(folder.path().unwrap().len(), 10);
    }

    #[test]
    fn folds_into_interior() {
        let mut folder = LoopFolder::new();
        let (outcome, steps) = run(&mut folder, "4 4\n....\n.XX.\n....\n....\n");
        assert_eq!(outcome, StepOutcome::Solved);
        assert!(steps >= 2);
        assert!(folder.is_closed());
        let path = folder.path().unwrap();
        assert_eq!(path.len(), 14);
        assert!(path.iter().all(|cell| !matches!(cell, Location(1, 1) | Location(2, 1))));

        folder.reset();
        assert_eq!(folder.frontier(), 0);
        assert_eq!(folder.path(), None);
    }

    #[test]
    fn exhausted_without_folds() {
        // the two interior cells are not adjacent, so nothing can be folded onto them
        let mut folder = LoopFolder::new();
        let (outcome, steps) = run(&mut folder, "4 4\n....\n.X..\n..X.\n....\n");
        assert_eq!(outcome, StepOutcome::Exhausted(SolverFailure::Exhausted));
        assert_eq!(steps, 2);
        assert_eq!(folder.path(), None);
    }

    #[test]
    fn stranding_folds_are_forbidden() {
        // either fold onto the three interior cells cuts the third one off
        let lawn = LawnBuilder::from_map("4 4\n....\n....\n..X.\n....\n").unwrap();
        let mut folder = LoopFolder::new();
        assert_eq!(folder.step(&lawn), StepOutcome::Searching);
        assert_eq!(folder.current().map(<[Location]>::len), Some(12));

        let from_top = FoldPoint { edge: UnorderedPair::from((Location(1, 0), Location(2, 0))), toward: SquareStep::Down };
        assert_eq!(folder.step(&lawn), StepOutcome::Searching);
        assert_eq!(folder.frontier(), 1);
        assert_eq!(folder.revisions[0].forbidden, HashSet::from([from_top]));

        let from_left = FoldPoint { edge: UnorderedPair::from((Location(0, 2), Location(0, 1))), toward: SquareStep::Right };
        assert_eq!(folder.step(&lawn), StepOutcome::Searching);
        assert_eq!(folder.revisions[0].forbidden, HashSet::from([from_top, from_left]));

        assert_eq!(folder.step(&lawn), StepOutcome::Exhausted(SolverFailure::Exhausted));
    }

    #[test]
    fn dead_end_loops_are_popped() {
        // five interior cells in a row: any first fold leaves three, and every fold onto those strands one
        let lawn = LawnBuilder::from_map("7 3\n.......\n.......\n.......\n").unwrap();
        let mut folder = LoopFolder::new();
        assert_eq!(folder.step(&lawn), StepOutcome::Searching);
        assert_eq!(folder.step(&lawn), StepOutcome::Searching);
        assert_eq!(folder.frontier(), 2);
        assert!(folder.is_closed());

        let fold = folder.revisions[1].fold.unwrap();
        assert_eq!(fold, FoldPoint { edge: UnorderedPair::from((Location(1, 0), Location(2, 0))), toward: SquareStep::Down });

        let mut steps = 0;
        while folder.frontier() == 2 {
            assert_eq!(folder.step(&lawn), StepOutcome::Searching);
            steps += 1;
        }
        // four stranding folds, then the pop
        assert_eq!(steps, 5);
        assert_eq!(folder.frontier(), 1);
        assert!(folder.revisions[0].forbidden.contains(&fold));

        let mut outcome = StepOutcome::Searching;
        while outcome == StepOutcome::Searching {
            outcome = folder.step(&lawn);
            steps += 1;
            assert!(steps < 1_000);
        }
        assert_eq!(outcome, StepOutcome::Exhausted(SolverFailure::Exhausted));
        assert_eq!(folder.path(), None);
    }
}
