use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};

use log::{debug, info};

use crate::config::SearchConfig;
use crate::fold::LoopFolder;
use crate::lawn::Lawn;
use crate::location::Location;
use crate::path::Instructions;
use crate::reach::{colour_counts, free_mask, free_regions};
use crate::search::StrokeSearch;

/// Reasons a [`Solver`] may fail.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SolverFailure {
    /// Every cell is an obstacle.
    NoFreeCells,
    /// The free cells fall into more than one region, so no single path visits them all.
    Disconnected,
    /// A closed loop was required but the number of free cells is odd.
    OddCycle,
    /// Colouring the lawn like a checkerboard leaves one colour with too many free cells. A path alternates colours,
    /// so it needs the two counts within one of each other.
    Unbalanced,
    /// The boundary of the free cells is not a simple loop to start folding from.
    NoPerimeter,
    /// Every possibility was tried and none covers the lawn.
    Exhausted,
    /// [`SearchConfig::step_limit`] was reached first.
    StepLimit,
}

impl Display for SolverFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::NoFreeCells => "the lawn has no free cells",
            Self::Disconnected => "the free cells are not connected",
            Self::OddCycle => "a closed loop cannot cover an odd number of cells",
            Self::Unbalanced => "the free cells are unevenly split between checkerboard colours",
            Self::NoPerimeter => "the free cells have no simple boundary loop",
            Self::Exhausted => "no covering path exists from the tried starts",
            Self::StepLimit => "the step limit was reached",
        })
    }
}

impl std::error::Error for SolverFailure {}

/// Result of a single [`Solver::step`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum StepOutcome {
    /// More steps are needed.
    Searching,
    /// A covering path is ready; see [`Solver::solution`].
    Solved,
    /// The search is over without a path.
    Exhausted(SolverFailure),
}

/// A resumable search for a path over every free cell of a lawn.
pub(crate) trait CoverageEngine {
    /// Do one unit of work.
    fn step(&mut self, lawn: &Lawn) -> StepOutcome;
    /// Drop all progress.
    fn reset(&mut self);
    /// The covering path, once solved.
    fn path(&self) -> Option<Vec<Location>>;
    /// Amount of live search state, for progress reports.
    fn frontier(&self) -> usize;
}

/// Which engine a [`Solver`] runs.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum StrategyKind {
    /// Backtracking over rectangle strokes, for lawns with at most one obstacle.
    RectangleSearch,
    /// Folding a closed loop outward from the perimeter, for everything else.
    LoopFold,
}

impl StrategyKind {
    /// Pick by obstacle count.
    pub fn for_lawn(lawn: &Lawn) -> Self {
        if lawn.obstacles().len() < 2 {
            Self::RectangleSearch
        } else {
            Self::LoopFold
        }
    }
}

enum Strategy {
    RectangleSearch(StrokeSearch),
    LoopFold(LoopFolder),
}

impl Strategy {
    fn engine(&self) -> &dyn CoverageEngine {
        match self {
            Self::RectangleSearch(search) => search,
            Self::LoopFold(folder) => folder,
        }
    }

    fn engine_mut(&mut self) -> &mut dyn CoverageEngine {
        match self {
            Self::RectangleSearch(search) => search,
            Self::LoopFold(folder) => folder,
        }
    }

    fn kind(&self) -> StrategyKind {
        match self {
            Self::RectangleSearch(_) => StrategyKind::RectangleSearch,
            Self::LoopFold(_) => StrategyKind::LoopFold,
        }
    }
}

/// A path visiting every free cell exactly once, and the moves that walk it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Solution {
    path: Vec<Location>,
    instructions: Instructions,
}

impl Solution {
    fn new(path: Vec<Location>) -> Self {
        let instructions = Instructions::from_path(&path);
        Self { path, instructions }
    }

    /// Cells in visiting order.
    pub fn path(&self) -> &[Location] {
        &self.path
    }

    /// Moves from the first cell to the last.
    pub fn instructions(&self) -> &Instructions {
        &self.instructions
    }

    /// Whether the last cell is next to the first, so the path could be walked again as a loop.
    pub fn is_cycle(&self) -> bool {
        match (self.path.first(), self.path.last()) {
            (Some(first), Some(last)) => self.path.len() == 1 || first.is_adjacent(*last),
            _ => false,
        }
    }
}

/// Progress counters for a [`Solver`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SolverStats {
    /// Engine in use.
    pub strategy: StrategyKind,
    /// Steps taken since construction or the last reset.
    pub steps: usize,
    /// Live search nodes, or revisions on the loop stack.
    pub frontier: usize,
    /// Wall time of the last [`Solver::solve`].
    pub elapsed: Option<Duration>,
}

/// Finds a path over every free cell of a [`Lawn`].
///
/// Lawns with fewer than two obstacles are searched stroke by stroke; others are covered by folding a loop. Either
/// way the work is split into steps: call [`Self::step`] repeatedly to drive it incrementally, or [`Self::solve`] to
/// run it to the end.
pub struct Solver {
    lawn: Lawn,
    config: SearchConfig,
    strategy: Strategy,
    steps: usize,
    elapsed: Option<Duration>,
    outcome: Option<StepOutcome>,
    solution: Option<Solution>,
}

impl Solver {
    /// A solver with [`SearchConfig::default`].
    pub fn new(lawn: Lawn) -> Self {
        Self::with_config(lawn, SearchConfig::default())
    }

    /// A solver for `lawn`, choosing its engine by obstacle count.
    pub fn with_config(lawn: Lawn, config: SearchConfig) -> Self {
        let strategy = match StrategyKind::for_lawn(&lawn) {
            StrategyKind::RectangleSearch => Strategy::RectangleSearch(StrokeSearch::new(config, None)),
            StrategyKind::LoopFold => Strategy::LoopFold(LoopFolder::new()),
        };

        Self {
            lawn,
            config,
            strategy,
            steps: 0,
            elapsed: None,
            outcome: None,
            solution: None,
        }
    }

    /// Start the rectangle search from `starts` instead of [`Lawn::start_positions`].
    /// Has no effect on lawns covered by loop folding.
    pub fn with_start_positions(mut self, starts: Vec<Location>) -> Self {
        if let Strategy::RectangleSearch(_) = self.strategy {
            self.strategy = Strategy::RectangleSearch(StrokeSearch::new(self.config, Some(starts)));
            self.reset();
        }
        self
    }

    /// The lawn being covered.
    pub fn lawn(&self) -> &Lawn {
        &self.lawn
    }

    /// The configuration in use.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// The engine chosen for this lawn.
    pub fn strategy(&self) -> StrategyKind {
        self.strategy.kind()
    }

    fn needs_cycle(&self) -> bool {
        match self.strategy {
            Strategy::RectangleSearch(_) => self.config.use_cycle,
            Strategy::LoopFold(_) => true,
        }
    }

    /// Cheap checks that rule a lawn out before any searching.
    fn precheck(&self) -> Option<SolverFailure> {
        let free = self.lawn.free_count();
        if free == 0 {
            return Some(SolverFailure::NoFreeCells);
        }
        if self.config.precheck_connectivity && free_regions(&self.lawn) > 1 {
            return Some(SolverFailure::Disconnected);
        }
        if self.needs_cycle() && free > 1 && free % 2 == 1 {
            return Some(SolverFailure::OddCycle);
        }

        // an even count has an even imbalance, which covers loops too
        let [even, odd] = colour_counts(&free_mask(&self.lawn));
        if even.abs_diff(odd) > 1 {
            return Some(SolverFailure::Unbalanced);
        }

        None
    }

    fn finish(&mut self, outcome: StepOutcome) -> StepOutcome {
        self.outcome = Some(outcome);
        outcome
    }

    /// Advance the search by one step. Once finished, keeps returning the final outcome until [`Self::reset`].
    pub fn step(&mut self) -> StepOutcome {
        if let Some(outcome) = self.outcome {
            return outcome;
        }

        if self.steps == 0 {
            debug!("{:?} on a {}x{} lawn with {} free cells", self.strategy(), self.lawn.width(), self.lawn.height(), self.lawn.free_count());
            if let Some(failure) = self.precheck() {
                debug!("rejected before searching: {}", failure);
                return self.finish(StepOutcome::Exhausted(failure));
            }
        }

        self.steps += 1;
        match self.strategy.engine_mut().step(&self.lawn) {
            StepOutcome::Searching => StepOutcome::Searching,
            StepOutcome::Solved => match self.strategy.engine().path() {
                Some(path) => {
                    self.solution = Some(Solution::new(path));
                    self.finish(StepOutcome::Solved)
                }
                None => self.finish(StepOutcome::Exhausted(SolverFailure::Exhausted)),
            },
            exhausted => self.finish(exhausted),
        }
    }

    /// Step until finished or [`SearchConfig::step_limit`] is reached.
    pub fn solve(&mut self) -> Result<Solution, SolverFailure> {
        let started = Instant::now();
        let outcome = loop {
            match self.step() {
                StepOutcome::Searching => {
                    if self.config.step_limit.is_some_and(|limit| self.steps >= limit) {
                        break self.finish(StepOutcome::Exhausted(SolverFailure::StepLimit));
                    }
                }
                finished => break finished,
            }
        };
        let elapsed = started.elapsed();
        self.elapsed = Some(elapsed);
        info!("{:?} after {} steps in {:?}", outcome, self.steps, elapsed);

        match (outcome, &self.solution) {
            (StepOutcome::Solved, Some(solution)) => Ok(solution.clone()),
            (StepOutcome::Exhausted(failure), _) => Err(failure),
            _ => Err(SolverFailure::Exhausted),
        }
    }

    /// Forget all progress, keeping the lawn and configuration.
    pub fn reset(&mut self) {
        self.strategy.engine_mut().reset();
        self.steps = 0;
        self.elapsed = None;
        self.outcome = None;
        self.solution = None;
    }

    /// Whether [`Self::step`] would return the same final outcome again.
    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// The final outcome, once finished.
    pub fn step_outcome(&self) -> Option<StepOutcome> {
        self.outcome
    }

    /// The covering path, once solved.
    pub fn solution(&self) -> Option<&Solution> {
        self.solution.as_ref()
    }

    /// Steps taken since construction or the last reset.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Wall time of the last [`Self::solve`].
    pub fn elapsed(&self) -> Option<Duration> {
        self.elapsed
    }

    /// A snapshot of the progress counters.
    pub fn stats(&self) -> SolverStats {
        SolverStats {
            strategy: self.strategy(),
            steps: self.steps,
            frontier: self.strategy.engine().frontier(),
            elapsed: self.elapsed,
        }
    }
}
