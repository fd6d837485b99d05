#![warn(missing_docs)]

//! # `meander`
//!
//! Finds a path for a lawn mower that visits every free cell of a rectangular lawn exactly once, stepping only
//! between orthogonally adjacent cells and never onto an obstacle.
//! Build a lawn with [`LawnBuilder`] (by hand or from a text map), hand it to a [`Solver`], then either call
//! [`solve()`](Solver::solve) or drive it with [`step()`](Solver::step) to watch it work.
//! The result is a [`Solution`]: the cells in visiting order plus the equivalent [`Instructions`], a string of
//! `W`, `A`, `S` and `D` moves.
//!
//! # Internals
//! Two engines share the [`Solver`] front, chosen by the number of obstacles on the lawn.
//!
//! With at most one obstacle, the path is built from rectangular strokes. A stroke covers a rectangle either in a
//! straight line or as a boustrophedon, back and forth across one axis while creeping along the other, and the
//! parity of the number of passes fixes which corner it leaves from. Candidate strokes from a cell only end where
//! something stops them: a wall, an obstacle, or a rectangle already mowed. The search is a tree in which every node
//! commits one stroke; it grows one level per step, largest strokes first, and throws away any branch from which a
//! flood fill shows that the unmowed cells can no longer all be reached. Branches are also dropped when the unmowed
//! cells are unevenly split between the two colours of a checkerboard, since a path alternates between them, or
//! when they hold more dead ends than a single path has room for.
//! Mowed rectangles are kept as a persistent stack, so siblings share everything beneath their own stroke.
//!
//! With more obstacles, the engine starts from the closed loop around the outer boundary of the free cells and
//! grows it two cells at a time: an edge of the loop is pushed sideways onto two unvisited free cells, which keeps
//! the loop closed. A fold that would leave a free cell without any unvisited neighbor is refused on the spot, and
//! when no fold remains the engine backs out of the last one and marks it as tried. A loop always covers an even
//! number of cells, so lawns with an odd number of free cells are rejected before searching.

pub use builder::{LawnBuilder, LawnInvalidReason};
pub use config::{PruningPolicy, SearchConfig};
pub use lawn::Lawn;
pub use lawn_set::LawnSet;
pub use location::{Dimension, Location};
pub use path::{InstructionError, Instructions};
pub use solver::{Solution, Solver, SolverFailure, SolverStats, StepOutcome, StrategyKind};
pub use step::SquareStep;

pub mod builder;
pub mod config;
pub(crate) mod fold;
pub(crate) mod generator;
pub mod lawn;
pub mod lawn_set;
pub(crate) mod location;
pub(crate) mod occupied;
pub mod path;
pub(crate) mod reach;
pub mod rect;
pub(crate) mod search;
pub(crate) mod solver;
pub(crate) mod step;
pub(crate) mod stroke;
#[cfg(feature = "wasm")]
pub mod wasm;
