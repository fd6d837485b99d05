use std::collections::HashSet;
use std::fmt::{Display, Formatter};

use itertools::{Itertools, MinMaxResult};

use crate::lawn::Lawn;
use crate::location::Location;
use crate::step::SquareStep;

/// Reasons an instruction string may be rejected.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InstructionError {
    /// A character other than `W`, `A`, `S` or `D`.
    UnknownSymbol(char),
    /// The walk enters a cell it already visited on move number `index` (counting from 0).
    SelfCrossing { index: usize },
}

impl Display for InstructionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownSymbol(symbol) => write!(f, "unknown movement instruction {:?}", symbol),
            Self::SelfCrossing { index } => write!(f, "path crosses itself at move {}", index),
        }
    }
}

/// A sequence of unit moves, printed as a string of `W`, `A`, `S` and `D`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Instructions(Vec<SquareStep>);

impl Instructions {
    /// Derive the moves between consecutive cells of `path`.
    ///
    /// # Panics
    /// Panics if two consecutive cells are not orthogonally adjacent; every path produced by a solver is contiguous,
    /// so this indicates broken stroke or loop geometry.
    pub fn from_path(path: &[Location]) -> Self {
        Self(path.iter()
            .tuple_windows()
            .map(|(a, b)| match SquareStep::direction_to(*a, *b) {
                Some(step) => step,
                None => panic!("path jumps from {:?} to {:?}", a, b),
            })
            .collect())
    }

    /// Decode an instruction string. Surrounding whitespace is ignored.
    pub fn parse(text: &str) -> Result<Self, InstructionError> {
        text.trim()
            .chars()
            .map(|symbol| SquareStep::from_symbol(symbol).ok_or(InstructionError::UnknownSymbol(symbol)))
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    /// The moves in order.
    pub fn steps(&self) -> &[SquareStep] {
        &self.0
    }

    /// Number of moves, one less than the number of cells walked.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for a walk that never leaves its first cell.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// How often each move occurs, in `[W, D, S, A]` order.
    pub fn counts(&self) -> [usize; 4] {
        [SquareStep::Up, SquareStep::Right, SquareStep::Down, SquareStep::Left]
            .map(|wanted| self.0.iter().filter(|step| **step == wanted).count())
    }

    /// Positions visited when starting at `(0, 0)`, the start included.
    /// Fails as soon as a position repeats.
    pub fn walk(&self) -> Result<Vec<(isize, isize)>, InstructionError> {
        let mut at = (0, 0);
        let mut visited = Vec::with_capacity(self.0.len() + 1);
        let mut seen = HashSet::with_capacity(self.0.len() + 1);
        visited.push(at);
        seen.insert(at);

        for (index, step) in self.0.iter().enumerate() {
            let (dx, dy) = step.offset();
            at = (at.0 + dx, at.1 + dy);
            if !seen.insert(at) {
                return Err(InstructionError::SelfCrossing { index });
            }
            visited.push(at);
        }

        Ok(visited)
    }

    /// Width and height of the bounding box of [`walk`](Self::walk).
    pub fn bounds(&self) -> Result<(usize, usize), InstructionError> {
        let visited = self.walk()?;
        Ok((span(visited.iter().map(|p| p.0)), span(visited.iter().map(|p| p.1))))
    }

    /// True if the walk, placed so its bounding box matches `lawn`, visits every free cell exactly once and
    /// never an obstacle.
    pub fn covers(&self, lawn: &Lawn) -> bool {
        let Ok(visited) = self.walk() else {
            return false;
        };
        if (span(visited.iter().map(|p| p.0)), span(visited.iter().map(|p| p.1))) != (lawn.width(), lawn.height()) {
            return false;
        }

        let min_x = visited.iter().map(|p| p.0).min().unwrap_or(0);
        let min_y = visited.iter().map(|p| p.1).min().unwrap_or(0);
        visited.len() == lawn.free_count()
            && visited.iter().all(|p| lawn.is_free(Location((p.0 - min_x) as usize, (p.1 - min_y) as usize)))
    }
}

fn span(values: impl Iterator<Item = isize>) -> usize {
    match values.minmax() {
        MinMaxResult::NoElements => 0,
        MinMaxResult::OneElement(_) => 1,
        MinMaxResult::MinMax(min, max) => (max - min) as usize + 1,
    }
}

impl Display for Instructions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.iter().map(SquareStep::symbol).collect::<String>())
    }
}

#[cfg(test)]
mod tests {
    use super::{InstructionError, Instructions};
    use crate::builder::LawnBuilder;
    use crate::location::Location;

    #[test]
    fn moves_from_cells() {
        let path = [Location(0, 0), Location(1, 0), Location(1, 1), Location(0, 1)];
        assert_eq!(Instructions::from_path(&path).to_string(), "DSA");
        assert!(Instructions::from_path(&[Location(3, 3)]).is_empty());
    }

    #[test]
    #[should_panic]
    fn diagonal_jump_is_fatal() {
        Instructions::from_path(&[Location(0, 0), Location(1, 1)]);
    }

    #[test]
    fn counting_and_bounds() {
        let instructions = Instructions::parse("DDSAASDD").unwrap();
        assert_eq!(instructions.counts(), [0, 4, 2, 2]);
        assert_eq!(instructions.bounds(), Ok((3, 3)));
        assert_eq!(instructions.to_string(), "DDSAASDD");

        assert_eq!(Instructions::parse("DDSAAW").unwrap().bounds(), Err(InstructionError::SelfCrossing { index: 5 }));
        assert_eq!(Instructions::parse("DDQ"), Err(InstructionError::UnknownSymbol('Q')));
    }

    #[test]
    fn coverage_check() {
        let lawn = LawnBuilder::from_map("3 3
...
.X.
...
").unwrap();

        assert!(!Instructions::parse("DDSSAAWW").unwrap().covers(&lawn));
        assert!(Instructions::parse("DDSSAAW").unwrap().covers(&lawn));
        // the walk is placed by its bounding box, so it need not start in a corner
        assert!(Instructions::parse("SDDWWAA").unwrap().covers(&lawn));
        // right shape, but runs through the tree
        assert!(!Instructions::parse("DDSAASDD").unwrap().covers(&lawn));
    }
}
