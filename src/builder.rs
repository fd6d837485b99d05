use std::fmt::{Display, Formatter};
use std::num::NonZero;

use ndarray::Array2;

use crate::lawn::Lawn;
use crate::location::{Dimension, Location};

/// Reasons a builder may become invalid while building.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LawnInvalidReason {
    /// An obstacle was placed outside the bounds specified by `dims` on the builder.
    FeatureOutOfBounds,
    /// The same cell was marked as an obstacle twice.
    DuplicateObstacle,
    /// A size line was missing, unreadable, or zero.
    BadDimensions,
    /// A map row was missing or shorter than the lawn width. `line` counts from 1 within the input text.
    MalformedMap { line: usize },
}

impl Display for LawnInvalidReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FeatureOutOfBounds => write!(f, "obstacle outside the lawn"),
            Self::DuplicateObstacle => write!(f, "obstacle listed twice"),
            Self::BadDimensions => write!(f, "lawn dimensions missing or not positive"),
            Self::MalformedMap { line } => write!(f, "malformed lawn map at line {}", line),
        }
    }
}

/// A builder for [`Lawn`]s.
///
/// Builders mutate themselves while building but can be [`Clone`]d to save their state at some point.
/// Once invalid, every further mutation is ignored and [`build`](Self::build) reports why.
#[derive(Clone)]
pub struct LawnBuilder {
    // width, height
    dims: (Dimension, Dimension),
    obstacles: Vec<Location>,
    invalid_reasons: Vec<LawnInvalidReason>,
}

impl Default for LawnBuilder {
    fn default() -> Self {
        Self::with_dims((NonZero::new(5).unwrap(), NonZero::new(5).unwrap()))
    }
}

impl LawnBuilder {
    /// Construct a new [`Self`] with the specified dimensions, specified in `(x, y)` order.
    pub fn with_dims(dims: (Dimension, Dimension)) -> Self {
        Self {
            dims,
            obstacles: Default::default(),
            invalid_reasons: Default::default(),
        }
    }

    /// Mark `location` as an obstacle.
    ///
    /// May cause the builder to enter a [`FeatureOutOfBounds`](LawnInvalidReason::FeatureOutOfBounds) or
    /// [`DuplicateObstacle`](LawnInvalidReason::DuplicateObstacle) invalid state.
    /// If the builder is already in an invalid state, this function does nothing.
    pub fn add_obstacle(&mut self, location: Location) -> &mut Self {
        if !self.invalid_reasons.is_empty() {
            return self;
        }

        if location.0 >= self.dims.0.get() || location.1 >= self.dims.1.get() {
            self.invalid_reasons.push(LawnInvalidReason::FeatureOutOfBounds);
            return self;
        }

        if self.obstacles.contains(&location) {
            self.invalid_reasons.push(LawnInvalidReason::DuplicateObstacle);
            return self;
        }

        self.obstacles.push(location);
        self
    }

    /// Remove the most recently added obstacle.
    ///
    /// If the builder is in an invalid state or no obstacles are present, this function does nothing.
    pub fn pop_obstacle(&mut self) -> &mut Self {
        if self.invalid_reasons.is_empty() {
            self.obstacles.pop();
        }

        self
    }

    /// Check the validity of this builder.
    ///
    /// Returns `None` if the builder is valid, `Some(&Vec<LawnInvalidReason>)` otherwise.
    pub fn is_valid(&self) -> Option<&Vec<LawnInvalidReason>> {
        if self.invalid_reasons.is_empty() {
            None
        } else {
            Some(&self.invalid_reasons)
        }
    }

    /// Convert the state of this builder into a [`Lawn`].
    pub fn build(&self) -> Result<Lawn, Vec<LawnInvalidReason>> {
        if !self.invalid_reasons.is_empty() {
            return Err(self.invalid_reasons.clone());
        }

        let mut blocked = Array2::from_elem((self.dims.1.get(), self.dims.0.get()), false);
        for obstacle in &self.obstacles {
            blocked[obstacle.as_index()] = true;
        }

        Ok(Lawn {
            dims: self.dims,
            obstacles: self.obstacles.clone(),
            blocked,
        })
    }

    /// Parse a single lawn map: a `width height` line followed by `height` rows where `X` marks an obstacle.
    pub fn from_map(text: &str) -> Result<Lawn, Vec<LawnInvalidReason>> {
        let mut lines = text.lines().enumerate().map(|(index, line)| (index + 1, line));
        Self::read_map(&mut lines)?.build()
    }

    /// Read one map from `lines` of `(line number, text)`, consuming exactly the size line and its rows.
    pub(crate) fn read_map<'a>(
        lines: &mut impl Iterator<Item = (usize, &'a str)>,
    ) -> Result<Self, Vec<LawnInvalidReason>> {
        let (mut line_number, size_line) = lines.next().ok_or_else(|| vec![LawnInvalidReason::BadDimensions])?;
        let dims = parse_dims(size_line).ok_or_else(|| vec![LawnInvalidReason::BadDimensions])?;

        let mut builder = Self::with_dims(dims);
        for y in 0..dims.1.get() {
            let (next_number, row) = lines.next()
                .ok_or(vec![LawnInvalidReason::MalformedMap { line: line_number + 1 }])?;
            line_number = next_number;
            let row = row.trim_end();
            if row.chars().count() < dims.0.get() {
                return Err(vec![LawnInvalidReason::MalformedMap { line: line_number }]);
            }

            for (x, _) in row.chars().take(dims.0.get()).enumerate().filter(|(_, c)| *c == 'X') {
                builder.add_obstacle(Location(x, y));
            }
        }

        match builder.is_valid() {
            None => Ok(builder),
            Some(reasons) => Err(reasons.clone()),
        }
    }
}

fn parse_dims(line: &str) -> Option<(Dimension, Dimension)> {
    let mut parts = line.split_whitespace().map(|part| part.parse::<usize>().ok().and_then(NonZero::new));
    Some((parts.next()??, parts.next()??))
}
