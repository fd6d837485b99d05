use std::time::Duration;

use log::info;

use crate::builder::{LawnBuilder, LawnInvalidReason};
use crate::config::SearchConfig;
use crate::lawn::Lawn;
use crate::solver::{Solution, Solver, SolverFailure};

/// A batch of lawns read from one input.
#[derive(Clone, Debug, Default)]
pub struct LawnSet {
    lawns: Vec<Lawn>,
}

impl LawnSet {
    /// Parse a count line `N` followed by `N` maps in the format of [`LawnBuilder::from_map`]. Blank lines are
    /// skipped.
    pub fn parse(text: &str) -> Result<Self, Vec<LawnInvalidReason>> {
        let mut lines = text.lines()
            .enumerate()
            .map(|(index, line)| (index + 1, line))
            .filter(|(_, line)| !line.trim().is_empty());

        let (line, count_line) = lines.next().ok_or_else(|| vec![LawnInvalidReason::MalformedMap { line: 1 }])?;
        let count: usize = count_line.trim()
            .parse()
            .map_err(|_| vec![LawnInvalidReason::MalformedMap { line }])?;

        let mut lawns = Vec::with_capacity(count);
        for _ in 0..count {
            lawns.push(LawnBuilder::read_map(&mut lines)?.build()?);
        }

        Ok(Self { lawns })
    }

    /// The lawns in input order.
    pub fn lawns(&self) -> &[Lawn] {
        &self.lawns
    }

    /// Number of lawns.
    pub fn len(&self) -> usize {
        self.lawns.len()
    }

    /// True when the input declared no lawns.
    pub fn is_empty(&self) -> bool {
        self.lawns.is_empty()
    }

    /// Solve every lawn in order with `config`.
    pub fn solve_all(&self, config: SearchConfig) -> Vec<Result<Solution, SolverFailure>> {
        self.lawns.iter()
            .map(|lawn| Solver::with_config(lawn.clone(), config).solve())
            .collect()
    }

    /// Time a full solve of every lawn.
    pub fn benchmark(&self, config: SearchConfig) -> Vec<Result<Duration, SolverFailure>> {
        self.lawns.iter()
            .enumerate()
            .map(|(index, lawn)| {
                let mut solver = Solver::with_config(lawn.clone(), config);
                let result = solver.solve();
                let stats = solver.stats();
                info!("lawn {}: {:?} in {} steps", index, stats.elapsed.unwrap_or_default(), stats.steps);
                result.map(|_| stats.elapsed.unwrap_or_default())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::LawnSet;
    use crate::builder::LawnInvalidReason;
    use crate::config::SearchConfig;

    #[test]
    fn parse_batch() {
        let set = LawnSet::parse("2\n3 2\n...\n.X.\n\n2 2\n..\n..\n").unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.lawns()[0].free_count(), 5);
        assert_eq!(set.lawns()[1].obstacles(), &[]);

        let results = set.solve_all(SearchConfig::default());
        assert!(results.iter().all(Result::is_ok));
        assert_eq!(set.benchmark(SearchConfig::default()).len(), 2);
    }

    #[test]
    fn parse_batch_failures() {
        assert_eq!(LawnSet::parse("two\n").unwrap_err(), vec![LawnInvalidReason::MalformedMap { line: 1 }]);
        // promised two, only one present
        assert_eq!(LawnSet::parse("2\n2 1\n..\n").unwrap_err(), vec![LawnInvalidReason::BadDimensions]);
        assert_eq!(
            LawnSet::parse("1\n2 2\n..\n").unwrap_err(),
            vec![LawnInvalidReason::MalformedMap { line: 4 }],
        );
    }
}
