use log::LevelFilter;

/// When the flood-fill liveness check runs on a freshly built search node.
///
/// The check only discards nodes that cannot possibly reach full coverage, so every policy finds the same answer
/// to "is there a solution"; they differ only in speed.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PruningPolicy {
    /// Never flood fill.
    Never,
    /// Flood fill every node.
    Always,
    /// Flood fill nodes whose path depth is at least this value.
    FromDepth(usize),
}

impl PruningPolicy {
    pub(crate) fn applies_at(&self, depth: usize) -> bool {
        match self {
            Self::Never => false,
            Self::Always => true,
            Self::FromDepth(min) => depth >= *min,
        }
    }
}

/// Tuning knobs for a [`Solver`](crate::Solver).
#[derive(Copy, Clone, Debug)]
pub struct SearchConfig {
    /// Require the rectangle search to end next to where it started.
    pub use_cycle: bool,
    /// When to flood fill new search nodes.
    pub pruning: PruningPolicy,
    /// Refuse lawns whose free cells fall into more than one region before searching at all.
    pub precheck_connectivity: bool,
    /// Give up a synchronous solve after this many steps.
    pub step_limit: Option<usize>,
    /// Used by front ends that install a logger; the library itself only emits through `log`.
    pub log_level: LevelFilter,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            use_cycle: false,
            pruning: PruningPolicy::FromDepth(1),
            precheck_connectivity: true,
            step_limit: None,
            log_level: LevelFilter::Info,
        }
    }
}

impl SearchConfig {
    /// Read `key = value` lines on top of the defaults.
    ///
    /// Blank lines and lines starting with `#` are skipped, keys are case-insensitive, and unknown keys or
    /// unreadable values leave the default in place. Recognized keys: `use_cycle`, `pruning` (`never`, `always`,
    /// or a minimum depth), `precheck_connectivity`, `step_limit` (a count, or `none`), `log_level`.
    pub fn parse(text: &str) -> Self {
        let mut config = Self::default();

        for raw_line in text.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.splitn(2, '=');
            let key = parts.next().unwrap_or("").trim().to_ascii_lowercase();
            let value = parts.next().unwrap_or("").trim();

            match key.as_str() {
                "use_cycle" => config.use_cycle = truthy(value),
                "precheck_connectivity" => config.precheck_connectivity = truthy(value),
                "pruning" => {
                    config.pruning = match value.to_ascii_lowercase().as_str() {
                        "never" | "off" => PruningPolicy::Never,
                        "always" | "on" => PruningPolicy::Always,
                        depth => depth.parse().map(PruningPolicy::FromDepth).unwrap_or(config.pruning),
                    }
                }
                "step_limit" => {
                    config.step_limit = if value.eq_ignore_ascii_case("none") {
                        None
                    } else {
                        value.parse().ok().or(config.step_limit)
                    }
                }
                "log_level" => config.log_level = value.parse().unwrap_or(config.log_level),
                _ => log::debug!("ignoring unknown config key {:?}", key),
            }
        }

        config
    }
}

fn truthy(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "on" | "yes")
}

#[cfg(test)]
mod tests {
    use log::LevelFilter;

    use super::{PruningPolicy, SearchConfig};

    #[test]
    fn defaults() {
        let config = SearchConfig::default();
        assert!(!config.use_cycle);
        assert_eq!(config.pruning, PruningPolicy::FromDepth(1));
        assert!(config.pruning.applies_at(3));
        assert!(!config.pruning.applies_at(0));
        assert!(config.precheck_connectivity);
    }

    #[test]
    fn parse_overrides() {
        let config = SearchConfig::parse("
# mowing options
USE_CYCLE = yes
pruning = 3
step_limit = 500
log_level = debug
precheck_connectivity = off
colour = green
");
        assert!(config.use_cycle);
        assert_eq!(config.pruning, PruningPolicy::FromDepth(3));
        assert_eq!(config.step_limit, Some(500));
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert!(!config.precheck_connectivity);

        let config = SearchConfig::parse("pruning = never\nstep_limit = lots\n");
        assert_eq!(config.pruning, PruningPolicy::Never);
        assert_eq!(config.step_limit, None);
    }
}
