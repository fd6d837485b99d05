use std::path::PathBuf;
use std::sync::Once;

use anyhow::{anyhow, Context};
use clap::Parser;
use meander::{LawnSet, SearchConfig};

struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        eprintln!("[{}] {}", record.level(), record.args());
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;
static INIT: Once = Once::new();

fn init_logger(level: log::LevelFilter) {
    INIT.call_once(|| {
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(level);
    });
}

/// Find a mowing path for every lawn in a file and print one instruction string per lawn.
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// File with a lawn count followed by that many lawn maps
    input: PathBuf,
    /// `key = value` search settings
    #[arg(long)]
    config: Option<PathBuf>,
    /// Require the path to end next to where it started
    #[arg(long)]
    cycle: bool,
}

fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SearchConfig::parse(
            &std::fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?,
        ),
        None => SearchConfig::default(),
    };
    config.use_cycle |= args.cycle;
    init_logger(config.log_level);

    let text = std::fs::read_to_string(&args.input).with_context(|| format!("reading lawns from {}", args.input.display()))?;
    let lawns = LawnSet::parse(&text).map_err(|reasons| {
        anyhow!("invalid input {}: {}", args.input.display(), reasons.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "))
    })?;
    log::info!("{} lawns from {}", lawns.len(), args.input.display());

    for (index, result) in lawns.solve_all(config).into_iter().enumerate() {
        match result {
            Ok(solution) => println!("{}", solution.instructions()),
            Err(failure) => {
                log::warn!("lawn {}: {}", index, failure);
                println!();
            }
        }
    }

    Ok(())
}
