use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;
use shallows::config::Config;
use shallows::driver;
use shallows::solvers::{BoundaryPolicy, SourceTerms};
use simple_logger::SimpleLogger;

/// Verify a centered-difference shallow water solver against a
/// manufactured solution, over a sweep of grid resolutions.
#[derive(Debug, Parser)]
#[clap(version, author = "J. Zrake <jzrake@clemson.edu>")]
struct Opts {
    /// Comma-separated list of grid resolutions
    #[clap(short = 'n', long, value_delimiter = ',', default_value = "1000")]
    resolutions: Vec<usize>,

    #[clap(long, default_value = "0.001")]
    time_step: f64,

    #[clap(short = 't', long, default_value = "1.0")]
    final_time: f64,

    #[clap(short = 'g', long, default_value = "9.81")]
    gravity: f64,

    /// Number of ranks (threads) to decompose the grid across
    #[clap(short = 'r', long, default_value = "1")]
    ranks: usize,

    #[clap(short = 'o', long, default_value = ".")]
    output_dir: PathBuf,

    /// frozen | manufactured
    #[clap(long, default_value = "frozen")]
    boundary: BoundaryPolicy,

    /// time-derivative | complete
    #[clap(long, default_value = "time-derivative")]
    sources: SourceTerms,

    /// Also write a CBOR checkpoint of each final state
    #[clap(long)]
    checkpoint: bool,

    #[clap(long)]
    pin_cores: bool,

    #[clap(long, default_value = "info")]
    log_level: LevelFilter,
}

impl From<Opts> for Config {
    fn from(opts: Opts) -> Self {
        Self {
            resolutions: opts.resolutions,
            time_step_size: opts.time_step,
            final_time: opts.final_time,
            gravity: opts.gravity,
            num_ranks: opts.ranks,
            pin_cores: opts.pin_cores,
            output_directory: opts.output_dir,
            boundary: opts.boundary,
            sources: opts.sources,
            checkpoint: opts.checkpoint,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let opts = Opts::parse();
    SimpleLogger::new().with_level(opts.log_level).init()?;

    driver::run(&Config::from(opts))?;
    Ok(())
}
