use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::solvers::{BoundaryPolicy, SourceTerms};

/// Run parameters for a resolution sweep. Every field has a default, so a
/// partial configuration deserializes to the defaults for the rest.
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Grid resolutions to run, in order. Each one is a complete run from
    /// `t = 0` to the final time.
    pub resolutions: Vec<usize>,

    /// Fixed time step of the explicit integrator.
    pub time_step_size: f64,

    /// Time at which each run stops and is compared to the exact solution.
    pub final_time: f64,

    /// Gravitational acceleration.
    pub gravity: f64,

    /// Number of ranks the grid is decomposed across.
    pub num_ranks: usize,

    /// Pin rank threads to CPU cores.
    pub pin_cores: bool,

    /// Directory receiving `solution_<nx>.csv` (and checkpoints).
    pub output_directory: PathBuf,

    pub boundary: BoundaryPolicy,

    pub sources: SourceTerms,

    /// Also write `solution_<nx>.cbor` after each run.
    pub checkpoint: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resolutions: vec![1000],
            time_step_size: 0.001,
            final_time: 1.0,
            gravity: 9.81,
            num_ranks: 1,
            pin_cores: false,
            output_directory: PathBuf::from("."),
            boundary: BoundaryPolicy::Frozen,
            sources: SourceTerms::TimeDerivative,
            checkpoint: false,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), Error> {
        let invalid = |msg: String| Err(Error::InvalidConfig(msg));

        if self.resolutions.is_empty() {
            return invalid("no grid resolutions given".into());
        }
        if let Some(nx) = self.resolutions.iter().find(|&&nx| nx < 3) {
            return Err(Error::InvalidGrid(*nx));
        }
        if !(self.time_step_size > 0.0 && self.time_step_size.is_finite()) {
            return invalid(format!("time step must be positive, got {}", self.time_step_size));
        }
        if !(self.final_time >= 0.0 && self.final_time.is_finite()) {
            return invalid(format!("final time must be non-negative, got {}", self.final_time));
        }
        if !(self.gravity > 0.0 && self.gravity.is_finite()) {
            return invalid(format!("gravity must be positive, got {}", self.gravity));
        }
        if self.num_ranks == 0 {
            return invalid("at least one rank is required".into());
        }
        if let Some(nx) = self.resolutions.iter().find(|&&nx| nx < self.num_ranks) {
            return Err(Error::TooManyPartitions {
                num_points: *nx,
                num_ranks: self.num_ranks,
            });
        }
        Ok(())
    }
}
