use std::fmt;
use std::str::FromStr;

use log::warn;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::distributed::DistributedGrid;
use crate::error::Error;
use crate::grid::Grid;
use crate::hydro::manufactured;
use crate::hydro::swe::{Conserved, ShallowWater};
use crate::message::Communicator;
use crate::patch::Patch;

/// The operator `F(U, t)` of an explicit system `dU/dt = F(U, t)`.
///
pub trait RightHandSide {
    /// Write `F(state, time)` into `derivative`, which covers the same
    /// index space as `state`. Implementations must not keep references to
    /// either patch beyond the call.
    fn evaluate(&mut self, time: f64, state: &Patch, derivative: &mut Patch) -> Result<(), Error>;
}

/// What happens at the first and last grid point.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoundaryPolicy {
    /// `F = (0, 0)`: boundary values never change from their initial values.
    Frozen,
    /// Boundary values follow the manufactured solution's time derivative.
    Manufactured,
}

/// Which source terms are added at interior points.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceTerms {
    /// `(∂h/∂t, ∂(hu)/∂t)` of the manufactured solution.
    TimeDerivative,
    /// The time derivative plus the exact flux divergence, so that the
    /// manufactured solution solves the continuous equations.
    Complete,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Point {
    Boundary,
    Interior,
    Degenerate,
}

/// Centered-difference right hand side for the 1D shallow water equations
/// on a distributed grid. Each evaluation refreshes the ghost points of its
/// local scratch vector from the state before reading any stencil.
///
/// Where a neighbor height is exactly zero the momentum flux is undefined;
/// the momentum derivative at that point is set to zero, a warning is
/// logged, and the event is counted.
///
pub struct ShallowWaterRhs<'g, 'c, C> {
    grid: &'g DistributedGrid<'c, C>,
    physics: ShallowWater,
    boundary: BoundaryPolicy,
    sources: SourceTerms,
    local: Patch,
    degenerate_points: usize,
}

impl<'g, 'c, C: Communicator> ShallowWaterRhs<'g, 'c, C> {
    pub fn new(
        grid: &'g DistributedGrid<'c, C>,
        physics: ShallowWater,
        boundary: BoundaryPolicy,
        sources: SourceTerms,
    ) -> Self {
        Self {
            local: grid.create_local_vector(),
            grid,
            physics,
            boundary,
            sources,
            degenerate_points: 0,
        }
    }

    /// Number of flux guard events on this rank, summed over all
    /// evaluations so far.
    pub fn degenerate_points(&self) -> usize {
        self.degenerate_points
    }
}

impl<'g, 'c, C: Communicator> RightHandSide for ShallowWaterRhs<'g, 'c, C> {
    fn evaluate(&mut self, time: f64, state: &Patch, derivative: &mut Patch) -> Result<(), Error> {
        self.grid.global_to_local(state, &mut self.local)?;

        let stencil = Stencil {
            grid: self.grid.grid(),
            local: &self.local,
            physics: self.physics,
            boundary: self.boundary,
            sources: self.sources,
            time,
        };
        let start = derivative.index_space().start();
        let num_fields = derivative.num_fields();

        let degenerate = derivative
            .as_mut_slice()
            .par_chunks_mut(num_fields)
            .enumerate()
            .map(|(n, f)| stencil.apply(start + n as i64, f))
            .filter(|point| *point == Point::Degenerate)
            .count();

        self.degenerate_points += degenerate;
        Ok(())
    }
}

struct Stencil<'a> {
    grid: &'a Grid,
    local: &'a Patch,
    physics: ShallowWater,
    boundary: BoundaryPolicy,
    sources: SourceTerms,
    time: f64,
}

impl Stencil<'_> {
    fn apply(&self, i: i64, f: &mut [f64]) -> Point {
        let x = self.grid.coordinate(i);
        let t = self.time;

        if self.grid.is_boundary(i) {
            let boundary_value = match self.boundary {
                BoundaryPolicy::Frozen => Conserved(0.0, 0.0),
                BoundaryPolicy::Manufactured => manufactured::time_derivative(x, t),
            };
            boundary_value.write_to_slice(f);
            return Point::Boundary;
        }

        let dx = self.grid.spacing();
        let ul = Conserved::from(self.local.get_slice(i - 1));
        let ur = Conserved::from(self.local.get_slice(i + 1));
        let source = match self.sources {
            SourceTerms::TimeDerivative => manufactured::time_derivative(x, t),
            SourceTerms::Complete => {
                manufactured::time_derivative(x, t)
                    + manufactured::flux_divergence(x, t, &self.physics)
            }
        };

        f[0] = -(ur.momentum() - ul.momentum()) / (2.0 * dx) + source.height();

        match (self.physics.flux_vector(&ul), self.physics.flux_vector(&ur)) {
            (Some(fl), Some(fr)) => {
                f[1] = -(fr.momentum() - fl.momentum()) / (2.0 * dx) + source.momentum();
                Point::Interior
            }
            _ => {
                warn!("Division by zero detected at index {}", i);
                f[1] = 0.0;
                Point::Degenerate
            }
        }
    }
}

// ============================================================================
impl FromStr for BoundaryPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "frozen" => Ok(Self::Frozen),
            "manufactured" => Ok(Self::Manufactured),
            _ => Err(format!("unknown boundary policy '{}' (frozen | manufactured)", s)),
        }
    }
}

impl fmt::Display for BoundaryPolicy {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Frozen => write!(fmt, "frozen"),
            Self::Manufactured => write!(fmt, "manufactured"),
        }
    }
}

impl FromStr for SourceTerms {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "time-derivative" => Ok(Self::TimeDerivative),
            "complete" => Ok(Self::Complete),
            _ => Err(format!("unknown source terms '{}' (time-derivative | complete)", s)),
        }
    }
}

impl fmt::Display for SourceTerms {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TimeDerivative => write!(fmt, "time-derivative"),
            Self::Complete => write!(fmt, "complete"),
        }
    }
}
