use crate::distributed::DistributedGrid;
use crate::error::Error;
use crate::message::Communicator;
use crate::patch::Patch;

/// Grid-spacing weighted discrete L2 norms of the height and momentum error.
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ErrorNorm {
    pub height: f64,
    pub momentum: f64,
}

/// Compute `sqrt(dx * sum (u - u_exact)^2)` for each field, where the sum
/// runs over the whole grid. Sums of squares are reduced across all ranks
/// first; a global sum of exactly zero gives a norm of exactly zero, and
/// every rank returns the same norms.
///
pub fn error_norm<C: Communicator>(
    grid: &DistributedGrid<C>,
    state: &Patch,
    exact: &Patch,
) -> Result<ErrorNorm, Error> {
    assert_eq!(state.index_space(), exact.index_space());

    let mut sums = [0.0; 2];

    for (u, e) in state.iter_data().zip(exact.iter_data()) {
        let dh = u[0] - e[0];
        let dhu = u[1] - e[1];
        sums[0] += dh * dh;
        sums[1] += dhu * dhu;
    }
    let totals = grid.sum_all(&sums)?;
    let dx = grid.grid().spacing();
    let norm = |sum: f64| if sum != 0.0 { (sum * dx).sqrt() } else { 0.0 };

    Ok(ErrorNorm {
        height: norm(totals[0]),
        momentum: norm(totals[1]),
    })
}
