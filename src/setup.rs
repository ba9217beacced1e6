//! Fill state vectors from the manufactured solution: the initial condition
//! at `t = 0`, and the exact reference state at any later time.

use crate::distributed::DistributedGrid;
use crate::hydro::manufactured;
use crate::message::Communicator;
use crate::patch::Patch;

/// Overwrite every owned point of `state` with the manufactured solution at
/// the given time.
///
pub fn set_state<C: Communicator>(grid: &DistributedGrid<C>, state: &mut Patch, time: f64) {
    assert_eq!(state.index_space(), grid.owned_space());

    for (i, f) in state.index_space().iter().zip(state.iter_data_mut()) {
        manufactured::solution(grid.grid().coordinate(i), time).write_to_slice(f)
    }
}

pub fn initial_condition<C: Communicator>(grid: &DistributedGrid<C>) -> Patch {
    exact_solution(grid, 0.0)
}

pub fn exact_solution<C: Communicator>(grid: &DistributedGrid<C>, time: f64) -> Patch {
    let mut state = grid.create_global_vector();
    set_state(grid, &mut state, time);
    state
}

#[cfg(test)]
mod test {

    use super::*;
    use crate::grid::Grid;
    use crate::hydro::swe::NUM_FIELDS;
    use crate::message::ChannelCommunicator;

    #[test]
    fn exact_state_is_reproducible_bit_for_bit() {
        let comm = ChannelCommunicator::group(1).pop().unwrap();
        let grid = DistributedGrid::new(Grid::new(101).unwrap(), &comm, NUM_FIELDS).unwrap();
        let a = exact_solution(&grid, 0.37);
        let b = exact_solution(&grid, 0.37);
        let bits = |p: &Patch| p.as_slice().iter().map(|x| x.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&a), bits(&b));
    }

    #[test]
    fn initial_condition_is_at_rest_with_a_sine_bump() {
        let comm = ChannelCommunicator::group(1).pop().unwrap();
        let grid = DistributedGrid::new(Grid::new(11).unwrap(), &comm, NUM_FIELDS).unwrap();
        let u = initial_condition(&grid);
        assert_eq!(u.get_slice(0), &[1.0, 0.0]);
        assert!((u.get_slice(5)[0] - 1.1).abs() < 1e-15);
        assert!(u.iter_data().all(|f| f[1] == 0.0));
    }
}
