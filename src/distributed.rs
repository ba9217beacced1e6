use log::debug;

use crate::error::Error;
use crate::grid::Grid;
use crate::index_space::IndexSpace;
use crate::message::{util, Communicator};
use crate::patch::Patch;

/// Number of ghost points on each side of a rank's owned range.
pub const NUM_GUARD: i64 = 1;

/// Message tag for ghost point exchange.
pub const HALO_TAG: u64 = 3;

/// Message tag for gathering a global vector onto the root rank.
pub const GATHER_TAG: u64 = 4;

/// A grid decomposed into contiguous blocks, one per rank of a
/// communicator. Each rank owns the block with the same index as its rank;
/// its _global_ vectors cover only the owned block, and its _local_ vectors
/// additionally cover one ghost point on each side (clipped to the physical
/// domain, so the end ranks have no ghost beyond the boundary).
///
/// Ghost values are only valid after `global_to_local`, which must be called
/// every time the global vector has changed and a stencil needs to read
/// across a block edge.
///
pub struct DistributedGrid<'a, C> {
    grid: Grid,
    comm: &'a C,
    blocks: Vec<IndexSpace>,
    num_fields: usize,
}

impl<'a, C: Communicator> DistributedGrid<'a, C> {
    pub fn new(grid: Grid, comm: &'a C, num_fields: usize) -> Result<Self, Error> {
        let blocks = grid.partition(comm.size())?;
        debug!(
            "rank {} owns {:?} of {} points",
            comm.rank(),
            blocks[comm.rank()].as_range(),
            grid.num_points()
        );
        Ok(Self {
            grid,
            comm,
            blocks,
            num_fields,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn comm(&self) -> &C {
        self.comm
    }

    pub fn num_fields(&self) -> usize {
        self.num_fields
    }

    pub fn owned_space(&self) -> IndexSpace {
        self.blocks[self.comm.rank()].clone()
    }

    pub fn ghosted_space(&self) -> IndexSpace {
        self.owned_space()
            .extend_all(NUM_GUARD)
            .intersect(&self.grid.index_space())
    }

    pub fn create_global_vector(&self) -> Patch {
        Patch::zeros(self.num_fields, self.owned_space())
    }

    pub fn create_local_vector(&self) -> Patch {
        Patch::zeros(self.num_fields, self.ghosted_space())
    }

    /// Fill a ghost-padded local vector from the owned global vector: owned
    /// values are copied, and ghost values are exchanged with the
    /// neighboring ranks. Returns once every ghost point is valid.
    ///
    pub fn global_to_local(&self, global: &Patch, local: &mut Patch) -> Result<(), Error> {
        let rank = self.comm.rank();
        let owned = self.owned_space();

        local.copy_from(global);

        if rank > 0 {
            let edge = IndexSpace::new(owned.start()..owned.start() + NUM_GUARD);
            let bytes = rmp_serde::encode::to_vec(&global.extract(edge))?;
            self.comm.send(rank - 1, HALO_TAG, bytes)?;
        }
        if rank + 1 < self.comm.size() {
            let edge = IndexSpace::new(owned.end() - NUM_GUARD..owned.end());
            let bytes = rmp_serde::encode::to_vec(&global.extract(edge))?;
            self.comm.send(rank + 1, HALO_TAG, bytes)?;
        }
        if rank > 0 {
            self.receive_ghost(rank - 1, local)?;
        }
        if rank + 1 < self.comm.size() {
            self.receive_ghost(rank + 1, local)?;
        }
        Ok(())
    }

    fn receive_ghost(&self, source: usize, local: &mut Patch) -> Result<(), Error> {
        let bytes = self.comm.recv(source, HALO_TAG)?;
        let ghost: Patch = rmp_serde::decode::from_slice(&bytes)?;
        local.copy_from(&ghost);
        Ok(())
    }

    /// Sum each entry of `values` over all ranks. Every rank receives the
    /// same totals.
    ///
    pub fn sum_all(&self, values: &[f64]) -> Result<Vec<f64>, Error> {
        let add = |a: Vec<u8>, b: Vec<u8>| {
            let a = util::bytes_to_f64s(&a);
            let b = util::bytes_to_f64s(&b);
            let sum: Vec<_> = a.iter().zip(&b).map(|(x, y)| x + y).collect();
            util::f64s_to_bytes(&sum)
        };
        let total = self.comm.all_reduce(add, util::f64s_to_bytes(values))?;
        Ok(util::bytes_to_f64s(&total))
    }

    /// Assemble a global vector on the root rank. Rank 0 gets `Some` patch
    /// covering the whole grid; all other ranks get `None`.
    ///
    pub fn gather(&self, global: &Patch) -> Result<Option<Patch>, Error> {
        let rank = self.comm.rank();

        if rank != 0 {
            let bytes = rmp_serde::encode::to_vec(global)?;
            self.comm.send(0, GATHER_TAG, bytes)?;
            return Ok(None);
        }
        let mut full = Patch::zeros(self.num_fields, self.grid.index_space());
        full.copy_from(global);

        for source in 1..self.comm.size() {
            let bytes = self.comm.recv(source, GATHER_TAG)?;
            let piece: Patch = rmp_serde::decode::from_slice(&bytes)?;
            full.copy_from(&piece);
        }
        Ok(Some(full))
    }
}

#[cfg(test)]
mod test {

    use super::DistributedGrid;
    use crate::grid::Grid;
    use crate::index_space::IndexSpace;
    use crate::message::Communicator;
    use crate::patch::Patch;
    use crate::runtime;

    fn ramp(space: IndexSpace) -> Patch {
        Patch::from_slice_function(space, 2, |i, f| {
            f[0] = i as f64;
            f[1] = 10.0 * i as f64;
        })
    }

    #[test]
    fn ghosted_space_is_clipped_at_the_domain_ends() {
        let locals = runtime::launch(3, false, |comm| {
            let grid = DistributedGrid::new(Grid::new(9)?, comm, 2)?;
            Ok(grid.ghosted_space())
        })
        .unwrap();
        assert_eq!(locals[0], IndexSpace::new(0..4));
        assert_eq!(locals[1], IndexSpace::new(2..7));
        assert_eq!(locals[2], IndexSpace::new(5..9));
    }

    #[test]
    fn ghost_exchange_fills_neighbor_values() {
        let locals = runtime::launch(4, false, |comm| {
            let grid = DistributedGrid::new(Grid::new(11)?, comm, 2)?;
            let global = ramp(grid.owned_space());
            let mut local = grid.create_local_vector();
            grid.global_to_local(&global, &mut local)?;
            Ok(local)
        })
        .unwrap();

        for local in locals {
            assert_eq!(local, ramp(local.index_space()));
        }
    }

    #[test]
    fn sum_all_and_gather_agree_across_ranks() {
        let results = runtime::launch(3, false, |comm| {
            let grid = DistributedGrid::new(Grid::new(10)?, comm, 2)?;
            let total = grid.sum_all(&[1.0, comm.rank() as f64])?;
            let full = grid.gather(&ramp(grid.owned_space()))?;
            Ok((total, full))
        })
        .unwrap();

        for (rank, (total, full)) in results.into_iter().enumerate() {
            assert_eq!(total, vec![3.0, 3.0]);
            if rank == 0 {
                assert_eq!(full, Some(ramp(IndexSpace::new(0..10))));
            } else {
                assert!(full.is_none());
            }
        }
    }
}
