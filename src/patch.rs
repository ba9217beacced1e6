use crate::index_space::IndexSpace;
use serde::{Deserialize, Serialize};




#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]


/**
 * A patch is a mapping from a contiguous range of grid indexes to a fixed
 * number of field values per index. The data is stored row-major: all the
 * fields belonging to one grid point are adjacent in memory.
 *
 * Patches are the unit of storage for the solution state: a rank's owned
 * part of the global vector, its ghost-padded local view, and the halo
 * messages exchanged between ranks are all patches.
 */
pub struct Patch {
    space: IndexSpace,
    num_fields: usize,
    data: Vec<f64>,
}




impl Patch {




    /**
     * Generate a patch of zeros covering the given index space.
     */
    pub fn zeros(num_fields: usize, space: IndexSpace) -> Self {
        Self {
            data: vec![0.0; space.len() * num_fields],
            space,
            num_fields,
        }
    }




    /**
     * Generate a patch covering the given index space, with values defined
     * from a closure that fills the slice of fields at each index.
     */
    pub fn from_slice_function<F>(space: IndexSpace, num_fields: usize, f: F) -> Self
    where
        F: Fn(i64, &mut [f64]),
    {
        let mut patch = Self::zeros(num_fields, space);

        for (i, slice) in patch.space.iter().zip(patch.data.chunks_exact_mut(num_fields)) {
            f(i, slice)
        }
        patch
    }




    pub fn index_space(&self) -> IndexSpace {
        self.space.clone()
    }

    pub fn num_fields(&self) -> usize {
        self.num_fields
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }




    /**
     * Return the fields at the given index.
     */
    pub fn get_slice(&self, index: i64) -> &[f64] {
        self.validate_index(index);
        let s = self.space.offset(index) * self.num_fields;
        &self.data[s..s + self.num_fields]
    }

    pub fn get_slice_mut(&mut self, index: i64) -> &mut [f64] {
        self.validate_index(index);
        let s = self.space.offset(index) * self.num_fields;
        &mut self.data[s..s + self.num_fields]
    }




    /**
     * Return a new patch containing a copy of the data in the given subset
     * of this patch.
     */
    pub fn extract(&self, space: IndexSpace) -> Self {
        assert!(
            self.space.contains_space(&space),
            "extracted space {:?} is not inside patch {:?}",
            space,
            self.space);

        let s = self.space.offset(space.start()) * self.num_fields;
        let e = s + space.len() * self.num_fields;

        Self {
            data: self.data[s..e].to_vec(),
            space,
            num_fields: self.num_fields,
        }
    }




    /**
     * Overwrite the values in this patch with those of another patch, where
     * the two index spaces overlap. Indexes outside the overlap are not
     * touched.
     */
    pub fn copy_from(&mut self, other: &Patch) {
        assert_eq!(self.num_fields, other.num_fields);

        let overlap = self.space.intersect(&other.space);

        if overlap.is_empty() {
            return;
        }
        let q = self.num_fields;
        let s0 = self.space.offset(overlap.start()) * q;
        let s1 = other.space.offset(overlap.start()) * q;
        let n = overlap.len() * q;

        self.data[s0..s0 + n].copy_from_slice(&other.data[s1..s1 + n]);
    }




    /**
     * In-place update `self += a * other`. Both patches must cover the same
     * index space.
     */
    pub fn add_scaled(&mut self, a: f64, other: &Patch) {
        assert_eq!(self.space, other.space);
        assert_eq!(self.num_fields, other.num_fields);

        for (u, f) in self.data.iter_mut().zip(&other.data) {
            *u += a * f
        }
    }




    pub fn iter_data(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.num_fields)
    }

    pub fn iter_data_mut(&mut self) -> impl Iterator<Item = &mut [f64]> {
        self.data.chunks_exact_mut(self.num_fields)
    }




    fn validate_index(&self, index: i64) {
        if !self.space.contains(index) {
            panic!("index {} out of range on patch ({}..{})",
                index,
                self.space.start(),
                self.space.end());
        }
    }
}
