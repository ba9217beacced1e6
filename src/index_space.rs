use core::ops::Range;
use serde::{Deserialize, Serialize};




#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]


/**
 * Represents a contiguous region in a discrete 1D index space
 */
pub struct IndexSpace {
    di: Range<i64>,
}




/**
 * Describes a range of grid indexes. The index type is signed 64-bit integer,
 * so that ghost indexes one below the start of the domain are expressible.
 */
impl IndexSpace {


    pub fn new(di: Range<i64>) -> Self {

        assert!(
            di.start <= di.end,
            "index space has negative length");

        Self { di }
    }


    /**
     * Return the number of elements in this index space.
     */
    pub fn len(&self) -> usize {
        (self.di.end - self.di.start) as usize
    }


    pub fn is_empty(&self) -> bool {
        self.di.start == self.di.end
    }


    /**
     * Return the minimum index (inclusive).
     */
    pub fn start(&self) -> i64 {
        self.di.start
    }


    /**
     * Return the maximum index (exclusive).
     */
    pub fn end(&self) -> i64 {
        self.di.end
    }


    pub fn as_range(&self) -> &Range<i64> {
        &self.di
    }


    /**
     * Determine whether this index space contains the given index.
     */
    pub fn contains(&self, index: i64) -> bool {
        self.di.contains(&index)
    }


    /**
     * Determine whether another index space is a subset of this one.
     */
    pub fn contains_space(&self, other: &Self) -> bool {
        other.di.start >= self.di.start && other.di.end <= self.di.end
    }


    /**
     * Expand this index space by the given number of elements on both ends.
     */
    pub fn extend_all(&self, delta: i64) -> Self {
        Self::new(self.di.start - delta .. self.di.end + delta)
    }


    /**
     * Trim this index space by the given number of elements on both ends.
     */
    pub fn trim_all(&self, delta: i64) -> Self {
        self.extend_all(-delta)
    }


    /**
     * Shift this index space by the given number of elements.
     */
    pub fn translate(&self, delta: i64) -> Self {
        Self::new(self.di.start + delta .. self.di.end + delta)
    }


    /**
     * Return the overlapping part of two index spaces. Disjoint spaces yield
     * an empty space located at the larger of the two starts.
     */
    pub fn intersect(&self, other: &Self) -> Self {
        let start = self.di.start.max(other.di.start);
        let end = self.di.end.min(other.di.end).max(start);
        Self::new(start..end)
    }


    /**
     * Return the linear offset for the given index, in a memory buffer
     * aligned with the start of this index space.
     */
    pub fn offset(&self, index: i64) -> usize {
        (index - self.di.start) as usize
    }


    pub fn iter(&self) -> impl Iterator<Item = i64> {
        self.di.clone()
    }
}




// ============================================================================
impl From<Range<i64>> for IndexSpace {
    fn from(range: Range<i64>) -> Self {
        Self::new(range)
    }
}

impl From<IndexSpace> for Range<i64> {
    fn from(space: IndexSpace) -> Self {
        space.di
    }
}
