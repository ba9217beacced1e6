use crate::error::Error;
use crate::index_space::IndexSpace;




/**
 * The global node-centered grid: `num_points` nodes evenly spaced on the
 * unit interval, including both end points.
 */
#[derive(Clone, Debug)]
pub struct Grid {
    num_points: usize,
}




// ============================================================================
impl Grid {

    pub fn new(num_points: usize) -> Result<Self, Error> {
        if num_points < 3 {
            Err(Error::InvalidGrid(num_points))
        } else {
            Ok(Self { num_points })
        }
    }

    pub fn num_points(&self) -> usize {
        self.num_points
    }

    pub fn spacing(&self) -> f64 {
        1.0 / (self.num_points - 1) as f64
    }

    pub fn coordinate(&self, index: i64) -> f64 {
        index as f64 * self.spacing()
    }

    pub fn index_space(&self) -> IndexSpace {
        IndexSpace::new(0..self.num_points as i64)
    }

    /// True for the first and last global index.
    pub fn is_boundary(&self, index: i64) -> bool {
        index == 0 || index == self.num_points as i64 - 1
    }

    /// Split the grid into contiguous blocks, one per rank, in rank order.
    /// The first `num_points % num_ranks` blocks get one extra point. Every
    /// block must own at least one point.
    ///
    pub fn partition(&self, num_ranks: usize) -> Result<Vec<IndexSpace>, Error> {
        if num_ranks == 0 || num_ranks > self.num_points {
            return Err(Error::TooManyPartitions {
                num_points: self.num_points,
                num_ranks,
            });
        }
        let base = self.num_points / num_ranks;
        let rem = self.num_points % num_ranks;
        let mut cursor = 0;

        Ok((0..num_ranks)
            .map(|rank| {
                let count = (base + usize::from(rank < rem)) as i64;
                let space = IndexSpace::new(cursor..cursor + count);
                cursor += count;
                space
            })
            .collect())
    }
}
