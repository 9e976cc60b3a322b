use crate::{kernels, FeatureTable, Matrix};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::collections::BinaryHeap;

/// Candidate ordered by (distance, index) so the max-heap top is the worst kept
/// neighbor and equal distances favor the earlier catalog entry.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Candidate {
    dist: OrderedFloat<f32>,
    idx: usize,
}

/// Exact k-nearest-neighbor index under Euclidean distance
///
/// Holds its own contiguous copy of the rows it was fitted on. Searches scan
/// every row and keep the k best in a bounded heap.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NearestNeighborIndex {
    vectors: Matrix,
}

impl NearestNeighborIndex {
    pub fn new(vectors: Matrix) -> Self {
        Self { vectors }
    }

    /// Fit over the stored feature rows
    pub fn fit(table: &FeatureTable) -> Self {
        Self {
            vectors: table.matrix().clone(),
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.vectors.rows()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vectors.rows() == 0
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.vectors.cols()
    }

    pub fn vectors(&self) -> &Matrix {
        &self.vectors
    }

    /// The `k` nearest rows to `query`, ascending by distance, ties by index.
    ///
    /// Returns fewer than `k` entries when the index holds fewer rows. Callers
    /// pass a query of width [`dim`](Self::dim).
    pub fn search(&self, query: &[f32], k: usize) -> Vec<(usize, f32)> {
        debug_assert_eq!(query.len(), self.dim());
        let k = k.min(self.len());
        if k == 0 {
            return Vec::new();
        }

        let mut heap: BinaryHeap<Candidate> = BinaryHeap::with_capacity(k + 1);
        for (idx, row) in self.vectors.iter_rows().enumerate() {
            let candidate = Candidate {
                dist: OrderedFloat(kernels::l2_squared(query, row)),
                idx,
            };
            if heap.len() < k {
                heap.push(candidate);
            } else if let Some(worst) = heap.peek() {
                if candidate < *worst {
                    heap.pop();
                    heap.push(candidate);
                }
            }
        }

        heap.into_sorted_vec()
            .into_iter()
            .map(|c| (c.idx, c.dist.into_inner().sqrt()))
            .collect()
    }
}
