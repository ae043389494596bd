use serde::{Deserialize, Serialize};

use crate::{utils::math::vector::ZeroSpVec, vectorizer::compare::{Compare, DefaultCompare}};

/// One weighted term vector per candidate.
/// Row `i` belongs to the candidate whose index is `i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateMatrix {
    rows: Vec<ZeroSpVec<f64>>,
    n_cols: usize,
}

impl CandidateMatrix {
    pub fn new(rows: Vec<ZeroSpVec<f64>>, n_cols: usize) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == n_cols));
        Self { rows, n_cols }
    }

    /// `(rows, cols)`
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.n_cols)
    }

    #[inline]
    pub fn row(&self, index: usize) -> Option<&ZeroSpVec<f64>> {
        self.rows.get(index)
    }

    /// Dot product of each requested row with `query`, in request order.
    /// Indices past the last row score zero.
    pub fn dot_rows(&self, indices: &[usize], query: &ZeroSpVec<f64>) -> Vec<f64> {
        indices
            .iter()
            .map(|&idx| match self.rows.get(idx) {
                Some(row) => <DefaultCompare as Compare<f64>>::dot(row, query),
                None => 0.0,
            })
            .collect()
    }
}
