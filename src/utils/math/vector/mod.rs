pub mod serde;

use std::fmt::{self, Debug};
use std::ops::Index;

use num::Num;

/// ZeroSpVec is a sparse vector that treats zero elements as sparse.
/// It holds `indices` and `values`:
/// indices keep the position of each stored element,
/// values keep the element itself.
///
/// Stored elements are guaranteed to be sorted by ascending index,
/// and no stored value is zero.
#[derive(Clone, PartialEq)]
pub struct ZeroSpVec<N>
where
    N: Num,
{
    ind: Vec<usize>,
    val: Vec<N>,
    len: usize,
    zero: N,
}

impl<N> ZeroSpVec<N>
where
    N: Num + Copy,
{
    #[inline]
    pub fn new() -> Self {
        ZeroSpVec {
            ind: Vec::new(),
            val: Vec::new(),
            len: 0,
            zero: N::zero(),
        }
    }

    /// `cap` is the expected number of non-zero elements
    #[inline]
    pub fn with_capacity(cap: usize) -> Self {
        ZeroSpVec {
            ind: Vec::with_capacity(cap),
            val: Vec::with_capacity(cap),
            len: 0,
            zero: N::zero(),
        }
    }

    /// Build from `(index, value)` entries of a vector of length `len`.
    /// Entries may come in any order; duplicate indices are summed,
    /// zero values and out-of-range indices are dropped.
    pub fn from_raw_iter<I>(len: usize, entries: I) -> Self
    where
        I: IntoIterator<Item = (usize, N)>,
    {
        let mut pairs: Vec<(usize, N)> = entries
            .into_iter()
            .filter(|(idx, _)| *idx < len)
            .collect();
        pairs.sort_by_key(|(idx, _)| *idx);

        let mut vec = ZeroSpVec::with_capacity(pairs.len());
        vec.len = len;
        for (idx, value) in pairs {
            match vec.ind.last() {
                Some(&last) if last == idx => {
                    let slot = vec.val.len() - 1;
                    vec.val[slot] = vec.val[slot] + value;
                }
                _ => {
                    vec.ind.push(idx);
                    vec.val.push(value);
                }
            }
        }
        vec.drop_zeros();
        vec
    }

    /// Append an element at position `len`, growing the vector by one.
    #[inline]
    pub fn push(&mut self, value: N) {
        if value != N::zero() {
            self.ind.push(self.len);
            self.val.push(value);
        }
        self.len += 1;
    }

    #[inline]
    pub fn shrink_to_fit(&mut self) {
        self.ind.shrink_to_fit();
        self.val.shrink_to_fit();
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Logical length, zeros included
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Number of stored (non-zero) elements
    #[inline]
    pub fn nnz(&self) -> usize {
        self.ind.len()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&N> {
        if index >= self.len {
            return None;
        }
        match self.ind.binary_search(&index) {
            Ok(pos) => Some(&self.val[pos]),
            Err(_) => Some(&self.zero),
        }
    }

    /// Iterate stored elements as `(index, value)` in ascending index order
    #[inline]
    pub fn raw_iter(&self) -> impl Iterator<Item = (usize, &N)> + '_ {
        self.ind.iter().copied().zip(self.val.iter())
    }

    /// Apply `f` to every stored value, dropping values that become zero.
    pub fn map_values<F>(&mut self, mut f: F)
    where
        F: FnMut(N) -> N,
    {
        for v in self.val.iter_mut() {
            *v = f(*v);
        }
        self.drop_zeros();
    }

    fn drop_zeros(&mut self) {
        if self.val.iter().all(|v| *v != N::zero()) {
            return;
        }
        let (ind, val): (Vec<usize>, Vec<N>) = self
            .ind
            .iter()
            .copied()
            .zip(self.val.iter().copied())
            .filter(|(_, v)| *v != N::zero())
            .unzip();
        self.ind = ind;
        self.val = val;
    }
}

impl<N> Default for ZeroSpVec<N>
where
    N: Num + Copy,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<N> From<Vec<N>> for ZeroSpVec<N>
where
    N: Num + Copy,
{
    fn from(dense: Vec<N>) -> Self {
        let mut vec = ZeroSpVec::with_capacity(dense.len());
        for value in dense {
            vec.push(value);
        }
        vec
    }
}

impl<N> Index<usize> for ZeroSpVec<N>
where
    N: Num + Copy,
{
    type Output = N;

    fn index(&self, index: usize) -> &Self::Output {
        match self.get(index) {
            Some(value) => value,
            None => panic!("index out of bounds: the len is {} but the index is {}", self.len, index),
        }
    }
}

impl<N> Debug for ZeroSpVec<N>
where
    N: Num + Copy + Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZeroSpVec")
            .field("len", &self.len)
            .field("nnz", &self.nnz())
            .field("entries", &self.raw_iter().collect::<Vec<_>>())
            .finish()
    }
}
