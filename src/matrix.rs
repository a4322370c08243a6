//! Pairwise distance storage.
//!
//! The clustering core never computes neighbourhoods from coordinates; it asks a
//! [`DistanceMatrix`] for precomputed dissimilarities. Rows flagged as *ignored*
//! were sieved out and take no part in the density pass. They are restored
//! afterwards by [`Dbscan::restore_sieved`](crate::cluster::Dbscan::restore_sieved).

use rand::prelude::*;

use crate::cluster::util::{self, checked_distance};
use crate::error::{Error, Result};

/// Read access to a symmetric all-pairs dissimilarity matrix.
pub trait DistanceMatrix {
    /// Number of samples (rows).
    fn n_samples(&self) -> usize;

    /// Distance between samples `i` and `j` (`i != j`).
    fn distance(&self, i: usize, j: usize) -> f32;

    /// Whether row `i` was sieved out of the density pass.
    fn is_ignored(&self, i: usize) -> bool;
}

/// Symmetric matrix with a zero diagonal, storing only the strict upper triangle.
#[derive(Debug, Clone, PartialEq)]
pub struct CondensedMatrix {
    n: usize,
    data: Vec<f32>,
}

impl CondensedMatrix {
    /// An `n x n` matrix of zeros.
    pub fn zeros(n: usize) -> Self {
        Self {
            n,
            data: vec![0.0; n * n.saturating_sub(1) / 2],
        }
    }

    /// Side length.
    pub fn size(&self) -> usize {
        self.n
    }

    /// Number of stored (off-diagonal, unordered) entries.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// `true` when no off-diagonal entries exist (`n < 2`).
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Value at `(i, j)`. The diagonal is always zero.
    ///
    /// # Panics
    ///
    /// If `i` or `j` is not below [`size`](Self::size).
    pub fn get(&self, i: usize, j: usize) -> f32 {
        self.assert_in_bounds(i, j);
        if i == j {
            0.0
        } else {
            self.data[self.offset(i, j)]
        }
    }

    /// Set `(i, j)` and `(j, i)`. Writes to the diagonal are ignored.
    ///
    /// # Panics
    ///
    /// If `i` or `j` is not below [`size`](Self::size).
    pub fn set(&mut self, i: usize, j: usize, value: f32) {
        self.assert_in_bounds(i, j);
        if i != j {
            let k = self.offset(i, j);
            self.data[k] = value;
        }
    }

    /// Row-major upper-triangle entries, `(0,1), (0,2), ..., (n-2,n-1)`.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    fn assert_in_bounds(&self, i: usize, j: usize) {
        assert!(
            i < self.n && j < self.n,
            "index ({i}, {j}) out of bounds for {n}x{n} matrix",
            n = self.n
        );
    }

    fn offset(&self, i: usize, j: usize) -> usize {
        let (r, c) = if i < j { (i, j) } else { (j, i) };
        r * (2 * self.n - r - 1) / 2 + (c - r - 1)
    }
}

/// How to subsample rows before clustering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sieve {
    /// Keep every `k`-th sample (indices `0, k, 2k, ...`).
    Stride(usize),
    /// Keep a seeded random subset of roughly `1 / stride` of the samples.
    Random {
        /// Inverse sampling fraction.
        stride: usize,
        /// RNG seed.
        seed: u64,
    },
}

impl Sieve {
    fn stride(&self) -> usize {
        match *self {
            Sieve::Stride(k) => k,
            Sieve::Random { stride, .. } => stride,
        }
    }

    /// Per-sample `ignored` flags for `n` samples.
    fn ignored_flags(&self, n: usize) -> Result<Vec<bool>> {
        let stride = self.stride();
        if stride == 0 {
            return Err(Error::InvalidParameter {
                name: "stride",
                message: "must be at least 1",
            });
        }
        match *self {
            Sieve::Stride(k) => Ok((0..n).map(|i| i % k != 0).collect()),
            Sieve::Random { stride, seed } => {
                let mut ignored = vec![true; n];
                if n == 0 {
                    return Ok(ignored);
                }
                let keep = n.div_ceil(stride);
                let mut rng = StdRng::seed_from_u64(seed);
                for i in rand::seq::index::sample(&mut rng, n, keep) {
                    ignored[i] = false;
                }
                Ok(ignored)
            }
        }
    }
}

/// In-memory distance matrix with per-row ignored flags.
#[derive(Debug, Clone)]
pub struct DenseMatrix {
    distances: CondensedMatrix,
    ignored: Vec<bool>,
}

impl DenseMatrix {
    /// Build from a distance function evaluated once per unordered pair.
    ///
    /// Fails on NaN, infinite, or negative entries.
    pub fn from_fn(n: usize, mut f: impl FnMut(usize, usize) -> f32) -> Result<Self> {
        let mut distances = CondensedMatrix::zeros(n);
        for i in 0..n {
            for j in (i + 1)..n {
                distances.set(i, j, checked_distance(i, j, f(i, j))?);
            }
        }
        Ok(Self {
            distances,
            ignored: vec![false; n],
        })
    }

    /// Euclidean distances between coordinate vectors of equal length.
    pub fn from_points(points: &[Vec<f32>]) -> Result<Self> {
        let d = points.first().map_or(0, Vec::len);
        if let Some(p) = points.iter().find(|p| p.len() != d) {
            return Err(Error::SizeMismatch {
                expected: d,
                found: p.len(),
            });
        }
        Self::from_fn(points.len(), |i, j| util::euclidean(&points[i], &points[j]))
    }

    /// Mark a single row as ignored (or not).
    pub fn set_ignored(&mut self, i: usize, ignored: bool) -> Result<()> {
        util::check_index(i, self.ignored.len())?;
        self.ignored[i] = ignored;
        Ok(())
    }

    /// Replace all ignored flags according to `sieve`.
    pub fn apply_sieve(&mut self, sieve: Sieve) -> Result<()> {
        self.ignored = sieve.ignored_flags(self.ignored.len())?;
        Ok(())
    }

    /// Clear every ignored flag.
    pub fn clear_sieve(&mut self) {
        self.ignored.iter_mut().for_each(|f| *f = false);
    }

    /// Number of rows currently ignored.
    pub fn n_ignored(&self) -> usize {
        self.ignored.iter().filter(|&&f| f).count()
    }

    /// Underlying symmetric storage.
    pub fn distances(&self) -> &CondensedMatrix {
        &self.distances
    }
}

impl DistanceMatrix for DenseMatrix {
    fn n_samples(&self) -> usize {
        self.distances.size()
    }

    fn distance(&self, i: usize, j: usize) -> f32 {
        self.distances.get(i, j)
    }

    fn is_ignored(&self, i: usize) -> bool {
        self.ignored[i]
    }
}
