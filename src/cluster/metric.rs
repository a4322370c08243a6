//! Distance metrics between samples and cluster centroids.
//!
//! A [`Metric`] knows how to compare samples and how to summarise a set of
//! samples as a centroid. What a centroid *is* depends on the metric: a mean
//! coordinate vector for [`EuclideanMetric`], a representative sample for
//! [`MedoidMetric`].
//!
//! Methods take `&mut self` so implementations can keep scratch buffers. For
//! parallel work, each worker gets its own instance via [`Clone`].

use std::fmt::Debug;
use std::sync::Arc;

use super::util::{self, check_index, checked_distance};
use crate::error::{Error, Result};
use crate::matrix::{DenseMatrix, DistanceMatrix};

/// Sample/centroid distance computations used by clustering and restoration.
pub trait Metric: Clone + Send {
    /// Aggregate representation of a cluster.
    type Centroid: Clone + Debug + Send + Sync;

    /// Number of samples this metric can address.
    fn n_samples(&self) -> usize;

    /// Distance between samples `i` and `j`.
    fn sample_distance(&mut self, i: usize, j: usize) -> Result<f32>;

    /// Distance between sample `i` and `centroid`.
    fn sample_to_centroid(&mut self, i: usize, centroid: &Self::Centroid) -> Result<f32>;

    /// Distance between two centroids.
    fn centroid_to_centroid(&mut self, a: &Self::Centroid, b: &Self::Centroid) -> Result<f32>;

    /// Compute the centroid of a non-empty set of samples.
    fn centroid(&mut self, members: &[usize]) -> Result<Self::Centroid>;
}

/// Euclidean distance over coordinate vectors; centroids are mean vectors.
#[derive(Debug, Clone)]
pub struct EuclideanMetric {
    points: Arc<[Vec<f32>]>,
    dim: usize,
}

impl EuclideanMetric {
    /// Wrap coordinate vectors of equal length.
    pub fn new(points: Vec<Vec<f32>>) -> Result<Self> {
        let dim = points.first().map_or(0, Vec::len);
        if let Some(p) = points.iter().find(|p| p.len() != dim) {
            return Err(Error::SizeMismatch {
                expected: dim,
                found: p.len(),
            });
        }
        Ok(Self {
            points: points.into(),
            dim,
        })
    }

    /// Coordinates of sample `i`.
    pub fn point(&self, i: usize) -> Result<&[f32]> {
        check_index(i, self.points.len())?;
        Ok(&self.points[i])
    }
}

impl Metric for EuclideanMetric {
    type Centroid = Vec<f32>;

    fn n_samples(&self) -> usize {
        self.points.len()
    }

    fn sample_distance(&mut self, i: usize, j: usize) -> Result<f32> {
        let d = util::euclidean(self.point(i)?, self.point(j)?);
        checked_distance(i, j, d)
    }

    fn sample_to_centroid(&mut self, i: usize, centroid: &Vec<f32>) -> Result<f32> {
        let p = self.point(i)?;
        if centroid.len() != p.len() {
            return Err(Error::SizeMismatch {
                expected: p.len(),
                found: centroid.len(),
            });
        }
        checked_distance(i, i, util::euclidean(p, centroid))
    }

    fn centroid_to_centroid(&mut self, a: &Vec<f32>, b: &Vec<f32>) -> Result<f32> {
        if a.len() != b.len() {
            return Err(Error::SizeMismatch {
                expected: a.len(),
                found: b.len(),
            });
        }
        checked_distance(0, 0, util::euclidean(a, b))
    }

    fn centroid(&mut self, members: &[usize]) -> Result<Vec<f32>> {
        if members.is_empty() {
            return Err(Error::EmptyInput);
        }
        let mut sum = vec![0.0f32; self.dim];
        for &m in members {
            for (s, x) in sum.iter_mut().zip(self.point(m)?) {
                *s += x;
            }
        }
        let n = members.len() as f32;
        sum.iter_mut().for_each(|s| *s /= n);
        Ok(sum)
    }
}

/// Representative sample of a cluster under a pairwise-only metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Medoid {
    /// Index of the member minimising summed distance to the other members.
    pub sample: usize,
}

/// Metric backed by a precomputed matrix; centroids are medoids.
///
/// Distances to ignored rows are still available, which is what restoration needs.
#[derive(Debug, Clone)]
pub struct MedoidMetric {
    matrix: Arc<DenseMatrix>,
}

impl MedoidMetric {
    /// Share `matrix` with this metric.
    pub fn new(matrix: Arc<DenseMatrix>) -> Self {
        Self { matrix }
    }

    fn lookup(&self, i: usize, j: usize) -> Result<f32> {
        let n = self.matrix.n_samples();
        check_index(i, n)?;
        check_index(j, n)?;
        if i == j {
            return Ok(0.0);
        }
        checked_distance(i, j, self.matrix.distance(i, j))
    }
}

impl Metric for MedoidMetric {
    type Centroid = Medoid;

    fn n_samples(&self) -> usize {
        self.matrix.n_samples()
    }

    fn sample_distance(&mut self, i: usize, j: usize) -> Result<f32> {
        self.lookup(i, j)
    }

    fn sample_to_centroid(&mut self, i: usize, centroid: &Medoid) -> Result<f32> {
        self.lookup(i, centroid.sample)
    }

    fn centroid_to_centroid(&mut self, a: &Medoid, b: &Medoid) -> Result<f32> {
        self.lookup(a.sample, b.sample)
    }

    fn centroid(&mut self, members: &[usize]) -> Result<Medoid> {
        let mut best: Option<(usize, f64)> = None;
        for &c in members {
            let mut total = 0.0f64;
            for &m in members {
                total += f64::from(self.lookup(c, m)?);
            }
            // Strict comparison keeps the first member on ties.
            if best.map_or(true, |(_, t)| total < t) {
                best = Some((c, total));
            }
        }
        best.map(|(sample, _)| Medoid { sample })
            .ok_or(Error::EmptyInput)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn euclidean_centroid_is_mean() {
        let mut m = EuclideanMetric::new(vec![vec![0.0, 0.0], vec![2.0, 0.0], vec![1.0, 3.0]])
            .unwrap();
        let c = m.centroid(&[0, 1, 2]).unwrap();
        assert_eq!(c, vec![1.0, 1.0]);
        assert_eq!(m.sample_to_centroid(0, &c).unwrap(), 2.0f32.sqrt());
        assert_eq!(m.sample_distance(0, 1).unwrap(), 2.0);
        assert_eq!(m.point(2).unwrap(), &[1.0, 3.0]);
        assert!(matches!(
            m.point(3),
            Err(Error::IndexOutOfBounds { index: 3, len: 3 })
        ));
    }

    #[test]
    fn euclidean_rejects_bad_input() {
        assert!(EuclideanMetric::new(vec![vec![0.0], vec![0.0, 1.0]]).is_err());

        let mut m = EuclideanMetric::new(vec![vec![0.0], vec![1.0]]).unwrap();
        assert!(matches!(m.centroid(&[]), Err(Error::EmptyInput)));
        assert!(matches!(
            m.sample_distance(0, 5),
            Err(Error::IndexOutOfBounds { index: 5, len: 2 })
        ));
        assert!(m.sample_to_centroid(0, &vec![0.0, 0.0]).is_err());
    }

    #[test]
    fn euclidean_reports_non_finite() {
        let mut m = EuclideanMetric::new(vec![vec![0.0], vec![f32::INFINITY]]).unwrap();
        assert!(matches!(
            m.sample_distance(0, 1),
            Err(Error::InvalidDistance { .. })
        ));
    }

    #[test]
    fn medoid_picks_most_central_member() {
        let points: Vec<Vec<f32>> = [0.0, 1.0, 2.0, 10.0].iter().map(|&x| vec![x]).collect();
        let matrix = Arc::new(DenseMatrix::from_points(&points).unwrap());
        let mut m = MedoidMetric::new(matrix);
        assert_eq!(m.centroid(&[0, 1, 2]).unwrap(), Medoid { sample: 1 });
        assert_eq!(m.centroid(&[0, 2]).unwrap(), Medoid { sample: 0 });
        assert_eq!(m.sample_to_centroid(3, &Medoid { sample: 1 }).unwrap(), 9.0);
        assert_eq!(
            m.centroid_to_centroid(&Medoid { sample: 2 }, &Medoid { sample: 2 })
                .unwrap(),
            0.0
        );
        assert!(matches!(m.centroid(&[]), Err(Error::EmptyInput)));
    }

    #[test]
    fn clones_are_independent_and_equivalent() {
        let mut a = EuclideanMetric::new(vec![vec![0.0], vec![4.0]]).unwrap();
        let mut b = a.clone();
        assert_eq!(
            a.sample_distance(0, 1).unwrap(),
            b.sample_distance(0, 1).unwrap()
        );
        assert_eq!(b.n_samples(), 2);
    }
}
