use super::dbscan::Partition;
use super::metric::Metric;
use crate::error::Result;
use crate::matrix::DistanceMatrix;

/// Common interface for hard clustering over a precomputed distance matrix.
pub trait Clustering {
    /// Cluster the non-ignored samples of `matrix`, using `metric` for centroids.
    fn fit<M, D>(&self, matrix: &M, metric: &mut D) -> Result<Partition<D::Centroid>>
    where
        M: DistanceMatrix + ?Sized,
        D: Metric;

    /// Fit and return one label per sample, `None` for noise and unassigned samples.
    fn fit_predict<M, D>(&self, matrix: &M, metric: &mut D) -> Result<Vec<Option<usize>>>
    where
        M: DistanceMatrix + ?Sized,
        D: Metric,
    {
        Ok(self.fit(matrix, metric)?.labels())
    }
}
