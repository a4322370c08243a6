//! DBSCAN: Density-Based Spatial Clustering of Applications with Noise.
//!
//! # The Algorithm (Ester et al., 1996)
//!
//! DBSCAN groups samples by neighbourhood density. Here it runs entirely on a
//! precomputed [`DistanceMatrix`]; coordinates are never needed.
//!
//! ## Core Concepts
//!
//! - **Epsilon (ε)**: two samples are neighbours when `d(p, q) < ε` (strict).
//! - **MinPoints**: minimum number of *other* samples within ε for a sample to be core.
//! - **Core point**: has at least MinPoints neighbours. Seeds and expands clusters.
//! - **Border point**: neighbour of a core point, but not core itself. Joins, never expands.
//! - **Noise point**: neither core nor border.
//!
//! ## Algorithm Steps
//!
//! 1. Walk the active (non-ignored) samples in ascending index order. For each unvisited `p`:
//!    - Find neighbours within ε among active samples
//!    - If fewer than MinPoints, mark `p` as noise (it may still become a border point)
//!    - Else start a new cluster at `p` and expand breadth-first
//!
//! 2. Expansion: for each queued neighbour `q`:
//!    - If unvisited, query its neighbourhood; if core, queue those neighbours too
//!    - If `q` is not already in a cluster, add it to this one
//!
//! A sample already claimed by an earlier cluster is never moved: the first
//! expansion to reach a border point keeps it. Scan order is the only tie-break,
//! so results are fully deterministic.
//!
//! After the scan every centroid is computed and the centroid-to-centroid
//! distance matrix is built in discovery order.
//!
//! ## Complexity
//!
//! - **Time**: O(n²) distance lookups (no spatial index).
//! - **Space**: O(n) run state, plus the caller's matrix.
//!
//! ## References
//!
//! Ester et al. (1996). "A Density-Based Algorithm for Discovering Clusters
//! in Large Spatial Databases with Noise." KDD-96.

use std::fmt;

use log::{debug, info, trace};

use super::metric::Metric;
use super::node::{Cluster, ClusterId};
use super::sieve::SievePolicy;
use super::traits::Clustering;
use super::util::checked_distance;
use crate::error::{Error, Result};
use crate::matrix::{CondensedMatrix, DistanceMatrix};

/// DBSCAN clustering algorithm.
#[derive(Debug, Clone)]
pub struct Dbscan {
    /// Epsilon: neighbourhood radius (exclusive).
    epsilon: f32,
    /// Minimum neighbours (excluding the sample itself) for a core point.
    min_points: usize,
    /// How sieved samples are added back.
    sieve_policy: SievePolicy,
}

impl Dbscan {
    /// Create a new DBSCAN clusterer.
    ///
    /// # Arguments
    ///
    /// * `epsilon` - Neighbourhood radius. Must be positive.
    /// * `min_points` - Minimum number of neighbours to seed a cluster. Must be at least 1.
    ///
    /// Parameters are validated when clustering starts.
    pub fn new(epsilon: f32, min_points: usize) -> Self {
        Self {
            epsilon,
            min_points,
            sieve_policy: SievePolicy::default(),
        }
    }

    /// Set epsilon (neighbourhood radius).
    pub fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Set minimum neighbours for core classification.
    pub fn with_min_points(mut self, min_points: usize) -> Self {
        self.min_points = min_points;
        self
    }

    /// Set the restoration policy for sieved samples.
    pub fn with_sieve_policy(mut self, policy: SievePolicy) -> Self {
        self.sieve_policy = policy;
        self
    }

    /// Neighbourhood radius.
    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// Minimum neighbours for a core point.
    pub fn min_points(&self) -> usize {
        self.min_points
    }

    /// Restoration policy for sieved samples.
    pub fn sieve_policy(&self) -> SievePolicy {
        self.sieve_policy
    }

    /// Check `epsilon > 0` and `min_points >= 1`.
    pub fn validate(&self) -> Result<()> {
        if self.min_points == 0 {
            return Err(Error::InvalidParameter {
                name: "min_points",
                message: "must be at least 1",
            });
        }
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(Error::InvalidParameter {
                name: "epsilon",
                message: "must be positive and finite",
            });
        }
        Ok(())
    }

    /// Cluster the non-ignored samples of `matrix`.
    ///
    /// `metric` is only used once the partition is final, to compute centroids
    /// and the cluster-distance matrix. Ignored samples stay [`Status::Unassigned`].
    pub fn cluster<M, D>(&self, matrix: &M, metric: &mut D) -> Result<Partition<D::Centroid>>
    where
        M: DistanceMatrix + ?Sized,
        D: Metric,
    {
        self.validate()?;
        let n = matrix.n_samples();
        if n == 0 {
            return Err(Error::EmptyInput);
        }
        if metric.n_samples() != n {
            return Err(Error::SizeMismatch {
                expected: n,
                found: metric.n_samples(),
            });
        }

        info!("{self}");
        let mut run = Run::new(matrix, self);
        info!(
            "starting DBSCAN over {} of {} samples",
            run.active.len(),
            n
        );
        let found = run.grow();

        let mut clusters: Vec<Cluster<D::Centroid>> = found.into_iter().map(Cluster::new).collect();
        let centroids = clusters
            .iter_mut()
            .map(|c| c.recompute_centroid(metric).cloned())
            .collect::<Result<Vec<_>>>()?;
        let cluster_distances = centroid_distances(&centroids, metric)?;

        let partition = Partition {
            clusters,
            status: run.status,
            cluster_distances,
            discarded: vec![false; n],
        };
        info!(
            "DBSCAN found {} clusters, {} noise samples",
            partition.n_clusters(),
            partition.n_noise()
        );
        Ok(partition)
    }
}

impl Default for Dbscan {
    fn default() -> Self {
        Self::new(0.5, 5)
    }
}

impl fmt::Display for Dbscan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DBSCAN: min_points={} epsilon={:.3}; ",
            self.min_points, self.epsilon
        )?;
        match self.sieve_policy {
            SievePolicy::ToCentroid => {
                write!(f, "sieved samples restored by closeness to cluster centroids")
            }
            SievePolicy::ToFrame => write!(
                f,
                "sieved samples restored only if within {:.3} of a sample in the nearest cluster",
                self.epsilon
            ),
        }
    }
}

impl Clustering for Dbscan {
    fn fit<M, D>(&self, matrix: &M, metric: &mut D) -> Result<Partition<D::Centroid>>
    where
        M: DistanceMatrix + ?Sized,
        D: Metric,
    {
        self.cluster(matrix, metric)
    }
}

/// Per-sample outcome of clustering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Not evaluated by the density pass (sieved out), and not restored into a cluster.
    Unassigned,
    /// Not density-reachable from any core point.
    Noise,
    /// Member of exactly one cluster. Terminal.
    InCluster,
}

/// Result of a clustering run: clusters, per-sample status, and centroid distances.
#[derive(Debug, Clone)]
pub struct Partition<C> {
    pub(super) clusters: Vec<Cluster<C>>,
    pub(super) status: Vec<Status>,
    pub(super) cluster_distances: CondensedMatrix,
    /// Sieved samples rejected by restoration. They stay `Unassigned`.
    pub(super) discarded: Vec<bool>,
}

impl<C> Partition<C> {
    /// Clusters in discovery order (or population order after
    /// [`sort_by_population`](Self::sort_by_population)).
    pub fn clusters(&self) -> &[Cluster<C>] {
        &self.clusters
    }

    /// Cluster behind a handle.
    pub fn cluster(&self, id: ClusterId) -> Option<&Cluster<C>> {
        self.clusters.get(id.0)
    }

    /// Number of clusters.
    pub fn n_clusters(&self) -> usize {
        self.clusters.len()
    }

    /// Number of samples covered, clustered or not.
    pub fn n_samples(&self) -> usize {
        self.status.len()
    }

    /// Status of every sample.
    pub fn status(&self) -> &[Status] {
        &self.status
    }

    /// Noise samples, ascending.
    pub fn noise(&self) -> Vec<usize> {
        self.indices_with(Status::Noise)
    }

    /// Number of noise samples.
    pub fn n_noise(&self) -> usize {
        self.status.iter().filter(|&&s| s == Status::Noise).count()
    }

    /// Samples outside every cluster and not noise, ascending: sieved samples
    /// not yet restored, plus those restoration discarded.
    pub fn unassigned(&self) -> Vec<usize> {
        self.indices_with(Status::Unassigned)
    }

    /// Sieved samples that restoration rejected, ascending.
    pub fn discarded(&self) -> Vec<usize> {
        self.discarded
            .iter()
            .enumerate()
            .filter(|&(_, &d)| d)
            .map(|(i, _)| i)
            .collect()
    }

    /// Cluster label per sample; `None` for noise and unassigned samples.
    pub fn labels(&self) -> Vec<Option<usize>> {
        let mut labels = vec![None; self.status.len()];
        for (id, cluster) in self.clusters.iter().enumerate() {
            for &m in cluster.members() {
                labels[m] = Some(id);
            }
        }
        labels
    }

    /// Centroid-to-centroid distances, indexed like [`clusters`](Self::clusters).
    ///
    /// Computed once when clustering finishes; restoration does not update it.
    pub fn cluster_distances(&self) -> &CondensedMatrix {
        &self.cluster_distances
    }

    /// Recompute every centroid from the current members.
    pub fn refresh_centroids<D>(&mut self, metric: &mut D) -> Result<()>
    where
        D: Metric<Centroid = C>,
    {
        for cluster in &mut self.clusters {
            cluster.recompute_centroid(metric)?;
        }
        Ok(())
    }

    /// Renumber clusters by decreasing size; equal sizes keep discovery order.
    ///
    /// The cluster-distance matrix is permuted to match. Returns the previous
    /// handle of each cluster, in the new order.
    pub fn sort_by_population(&mut self) -> Vec<ClusterId> {
        let mut order: Vec<usize> = (0..self.clusters.len()).collect();
        order.sort_by(|&a, &b| self.clusters[b].len().cmp(&self.clusters[a].len()));

        let k = order.len();
        let mut distances = CondensedMatrix::zeros(k);
        for (new_i, &old_i) in order.iter().enumerate() {
            for (new_j, &old_j) in order.iter().enumerate().skip(new_i + 1) {
                distances.set(new_i, new_j, self.cluster_distances.get(old_i, old_j));
            }
        }

        let mut slots: Vec<Option<Cluster<C>>> =
            std::mem::take(&mut self.clusters).into_iter().map(Some).collect();
        self.clusters = order.iter().filter_map(|&i| slots[i].take()).collect();
        self.cluster_distances = distances;
        order.into_iter().map(ClusterId).collect()
    }

    fn indices_with(&self, status: Status) -> Vec<usize> {
        self.status
            .iter()
            .enumerate()
            .filter(|&(_, &s)| s == status)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Mutable state of one clustering pass.
struct Run<'a, M: ?Sized> {
    matrix: &'a M,
    epsilon: f32,
    min_points: usize,
    /// Non-ignored samples, ascending. Also the processing order.
    active: Vec<usize>,
    visited: Vec<bool>,
    status: Vec<Status>,
}

impl<'a, M: DistanceMatrix + ?Sized> Run<'a, M> {
    fn new(matrix: &'a M, params: &Dbscan) -> Self {
        let n = matrix.n_samples();
        Self {
            matrix,
            epsilon: params.epsilon,
            min_points: params.min_points,
            active: (0..n).filter(|&i| !matrix.is_ignored(i)).collect(),
            visited: vec![false; n],
            status: vec![Status::Unassigned; n],
        }
    }

    /// Active samples strictly within epsilon of `point`, excluding itself.
    fn region_query(&self, point: usize, out: &mut Vec<usize>) {
        out.clear();
        out.extend(
            self.active
                .iter()
                .copied()
                .filter(|&other| other != point && self.matrix.distance(point, other) < self.epsilon),
        );
    }

    /// Scan all active samples; returns the member lists of discovered clusters.
    fn grow(&mut self) -> Vec<Vec<usize>> {
        let mut found = Vec::new();
        let mut neighbors = Vec::new();
        let mut inner = Vec::new();

        for pos in 0..self.active.len() {
            let point = self.active[pos];
            trace!("seed {}/{}", pos + 1, self.active.len());
            if self.visited[point] {
                continue;
            }
            self.visited[point] = true;

            self.region_query(point, &mut neighbors);
            if neighbors.len() < self.min_points {
                debug!("sample {point}: {} neighbors, noise", neighbors.len());
                self.status[point] = Status::Noise;
                continue;
            }

            debug!(
                "sample {point}: {} neighbors, seeds cluster {}",
                neighbors.len(),
                found.len()
            );
            let mut members = vec![point];
            self.status[point] = Status::InCluster;

            // Indexed loop: `neighbors` grows while we walk it.
            let mut idx = 0;
            while idx < neighbors.len() {
                let q = neighbors[idx];
                idx += 1;
                if !self.visited[q] {
                    self.visited[q] = true;
                    self.region_query(q, &mut inner);
                    if inner.len() >= self.min_points {
                        neighbors.extend_from_slice(&inner);
                    }
                }
                if self.status[q] != Status::InCluster {
                    members.push(q);
                    self.status[q] = Status::InCluster;
                }
            }
            found.push(members);
        }
        found
    }
}

/// Pairwise centroid distances in the given order.
fn centroid_distances<D: Metric>(centroids: &[D::Centroid], metric: &mut D) -> Result<CondensedMatrix> {
    let k = centroids.len();
    let mut out = CondensedMatrix::zeros(k);
    for i in 0..k {
        for j in (i + 1)..k {
            let d = metric.centroid_to_centroid(&centroids[i], &centroids[j])?;
            out.set(i, j, checked_distance(i, j, d)?);
        }
    }
    Ok(out)
}
