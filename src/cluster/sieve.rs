//! Restoration of sieved samples.
//!
//! Sieving clusters only a subset of samples. Afterwards every ignored sample
//! is offered to the cluster whose centroid is nearest. The decision for each
//! sample only reads finalized clusters, so it runs on a worker pool with one
//! metric clone per worker. Appending to clusters happens afterwards, on the
//! calling thread, in ascending sample order.
//!
//! Rejected samples keep [`Status::Unassigned`]: noise is a verdict of the
//! density pass only. They are listed by [`Partition::discarded`].

use log::info;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

use super::dbscan::{Dbscan, Partition, Status};
use super::metric::Metric;
use super::node::{Cluster, ClusterId};
use super::util::checked_distance;
use crate::error::{Error, Result};
use crate::matrix::DistanceMatrix;

/// When a sieved sample may join its nearest cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SievePolicy {
    /// Always join the cluster with the nearest centroid. Faster, less accurate.
    #[default]
    ToCentroid,
    /// Join only if the nearest centroid is within epsilon, or some member of
    /// that cluster is. Otherwise the sample is discarded.
    ToFrame,
}

/// Counters reported by [`Dbscan::restore_sieved`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SieveStats {
    /// Sieved samples considered.
    pub total: usize,
    /// Samples appended to a cluster.
    pub restored: usize,
    /// Samples rejected by the policy (or because no cluster exists).
    pub discarded: usize,
}

impl Dbscan {
    /// Assign every ignored sample of `matrix` to a cluster of `partition`, or discard it.
    ///
    /// Centroids must be current; they are read as-is. Samples already in a
    /// cluster or already discarded are skipped, so a repeated call on the same
    /// partition does nothing. With no clusters at all, every sieved sample is
    /// discarded. Discarded samples stay [`Status::Unassigned`].
    ///
    /// `workers` threads run the decision phase, each with its own clone of `metric`.
    pub fn restore_sieved<M, D>(
        &self,
        partition: &mut Partition<D::Centroid>,
        matrix: &M,
        metric: &D,
        workers: usize,
    ) -> Result<SieveStats>
    where
        M: DistanceMatrix + ?Sized,
        D: Metric,
    {
        self.validate()?;
        if workers == 0 {
            return Err(Error::InvalidParameter {
                name: "workers",
                message: "must be at least 1",
            });
        }
        let n = partition.n_samples();
        for found in [matrix.n_samples(), metric.n_samples()] {
            if found != n {
                return Err(Error::SizeMismatch { expected: n, found });
            }
        }

        let sieved: Vec<usize> = (0..n)
            .filter(|&i| {
                matrix.is_ignored(i)
                    && partition.status[i] != Status::InCluster
                    && !partition.discarded[i]
            })
            .collect();
        match self.sieve_policy() {
            SievePolicy::ToCentroid => {
                info!("restoring sieved samples by closeness to existing centroids")
            }
            SievePolicy::ToFrame => info!(
                "restoring sieved samples if within {:.3} of a sample in the nearest cluster",
                self.epsilon()
            ),
        }
        if sieved.is_empty() {
            return Ok(SieveStats::default());
        }

        let decisions = self.decide_all(&partition.clusters, &sieved, metric, workers)?;

        let mut stats = SieveStats {
            total: sieved.len(),
            ..SieveStats::default()
        };
        for (&sample, target) in sieved.iter().zip(decisions) {
            match target {
                Some(id) => {
                    partition.clusters[id.0].push(sample);
                    partition.status[sample] = Status::InCluster;
                    stats.restored += 1;
                }
                None => {
                    partition.discarded[sample] = true;
                    stats.discarded += 1;
                }
            }
        }
        info!(
            "{} of {} sieved samples were discarded",
            stats.discarded, stats.total
        );
        Ok(stats)
    }

    /// Decision phase: one target (or `None`) per entry of `sieved`, same order.
    fn decide_all<D: Metric>(
        &self,
        clusters: &[Cluster<D::Centroid>],
        sieved: &[usize],
        metric: &D,
        workers: usize,
    ) -> Result<Vec<Option<ClusterId>>> {
        let centroids = clusters
            .iter()
            .enumerate()
            .map(|(i, c)| c.centroid().ok_or(Error::MissingCentroid { cluster: i }))
            .collect::<Result<Vec<_>>>()?;

        let chunk = sieved.len().div_ceil(workers);
        let chunks: Vec<&[usize]> = sieved.chunks(chunk).collect();
        let metrics: Vec<D> = (0..chunks.len()).map(|_| metric.clone()).collect();

        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("sieve-worker-{i}"))
            .build()?;
        info!(
            "parallelizing restoration of {} samples with {} workers",
            sieved.len(),
            workers
        );

        let per_chunk = pool.install(|| {
            chunks
                .into_par_iter()
                .zip(metrics)
                .map(|(samples, mut metric)| {
                    samples
                        .iter()
                        .map(|&f| self.decide(f, clusters, &centroids, &mut metric))
                        .collect::<Result<Vec<_>>>()
                })
                .collect::<Result<Vec<_>>>()
        })?;
        Ok(per_chunk.into_iter().flatten().collect())
    }

    /// Pick the nearest cluster for sample `f` and apply the policy.
    fn decide<D: Metric>(
        &self,
        f: usize,
        clusters: &[Cluster<D::Centroid>],
        centroids: &[&D::Centroid],
        metric: &mut D,
    ) -> Result<Option<ClusterId>> {
        let mut nearest: Option<(usize, f32)> = None;
        for (i, centroid) in centroids.iter().enumerate() {
            let d = checked_distance(f, i, metric.sample_to_centroid(f, centroid)?)?;
            if nearest.map_or(true, |(_, best)| d < best) {
                nearest = Some((i, d));
            }
        }
        let Some((idx, min_dist)) = nearest else {
            return Ok(None);
        };

        let accept = match self.sieve_policy() {
            SievePolicy::ToCentroid => true,
            SievePolicy::ToFrame => {
                min_dist < self.epsilon()
                    || near_any_member(f, clusters[idx].members(), self.epsilon(), metric)?
            }
        };
        Ok(accept.then_some(ClusterId(idx)))
    }
}

/// Whether any of `members` lies strictly within `epsilon` of `f`.
fn near_any_member<D: Metric>(f: usize, members: &[usize], epsilon: f32, metric: &mut D) -> Result<bool> {
    for &m in members {
        if checked_distance(f, m, metric.sample_distance(f, m)?)? < epsilon {
            return Ok(true);
        }
    }
    Ok(false)
}
