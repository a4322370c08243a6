//! Density clustering on precomputed distance matrices.
//!
//! `sieve-dbscan` clusters samples (for example trajectory frames) using only
//! pairwise dissimilarities. Dense neighbourhoods become clusters, outliers are
//! labeled noise, and samples sieved out of the expensive pass can be restored
//! afterwards in parallel.
//!
//! The primary public API is under [`cluster`], which provides:
//! - DBSCAN over a [`DistanceMatrix`] (strict-ε neighbourhoods, first-discovery border rule)
//! - sieve restoration with per-worker metric clones
//! - [`Metric`] implementations for coordinate data and for matrix-only data

#![forbid(unsafe_code)]

pub mod cluster;
pub mod error;
pub mod matrix;

pub use cluster::{
    Cluster, ClusterId, Clustering, Dbscan, EuclideanMetric, Medoid, MedoidMetric, Metric,
    Partition, SievePolicy, SieveStats, Status,
};
pub use error::{Error, Result};
pub use matrix::{CondensedMatrix, DenseMatrix, DistanceMatrix, Sieve};
