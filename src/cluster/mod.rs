//! Density clustering over precomputed distances.
//!
//! ## DBSCAN
//!
//! Density-based clustering that discovers non-convex clusters and identifies
//! outliers (noise points) without knowing the number of clusters in advance.
//! [`Dbscan`] reads neighbourhoods from a [`DistanceMatrix`](crate::DistanceMatrix)
//! and asks a [`Metric`] only for centroids once the partition is final.
//!
//! ## Sieving
//!
//! For large inputs (e.g. long trajectories) the O(n²) density pass can be run
//! on a subset. Rows flagged as ignored are skipped, then
//! [`Dbscan::restore_sieved`] hands each of them to its nearest cluster:
//!
//! - [`SievePolicy::ToCentroid`]: always join the nearest centroid.
//! - [`SievePolicy::ToFrame`]: join only if within epsilon of that centroid
//!   or of one of its members; otherwise it is discarded and stays unassigned.
//!
//! ## Usage
//!
//! ```rust
//! use sieve_dbscan::{Dbscan, DenseMatrix, EuclideanMetric, SievePolicy};
//!
//! let data: Vec<Vec<f32>> = vec![
//!     vec![0.0, 0.0],
//!     vec![0.1, 0.1],
//!     vec![0.2, 0.0],
//!     vec![10.0, 10.0],
//!     vec![10.1, 10.1],
//!     vec![10.2, 10.0],
//! ];
//!
//! let mut matrix = DenseMatrix::from_points(&data).unwrap();
//! matrix.set_ignored(1, true).unwrap();
//! matrix.set_ignored(4, true).unwrap();
//! let mut metric = EuclideanMetric::new(data).unwrap();
//!
//! let dbscan = Dbscan::new(0.5, 1).with_sieve_policy(SievePolicy::ToFrame);
//! let mut partition = dbscan.cluster(&matrix, &mut metric).unwrap();
//! assert_eq!(partition.n_clusters(), 2);
//!
//! let stats = dbscan.restore_sieved(&mut partition, &matrix, &metric, 2).unwrap();
//! assert_eq!(stats.restored, 2);
//! assert_eq!(partition.labels()[1], partition.labels()[0]);
//! ```

mod dbscan;
mod metric;
mod node;
mod sieve;
mod traits;
pub(crate) mod util;

pub use dbscan::{Dbscan, Partition, Status};
pub use metric::{EuclideanMetric, Medoid, MedoidMetric, Metric};
pub use node::{Cluster, ClusterId};
pub use sieve::{SievePolicy, SieveStats};
pub use traits::Clustering;
