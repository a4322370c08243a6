use thiserror::Error;

/// Errors returned by clustering and restoration in this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Input has no samples.
    #[error("empty input")]
    EmptyInput,

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Human-readable explanation.
        message: &'static str,
    },

    /// A distance computation produced a value that is not a finite, non-negative number.
    #[error("invalid distance between {i} and {j}: {value}")]
    InvalidDistance {
        /// First sample (or cluster) index.
        i: usize,
        /// Second sample (or cluster) index.
        j: usize,
        /// Offending value.
        value: f32,
    },

    /// A sample index is outside the valid range.
    #[error("index {index} out of bounds for {len} samples")]
    IndexOutOfBounds {
        /// Requested index.
        index: usize,
        /// Number of samples.
        len: usize,
    },

    /// Two collaborators disagree on the number of samples.
    #[error("sample count mismatch: expected {expected}, found {found}")]
    SizeMismatch {
        /// Expected sample count.
        expected: usize,
        /// Found sample count.
        found: usize,
    },

    /// A cluster has never had its centroid computed.
    #[error("cluster {cluster} has no centroid")]
    MissingCentroid {
        /// Cluster position.
        cluster: usize,
    },

    /// The restoration worker pool could not be started.
    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;
