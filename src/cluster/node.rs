//! Cluster containers.

use std::fmt;

use super::metric::Metric;
use crate::error::Result;

/// Stable handle to a cluster inside a [`Partition`](super::Partition).
///
/// Handles are positions in discovery order. They stay valid as clusters grow;
/// only [`Partition::sort_by_population`](super::Partition::sort_by_population)
/// renumbers them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClusterId(pub usize);

impl ClusterId {
    /// Position of the cluster.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cluster {}", self.0)
    }
}

/// A growing set of sample indices with a cached centroid.
///
/// The centroid is *not* invalidated when members are appended; call
/// [`recompute_centroid`](Self::recompute_centroid) before relying on it.
#[derive(Debug, Clone)]
pub struct Cluster<C> {
    members: Vec<usize>,
    centroid: Option<C>,
}

impl<C> Cluster<C> {
    /// Build from member indices; they are sorted and deduplicated.
    pub fn new(mut members: Vec<usize>) -> Self {
        members.sort_unstable();
        members.dedup();
        Self {
            members,
            centroid: None,
        }
    }

    /// Member indices. Sorted at construction; later appends go on the end.
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// `true` if the cluster has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Member at position `idx`.
    pub fn member(&self, idx: usize) -> Option<usize> {
        self.members.get(idx).copied()
    }

    /// Whether `sample` is a member (linear scan).
    pub fn contains(&self, sample: usize) -> bool {
        self.members.contains(&sample)
    }

    /// Last computed centroid, if any.
    pub fn centroid(&self) -> Option<&C> {
        self.centroid.as_ref()
    }

    /// Append a member. Does not touch the centroid.
    pub fn push(&mut self, sample: usize) {
        self.members.push(sample);
    }

    /// Recompute the centroid from the current members.
    pub fn recompute_centroid<M>(&mut self, metric: &mut M) -> Result<&C>
    where
        M: Metric<Centroid = C>,
    {
        let c = metric.centroid(&self.members)?;
        Ok(&*self.centroid.insert(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::EuclideanMetric;

    #[test]
    fn new_sorts_and_dedups() {
        let c: Cluster<()> = Cluster::new(vec![5, 1, 3, 1, 5]);
        assert_eq!(c.members(), &[1, 3, 5]);
        assert_eq!(c.len(), 3);
        assert_eq!(c.member(1), Some(3));
        assert_eq!(c.member(3), None);
    }

    #[test]
    fn centroid_is_stale_until_recomputed() {
        let mut metric = EuclideanMetric::new(vec![vec![0.0], vec![2.0], vec![10.0]]).unwrap();
        let mut c = Cluster::new(vec![0, 1]);
        assert!(c.centroid().is_none());
        c.recompute_centroid(&mut metric).unwrap();
        assert_eq!(c.centroid(), Some(&vec![1.0]));

        c.push(2);
        assert!(c.contains(2));
        assert_eq!(c.centroid(), Some(&vec![1.0]));
        c.recompute_centroid(&mut metric).unwrap();
        assert_eq!(c.centroid(), Some(&vec![4.0]));
    }
}
