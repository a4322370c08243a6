use std::sync::Arc;

use sieve_dbscan::{
    Clustering, Dbscan, DenseMatrix, DistanceMatrix, Error, Medoid, MedoidMetric, Metric, Result,
    SievePolicy, Status,
};

/// Linear chain: d(i, j) = |i - j|.
fn chain(n: usize) -> DenseMatrix {
    DenseMatrix::from_fn(n, |i, j| (i as f32 - j as f32).abs()).unwrap()
}

#[test]
fn linear_chain_forms_one_cluster() {
    let matrix = Arc::new(chain(6));
    let mut metric = MedoidMetric::new(Arc::clone(&matrix));

    let p = Dbscan::new(1.5, 2).cluster(&*matrix, &mut metric).unwrap();
    assert_eq!(p.n_clusters(), 1);
    assert_eq!(p.clusters()[0].members(), &[0, 1, 2, 3, 4, 5]);
    assert_eq!(p.n_noise(), 0);
}

#[test]
fn isolated_sample_is_noise_even_with_min_points_one() {
    let matrix = Arc::new(DenseMatrix::from_fn(3, |i, j| if i + j == 1 { 0.5 } else { 9.0 }).unwrap());
    let mut metric = MedoidMetric::new(Arc::clone(&matrix));

    let p = Dbscan::new(1.0, 1).cluster(&*matrix, &mut metric).unwrap();
    assert_eq!(p.status(), &[Status::InCluster, Status::InCluster, Status::Noise]);
}

#[test]
fn separated_groups_give_one_cluster_each() {
    // Groups {0..4}, {4..9}, {9..12}: 0.5 inside a group, 3.0 across.
    let group = |i: usize| match i {
        0..=3 => 0,
        4..=8 => 1,
        _ => 2,
    };
    let matrix = Arc::new(
        DenseMatrix::from_fn(12, |i, j| if group(i) == group(j) { 0.5 } else { 3.0 }).unwrap(),
    );
    let mut metric = MedoidMetric::new(Arc::clone(&matrix));

    let p = Dbscan::new(1.0, 2).cluster(&*matrix, &mut metric).unwrap();
    assert_eq!(p.n_clusters(), 3);
    assert_eq!(p.clusters()[0].members(), &[0, 1, 2, 3]);
    assert_eq!(p.clusters()[1].members(), &[4, 5, 6, 7, 8]);
    assert_eq!(p.clusters()[2].members(), &[9, 10, 11]);
    assert_eq!(p.n_noise(), 0);
    assert_eq!(p.cluster_distances().get(0, 2), 3.0);
}

#[test]
fn min_points_above_group_size_gives_noise() {
    let matrix = Arc::new(chain(4));
    let mut metric = MedoidMetric::new(Arc::clone(&matrix));

    let labels = Dbscan::new(1.5, 3).fit_predict(&*matrix, &mut metric).unwrap();
    assert_eq!(labels, vec![None; 4]);
}

#[test]
fn to_frame_rejects_sample_far_from_everything() {
    let xs = [0.0f32, 0.1, 0.2, 50.0];
    let mut matrix = DenseMatrix::from_fn(4, |i, j| (xs[i] - xs[j]).abs()).unwrap();
    matrix.set_ignored(3, true).unwrap();
    let matrix = Arc::new(matrix);
    let mut metric = MedoidMetric::new(Arc::clone(&matrix));
    let dbscan = Dbscan::new(0.15, 1).with_sieve_policy(SievePolicy::ToFrame);

    let mut p = dbscan.cluster(&*matrix, &mut metric).unwrap();
    let stats = dbscan.restore_sieved(&mut p, &*matrix, &metric, 2).unwrap();
    assert_eq!(stats.discarded, 1);
    assert!(p.clusters().iter().all(|c| !c.contains(3)));
    assert_eq!(p.status()[3], Status::Unassigned);
    assert_eq!(p.discarded(), vec![3]);
    assert!(p.noise().is_empty());
}

/// Distances computed on the fly: d(i, j) = |i - j|.
struct Banded {
    n: usize,
    ignored: Vec<bool>,
}

impl DistanceMatrix for Banded {
    fn n_samples(&self) -> usize {
        self.n
    }

    fn distance(&self, i: usize, j: usize) -> f32 {
        i.abs_diff(j) as f32
    }

    fn is_ignored(&self, i: usize) -> bool {
        self.ignored[i]
    }
}

/// Medoid-style metric that fails on one specific sample.
#[derive(Clone)]
struct Faulty {
    n: usize,
    bad: usize,
}

impl Metric for Faulty {
    type Centroid = Medoid;

    fn n_samples(&self) -> usize {
        self.n
    }

    fn sample_distance(&mut self, i: usize, j: usize) -> Result<f32> {
        if i == self.bad || j == self.bad {
            return Ok(f32::NAN);
        }
        Ok(i.abs_diff(j) as f32)
    }

    fn sample_to_centroid(&mut self, i: usize, c: &Medoid) -> Result<f32> {
        self.sample_distance(i, c.sample)
    }

    fn centroid_to_centroid(&mut self, a: &Medoid, b: &Medoid) -> Result<f32> {
        self.sample_distance(a.sample, b.sample)
    }

    fn centroid(&mut self, members: &[usize]) -> Result<Medoid> {
        members
            .get(members.len() / 2)
            .map(|&sample| Medoid { sample })
            .ok_or(Error::EmptyInput)
    }
}

#[test]
fn metric_failure_during_restoration_is_fatal() {
    let mut ignored = vec![false; 6];
    ignored[5] = true;
    let matrix = Banded { n: 6, ignored };
    let mut metric = Faulty { n: 6, bad: 5 };
    let dbscan = Dbscan::new(1.5, 1);

    let mut p = dbscan.cluster(&matrix, &mut metric).unwrap();
    assert_eq!(p.n_clusters(), 1);
    let r = dbscan.restore_sieved(&mut p, &matrix, &metric, 2);
    assert!(matches!(r, Err(Error::InvalidDistance { i: 5, .. })));
}

#[test]
fn metric_failure_during_centroid_distances_is_fatal() {
    // Clusters {0, 1, 2} and {4, 5, 6}; the second medoid is sample 5, which yields NaN.
    let mut ignored = vec![false; 7];
    ignored[3] = true;
    let matrix = Banded { n: 7, ignored };
    let mut metric = Faulty { n: 7, bad: 5 };

    let r = Dbscan::new(1.5, 1).cluster(&matrix, &mut metric);
    assert!(matches!(r, Err(Error::InvalidDistance { .. })));
}
