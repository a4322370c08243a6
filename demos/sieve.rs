//! DBSCAN on a sieved 1D "trajectory", then restoration with both policies.

use sieve_dbscan::{Dbscan, DenseMatrix, EuclideanMetric, Sieve, SievePolicy};

fn main() {
    // Two dwell regions plus a few excursions.
    let xs: Vec<f32> = (0..20)
        .map(|i| i as f32 * 0.05)
        .chain((0..20).map(|i| 5.0 + i as f32 * 0.05))
        .chain([2.5, 8.0, 12.0])
        .collect();
    let data: Vec<Vec<f32>> = xs.iter().map(|&x| vec![x]).collect();

    let mut matrix = DenseMatrix::from_points(&data).unwrap();
    matrix.apply_sieve(Sieve::Stride(3)).unwrap();
    println!(
        "clustering {} of {} samples",
        data.len() - matrix.n_ignored(),
        data.len()
    );

    for policy in [SievePolicy::ToCentroid, SievePolicy::ToFrame] {
        let mut metric = EuclideanMetric::new(data.clone()).unwrap();
        let dbscan = Dbscan::new(0.2, 2).with_sieve_policy(policy);
        let mut partition = dbscan.cluster(&matrix, &mut metric).unwrap();
        let stats = dbscan
            .restore_sieved(&mut partition, &matrix, &metric, 4)
            .unwrap();

        println!("\n=== {dbscan} ===");
        println!(
            "restored {} / discarded {} of {} sieved samples",
            stats.restored, stats.discarded, stats.total
        );
        for (i, cluster) in partition.clusters().iter().enumerate() {
            println!("  cluster {i}: {} samples", cluster.len());
        }
        println!("  noise: {:?}", partition.noise());
        println!("  discarded: {:?}", partition.discarded());
    }
}
