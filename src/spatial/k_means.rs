//! Lloyd k-means clustering.

use crate::geometry::*;
use crate::pbrt::*;
use crate::rng::RNG;

/// Seed for centroid initialization. Clustering must be reproducible from
/// run to run, so the generator sequence is fixed.
const K_MEANS_SEED: u64 = 0x2545f4914f6cdd1d;

/// Maximum number of Lloyd iterations before giving up on convergence.
const MAX_ITERATIONS: usize = 100;

/// Cluster the given points into at most `k` clusters with Lloyd's
/// algorithm, seeded k-means++ style. Returns the cluster centroids and the
/// per-point cluster label. When fewer points than clusters are given, one
/// cluster per point is produced.
///
/// * `points` - The points to cluster.
/// * `k`      - The requested number of clusters.
pub fn kmeans_lloyd(points: &[Point3f], k: usize) -> (Vec<Point3f>, Vec<usize>) {
    if points.is_empty() || k == 0 {
        return (Vec::new(), Vec::new());
    }
    let k = min(k, points.len());

    let mut centroids = init_plus_plus(points, k);
    let mut labels = vec![0_usize; points.len()];

    for _ in 0..MAX_ITERATIONS {
        // Assignment step.
        let mut changed = false;
        for (i, p) in points.iter().enumerate() {
            let label = nearest_centroid(&centroids, p);
            if labels[i] != label {
                labels[i] = label;
                changed = true;
            }
        }

        // Update step; empty clusters keep their previous centroid.
        let mut sums = vec![Point3f::ZERO; k];
        let mut counts = vec![0_usize; k];
        for (i, p) in points.iter().enumerate() {
            sums[labels[i]] += *p;
            counts[labels[i]] += 1;
        }
        for (j, sum) in sums.into_iter().enumerate() {
            if counts[j] > 0 {
                centroids[j] = sum / counts[j] as Float;
            }
        }

        if !changed {
            break;
        }
    }

    (centroids, labels)
}

/// Pick initial centroids with the k-means++ scheme: the first uniformly,
/// each following one with probability proportional to the squared distance
/// from the nearest centroid chosen so far.
fn init_plus_plus(points: &[Point3f], k: usize) -> Vec<Point3f> {
    let mut rng = RNG::new(K_MEANS_SEED);
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.bounded_uniform_u32(0, points.len() as u32) as usize]);

    let mut dist_squared: Vec<Float> = points
        .iter()
        .map(|p| p.distance_squared(centroids[0]))
        .collect();

    while centroids.len() < k {
        let total: Float = dist_squared.iter().sum();
        let next = if total > 0.0 {
            // Invert the cumulative distribution of squared distances.
            let mut target = rng.uniform_float() * total;
            let mut chosen = points.len() - 1;
            for (i, d2) in dist_squared.iter().enumerate() {
                if target < *d2 {
                    chosen = i;
                    break;
                }
                target -= d2;
            }
            chosen
        } else {
            // All remaining points coincide with a centroid.
            rng.bounded_uniform_u32(0, points.len() as u32) as usize
        };

        let c = points[next];
        centroids.push(c);
        for (i, p) in points.iter().enumerate() {
            dist_squared[i] = min(dist_squared[i], p.distance_squared(c));
        }
    }

    centroids
}

/// Returns the label of the centroid closest to the point.
fn nearest_centroid(centroids: &[Point3f], p: &Point3f) -> usize {
    let mut best = 0;
    let mut best_dist = centroids[0].distance_squared(*p);
    for (j, c) in centroids.iter().enumerate().skip(1) {
        let d2 = c.distance_squared(*p);
        if d2 < best_dist {
            best = j;
            best_dist = d2;
        }
    }
    best
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn two_blobs() -> Vec<Point3f> {
        let mut points = Vec::new();
        for i in 0..50 {
            let f = i as Float * 0.01;
            points.push(Point3f::new(f, f * 0.5, 0.0));
            points.push(Point3f::new(10.0 + f, 10.0 + f * 0.5, 0.0));
        }
        points
    }

    #[test]
    fn separates_well_separated_blobs() {
        let points = two_blobs();
        let (centroids, labels) = kmeans_lloyd(&points, 2);
        assert_eq!(centroids.len(), 2);
        assert_eq!(labels.len(), points.len());

        // All points of one blob share a label; the blobs get distinct ones.
        let first_blob_label = labels[0];
        let second_blob_label = labels[1];
        assert_ne!(first_blob_label, second_blob_label);
        for (i, label) in labels.iter().enumerate() {
            let expected = if i % 2 == 0 { first_blob_label } else { second_blob_label };
            assert_eq!(*label, expected);
        }
    }

    #[test]
    fn centroids_are_cluster_means() {
        let points = two_blobs();
        let (centroids, labels) = kmeans_lloyd(&points, 2);
        for j in 0..centroids.len() {
            let members: Vec<Point3f> = points
                .iter()
                .zip(labels.iter())
                .filter(|(_, l)| **l == j)
                .map(|(p, _)| *p)
                .collect();
            let mut mean = Point3f::ZERO;
            for p in members.iter() {
                mean += *p;
            }
            let mean = mean / members.len() as Float;
            assert!(mean.distance(centroids[j]) < 1e-3);
        }
    }

    #[test]
    fn caps_clusters_at_point_count() {
        let points = vec![Point3f::ZERO, Point3f::new(1.0, 0.0, 0.0)];
        let (centroids, labels) = kmeans_lloyd(&points, 8);
        assert_eq!(centroids.len(), 2);
        assert_eq!(labels.len(), 2);
    }

    #[test]
    fn deterministic_across_runs() {
        let points = two_blobs();
        let (c1, l1) = kmeans_lloyd(&points, 4);
        let (c2, l2) = kmeans_lloyd(&points, 4);
        assert_eq!(l1, l2);
        for (a, b) in c1.iter().zip(c2.iter()) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn empty_input_yields_no_clusters() {
        let (centroids, labels) = kmeans_lloyd(&[], 4);
        assert!(centroids.is_empty());
        assert!(labels.is_empty());
    }
}
