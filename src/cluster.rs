//! Topic clustering over the candidate window's distance matrix.
//!
//! The clustering routine itself is pluggable; the default is Lloyd's
//! k-means over the row-normalized distance matrix. Label assignments are
//! merged back into the ranked records without touching any other state.

use crate::error::{Error, Result};
use crate::types::TermRecord;
use std::collections::HashMap;
use tracing::debug;

/// A clustering routine: rows of `matrix` are the points to cluster.
///
/// Implementations return one label in `[0, k)` per row. They may be
/// randomized; callers must not rely on identical labels across runs.
pub trait ClusteringStrategy {
    /// Cluster the matrix rows into at most `k` groups.
    fn fit(&self, matrix: &[Vec<f64>], k: usize) -> Result<Vec<u32>>;
}

/// Compute squared L2 (Euclidean) distance between two rows.
fn l2_squared(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "rows must have same dimension");
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}

/// Find the index of the nearest centroid to a given row.
fn nearest_centroid(row: &[f64], centroids: &[Vec<f64>]) -> usize {
    centroids
        .iter()
        .enumerate()
        .map(|(i, c)| (i, l2_squared(row, c)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Normalize each matrix row to unit Euclidean length.
///
/// A zero-norm row is left unchanged.
pub fn normalize_rows(matrix: &[Vec<f64>]) -> Vec<Vec<f64>> {
    matrix
        .iter()
        .map(|row| {
            let norm: f64 = row.iter().map(|x| x.powi(2)).sum::<f64>().sqrt();
            if norm == 0.0 {
                row.clone()
            } else {
                row.iter().map(|x| x / norm).collect()
            }
        })
        .collect()
}

/// K-means clustering with Lloyd's algorithm.
///
/// Centroids are seeded from `k` randomly sampled rows, so repeated runs on
/// identical input may produce different label assignments.
#[derive(Debug, Clone)]
pub struct KMeansStrategy {
    /// Maximum number of Lloyd iterations.
    pub max_iterations: usize,
}

impl Default for KMeansStrategy {
    fn default() -> Self {
        Self { max_iterations: 10 }
    }
}

impl ClusteringStrategy for KMeansStrategy {
    fn fit(&self, matrix: &[Vec<f64>], k: usize) -> Result<Vec<u32>> {
        if matrix.is_empty() {
            return Ok(Vec::new());
        }
        if k == 0 {
            return Err(Error::Clustering(
                "cluster count must be positive".to_string(),
            ));
        }

        let dim = matrix[0].len();
        let k = k.min(matrix.len()); // Can't have more clusters than points

        let mut rng = rand::thread_rng();
        let mut centroids: Vec<Vec<f64>> = rand::seq::index::sample(&mut rng, matrix.len(), k)
            .iter()
            .map(|i| matrix[i].clone())
            .collect();

        for _ in 0..self.max_iterations {
            // Assign rows to their nearest centroid
            let mut clusters: Vec<Vec<usize>> = vec![Vec::new(); k];
            for (i, row) in matrix.iter().enumerate() {
                clusters[nearest_centroid(row, &centroids)].push(i);
            }

            // Update centroids
            let mut new_centroids = Vec::with_capacity(k);
            for (cluster_idx, cluster) in clusters.iter().enumerate() {
                if cluster.is_empty() {
                    // Keep old centroid if cluster is empty
                    new_centroids.push(centroids[cluster_idx].clone());
                } else {
                    let mut mean = vec![0.0f64; dim];
                    for &row_idx in cluster {
                        for (j, val) in matrix[row_idx].iter().enumerate() {
                            mean[j] += val;
                        }
                    }
                    let n = cluster.len() as f64;
                    for val in &mut mean {
                        *val /= n;
                    }
                    new_centroids.push(mean);
                }
            }

            let converged = centroids
                .iter()
                .zip(new_centroids.iter())
                .all(|(old, new)| l2_squared(old, new) <= 1e-9);

            centroids = new_centroids;

            if converged {
                break;
            }
        }

        Ok(matrix
            .iter()
            .map(|row| nearest_centroid(row, &centroids) as u32)
            .collect())
    }
}

/// Cluster the candidate window and merge labels into the ranked records.
///
/// The distance matrix rows must align with `candidates`. Rows are
/// normalized before clustering. Terms outside the candidate window keep
/// their previous (unassigned) label. Any strategy failure, or a strategy
/// returning the wrong number of labels, is fatal.
pub fn assign_clusters(
    records: &mut [TermRecord],
    candidates: &[String],
    distance_matrix: &[Vec<f64>],
    k: usize,
    strategy: &dyn ClusteringStrategy,
) -> Result<()> {
    if candidates.len() != distance_matrix.len() {
        return Err(Error::Clustering(format!(
            "distance matrix has {} rows for {} candidates",
            distance_matrix.len(),
            candidates.len()
        )));
    }

    let normalized = normalize_rows(distance_matrix);
    let labels = strategy.fit(&normalized, k)?;

    if labels.len() != candidates.len() {
        return Err(Error::Clustering(format!(
            "strategy returned {} labels for {} candidates",
            labels.len(),
            candidates.len()
        )));
    }

    let label_by_term: HashMap<&str, u32> = candidates
        .iter()
        .map(|t| t.as_str())
        .zip(labels.iter().copied())
        .collect();

    for record in records.iter_mut() {
        if let Some(&label) = label_by_term.get(record.term.as_str()) {
            record.cluster = Some(label);
        }
    }

    debug!(candidates = candidates.len(), k, "assigned cluster labels");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TermRecord;

    #[test]
    fn test_normalize_rows_unit_length() {
        let matrix = vec![vec![3.0, 4.0]];
        let normalized = normalize_rows(&matrix);
        assert!((normalized[0][0] - 0.6).abs() < 1e-12);
        assert!((normalized[0][1] - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_zero_row_unchanged() {
        let matrix = vec![vec![0.0, 0.0], vec![1.0, 0.0]];
        let normalized = normalize_rows(&matrix);
        assert_eq!(normalized[0], vec![0.0, 0.0]);
        assert_eq!(normalized[1], vec![1.0, 0.0]);
    }

    #[test]
    fn test_kmeans_labels_in_range() {
        let matrix = vec![
            vec![0.0, 0.1],
            vec![0.1, 0.0],
            vec![10.0, 10.0],
            vec![10.1, 9.9],
        ];
        let strategy = KMeansStrategy::default();
        let labels = strategy.fit(&matrix, 2).unwrap();

        assert_eq!(labels.len(), 4);
        assert!(labels.iter().all(|&l| l < 2));
        // Structural property only: nearby rows share a label.
        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[2], labels[3]);
        assert_ne!(labels[0], labels[2]);
    }

    #[test]
    fn test_kmeans_clamps_cluster_count() {
        let matrix = vec![vec![0.0], vec![1.0]];
        let strategy = KMeansStrategy::default();
        let labels = strategy.fit(&matrix, 6).unwrap();
        assert_eq!(labels.len(), 2);
        assert!(labels.iter().all(|&l| l < 2));
    }

    #[test]
    fn test_kmeans_rejects_zero_k() {
        let matrix = vec![vec![0.0]];
        let strategy = KMeansStrategy::default();
        assert!(matches!(
            strategy.fit(&matrix, 0),
            Err(Error::Clustering(_))
        ));
    }

    #[test]
    fn test_kmeans_empty_matrix() {
        let strategy = KMeansStrategy::default();
        assert!(strategy.fit(&[], 3).unwrap().is_empty());
    }

    #[test]
    fn test_assign_clusters_merges_labels() {
        let mut records = vec![
            TermRecord::new("a", 2, 1.0, 0.2),
            TermRecord::new("b", 1, 1.0, 0.1),
            TermRecord::new("outside", 1, 1.0, 0.05),
        ];
        let candidates = vec!["a".to_string(), "b".to_string()];
        let matrix = vec![vec![0.0, 5.0], vec![5.0, 0.0]];

        assign_clusters(
            &mut records,
            &candidates,
            &matrix,
            2,
            &KMeansStrategy::default(),
        )
        .unwrap();

        assert!(records[0].cluster.is_some());
        assert!(records[1].cluster.is_some());
        assert!(records[0].cluster.unwrap() < 2);
        // Non-candidates keep the unassigned sentinel.
        assert!(records[2].cluster.is_none());
    }

    #[test]
    fn test_assign_clusters_row_mismatch_is_fatal() {
        let mut records = vec![TermRecord::new("a", 1, 1.0, 0.1)];
        let candidates = vec!["a".to_string(), "b".to_string()];
        let matrix = vec![vec![0.0]];

        assert!(matches!(
            assign_clusters(
                &mut records,
                &candidates,
                &matrix,
                2,
                &KMeansStrategy::default()
            ),
            Err(Error::Clustering(_))
        ));
    }
}
