//! Pairwise term similarity over the candidate window.
//!
//! Similarity is the Jaccard overlap of two terms' segment-occurrence sets.
//! The same pass also produces the distance matrix consumed by clustering:
//! a higher similarity means a lower distance.

use crate::accumulate::TermStats;
use crate::error::{Error, Result};
use crate::types::SegmentId;
use indexmap::IndexMap;
use std::collections::HashSet;
use tracing::debug;

/// Epsilon keeping the distance transform finite at zero similarity.
const DISTANCE_EPSILON: f64 = 0.0001;

/// Jaccard similarity of two segment-occurrence sets.
pub fn jaccard(a: &HashSet<&SegmentId>, b: &HashSet<&SegmentId>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    intersection as f64 / union as f64
}

/// Convert a similarity value into a clustering distance.
///
/// Identical occurrence sets map to distance zero; everything else to
/// `1 / (similarity + ε)` so that dissimilar terms land far apart.
pub fn distance_from_similarity(similarity: f64) -> f64 {
    if similarity == 1.0 {
        0.0
    } else {
        1.0 / (similarity + DISTANCE_EPSILON)
    }
}

/// Output of one similarity pass over the candidate window.
#[derive(Debug, Clone, Default)]
pub struct SimilarityData {
    /// Per-term similarity lists, descending, truncated to the retention
    /// cap. Self-pairs and zero-similarity pairs are kept; filtering for
    /// presentation happens at query time.
    pub lists: IndexMap<String, Vec<(String, f64)>>,
    /// Square distance matrix; row/column order equals candidate order.
    pub distance_matrix: Vec<Vec<f64>>,
}

/// Compute similarities and distances over the candidate window.
///
/// `candidates` is an ordered prefix of the ranked term list; `keep` caps
/// the length of each retained similarity list.
///
/// Returns `Ok(None)` when nothing was ever accumulated (explicit no-op,
/// not an error). A candidate without recorded occurrences is a fatal
/// precondition violation, reported as [`Error::UnknownCandidate`].
pub fn compute_similarities(
    stats: &TermStats,
    candidates: &[String],
    keep: usize,
) -> Result<Option<SimilarityData>> {
    if stats.is_empty() {
        return Ok(None);
    }

    let sets: Vec<HashSet<&SegmentId>> = candidates
        .iter()
        .map(|term| {
            stats
                .segment_set(term)
                .ok_or_else(|| Error::UnknownCandidate(term.clone()))
        })
        .collect::<Result<_>>()?;

    let mut lists = IndexMap::with_capacity(candidates.len());
    let mut distance_matrix = Vec::with_capacity(candidates.len());

    for (i, term) in candidates.iter().enumerate() {
        let mut list: Vec<(String, f64)> = Vec::with_capacity(candidates.len());
        let mut row = Vec::with_capacity(candidates.len());

        for (j, other) in candidates.iter().enumerate() {
            let similarity = jaccard(&sets[i], &sets[j]);
            row.push(distance_from_similarity(similarity));
            list.push((other.clone(), similarity));
        }

        list.sort_by(|a, b| b.1.total_cmp(&a.1));
        list.truncate(keep);

        lists.insert(term.clone(), list);
        distance_matrix.push(row);
    }

    debug!(candidates = candidates.len(), "computed term similarities");

    Ok(Some(SimilarityData {
        lists,
        distance_matrix,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(part: u32) -> SegmentId {
        SegmentId::new("file", part)
    }

    /// Candidate set with known occurrence sets: a:{1,2}, b:{2,3}, c:{1,2,3}.
    fn abc_stats() -> TermStats {
        let mut stats = TermStats::new(10);
        stats.ingest_unigrams(&["a", "c"], &seg(1));
        stats.ingest_unigrams(&["a", "b", "c"], &seg(2));
        stats.ingest_unigrams(&["b", "c"], &seg(3));
        stats
    }

    #[test]
    fn test_jaccard_self_is_one() {
        let stats = abc_stats();
        for term in ["a", "b", "c"] {
            let set = stats.segment_set(term).unwrap();
            assert_eq!(jaccard(&set, &set), 1.0);
        }
    }

    #[test]
    fn test_jaccard_symmetric() {
        let stats = abc_stats();
        let a = stats.segment_set("a").unwrap();
        let b = stats.segment_set("b").unwrap();
        assert_eq!(jaccard(&a, &b), jaccard(&b, &a));
    }

    #[test]
    fn test_distance_transform() {
        assert_eq!(distance_from_similarity(1.0), 0.0);
        assert!((distance_from_similarity(0.5) - 1.0 / 0.5001).abs() < 1e-12);
        // Zero similarity stays finite.
        assert!((distance_from_similarity(0.0) - 10000.0).abs() < 1e-9);
    }

    #[test]
    fn test_three_by_three_matrix() {
        let stats = abc_stats();
        let candidates: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();

        let data = compute_similarities(&stats, &candidates, 6)
            .unwrap()
            .unwrap();

        // Hand-computed: j(a,b) = 1/3, j(a,c) = 2/3, j(b,c) = 2/3.
        let third = 1.0 / (1.0 / 3.0 + 0.0001);
        let two_thirds = 1.0 / (2.0 / 3.0 + 0.0001);

        let m = &data.distance_matrix;
        assert_eq!(m.len(), 3);
        for (i, row) in m.iter().enumerate() {
            assert_eq!(row[i], 0.0);
        }
        assert!((m[0][1] - third).abs() < 1e-9);
        assert!((m[1][0] - third).abs() < 1e-9);
        assert!((m[0][2] - two_thirds).abs() < 1e-9);
        assert!((m[1][2] - two_thirds).abs() < 1e-9);
    }

    #[test]
    fn test_similarity_lists_sorted_and_capped() {
        let stats = abc_stats();
        let candidates: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();

        let data = compute_similarities(&stats, &candidates, 2)
            .unwrap()
            .unwrap();

        let list = &data.lists["a"];
        assert_eq!(list.len(), 2);
        // Self-pair ranks first and is retained.
        assert_eq!(list[0], ("a".to_string(), 1.0));
        assert!(list[0].1 >= list[1].1);
    }

    #[test]
    fn test_empty_accumulator_is_noop() {
        let stats = TermStats::new(10);
        let result = compute_similarities(&stats, &[], 4).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_unknown_candidate_is_fatal() {
        let stats = abc_stats();
        let candidates = vec!["a".to_string(), "unbekannt".to_string()];
        assert!(matches!(
            compute_similarities(&stats, &candidates, 4),
            Err(Error::UnknownCandidate(term)) if term == "unbekannt"
        ));
    }
}
