//! Presentation views over finalized records.
//!
//! These functions shape ranked data for the keyword-cloud and similarity
//! pages: clustered keyword groups, filtered similar-term lists with display
//! metadata, and bigram prefixes.

use crate::types::{BigramRecord, TermRecord};
use std::collections::BTreeMap;

/// One similar-term entry as served to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarTerm {
    /// 1-based position within the result list.
    pub position: usize,
    /// Squared Jaccard similarity as a percentage, for visual emphasis.
    pub score: f64,
    /// The related term.
    pub term: String,
    /// Decorative HSL colour assigned cyclically per result.
    pub color: String,
}

/// Group the top-ranked terms into cluster groups.
///
/// The ranked list is truncated to `max_terms` before grouping. Groups come
/// back in cluster-id descending order with unassigned terms last; inside a
/// group terms are score-descending and truncated to `max_per_cluster`.
pub fn cluster_groups(
    records: &[TermRecord],
    max_terms: usize,
    max_per_cluster: usize,
) -> Vec<Vec<TermRecord>> {
    let window = &records[..records.len().min(max_terms)];

    let mut by_cluster: BTreeMap<i64, Vec<TermRecord>> = BTreeMap::new();
    for record in window {
        let key = record.cluster.map(i64::from).unwrap_or(-1);
        by_cluster.entry(key).or_default().push(record.clone());
    }

    by_cluster
        .into_iter()
        .rev()
        .map(|(_, mut group)| {
            group.sort_by(|a, b| b.score.total_cmp(&a.score));
            group.truncate(max_per_cluster);
            group
        })
        .collect()
}

/// Assign the next colour on the keyword-cloud wheel.
fn hsl_color(index: usize, cap: usize) -> String {
    let cap = cap.max(1);
    let step = (360.0 / cap as f64) as u64;
    let degree = ((index % (cap + 1)) as u64 + 1) * step;
    format!("hsl({degree}, 60%, 50%)")
}

/// Build the similar-terms view for one queried term.
///
/// Drops the self-pair and non-positive similarities from the retained
/// list, keeps at most `cap` results, and attaches the squared-similarity
/// percentage plus a cyclic colour per entry.
pub fn similar_terms(list: &[(String, f64)], input_term: &str, cap: usize) -> Vec<SimilarTerm> {
    list.iter()
        .filter(|(term, similarity)| term != input_term && *similarity > 0.0)
        .take(cap)
        .enumerate()
        .map(|(i, (term, similarity))| SimilarTerm {
            position: i + 1,
            score: similarity * similarity * 100.0,
            term: term.clone(),
            color: hsl_color(i, cap),
        })
        .collect()
}

/// The first `max_bigrams` entries of the finalized bigram order.
pub fn top_bigrams(records: &[BigramRecord], max_bigrams: usize) -> &[BigramRecord] {
    &records[..records.len().min(max_bigrams)]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(term: &str, score: f64, cluster: Option<u32>) -> TermRecord {
        let mut rec = TermRecord::new(term, 1, 1.0, score);
        rec.cluster = cluster;
        rec
    }

    #[test]
    fn test_window_truncation_before_grouping() {
        // Three distinct cluster ids, but only the top two ranked terms
        // enter the grouping at all.
        let records = vec![
            record("a", 0.3, Some(0)),
            record("b", 0.2, Some(1)),
            record("c", 0.1, Some(2)),
        ];

        let groups = cluster_groups(&records, 2, 1);
        assert!(groups.len() <= 2);
        assert!(groups.iter().all(|g| g.len() <= 1));
        let terms: Vec<&str> = groups.iter().flatten().map(|r| r.term.as_str()).collect();
        assert!(!terms.contains(&"c"));
    }

    #[test]
    fn test_groups_ordered_by_cluster_descending() {
        let records = vec![
            record("a", 0.4, Some(1)),
            record("b", 0.3, Some(2)),
            record("c", 0.2, Some(2)),
            record("d", 0.1, None),
        ];

        let groups = cluster_groups(&records, 10, 10);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0][0].cluster, Some(2));
        assert_eq!(groups[1][0].cluster, Some(1));
        // Unassigned terms sort after every real cluster.
        assert_eq!(groups[2][0].cluster, None);
        // Score-descending inside a group.
        assert!(groups[0][0].score >= groups[0][1].score);
    }

    #[test]
    fn test_per_cluster_truncation() {
        let records = vec![
            record("a", 0.4, Some(0)),
            record("b", 0.3, Some(0)),
            record("c", 0.2, Some(0)),
        ];

        let groups = cluster_groups(&records, 10, 2);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[0][0].term, "a");
    }

    #[test]
    fn test_similar_terms_filters_self_and_zero() {
        let list = vec![
            ("hund".to_string(), 1.0),
            ("katze".to_string(), 0.5),
            ("maus".to_string(), 0.0),
            ("igel".to_string(), 0.25),
        ];

        let results = similar_terms(&list, "hund", 12);
        let terms: Vec<&str> = results.iter().map(|r| r.term.as_str()).collect();
        assert_eq!(terms, ["katze", "igel"]);

        // Squared-percentage display score.
        assert!((results[0].score - 25.0).abs() < 1e-12);
        assert_eq!(results[0].position, 1);
        assert!(results[0].color.starts_with("hsl("));
        assert_ne!(results[0].color, results[1].color);
    }

    #[test]
    fn test_similar_terms_respects_cap() {
        let list: Vec<(String, f64)> = (0..20)
            .map(|i| (format!("t{i}"), 0.9 - 0.01 * i as f64))
            .collect();

        let results = similar_terms(&list, "query", 12);
        assert_eq!(results.len(), 12);
    }

    #[test]
    fn test_top_bigrams_prefix() {
        let records = vec![
            BigramRecord::new(("a".to_string(), "b".to_string()), 5),
            BigramRecord::new(("c".to_string(), "d".to_string()), 3),
            BigramRecord::new(("e".to_string(), "f".to_string()), 1),
        ];

        let top = top_bigrams(&records, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].frequency, 5);

        assert_eq!(top_bigrams(&records, 10).len(), 3);
    }
}
