//! Merging externally supplied term-to-concept annotations into records.
//!
//! The mapping comes from the ontology/annotation component and is consumed
//! read-only. Both merges are pure, idempotent, and order-independent.

use crate::types::{BigramRecord, TermRecord};
use std::collections::{BTreeSet, HashMap};

/// Overwrite each matching term record's concept set from the mapping.
///
/// Terms absent from the mapping are left untouched.
pub fn merge_term_concepts(
    records: &mut [TermRecord],
    mapping: &HashMap<String, BTreeSet<String>>,
) {
    for record in records.iter_mut() {
        if let Some(concepts) = mapping.get(&record.term) {
            record.concepts = concepts.clone();
        }
    }
}

/// Set each bigram's concepts to the union of its component terms' sets.
///
/// A bigram whose components are both unmapped ends up with an empty set.
pub fn merge_bigram_concepts(
    records: &mut [BigramRecord],
    mapping: &HashMap<String, BTreeSet<String>>,
) {
    for record in records.iter_mut() {
        let mut concepts = BTreeSet::new();
        if let Some(set) = mapping.get(&record.pair.0) {
            concepts.extend(set.iter().cloned());
        }
        if let Some(set) = mapping.get(&record.pair.1) {
            concepts.extend(set.iter().cloned());
        }
        record.concepts = concepts;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping() -> HashMap<String, BTreeSet<String>> {
        HashMap::from([
            (
                "hund".to_string(),
                BTreeSet::from(["Tier".to_string(), "Haustier".to_string()]),
            ),
            ("katze".to_string(), BTreeSet::from(["Tier".to_string()])),
        ])
    }

    #[test]
    fn test_term_concepts_overwritten() {
        let mut records = vec![
            TermRecord::new("hund", 2, 1.0, 0.1),
            TermRecord::new("maus", 1, 1.0, 0.05),
        ];
        records[0].concepts.insert("Alt".to_string());

        merge_term_concepts(&mut records, &mapping());

        assert_eq!(
            records[0].concepts,
            BTreeSet::from(["Haustier".to_string(), "Tier".to_string()])
        );
        // Unmapped terms keep their previous set.
        assert!(records[1].concepts.is_empty());
    }

    #[test]
    fn test_bigram_concepts_union() {
        let mut records = vec![
            BigramRecord::new(("hund".to_string(), "katze".to_string()), 3),
            BigramRecord::new(("maus".to_string(), "igel".to_string()), 1),
        ];

        merge_bigram_concepts(&mut records, &mapping());

        assert_eq!(
            records[0].concepts,
            BTreeSet::from(["Haustier".to_string(), "Tier".to_string()])
        );
        assert!(records[1].concepts.is_empty());
    }

    #[test]
    fn test_merge_idempotent() {
        let mut records = vec![TermRecord::new("hund", 2, 1.0, 0.1)];
        merge_term_concepts(&mut records, &mapping());
        let first = records[0].concepts.clone();
        merge_term_concepts(&mut records, &mapping());
        assert_eq!(records[0].concepts, first);
    }
}
