//! Core types for the term analytics engine.

use std::collections::BTreeSet;
use std::fmt;

/// Identifies one ranked "document": a bounded slice of a recording.
///
/// Produced by the upstream segmentation stage; opaque to this engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SegmentId {
    /// Identifier of the source audio file.
    pub file_id: String,
    /// Index of the segment within that file.
    pub part: u32,
}

impl SegmentId {
    /// Create a segment id from a file id and a segment index.
    pub fn new(file_id: impl Into<String>, part: u32) -> Self {
        Self {
            file_id: file_id.into(),
            part,
        }
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.part, self.file_id)
    }
}

/// A ranked unigram term with its statistics.
///
/// `weight`, `score`, `cluster`, and `concepts` are populated by the
/// finalization phases; before that only `term` and `frequency` carry
/// meaning. `cluster` is `None` for terms outside the candidate window of
/// the last clustering run.
#[derive(Debug, Clone, PartialEq)]
pub struct TermRecord {
    /// The term itself; unique key for the record's lifetime.
    pub term: String,
    /// Global occurrence count across all ingested segments.
    pub frequency: u64,
    /// Bounded display weight derived from global frequency only.
    pub weight: f64,
    /// Corpus-relevance score normalized by floored document lengths.
    pub score: f64,
    /// Topic cluster label assigned by the last clustering run.
    pub cluster: Option<u32>,
    /// Concept labels merged in from the external annotation component.
    pub concepts: BTreeSet<String>,
}

impl TermRecord {
    /// Create a freshly ranked record with no cluster or concepts yet.
    pub fn new(term: impl Into<String>, frequency: u64, weight: f64, score: f64) -> Self {
        Self {
            term: term.into(),
            frequency,
            weight,
            score,
            cluster: None,
            concepts: BTreeSet::new(),
        }
    }
}

/// A ranked two-word phrase.
#[derive(Debug, Clone, PartialEq)]
pub struct BigramRecord {
    /// The ordered pair of terms.
    pub pair: (String, String),
    /// Global occurrence count of the pair.
    pub frequency: u64,
    /// Union of the two component terms' concept sets.
    pub concepts: BTreeSet<String>,
}

impl BigramRecord {
    /// Create a bigram record with no concepts yet.
    pub fn new(pair: (String, String), frequency: u64) -> Self {
        Self {
            pair,
            frequency,
            concepts: BTreeSet::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_id_display() {
        let id = SegmentId::new("abc123", 4);
        assert_eq!(id.to_string(), "4abc123");
    }

    #[test]
    fn test_segment_id_equality() {
        let a = SegmentId::new("f", 1);
        let b = SegmentId::new("f", 1);
        let c = SegmentId::new("f", 2);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_term_record_new() {
        let rec = TermRecord::new("hund", 3, 1.5, 0.02);
        assert_eq!(rec.term, "hund");
        assert_eq!(rec.frequency, 3);
        assert!(rec.cluster.is_none());
        assert!(rec.concepts.is_empty());
    }
}
