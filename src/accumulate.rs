//! Streaming accumulation of per-segment term statistics.
//!
//! Tokens arrive one segment at a time from the upstream extraction stage,
//! already lemmatized and filtered to content-bearing words. This module
//! only counts: global unigram/bigram frequencies, floored per-segment
//! document lengths, and sparse per-term postings.

use crate::types::SegmentId;
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

/// Accumulated frequency structures for one analytics run.
///
/// All maps are insertion-ordered so that later ranking phases break ties
/// deterministically by first-ingestion order.
///
/// Ingestion is not idempotent: feeding the same segment twice doubles its
/// contribution. Guarding against duplicate segments is the caller's job.
#[derive(Debug, Clone)]
pub struct TermStats {
    /// Floor applied to each segment's unique-token count.
    min_document_len: u64,
    /// Global unigram occurrence counts.
    unigram_freq: IndexMap<String, u64>,
    /// Global bigram occurrence counts.
    bigram_freq: IndexMap<(String, String), u64>,
    /// Effective (floored) unique-token count per segment.
    doc_lengths: HashMap<SegmentId, u64>,
    /// Per-term postings: segments the term occurred in, with local counts.
    term_docs: IndexMap<String, Vec<(SegmentId, u64)>>,
}

impl TermStats {
    /// Create an empty accumulator with the given document-length floor.
    pub fn new(min_document_len: u64) -> Self {
        Self {
            min_document_len,
            unigram_freq: IndexMap::new(),
            bigram_freq: IndexMap::new(),
            doc_lengths: HashMap::new(),
            term_docs: IndexMap::new(),
        }
    }

    /// Ingest one segment's token stream.
    ///
    /// Records the segment's floored unique-token count as its document
    /// length, adds the tokens to the global frequency counter, and appends
    /// a `(segment, local_count)` posting for every distinct token.
    pub fn ingest_unigrams<S: AsRef<str>>(&mut self, tokens: &[S], segment: &SegmentId) {
        let mut local: IndexMap<&str, u64> = IndexMap::new();
        for token in tokens {
            *local.entry(token.as_ref()).or_insert(0) += 1;
        }

        let doc_len = (local.len() as u64).max(self.min_document_len);
        self.doc_lengths.insert(segment.clone(), doc_len);

        for (token, count) in local {
            *self.unigram_freq.entry(token.to_string()).or_insert(0) += count;
            self.term_docs
                .entry(token.to_string())
                .or_default()
                .push((segment.clone(), count));
        }
    }

    /// Ingest a stream of adjacent-token pairs.
    ///
    /// Bigrams feed only the global counter; they carry no per-document
    /// tracking because they are ranked by raw frequency alone.
    pub fn ingest_bigrams<S: AsRef<str>>(&mut self, pairs: &[(S, S)]) {
        for (a, b) in pairs {
            let key = (a.as_ref().to_string(), b.as_ref().to_string());
            *self.bigram_freq.entry(key).or_insert(0) += 1;
        }
    }

    /// Whether any unigram was ever ingested.
    pub fn is_empty(&self) -> bool {
        self.term_docs.is_empty()
    }

    /// Number of distinct terms seen so far.
    pub fn term_count(&self) -> usize {
        self.term_docs.len()
    }

    /// Highest global unigram frequency, if any term was ingested.
    pub fn max_frequency(&self) -> Option<u64> {
        self.unigram_freq.values().copied().max()
    }

    /// Global frequency of a single term.
    pub fn frequency(&self, term: &str) -> u64 {
        self.unigram_freq.get(term).copied().unwrap_or(0)
    }

    /// Global unigram counts in first-ingestion order.
    pub fn unigram_frequencies(&self) -> &IndexMap<String, u64> {
        &self.unigram_freq
    }

    /// Global bigram counts in first-ingestion order.
    pub fn bigram_frequencies(&self) -> &IndexMap<(String, String), u64> {
        &self.bigram_freq
    }

    /// Per-term postings in first-ingestion order.
    pub fn postings(&self) -> &IndexMap<String, Vec<(SegmentId, u64)>> {
        &self.term_docs
    }

    /// Effective (floored) document length of a segment.
    pub fn document_len(&self, segment: &SegmentId) -> Option<u64> {
        self.doc_lengths.get(segment).copied()
    }

    /// The set of segments a term occurred in, ignoring local counts.
    pub fn segment_set(&self, term: &str) -> Option<HashSet<&SegmentId>> {
        self.term_docs
            .get(term)
            .map(|postings| postings.iter().map(|(seg, _)| seg).collect())
    }

    /// Drop all accumulated state.
    pub fn clear(&mut self) {
        self.unigram_freq.clear();
        self.bigram_freq.clear();
        self.doc_lengths.clear();
        self.term_docs.clear();
    }
}
