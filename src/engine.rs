//! The owned analytics pipeline: accumulate, finalize, merge, serve, persist.
//!
//! `KeywordEngine` replaces ambient module state with an explicitly
//! constructed instance that is passed by handle through the pipeline. Its
//! lifecycle makes the two-phase contract visible: all ingestion happens
//! before a single finalize pass, and queries are only meaningful afterwards.

use crate::accumulate::TermStats;
use crate::cluster::{assign_clusters, ClusteringStrategy};
use crate::concepts::{merge_bigram_concepts, merge_term_concepts};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::rank::{rank_bigrams, rank_unigrams};
use crate::similarity::compute_similarities;
use crate::store::{self, SnapshotPaths};
use crate::types::{BigramRecord, SegmentId, TermRecord};
use crate::view::{self, SimilarTerm};
use indexmap::IndexMap;
use std::collections::{BTreeSet, HashMap};
use tracing::info;

/// Lifecycle of one engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Nothing ingested or loaded yet.
    Empty,
    /// Segments have been ingested; ranking has not run.
    Accumulating,
    /// Ranked records are available for queries and persistence.
    Finalized,
}

/// The term analytics engine.
///
/// Single-threaded and batch-oriented: ingest every segment, call
/// [`finalize`](KeywordEngine::finalize) once, merge concept annotations,
/// then serve queries or persist the snapshot. Interleaving ingestion with
/// queries is a caller contract violation and is not guarded here.
pub struct KeywordEngine {
    config: EngineConfig,
    state: EngineState,
    stats: TermStats,
    unigrams: Vec<TermRecord>,
    bigrams: Vec<BigramRecord>,
    similarity: IndexMap<String, Vec<(String, f64)>>,
    cluster_cache: Option<Vec<Vec<TermRecord>>>,
}

impl KeywordEngine {
    /// Create an empty engine with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        let stats = TermStats::new(config.min_document_len);
        Self {
            config,
            state: EngineState::Empty,
            stats,
            unigrams: Vec::new(),
            bigrams: Vec::new(),
            similarity: IndexMap::new(),
            cluster_cache: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// The engine's configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Ingest one segment's token stream.
    ///
    /// Not idempotent: re-ingesting a segment doubles its contribution.
    pub fn ingest_segment<S: AsRef<str>>(&mut self, tokens: &[S], segment: &SegmentId) {
        self.stats.ingest_unigrams(tokens, segment);
        if self.state == EngineState::Empty {
            self.state = EngineState::Accumulating;
        }
    }

    /// Ingest a segment's adjacent-token pairs.
    pub fn ingest_bigrams<S: AsRef<str>>(&mut self, pairs: &[(S, S)]) {
        self.stats.ingest_bigrams(pairs);
        if self.state == EngineState::Empty {
            self.state = EngineState::Accumulating;
        }
    }

    /// Run the single finalize pass: rank, similarity, clustering.
    ///
    /// Fails on an empty corpus and on any similarity or clustering error;
    /// all failures are fatal for the run and leave no partial results
    /// guaranteed.
    pub fn finalize(&mut self, strategy: &dyn ClusteringStrategy) -> Result<()> {
        self.unigrams = rank_unigrams(&self.stats, self.config.max_weight_scale)?;
        self.bigrams = rank_bigrams(&self.stats);

        let window = self.unigrams.len().min(self.config.similarity_window);
        let candidates: Vec<String> = self.unigrams[..window]
            .iter()
            .map(|r| r.term.clone())
            .collect();

        if let Some(data) = compute_similarities(
            &self.stats,
            &candidates,
            self.config.similarity_list_len(),
        )? {
            assign_clusters(
                &mut self.unigrams,
                &candidates,
                &data.distance_matrix,
                self.config.cluster_count,
                strategy,
            )?;
            self.similarity = data.lists;
        }

        self.cluster_cache = None;
        self.state = EngineState::Finalized;

        info!(
            terms = self.unigrams.len(),
            bigrams = self.bigrams.len(),
            candidates = window,
            "analytics run finalized"
        );

        Ok(())
    }

    /// Merge external concept annotations into unigram and bigram records.
    pub fn merge_concepts(&mut self, mapping: &HashMap<String, BTreeSet<String>>) {
        merge_term_concepts(&mut self.unigrams, mapping);
        merge_bigram_concepts(&mut self.bigrams, mapping);
        self.cluster_cache = None;
    }

    /// All ranked unigram records, score-descending.
    pub fn records(&self) -> &[TermRecord] {
        &self.unigrams
    }

    /// Look up a single record by term, for the search layer.
    pub fn record(&self, term: &str) -> Option<&TermRecord> {
        self.unigrams.iter().find(|r| r.term == term)
    }

    /// The ranked terms alone, score-descending.
    pub fn ranked_terms(&self) -> Vec<&str> {
        self.unigrams.iter().map(|r| r.term.as_str()).collect()
    }

    /// The top terms grouped by cluster.
    ///
    /// Computed once and cached for the engine's lifetime: later calls
    /// return the first grouping even with different arguments.
    pub fn ranked_clusters(
        &mut self,
        max_terms: usize,
        max_per_cluster: usize,
    ) -> &[Vec<TermRecord>] {
        if self.cluster_cache.is_none() {
            self.cluster_cache = Some(view::cluster_groups(
                &self.unigrams,
                max_terms,
                max_per_cluster,
            ));
        }
        self.cluster_cache.as_deref().unwrap_or(&[])
    }

    /// Similar terms for one queried term, with display metadata.
    ///
    /// Unknown terms yield an empty list.
    pub fn similar_terms(&self, term: &str) -> Vec<SimilarTerm> {
        match self.similarity.get(term) {
            Some(list) => view::similar_terms(list, term, self.config.similarity_display_cap),
            None => Vec::new(),
        }
    }

    /// The highest-ranked bigrams, at most `max_bigrams` of them.
    pub fn top_bigrams(&self, max_bigrams: usize) -> &[BigramRecord] {
        view::top_bigrams(&self.bigrams, max_bigrams)
    }

    /// Write the whole snapshot: unigrams, bigrams, similarity lists.
    ///
    /// Rewrites every file in full; a crash mid-write can corrupt the
    /// snapshot.
    pub fn store(&self, paths: &SnapshotPaths) -> Result<()> {
        store::save_unigrams(paths, &self.unigrams)?;
        store::save_bigrams(paths, &self.bigrams)?;
        store::save_similarity(paths, &self.similarity)?;
        info!(root = %paths.root.display(), "stored analytics snapshot");
        Ok(())
    }

    /// Load a previously stored snapshot into this engine.
    ///
    /// Only honoured while the engine is [`EngineState::Empty`]; any other
    /// state makes this a no-op returning `false`. Loading a non-empty
    /// snapshot transitions to [`EngineState::Finalized`]; missing or empty
    /// files leave the engine empty so a later run can rebuild them.
    pub fn load(&mut self, paths: &SnapshotPaths) -> Result<bool> {
        if self.state != EngineState::Empty {
            return Ok(false);
        }

        self.unigrams = store::load_unigrams(paths)?;
        self.bigrams = store::load_bigrams(paths)?;
        self.similarity = store::load_similarity(paths)?;

        if self.unigrams.is_empty() {
            return Ok(false);
        }

        self.state = EngineState::Finalized;
        info!(
            terms = self.unigrams.len(),
            bigrams = self.bigrams.len(),
            "loaded analytics snapshot"
        );
        Ok(true)
    }

    /// Reset the engine to its empty state.
    pub fn clear(&mut self) {
        self.stats.clear();
        self.unigrams.clear();
        self.bigrams.clear();
        self.similarity.clear();
        self.cluster_cache = None;
        self.state = EngineState::Empty;
    }
}

impl Default for KeywordEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
