//! termlens - A term analytics engine for keyword search over spoken-audio archives.
//!
//! The engine turns raw per-segment token streams into:
//! - **Ranked keywords**: frequency-normalized relevance scores and bounded
//!   display weights over every ingested term
//! - **Ranked phrases**: two-word phrases ordered by raw occurrence count
//! - **A similarity graph**: pairwise Jaccard similarity over the top-ranked
//!   candidate window, with a distance matrix for clustering
//! - **Topic clusters**: a pluggable clustering strategy groups the candidate
//!   terms, and labels are merged back into the ranked records
//!
//! Processing is batch and two-phase: ingest every segment first, then run a
//! single finalize pass. Snapshots persist as line-delimited JSON and serve
//! the search and presentation layers.

pub mod accumulate;
pub mod cluster;
pub mod concepts;
pub mod config;
pub mod engine;
pub mod error;
pub mod rank;
pub mod similarity;
pub mod store;
pub mod types;
pub mod view;

// Re-export commonly used types
pub use accumulate::TermStats;
pub use cluster::{ClusteringStrategy, KMeansStrategy};
pub use config::EngineConfig;
pub use engine::{EngineState, KeywordEngine};
pub use error::{Error, Result};
pub use similarity::{distance_from_similarity, jaccard, SimilarityData};
pub use store::SnapshotPaths;
pub use types::{BigramRecord, SegmentId, TermRecord};
pub use view::SimilarTerm;
