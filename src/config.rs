//! Engine configuration.

/// Tunable parameters for the analytics pipeline.
///
/// The defaults match the deployment the engine was built for: short spoken
/// segments of roughly a minute, a few thousand candidate terms, and a
/// keyword-cloud style presentation layer.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Floor for the effective unique-token count of a segment. Prevents
    /// very short segments from dominating the score formula.
    pub min_document_len: u64,
    /// Scale of the display weight; bounds the highest weight tier.
    pub max_weight_scale: f64,
    /// Number of topic clusters requested from the clustering strategy.
    pub cluster_count: usize,
    /// Size of the candidate window: how many top-ranked terms take part
    /// in similarity computation and clustering.
    pub similarity_window: usize,
    /// Maximum number of similar terms returned per query. Similarity
    /// lists are retained at twice this size.
    pub similarity_display_cap: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_document_len: 10,
            max_weight_scale: 8.0,
            cluster_count: 6,
            similarity_window: 2000,
            similarity_display_cap: 12,
        }
    }
}

impl EngineConfig {
    /// How many entries a per-term similarity list retains.
    pub fn similarity_list_len(&self) -> usize {
        self.similarity_display_cap * 2
    }
}
