//! Rank calculation: turns accumulated statistics into ordered records.
//!
//! Unigrams get a frequency-normalized relevance score and a bounded display
//! weight; bigrams are ordered by raw occurrence count only.

use crate::accumulate::TermStats;
use crate::error::{Error, Result};
use crate::types::{BigramRecord, TermRecord};
use tracing::debug;

/// Fixed lower frequency bound of the weight formula.
const MIN_FREQUENCY: u64 = 1;

/// Display weight of a term from its global frequency.
///
/// `1 + scale × ln(f − min + 1) / ln(max − min + 1)`, which maps the
/// frequency range onto `[1, 1 + scale]`. When every term occurs exactly
/// `min_frequency` times the denominator degenerates to zero; the weight is
/// defined as the lowest tier (`1.0`) in that case.
pub fn term_weight(frequency: u64, min_frequency: u64, max_frequency: u64, scale: f64) -> f64 {
    if max_frequency <= min_frequency {
        return 1.0;
    }
    let top = ((frequency - min_frequency + 1) as f64).ln();
    let bottom = ((max_frequency - min_frequency + 1) as f64).ln();
    1.0 + scale * (top / bottom)
}

/// Rank every accumulated term by its relevance score.
///
/// For each term the score sums `ln(local_count + 1) / document_len²` over
/// the segments it occurred in, with document lengths taken from the floored
/// length index. Records come back score-descending; equal scores keep
/// first-ingestion order.
///
/// Fails with [`Error::EmptyCorpus`] when nothing was ingested, since the
/// weight formula is undefined without a maximum frequency.
pub fn rank_unigrams(stats: &TermStats, scale: f64) -> Result<Vec<TermRecord>> {
    let max_frequency = stats.max_frequency().ok_or(Error::EmptyCorpus)?;

    let mut records: Vec<TermRecord> = Vec::with_capacity(stats.term_count());

    for (term, postings) in stats.postings() {
        let mut score = 0.0;
        for (segment, local_count) in postings {
            let doc_len = stats
                .document_len(segment)
                .expect("segment length recorded during ingestion");
            score += ((*local_count + 1) as f64).ln() / (doc_len as f64).powi(2);
        }

        let frequency = stats.frequency(term);
        let weight = term_weight(frequency, MIN_FREQUENCY, max_frequency, scale);

        records.push(TermRecord::new(term.clone(), frequency, weight, score));
    }

    // Stable sort: ties stay in first-ingestion order.
    records.sort_by(|a, b| b.score.total_cmp(&a.score));

    debug!(
        terms = records.len(),
        max_frequency, "ranked unigram terms"
    );

    Ok(records)
}

/// Rank accumulated bigrams by raw frequency, descending.
///
/// No normalized scoring; ties keep first-ingestion order. An empty bigram
/// counter simply yields an empty list.
pub fn rank_bigrams(stats: &TermStats) -> Vec<BigramRecord> {
    let mut records: Vec<BigramRecord> = stats
        .bigram_frequencies()
        .iter()
        .map(|(pair, &frequency)| BigramRecord::new(pair.clone(), frequency))
        .collect();

    records.sort_by(|a, b| b.frequency.cmp(&a.frequency));

    debug!(bigrams = records.len(), "ranked bigram terms");

    records
}
