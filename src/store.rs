//! Whole-snapshot persistence as line-delimited JSON.
//!
//! Three independent files, one JSON array per line. Store always rewrites a
//! file in full from in-memory state; there is no atomic replace, so a crash
//! mid-write can corrupt the snapshot. A missing file is treated as an empty
//! database: it is created and loaded as zero records.

use crate::error::Result;
use crate::types::{BigramRecord, TermRecord};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs::{create_dir_all, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Wire row for a unigram: `[term, frequency, weight, score, clusterId, concepts]`.
///
/// An unassigned cluster is encoded as `-1`.
#[derive(Serialize, Deserialize)]
struct UnigramRow(String, u64, f64, f64, i64, Vec<String>);

/// Wire row for a bigram: `[[a, b], frequency, concepts]`.
#[derive(Serialize, Deserialize)]
struct BigramRow((String, String), u64, Vec<String>);

/// Wire row for a similarity list: `[term, [[other, jaccard], ...]]`.
#[derive(Serialize, Deserialize)]
struct SimilarityRow(String, Vec<(String, f64)>);

/// File locations of one snapshot, rooted at a directory.
pub struct SnapshotPaths {
    /// Snapshot root directory.
    pub root: PathBuf,
}

impl SnapshotPaths {
    /// Create snapshot paths rooted at `root`.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Ranked unigram store.
    pub fn unigrams(&self) -> PathBuf {
        self.root.join("relevant_terms.jsonl")
    }

    /// Ranked bigram store.
    pub fn bigrams(&self) -> PathBuf {
        self.root.join("relevant_bigrams.jsonl")
    }

    /// Per-term similarity lists.
    pub fn similarity(&self) -> PathBuf {
        self.root.join("term_similarity.jsonl")
    }
}

/// Touch a missing snapshot file so later stores find the directory in place.
fn create_empty(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    File::create(path)?;
    Ok(())
}

fn open_for_rewrite(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    Ok(BufWriter::new(File::create(path)?))
}

/// Rewrite the unigram store from the ranked records, preserving order.
pub fn save_unigrams(paths: &SnapshotPaths, records: &[TermRecord]) -> Result<()> {
    let mut writer = open_for_rewrite(&paths.unigrams())?;
    for record in records {
        let row = UnigramRow(
            record.term.clone(),
            record.frequency,
            record.weight,
            record.score,
            record.cluster.map(i64::from).unwrap_or(-1),
            record.concepts.iter().cloned().collect(),
        );
        writeln!(writer, "{}", serde_json::to_string(&row)?)?;
    }
    writer.flush()?;
    debug!(records = records.len(), "stored unigram snapshot");
    Ok(())
}

/// Load the unigram store; a missing file is created and yields no records.
pub fn load_unigrams(paths: &SnapshotPaths) -> Result<Vec<TermRecord>> {
    let path = paths.unigrams();
    if !path.exists() {
        create_empty(&path)?;
        return Ok(Vec::new());
    }

    let mut records = Vec::new();
    for line in BufReader::new(File::open(&path)?).lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let row: UnigramRow = serde_json::from_str(&line)?;
        records.push(TermRecord {
            term: row.0,
            frequency: row.1,
            weight: row.2,
            score: row.3,
            cluster: u32::try_from(row.4).ok(),
            concepts: BTreeSet::from_iter(row.5),
        });
    }
    debug!(records = records.len(), "loaded unigram snapshot");
    Ok(records)
}

/// Rewrite the bigram store from the ranked records, preserving order.
pub fn save_bigrams(paths: &SnapshotPaths, records: &[BigramRecord]) -> Result<()> {
    let mut writer = open_for_rewrite(&paths.bigrams())?;
    for record in records {
        let row = BigramRow(
            record.pair.clone(),
            record.frequency,
            record.concepts.iter().cloned().collect(),
        );
        writeln!(writer, "{}", serde_json::to_string(&row)?)?;
    }
    writer.flush()?;
    Ok(())
}

/// Load the bigram store; a missing file is created and yields no records.
pub fn load_bigrams(paths: &SnapshotPaths) -> Result<Vec<BigramRecord>> {
    let path = paths.bigrams();
    if !path.exists() {
        create_empty(&path)?;
        return Ok(Vec::new());
    }

    let mut records = Vec::new();
    for line in BufReader::new(File::open(&path)?).lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let row: BigramRow = serde_json::from_str(&line)?;
        records.push(BigramRecord {
            pair: row.0,
            frequency: row.1,
            concepts: BTreeSet::from_iter(row.2),
        });
    }
    Ok(records)
}

/// Rewrite the similarity store, one term per line in map order.
pub fn save_similarity(
    paths: &SnapshotPaths,
    lists: &IndexMap<String, Vec<(String, f64)>>,
) -> Result<()> {
    let mut writer = open_for_rewrite(&paths.similarity())?;
    for (term, list) in lists {
        let row = SimilarityRow(term.clone(), list.clone());
        writeln!(writer, "{}", serde_json::to_string(&row)?)?;
    }
    writer.flush()?;
    Ok(())
}

/// Load the similarity store; a missing file is created and yields no lists.
pub fn load_similarity(paths: &SnapshotPaths) -> Result<IndexMap<String, Vec<(String, f64)>>> {
    let path = paths.similarity();
    if !path.exists() {
        create_empty(&path)?;
        return Ok(IndexMap::new());
    }

    let mut lists = IndexMap::new();
    for line in BufReader::new(File::open(&path)?).lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let row: SimilarityRow = serde_json::from_str(&line)?;
        lists.insert(row.0, row.1);
    }
    Ok(lists)
}
