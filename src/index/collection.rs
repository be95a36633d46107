use std::collections::{BTreeMap, HashSet};
use tracing::debug;

use crate::error::{PrepError, Result};
use crate::observability::metrics;

/// Distance function used to rank matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceSpace {
    /// `1 - cosine similarity`; 0 for identical directions, 2 for opposite
    #[default]
    Cosine,
}

impl DistanceSpace {
    pub fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            DistanceSpace::Cosine => cosine_distance(a, b),
        }
    }
}

fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub id: String,
    pub document: String,
    pub embedding: Vec<f32>,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryMatch {
    pub id: String,
    pub document: String,
    pub metadata: BTreeMap<String, String>,
    pub distance: f32,
}

impl QueryMatch {
    /// Similarity as a percentage, `(1 - distance) * 100`
    pub fn similarity_percent(&self) -> f32 {
        (1.0 - self.distance) * 100.0
    }
}

/// In-memory collection of embedded documents with brute-force search
#[derive(Debug, Clone)]
pub struct VectorCollection {
    name: String,
    space: DistanceSpace,
    dimension: Option<usize>,
    entries: Vec<IndexEntry>,
    ids: HashSet<String>,
}

impl VectorCollection {
    pub fn new(name: impl Into<String>, space: DistanceSpace) -> Self {
        Self {
            name: name.into(),
            space,
            dimension: None,
            entries: Vec::new(),
            ids: HashSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&IndexEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Insert a batch of entries. The batch is checked as a whole first, so
    /// a rejected batch leaves the collection unchanged.
    pub fn add(&mut self, entries: Vec<IndexEntry>) -> Result<()> {
        let dimension = self.check_batch(&entries)?;

        let added = entries.len();
        self.dimension = dimension;
        for entry in entries {
            self.ids.insert(entry.id.clone());
            self.entries.push(entry);
        }
        debug!("Added {} entries to '{}'", added, self.name);
        metrics::index::documents_added(added);
        Ok(())
    }

    /// Validate a batch against the collection and itself, returning the
    /// dimension the collection will have once it is inserted.
    fn check_batch(&self, entries: &[IndexEntry]) -> Result<Option<usize>> {
        let mut dimension = self.dimension;
        let mut batch_ids = HashSet::new();
        for entry in entries {
            if entry.embedding.is_empty() {
                return Err(PrepError::Index(format!(
                    "entry '{}' has an empty embedding",
                    entry.id
                )));
            }
            if self.ids.contains(&entry.id) || !batch_ids.insert(entry.id.as_str()) {
                return Err(PrepError::Index(format!(
                    "duplicate id '{}' in collection '{}'",
                    entry.id, self.name
                )));
            }
            match dimension {
                Some(d) if d != entry.embedding.len() => {
                    return Err(PrepError::Index(format!(
                        "entry '{}' has dimension {}, collection expects {}",
                        entry.id,
                        entry.embedding.len(),
                        d
                    )));
                }
                Some(_) => {}
                None => dimension = Some(entry.embedding.len()),
            }
        }
        Ok(dimension)
    }

    /// Up to `n` nearest entries by increasing distance; equal distances keep
    /// insertion order.
    pub fn query(&self, embedding: &[f32], n: usize) -> Result<Vec<QueryMatch>> {
        if let Some(d) = self.dimension {
            if d != embedding.len() {
                return Err(PrepError::Index(format!(
                    "query has dimension {}, collection '{}' expects {}",
                    embedding.len(),
                    self.name,
                    d
                )));
            }
        }

        let mut scored: Vec<(f32, &IndexEntry)> = self
            .entries
            .iter()
            .map(|e| (self.space.distance(embedding, &e.embedding), e))
            .collect();
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));

        let matches: Vec<QueryMatch> = scored
            .into_iter()
            .take(n)
            .map(|(distance, e)| QueryMatch {
                id: e.id.clone(),
                document: e.document.clone(),
                metadata: e.metadata.clone(),
                distance,
            })
            .collect();
        metrics::index::query_results(matches.len());
        Ok(matches)
    }
}
