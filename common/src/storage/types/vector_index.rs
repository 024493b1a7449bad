use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::chunk::Chunk;

/// One stored chunk together with its embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
}

/// In-memory similarity index. Modeled as an immutable value: `load`,
/// `create_from` and `add` on the store all return a new `VectorIndex`, and
/// persistence is the only mutation boundary.
///
/// Invariant: every entry's embedding has length `dimension` and was produced
/// by the provider identified by `model`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorIndex {
    pub model: Option<String>,
    pub dimension: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub entries: Vec<IndexEntry>,
}

impl VectorIndex {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the top-`k` chunks by cosine similarity to `query_embedding`,
    /// most relevant first. `k` is clamped to the entry count; an empty index
    /// yields an empty result.
    pub fn similarity_search(&self, query_embedding: &[f32], k: usize) -> Vec<(Chunk, f32)> {
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .filter_map(|(position, entry)| {
                cosine_similarity(query_embedding, &entry.embedding)
                    .map(|score| (position, score))
            })
            .collect();

        // Descending by score, insertion order as tie-break for reproducible
        // snapshots.
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        scored.truncate(k);

        scored
            .into_iter()
            .map(|(position, score)| (self.entries[position].chunk.clone(), score))
            .collect()
    }
}

/// Cosine similarity with f64 accumulation. `None` on dimension mismatch or
/// a zero-norm operand, which keeps degenerate vectors out of the ranking.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let x64 = f64::from(x);
        let y64 = f64::from(y);
        dot += x64 * y64;
        norm_a += x64 * x64;
        norm_b += y64 * y64;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom <= f64::EPSILON {
        return None;
    }

    Some((dot / denom) as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_with(embeddings: Vec<Vec<f32>>) -> VectorIndex {
        let now = Utc::now();
        VectorIndex {
            model: None,
            dimension: embeddings.first().map_or(0, Vec::len),
            created_at: now,
            updated_at: now,
            entries: embeddings
                .into_iter()
                .enumerate()
                .map(|(i, embedding)| IndexEntry {
                    chunk: Chunk::new(format!("chunk-{i}"), None),
                    embedding,
                })
                .collect(),
        }
    }

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let score = cosine_similarity(&[0.5, 0.5, 0.0], &[0.5, 0.5, 0.0]).unwrap();
        assert!((score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_rejects_mismatched_or_zero_vectors() {
        assert!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]).is_none());
        assert!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]).is_none());
        assert!(cosine_similarity(&[], &[]).is_none());
    }

    #[test]
    fn search_orders_by_descending_similarity() {
        let index = index_with(vec![
            vec![0.1, 0.9, 0.0],
            vec![0.9, 0.1, 0.0],
            vec![0.8, 0.2, 0.0],
        ]);
        let results = index.similarity_search(&[1.0, 0.0, 0.0], 3);

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].0.text, "chunk-1");
        for window in results.windows(2) {
            assert!(window[0].1 >= window[1].1);
        }
    }

    #[test]
    fn k_is_clamped_to_entry_count() {
        let index = index_with(vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
        let results = index.similarity_search(&[1.0, 0.0], 10);
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn empty_index_yields_empty_result() {
        let index = index_with(Vec::new());
        assert!(index.similarity_search(&[1.0, 0.0], 3).is_empty());
    }
}
