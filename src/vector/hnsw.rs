// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HNSW index over passage embeddings.
//!
//! Hierarchical Navigable Small World (HNSW) approximate nearest neighbor
//! search with cosine distance. The index is built in memory at startup
//! from the persisted passage records and is immutable afterwards; the
//! ingestion pipeline appends to the store and a restart picks the new
//! passages up.
//!
//! Vectors are L2-normalized on insert and on query so the cosine scores
//! reported to callers stay in the 0.0 to 1.0 range.

use hnsw_rs::hnsw::{Hnsw, Neighbour};
use hnsw_rs::prelude::*;
use std::sync::Arc;

use super::store::PassageRecord;
use super::{IndexError, Passage};

/// Immutable HNSW index over a set of passage records.
pub struct PassageIndex {
    /// Wrapped in Arc for cheap sharing across concurrent searches.
    hnsw: Arc<Hnsw<'static, f32, DistCosine>>,

    /// Records in insertion order; HNSW point ids are indices into this.
    records: Arc<Vec<PassageRecord>>,

    dimensions: usize,
}

impl PassageIndex {
    /// Build an index from passage records.
    ///
    /// All records must carry embeddings of `dimensions` length with only
    /// finite values. An empty record set yields an index whose searches
    /// return no results.
    pub fn build(records: Vec<PassageRecord>, dimensions: usize) -> Result<Self, IndexError> {
        if records.is_empty() {
            return Ok(Self {
                hnsw: Arc::new(Hnsw::new(16, 1, 16, 200, DistCosine)),
                records: Arc::new(Vec::new()),
                dimensions,
            });
        }

        for record in &records {
            if record.embedding.len() != dimensions {
                return Err(IndexError::DimensionMismatch {
                    expected: dimensions,
                    actual: record.embedding.len(),
                });
            }
            if record.embedding.iter().any(|&v| !v.is_finite()) {
                return Err(IndexError::NonFinite { context: "stored" });
            }
        }

        let max_nb_connection = 16;
        let max_layer = 16;
        let ef_construction = 200;

        let mut hnsw: Hnsw<f32, DistCosine> = Hnsw::new(
            max_nb_connection,
            records.len(),
            max_layer,
            ef_construction,
            DistCosine,
        );

        for (point_id, record) in records.iter().enumerate() {
            let normalized = normalize_vector(&record.embedding);
            hnsw.insert((&normalized, point_id));
        }

        hnsw.set_searching_mode(true);

        Ok(Self {
            hnsw: Arc::new(hnsw),
            records: Arc::new(records),
            dimensions,
        })
    }

    /// Search for the `k` nearest passages with similarity >= `threshold`.
    ///
    /// Results are sorted by similarity, highest first.
    pub fn search(
        &self,
        query: &[f32],
        k: usize,
        threshold: f32,
    ) -> Result<Vec<Passage>, IndexError> {
        if self.records.is_empty() {
            return Ok(vec![]);
        }

        if query.len() != self.dimensions {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimensions,
                actual: query.len(),
            });
        }
        if query.iter().any(|&v| !v.is_finite()) {
            return Err(IndexError::NonFinite { context: "query" });
        }

        let normalized_query = normalize_vector(query);

        // ef_search should be >= k (typically 1.5-2x k)
        let ef_search = (k * 2).max(50);
        let neighbours: Vec<Neighbour> = self.hnsw.search(&normalized_query, k, ef_search);

        let mut results = Vec::with_capacity(neighbours.len());
        for neighbour in neighbours {
            let Some(record) = self.records.get(neighbour.d_id) else {
                continue;
            };

            // HNSW reports cosine distance; similarity = 1 - distance.
            let score = 1.0 - neighbour.distance;
            if score >= threshold {
                results.push(Passage {
                    text: record.text.clone(),
                    source: record.source.clone(),
                    chunk: record.chunk,
                    score,
                });
            }
        }

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(results)
    }

    pub fn passage_count(&self) -> usize {
        self.records.len()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// L2-normalize a vector; zero vectors are returned unchanged.
fn normalize_vector(vector: &[f32]) -> Vec<f32> {
    let magnitude: f32 = vector.iter().map(|&x| x * x).sum::<f32>().sqrt();

    if magnitude == 0.0 || !magnitude.is_finite() {
        return vector.to_vec();
    }

    vector.iter().map(|&x| x / magnitude).collect()
}
