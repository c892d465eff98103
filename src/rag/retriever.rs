use std::sync::Arc;
use tracing::debug;

use crate::vector::{IndexError, Passage, VectorIndex};

/// Fetches grounding passages for a standalone query.
///
/// Thin delegation to the vector index: the result set size and score
/// cutoff are index-side configuration, results are not cached, and index
/// failures propagate unchanged.
pub struct Retriever {
    index: Arc<dyn VectorIndex>,
}

impl Retriever {
    pub fn new(index: Arc<dyn VectorIndex>) -> Self {
        Self { index }
    }

    pub async fn retrieve(&self, query: &str) -> Result<Vec<Passage>, IndexError> {
        let passages = self.index.similarity_search(query).await?;
        debug!(query, count = passages.len(), "passages retrieved");
        Ok(passages)
    }
}
