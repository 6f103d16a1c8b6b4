//! Context retrieval for augmented prompts.

use crate::embedding::Embedder;
use crate::error::Result;
use crate::vector_store::VectorIndex;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Embeds a query and fetches its nearest passages.
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    namespace: String,
    top_k: usize,
}

impl Retriever {
    /// Create a retriever over an already-constructed index handle.
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>) -> Self {
        Self {
            embedder,
            index,
            namespace: "json-documents".to_string(),
            top_k: 2,
        }
    }

    /// Set the namespace queried for passages.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the number of passages to fetch.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Return passage texts for `query`, most similar first.
    #[instrument(skip(self), fields(namespace = %self.namespace, top_k = self.top_k))]
    pub async fn retrieve(&self, query: &str) -> Result<Vec<String>> {
        let embedding = self.embedder.embed(query).await?;

        // The nearest-neighbour query needs the embedding, so it runs strictly after.
        let matches = self
            .index
            .query(&embedding, self.top_k, &self.namespace)
            .await?;

        let contexts: Vec<String> = matches.iter().map(|m| m.text().to_string()).collect();
        debug!("Retrieved {} contexts", contexts.len());
        Ok(contexts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RelayError;
    use crate::vector_store::{MemoryVectorIndex, Record};
    use async_trait::async_trait;

    struct FixedEmbedder(Vec<f32>);

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(self.0.clone())
        }

        fn model(&self) -> &str {
            "fixed"
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(RelayError::Embedding("model loading".to_string()))
        }

        fn model(&self) -> &str {
            "failing"
        }
    }

    fn index() -> Arc<MemoryVectorIndex> {
        let index = MemoryVectorIndex::new();
        index
            .upsert(
                "profs",
                vec![
                    Record::with_text("1", vec![1.0, 0.0], "Prof. Near"),
                    Record::with_text("2", vec![0.6, 0.8], "Prof. Middle"),
                    Record::with_text("3", vec![0.0, 1.0], "Prof. Far"),
                ],
            )
            .unwrap();
        Arc::new(index)
    }

    #[tokio::test]
    async fn test_retrieve_top_k_in_namespace() {
        let retriever = Retriever::new(Arc::new(FixedEmbedder(vec![1.0, 0.0])), index())
            .with_namespace("profs")
            .with_top_k(2);

        let contexts = retriever.retrieve("who is near?").await.unwrap();
        assert_eq!(contexts, vec!["Prof. Near", "Prof. Middle"]);
    }

    #[tokio::test]
    async fn test_embedding_failure_propagates() {
        let retriever = Retriever::new(Arc::new(FailingEmbedder), index()).with_namespace("profs");
        let err = retriever.retrieve("q").await.unwrap_err();
        assert!(matches!(err, RelayError::Embedding(_)));
    }
}
