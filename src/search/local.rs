/// In-memory search over a fixed set of embedded documents
use super::{
    KeywordIndex, SearchError, SearchHit, SearchMode, SearchProvider, VectorIndex,
};
use crate::documents::KnowledgeDocument;
use async_trait::async_trait;
use std::sync::Mutex;
use tracing::{debug, info};

/// HNSW construction and search parameters
#[derive(Debug, Clone, Copy)]
pub struct HnswParams {
    pub m: usize,
    pub ef_construction: usize,
    pub ef_search: usize,
}

impl Default for HnswParams {
    fn default() -> Self {
        Self {
            m: 16,
            ef_construction: 200,
            ef_search: 64,
        }
    }
}

/// Search index holding both a vector and a keyword index
///
/// Both indexes are keyed by the document's position in `documents`, so a
/// hit resolves back to its document without a lookup table.
pub struct LocalSearchIndex {
    documents: Vec<KnowledgeDocument>,
    vectors: VectorIndex,
    keywords: Mutex<KeywordIndex>,
    mode: SearchMode,
    params: HnswParams,
}

impl LocalSearchIndex {
    /// Index `documents`; every embedding must share one dimension
    pub fn build(
        documents: Vec<KnowledgeDocument>,
        mode: SearchMode,
        params: HnswParams,
    ) -> Result<Self, SearchError> {
        let dimension = documents
            .first()
            .map(|d| d.embedding_vector.len())
            .unwrap_or(0);

        let vectors = VectorIndex::new(
            dimension,
            params.ef_construction,
            params.m,
            documents.len(),
        );
        let mut keywords = KeywordIndex::new()?;

        for (slot, document) in documents.iter().enumerate() {
            if document.embedding_vector.len() != dimension {
                return Err(SearchError::InvalidDocument {
                    id: document.id.clone(),
                    message: format!(
                        "embedding has {} dimensions, expected {}",
                        document.embedding_vector.len(),
                        dimension
                    ),
                });
            }

            vectors.insert(slot as u64, &document.embedding_vector)?;
            keywords.insert(slot as u64, &document.title, &document.content)?;
        }
        keywords.commit()?;

        info!(
            "Indexed {} documents ({}D, {} mode)",
            documents.len(),
            dimension,
            mode
        );

        Ok(Self {
            documents,
            vectors,
            keywords: Mutex::new(keywords),
            mode,
            params,
        })
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: SearchMode) {
        self.mode = mode;
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn documents(&self) -> &[KnowledgeDocument] {
        &self.documents
    }

    fn resolve(&self, slot: u64, raw_score: f32) -> Option<SearchHit> {
        self.documents
            .get(slot as usize)
            .map(|document| SearchHit::new(document.clone(), f64::from(raw_score)))
    }

    fn search_vector(&self, query_vector: &[f32], top_k: usize) -> Result<Vec<SearchHit>, SearchError> {
        let results = self
            .vectors
            .search(query_vector, top_k, self.params.ef_search)?;

        Ok(results
            .into_iter()
            .filter_map(|r| self.resolve(r.id, r.score))
            .take(top_k)
            .collect())
    }

    fn search_lexical(&self, query_text: &str, top_k: usize) -> Result<Vec<SearchHit>, SearchError> {
        let keywords = self
            .keywords
            .lock()
            .map_err(|_| SearchError::Backend("keyword index lock poisoned".to_string()))?;

        let results = keywords.search(query_text, top_k)?;

        Ok(results
            .into_iter()
            .filter_map(|r| self.resolve(r.id, r.score))
            .collect())
    }
}

#[async_trait]
impl SearchProvider for LocalSearchIndex {
    async fn search(
        &self,
        query_vector: &[f32],
        query_text: &str,
        top_k: usize,
    ) -> Result<Vec<SearchHit>, SearchError> {
        if self.documents.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let hits = match self.mode {
            SearchMode::Vector => self.search_vector(query_vector, top_k)?,
            SearchMode::Lexical => {
                if query_text.trim().is_empty() {
                    return Err(SearchError::InvalidQuery("Empty query text".to_string()));
                }
                self.search_lexical(query_text, top_k)?
            }
        };

        debug!("{} search returned {} hits", self.mode, hits.len());
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, title: &str, content: &str, vector: Vec<f32>) -> KnowledgeDocument {
        KnowledgeDocument {
            id: id.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            embedding_vector: vector,
        }
    }

    fn corpus() -> Vec<KnowledgeDocument> {
        vec![
            doc("a", "Apples", "Cheap apples at the Brussels market", vec![1.0, 0.0, 0.0]),
            doc("b", "Pears", "Pear prices in Antwerp", vec![0.0, 1.0, 0.0]),
            doc("c", "Fruit", "Apples and pears compared", vec![0.7, 0.7, 0.0]),
        ]
    }

    #[tokio::test]
    async fn test_vector_mode_orders_by_similarity() {
        let index = LocalSearchIndex::build(corpus(), SearchMode::Vector, HnswParams::default())
            .unwrap();

        let hits = index.search(&[1.0, 0.0, 0.0], "", 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].document.id, "a");
        assert_eq!(hits[1].document.id, "c");
        assert!(hits[0].raw_score >= hits[1].raw_score);
    }

    #[tokio::test]
    async fn test_lexical_mode_uses_query_text() {
        let index = LocalSearchIndex::build(corpus(), SearchMode::Lexical, HnswParams::default())
            .unwrap();

        let hits = index.search(&[], "antwerp", 5).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document.id, "b");
    }

    #[tokio::test]
    async fn test_lexical_mode_rejects_blank_query() {
        let index = LocalSearchIndex::build(corpus(), SearchMode::Lexical, HnswParams::default())
            .unwrap();
        assert!(matches!(
            index.search(&[], "   ", 5).await,
            Err(SearchError::InvalidQuery(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_index_returns_no_hits() {
        let index =
            LocalSearchIndex::build(Vec::new(), SearchMode::Vector, HnswParams::default()).unwrap();
        assert!(index.is_empty());
        assert!(index.search(&[1.0], "apples", 3).await.unwrap().is_empty());
    }

    #[test]
    fn test_mixed_dimensions_rejected() {
        let mut docs = corpus();
        docs.push(doc("d", "Odd", "Wrong size", vec![1.0]));
        let result = LocalSearchIndex::build(docs, SearchMode::Vector, HnswParams::default());
        assert!(matches!(result, Err(SearchError::InvalidDocument { .. })));
    }
}
