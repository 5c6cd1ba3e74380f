/// Tantivy keyword index for BM25 lexical search
use tantivy::collector::TopDocs;
use tantivy::query::QueryParser;
use tantivy::schema::*;
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy, TantivyError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeywordIndexError {
    #[error("Index initialization failed: {0}")]
    InitializationError(String),

    #[error("Insert failed: {0}")]
    InsertError(String),

    #[error("Search failed: {0}")]
    SearchError(String),

    #[error("Tantivy error: {0}")]
    TantivyError(#[from] TantivyError),
}

/// Search result with slot ID and BM25 score
#[derive(Debug, Clone)]
pub struct KeywordSearchResult {
    /// Slot of the document in the owning store
    pub id: u64,
    /// BM25 relevance score (unbounded, only comparable within one query)
    pub score: f32,
}

/// In-memory tantivy index over document titles and contents
pub struct KeywordIndex {
    index: Index,
    reader: IndexReader,
    writer: IndexWriter,
    id_field: Field,
    title_field: Field,
    content_field: Field,
}

impl KeywordIndex {
    /// Create an empty RAM-backed index
    pub fn new() -> Result<Self, KeywordIndexError> {
        let mut schema_builder = Schema::builder();

        let id_field = schema_builder.add_u64_field("id", INDEXED | STORED);
        let title_field = schema_builder.add_text_field("title", TEXT);
        let content_field = schema_builder.add_text_field("content", TEXT);

        let schema = schema_builder.build();
        let index = Index::create_in_ram(schema);

        let writer = index
            .writer(50_000_000) // 50MB buffer
            .map_err(|e| KeywordIndexError::InitializationError(e.to_string()))?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| KeywordIndexError::InitializationError(e.to_string()))?;

        Ok(Self {
            index,
            reader,
            writer,
            id_field,
            title_field,
            content_field,
        })
    }

    /// Add a document; call [`commit`](Self::commit) to make it searchable
    pub fn insert(&mut self, id: u64, title: &str, content: &str) -> Result<(), KeywordIndexError> {
        let doc = doc!(
            self.id_field => id,
            self.title_field => title,
            self.content_field => content,
        );

        self.writer
            .add_document(doc)
            .map_err(|e| KeywordIndexError::InsertError(e.to_string()))?;

        Ok(())
    }

    /// Commit all pending changes and refresh the reader
    pub fn commit(&mut self) -> Result<(), KeywordIndexError> {
        self.writer
            .commit()
            .map_err(|e| KeywordIndexError::InsertError(e.to_string()))?;

        self.reader
            .reload()
            .map_err(|e| KeywordIndexError::SearchError(e.to_string()))?;

        Ok(())
    }

    /// Search title and content, best match first
    ///
    /// The query is parsed leniently so free-form questions with punctuation
    /// never fail to parse.
    pub fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<KeywordSearchResult>, KeywordIndexError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let searcher = self.reader.searcher();

        let query_parser =
            QueryParser::for_index(&self.index, vec![self.title_field, self.content_field]);
        let (query, _errors) = query_parser.parse_query_lenient(query);

        let top_docs = searcher
            .search(&*query, &TopDocs::with_limit(limit))
            .map_err(|e| KeywordIndexError::SearchError(e.to_string()))?;

        let mut results = Vec::with_capacity(top_docs.len());
        for (score, doc_address) in top_docs {
            let retrieved_doc: tantivy::TantivyDocument = searcher
                .doc(doc_address)
                .map_err(|e| KeywordIndexError::SearchError(e.to_string()))?;

            let id = retrieved_doc
                .get_first(self.id_field)
                .and_then(|v| v.as_u64())
                .ok_or_else(|| {
                    KeywordIndexError::SearchError("Missing or invalid ID field".to_string())
                })?;

            results.push(KeywordSearchResult { id, score });
        }

        Ok(results)
    }

    /// Remove every document
    pub fn clear(&mut self) -> Result<(), KeywordIndexError> {
        self.writer
            .delete_all_documents()
            .map_err(|e| KeywordIndexError::InsertError(e.to_string()))?;
        self.commit()
    }

    /// Get the number of searchable documents
    pub fn len(&self) -> u64 {
        self.reader.searcher().num_docs()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_creation() {
        let index = KeywordIndex::new().unwrap();
        assert_eq!(index.len(), 0);
        assert!(index.is_empty());
    }

    #[test]
    fn test_insert_and_search() {
        let mut index = KeywordIndex::new().unwrap();

        index
            .insert(1, "Fox facts", "The quick brown fox jumps over the lazy dog")
            .unwrap();
        index
            .insert(2, "Canines", "A fast red fox leaps above a sleepy canine")
            .unwrap();
        index
            .insert(3, "Python", "Python programming language tutorial")
            .unwrap();
        index.commit().unwrap();

        assert_eq!(index.len(), 3);

        let results = index.search("fox", 10).unwrap();
        assert_eq!(results.len(), 2);
        // title + content match outranks content-only match
        assert_eq!(results[0].id, 1);
        assert!(results[0].score >= results[1].score);

        let results = index.search("python", 10).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, 3);
    }

    #[test]
    fn test_question_with_punctuation_parses() {
        let mut index = KeywordIndex::new().unwrap();
        index
            .insert(7, "Apples", "Cheapest apples in Belgium are at the market")
            .unwrap();
        index.commit().unwrap();

        let results = index
            .search("Where can I find cheapest apples in Belgium?", 5)
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, 7);
    }

    #[test]
    fn test_clear() {
        let mut index = KeywordIndex::new().unwrap();
        index.insert(1, "One", "Document one").unwrap();
        index.commit().unwrap();
        assert_eq!(index.len(), 1);

        index.clear().unwrap();
        assert!(index.is_empty());
    }
}
