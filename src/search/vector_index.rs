/// HNSW vector index for cosine similarity search
use hnsw_rs::prelude::*;
use std::sync::RwLock;
use thiserror::Error;

/// Upper bound on HNSW layers (hnsw_rs caps at 16)
const MAX_LAYERS: usize = 16;

#[derive(Error, Debug)]
pub enum VectorIndexError {
    #[error("Invalid dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("Index lock poisoned")]
    LockPoisoned,
}

/// Search result with slot ID and similarity score
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Slot of the document in the owning store
    pub id: u64,
    /// Cosine similarity (1 - cosine distance)
    pub score: f32,
}

/// HNSW vector index wrapper
///
/// Approximate nearest neighbour search over cosine distance. The index
/// lives in memory only.
pub struct VectorIndex {
    index: RwLock<Hnsw<'static, f32, DistCosine>>,
    dimension: usize,
    count: RwLock<u64>,
}

impl VectorIndex {
    /// Create a new vector index
    ///
    /// # Arguments
    /// * `dimension` - Vector dimension (must match embedding dimension)
    /// * `ef_construction` - construction breadth (higher = better recall, slower build)
    /// * `m` - connections per layer
    /// * `capacity` - expected number of vectors
    pub fn new(dimension: usize, ef_construction: usize, m: usize, capacity: usize) -> Self {
        let index = Hnsw::<f32, DistCosine>::new(
            m,
            capacity.max(1),
            MAX_LAYERS,
            ef_construction,
            DistCosine,
        );

        Self {
            index: RwLock::new(index),
            dimension,
            count: RwLock::new(0),
        }
    }

    /// Insert a vector under `id`
    pub fn insert(&self, id: u64, vector: &[f32]) -> Result<(), VectorIndexError> {
        if vector.len() != self.dimension {
            return Err(VectorIndexError::InvalidDimension {
                expected: self.dimension,
                actual: vector.len(),
            });
        }

        let data = vector.to_vec();

        let index = self
            .index
            .write()
            .map_err(|_| VectorIndexError::LockPoisoned)?;
        index.insert((&data, id as usize));

        let mut count = self
            .count
            .write()
            .map_err(|_| VectorIndexError::LockPoisoned)?;
        *count += 1;

        Ok(())
    }

    /// Search for the `k` nearest neighbours, most similar first
    ///
    /// * `ef_search` - search breadth (higher = better recall, slower search)
    pub fn search(
        &self,
        query: &[f32],
        k: usize,
        ef_search: usize,
    ) -> Result<Vec<SearchResult>, VectorIndexError> {
        if query.len() != self.dimension {
            return Err(VectorIndexError::InvalidDimension {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let index = self
            .index
            .read()
            .map_err(|_| VectorIndexError::LockPoisoned)?;

        let mut results: Vec<SearchResult> = index
            .search(query, k, ef_search.max(k))
            .into_iter()
            .map(|neighbor| SearchResult {
                id: neighbor.d_id as u64,
                score: 1.0 - neighbor.distance,
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.id.cmp(&b.id))
        });

        Ok(results)
    }

    /// Get the number of vectors in the index
    pub fn len(&self) -> u64 {
        self.count.read().map(|c| *c).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(dim: usize, hot: usize) -> Vec<f32> {
        let mut v = vec![0.0; dim];
        v[hot] = 1.0;
        v
    }

    #[test]
    fn test_index_creation() {
        let index = VectorIndex::new(8, 200, 16, 10);
        assert_eq!(index.dimension(), 8);
        assert_eq!(index.len(), 0);
        assert!(index.is_empty());
    }

    #[test]
    fn test_insert_and_search() {
        let index = VectorIndex::new(8, 200, 16, 10);

        let vec1 = unit(8, 0);
        let vec2 = unit(8, 1);
        let mut vec3 = vec![0.0; 8];
        vec3[0] = 0.9;
        vec3[1] = 0.1;

        index.insert(1, &vec1).unwrap();
        index.insert(2, &vec2).unwrap();
        index.insert(3, &vec3).unwrap();
        assert_eq!(index.len(), 3);

        let results = index.search(&vec1, 2, 50).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, 1);
        assert!(results[0].score > 0.99);
        assert_eq!(results[1].id, 3);
    }

    #[test]
    fn test_empty_search() {
        let index = VectorIndex::new(4, 200, 16, 10);
        let results = index.search(&unit(4, 0), 5, 50).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_dimension_validation() {
        let index = VectorIndex::new(384, 200, 16, 10);
        assert!(index.insert(1, &vec![1.0; 128]).is_err());
        assert!(index.search(&vec![1.0; 128], 1, 10).is_err());
    }
}
