//! Ragscope - Retrieval-augmented question answering with explainable relevance
//!
//! Answers questions over a document collection by retrieving candidate
//! documents, validating each one with a multi-signal relevance score, and
//! handing only the documents that pass to a chat model as context.

pub mod cli;
pub mod config;
pub mod documents;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod quality;
pub mod rag;
pub mod relevance;
pub mod search;
pub mod session;

pub use error::{RagError, Result};
