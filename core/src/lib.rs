use serde::{Deserialize, Serialize};

pub mod builder;
pub mod corpus;
pub mod index;
pub mod search;
pub mod snippet;
pub mod tokenizer;

pub use builder::{BuildStats, IndexBuilder};
pub use index::{IndexError, IndexStore};
pub use search::{ScoredDoc, SearchHit, Searcher};
pub use tokenizer::Analyzer;

pub type DocId = u64;

/// One entry of the forward index. `id` equals the slot position in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub title: String,
    pub content: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub term: String,
    pub weight: u32, // 10 per title hit, 1 per content hit
}

/// Postings for a single term, in the order documents were indexed.
pub type InvertedList = Vec<Posting>;
