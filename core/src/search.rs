use crate::index::IndexStore;
use crate::snippet;
use crate::tokenizer::Analyzer;
use crate::DocId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// A ranked result as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub description: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredDoc {
    pub doc_id: DocId,
    pub weight: u64,
    /// First query term (in query order) whose postings contain this document.
    pub anchor: String,
}

/// Read-only query engine over a built index. Cheap to clone.
#[derive(Clone)]
pub struct Searcher {
    index: Arc<IndexStore>,
    analyzer: Arc<Analyzer>,
}

impl Searcher {
    pub fn new(index: Arc<IndexStore>, analyzer: Arc<Analyzer>) -> Self {
        Self { index, analyzer }
    }

    pub fn index(&self) -> &IndexStore { &self.index }

    /// Distinct lowercase query terms, in the order they first appear.
    pub fn query_terms(&self, query: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        self.analyzer
            .split_for_search(query)
            .into_iter()
            .map(|t| t.to_lowercase())
            .filter(|t| seen.insert(t.clone()))
            .collect()
    }

    /// Merge the postings of every query term and order documents by total weight,
    /// ties broken by ascending id.
    pub fn rank(&self, query: &str) -> Vec<ScoredDoc> {
        let mut merged: HashMap<DocId, ScoredDoc> = HashMap::new();
        for term in self.query_terms(query) {
            let Some(postings) = self.index.postings(&term) else { continue };
            for p in postings {
                merged
                    .entry(p.doc_id)
                    .or_insert_with(|| ScoredDoc { doc_id: p.doc_id, weight: 0, anchor: term.clone() })
                    .weight += u64::from(p.weight);
            }
        }
        let mut ranked: Vec<ScoredDoc> = merged.into_values().collect();
        sort_ranked(&mut ranked);
        ranked
    }

    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        let start = std::time::Instant::now();
        let hits: Vec<SearchHit> = self
            .rank(query)
            .into_iter()
            .filter_map(|scored| {
                let doc = self.index.document(scored.doc_id)?;
                Some(SearchHit {
                    title: doc.title.clone(),
                    description: snippet::extract(&doc.content, &scored.anchor),
                    url: doc.url.clone(),
                })
            })
            .collect();
        tracing::info!(query, hits = hits.len(), took_us = start.elapsed().as_micros() as u64, "search");
        hits
    }

    /// Search and serialize the hits as a JSON array.
    pub fn search_json(&self, query: &str) -> serde_json::Result<String> {
        serde_json::to_string(&self.search(query))
    }
}

pub fn sort_ranked(ranked: &mut [ScoredDoc]) {
    ranked.sort_by(|a, b| b.weight.cmp(&a.weight).then(a.doc_id.cmp(&b.doc_id)));
}
