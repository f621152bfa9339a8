use crate::corpus::{MalformedRecord, RawRecord};
use crate::index::IndexStore;
use crate::tokenizer::Analyzer;
use crate::{DocId, Document, InvertedList, Posting};
use serde::Serialize;
use std::collections::HashMap;

pub const TITLE_WEIGHT: u32 = 10;
pub const CONTENT_WEIGHT: u32 = 1;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct TermCounts {
    title: u32,
    content: u32,
}

impl TermCounts {
    fn weight(&self) -> u32 { TITLE_WEIGHT * self.title + CONTENT_WEIGHT * self.content }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    pub documents: usize,
    pub terms: usize,
    pub postings: usize,
    pub skipped: usize,
}

/// Accumulates the forward and inverted indexes while the corpus is read.
/// `finish` freezes the result into an `IndexStore`.
pub struct IndexBuilder<'a> {
    analyzer: &'a Analyzer,
    forward: Vec<Document>,
    inverted: HashMap<String, InvertedList>,
    postings: usize,
    skipped: usize,
}

impl<'a> IndexBuilder<'a> {
    pub fn new(analyzer: &'a Analyzer) -> Self {
        Self { analyzer, forward: Vec::new(), inverted: HashMap::new(), postings: 0, skipped: 0 }
    }

    /// Append a record to the forward index and post its terms. Returns the assigned id.
    pub fn add_record(&mut self, record: RawRecord) -> DocId {
        let id = self.forward.len() as DocId;
        let doc = Document { id, title: record.title, content: record.content, url: record.url };

        for (term, counts) in self.count_terms(&doc) {
            let weight = counts.weight();
            if weight == 0 { continue; }
            self.inverted
                .entry(term.clone())
                .or_default()
                .push(Posting { doc_id: id, term, weight });
            self.postings += 1;
        }
        self.forward.push(doc);

        let indexed = self.forward.len();
        if indexed % 100 == 0 {
            tracing::info!(indexed, "indexing progress");
        }
        id
    }

    pub fn skip_malformed(&mut self, err: &MalformedRecord) {
        self.skipped += 1;
        tracing::warn!(line = err.line(), error = %err, "skipping malformed corpus record");
    }

    pub fn stats(&self) -> BuildStats {
        BuildStats {
            documents: self.forward.len(),
            terms: self.inverted.len(),
            postings: self.postings,
            skipped: self.skipped,
        }
    }

    pub fn finish(self) -> (IndexStore, BuildStats) {
        let stats = self.stats();
        tracing::info!(
            documents = stats.documents,
            terms = stats.terms,
            postings = stats.postings,
            skipped = stats.skipped,
            "index build complete"
        );
        (IndexStore::from_parts(self.forward, self.inverted), stats)
    }

    fn count_terms(&self, doc: &Document) -> HashMap<String, TermCounts> {
        let mut counts: HashMap<String, TermCounts> = HashMap::new();
        for term in self.analyzer.split_for_search(&doc.title) {
            counts.entry(term.to_lowercase()).or_default().title += 1;
        }
        for term in self.analyzer.split_for_search(&doc.content) {
            counts.entry(term.to_lowercase()).or_default().content += 1;
        }
        counts
    }
}
