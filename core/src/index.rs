use crate::builder::{BuildStats, IndexBuilder};
use crate::corpus::CorpusReader;
use crate::tokenizer::Analyzer;
use crate::{DocId, Document, InvertedList, Posting};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("failed to open corpus {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },
    #[error("failed to read corpus: {0}")]
    Read(#[from] io::Error),
}

/// Forward and inverted index. Only `IndexBuilder` creates one and nothing
/// mutates it afterwards, so it can be shared across threads behind an `Arc`.
#[derive(Debug, Default)]
pub struct IndexStore {
    forward: Vec<Document>,
    inverted: HashMap<String, InvertedList>,
}

impl IndexStore {
    pub(crate) fn from_parts(forward: Vec<Document>, inverted: HashMap<String, InvertedList>) -> Self {
        Self { forward, inverted }
    }

    /// Build from any line-oriented corpus source. Malformed lines are skipped.
    pub fn build<R: BufRead>(reader: R, analyzer: &Analyzer) -> Result<(Self, BuildStats), IndexError> {
        let mut builder = IndexBuilder::new(analyzer);
        for item in CorpusReader::new(reader) {
            match item? {
                Ok(record) => { builder.add_record(record); }
                Err(malformed) => builder.skip_malformed(&malformed),
            }
        }
        Ok(builder.finish())
    }

    /// Build from a corpus file. Failing to open the file is fatal for the build.
    pub fn open<P: AsRef<Path>>(path: P, analyzer: &Analyzer) -> Result<(Self, BuildStats), IndexError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| {
            tracing::error!(path = %path.display(), error = %source, "cannot open corpus");
            IndexError::Open { path: path.to_path_buf(), source }
        })?;
        tracing::info!(path = %path.display(), "building index");
        Self::build(BufReader::new(file), analyzer)
    }

    pub fn document(&self, id: DocId) -> Option<&Document> {
        let doc = usize::try_from(id).ok().and_then(|i| self.forward.get(i));
        if doc.is_none() {
            tracing::warn!(id, size = self.forward.len(), "document id out of range");
        }
        doc
    }

    /// Postings for `term`, or `None` if it never occurred in the corpus.
    pub fn postings(&self, term: &str) -> Option<&[Posting]> {
        self.inverted.get(term.to_lowercase().as_str()).map(Vec::as_slice)
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> { self.forward.iter() }

    pub fn terms(&self) -> impl Iterator<Item = (&str, &[Posting])> {
        self.inverted.iter().map(|(t, p)| (t.as_str(), p.as_slice()))
    }

    pub fn len(&self) -> usize { self.forward.len() }
    pub fn is_empty(&self) -> bool { self.forward.is_empty() }
    pub fn num_terms(&self) -> usize { self.inverted.len() }
}
