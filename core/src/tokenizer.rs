use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use unicode_normalization::UnicodeNormalization;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

lazy_static! {
    static ref RE: Regex = Regex::new(r"(?u)\p{L}[\p{L}\p{N}_']*|\p{N}+").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
}

const ENGLISH_STOPWORDS: &[&str] = &[
    "a","about","above","after","again","against","all","am","an","and","any","are","aren't","as","at",
    "be","because","been","before","being","below","between","both","but","by",
    "can","can't","cannot","could","couldn't",
    "did","didn't","do","does","doesn't","doing","don't","down","during",
    "each","few","for","from","further",
    "had","hadn't","has","hasn't","have","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
    "i","i'd","i'll","i'm","i've","if","in","into","is","isn't","it","it's","its","itself",
    "let's","me","more","most","mustn't","my","myself",
    "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
    "same","she","she'd","she'll","she's","should","shouldn't","so","some","such",
    "than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
    "under","until","up","very",
    "was","wasn't","we","we'd","we'll","we're","we've","were","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","with","won't","would","wouldn't",
    "you","you'd","you'll","you're","you've","your","yours","yourself","yourselves"
];

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("failed to open stopword file {}: {source}", path.display())]
    Open { path: PathBuf, source: std::io::Error },
}

/// Splits text into search terms. The stopword set is fixed at construction,
/// so an analyzer is always ready to tokenize.
#[derive(Debug, Clone)]
pub struct Analyzer {
    stopwords: HashSet<String>,
    stem: bool,
}

impl Analyzer {
    pub fn new<I, S>(stopwords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let stopwords = stopwords
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { stopwords, stem: false }
    }

    /// Analyzer with the built-in English stopword list.
    pub fn english() -> Self { Self::new(ENGLISH_STOPWORDS.iter().copied()) }

    /// Load stopwords from a file with one word per line.
    pub fn from_stopwords_file<P: AsRef<Path>>(path: P) -> Result<Self, AnalyzerError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| {
            tracing::error!(path = %path.display(), error = %source, "cannot open stopword file");
            AnalyzerError::Open { path: path.to_path_buf(), source }
        })?;
        let analyzer = Self::new(text.lines());
        tracing::info!(path = %path.display(), stopwords = analyzer.stopwords.len(), "loaded stopwords");
        Ok(analyzer)
    }

    /// Reduce terms to their English stem. Off by default: stemmed terms are
    /// used as snippet anchors and may no longer occur verbatim in the content.
    pub fn with_stemming(mut self, stem: bool) -> Self {
        self.stem = stem;
        self
    }

    pub fn is_stopword(&self, token: &str) -> bool { self.stopwords.contains(token) }

    /// Tokenize text into lowercase terms using NFKC normalization, with stopwords removed.
    pub fn split_for_search(&self, text: &str) -> Vec<String> {
        let normalized = text.nfkc().collect::<String>().to_lowercase();
        let mut terms = Vec::new();
        for mat in RE.find_iter(&normalized) {
            let token = mat.as_str();
            if self.is_stopword(token) { continue; }
            if self.stem {
                terms.push(STEMMER.stem(token).into_owned());
            } else {
                terms.push(token.to_string());
            }
        }
        terms
    }
}

impl Default for Analyzer {
    fn default() -> Self { Self::english() }
}
