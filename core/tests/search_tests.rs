use sift_core::snippet::NO_SNIPPET;
use sift_core::tokenizer::AnalyzerError;
use sift_core::{Analyzer, IndexError, IndexStore, Searcher};
use std::collections::HashSet;
use std::io::Write;
use std::sync::Arc;
use std::thread;

fn line(title: &str, content: &str, url: &str) -> String {
    format!("{title}\u{3}{content}\u{3}{url}\n")
}

fn build(corpus: &str) -> IndexStore {
    IndexStore::build(corpus.as_bytes(), &Analyzer::english()).unwrap().0
}

fn searcher(corpus: &str) -> Searcher {
    Searcher::new(Arc::new(build(corpus)), Arc::new(Analyzer::english()))
}

fn sample_corpus() -> String {
    [
        line("Boost Asio", "Asio is a cross-platform library for network and low-level I/O programming.", "https://b/asio"),
        line("Boost Filesystem", "Portable facilities to query and manipulate paths, files and directories.", "https://b/fs"),
        line("Boost Regex", "Regular expressions for text processing. Regex is fast.", "https://b/regex"),
        line("Networking TS", "The networking library is based on asio.", "https://b/net"),
    ]
    .concat()
}

#[test]
fn postings_reference_valid_documents_once() {
    let store = build(&sample_corpus());
    let mut seen = HashSet::new();
    for (term, postings) in store.terms() {
        for p in postings {
            assert!((p.doc_id as usize) < store.len());
            assert_eq!(p.term, term);
            assert!(p.weight >= 1);
            assert!(seen.insert((term.to_string(), p.doc_id)), "duplicate posting for {term} in {}", p.doc_id);
        }
    }
}

#[test]
fn postings_keep_insertion_order() {
    let store = build(&sample_corpus());
    let ids: Vec<u64> = store.postings("asio").unwrap().iter().map(|p| p.doc_id).collect();
    assert_eq!(ids, vec![0, 3]);
}

#[test]
fn weight_counts_title_and_content_case_insensitively() {
    let store = build(&line("Rust RUST", "rust Rust rusty", "u"));
    let p = &store.postings("rust").unwrap()[0];
    assert_eq!(p.weight, 10 * 2 + 2);
    assert_eq!(store.postings("rusty").unwrap()[0].weight, 1);
}

#[test]
fn first_record_round_trips() {
    let store = build(&line("Hello World", "Some content", "http://x"));
    let doc = store.document(0).unwrap();
    assert_eq!((doc.id, doc.title.as_str(), doc.content.as_str(), doc.url.as_str()), (0, "Hello World", "Some content", "http://x"));
}

#[test]
fn merged_weights_are_summed_per_document() {
    let mut corpus = String::new();
    for i in 0..5 {
        corpus.push_str(&line(&format!("filler {i}"), "nothing relevant", "u"));
    }
    corpus.push_str(&line("alpha", "beta", "http://five"));
    let s = searcher(&corpus);

    let ranked = s.rank("alpha beta");
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].doc_id, 5);
    assert_eq!(ranked[0].weight, 11);
}

#[test]
fn duplicate_query_terms_are_looked_up_once() {
    let s = searcher(&sample_corpus());
    assert_eq!(s.rank("regex"), s.rank("regex Regex REGEX"));
}

#[test]
fn ranking_is_descending_with_id_tiebreak() {
    let corpus = [
        line("d0", &"kw ".repeat(5), "u0"),
        line("d1", &"kw ".repeat(9), "u1"),
        line("d2", &"kw ".repeat(9), "u2"),
        line("d3", &"kw ".repeat(2), "u3"),
    ]
    .concat();
    let s = searcher(&corpus);
    let weights: Vec<(u64, u64)> = s.rank("kw").iter().map(|r| (r.doc_id, r.weight)).collect();
    assert_eq!(weights, vec![(1, 9), (2, 9), (0, 5), (3, 2)]);

    let urls: Vec<String> = s.search("kw").into_iter().map(|h| h.url).collect();
    assert_eq!(urls, vec!["u1", "u2", "u0", "u3"]);
}

#[test]
fn unknown_terms_contribute_nothing() {
    let s = searcher(&sample_corpus());
    assert!(s.search("zebra").is_empty());
    assert_eq!(s.rank("zebra regex"), s.rank("regex"));
    assert!(s.search("").is_empty());
    assert!(s.search("the and of").is_empty());
}

#[test]
fn malformed_record_does_not_leave_id_gap() {
    let corpus = format!("{}broken line\n{}", line("first", "one", "u1"), line("second", "two", "u2"));
    let (store, stats) = IndexStore::build(corpus.as_bytes(), &Analyzer::english()).unwrap();
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.documents, 2);
    assert_eq!(store.len(), 2);
    assert_eq!(store.document(0).unwrap().title, "first");
    assert_eq!(store.document(1).unwrap().title, "second");
    assert_eq!(store.document(1).unwrap().id, 1);
}

#[test]
fn hits_carry_snippet_around_anchor() {
    let s = searcher(&sample_corpus());
    let hits = s.search("regex");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Boost Regex");
    assert_eq!(hits[0].url, "https://b/regex");
    assert_eq!(hits[0].description, "Regular expressions for text processing. Regex is fast....");
}

#[test]
fn title_only_match_has_no_snippet() {
    let s = searcher(&sample_corpus());
    let hits = s.search("filesystem");
    assert_eq!(hits[0].description, NO_SNIPPET);
}

#[test]
fn anchor_is_first_matching_query_term() {
    let s = searcher(&line("alpha", "beta gamma", "u"));
    assert_eq!(s.rank("gamma alpha")[0].anchor, "gamma");
    assert_eq!(s.rank("missing alpha gamma")[0].anchor, "alpha");
}

#[test]
fn search_json_is_a_bare_array() {
    let s = searcher(&sample_corpus());
    let json: serde_json::Value = serde_json::from_str(&s.search_json("asio").unwrap()).unwrap();
    let arr = json.as_array().unwrap();
    assert_eq!(arr.len(), 2);
    assert_eq!(arr[0]["title"], "Boost Asio");
    assert!(arr[0].get("description").is_some());
    assert_eq!(arr[1]["url"], "https://b/net");
}

#[test]
fn concurrent_searches_agree() {
    let s = searcher(&sample_corpus());
    let expected = s.search("asio library");
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let s = s.clone();
            thread::spawn(move || s.search("asio library"))
        })
        .collect();
    for h in handles {
        assert_eq!(h.join().unwrap(), expected);
    }
}

#[test]
fn open_reads_corpus_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(sample_corpus().as_bytes()).unwrap();
    let (store, stats) = IndexStore::open(file.path(), &Analyzer::english()).unwrap();
    assert_eq!(store.len(), 4);
    assert_eq!(stats.skipped, 0);
}

#[test]
fn open_missing_corpus_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let err = IndexStore::open(dir.path().join("absent"), &Analyzer::english()).unwrap_err();
    assert!(matches!(err, IndexError::Open { .. }));
}

#[test]
fn stopword_file_configures_analyzer() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "boost\nlibrary").unwrap();
    let analyzer = Analyzer::from_stopwords_file(file.path()).unwrap();
    let store = IndexStore::build(sample_corpus().as_bytes(), &analyzer).unwrap().0;
    assert!(store.postings("boost").is_none());
    assert!(store.postings("the").is_some());
}

#[test]
fn missing_stopword_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let err = Analyzer::from_stopwords_file(dir.path().join("stop_words.utf8")).unwrap_err();
    assert!(matches!(err, AnalyzerError::Open { .. }));
}

#[test]
fn undecodable_line_is_skipped_and_ids_stay_dense() {
    let corpus: &[u8] = b"first\x03one\x03u1\nbad\xff\x03two\x03u2\nthird\x03three\x03u3\n";
    let (store, stats) = IndexStore::build(corpus, &Analyzer::english()).unwrap();
    assert_eq!(stats.documents, 2);
    assert_eq!(stats.skipped, 1);
    assert_eq!(store.document(0).unwrap().url, "u1");
    assert_eq!(store.document(1).unwrap().url, "u3");
    assert_eq!(store.postings("three").unwrap()[0].doc_id, 1);
    assert!(store.postings("two").is_none());
}

#[test]
fn adjacent_separators_collapse_during_build() {
    let corpus = "t\u{3}\u{3}u\nt2\u{3}c\u{3}\u{3}u2\n";
    let (store, stats) = IndexStore::build(corpus.as_bytes(), &Analyzer::english()).unwrap();
    assert_eq!(stats.skipped, 1);
    assert_eq!(store.len(), 1);
    let doc = store.document(0).unwrap();
    assert_eq!((doc.title.as_str(), doc.content.as_str(), doc.url.as_str()), ("t2", "c", "u2"));
}
