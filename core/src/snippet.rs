//! Excerpts of document content around a matched term.

use unicode_normalization::UnicodeNormalization;

/// Returned when the term does not occur in the content.
pub const NO_SNIPPET: &str = "None";

const CHARS_BEFORE: usize = 50;
const CHARS_AFTER: usize = 100;

fn fold(text: impl Iterator<Item = char>) -> impl Iterator<Item = char> {
    text.nfkc().flat_map(char::to_lowercase)
}

/// Byte offset of the first occurrence of `needle`, comparing both sides after
/// NFKC normalization and lowercasing, the same folding the analyzer applies.
pub fn find_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    let needle: Vec<char> = fold(needle.chars()).collect();
    if needle.is_empty() { return None; }
    haystack.char_indices().map(|(i, _)| i).find(|&i| {
        let mut folded = fold(haystack[i..].chars());
        needle.iter().all(|&n| folded.next() == Some(n))
    })
}

fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices().nth(chars).map_or(text.len(), |(i, _)| i)
}

/// Take up to 50 characters before and 100 from the first occurrence of `term`,
/// followed by `...`. Offsets count chars, not bytes.
pub fn extract(content: &str, term: &str) -> String {
    let Some(found) = find_case_insensitive(content, term) else {
        return NO_SNIPPET.to_string();
    };
    let pos = content[..found].chars().count();
    let len = pos + content[found..].chars().count();
    let start = pos.saturating_sub(CHARS_BEFORE);
    let end = (pos + CHARS_AFTER).min(len);
    if start >= end {
        return NO_SNIPPET.to_string();
    }
    let mut snippet = content[byte_offset(content, start)..byte_offset(content, end)].to_string();
    snippet.push_str("...");
    snippet
}
