//! The corpus file format: one document per line, fields separated by `0x03`.

use std::io::{self, BufRead, Write};
use thiserror::Error;

pub const FIELD_SEPARATOR: char = '\u{3}';

/// A title/content/url triple as it appears in the corpus, before an id is assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub title: String,
    pub content: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedRecord {
    #[error("line {line}: expected 3 fields, found {fields}")]
    FieldCount { line: usize, fields: usize },
    #[error("line {line}: not valid UTF-8")]
    InvalidUtf8 { line: usize },
}

impl MalformedRecord {
    pub fn line(&self) -> usize {
        match self {
            Self::FieldCount { line, .. } | Self::InvalidUtf8 { line } => *line,
        }
    }
}

/// Split a line into fields. Runs of adjacent separators count as one, but a
/// leading or trailing separator still yields an empty first or last field.
fn split_fields(line: &str) -> Vec<&str> {
    let pieces: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    let last = pieces.len() - 1;
    pieces
        .into_iter()
        .enumerate()
        .filter(|(i, p)| !p.is_empty() || *i == 0 || *i == last)
        .map(|(_, p)| p)
        .collect()
}

/// Parse one corpus line. A trailing `\r` is ignored.
pub fn parse_record(line: &str, line_no: usize) -> Result<RawRecord, MalformedRecord> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let fields = split_fields(line);
    match fields.as_slice() {
        [title, content, url] => Ok(RawRecord {
            title: title.to_string(),
            content: content.to_string(),
            url: url.to_string(),
        }),
        _ => Err(MalformedRecord::FieldCount { line: line_no, fields: fields.len() }),
    }
}

/// Iterates over the records of a corpus. Line numbers are 1-based.
pub struct CorpusReader<R> {
    reader: R,
    buf: Vec<u8>,
    line_no: usize,
}

impl<R: BufRead> CorpusReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, buf: Vec::new(), line_no: 0 }
    }
}

impl<R: BufRead> Iterator for CorpusReader<R> {
    /// The outer `Result` carries read failures, the inner one malformed lines.
    type Item = io::Result<Result<RawRecord, MalformedRecord>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                self.line_no += 1;
                let raw = self.buf.strip_suffix(b"\n").unwrap_or(&self.buf[..]);
                let record = match std::str::from_utf8(raw) {
                    Ok(line) => parse_record(line, self.line_no),
                    Err(_) => Err(MalformedRecord::InvalidUtf8 { line: self.line_no }),
                };
                Some(Ok(record))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

fn flatten(field: &str) -> String {
    field
        .chars()
        .map(|c| if matches!(c, '\n' | '\r' | FIELD_SEPARATOR) { ' ' } else { c })
        .collect()
}

/// Write one record in corpus format. Characters that would break the framing
/// (newlines and the separator itself) are replaced with spaces. Empty content
/// is written as a single space, since adjacent separators merge on read.
pub fn write_record<W: Write>(out: &mut W, title: &str, content: &str, url: &str) -> io::Result<()> {
    let content = if content.is_empty() { " ".to_string() } else { flatten(content) };
    writeln!(
        out,
        "{}{sep}{}{sep}{}",
        flatten(title),
        content,
        flatten(url),
        sep = FIELD_SEPARATOR
    )
}
