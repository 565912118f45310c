use domain::models::{Chunk, Document};
use rayon::prelude::*;
use std::collections::VecDeque;

const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Splits text on progressively finer separators until every piece fits, then
/// greedily merges neighbours back up to `chunk_size` characters with overlap.
#[derive(Debug, Clone)]
pub struct RecursiveTextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl RecursiveTextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            chunk_overlap: chunk_overlap.min(chunk_size.saturating_sub(1)),
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn split_document(&self, document: &Document) -> Vec<Chunk> {
        let per_page: Vec<(usize, Vec<String>)> = document
            .pages()
            .par_iter()
            .map(|page| (page.number, self.split_text(&page.text)))
            .collect();

        per_page
            .into_iter()
            .flat_map(|(page, texts)| texts.into_iter().map(move |t| (page, t)))
            .enumerate()
            .map(|(index, (page, text))| Chunk::new(document.source(), page, index, text))
            .collect()
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let mut final_chunks = Vec::new();

        let mut separator = separators.last().map(String::as_str).unwrap_or("");
        let mut remaining: &[String] = &[];
        for (i, sep) in separators.iter().enumerate() {
            if sep.is_empty() {
                separator = "";
                break;
            }
            if text.contains(sep.as_str()) {
                separator = sep;
                remaining = &separators[i + 1..];
                break;
            }
        }

        let mut good_splits: Vec<&str> = Vec::new();
        for piece in split_keeping_separator(text, separator) {
            if char_len(piece) < self.chunk_size {
                good_splits.push(piece);
                continue;
            }
            if !good_splits.is_empty() {
                final_chunks.extend(self.merge_splits(&good_splits));
                good_splits.clear();
            }
            if remaining.is_empty() {
                let trimmed = piece.trim();
                if !trimmed.is_empty() {
                    final_chunks.push(trimmed.to_string());
                }
            } else {
                final_chunks.extend(self.split_recursive(piece, remaining));
            }
        }
        if !good_splits.is_empty() {
            final_chunks.extend(self.merge_splits(&good_splits));
        }
        final_chunks
    }

    fn merge_splits(&self, splits: &[&str]) -> Vec<String> {
        let mut docs = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for &piece in splits {
            let len = char_len(piece);
            if total + len > self.chunk_size && !current.is_empty() {
                push_joined(&mut docs, &current);
                // Keep a tail of whole pieces no longer than the overlap.
                while total > self.chunk_overlap || (total + len > self.chunk_size && total > 0) {
                    match current.pop_front() {
                        Some(front) => total -= char_len(front),
                        None => break,
                    }
                }
            }
            current.push_back(piece);
            total += len;
        }
        push_joined(&mut docs, &current);
        docs
    }
}

fn push_joined(docs: &mut Vec<String>, pieces: &VecDeque<&str>) {
    let joined: String = pieces.iter().copied().collect();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        docs.push(trimmed.to_string());
    }
}

/// Split on `separator`, attaching each separator to the start of the piece after it.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }
    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, _) in text.match_indices(separator) {
        pieces.push(&text[start..idx]);
        start = idx;
    }
    pieces.push(&text[start..]);
    pieces.retain(|p| !p.is_empty());
    pieces
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
