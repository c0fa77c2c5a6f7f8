//! Recursive character chunking strategy

use std::collections::VecDeque;

use unicode_segmentation::UnicodeSegmentation;

use crate::domain::ingestion::{Chunk, ChunkMetadata, ChunkingConfig, ChunkingStrategy};
use crate::domain::DomainError;

const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Chunking strategy that splits on the coarsest separator present and
/// recurses into pieces that are still too large.
///
/// Splitting order: paragraphs -> lines -> words -> grapheme clusters.
/// Neighbouring chunks share up to `chunk_overlap` characters.
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    separators: Vec<String>,
}

impl Default for RecursiveChunker {
    fn default() -> Self {
        Self::new()
    }
}

impl RecursiveChunker {
    pub fn new() -> Self {
        Self {
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Use a custom separator hierarchy. An empty string means "split into characters".
    pub fn with_separators(separators: Vec<String>) -> Self {
        Self { separators }
    }

    fn split_recursive(
        &self,
        text: &str,
        separators: &[String],
        config: &ChunkingConfig,
    ) -> Vec<String> {
        let (separator, finer) = pick_separator(text, separators);

        let pieces: Vec<&str> = if separator.is_empty() {
            text.graphemes(true).collect()
        } else {
            text.split(separator).filter(|s| !s.is_empty()).collect()
        };

        let mut chunks = Vec::new();
        let mut small: Vec<&str> = Vec::new();

        for piece in pieces {
            if char_len(piece) < config.chunk_size {
                small.push(piece);
                continue;
            }

            if !small.is_empty() {
                chunks.extend(merge_pieces(&small, separator, config));
                small.clear();
            }

            if finer.is_empty() {
                chunks.push(piece.trim().to_string());
            } else {
                chunks.extend(self.split_recursive(piece, finer, config));
            }
        }

        if !small.is_empty() {
            chunks.extend(merge_pieces(&small, separator, config));
        }

        chunks
    }
}

impl ChunkingStrategy for RecursiveChunker {
    fn chunk(&self, content: &str, config: &ChunkingConfig) -> Result<Vec<Chunk>, DomainError> {
        config.validate()?;

        let content = content.trim();
        if content.is_empty() {
            return Ok(Vec::new());
        }

        let texts: Vec<String> = self
            .split_recursive(content, &self.separators, config)
            .into_iter()
            .filter(|t| !t.is_empty() && char_len(t) >= config.min_chunk_size)
            .collect();

        let total = texts.len();

        Ok(texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| Chunk::new(text, ChunkMetadata::new(i, total)))
            .collect())
    }

    fn name(&self) -> &'static str {
        "recursive"
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// First separator found in `text`, plus the finer separators after it
fn pick_separator<'s>(text: &str, separators: &'s [String]) -> (&'s str, &'s [String]) {
    for (i, separator) in separators.iter().enumerate() {
        if separator.is_empty() {
            return (separator.as_str(), &[]);
        }

        if text.contains(separator.as_str()) {
            return (separator.as_str(), &separators[i + 1..]);
        }
    }

    ("", &[])
}

/// Greedily pack pieces into chunks of at most `chunk_size` characters,
/// starting each new chunk with the tail of the previous one.
fn merge_pieces(pieces: &[&str], separator: &str, config: &ChunkingConfig) -> Vec<String> {
    let separator_len = char_len(separator);
    let joiner = |window: &VecDeque<&str>| if window.is_empty() { 0 } else { separator_len };

    let mut chunks = Vec::new();
    let mut window: VecDeque<&str> = VecDeque::new();
    let mut total = 0;

    for &piece in pieces {
        let len = char_len(piece);

        if total + len + joiner(&window) > config.chunk_size && !window.is_empty() {
            push_joined(&mut chunks, &window, separator);

            while total > config.chunk_overlap
                || (total > 0 && total + len + joiner(&window) > config.chunk_size)
            {
                let Some(first) = window.pop_front() else {
                    break;
                };
                total -= char_len(first) + joiner(&window);
            }
        }

        total += len + joiner(&window);
        window.push_back(piece);
    }

    push_joined(&mut chunks, &window, separator);
    chunks
}

fn push_joined(chunks: &mut Vec<String>, window: &VecDeque<&str>, separator: &str) {
    let joined = window.iter().copied().collect::<Vec<_>>().join(separator);
    let trimmed = joined.trim();

    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}
