//! Word-count chunking.
//!
//! Text is split on whitespace and regrouped into contiguous,
//! non-overlapping runs of at most `chunk_size` words, joined by single
//! spaces. There is no sentence awareness; a chunk may end mid-sentence.

use std::str::SplitWhitespace;

/// Default maximum words per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Splits documents into bounded word-count chunks.
#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    chunk_size: usize,
}

impl Default for Chunker {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

impl Chunker {
    /// Create a chunker; a size of 0 is treated as 1.
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Lazily iterate the chunks of `text`, first chunk first.
    ///
    /// The iterator borrows `text` and is `Clone`; cloning it (or calling
    /// `chunks` again) restarts from the beginning.
    pub fn chunks<'a>(&self, text: &'a str) -> WordChunks<'a> {
        WordChunks {
            words: text.split_whitespace(),
            chunk_size: self.chunk_size,
        }
    }
}

/// Iterator over the word chunks of one document.
#[derive(Debug, Clone)]
pub struct WordChunks<'a> {
    words: SplitWhitespace<'a>,
    chunk_size: usize,
}

impl Iterator for WordChunks<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            let mut chunk = String::new();
            let mut taken = 0;

            for word in self.words.by_ref().take(self.chunk_size) {
                if taken > 0 {
                    chunk.push(' ');
                }
                chunk.push_str(word);
                taken += 1;
            }

            if taken == 0 {
                return None;
            }
            if !chunk.trim().is_empty() {
                return Some(chunk);
            }
        }
    }
}

/// Chunk `text` eagerly.
pub fn chunk_text(text: &str, chunk_size: usize) -> Vec<String> {
    let chunks: Vec<String> = Chunker::new(chunk_size).chunks(text).collect();

    tracing::debug!(
        "Chunked text into {} chunks (size: {} words)",
        chunks.len(),
        chunk_size
    );

    chunks
}
