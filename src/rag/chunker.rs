use crate::config;
use crate::error::{AnalyzerError, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Word window of a document, ready for embedding
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextChunk {
    pub text: String,
    pub source: String,
    pub page: u32,
    pub start_word: usize,
    pub chunk_id: String,
}

impl TextChunk {
    pub fn word_count(&self) -> usize {
        self.text.split(' ').count()
    }
}

/// Deterministic id for a window: `{source}_p{page}_c{start}`
pub fn chunk_id(source: &str, page: u32, start_word: usize) -> String {
    format!("{}_p{}_c{}", source, page, start_word)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Default for TextChunker {
    fn default() -> Self {
        Self {
            chunk_size: config::CHUNK_SIZE,
            chunk_overlap: config::CHUNK_OVERLAP,
        }
    }
}

impl TextChunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(AnalyzerError::InvalidCriteria("chunk_size must be positive".to_string()));
        }
        if chunk_overlap >= chunk_size {
            return Err(AnalyzerError::InvalidCriteria(format!(
                "chunk_overlap {} must be smaller than chunk_size {}",
                chunk_overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Words between consecutive window starts
    pub fn stride(&self) -> usize {
        self.chunk_size - self.chunk_overlap
    }

    /// Split `text` into overlapping word windows.
    /// The window that reaches the last word is the final one.
    pub fn chunk_text(&self, text: &str, source: &str, page: u32) -> Vec<TextChunk> {
        let words: Vec<&str> = text.split_whitespace().collect();
        let mut chunks = Vec::new();

        let mut start = 0;
        while start < words.len() {
            let end = (start + self.chunk_size).min(words.len());
            chunks.push(TextChunk {
                text: words[start..end].join(" "),
                source: source.to_string(),
                page,
                start_word: start,
                chunk_id: chunk_id(source, page, start),
            });

            if end == words.len() {
                break;
            }
            start += self.stride();
        }

        chunks
    }

    /// Chunk every page of a document; pages are numbered from 1
    pub fn chunk_document(&self, pages: &[&str], source: &str) -> Vec<TextChunk> {
        pages
            .par_iter()
            .enumerate()
            .flat_map_iter(|(idx, page)| self.chunk_text(page, source, idx as u32 + 1))
            .collect()
    }
}

/// Chunk with the default window (500 words, 50 overlap)
pub fn chunk_text(text: &str, source: &str, page: u32) -> Vec<TextChunk> {
    TextChunker::default().chunk_text(text, source, page)
}

/// Split extracted text on form-feed page breaks
pub fn split_pages(text: &str) -> Vec<&str> {
    text.split(config::PAGE_BREAK).collect()
}
