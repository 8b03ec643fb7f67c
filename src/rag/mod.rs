pub mod chunker;

pub use chunker::{chunk_id, chunk_text, split_pages, TextChunk, TextChunker};
