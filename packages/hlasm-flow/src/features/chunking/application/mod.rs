//! Chunking application layer

pub mod chunker;
pub mod extract_blocks;

pub use chunker::Chunker;
pub use extract_blocks::ExtractBlocks;
