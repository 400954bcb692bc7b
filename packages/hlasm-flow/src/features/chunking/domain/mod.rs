//! Chunking domain models

mod block;
mod block_chunk;

pub use block::{BlockTree, CodeElement, ElementType, LabelledBlock, ROOT_LABEL};
pub use block_chunk::{BlockChunk, SectionKind};
