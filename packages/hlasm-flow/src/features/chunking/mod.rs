//! Chunking feature
//!
//! Line-structuring pass and block chunk analysis.
//!
//! ```text
//! raw lines → normalise → LabelBlockPass → BlockTree → Chunker → BlockChunk
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{Chunker, ExtractBlocks};
pub use domain::{
    BlockChunk, BlockTree, CodeElement, ElementType, LabelledBlock, SectionKind, ROOT_LABEL,
};
pub use infrastructure::{classify_line, LabelBlockPass, LineClass};
