//! Chunking infrastructure

pub mod label_block_pass;

pub use label_block_pass::{classify_line, LabelBlockPass, LineClass};
