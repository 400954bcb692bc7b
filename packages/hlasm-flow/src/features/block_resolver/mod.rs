//! Block/subroutine resolver feature
//!
//! Materialises the source lines of a target name from the searchable file
//! set and classifies the resulting chunk.

pub mod domain;
pub mod infrastructure;

pub use domain::{ChunkKind, ResolvedBlock, Strategy};
pub use infrastructure::{BlockResolver, SourceFile, SourceSet};
