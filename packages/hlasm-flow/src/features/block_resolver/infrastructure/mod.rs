//! Block resolver infrastructure

pub mod source_set;
pub mod strategies;

pub use source_set::{SourceFile, SourceSet};
pub use strategies::BlockResolver;
