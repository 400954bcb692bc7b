//! Target extraction application layer

pub mod extractor;

pub use extractor::TargetExtractor;
