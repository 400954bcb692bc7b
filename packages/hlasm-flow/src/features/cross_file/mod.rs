//! Cross-file dependency tracking
//!
//! Program-level dependency map used by the whole-file analysis mode, plus
//! the record of dependency names that resolved to no file.

pub mod dep_map;

pub use dep_map::{DependencyMap, MissingDependency};
