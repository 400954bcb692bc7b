//! Macro catalog feature
//!
//! Discovers macro definitions across the searchable file set and records,
//! for each macro, which formal parameters its body uses as call targets.

pub mod domain;
pub mod infrastructure;

pub use domain::{DuplicateMacro, MacroCatalog, MacroDefinition};
pub use infrastructure::MacroCatalogBuilder;
