//! Macro catalog domain models

mod macro_definition;

pub use macro_definition::{DuplicateMacro, MacroCatalog, MacroDefinition};
