//! Macro definitions and the catalog holding them

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// One cataloged macro definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroDefinition {
    /// Macro name, uppercased
    pub name: String,
    pub source_file: PathBuf,
    /// 1-indexed line of the prototype statement
    pub header_line: usize,
    /// Name-field placeholder of the prototype (`&LBL`), prefix stripped
    pub label_parameter: Option<String>,
    /// Formal parameters in prototype order, prefix and defaults stripped
    pub parameters: Vec<String>,
    /// Parameters used as call targets in the body, first appearance first
    pub call_parameters: Vec<String>,
    /// Raw lines from the opening to the closing delimiter
    pub lines: Vec<String>,
}

impl MacroDefinition {
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Position of a formal parameter
    pub fn parameter_index(&self, param: &str) -> Option<usize> {
        self.parameters
            .iter()
            .position(|p| p.eq_ignore_ascii_case(param))
    }
}

/// A later definition shadowed by an earlier one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateMacro {
    pub name: String,
    pub kept_file: PathBuf,
    pub ignored_file: PathBuf,
    pub ignored_line: usize,
}

/// Name → definition map; the first definition of a name wins
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacroCatalog {
    order: Vec<String>,
    macros: HashMap<String, MacroDefinition>,
    duplicates: Vec<DuplicateMacro>,
}

impl MacroCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition; returns the kept definition's file when the
    /// name was already taken
    pub fn register(&mut self, definition: MacroDefinition) -> Option<PathBuf> {
        let key = definition.name.to_ascii_uppercase();
        if let Some(existing) = self.macros.get(&key) {
            let kept = existing.source_file.clone();
            self.duplicates.push(DuplicateMacro {
                name: key,
                kept_file: kept.clone(),
                ignored_file: definition.source_file,
                ignored_line: definition.header_line,
            });
            return Some(kept);
        }
        self.order.push(key.clone());
        self.macros.insert(key, definition);
        None
    }

    pub fn get(&self, name: &str) -> Option<&MacroDefinition> {
        self.macros.get(&name.to_ascii_uppercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Definitions in discovery order
    pub fn iter(&self) -> impl Iterator<Item = &MacroDefinition> {
        self.order.iter().filter_map(|name| self.macros.get(name))
    }

    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn duplicates(&self) -> &[DuplicateMacro] {
        &self.duplicates
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(name: &str, file: &str) -> MacroDefinition {
        MacroDefinition {
            name: name.to_string(),
            source_file: PathBuf::from(file),
            header_line: 2,
            label_parameter: None,
            parameters: vec!["F".to_string(), "ERR".to_string()],
            call_parameters: vec!["ERR".to_string()],
            lines: vec![],
        }
    }

    #[test]
    fn test_first_definition_wins() {
        let mut catalog = MacroCatalog::new();
        assert!(catalog.register(def("CHECK", "a.mac")).is_none());
        assert_eq!(
            catalog.register(def("check", "b.mac")),
            Some(PathBuf::from("a.mac"))
        );
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("Check").unwrap().source_file, PathBuf::from("a.mac"));
        assert_eq!(catalog.duplicates().len(), 1);
        assert_eq!(catalog.duplicates()[0].ignored_file, PathBuf::from("b.mac"));
    }

    #[test]
    fn test_parameter_index() {
        let d = def("CHECK", "a.mac");
        assert_eq!(d.parameter_index("err"), Some(1));
        assert_eq!(d.parameter_index("X"), None);
    }
}
