//! Alias table
//!
//! `NAME EQU OTHER` rows with a plain-symbol right-hand side, collected from
//! every searchable file. `*`-relative forms, registers and literals are not
//! aliases. The first definition of a name wins.

use std::collections::{HashMap, HashSet};

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::debug;

use crate::config::FlowConfig;
use crate::features::block_resolver::SourceSet;
use crate::features::parsing::{normalize_with_origin, tokenize_line};
use crate::features::target_extraction::is_symbolic;

#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    order: Vec<String>,
    map: HashMap<String, String>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan a source set for alias rows
    pub fn build(sources: &SourceSet, config: &FlowConfig) -> Self {
        let mut table = Self::new();
        for file in sources.files() {
            for line in normalize_with_origin(&file.lines, config) {
                let tokens = tokenize_line(&line.text);
                if !config.opcodes.is_equate(tokens.opcode_str()) || tokens.operands.len() != 1 {
                    continue;
                }
                let (Some(label), Some(rhs)) = (tokens.label.as_deref(), tokens.first_operand())
                else {
                    continue;
                };
                if is_symbolic(label) && is_symbolic(rhs) {
                    table.insert(label, rhs);
                }
            }
        }
        debug!(aliases = table.len(), "Alias table built");
        table
    }

    /// Record `name → target`; later definitions of a name are ignored
    pub fn insert(&mut self, name: &str, target: &str) -> bool {
        let name = name.to_ascii_uppercase();
        if self.map.contains_key(&name) {
            return false;
        }
        self.order.push(name.clone());
        self.map.insert(name, target.to_ascii_uppercase());
        true
    }

    /// Direct mapping of one name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.map.get(&name.to_ascii_uppercase()).map(String::as_str)
    }

    /// Walk the chain to its terminal name
    ///
    /// A cycle stops at the first name seen twice.
    pub fn resolve(&self, name: &str) -> String {
        let mut current = name.to_ascii_uppercase();
        let mut visited = HashSet::new();
        while visited.insert(current.clone()) {
            match self.map.get(&current) {
                Some(next) => current = next.clone(),
                None => break,
            }
        }
        current
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Entries in discovery order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.order
            .iter()
            .filter_map(|name| self.map.get(name).map(|t| (name.as_str(), t.as_str())))
    }
}

impl Serialize for AliasTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, target) in self.iter() {
            map.serialize_entry(name, target)?;
        }
        map.end()
    }
}
