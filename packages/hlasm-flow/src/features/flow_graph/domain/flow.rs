//! Chunk store, flow adjacency map and run result

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::{BTreeSet, HashMap};

use crate::features::alias::AliasTable;
use crate::features::block_resolver::ChunkKind;
use crate::features::macro_catalog::MacroCatalog;

/// Per-name traversal state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Queued,
    Resolving,
    Resolved,
    Missing,
}

/// A resolved, immutable chunk
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Chunk {
    pub name: String,
    pub lines: Vec<String>,
    pub kind: ChunkKind,
    pub tags: BTreeSet<String>,
    pub source_file: String,
    /// 1-indexed first line in `source_file`
    pub start_line: usize,
}

impl Chunk {
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

/// Name → chunk map in discovery order; a name is stored at most once
#[derive(Debug, Clone, Default)]
pub struct ChunkStore {
    order: Vec<String>,
    chunks: HashMap<String, Chunk>,
}

impl ChunkStore {
    /// Store a chunk; a second chunk for the same name is rejected
    pub fn insert(&mut self, chunk: Chunk) -> bool {
        if self.chunks.contains_key(&chunk.name) {
            return false;
        }
        self.order.push(chunk.name.clone());
        self.chunks.insert(chunk.name.clone(), chunk);
        true
    }

    pub fn get(&self, name: &str) -> Option<&Chunk> {
        self.chunks.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.chunks.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Chunk> {
        self.order.iter().filter_map(|name| self.chunks.get(name))
    }

    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Parent → ordered, duplicate-free children; keys in discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowMap {
    order: Vec<String>,
    children: HashMap<String, Vec<String>>,
}

impl FlowMap {
    /// Make sure `name` has an entry
    pub fn ensure(&mut self, name: &str) {
        if !self.children.contains_key(name) {
            self.order.push(name.to_string());
            self.children.insert(name.to_string(), Vec::new());
        }
    }

    /// Append `child` to `parent` unless already present
    pub fn link(&mut self, parent: &str, child: &str) {
        self.ensure(parent);
        if let Some(children) = self.children.get_mut(parent) {
            if !children.iter().any(|c| c == child) {
                children.push(child.to_string());
            }
        }
    }

    pub fn children(&self, name: &str) -> &[String] {
        self.children.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.children.contains_key(name)
    }

    /// Keys in discovery order
    pub fn nodes(&self) -> &[String] {
        &self.order
    }

    /// Every (parent, child) pair
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.order.iter().flat_map(move |parent| {
            self.children(parent)
                .iter()
                .map(move |child| (parent.as_str(), child.as_str()))
        })
    }

    /// Every name that appears as a key or as a child
    pub fn all_names(&self) -> BTreeSet<&str> {
        let mut names: BTreeSet<&str> = self.order.iter().map(String::as_str).collect();
        names.extend(self.children.values().flatten().map(String::as_str));
        names
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Serialize for FlowMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.order.len()))?;
        for name in &self.order {
            map.serialize_entry(name, self.children(name))?;
        }
        map.end()
    }
}

/// Outcome of one flow-resolution run
#[derive(Debug, Clone)]
pub struct FlowResult {
    pub entry: String,
    pub chunks: ChunkStore,
    pub flow: FlowMap,
    /// Unresolved names in discovery order
    pub missing: Vec<String>,
    pub catalog: MacroCatalog,
    pub aliases: AliasTable,
}

impl FlowResult {
    pub fn is_missing(&self, name: &str) -> bool {
        self.missing.iter().any(|m| m == name)
    }

    pub fn kind_of(&self, name: &str) -> Option<ChunkKind> {
        self.chunks.get(name).map(|c| c.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_map_deduplicates_children() {
        let mut flow = FlowMap::default();
        flow.link("main", "A");
        flow.link("main", "B");
        flow.link("main", "A");
        flow.ensure("A");
        assert_eq!(flow.children("main"), ["A", "B"]);
        assert_eq!(flow.nodes(), ["main", "A"]);
        assert_eq!(flow.edges().count(), 2);
        assert!(flow.all_names().contains("B"));
    }

    #[test]
    fn test_flow_map_serializes_in_discovery_order() {
        let mut flow = FlowMap::default();
        flow.link("main", "ZED");
        flow.ensure("ZED");
        flow.ensure("ALPHA");
        assert_eq!(
            serde_json::to_string(&flow).unwrap(),
            r#"{"main":["ZED"],"ZED":[],"ALPHA":[]}"#
        );
    }

    #[test]
    fn test_chunk_store_insert_once() {
        let chunk = Chunk {
            name: "A".to_string(),
            lines: vec!["A        IN".to_string()],
            kind: ChunkKind::Subroutine,
            tags: BTreeSet::new(),
            source_file: "x.asm".to_string(),
            start_line: 1,
        };
        let mut store = ChunkStore::default();
        assert!(store.insert(chunk.clone()));
        let mut other = chunk;
        other.kind = ChunkKind::Copybook;
        assert!(!store.insert(other));
        assert_eq!(store.get("A").map(|c| c.kind), Some(ChunkKind::Subroutine));
        assert_eq!(store.len(), 1);
    }
}
