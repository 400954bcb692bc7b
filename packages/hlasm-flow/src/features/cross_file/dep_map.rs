//! Dependency map with petgraph
//!
//! Directed graph where nodes are program/chunk names and an edge A → B
//! means A calls B. Supports transitive lookups and Tarjan SCC cycle
//! detection.

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::path::PathBuf;

/// A dependency name that matched no file in the search path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingDependency {
    pub dep_name: String,
    pub referenced_from_file: PathBuf,
    pub referenced_in_chunk: String,
    pub search_path: PathBuf,
}

impl fmt::Display for MissingDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (called from {} in {}, searched {})",
            self.dep_name,
            self.referenced_in_chunk,
            self.referenced_from_file.display(),
            self.search_path.display()
        )
    }
}

/// Caller → callee graph
#[derive(Debug, Clone, Default)]
pub struct DependencyMap {
    graph: DiGraph<String, ()>,
    name_to_node: HashMap<String, NodeIndex>,
}

impl DependencyMap {
    pub fn new() -> Self {
        Self::default()
    }

    fn node(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.name_to_node.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(name.to_string());
        self.name_to_node.insert(name.to_string(), idx);
        idx
    }

    /// Register a vertex without edges
    pub fn add_vertex(&mut self, name: &str) {
        self.node(name);
    }

    /// Record that `caller` depends on `callee`; parallel edges are collapsed
    pub fn add_call_dependency(&mut self, caller: &str, callee: &str) {
        let from = self.node(caller);
        let to = self.node(callee);
        if self.graph.find_edge(from, to).is_none() {
            self.graph.add_edge(from, to, ());
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.name_to_node.contains_key(name)
    }

    /// Direct callees in insertion order
    pub fn direct_dependencies(&self, name: &str) -> Vec<String> {
        let Some(&idx) = self.name_to_node.get(name) else {
            return Vec::new();
        };
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (e.id(), e.target()))
            .collect();
        edges.sort_by_key(|(id, _)| id.index());
        edges
            .into_iter()
            .map(|(_, target)| self.graph[target].clone())
            .collect()
    }

    /// Direct callers
    pub fn dependents(&self, name: &str) -> Vec<String> {
        let Some(&idx) = self.name_to_node.get(name) else {
            return Vec::new();
        };
        let mut callers: Vec<String> = self
            .graph
            .neighbors_directed(idx, Direction::Incoming)
            .map(|n| self.graph[n].clone())
            .collect();
        callers.sort();
        callers
    }

    /// Every name reachable from `name` in BFS order, `name` itself excluded
    pub fn all_dependencies(&self, name: &str) -> Vec<String> {
        let mut visited = HashSet::new();
        visited.insert(name.to_string());
        let mut queue = VecDeque::new();
        let mut result = Vec::new();

        queue.push_back(name.to_string());
        while let Some(current) = queue.pop_front() {
            for dep in self.direct_dependencies(&current) {
                if visited.insert(dep.clone()) {
                    result.push(dep.clone());
                    queue.push_back(dep);
                }
            }
        }
        result
    }

    /// Strongly connected components with more than one member, plus
    /// self-loops
    pub fn cycles(&self) -> Vec<Vec<String>> {
        tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| {
                scc.len() > 1 || self.graph.find_edge(scc[0], scc[0]).is_some()
            })
            .map(|scc| {
                let mut names: Vec<String> =
                    scc.into_iter().map(|idx| self.graph[idx].clone()).collect();
                names.sort();
                names
            })
            .collect()
    }

    pub fn has_cycles(&self) -> bool {
        !self.cycles().is_empty()
    }

    /// Vertices in insertion order
    pub fn vertices(&self) -> Vec<String> {
        self.graph.node_indices().map(|i| self.graph[i].clone()).collect()
    }

    /// Edges in insertion order
    pub fn edges(&self) -> Vec<(String, String)> {
        self.graph
            .edge_references()
            .map(|e| (self.graph[e.source()].clone(), self.graph[e.target()].clone()))
            .collect()
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// `{vertices, edges: [{src, dest}]}`
    pub fn to_json(&self) -> Value {
        let edges: Vec<Value> = self
            .edges()
            .into_iter()
            .map(|(src, dest)| json!({ "src": src, "dest": dest }))
            .collect();
        json!({
            "vertices": self.vertices(),
            "edges": edges,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DependencyMap {
        let mut map = DependencyMap::new();
        map.add_call_dependency("MAIN", "SUBA");
        map.add_call_dependency("MAIN", "SUBB");
        map.add_call_dependency("SUBA", "UTIL");
        map.add_call_dependency("MAIN", "SUBA");
        map
    }

    #[test]
    fn test_direct_dependencies_keep_insertion_order() {
        let map = sample();
        assert_eq!(map.direct_dependencies("MAIN"), vec!["SUBA", "SUBB"]);
        assert_eq!(map.edge_count(), 3);
        assert!(map.direct_dependencies("NOPE").is_empty());
    }

    #[test]
    fn test_all_dependencies_transitive() {
        let map = sample();
        assert_eq!(map.all_dependencies("MAIN"), vec!["SUBA", "SUBB", "UTIL"]);
        assert!(map.all_dependencies("UTIL").is_empty());
        assert_eq!(map.dependents("UTIL"), vec!["SUBA"]);
    }

    #[test]
    fn test_cycle_detection() {
        let mut map = sample();
        assert!(!map.has_cycles());
        map.add_call_dependency("UTIL", "MAIN");
        map.add_call_dependency("LOOP", "LOOP");
        let cycles = map.cycles();
        assert!(cycles.contains(&vec![
            "MAIN".to_string(),
            "SUBA".to_string(),
            "UTIL".to_string()
        ]));
        assert!(cycles.contains(&vec!["LOOP".to_string()]));
    }

    #[test]
    fn test_json_form() {
        let json = sample().to_json();
        assert_eq!(json["vertices"], json!(["MAIN", "SUBA", "SUBB", "UTIL"]));
        assert_eq!(json["edges"][0], json!({"src": "MAIN", "dest": "SUBA"}));
        assert_eq!(json["edges"].as_array().map(Vec::len), Some(3));
    }

    #[test]
    fn test_missing_dependency_display() {
        let missing = MissingDependency {
            dep_name: "GONE".to_string(),
            referenced_from_file: PathBuf::from("a.asm"),
            referenced_in_chunk: "MAIN".to_string(),
            search_path: PathBuf::from("/lib"),
        };
        assert_eq!(missing.to_string(), "GONE (called from MAIN in a.asm, searched /lib)");
    }
}
