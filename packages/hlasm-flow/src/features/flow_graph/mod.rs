//! Flow-graph engine
//!
//! Breadth-first discovery of the call flow reachable from an entry block,
//! plus the nested tree view and the JSON / DOT / Mermaid renderings.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{EntryBlock, FlowEngine};
pub use domain::{Chunk, ChunkStore, FlowMap, FlowResult, NodeState, TreeNode};
pub use infrastructure::{build_tree, to_dot, to_json, to_json_string, to_mermaid, OutputFormat};
