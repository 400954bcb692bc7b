//! Flow graph infrastructure

pub mod render;
pub mod tree_builder;

pub use render::{to_dot, to_json, to_json_string, to_mermaid, OutputFormat};
pub use tree_builder::build_tree;
