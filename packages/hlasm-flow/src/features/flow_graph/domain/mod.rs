//! Flow graph domain models

mod flow;
mod tree;

pub use flow::{Chunk, ChunkStore, FlowMap, FlowResult, NodeState};
pub use tree::TreeNode;
