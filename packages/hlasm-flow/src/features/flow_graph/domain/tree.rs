//! Nested tree view node

use serde::Serialize;

/// One node of the nested flow tree
///
/// A name is expanded (lines and children) only at its first occurrence in
/// depth-first order; later occurrences are `ref` stubs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub name: String,
    /// 1-indexed call position within the parent (0 for the root)
    pub seq: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lines: Option<Vec<String>>,
    #[serde(rename = "ref", skip_serializing_if = "std::ops::Not::not")]
    pub is_ref: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub missing: bool,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Depth-first iterator over this node and its descendants
    pub fn walk(&self) -> Vec<&TreeNode> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children.iter().rev());
        }
        out
    }
}
