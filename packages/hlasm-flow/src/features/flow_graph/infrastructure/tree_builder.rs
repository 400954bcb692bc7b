//! Nested tree view builder
//!
//! Iterative depth-first walk over the flow map with an explicit stack and
//! an `expanded` set. Nodes go into an arena in preorder; the nested
//! [`TreeNode`] is assembled afterwards by walking the arena backwards, since
//! every child sits at a higher index than its parent.

use std::collections::HashSet;

use crate::features::flow_graph::domain::{FlowResult, TreeNode};

struct ArenaNode {
    name: String,
    seq: usize,
    kind: Option<String>,
    lines: Option<Vec<String>>,
    is_ref: bool,
    missing: bool,
    children: Vec<usize>,
}

/// Build the nested tree rooted at the entry chunk
pub fn build_tree(result: &FlowResult) -> TreeNode {
    let mut arena: Vec<ArenaNode> = Vec::new();
    let mut expanded: HashSet<&str> = HashSet::new();
    let mut stack: Vec<(Option<usize>, &str, usize)> = vec![(None, result.entry.as_str(), 0)];

    while let Some((parent, name, seq)) = stack.pop() {
        let idx = arena.len();
        let mut node = ArenaNode {
            name: name.to_string(),
            seq,
            kind: result.kind_of(name).map(|k| k.as_str().to_string()),
            lines: None,
            is_ref: false,
            missing: false,
            children: Vec::new(),
        };

        if expanded.contains(name) {
            node.is_ref = true;
        } else if result.is_missing(name) {
            node.missing = true;
        } else {
            expanded.insert(name);
            node.lines = result.chunks.get(name).map(|c| c.lines.clone());
            let children = result.flow.children(name);
            for (pos, child) in children.iter().enumerate().rev() {
                stack.push((Some(idx), child.as_str(), pos + 1));
            }
        }

        arena.push(node);
        if let Some(parent) = parent {
            arena[parent].children.push(idx);
        }
    }

    let mut built: Vec<Option<TreeNode>> = Vec::with_capacity(arena.len());
    built.resize_with(arena.len(), || None);

    for idx in (0..arena.len()).rev() {
        let node = &mut arena[idx];
        let children = node
            .children
            .iter()
            .filter_map(|&child| built[child].take())
            .collect();
        built[idx] = Some(TreeNode {
            name: std::mem::take(&mut node.name),
            seq: node.seq,
            kind: node.kind.take(),
            lines: node.lines.take(),
            is_ref: node.is_ref,
            missing: node.missing,
            children,
        });
    }

    built
        .into_iter()
        .next()
        .flatten()
        .unwrap_or_else(|| TreeNode {
            name: result.entry.clone(),
            seq: 0,
            kind: None,
            lines: None,
            is_ref: false,
            missing: false,
            children: Vec::new(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::alias::AliasTable;
    use crate::features::block_resolver::ChunkKind;
    use crate::features::flow_graph::domain::{Chunk, ChunkStore, FlowMap};
    use crate::features::macro_catalog::MacroCatalog;
    use std::collections::BTreeSet;

    fn chunk(name: &str, kind: ChunkKind) -> Chunk {
        Chunk {
            name: name.to_string(),
            lines: vec![format!("{} line", name)],
            kind,
            tags: BTreeSet::new(),
            source_file: "t.asm".to_string(),
            start_line: 1,
        }
    }

    fn result(edges: &[(&str, &str)], present: &[&str], missing: &[&str]) -> FlowResult {
        let mut chunks = ChunkStore::default();
        chunks.insert(chunk("main", ChunkKind::Entry));
        for name in present {
            chunks.insert(chunk(name, ChunkKind::Subroutine));
        }
        let mut flow = FlowMap::default();
        flow.ensure("main");
        for (parent, child) in edges {
            flow.link(parent, child);
        }
        FlowResult {
            entry: "main".to_string(),
            chunks,
            flow,
            missing: missing.iter().map(|s| s.to_string()).collect(),
            catalog: MacroCatalog::new(),
            aliases: AliasTable::new(),
        }
    }

    #[test]
    fn test_seq_and_ref_stubs() {
        let r = result(
            &[("main", "A"), ("main", "B"), ("A", "C"), ("B", "C"), ("main", "X")],
            &["A", "B", "C"],
            &["X"],
        );
        let tree = build_tree(&r);

        assert_eq!(tree.seq, 0);
        assert_eq!(tree.kind.as_deref(), Some("entry"));
        let seqs: Vec<_> = tree.children.iter().map(|c| (c.name.as_str(), c.seq)).collect();
        assert_eq!(seqs, vec![("A", 1), ("B", 2), ("X", 3)]);

        let a = &tree.children[0];
        assert_eq!(a.children[0].name, "C");
        assert!(a.children[0].lines.is_some());

        let b = &tree.children[1];
        assert!(b.children[0].is_ref);
        assert!(b.children[0].lines.is_none());

        assert!(tree.children[2].missing);
    }

    #[test]
    fn test_cycle_terminates_with_ref() {
        let r = result(&[("main", "A"), ("A", "B"), ("B", "A")], &["A", "B"], &[]);
        let tree = build_tree(&r);
        let b = &tree.children[0].children[0];
        assert_eq!(b.name, "B");
        assert!(b.children[0].is_ref);
        assert_eq!(tree.walk().len(), 4);
    }

    #[test]
    fn test_tree_json_shape() {
        let r = result(&[("main", "X")], &[], &["X"]);
        let json = serde_json::to_value(build_tree(&r)).unwrap();
        assert_eq!(json["name"], "main");
        assert_eq!(json["children"][0]["missing"], true);
        assert!(json["children"][0].get("ref").is_none());
        assert!(json["children"][0].get("lines").is_none());
    }
}
