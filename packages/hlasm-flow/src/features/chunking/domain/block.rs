//! Labelled blocks produced by the line-structuring pass

use serde::{Deserialize, Serialize};

/// Label of the root pseudo-block holding the prologue
pub const ROOT_LABEL: &str = "HLASM_ROOT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ElementType {
    /// Instruction text (column 9 onwards, or the whole line for pass-through)
    Raw,
    /// Comment or macro-body line, not executable here
    Comment,
}

/// One source line attached to a block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeElement {
    pub id: String,
    /// Analysed text
    pub text: String,
    /// Logical source line as read
    pub raw: String,
    pub element_type: ElementType,
    /// 1-indexed physical line number
    pub line_no: usize,
}

impl CodeElement {
    pub fn is_content(&self) -> bool {
        self.element_type == ElementType::Raw && !self.text.trim().is_empty()
    }
}

/// A named block: header label plus the lines following it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelledBlock {
    pub id: String,
    pub label: String,
    pub elements: Vec<CodeElement>,
    /// 1-indexed line of the header (0 for the root)
    pub start_line: usize,
}

impl LabelledBlock {
    pub fn new(id: String, label: impl Into<String>, start_line: usize) -> Self {
        Self {
            id,
            label: label.into(),
            elements: Vec::new(),
            start_line,
        }
    }

    pub fn is_root(&self) -> bool {
        self.label == ROOT_LABEL
    }

    /// True when at least one non-comment, non-empty element exists
    pub fn has_content(&self) -> bool {
        self.elements.iter().any(CodeElement::is_content)
    }

    /// Logical source lines of the block, in order
    pub fn raw_lines(&self) -> Vec<String> {
        self.elements.iter().map(|e| e.raw.clone()).collect()
    }
}

/// Output of the structuring pass: a root plus flat named blocks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockTree {
    pub root: LabelledBlock,
    pub blocks: Vec<LabelledBlock>,
}

impl BlockTree {
    /// Blocks in output order: the root first when it has a prologue
    pub fn sections(&self) -> Vec<&LabelledBlock> {
        let mut sections = Vec::with_capacity(self.blocks.len() + 1);
        if self.root.has_content() {
            sections.push(&self.root);
        }
        sections.extend(self.blocks.iter());
        sections
    }

    pub fn prologue(&self) -> Option<&LabelledBlock> {
        self.root.has_content().then_some(&self.root)
    }

    pub fn find(&self, label: &str) -> Option<&LabelledBlock> {
        self.blocks.iter().find(|b| b.label == label)
    }
}
