//! Line-structuring pass
//!
//! Groups lines into a root plus flat named blocks using the fixed-column
//! layout. Rules are checked in order; the first match decides:
//!
//! | # | Condition                                   | Action             |
//! |---|---------------------------------------------|--------------------|
//! | 1 | section declaration in the operation field  | append to current  |
//! | 2 | label zone blank or a no-op label keyword   | append to current  |
//! | 3 | label zone starts with `*` or `.*`          | comment            |
//! | 4 | trimmed label zone starts with `&`          | comment            |
//! | 5 | embedded `EXEC SQL`                         | whole line as raw  |
//! | 6 | label zone starts with a space              | append to current  |
//! | 7 | anything else                               | start a new block  |
//!
//! New blocks are always children of the root. Local labels (`.NAME`) get an
//! ID suffix so identical local names in different places do not collide.

use lazy_static::lazy_static;
use regex::Regex;

use crate::config::OpcodeConventions;
use crate::features::chunking::domain::{
    BlockTree, CodeElement, ElementType, LabelledBlock, ROOT_LABEL,
};
use crate::features::parsing::NormalizedLine;
use crate::shared::utils::text::{label_zone, operation_field};
use crate::shared::IdAllocator;

lazy_static! {
    static ref EXEC_SQL: Regex = Regex::new(r"(?i)^\s*EXEC\s+SQL").unwrap();
}

/// Structuring decision for one non-blank line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineClass {
    /// Append the operation field to the current block
    Continue,
    /// Record the whole line as a comment
    Comment,
    /// Append the whole line unchanged
    PassThrough,
    /// Start a new block with this label
    NewBlock(String),
}

fn is_section_declaration(line: &str, conventions: &OpcodeConventions) -> bool {
    operation_field(line)
        .split_whitespace()
        .next()
        .is_some_and(|op| {
            conventions
                .section_declarations
                .iter()
                .any(|s| s.eq_ignore_ascii_case(op))
        })
}

/// Apply the ordered rules to one non-blank line
pub fn classify_line(line: &str, conventions: &OpcodeConventions) -> LineClass {
    let zone = label_zone(line);
    let trimmed = zone.trim();

    if is_section_declaration(line, conventions) {
        LineClass::Continue
    } else if trimmed.is_empty() || conventions.is_no_op_label(trimmed) {
        LineClass::Continue
    } else if zone.starts_with('*') || zone.starts_with(".*") {
        LineClass::Comment
    } else if trimmed.starts_with('&') {
        LineClass::Comment
    } else if EXEC_SQL.is_match(line) {
        LineClass::PassThrough
    } else if zone.starts_with(char::is_whitespace) {
        LineClass::Continue
    } else {
        LineClass::NewBlock(trimmed.to_string())
    }
}

/// Line-structuring pass; owns its ID allocator
pub struct LabelBlockPass<'a> {
    conventions: &'a OpcodeConventions,
    ids: IdAllocator,
}

impl<'a> LabelBlockPass<'a> {
    pub fn new(conventions: &'a OpcodeConventions) -> Self {
        Self {
            conventions,
            ids: IdAllocator::new(),
        }
    }

    fn element(&mut self, text: &str, raw: &str, element_type: ElementType, line_no: usize) -> CodeElement {
        CodeElement {
            id: self.ids.next_id(),
            text: text.to_string(),
            raw: raw.to_string(),
            element_type,
            line_no,
        }
    }

    /// Structure normalised lines; IDs restart at `elem_1` on every call
    pub fn run(&mut self, lines: &[NormalizedLine]) -> BlockTree {
        self.ids.reset();
        let mut root = LabelledBlock::new(self.ids.next_id(), ROOT_LABEL, 0);
        let mut blocks: Vec<LabelledBlock> = Vec::new();

        for line in lines {
            let text = line.text.as_str();
            if text.trim().is_empty() {
                continue;
            }

            let element = match classify_line(text, self.conventions) {
                LineClass::Continue => {
                    self.element(operation_field(text).trim(), text, ElementType::Raw, line.line_no)
                }
                LineClass::Comment => self.element(text, text, ElementType::Comment, line.line_no),
                LineClass::PassThrough => self.element(text, text, ElementType::Raw, line.line_no),
                LineClass::NewBlock(label) => {
                    let label = if label.starts_with('.') {
                        format!("{}_{}", label, self.ids.next_id())
                    } else {
                        label
                    };
                    blocks.push(LabelledBlock::new(self.ids.next_id(), label, line.line_no));
                    self.element(operation_field(text).trim(), text, ElementType::Raw, line.line_no)
                }
            };

            match blocks.last_mut() {
                Some(current) => current.elements.push(element),
                None => root.elements.push(element),
            }
        }

        BlockTree { root, blocks }
    }
}
