//! Analysed block chunks

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::features::parsing::ParsedInstruction;

/// Section kind inferred from the first section-like opcode in a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SectionKind {
    Csect,
    Dsect,
    Macro,
    Entry,
    Subroutine,
    Root,
}

impl SectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Csect => "CSECT",
            SectionKind::Dsect => "DSECT",
            SectionKind::Macro => "MACRO",
            SectionKind::Entry => "ENTRY",
            SectionKind::Subroutine => "SUBROUTINE",
            SectionKind::Root => "ROOT",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One labelled block with its parsed instructions and dependencies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockChunk {
    pub label: String,
    pub instructions: Vec<ParsedInstruction>,
    /// Ordered, deduplicated dependency names
    pub dependencies: Vec<String>,
    pub source_file: String,
    pub section_kind: SectionKind,
    pub start_line: usize,
}

impl BlockChunk {
    pub fn instruction_count(&self) -> usize {
        self.instructions.len()
    }
}
