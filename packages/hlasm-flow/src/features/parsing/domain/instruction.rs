//! Tokenized source lines and classified instructions

use serde::{Deserialize, Serialize};
use std::fmt;

/// One source line split into its four fields
///
/// All fields are empty for blank lines. Full-line comments carry only
/// `comment`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizedLine {
    /// Label field (absent when the line starts with whitespace)
    pub label: Option<String>,
    /// Operation code, uppercased
    pub opcode: Option<String>,
    /// Top-level operands, split at depth-0 commas
    pub operands: Vec<String>,
    /// Remarks after the operand field, or the text of a full-line comment
    pub comment: Option<String>,
}

impl TokenizedLine {
    /// True when the line carried no label, opcode, operand or remark
    pub fn is_empty(&self) -> bool {
        self.label.is_none()
            && self.opcode.is_none()
            && self.operands.is_empty()
            && self.comment.is_none()
    }

    /// True for full-line comments
    pub fn is_comment(&self) -> bool {
        self.comment.is_some() && self.opcode.is_none() && self.label.is_none()
    }

    /// Opcode or empty string
    pub fn opcode_str(&self) -> &str {
        self.opcode.as_deref().unwrap_or("")
    }

    /// First operand, if any
    pub fn first_operand(&self) -> Option<&str> {
        self.operands.first().map(String::as_str)
    }
}

/// Instruction classification derived from the opcode tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstructionKind {
    Branch,
    Call,
    EntryMarker,
    Section,
    Data,
    MacroControl,
    Instruction,
    Comment,
    Empty,
}

impl InstructionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstructionKind::Branch => "BRANCH",
            InstructionKind::Call => "CALL",
            InstructionKind::EntryMarker => "ENTRY_MARKER",
            InstructionKind::Section => "SECTION",
            InstructionKind::Data => "DATA",
            InstructionKind::MacroControl => "MACRO_CTRL",
            InstructionKind::Instruction => "INSTRUCTION",
            InstructionKind::Comment => "COMMENT",
            InstructionKind::Empty => "EMPTY",
        }
    }
}

impl fmt::Display for InstructionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A classified instruction (label zone already separated)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedInstruction {
    pub label: Option<String>,
    pub opcode: Option<String>,
    pub operands: Vec<String>,
    pub comment: Option<String>,
    pub raw_text: String,
    pub kind: InstructionKind,
}

impl ParsedInstruction {
    /// Opcode or empty string
    pub fn opcode_str(&self) -> &str {
        self.opcode.as_deref().unwrap_or("")
    }
}

impl fmt::Display for ParsedInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.kind,
            self.opcode_str(),
            self.operands.join(",")
        )
    }
}
