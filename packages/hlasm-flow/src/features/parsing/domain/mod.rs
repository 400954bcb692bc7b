//! Parsing domain models

mod instruction;

pub use instruction::{InstructionKind, ParsedInstruction, TokenizedLine};
