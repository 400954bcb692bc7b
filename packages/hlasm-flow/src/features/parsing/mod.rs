//! Parsing feature
//!
//! Line tokenizer, opcode classification and source normalisation. Every
//! other feature consumes source text through this module.

pub mod domain;
pub mod infrastructure;

pub use domain::{InstructionKind, ParsedInstruction, TokenizedLine};
pub use infrastructure::{
    classify_opcode, find_operands_end, normalize_with_origin, parse_instruction, split_operands,
    tokenize_line, NormalizedLine,
};
