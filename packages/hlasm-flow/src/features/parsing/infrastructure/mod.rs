//! Parsing infrastructure

pub mod normalize;
pub mod opcodes;
pub mod tokenizer;

pub use normalize::{normalize_with_origin, NormalizedLine};
pub use opcodes::classify_opcode;
pub use tokenizer::{find_operands_end, parse_instruction, split_operands, tokenize_line};
