//! Block chunker
//!
//! Turns labelled blocks into [`BlockChunk`]s: every content element is
//! parsed, the section kind comes from the first section-like opcode and the
//! dependency list collects call targets in first-seen order.

use std::collections::HashSet;

use crate::config::flow_config::contains_ignore_case;
use crate::config::{FlowConfig, OpcodeConventions};
use crate::features::chunking::domain::{BlockChunk, LabelledBlock, SectionKind};
use crate::features::parsing::infrastructure::opcodes::{BRANCH_OPCODES, REGISTER_BRANCH_OPCODES};
use crate::features::parsing::{parse_instruction, InstructionKind, ParsedInstruction};
use crate::features::target_extraction::infrastructure::symbol::{is_symbolic, strip_parens};

/// Keyword operands naming the program of a dynamic call
const PROGRAM_KEYWORDS: [&str; 3] = ["EP", "DE", "SF"];

const LINKAGE_OPCODES: [&str; 2] = ["BAL", "BAS"];

/// Converts labelled blocks into analysed chunks
pub struct Chunker<'a> {
    config: &'a FlowConfig,
}

impl<'a> Chunker<'a> {
    pub fn new(config: &'a FlowConfig) -> Self {
        Self { config }
    }

    pub fn chunk(&self, blocks: &[LabelledBlock], source_file: &str) -> Vec<BlockChunk> {
        blocks
            .iter()
            .map(|block| self.block_to_chunk(block, source_file))
            .collect()
    }

    fn block_to_chunk(&self, block: &LabelledBlock, source_file: &str) -> BlockChunk {
        let mut instructions = Vec::new();
        let mut dependencies: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut section_kind = if block.is_root() {
            SectionKind::Root
        } else {
            SectionKind::Subroutine
        };

        for element in block.elements.iter().filter(|e| e.is_content()) {
            let parsed = parse_instruction(&element.text, None);
            if matches!(parsed.kind, InstructionKind::Comment | InstructionKind::Empty) {
                continue;
            }

            if section_kind == SectionKind::Subroutine {
                if let Some(kind) = self.section_kind_of(parsed.opcode_str()) {
                    section_kind = kind;
                }
            }

            if let Some(dep) = self.dependency_of(&parsed) {
                if seen.insert(dep.clone()) {
                    dependencies.push(dep);
                }
            }
            instructions.push(parsed);
        }

        BlockChunk {
            label: block.label.clone(),
            instructions,
            dependencies,
            source_file: source_file.to_string(),
            section_kind,
            start_line: block.start_line,
        }
    }

    fn section_kind_of(&self, opcode: &str) -> Option<SectionKind> {
        let ops = &self.config.opcodes;
        match opcode {
            "CSECT" | "RSECT" | "START" => Some(SectionKind::Csect),
            "DSECT" => Some(SectionKind::Dsect),
            op if ops.is_macro_open(op) => Some(SectionKind::Macro),
            op if ops.is_entry_marker(op) => Some(SectionKind::Entry),
            _ => None,
        }
    }

    fn dependency_of(&self, instr: &ParsedInstruction) -> Option<String> {
        let ops = &self.config.opcodes;
        let op = instr.opcode_str();
        let candidate = if ops.is_go(op) {
            instr.operands.first().map(|o| strip_parens(o).to_string())
        } else if is_program_call(ops, op) {
            instr.operands.first().map(|o| program_operand(o))
        } else if LINKAGE_OPCODES.contains(&op) {
            instr.operands.last().map(|o| strip_parens(o).to_string())
        } else if BRANCH_OPCODES.contains(op) && !REGISTER_BRANCH_OPCODES.contains(op) {
            instr.operands.last().map(|o| strip_parens(o).to_string())
        } else {
            None
        }?;

        is_symbolic(&candidate).then(|| candidate.to_ascii_uppercase())
    }
}

fn is_program_call(ops: &OpcodeConventions, op: &str) -> bool {
    contains_ignore_case(&ops.static_call, op) || contains_ignore_case(&ops.dynamic_call, op)
}

/// First operand of CALL/LINK/XCTL/LOAD/DELETE with keyword unwrapping
fn program_operand(operand: &str) -> String {
    let target = strip_parens(operand);
    if let Some((keyword, value)) = target.split_once('=') {
        if PROGRAM_KEYWORDS
            .iter()
            .any(|k| k.eq_ignore_ascii_case(keyword.trim()))
        {
            return strip_parens(value).to_string();
        }
    }
    target.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::chunking::application::ExtractBlocks;

    fn chunks_of(src: &str) -> Vec<BlockChunk> {
        let config = FlowConfig::default();
        let blocks = ExtractBlocks::new(&config).sections_from_text(src);
        Chunker::new(&config).chunk(&blocks, "prog.asm")
    }

    #[test]
    fn test_dependencies_in_first_seen_order() {
        let chunks = chunks_of(
            "MAIN     STM   14,12,12(13)\n\
             \x20        CALL  EXTPGM\n\
             \x20        BAL   R14,LOCAL1\n\
             \x20        LINK  EP=LINKED\n\
             \x20        GO    SUBX\n\
             \x20        B     LOCAL1\n\
             \x20        BR    R14\n",
        );
        assert_eq!(chunks.len(), 1);
        assert_eq!(
            chunks[0].dependencies,
            vec!["EXTPGM", "LOCAL1", "LINKED", "SUBX"]
        );
        assert_eq!(chunks[0].instruction_count(), 7);
    }

    #[test]
    fn test_register_targets_are_ignored() {
        let chunks = chunks_of("MAIN     BAL   R14,R15\n         CALL  (R15)\n");
        assert!(chunks[0].dependencies.is_empty());
    }

    #[test]
    fn test_section_kinds() {
        let chunks = chunks_of(
            "         MVC   A,B\n\
             SUBA     IN\n\
             \x20        OUT\n\
             WORK     DS    F\n\
             \x20        DSECT\n",
        );
        let kinds: Vec<_> = chunks.iter().map(|c| c.section_kind).collect();
        assert_eq!(
            kinds,
            vec![SectionKind::Root, SectionKind::Entry, SectionKind::Dsect]
        );
        assert_eq!(chunks[0].source_file, "prog.asm");
    }
}
