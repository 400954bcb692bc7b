//! Opcode classification tables

use lazy_static::lazy_static;
use std::collections::HashSet;

use crate::features::parsing::domain::InstructionKind;

lazy_static! {
    pub static ref BRANCH_OPCODES: HashSet<&'static str> = [
        "B", "BC", "BCT", "BCTR", "BE", "BNE", "BH", "BL", "BNH", "BNL", "BZ", "BNZ", "BO",
        "BNO", "BM", "BNM", "BP", "BNP", "BR", "J", "JC", "JE", "JNE", "JH", "JL", "JNH",
        "JNL", "JZ", "JNZ", "JO", "JNO", "JM", "JNM", "JP", "JNP", "NOP", "NOPR", "BCR",
        "BXH", "BXLE",
    ]
    .into_iter()
    .collect();

    /// Branches whose operand is a register or which never transfer control
    pub static ref REGISTER_BRANCH_OPCODES: HashSet<&'static str> =
        ["BR", "BCR", "NOP", "NOPR"].into_iter().collect();

    pub static ref CALL_OPCODES: HashSet<&'static str> = [
        "BAL", "BALR", "BAS", "BASR", "CALL", "LINK", "XCTL", "GO", "GOIF", "GOIFNOT", "GOEQ",
        "GONE", "GOGT", "GOLT", "GOGE", "GOLE",
    ]
    .into_iter()
    .collect();

    pub static ref ENTRY_MARKER_OPCODES: HashSet<&'static str> =
        ["IN", "OUT"].into_iter().collect();

    pub static ref SECTION_OPCODES: HashSet<&'static str> =
        ["CSECT", "DSECT", "RSECT", "COM", "LOCTR", "START"].into_iter().collect();

    pub static ref DATA_OPCODES: HashSet<&'static str> = [
        "DC", "DS", "DXD", "EQU", "ORG", "LTORG", "DROP", "USING", "END", "ENTRY", "EXTRN",
        "WXTRN", "PRINT", "PUNCH", "TITLE", "SPACE", "EJECT", "PUSH", "POP", "REPRO",
    ]
    .into_iter()
    .collect();

    pub static ref MACRO_CONTROL_OPCODES: HashSet<&'static str> = [
        "MACRO", "MEND", "MEXIT", "MNOTE", "COPY", "AREAD", "ACTR", "ANOP", "AGO", "AIF",
        "AINSERT", "GBLA", "GBLB", "GBLC", "LCLA", "LCLB", "LCLC", "SETA", "SETB", "SETC",
    ]
    .into_iter()
    .collect();
}

/// Classify an (uppercased) opcode
pub fn classify_opcode(opcode: Option<&str>) -> InstructionKind {
    let op = match opcode {
        Some(op) if !op.is_empty() => op.to_ascii_uppercase(),
        _ => return InstructionKind::Empty,
    };
    let op = op.as_str();

    if BRANCH_OPCODES.contains(op) {
        InstructionKind::Branch
    } else if CALL_OPCODES.contains(op) {
        InstructionKind::Call
    } else if ENTRY_MARKER_OPCODES.contains(op) {
        InstructionKind::EntryMarker
    } else if SECTION_OPCODES.contains(op) {
        InstructionKind::Section
    } else if DATA_OPCODES.contains(op) {
        InstructionKind::Data
    } else if MACRO_CONTROL_OPCODES.contains(op) {
        InstructionKind::MacroControl
    } else {
        InstructionKind::Instruction
    }
}
