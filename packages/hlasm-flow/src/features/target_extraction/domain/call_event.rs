//! Call events discovered in block lines

use serde::{Deserialize, Serialize};
use std::fmt;

/// Extraction rule, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    GoJump,
    AddressConstantLoad,
    LoadLink,
    MacroInvocation,
    DynamicCall,
    StaticCall,
    Copy,
    DispatchTable,
    AliasRow,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::GoJump => "go_jump",
            RuleKind::AddressConstantLoad => "address_constant_load",
            RuleKind::LoadLink => "load_link",
            RuleKind::MacroInvocation => "macro_invocation",
            RuleKind::DynamicCall => "dynamic_call",
            RuleKind::StaticCall => "static_call",
            RuleKind::Copy => "copy",
            RuleKind::DispatchTable => "dispatch_table",
            RuleKind::AliasRow => "alias_row",
        }
    }

    /// Heuristic fallbacks have no opcode anchor
    pub fn is_heuristic(&self) -> bool {
        matches!(self, RuleKind::DispatchTable)
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a single rule produced for one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleMatch {
    Direct(String),
    Macro { name: String, targets: Vec<String> },
}

/// An ordered call event of a block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CallEvent {
    /// A bare callable name
    Direct {
        name: String,
        rule: RuleKind,
        line_no: usize,
    },
    /// Invocation of a cataloged macro with its resolved call targets
    Macro {
        name: String,
        targets: Vec<String>,
        line_no: usize,
    },
}

impl CallEvent {
    pub fn name(&self) -> &str {
        match self {
            CallEvent::Direct { name, .. } | CallEvent::Macro { name, .. } => name,
        }
    }

    pub fn line_no(&self) -> usize {
        match self {
            CallEvent::Direct { line_no, .. } | CallEvent::Macro { line_no, .. } => *line_no,
        }
    }

    /// Identity used for deduplication (line position excluded)
    pub fn dedup_key(&self) -> (bool, String, Vec<String>) {
        match self {
            CallEvent::Direct { name, .. } => (false, name.clone(), Vec::new()),
            CallEvent::Macro { name, targets, .. } => (true, name.clone(), targets.clone()),
        }
    }
}
