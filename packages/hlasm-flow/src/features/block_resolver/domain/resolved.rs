//! Resolution results

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use super::ChunkKind;

/// Resolution strategy, in cascade order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// `NAME IN` ... `OUT`
    Marker,
    /// `NAME EQU *` ... `EJECT`, or a single alias row
    Anchor,
    /// `NAME CSECT` ... terminator
    Section,
    /// Dependency file named after the target
    WholeFile,
}

impl Strategy {
    /// Cascade order; first match wins
    pub const CASCADE: [Strategy; 4] = [
        Strategy::Marker,
        Strategy::Anchor,
        Strategy::Section,
        Strategy::WholeFile,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Marker => "marker",
            Strategy::Anchor => "anchor",
            Strategy::Section => "section",
            Strategy::WholeFile => "file",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A materialised block for a target name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBlock {
    pub name: String,
    /// Raw source lines
    pub lines: Vec<String>,
    pub kind: ChunkKind,
    pub strategy: Strategy,
    /// Provenance tag (`marker`, `anchor`, `alias`, `section`, `file`)
    pub tag: &'static str,
    pub source: PathBuf,
    /// 1-indexed first line
    pub start_line: usize,
}
