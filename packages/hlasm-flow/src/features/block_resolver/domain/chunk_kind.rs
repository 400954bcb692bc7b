//! Chunk kind enumeration
//!
//! Closed set of chunk classifications. The block resolver is the only place
//! that derives a kind from source text; the flow engine assigns `Entry` and
//! `Macro` directly.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkKind {
    /// The initial entry block of a run
    Entry,
    /// Subroutine delimited by entry/exit markers
    Subroutine,
    /// `NAME EQU *` anchor plus the table following it
    AnchorTable,
    /// `NAME CSECT` control section
    ControlSection,
    /// Cataloged macro definition
    Macro,
    /// Whole file pulled in as an include fragment
    Copybook,
    /// Whole file identified as a program by placeholder tokens
    Program,
}

impl ChunkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkKind::Entry => "entry",
            ChunkKind::Subroutine => "subroutine",
            ChunkKind::AnchorTable => "anchor_table",
            ChunkKind::ControlSection => "control_section",
            ChunkKind::Macro => "macro",
            ChunkKind::Copybook => "copybook",
            ChunkKind::Program => "program",
        }
    }
}

impl fmt::Display for ChunkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ChunkKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "entry" => Ok(ChunkKind::Entry),
            "subroutine" => Ok(ChunkKind::Subroutine),
            "anchor_table" => Ok(ChunkKind::AnchorTable),
            "control_section" => Ok(ChunkKind::ControlSection),
            "macro" => Ok(ChunkKind::Macro),
            "copybook" => Ok(ChunkKind::Copybook),
            "program" => Ok(ChunkKind::Program),
            _ => Err(format!("Unknown chunk kind: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_kind_str_roundtrip() {
        for kind in [
            ChunkKind::Entry,
            ChunkKind::Subroutine,
            ChunkKind::AnchorTable,
            ChunkKind::ControlSection,
            ChunkKind::Macro,
            ChunkKind::Copybook,
            ChunkKind::Program,
        ] {
            assert_eq!(kind.as_str().parse::<ChunkKind>(), Ok(kind));
        }
        assert!("csect".parse::<ChunkKind>().is_err());
    }

    #[test]
    fn test_chunk_kind_serde() {
        let json = serde_json::to_string(&ChunkKind::AnchorTable).unwrap();
        assert_eq!(json, "\"anchor_table\"");
    }
}
