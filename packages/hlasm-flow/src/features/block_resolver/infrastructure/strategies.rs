//! Block/subroutine resolution cascade
//!
//! For a target name, each strategy is tried across every file (entry file
//! first, then dependency files in path order) before moving to the next
//! strategy:
//!
//! 1. **Marker**: `NAME IN` through the first `OUT` (inclusive); without an
//!    `OUT`, up to the next labelled `IN` (exclusive) or EOF.
//! 2. **Anchor**: `NAME EQU *` through the next `EJECT` (inclusive) or EOF.
//!    `NAME EQU OTHER` with a plain-symbol right-hand side captures that
//!    single line.
//! 3. **Section**: `NAME CSECT`; stops at `CNOP` (inclusive), another
//!    section start (exclusive), `END` (inclusive), `EJECT` (exclusive) or
//!    EOF.
//! 4. **Whole file**: a dependency file whose stem equals the name
//!    (case-insensitive), classified by content sniffing.

use tracing::debug;

use crate::config::FlowConfig;
use crate::features::block_resolver::domain::{ChunkKind, ResolvedBlock, Strategy};
use crate::features::block_resolver::infrastructure::source_set::{SourceFile, SourceSet};
use crate::features::parsing::TokenizedLine;
use crate::features::target_extraction::infrastructure::symbol::is_symbolic;

/// Matched line range within one file (inclusive, 0-indexed)
struct Span {
    start: usize,
    end: usize,
    tag: &'static str,
}

fn labelled(token: &TokenizedLine, name: &str) -> bool {
    token
        .label
        .as_deref()
        .is_some_and(|label| label.eq_ignore_ascii_case(name))
}

/// Resolves target names against a source set
pub struct BlockResolver<'a> {
    sources: &'a SourceSet,
    config: &'a FlowConfig,
}

impl<'a> BlockResolver<'a> {
    pub fn new(sources: &'a SourceSet, config: &'a FlowConfig) -> Self {
        Self { sources, config }
    }

    /// Run the cascade; `None` means the name is unresolved
    pub fn resolve(&self, name: &str) -> Option<ResolvedBlock> {
        for strategy in Strategy::CASCADE {
            for file in self.sources.files() {
                if let Some(block) = self.try_strategy(strategy, file, name) {
                    debug!(
                        target_name = name,
                        strategy = %strategy,
                        file = %file.path.display(),
                        lines = block.lines.len(),
                        "Resolved"
                    );
                    return Some(block);
                }
            }
        }
        debug!(target_name = name, "Unresolved");
        None
    }

    fn try_strategy(&self, strategy: Strategy, file: &SourceFile, name: &str) -> Option<ResolvedBlock> {
        let (span, kind) = match strategy {
            Strategy::Marker => (self.marker_span(file, name)?, ChunkKind::Subroutine),
            Strategy::Anchor => (self.anchor_span(file, name)?, ChunkKind::AnchorTable),
            Strategy::Section => (self.section_span(file, name)?, ChunkKind::ControlSection),
            Strategy::WholeFile => {
                if file.is_entry || file.lines.is_empty() {
                    return None;
                }
                let stem = file.stem()?;
                if !stem.eq_ignore_ascii_case(name) {
                    return None;
                }
                let span = Span {
                    start: 0,
                    end: file.lines.len() - 1,
                    tag: "file",
                };
                (span, self.sniff_kind(file, name))
            }
        };

        Some(ResolvedBlock {
            name: name.to_string(),
            lines: file.lines[span.start..=span.end].to_vec(),
            kind,
            strategy,
            tag: span.tag,
            source: file.path.clone(),
            start_line: span.start + 1,
        })
    }

    fn marker_span(&self, file: &SourceFile, name: &str) -> Option<Span> {
        let ops = &self.config.opcodes;
        let start = file
            .tokens
            .iter()
            .position(|t| labelled(t, name) && ops.is_entry_marker(t.opcode_str()))?;

        let mut end = file.tokens.len() - 1;
        for (idx, token) in file.tokens.iter().enumerate().skip(start + 1) {
            let op = token.opcode_str();
            if ops.is_exit_marker(op) {
                end = idx;
                break;
            }
            if token.label.is_some() && ops.is_entry_marker(op) {
                end = idx - 1;
                break;
            }
        }
        Some(Span {
            start,
            end,
            tag: "marker",
        })
    }

    fn anchor_span(&self, file: &SourceFile, name: &str) -> Option<Span> {
        let ops = &self.config.opcodes;
        for (start, token) in file.tokens.iter().enumerate() {
            if !labelled(token, name) || !ops.is_equate(token.opcode_str()) {
                continue;
            }
            let rhs = token.first_operand().unwrap_or("").trim();

            if rhs.starts_with('*') {
                let end = file
                    .tokens
                    .iter()
                    .enumerate()
                    .skip(start + 1)
                    .find(|(_, t)| ops.is_page_break(t.opcode_str()))
                    .map(|(idx, _)| idx)
                    .unwrap_or(file.tokens.len() - 1);
                return Some(Span {
                    start,
                    end,
                    tag: "anchor",
                });
            }
            if token.operands.len() == 1 && is_symbolic(rhs) {
                return Some(Span {
                    start,
                    end: start,
                    tag: "alias",
                });
            }
        }
        None
    }

    fn section_span(&self, file: &SourceFile, name: &str) -> Option<Span> {
        let ops = &self.config.opcodes;
        let start = file
            .tokens
            .iter()
            .position(|t| labelled(t, name) && ops.is_section_start(t.opcode_str()))?;

        let mut end = file.tokens.len() - 1;
        for (idx, token) in file.tokens.iter().enumerate().skip(start + 1) {
            let op = token.opcode_str();
            if ops.is_alignment(op) {
                end = idx;
                break;
            }
            if ops.is_section_start(op) && !labelled(token, name) {
                end = idx - 1;
                break;
            }
            if ops.is_end_of_program(op) {
                end = idx;
                break;
            }
            if ops.is_page_break(op) {
                end = idx - 1;
                break;
            }
        }
        Some(Span {
            start,
            end,
            tag: "section",
        })
    }

    fn sniff_kind(&self, file: &SourceFile, name: &str) -> ChunkKind {
        let ops = &self.config.opcodes;
        if file.tokens.iter().any(|t| ops.is_macro_open(t.opcode_str())) {
            ChunkKind::Macro
        } else if file
            .tokens
            .iter()
            .any(|t| labelled(t, name) && ops.is_entry_marker(t.opcode_str()))
        {
            ChunkKind::Subroutine
        } else if file.lines.iter().any(|line| {
            self.config
                .program_placeholders
                .iter()
                .any(|p| line.to_ascii_uppercase().contains(&p.to_ascii_uppercase()))
        }) {
            ChunkKind::Program
        } else {
            ChunkKind::Copybook
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(entry: &str, deps: &[(&str, &str)]) -> (SourceSet, FlowConfig) {
        let config = FlowConfig::default();
        let mut sources = SourceSet::from_entry_text("driver.asm", entry, &config);
        for (name, text) in deps {
            sources.push_text(*name, text, &config);
        }
        (sources, config)
    }

    #[test]
    fn test_marker_block_through_out() {
        let (sources, config) = set(
            "SUBA     IN\n         MVC   A,B\n         OUT\n         DC    F'0'\n",
            &[],
        );
        let block = BlockResolver::new(&sources, &config).resolve("SUBA").unwrap();
        assert_eq!(block.lines.len(), 3);
        assert_eq!(block.kind, ChunkKind::Subroutine);
        assert_eq!(block.tag, "marker");
        assert_eq!(block.start_line, 1);
    }

    #[test]
    fn test_marker_block_stops_before_next_marker() {
        let (sources, config) = set(
            "SUBA     IN\n         MVC   A,B\nSUBB     IN\n         OUT\n",
            &[],
        );
        let resolver = BlockResolver::new(&sources, &config);
        assert_eq!(resolver.resolve("SUBA").unwrap().lines.len(), 2);
        let subb = resolver.resolve("subb").unwrap();
        assert_eq!(subb.start_line, 3);
        assert_eq!(subb.lines.len(), 2);
    }

    #[test]
    fn test_marker_block_runs_to_eof() {
        let (sources, config) = set("SUBA     IN\n         MVC   A,B\n         MVC   C,D\n", &[]);
        let block = BlockResolver::new(&sources, &config).resolve("SUBA").unwrap();
        assert_eq!(block.lines.len(), 3);
    }

    #[test]
    fn test_anchor_table_until_eject() {
        let (sources, config) = set(
            "TABLE    EQU   *\n         DC    A(SUBA)\n         EJECT\n         DC    F'1'\n",
            &[],
        );
        let block = BlockResolver::new(&sources, &config).resolve("TABLE").unwrap();
        assert_eq!(block.kind, ChunkKind::AnchorTable);
        assert_eq!(block.lines.len(), 3);
    }

    #[test]
    fn test_alias_row_is_single_line() {
        let (sources, config) = set("OLDNAME  EQU   NEWNAME\n         DC    F'1'\n", &[]);
        let block = BlockResolver::new(&sources, &config).resolve("OLDNAME").unwrap();
        assert_eq!(block.tag, "alias");
        assert_eq!(block.lines, vec!["OLDNAME  EQU   NEWNAME"]);
    }

    #[test]
    fn test_numeric_equate_is_not_a_block() {
        let (sources, config) = set("LEN      EQU   80\n", &[]);
        assert!(BlockResolver::new(&sources, &config).resolve("LEN").is_none());
    }

    #[test]
    fn test_section_terminators() {
        let (sources, config) = set(
            "PROG     CSECT\n         MVC   A,B\n         CNOP  0,4\n         DC    F'1'\n\
             OTHER    CSECT\n         MVC   C,D\nLAST     CSECT\n",
            &[],
        );
        let resolver = BlockResolver::new(&sources, &config);
        let prog = resolver.resolve("PROG").unwrap();
        assert_eq!(prog.kind, ChunkKind::ControlSection);
        assert_eq!(prog.lines.len(), 3);
        let other = resolver.resolve("OTHER").unwrap();
        assert_eq!(other.lines.len(), 2);
    }

    #[test]
    fn test_marker_beats_section() {
        let (sources, config) = set(
            "SUBA     CSECT\n         MVC   X,Y\n",
            &[("lib.asm", "SUBA     IN\n         GO    DEEP\n         OUT\n")],
        );
        let block = BlockResolver::new(&sources, &config).resolve("SUBA").unwrap();
        assert_eq!(block.strategy, Strategy::Marker);
        assert!(block.lines[1].contains("DEEP"));
    }

    #[test]
    fn test_whole_file_sniffing() {
        let (sources, config) = set(
            "         GO    X\n",
            &[
                ("deps/CHECKM.mac", "         MACRO\n         CHECKM &A\n         MEND\n"),
                ("deps/SUBD.asm", "* subroutine file\n         MVC   A,B\n"),
                ("deps/PGM1.asm", "&PGMNAME CSECT\n"),
                ("deps/INLINE.asm", "INLINE   IN\n"),
            ],
        );
        let resolver = BlockResolver::new(&sources, &config);
        assert_eq!(resolver.resolve("checkm").unwrap().kind, ChunkKind::Macro);
        assert_eq!(resolver.resolve("SUBD").unwrap().kind, ChunkKind::Copybook);
        assert_eq!(resolver.resolve("PGM1").unwrap().kind, ChunkKind::Program);
        // marker strategy wins before the file fallback
        assert_eq!(resolver.resolve("INLINE").unwrap().strategy, Strategy::Marker);
        assert!(resolver.resolve("NOPE").is_none());
    }
}
