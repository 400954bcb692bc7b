//! Flow pipeline facade
//!
//! Wires one flow-resolution run end to end:
//!
//! ```text
//! entry (file | text) ─┐
//! dependency dir ──────┴→ SourceSet → MacroCatalog ─┐
//!                                  └→ AliasTable ───┴→ FlowEngine → FlowResult
//! ```
//!
//! The entry block is either a 1-indexed line window of the entry file or,
//! in whole-file mode, the prologue that precedes the first named block.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::FlowConfig;
use crate::errors::{FlowError, Result};
use crate::features::alias::AliasTable;
use crate::features::block_resolver::SourceSet;
use crate::features::chunking::ExtractBlocks;
use crate::features::flow_graph::{EntryBlock, FlowEngine, FlowResult};
use crate::features::macro_catalog::MacroCatalogBuilder;
use crate::features::parsing::tokenize_line;
use crate::shared::utils::text::truncate_chars;

/// How the entry block is carved out of the entry source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntrySelection {
    /// Prologue lines when present, otherwise the whole file
    #[default]
    WholeFile,
    /// Inclusive 1-indexed line window
    Range { start: usize, end: usize },
}

/// Clamp a 1-indexed inclusive window to `lines`
///
/// `start` below 1 becomes 1 and `end` past the last line becomes the last
/// line. An inverted window or one that selects nothing is an error.
pub fn select_range(lines: &[String], start: usize, end: usize) -> Result<(Vec<String>, usize)> {
    if start > end {
        return Err(FlowError::invalid_range(start, end, "start after end"));
    }
    let first = start.max(1);
    let last = end.min(lines.len());
    if lines.is_empty() || first > last {
        return Err(FlowError::invalid_range(
            start,
            end,
            format!("source has {} lines", lines.len()),
        ));
    }
    Ok((lines[first - 1..last].to_vec(), first))
}

/// Drop every terminated `MACRO`..`MEND` definition from `lines`
///
/// Nested definitions go with their outermost one. An opener with no
/// matching close is left in place.
fn without_macro_definitions(lines: &[String], config: &FlowConfig) -> Vec<String> {
    let ops = &config.opcodes;
    let mut ranges: Vec<(usize, usize)> = Vec::new();
    let mut open_at: Option<usize> = None;
    let mut depth = 0usize;

    for (idx, line) in lines.iter().enumerate() {
        let text = match config.column_limit {
            Some(limit) => truncate_chars(line, limit),
            None => line.as_str(),
        };
        let tokens = tokenize_line(text);
        let op = tokens.opcode.as_deref().unwrap_or("");
        if ops.is_macro_open(op) {
            if depth == 0 {
                open_at = Some(idx);
            }
            depth += 1;
        } else if depth > 0 && ops.is_macro_close(op) {
            depth -= 1;
            if depth == 0 {
                if let Some(start) = open_at.take() {
                    ranges.push((start, idx));
                }
            }
        }
    }

    if !ranges.is_empty() {
        debug!(definitions = ranges.len(), "Dropping inline macro definitions from entry");
    }
    lines
        .iter()
        .enumerate()
        .filter(|(idx, _)| !ranges.iter().any(|&(start, end)| (start..=end).contains(idx)))
        .map(|(_, line)| line.clone())
        .collect()
}

/// Entry lines for whole-file mode
///
/// Inline macro definitions are not executable and are left out before the
/// prologue is carved.
pub fn whole_file_entry(lines: &[String], config: &FlowConfig) -> (Vec<String>, usize) {
    let lines = without_macro_definitions(lines, config);
    let tree = ExtractBlocks::new(config).tree(&lines);
    if tree.root.has_content() {
        let end = tree
            .blocks
            .first()
            .map(|b| b.start_line.saturating_sub(1))
            .unwrap_or(lines.len())
            .min(lines.len());
        return (lines[..end].to_vec(), 1);
    }
    (lines, 1)
}

/// One-shot flow resolution over an entry source and a dependency directory
#[derive(Debug, Clone)]
pub struct FlowPipeline {
    config: FlowConfig,
    dependency_dir: Option<PathBuf>,
    selection: EntrySelection,
}

impl FlowPipeline {
    /// Validates the configuration up front
    pub fn new(config: FlowConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            dependency_dir: None,
            selection: EntrySelection::default(),
        })
    }

    pub fn with_dependency_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dependency_dir = Some(dir.into());
        self
    }

    pub fn with_selection(mut self, selection: EntrySelection) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_range(self, start: usize, end: usize) -> Self {
        self.with_selection(EntrySelection::Range { start, end })
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    /// Run from an entry file on disk
    pub fn run_file(&self, path: &Path) -> Result<FlowResult> {
        info!("Resolving flow from {}", path.display());
        let sources = SourceSet::from_entry_file(path, &self.config)?;
        self.run_sources(self.attach_dependencies(sources))
    }

    /// Run from in-memory entry text
    pub fn run_text(&self, name: &str, text: &str) -> Result<FlowResult> {
        let sources = SourceSet::from_entry_text(name, text, &self.config);
        self.run_sources(self.attach_dependencies(sources))
    }

    /// Run over a prepared source set whose entry file is marked
    pub fn run_sources(&self, sources: SourceSet) -> Result<FlowResult> {
        let entry_file = sources
            .entry()
            .ok_or_else(|| FlowError::entry_not_found("source set has no entry file"))?;

        let (lines, start_line) = match self.selection {
            EntrySelection::Range { start, end } => select_range(&entry_file.lines, start, end)?,
            EntrySelection::WholeFile => whole_file_entry(&entry_file.lines, &self.config),
        };
        debug!(
            lines = lines.len(),
            start_line,
            "Selected entry block from {}",
            entry_file.display_name()
        );
        let entry = EntryBlock {
            lines,
            source_file: entry_file.display_name(),
            start_line,
        };

        let catalog = MacroCatalogBuilder::new(&self.config).build(&sources);
        let aliases = AliasTable::build(&sources, &self.config);
        info!(
            files = sources.len(),
            macros = catalog.len(),
            aliases = aliases.len(),
            "Source set ready"
        );

        Ok(FlowEngine::new(&self.config, &sources, &catalog, &aliases).run(entry))
    }

    fn attach_dependencies(&self, sources: SourceSet) -> SourceSet {
        match &self.dependency_dir {
            Some(dir) => sources.with_dependency_dir(dir, &self.config),
            None => sources,
        }
    }
}
