//! Block extraction use case
//!
//! Normalise → structure → select sections (prologue first, then the named
//! blocks in source order).

use std::path::Path;

use tracing::{debug, info};

use crate::config::FlowConfig;
use crate::errors::Result;
use crate::features::chunking::domain::{BlockTree, LabelledBlock};
use crate::features::chunking::infrastructure::LabelBlockPass;
use crate::features::parsing::normalize_with_origin;

/// Runs the normalisation passes and the structuring pass
pub struct ExtractBlocks<'a> {
    config: &'a FlowConfig,
}

impl<'a> ExtractBlocks<'a> {
    pub fn new(config: &'a FlowConfig) -> Self {
        Self { config }
    }

    /// Structure a list of raw lines
    pub fn tree(&self, lines: &[String]) -> BlockTree {
        let normalized = normalize_with_origin(lines, self.config);
        let tree = LabelBlockPass::new(&self.config.opcodes).run(&normalized);
        debug!(
            blocks = tree.blocks.len(),
            prologue = tree.root.has_content(),
            "Structured {} lines",
            lines.len()
        );
        tree
    }

    /// Sections of in-memory source text
    pub fn sections_from_text(&self, source: &str) -> Vec<LabelledBlock> {
        let lines: Vec<String> = source.lines().map(str::to_string).collect();
        let tree = self.tree(&lines);
        tree.sections().into_iter().cloned().collect()
    }

    /// Sections of a source file (decoded lossily)
    pub fn sections(&self, path: &Path) -> Result<Vec<LabelledBlock>> {
        info!("Parsing file: {}", path.display());
        let bytes = std::fs::read(path)?;
        let source = String::from_utf8_lossy(&bytes);
        Ok(self.sections_from_text(&source))
    }
}
