//! Searchable source set
//!
//! The entry file (or in-memory entry text) comes first, then every file
//! under the dependency directory in lexicographic path order. Files are
//! decoded lossily; a file that cannot be read is logged and left out.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::FlowConfig;
use crate::errors::{FlowError, Result};
use crate::features::parsing::{tokenize_line, TokenizedLine};
use crate::shared::utils::text::truncate_chars;

/// One searchable file with per-physical-line tokens
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Raw physical lines
    pub lines: Vec<String>,
    /// Tokens of each physical line (column limit applied)
    pub tokens: Vec<TokenizedLine>,
    pub is_entry: bool,
}

impl SourceFile {
    pub fn from_text(path: impl Into<PathBuf>, text: &str, is_entry: bool, config: &FlowConfig) -> Self {
        let lines: Vec<String> = text.lines().map(str::to_string).collect();
        let tokens = lines
            .iter()
            .map(|line| match config.column_limit {
                Some(limit) => tokenize_line(truncate_chars(line, limit)),
                None => tokenize_line(line),
            })
            .collect();
        Self {
            path: path.into(),
            lines,
            tokens,
            is_entry,
        }
    }

    /// File name without extension
    pub fn stem(&self) -> Option<&str> {
        self.path.file_stem().and_then(|s| s.to_str())
    }

    pub fn display_name(&self) -> String {
        self.path.display().to_string()
    }
}

fn read_lossy(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Ordered set of searchable files
#[derive(Debug, Clone, Default)]
pub struct SourceSet {
    files: Vec<SourceFile>,
}

impl SourceSet {
    /// Entry text held in memory under a display name
    pub fn from_entry_text(name: impl Into<PathBuf>, text: &str, config: &FlowConfig) -> Self {
        Self {
            files: vec![SourceFile::from_text(name, text, true, config)],
        }
    }

    /// Read the entry file; failure here is a setup error
    pub fn from_entry_file(path: &Path, config: &FlowConfig) -> Result<Self> {
        let text = read_lossy(path)
            .map_err(|e| FlowError::entry_not_found(format!("{}: {}", path.display(), e)))?;
        Ok(Self::from_entry_text(path, &text, config))
    }

    /// Add every file under `dir`, sorted by path
    pub fn with_dependency_dir(mut self, dir: &Path, config: &FlowConfig) -> Self {
        // In-memory entry text has no file to compare against
        let entry_path = self.entry().and_then(|f| f.path.canonicalize().ok());
        let is_entry = |path: &Path| {
            entry_path
                .as_ref()
                .is_some_and(|entry| path.canonicalize().ok().as_ref() == Some(entry))
        };

        let mut paths: Vec<PathBuf> = WalkDir::new(dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(e) => Some(e),
                Err(e) => {
                    warn!("Skipping unreadable path under {}: {}", dir.display(), e);
                    None
                }
            })
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| !is_entry(p.as_path()))
            .collect();
        paths.sort();

        for path in paths {
            match read_lossy(&path) {
                Ok(text) => self.files.push(SourceFile::from_text(&path, &text, false, config)),
                Err(e) => warn!("Cannot read {}: {}", path.display(), e),
            }
        }
        debug!(
            files = self.files.len(),
            "Loaded source set from {}",
            dir.display()
        );
        self
    }

    /// Add an in-memory dependency file (after the existing ones)
    pub fn push_text(&mut self, path: impl Into<PathBuf>, text: &str, config: &FlowConfig) {
        self.files.push(SourceFile::from_text(path, text, false, config));
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn entry(&self) -> Option<&SourceFile> {
        self.files.iter().find(|f| f.is_entry)
    }

    pub fn dependency_files(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.iter().filter(|f| !f.is_entry)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
