//! Block chunk analysis facade
//!
//! Single-file analysis turns every labelled block of a source into a
//! [`BlockChunk`] and records its dependencies in a [`DependencyMap`].
//! Dependency mode then follows those dependencies file by file:
//!
//! ```text
//! stack: [(entry, 0)]
//!   pop (file, depth) → analyse → for each external dependency name:
//!     <external_dir>/<NAME><ext> found  → push (file, depth + 1)
//!     nothing found                     → MissingDependency
//! ```
//!
//! Each file is analysed at most once; branches deeper than `max_depth` are
//! abandoned with a warning.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::FlowConfig;
use crate::errors::Result;
use crate::features::chunking::{BlockChunk, Chunker, ExtractBlocks, ROOT_LABEL};
use crate::features::cross_file::{DependencyMap, MissingDependency};

/// Chunks of one analysed source
#[derive(Debug, Clone, Serialize)]
pub struct FileAnalysis {
    pub source_file: PathBuf,
    /// Program name: file stem, uppercased
    pub program: String,
    pub chunks: Vec<BlockChunk>,
}

impl FileAnalysis {
    /// Labels defined in this source
    pub fn labels(&self) -> HashSet<&str> {
        self.chunks.iter().map(|c| c.label.as_str()).collect()
    }

    /// Dependency-map vertex of a chunk; the prologue stands for the program
    pub fn vertex_name<'a>(&'a self, chunk: &'a BlockChunk) -> &'a str {
        if chunk.label == ROOT_LABEL {
            self.program.as_str()
        } else {
            chunk.label.as_str()
        }
    }

    /// Dependencies that name no block of this source, first-seen order
    pub fn external_dependencies(&self) -> Vec<(&str, &str)> {
        let labels = self.labels();
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for chunk in &self.chunks {
            for dep in &chunk.dependencies {
                if !labels.contains(dep.as_str()) && seen.insert(dep.as_str()) {
                    out.push((chunk.label.as_str(), dep.as_str()));
                }
            }
        }
        out
    }
}

/// Outcome of dependency-following analysis
#[derive(Debug, Clone, Default)]
pub struct AnalysisReport {
    /// Analysed files in visiting order
    pub files: Vec<FileAnalysis>,
    pub dependency_map: DependencyMap,
    pub missing: Vec<MissingDependency>,
}

impl AnalysisReport {
    pub fn chunk_count(&self) -> usize {
        self.files.iter().map(|f| f.chunks.len()).sum()
    }
}

fn program_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("PROGRAM")
        .to_uppercase()
}

/// Analysis entry point
pub struct HlasmAnalysis {
    config: FlowConfig,
    external_dir: Option<PathBuf>,
}

impl HlasmAnalysis {
    pub fn new(config: FlowConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            external_dir: None,
        })
    }

    /// Directory searched for dependency files (defaults to the entry
    /// file's directory)
    pub fn with_external_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.external_dir = Some(dir.into());
        self
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    /// Analyse in-memory source text
    pub fn analyze_text(&self, source: &str, source_file: &str) -> FileAnalysis {
        let sections = ExtractBlocks::new(&self.config).sections_from_text(source);
        let chunks = Chunker::new(&self.config).chunk(&sections, source_file);
        debug!(chunks = chunks.len(), "Analysed {}", source_file);
        FileAnalysis {
            source_file: PathBuf::from(source_file),
            program: program_name(Path::new(source_file)),
            chunks,
        }
    }

    /// Analyse one source file
    pub fn analyze_file(&self, path: &Path) -> Result<FileAnalysis> {
        let sections = ExtractBlocks::new(&self.config).sections(path)?;
        let source_file = path.display().to_string();
        let chunks = Chunker::new(&self.config).chunk(&sections, &source_file);
        Ok(FileAnalysis {
            source_file: path.to_path_buf(),
            program: program_name(path),
            chunks,
        })
    }

    /// Record every chunk's dependencies; the prologue block stands for the
    /// program itself
    pub fn record_dependencies(analysis: &FileAnalysis, map: &mut DependencyMap) {
        map.add_vertex(&analysis.program);
        for chunk in &analysis.chunks {
            let caller = analysis.vertex_name(chunk);
            map.add_vertex(caller);
            for dep in &chunk.dependencies {
                map.add_call_dependency(caller, dep);
            }
        }
    }

    /// Analyse `path` and follow its external dependencies
    pub fn analyze_with_dependencies(&self, path: &Path) -> Result<AnalysisReport> {
        let search_dir = match &self.external_dir {
            Some(dir) => dir.clone(),
            None => path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        };
        let index = FileIndex::scan(&search_dir);

        let mut report = AnalysisReport::default();
        let mut visited: HashSet<PathBuf> = HashSet::new();
        let mut reported: HashSet<(String, PathBuf)> = HashSet::new();
        let mut stack: Vec<(PathBuf, usize)> = vec![(path.to_path_buf(), 0)];

        while let Some((file, depth)) = stack.pop() {
            if !visited.insert(file.clone()) {
                continue;
            }
            let analysis = if report.files.is_empty() {
                self.analyze_file(&file)?
            } else {
                match self.analyze_file(&file) {
                    Ok(a) => a,
                    Err(e) => {
                        warn!("Skipping dependency {}: {}", file.display(), e);
                        continue;
                    }
                }
            };
            Self::record_dependencies(&analysis, &mut report.dependency_map);

            let mut next = Vec::new();
            for (chunk, dep) in analysis.external_dependencies() {
                match index.find(dep, &self.config.dependency_extensions) {
                    Some(found) => {
                        if visited.contains(&found) {
                            continue;
                        }
                        if depth + 1 > self.config.max_depth {
                            warn!(
                                depth = depth + 1,
                                max_depth = self.config.max_depth,
                                "Depth limit reached, not following {} from {}",
                                dep,
                                file.display()
                            );
                            continue;
                        }
                        next.push((found, depth + 1));
                    }
                    None => {
                        if reported.insert((dep.to_string(), file.clone())) {
                            report.missing.push(MissingDependency {
                                dep_name: dep.to_string(),
                                referenced_from_file: file.clone(),
                                referenced_in_chunk: chunk.to_string(),
                                search_path: search_dir.clone(),
                            });
                        }
                    }
                }
            }
            // Reverse so the first dependency is analysed first.
            stack.extend(next.into_iter().rev());
            report.files.push(analysis);
        }

        info!(
            files = report.files.len(),
            chunks = report.chunk_count(),
            missing = report.missing.len(),
            "Dependency analysis complete"
        );
        Ok(report)
    }
}

/// Case-insensitive file-name lookup over one directory tree
struct FileIndex {
    by_name: HashMap<String, PathBuf>,
}

impl FileIndex {
    fn scan(dir: &Path) -> Self {
        let mut paths: Vec<PathBuf> = WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .collect();
        paths.sort();

        let mut by_name = HashMap::new();
        for path in paths {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                by_name.entry(name.to_lowercase()).or_insert(path);
            }
        }
        Self { by_name }
    }

    fn find(&self, dep: &str, extensions: &[String]) -> Option<PathBuf> {
        extensions.iter().find_map(|ext| {
            self.by_name
                .get(&format!("{}{}", dep, ext).to_lowercase())
                .cloned()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_text_records_dependencies() {
        let analysis = HlasmAnalysis::new(FlowConfig::default()).unwrap();
        let src = "\
PROG     CSECT
         CALL  EXTPGM
         BAL   R14,LOCAL
LOCAL    IN
         LINK  EP=OTHER
         OUT
";
        let result = analysis.analyze_text(src, "prog.asm");
        assert_eq!(result.program, "PROG");
        let labels: Vec<_> = result.chunks.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["PROG", "LOCAL"]);
        assert_eq!(result.chunks[0].dependencies, vec!["EXTPGM", "LOCAL"]);
        assert_eq!(
            result.external_dependencies(),
            vec![("PROG", "EXTPGM"), ("LOCAL", "OTHER")]
        );

        let mut map = DependencyMap::new();
        HlasmAnalysis::record_dependencies(&result, &mut map);
        assert_eq!(map.direct_dependencies("PROG"), vec!["EXTPGM", "LOCAL"]);
    }

    #[test]
    fn test_file_index_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("SubProg.ASM"), "X").unwrap();
        let index = FileIndex::scan(dir.path());
        let exts = FlowConfig::default().dependency_extensions;
        assert!(index.find("SUBPROG", &exts).is_some());
        assert!(index.find("NOPE", &exts).is_none());
    }
}
