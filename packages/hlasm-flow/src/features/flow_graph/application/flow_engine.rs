//! Flow-graph engine
//!
//! Breadth-first traversal from the entry block over an explicit work queue.
//!
//! ```text
//! undiscovered → queued → resolving → resolved | missing
//! ```
//!
//! Each dequeued chunk is run through the target extractor. Every direct
//! target and every macro invocation becomes an edge of the flow map; a name
//! seen for the first time is resolved immediately (macros straight from the
//! catalog, everything else through the block resolver) and, when found,
//! queued so its own calls are extracted. A name is expanded at most once, so
//! cyclic call graphs terminate with a back-edge.

use std::collections::{BTreeSet, HashMap, VecDeque};

use tracing::{debug, info};

use crate::config::FlowConfig;
use crate::features::alias::AliasTable;
use crate::features::block_resolver::{BlockResolver, ChunkKind, SourceSet};
use crate::features::flow_graph::domain::{Chunk, ChunkStore, FlowMap, FlowResult, NodeState};
use crate::features::macro_catalog::MacroCatalog;
use crate::features::target_extraction::{CallEvent, TargetExtractor};

/// The entry block of a run
#[derive(Debug, Clone)]
pub struct EntryBlock {
    pub lines: Vec<String>,
    pub source_file: String,
    /// 1-indexed first line of the block in `source_file`
    pub start_line: usize,
}

/// Orchestrates extraction and resolution over a fixed source set
pub struct FlowEngine<'a> {
    config: &'a FlowConfig,
    sources: &'a SourceSet,
    catalog: &'a MacroCatalog,
    aliases: &'a AliasTable,
}

/// Mutable state of one traversal
struct Traversal<'a> {
    config: &'a FlowConfig,
    catalog: &'a MacroCatalog,
    aliases: &'a AliasTable,
    resolver: BlockResolver<'a>,
    chunks: ChunkStore,
    flow: FlowMap,
    missing: Vec<String>,
    states: HashMap<String, NodeState>,
    queue: VecDeque<String>,
}

fn tags(tag: &str) -> BTreeSet<String> {
    BTreeSet::from([tag.to_string()])
}

impl<'a> FlowEngine<'a> {
    pub fn new(
        config: &'a FlowConfig,
        sources: &'a SourceSet,
        catalog: &'a MacroCatalog,
        aliases: &'a AliasTable,
    ) -> Self {
        Self {
            config,
            sources,
            catalog,
            aliases,
        }
    }

    /// Run the traversal from `entry`
    pub fn run(&self, entry: EntryBlock) -> FlowResult {
        let entry_name = self.config.entry_name.clone();
        let mut traversal = Traversal {
            config: self.config,
            catalog: self.catalog,
            aliases: self.aliases,
            resolver: BlockResolver::new(self.sources, self.config),
            chunks: ChunkStore::default(),
            flow: FlowMap::default(),
            missing: Vec::new(),
            states: HashMap::new(),
            queue: VecDeque::new(),
        };

        traversal.chunks.insert(Chunk {
            name: entry_name.clone(),
            lines: entry.lines,
            kind: ChunkKind::Entry,
            tags: tags("entry"),
            source_file: entry.source_file,
            start_line: entry.start_line,
        });
        traversal.flow.ensure(&entry_name);
        traversal.states.insert(entry_name.clone(), NodeState::Queued);
        traversal.queue.push_back(entry_name.clone());

        traversal.drain();

        info!(
            chunks = traversal.chunks.len(),
            edges = traversal.flow.edges().count(),
            missing = traversal.missing.len(),
            "Flow resolution complete"
        );

        FlowResult {
            entry: entry_name,
            chunks: traversal.chunks,
            flow: traversal.flow,
            missing: traversal.missing,
            catalog: self.catalog.clone(),
            aliases: self.aliases.clone(),
        }
    }
}

impl<'a> Traversal<'a> {
    fn drain(&mut self) {
        let extractor = TargetExtractor::new(self.config, self.catalog);

        while let Some(name) = self.queue.pop_front() {
            let lines = match self.chunks.get(&name) {
                Some(chunk) => chunk.lines.clone(),
                None => continue,
            };
            self.states.insert(name.clone(), NodeState::Resolved);

            for event in extractor.extract(&lines, Some(&name)) {
                match event {
                    CallEvent::Direct { name: target, .. } => {
                        let target = self.canonical(&target);
                        self.flow.link(&name, &target);
                        self.discover(&target);
                    }
                    CallEvent::Macro {
                        name: macro_name,
                        targets,
                        ..
                    } => {
                        self.flow.link(&name, &macro_name);
                        self.register_macro(&macro_name);
                        for target in targets {
                            let target = self.canonical(&target);
                            self.flow.link(&macro_name, &target);
                            self.discover(&target);
                        }
                    }
                }
            }
        }
    }

    fn canonical(&self, name: &str) -> String {
        if self.config.collapse_aliases {
            self.aliases.resolve(name)
        } else {
            name.to_string()
        }
    }

    /// First sighting of a name: resolve it once
    fn discover(&mut self, name: &str) {
        if self.states.contains_key(name) {
            return;
        }
        self.flow.ensure(name);

        if self.catalog.contains(name) {
            self.register_macro(name);
            return;
        }

        self.states.insert(name.to_string(), NodeState::Resolving);
        match self.resolver.resolve(name) {
            Some(block) => {
                self.chunks.insert(Chunk {
                    name: name.to_string(),
                    lines: block.lines,
                    kind: block.kind,
                    tags: tags(block.tag),
                    source_file: block.source.display().to_string(),
                    start_line: block.start_line,
                });
                self.states.insert(name.to_string(), NodeState::Queued);
                self.queue.push_back(name.to_string());
            }
            None => {
                debug!(target_name = name, "Marked missing");
                self.states.insert(name.to_string(), NodeState::Missing);
                self.missing.push(name.to_string());
            }
        }
    }

    /// Macro node: chunk from the catalog, queued once
    fn register_macro(&mut self, name: &str) {
        self.flow.ensure(name);
        if self.chunks.contains(name) {
            return;
        }
        let Some(definition) = self.catalog.get(name) else {
            return;
        };
        self.chunks.insert(Chunk {
            name: name.to_string(),
            lines: definition.lines.clone(),
            kind: ChunkKind::Macro,
            tags: tags("macro"),
            source_file: definition.source_file.display().to_string(),
            start_line: definition.header_line,
        });
        self.states.insert(name.to_string(), NodeState::Queued);
        self.queue.push_back(name.to_string());
    }
}
