/*
 * HLASM Flow - Static Call Flow Reconstruction for Fixed-Column Assembler
 *
 * Feature-First Architecture:
 * - shared/      : Id allocation, column-aware text helpers
 * - features/    : Vertical slices (parsing → chunking → macro catalog →
 *                  target extraction → block resolution → flow graph)
 * - pipeline/    : Facades wiring one run end to end
 * - config/      : Opcode conventions and heuristics switches (YAML)
 *
 * Best-effort by contract: names that cannot be located end up in the
 * run's `missing` list, never in an error.
 */

// Crate-level lint configuration
#![allow(clippy::new_without_default)] // Builders take explicit config
#![allow(clippy::module_inception)] // Module naming intentional
#![allow(clippy::collapsible_if)] // Readability over brevity
#![allow(clippy::manual_strip)] // Manual strip for clarity
#![allow(clippy::needless_lifetimes)] // Explicit lifetimes for clarity

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports - Feature-First Architecture
// ═══════════════════════════════════════════════════════════════════════════

/// Shared utilities
pub mod shared;

/// Feature modules
pub mod features;

/// Pipeline facades
pub mod pipeline;

/// Configuration system
pub mod config;

/// Error types
pub mod errors;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports for Public API
// ═══════════════════════════════════════════════════════════════════════════

pub use config::{DuplicateMacroPolicy, FlowConfig, OpcodeConventions};
pub use errors::{FlowError, Result};
pub use features::block_resolver::ChunkKind;
pub use features::flow_graph::{
    build_tree, Chunk, ChunkStore, FlowMap, FlowResult, OutputFormat, TreeNode,
};
pub use features::target_extraction::{CallEvent, RuleKind, TargetExtractor};
pub use pipeline::{EntrySelection, FlowPipeline, HlasmAnalysis};
