//! Feature modules
//!
//! Each feature is a vertical slice:
//! - domain/         - entities and value types
//! - infrastructure/ - algorithms over those types
//! - application/    - entry points for callers (where there is one)
//!
//! ```text
//! parsing → chunking ─────────────────────────────┐
//!    │                                            ▼
//!    └→ macro_catalog → target_extraction → flow_graph ← block_resolver ← alias
//!                                                 │
//!                                   cross_file ←──┘ (whole-file mode)
//! ```

pub mod alias;
pub mod block_resolver;
pub mod chunking;
pub mod cross_file;
pub mod flow_graph;
pub mod macro_catalog;
pub mod parsing;
pub mod target_extraction;
