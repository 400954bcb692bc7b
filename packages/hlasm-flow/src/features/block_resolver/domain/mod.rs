//! Block resolver domain models

mod chunk_kind;
mod resolved;

pub use chunk_kind::ChunkKind;
pub use resolved::{ResolvedBlock, Strategy};
