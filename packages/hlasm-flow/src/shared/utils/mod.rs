//! Utility functions

pub mod id_allocator;
pub mod text;

pub use id_allocator::IdAllocator;
pub use text::LABEL_FIELD_WIDTH;
