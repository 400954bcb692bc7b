//! Shared utilities used across feature slices

pub mod utils;

pub use utils::{IdAllocator, LABEL_FIELD_WIDTH};
