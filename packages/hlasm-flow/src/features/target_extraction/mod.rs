//! Target extraction feature
//!
//! Turns block lines into ordered call events using an explicit ordered rule
//! list. See [`infrastructure::rules`] for the priority table.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::TargetExtractor;
pub use domain::{CallEvent, RuleKind, RuleMatch};
pub use infrastructure::{is_register, is_symbolic, symbolic_candidate};
