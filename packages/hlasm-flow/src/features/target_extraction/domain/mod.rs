//! Target extraction domain models

mod call_event;

pub use call_event::{CallEvent, RuleKind, RuleMatch};
