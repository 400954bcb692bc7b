//! Target extraction infrastructure

pub mod rules;
pub mod symbol;

pub use rules::{Rule, RuleContext, RULES};
pub use symbol::{is_register, is_symbolic, strip_parens, symbolic_candidate};
