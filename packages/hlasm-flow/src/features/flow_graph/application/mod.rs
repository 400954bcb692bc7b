//! Flow graph application layer

pub mod flow_engine;

pub use flow_engine::{EntryBlock, FlowEngine};
