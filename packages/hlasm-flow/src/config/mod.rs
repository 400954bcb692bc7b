//! Configuration System
//!
//! A single [`FlowConfig`] drives every stage of the engine. Defaults match
//! the common shop conventions (`IN`/`OUT` markers, `GO` family jumps,
//! `MACRO`/`MEND` delimiters); a YAML v1 file can override any subset.
//!
//! ```rust,ignore
//! use hlasm_flow::config::FlowConfig;
//!
//! let config = FlowConfig::from_yaml("shop.yaml")?;
//! ```

pub mod error;
pub mod flow_config;
pub mod io;

pub use error::{ConfigError, ConfigResult};
pub use flow_config::{DuplicateMacroPolicy, FlowConfig, OpcodeConventions};
pub use io::{ConfigFileV1, SUPPORTED_VERSIONS};
