//! Pipeline facades
//!
//! - [`FlowPipeline`]: flow resolution from an entry block
//! - [`HlasmAnalysis`]: block chunk analysis, optionally following
//!   dependencies across files

pub mod analysis;
pub mod flow_pipeline;

pub use analysis::{AnalysisReport, FileAnalysis, HlasmAnalysis};
pub use flow_pipeline::{select_range, whole_file_entry, EntrySelection, FlowPipeline};
