//! Flow-resolution configuration
//!
//! Every shop convention the heuristics depend on lives here: which opcodes
//! mark subroutine entry/exit, which directives end a section, which call
//! forms are recognised, and which heuristics are enabled.
//!
//! # Examples
//!
//! ```rust,ignore
//! use hlasm_flow::config::{DuplicateMacroPolicy, FlowConfig};
//!
//! let config = FlowConfig::default()
//!     .max_depth(50)
//!     .dispatch_table_heuristic(false)
//!     .duplicate_macros(DuplicateMacroPolicy::FirstWins);
//! config.validate()?;
//! ```

use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigResult};

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Case-insensitive membership test for opcode lists
pub(crate) fn contains_ignore_case(list: &[String], value: &str) -> bool {
    list.iter().any(|item| item.eq_ignore_ascii_case(value))
}

/// Opcode and directive conventions used by every heuristic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OpcodeConventions {
    /// Go-style jump opcodes (first operand is the target)
    pub go_family: Vec<String>,
    /// Subroutine entry marker (`<name>  IN`)
    pub entry_marker: String,
    /// Subroutine exit marker (`OUT`)
    pub exit_marker: String,
    /// Equate directive (`EQU`)
    pub equate: String,
    /// Section-start directives (`CSECT`, `RSECT`)
    pub section_start: Vec<String>,
    /// Section-like declarations that never start a structuring block
    pub section_declarations: Vec<String>,
    /// Alignment directives ending a section block (inclusive)
    pub alignment: Vec<String>,
    /// End-of-program directives
    pub end_of_program: Vec<String>,
    /// Page-break / section-separator directives
    pub page_break: Vec<String>,
    /// Opcodes forming a plain "load as link" call (`L NAME`)
    pub load_link: Vec<String>,
    /// Opcodes loading an external address constant (`L R15,=V(NAME)`)
    pub address_load: Vec<String>,
    /// Dynamic-call opcodes accepting `EP=` / `DE=` keyword operands
    pub dynamic_call: Vec<String>,
    /// Static-call opcodes (`CALL NAME`)
    pub static_call: Vec<String>,
    /// Copy / include directives
    pub copy: Vec<String>,
    /// Macro definition opening delimiter
    pub macro_open: String,
    /// Macro definition closing delimiter
    pub macro_close: String,
    /// Label-field keywords that never start a block
    pub no_op_labels: Vec<String>,
}

impl Default for OpcodeConventions {
    fn default() -> Self {
        Self {
            go_family: words(&[
                "GO", "GOIF", "GOIFNOT", "GOEQ", "GONE", "GOGT", "GOLT", "GOGE", "GOLE",
            ]),
            entry_marker: "IN".to_string(),
            exit_marker: "OUT".to_string(),
            equate: "EQU".to_string(),
            section_start: words(&["CSECT", "RSECT"]),
            section_declarations: words(&["CSECT", "DSECT"]),
            alignment: words(&["CNOP"]),
            end_of_program: words(&["END"]),
            page_break: words(&["EJECT"]),
            load_link: words(&["L"]),
            address_load: words(&["L", "LG", "LY", "LGF", "LLGF"]),
            dynamic_call: words(&["LINK", "XCTL", "LOAD", "ATTACH", "DELETE"]),
            static_call: words(&["CALL"]),
            copy: words(&["COPY"]),
            macro_open: "MACRO".to_string(),
            macro_close: "MEND".to_string(),
            no_op_labels: words(&["SORTED"]),
        }
    }
}

impl OpcodeConventions {
    pub fn is_go(&self, opcode: &str) -> bool {
        contains_ignore_case(&self.go_family, opcode)
    }

    pub fn is_entry_marker(&self, opcode: &str) -> bool {
        self.entry_marker.eq_ignore_ascii_case(opcode)
    }

    pub fn is_exit_marker(&self, opcode: &str) -> bool {
        self.exit_marker.eq_ignore_ascii_case(opcode)
    }

    pub fn is_equate(&self, opcode: &str) -> bool {
        self.equate.eq_ignore_ascii_case(opcode)
    }

    pub fn is_section_start(&self, opcode: &str) -> bool {
        contains_ignore_case(&self.section_start, opcode)
    }

    pub fn is_alignment(&self, opcode: &str) -> bool {
        contains_ignore_case(&self.alignment, opcode)
    }

    pub fn is_end_of_program(&self, opcode: &str) -> bool {
        contains_ignore_case(&self.end_of_program, opcode)
    }

    pub fn is_page_break(&self, opcode: &str) -> bool {
        contains_ignore_case(&self.page_break, opcode)
    }

    pub fn is_macro_open(&self, opcode: &str) -> bool {
        self.macro_open.eq_ignore_ascii_case(opcode)
    }

    pub fn is_macro_close(&self, opcode: &str) -> bool {
        self.macro_close.eq_ignore_ascii_case(opcode)
    }

    pub fn is_no_op_label(&self, label: &str) -> bool {
        contains_ignore_case(&self.no_op_labels, label)
    }
}

/// What to do when two files define a macro with the same name
///
/// The first definition is kept in both cases; the policy only controls how
/// loudly the shadowed definition is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateMacroPolicy {
    /// Keep the first definition silently
    FirstWins,
    /// Keep the first definition and log a warning
    Warn,
}

/// Flow-resolution configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlowConfig {
    /// Name of the entry chunk
    pub entry_name: String,

    /// Opcode conventions
    pub opcodes: OpcodeConventions,

    /// Tokens that identify a whole program file during content sniffing
    pub program_placeholders: Vec<String>,

    /// Truncate source lines to this many columns (`None` keeps full lines)
    pub column_limit: Option<usize>,

    /// Join continuation lines before extraction and structuring
    pub collapse_continuations: bool,

    /// Treat `numeric,numeric,symbol,numeric` rows as dispatch-table entries
    pub dispatch_table_heuristic: bool,

    /// Offer symbolic actual operands of macros without call parameters
    pub macro_fallback_targets: bool,

    /// Duplicate macro name reporting
    pub duplicate_macros: DuplicateMacroPolicy,

    /// Replace discovered targets by their alias-chain terminal
    pub collapse_aliases: bool,

    /// Maximum depth for whole-file dependency following
    pub max_depth: usize,

    /// File extensions tried when resolving a dependency name to a file
    pub dependency_extensions: Vec<String>,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            entry_name: "main".to_string(),
            opcodes: OpcodeConventions::default(),
            program_placeholders: words(&["&PGMNAME", "&SYSECT"]),
            column_limit: Some(72),
            collapse_continuations: true,
            dispatch_table_heuristic: true,
            macro_fallback_targets: true,
            duplicate_macros: DuplicateMacroPolicy::Warn,
            collapse_aliases: false,
            max_depth: 20,
            dependency_extensions: words(&[".asm", ".hlasm", ".s", ".mac", ".cpy", ""]),
        }
    }
}

impl FlowConfig {
    pub const MAX_DEPTH_LIMIT: usize = 1000;
    pub const MIN_COLUMN_LIMIT: usize = 16;

    pub fn entry_name(mut self, name: impl Into<String>) -> Self {
        self.entry_name = name.into();
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn column_limit(mut self, limit: Option<usize>) -> Self {
        self.column_limit = limit;
        self
    }

    pub fn dispatch_table_heuristic(mut self, enabled: bool) -> Self {
        self.dispatch_table_heuristic = enabled;
        self
    }

    pub fn macro_fallback_targets(mut self, enabled: bool) -> Self {
        self.macro_fallback_targets = enabled;
        self
    }

    pub fn duplicate_macros(mut self, policy: DuplicateMacroPolicy) -> Self {
        self.duplicate_macros = policy;
        self
    }

    pub fn collapse_aliases(mut self, enabled: bool) -> Self {
        self.collapse_aliases = enabled;
        self
    }

    /// Validate ranges and required markers
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_depth == 0 || self.max_depth > Self::MAX_DEPTH_LIMIT {
            return Err(ConfigError::range_with_hint(
                "max_depth",
                self.max_depth,
                1,
                Self::MAX_DEPTH_LIMIT,
                "Dependency following needs at least one level.",
            ));
        }

        if let Some(limit) = self.column_limit {
            if limit < Self::MIN_COLUMN_LIMIT {
                return Err(ConfigError::range_with_hint(
                    "column_limit",
                    limit,
                    Self::MIN_COLUMN_LIMIT,
                    usize::MAX,
                    "Continuation detection reads column 16; use null to disable truncation.",
                ));
            }
        }

        if self.entry_name.trim().is_empty() {
            return Err(ConfigError::validation("entry_name must not be empty"));
        }

        let markers = [
            ("opcodes.entry_marker", &self.opcodes.entry_marker),
            ("opcodes.exit_marker", &self.opcodes.exit_marker),
            ("opcodes.equate", &self.opcodes.equate),
            ("opcodes.macro_open", &self.opcodes.macro_open),
            ("opcodes.macro_close", &self.opcodes.macro_close),
        ];
        for (field, value) in markers {
            if value.trim().is_empty() {
                return Err(ConfigError::validation(format!("{} must not be empty", field)));
            }
        }

        if self.opcodes.entry_marker.eq_ignore_ascii_case(&self.opcodes.exit_marker) {
            return Err(ConfigError::validation(
                "entry and exit markers must differ",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(FlowConfig::default().validate().is_ok());
    }

    #[test]
    fn test_max_depth_range() {
        let err = FlowConfig::default().max_depth(0).validate().unwrap_err();
        assert!(matches!(err, ConfigError::Range { ref field, .. } if field == "max_depth"));

        let err = FlowConfig::default().max_depth(5000).validate().unwrap_err();
        assert!(matches!(err, ConfigError::Range { .. }));
    }

    #[test]
    fn test_column_limit_too_small() {
        let result = FlowConfig::default().column_limit(Some(8)).validate();
        assert!(result.is_err());
        assert!(FlowConfig::default().column_limit(None).validate().is_ok());
    }

    #[test]
    fn test_same_entry_and_exit_marker_rejected() {
        let mut config = FlowConfig::default();
        config.opcodes.exit_marker = "in".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_opcode_lookup_is_case_insensitive() {
        let ops = OpcodeConventions::default();
        assert!(ops.is_go("goifnot"));
        assert!(ops.is_section_start("csect"));
        assert!(!ops.is_section_start("DSECT"));
        assert!(ops.is_no_op_label("sorted"));
    }
}
