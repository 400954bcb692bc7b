//! Macro catalog builder
//!
//! Scans every searchable file for `MACRO` ... `MEND` pairs. The prototype
//! is either on the opening line (`MACRO NAME &P1,&P2`) or on the next
//! non-comment line (`&LBL NAME &P1,&P2`, `NAME &P1,&P2` or `NAME` as the
//! opcode). An opener without a closing delimiter is skipped and scanning
//! resumes on the following line.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::{DuplicateMacroPolicy, FlowConfig};
use crate::features::block_resolver::SourceSet;
use crate::features::macro_catalog::domain::{MacroCatalog, MacroDefinition};
use crate::features::parsing::{normalize_with_origin, split_operands, tokenize_line, NormalizedLine};
use crate::features::target_extraction::infrastructure::rules::direct_jump_operand;

/// Prototype parsed from a header line
#[derive(Debug, PartialEq, Eq)]
struct Prototype {
    name: String,
    label_parameter: Option<String>,
    parameters: Vec<String>,
}

/// `&FIELD=DEFAULT` → `FIELD`
fn normalize_parameter(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let name = raw.strip_prefix('&')?;
    let name = name.split('=').next().unwrap_or("").trim();
    (!name.is_empty()).then(|| name.to_ascii_uppercase())
}

fn parameters_of(text: &str) -> Vec<String> {
    split_operands(text)
        .iter()
        .filter_map(|p| normalize_parameter(p))
        .collect()
}

fn valid_macro_name(name: &str) -> bool {
    !name.is_empty() && !name.starts_with('&') && !name.starts_with('*')
}

/// Same-line form: `MACRO [&x ...] NAME &P1,&P2`
fn inline_prototype(after_opener: &str) -> Option<Prototype> {
    let tokens: Vec<&str> = after_opener.split_whitespace().collect();
    let name_idx = tokens.iter().position(|t| !t.starts_with('&'))?;
    let name = tokens[name_idx].trim_end_matches(',');
    if !valid_macro_name(name) {
        return None;
    }
    let label_parameter = tokens[..name_idx].first().and_then(|t| normalize_parameter(t));
    let parameters = tokens
        .get(name_idx + 1)
        .map(|t| parameters_of(t))
        .unwrap_or_default();
    Some(Prototype {
        name: name.to_ascii_uppercase(),
        label_parameter,
        parameters,
    })
}

/// Classic prototype statement on its own line
fn classic_prototype(line: &str) -> Option<Prototype> {
    let tokens = tokenize_line(line);
    let label = tokens.label.as_deref();
    let opcode = tokens.opcode.as_deref()?;

    match label {
        Some(label) if label.starts_with('&') => Some(Prototype {
            name: opcode.to_string(),
            label_parameter: normalize_parameter(label),
            parameters: tokens.operands.iter().filter_map(|p| normalize_parameter(p)).collect(),
        }),
        Some(label) if opcode.starts_with('&') => valid_macro_name(label).then(|| Prototype {
            name: label.to_ascii_uppercase(),
            label_parameter: None,
            parameters: parameters_of(opcode),
        }),
        _ if valid_macro_name(opcode) => Some(Prototype {
            name: opcode.to_string(),
            label_parameter: None,
            parameters: tokens.operands.iter().filter_map(|p| normalize_parameter(p)).collect(),
        }),
        _ => None,
    }
}

fn is_comment_or_blank(line: &str) -> bool {
    let t = line.trim_start();
    t.is_empty() || line.starts_with('*') || line.starts_with(".*")
}

/// Builds a [`MacroCatalog`] from a source set
pub struct MacroCatalogBuilder<'a> {
    config: &'a FlowConfig,
}

impl<'a> MacroCatalogBuilder<'a> {
    pub fn new(config: &'a FlowConfig) -> Self {
        Self { config }
    }

    pub fn build(&self, sources: &SourceSet) -> MacroCatalog {
        let mut catalog = MacroCatalog::new();
        for file in sources.files() {
            for definition in self.scan_file(&file.path, &file.lines) {
                self.register(&mut catalog, definition);
            }
        }
        info!(
            macros = catalog.len(),
            duplicates = catalog.duplicates().len(),
            "Macro catalog built from {} files",
            sources.len()
        );
        catalog
    }

    fn register(&self, catalog: &mut MacroCatalog, definition: MacroDefinition) {
        let name = definition.name.clone();
        let ignored = definition.source_file.clone();
        if let Some(kept) = catalog.register(definition) {
            match self.config.duplicate_macros {
                DuplicateMacroPolicy::Warn => warn!(
                    "Duplicate macro {} in {} ignored; keeping definition from {}",
                    name,
                    ignored.display(),
                    kept.display()
                ),
                DuplicateMacroPolicy::FirstWins => debug!(
                    "Duplicate macro {} in {} ignored",
                    name,
                    ignored.display()
                ),
            }
        }
    }

    /// All well-formed macro definitions of one file, in order
    pub fn scan_file(&self, path: &Path, raw_lines: &[String]) -> Vec<MacroDefinition> {
        let ops = &self.config.opcodes;
        let logical = normalize_with_origin(raw_lines, self.config);
        let mut definitions = Vec::new();

        let mut idx = 0;
        while idx < logical.len() {
            let tokens = tokenize_line(&logical[idx].text);
            if !ops.is_macro_open(tokens.opcode_str()) {
                idx += 1;
                continue;
            }

            match self.parse_definition(path, raw_lines, &logical, idx) {
                Some((definition, close_idx)) => {
                    debug!(
                        "Macro {} at {}:{}",
                        definition.name,
                        path.display(),
                        definition.header_line
                    );
                    definitions.push(definition);
                    idx = close_idx + 1;
                }
                None => {
                    debug!(
                        "Skipping malformed macro at {}:{}",
                        path.display(),
                        logical[idx].line_no
                    );
                    idx += 1;
                }
            }
        }
        definitions
    }

    fn parse_definition(
        &self,
        path: &Path,
        raw_lines: &[String],
        logical: &[NormalizedLine],
        open_idx: usize,
    ) -> Option<(MacroDefinition, usize)> {
        let ops = &self.config.opcodes;
        let open_text = &logical[open_idx].text;

        // Same-line header follows the opener token
        let after_opener = open_text
            .trim_start()
            .split_once(char::is_whitespace)
            .map(|(_, rest)| rest)
            .unwrap_or("");
        let after_opener = if tokenize_line(open_text).label.is_some() {
            after_opener
                .trim_start()
                .split_once(char::is_whitespace)
                .map(|(_, rest)| rest)
                .unwrap_or("")
        } else {
            after_opener
        };

        let (prototype, header_idx) = match inline_prototype(after_opener) {
            Some(proto) => (proto, open_idx),
            None => {
                let header_idx = (open_idx + 1..logical.len())
                    .find(|&i| !is_comment_or_blank(&logical[i].text))?;
                (classic_prototype(&logical[header_idx].text)?, header_idx)
            }
        };

        // Closing delimiter, honouring nested definitions
        let mut depth = 1;
        let mut close_idx = None;
        for (i, line) in logical.iter().enumerate().skip(header_idx + 1) {
            let op = tokenize_line(&line.text).opcode.unwrap_or_default();
            if ops.is_macro_open(&op) {
                depth += 1;
            } else if ops.is_macro_close(&op) {
                depth -= 1;
                if depth == 0 {
                    close_idx = Some(i);
                    break;
                }
            }
        }
        let close_idx = close_idx?;

        let body = &logical[header_idx + 1..close_idx];
        let call_parameters = self.call_parameters(&prototype, body);

        let first_line = logical[open_idx].line_no;
        let last_line = last_physical_line(logical, close_idx, raw_lines.len());

        Some((
            MacroDefinition {
                name: prototype.name,
                source_file: path.to_path_buf(),
                header_line: logical[header_idx].line_no,
                label_parameter: prototype.label_parameter,
                parameters: prototype.parameters,
                call_parameters,
                lines: raw_lines[first_line - 1..last_line].to_vec(),
            },
            close_idx,
        ))
    }

    /// Parameters used as direct call targets in the body
    fn call_parameters(&self, prototype: &Prototype, body: &[NormalizedLine]) -> Vec<String> {
        let mut used = Vec::new();
        for line in body {
            let tokens = tokenize_line(&line.text);
            let Some(operand) = direct_jump_operand(&self.config.opcodes, &tokens) else {
                continue;
            };
            let Some(param) = normalize_parameter(operand) else {
                continue;
            };
            if prototype.parameters.contains(&param) && !used.contains(&param) {
                used.push(param);
            }
        }
        used
    }
}

/// Last physical line (1-indexed) covered by logical line `idx`
fn last_physical_line(logical: &[NormalizedLine], idx: usize, total: usize) -> usize {
    logical
        .get(idx + 1)
        .map(|next| next.line_no - 1)
        .unwrap_or(total)
}
