//! Ordered extraction rules
//!
//! Each rule inspects one tokenized line and either produces a match or
//! declines. [`RULES`] lists them in priority order; the extractor stops at
//! the first rule that matches, so only one category fires per line.
//!
//! | Priority | Rule                  | Shape                                   |
//! |----------|-----------------------|-----------------------------------------|
//! | 1        | go jump               | `GO NAME`, `GOIF NAME,COND`             |
//! | 2        | address constant load | `L R15,=V(NAME)` / `=A(NAME)`           |
//! | 3        | load link             | `L NAME` (single bare identifier)       |
//! | 4        | macro invocation      | opcode is a cataloged macro             |
//! | 5        | dynamic call          | `LINK EP=NAME`, `DELETE DE=NAME`        |
//! | 6        | static call           | `CALL NAME,...`                         |
//! | 7        | copy                  | `COPY NAME`                             |
//! | 8        | dispatch table        | `n,n,NAME,n` (heuristic, configurable)  |
//! | 9        | alias row             | `NAME EQU OTHER`                        |

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

use crate::config::flow_config::contains_ignore_case;
use crate::config::{FlowConfig, OpcodeConventions};
use crate::features::macro_catalog::{MacroCatalog, MacroDefinition};
use crate::features::parsing::TokenizedLine;
use crate::features::target_extraction::domain::{RuleKind, RuleMatch};

use super::symbol::{is_symbolic, strip_parens, symbolic_candidate};

lazy_static! {
    static ref ADDRESS_CONSTANT: Regex = Regex::new(r"(?i)^=[VA]\(\s*([^()\s]+)\s*\)$").unwrap();
}

/// Keywords naming the entry point of a dynamic call
const ENTRY_POINT_KEYWORDS: [&str; 2] = ["EP", "DE"];

/// Inputs shared by all rules for one block
pub struct RuleContext<'a> {
    pub config: &'a FlowConfig,
    pub catalog: &'a MacroCatalog,
    /// Name of the block being scanned (suppresses self-invocation)
    pub current_name: Option<&'a str>,
}

impl RuleContext<'_> {
    /// Heuristic fallbacks run only when the configuration enables them
    pub fn allows(&self, kind: RuleKind) -> bool {
        !kind.is_heuristic() || self.config.dispatch_table_heuristic
    }
}

/// One (kind, handler) pair
pub struct Rule {
    pub kind: RuleKind,
    pub apply: fn(&RuleContext<'_>, &TokenizedLine) -> Option<RuleMatch>,
}

/// Extraction rules in priority order
pub static RULES: [Rule; 9] = [
    Rule {
        kind: RuleKind::GoJump,
        apply: go_jump,
    },
    Rule {
        kind: RuleKind::AddressConstantLoad,
        apply: address_constant_load,
    },
    Rule {
        kind: RuleKind::LoadLink,
        apply: load_link,
    },
    Rule {
        kind: RuleKind::MacroInvocation,
        apply: macro_invocation,
    },
    Rule {
        kind: RuleKind::DynamicCall,
        apply: dynamic_call,
    },
    Rule {
        kind: RuleKind::StaticCall,
        apply: static_call,
    },
    Rule {
        kind: RuleKind::Copy,
        apply: copy_directive,
    },
    Rule {
        kind: RuleKind::DispatchTable,
        apply: dispatch_table,
    },
    Rule {
        kind: RuleKind::AliasRow,
        apply: alias_row,
    },
];

// ─────────────────────────────────────────────────────────────────────────
// Raw operand locators (shared with macro-body analysis)
// ─────────────────────────────────────────────────────────────────────────

/// First operand of a go-family jump
pub fn go_operand<'t>(ops: &OpcodeConventions, line: &'t TokenizedLine) -> Option<&'t str> {
    if ops.is_go(line.opcode_str()) {
        line.first_operand()
    } else {
        None
    }
}

/// Name inside `=V(...)` / `=A(...)` of an address-load instruction
pub fn address_constant_operand<'t>(
    ops: &OpcodeConventions,
    line: &'t TokenizedLine,
) -> Option<&'t str> {
    if !contains_ignore_case(&ops.address_load, line.opcode_str()) {
        return None;
    }
    line.operands.iter().find_map(|operand| {
        ADDRESS_CONSTANT
            .captures(operand.trim())
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    })
}

/// Sole operand of a load-as-link instruction
pub fn load_link_operand<'t>(ops: &OpcodeConventions, line: &'t TokenizedLine) -> Option<&'t str> {
    if contains_ignore_case(&ops.load_link, line.opcode_str()) && line.operands.len() == 1 {
        line.first_operand()
    } else {
        None
    }
}

/// Operand of any direct-jump form, unvalidated
pub fn direct_jump_operand<'t>(
    ops: &OpcodeConventions,
    line: &'t TokenizedLine,
) -> Option<&'t str> {
    go_operand(ops, line)
        .or_else(|| address_constant_operand(ops, line))
        .or_else(|| load_link_operand(ops, line))
}

// ─────────────────────────────────────────────────────────────────────────
// Rules
// ─────────────────────────────────────────────────────────────────────────

fn direct(candidate: Option<&str>) -> Option<RuleMatch> {
    candidate.and_then(symbolic_candidate).map(RuleMatch::Direct)
}

fn go_jump(ctx: &RuleContext<'_>, line: &TokenizedLine) -> Option<RuleMatch> {
    direct(go_operand(&ctx.config.opcodes, line).map(strip_parens))
}

fn address_constant_load(ctx: &RuleContext<'_>, line: &TokenizedLine) -> Option<RuleMatch> {
    direct(address_constant_operand(&ctx.config.opcodes, line))
}

fn load_link(ctx: &RuleContext<'_>, line: &TokenizedLine) -> Option<RuleMatch> {
    direct(load_link_operand(&ctx.config.opcodes, line))
}

/// Bind actual operands to formal parameters (keyword first, then position)
pub fn bind_parameters(definition: &MacroDefinition, line: &TokenizedLine) -> HashMap<String, String> {
    let mut bindings = HashMap::new();

    if let (Some(param), Some(label)) = (&definition.label_parameter, &line.label) {
        bindings.insert(param.clone(), label.clone());
    }

    let mut position = 0;
    for operand in &line.operands {
        let keyword = operand
            .split_once('=')
            .and_then(|(key, value)| {
                definition
                    .parameter_index(key.trim())
                    .map(|idx| (idx, value))
            });

        match keyword {
            Some((idx, value)) => {
                bindings.insert(definition.parameters[idx].clone(), value.trim().to_string());
            }
            None => {
                if let Some(param) = definition.parameters.get(position) {
                    bindings
                        .entry(param.clone())
                        .or_insert_with(|| operand.trim().to_string());
                }
                position += 1;
            }
        }
    }
    bindings
}

fn push_unique(targets: &mut Vec<String>, candidate: Option<String>) {
    if let Some(name) = candidate {
        if !targets.contains(&name) {
            targets.push(name);
        }
    }
}

fn macro_invocation(ctx: &RuleContext<'_>, line: &TokenizedLine) -> Option<RuleMatch> {
    let definition = ctx.catalog.get(line.opcode.as_deref()?)?;
    if ctx
        .current_name
        .is_some_and(|current| current.eq_ignore_ascii_case(&definition.name))
    {
        return None;
    }

    let mut targets = Vec::new();
    if !definition.call_parameters.is_empty() {
        let bindings = bind_parameters(definition, line);
        for param in &definition.call_parameters {
            let actual = bindings.get(param).map(|a| strip_parens(a));
            push_unique(&mut targets, actual.and_then(symbolic_candidate));
        }
    } else if ctx.config.macro_fallback_targets {
        for operand in &line.operands {
            let actual = match operand.split_once('=') {
                Some((key, value)) if is_symbolic(key) => value,
                _ => operand.as_str(),
            };
            push_unique(&mut targets, symbolic_candidate(strip_parens(actual)));
        }
    }

    Some(RuleMatch::Macro {
        name: definition.name.clone(),
        targets,
    })
}

fn dynamic_call(ctx: &RuleContext<'_>, line: &TokenizedLine) -> Option<RuleMatch> {
    if !contains_ignore_case(&ctx.config.opcodes.dynamic_call, line.opcode_str()) {
        return None;
    }
    line.operands.iter().find_map(|operand| {
        let (key, value) = operand.split_once('=')?;
        if ENTRY_POINT_KEYWORDS
            .iter()
            .any(|k| k.eq_ignore_ascii_case(key.trim()))
        {
            direct(Some(strip_parens(value)))
        } else {
            None
        }
    })
}

fn static_call(ctx: &RuleContext<'_>, line: &TokenizedLine) -> Option<RuleMatch> {
    if !contains_ignore_case(&ctx.config.opcodes.static_call, line.opcode_str()) {
        return None;
    }
    let first = line.first_operand()?.trim();
    if first.starts_with('(') {
        return None;
    }
    direct(Some(first))
}

fn copy_directive(ctx: &RuleContext<'_>, line: &TokenizedLine) -> Option<RuleMatch> {
    if contains_ignore_case(&ctx.config.opcodes.copy, line.opcode_str()) {
        direct(line.first_operand())
    } else {
        None
    }
}

fn is_numeric(token: &str) -> bool {
    let token = token.trim();
    !token.is_empty() && token.chars().all(|c| c.is_ascii_digit())
}

fn dispatch_table(_ctx: &RuleContext<'_>, line: &TokenizedLine) -> Option<RuleMatch> {
    match line.operands.as_slice() {
        [a, b, target, c] if is_numeric(a) && is_numeric(b) && is_numeric(c) => {
            direct(Some(target.as_str()))
        }
        _ => None,
    }
}

fn alias_row(ctx: &RuleContext<'_>, line: &TokenizedLine) -> Option<RuleMatch> {
    if !ctx.config.opcodes.is_equate(line.opcode_str()) || line.operands.len() != 1 {
        return None;
    }
    if !line.label.as_deref().is_some_and(is_symbolic) {
        return None;
    }
    direct(line.first_operand())
}
