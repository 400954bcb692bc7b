//! Target extractor
//!
//! Produces the ordered, deduplicated call events of a block. Lines are
//! normalised first (column limit, continuation collapse), then each line is
//! offered to the rules in priority order.

use std::collections::HashSet;

use tracing::trace;

use crate::config::FlowConfig;
use crate::features::macro_catalog::MacroCatalog;
use crate::features::parsing::{normalize_with_origin, tokenize_line};
use crate::features::target_extraction::domain::{CallEvent, RuleMatch};
use crate::features::target_extraction::infrastructure::rules::{RuleContext, RULES};

pub struct TargetExtractor<'a> {
    config: &'a FlowConfig,
    catalog: &'a MacroCatalog,
}

impl<'a> TargetExtractor<'a> {
    pub fn new(config: &'a FlowConfig, catalog: &'a MacroCatalog) -> Self {
        Self { config, catalog }
    }

    /// Call events of `lines` in source order
    ///
    /// `current_name` is the block being scanned; a line invoking a macro of
    /// that same name produces no event.
    pub fn extract(&self, lines: &[String], current_name: Option<&str>) -> Vec<CallEvent> {
        let ctx = RuleContext {
            config: self.config,
            catalog: self.catalog,
            current_name,
        };

        let mut events = Vec::new();
        let mut seen = HashSet::new();

        for line in normalize_with_origin(lines, self.config) {
            let tokens = tokenize_line(&line.text);
            if tokens.opcode.is_none() {
                continue;
            }

            let Some((kind, found)) = RULES
                .iter()
                .filter(|rule| ctx.allows(rule.kind))
                .find_map(|rule| (rule.apply)(&ctx, &tokens).map(|m| (rule.kind, m)))
            else {
                continue;
            };

            let event = match found {
                RuleMatch::Direct(name) => CallEvent::Direct {
                    name,
                    rule: kind,
                    line_no: line.line_no,
                },
                RuleMatch::Macro { name, targets } => CallEvent::Macro {
                    name,
                    targets,
                    line_no: line.line_no,
                },
            };

            if seen.insert(event.dedup_key()) {
                trace!(rule = %kind, name = event.name(), line = line.line_no, "Call event");
                events.push(event);
            }
        }
        events
    }
}
