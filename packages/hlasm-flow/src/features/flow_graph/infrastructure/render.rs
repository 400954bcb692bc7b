//! Flow result renderers
//!
//! | Format  | Shape                                                     |
//! |---------|-----------------------------------------------------------|
//! | JSON    | `{entry, flow, chunk_line_counts, kinds, tags, macros, aliases, missing}` |
//! | DOT     | `digraph FlowGraph`, node shape/colour by chunk kind       |
//! | Mermaid | `flowchart TD` with one `classDef` per kind family         |

use serde_json::{json, Map, Value};
use std::fmt::{self, Write};
use std::str::FromStr;

use crate::features::block_resolver::ChunkKind;
use crate::features::flow_graph::domain::FlowResult;

/// Graph output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Dot,
    Json,
    Mermaid,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Dot => "dot",
            OutputFormat::Json => "json",
            OutputFormat::Mermaid => "mermaid",
        }
    }

    /// File extension used for `cfg.<ext>`
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Dot => "dot",
            OutputFormat::Json => "json",
            OutputFormat::Mermaid => "mmd",
        }
    }

    pub fn render(&self, result: &FlowResult) -> String {
        match self {
            OutputFormat::Dot => to_dot(result),
            OutputFormat::Json => to_json_string(result),
            OutputFormat::Mermaid => to_mermaid(result),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dot" => Ok(OutputFormat::Dot),
            "json" => Ok(OutputFormat::Json),
            "mermaid" | "mmd" => Ok(OutputFormat::Mermaid),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// JSON
// ─────────────────────────────────────────────────────────────────────────────

/// Summary document of a run
pub fn to_json(result: &FlowResult) -> Value {
    let mut line_counts = Map::new();
    let mut kinds = Map::new();
    let mut tags = Map::new();
    for chunk in result.chunks.iter() {
        line_counts.insert(chunk.name.clone(), json!(chunk.line_count()));
        kinds.insert(chunk.name.clone(), json!(chunk.kind.as_str()));
        tags.insert(chunk.name.clone(), json!(chunk.tags));
    }

    let mut macros = Map::new();
    for def in result.catalog.iter() {
        macros.insert(
            def.name.clone(),
            json!({
                "source_file": def.source_file.display().to_string(),
                "parameters": def.parameters,
                "call_parameters": def.call_parameters,
                "line_count": def.line_count(),
            }),
        );
    }

    json!({
        "entry": result.entry,
        "flow": result.flow,
        "chunk_line_counts": line_counts,
        "kinds": kinds,
        "tags": tags,
        "macros": macros,
        "aliases": result.aliases,
        "missing": result.missing,
    })
}

pub fn to_json_string(result: &FlowResult) -> String {
    serde_json::to_string_pretty(&to_json(result)).unwrap_or_else(|_| "{}".to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// DOT
// ─────────────────────────────────────────────────────────────────────────────

fn dot_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn dot_style(result: &FlowResult, name: &str) -> &'static str {
    if name == result.entry {
        return "shape=doubleoctagon, style=filled, fillcolor=blue, fontcolor=white";
    }
    if result.is_missing(name) {
        return "shape=box, style=dashed, color=red, fontcolor=red";
    }
    match result.kind_of(name) {
        Some(ChunkKind::Macro) => "shape=hexagon, style=filled, fillcolor=plum",
        Some(ChunkKind::Copybook) => "shape=note, style=filled, fillcolor=khaki",
        Some(ChunkKind::ControlSection) => "shape=box3d, style=filled, fillcolor=palegreen",
        Some(ChunkKind::AnchorTable) => "shape=tab, style=filled, fillcolor=wheat",
        Some(ChunkKind::Program) => "shape=component, style=filled, fillcolor=lightblue",
        _ => "shape=box, style=filled, fillcolor=lightblue",
    }
}

/// Graphviz rendering
pub fn to_dot(result: &FlowResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "digraph FlowGraph {{");
    let _ = writeln!(out, "    rankdir=TB;");
    let _ = writeln!(out, "    node [fontname=\"Courier\"];");

    for name in result.flow.all_names() {
        let _ = writeln!(
            out,
            "    \"{}\" [{}];",
            dot_escape(name),
            dot_style(result, name)
        );
    }

    for (parent, child) in result.flow.edges() {
        let style = if result.is_missing(child) {
            " [style=dashed]"
        } else {
            ""
        };
        let _ = writeln!(
            out,
            "    \"{}\" -> \"{}\"{};",
            dot_escape(parent),
            dot_escape(child),
            style
        );
    }

    out.push_str("}\n");
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Mermaid
// ─────────────────────────────────────────────────────────────────────────────

fn mermaid_id(name: &str) -> String {
    let id: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    format!("n_{}", id)
}

fn mermaid_class(result: &FlowResult, name: &str) -> &'static str {
    if name == result.entry {
        return "entry";
    }
    if result.is_missing(name) {
        return "missing";
    }
    match result.kind_of(name) {
        Some(ChunkKind::Macro) => "macro",
        Some(ChunkKind::Copybook) => "copybook",
        Some(ChunkKind::ControlSection) => "section",
        _ => "present",
    }
}

/// Mermaid flowchart rendering
pub fn to_mermaid(result: &FlowResult) -> String {
    let mut out = String::from("flowchart TD\n");

    for name in result.flow.all_names() {
        let _ = writeln!(
            out,
            "    {}[\"{}\"]:::{}",
            mermaid_id(name),
            name.replace('"', "#quot;"),
            mermaid_class(result, name)
        );
    }

    for (parent, child) in result.flow.edges() {
        let arrow = if result.is_missing(child) { "-.->" } else { "-->" };
        let _ = writeln!(out, "    {} {} {}", mermaid_id(parent), arrow, mermaid_id(child));
    }

    out.push_str("    classDef entry fill:#1f4e9c,color:#fff\n");
    out.push_str("    classDef present fill:#add8e6\n");
    out.push_str("    classDef missing stroke:#d00,stroke-dasharray:4 2,color:#d00\n");
    out.push_str("    classDef macro fill:#dda0dd\n");
    out.push_str("    classDef copybook fill:#f0e68c\n");
    out.push_str("    classDef section fill:#98fb98\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::alias::AliasTable;
    use crate::features::flow_graph::domain::{Chunk, ChunkStore, FlowMap};
    use crate::features::macro_catalog::MacroCatalog;
    use std::collections::BTreeSet;

    fn sample() -> FlowResult {
        let mut chunks = ChunkStore::default();
        for (name, kind) in [
            ("main", ChunkKind::Entry),
            ("SUBA", ChunkKind::Subroutine),
            ("CHECK", ChunkKind::Macro),
        ] {
            chunks.insert(Chunk {
                name: name.to_string(),
                lines: vec![String::new(); 2],
                kind,
                tags: BTreeSet::from([kind.as_str().to_string()]),
                source_file: "t.asm".to_string(),
                start_line: 1,
            });
        }
        let mut flow = FlowMap::default();
        flow.link("main", "SUBA");
        flow.link("main", "CHECK");
        flow.link("SUBA", "GONE-1");
        flow.ensure("CHECK");
        FlowResult {
            entry: "main".to_string(),
            chunks,
            flow,
            missing: vec!["GONE-1".to_string()],
            catalog: MacroCatalog::new(),
            aliases: AliasTable::new(),
        }
    }

    #[test]
    fn test_json_keys_and_order() {
        let json = to_json(&sample());
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(
            keys,
            ["entry", "flow", "chunk_line_counts", "kinds", "tags", "macros", "aliases", "missing"]
        );
        assert_eq!(json["flow"]["main"], json!(["SUBA", "CHECK"]));
        assert_eq!(json["chunk_line_counts"]["SUBA"], 2);
        assert_eq!(json["kinds"]["CHECK"], "macro");
        assert_eq!(json["missing"], json!(["GONE-1"]));
    }

    #[test]
    fn test_dot_styles() {
        let dot = to_dot(&sample());
        assert!(dot.starts_with("digraph FlowGraph {"));
        assert!(dot.contains("\"main\" [shape=doubleoctagon"));
        assert!(dot.contains("\"CHECK\" [shape=hexagon"));
        assert!(dot.contains("\"GONE-1\" [shape=box, style=dashed, color=red"));
        assert!(dot.contains("\"SUBA\" -> \"GONE-1\" [style=dashed];"));
        assert!(dot.contains("\"main\" -> \"SUBA\";"));
    }

    #[test]
    fn test_mermaid_sanitises_ids() {
        let mmd = to_mermaid(&sample());
        assert!(mmd.starts_with("flowchart TD\n"));
        assert!(mmd.contains("n_GONE_1[\"GONE-1\"]:::missing"));
        assert!(mmd.contains("n_SUBA -.-> n_GONE_1"));
        assert!(mmd.contains("classDef copybook"));
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::Mermaid.extension(), "mmd");
        assert!("svg".parse::<OutputFormat>().is_err());
    }
}
