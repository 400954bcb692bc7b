//! Source normalisation passes
//!
//! Pure functions over line lists, run before structuring and extraction:
//! column truncation, trailing-whitespace removal and continuation collapse.
//! Chunk stores keep the raw lines; only analysis sees normalised text.

use crate::config::FlowConfig;
use crate::shared::utils::text::{split_at_char, truncate_chars};

/// Continuation lines resume in column 16
const CONTINUATION_INDENT: usize = 15;

/// Column holding the continuation indicator (1-indexed)
const CONTINUATION_COLUMN: usize = 72;

/// A logical line and the 1-indexed physical line it started on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedLine {
    pub text: String,
    pub line_no: usize,
}

/// Physical line after truncation, with its continuation indicator
struct PhysicalLine {
    line: NormalizedLine,
    marked: bool,
}

/// Non-blank column 72 on a line of a fixed-column source
fn has_continuation_mark(raw: &str) -> bool {
    raw.chars()
        .nth(CONTINUATION_COLUMN - 1)
        .is_some_and(|c| !c.is_whitespace())
}

fn continuation_content(line: &str) -> Option<&str> {
    let (prefix, rest) = split_at_char(line, CONTINUATION_INDENT);
    if rest.is_empty() || !prefix.trim().is_empty() || rest.trim().is_empty() {
        return None;
    }
    Some(rest.trim())
}

/// The statement so far asks for another line
fn ends_open(text: &str) -> bool {
    !text.starts_with('*') && text.trim_end().ends_with(',')
}

fn collapse(lines: Vec<PhysicalLine>) -> Vec<NormalizedLine> {
    let mut result: Vec<NormalizedLine> = Vec::with_capacity(lines.len());
    let mut open = false;
    for PhysicalLine { line, marked } in lines {
        let joined = match (open, continuation_content(&line.text), result.last_mut()) {
            (true, Some(content), Some(previous)) => {
                let head = previous.text.trim_end();
                // Operand lists continue right after the trailing comma
                let separator = if head.ends_with(',') { "" } else { " " };
                previous.text = format!("{}{}{}", head, separator, content);
                true
            }
            _ => false,
        };
        if !joined {
            result.push(line);
        }
        open = marked || result.last().is_some_and(|l| ends_open(&l.text));
    }
    result
}

/// Run every configured pass, keeping each logical line's origin
///
/// With a column limit in force, a non-blank column 72 marks the next line as
/// a continuation and is cut from the text. A line indented to column 16 is
/// only joined when its predecessor is marked or ends in an operand comma.
pub fn normalize_with_origin(lines: &[String], config: &FlowConfig) -> Vec<NormalizedLine> {
    let physical: Vec<PhysicalLine> = lines
        .iter()
        .enumerate()
        .map(|(idx, raw)| {
            let marked = config.column_limit.is_some() && has_continuation_mark(raw);
            let text = match config.column_limit {
                Some(limit) if marked => truncate_chars(raw, limit.min(CONTINUATION_COLUMN - 1)),
                Some(limit) => truncate_chars(raw, limit),
                None => raw.as_str(),
            };
            PhysicalLine {
                line: NormalizedLine {
                    text: text.trim_end().to_string(),
                    line_no: idx + 1,
                },
                marked,
            }
        })
        .collect();

    if config.collapse_continuations {
        collapse(physical)
    } else {
        physical.into_iter().map(|p| p.line).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(src: &[&str]) -> Vec<String> {
        src.iter().map(|s| s.to_string()).collect()
    }

    fn texts(src: &[&str]) -> Vec<String> {
        normalize_with_origin(&lines(src), &FlowConfig::default())
            .into_iter()
            .map(|l| l.text)
            .collect()
    }

    #[test]
    fn test_truncate_drops_sequence_field() {
        let long = format!("{:<72}{}", "         GO    SUBA", "00010000");
        let out = texts(&[&long]);
        assert_eq!(out, vec!["         GO    SUBA"]);
    }

    #[test]
    fn test_comma_continuation_collapse() {
        let out = texts(&[
            "         CALL  PROG,",
            "               (PARM1,PARM2)",
            "         GO    NEXT",
        ]);
        assert_eq!(
            out,
            vec!["         CALL  PROG,(PARM1,PARM2)", "         GO    NEXT"]
        );
    }

    #[test]
    fn test_column_72_mark_joins_remarks() {
        let marked = format!("{:<71}X", "         MVC   A,B    first half");
        let out = texts(&[&marked, "               second half"]);
        assert_eq!(out, vec!["         MVC   A,B    first half second half"]);
    }

    #[test]
    fn test_deep_indent_without_mark_is_its_own_statement() {
        let out = texts(&[
            "         MVC   A,B",
            "               GO    SUBB",
            "         GO    SUBC",
        ]);
        assert_eq!(out.len(), 3);
        assert_eq!(out[1], "               GO    SUBB");
    }

    #[test]
    fn test_mark_is_ignored_without_column_limit() {
        let marked = format!("{:<71}X", "         MVC   A,B");
        let config = FlowConfig::default().column_limit(None);
        let out = normalize_with_origin(&lines(&[&marked, "               GO    SUBB"]), &config);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_comment_ending_in_comma_does_not_continue() {
        let out = texts(&["* see also,", "               GO    SUBB"]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_continuation_without_predecessor_is_kept() {
        assert_eq!(texts(&["                X"]), vec!["                X"]);
    }

    #[test]
    fn test_normalize_keeps_origin_line_numbers() {
        let src = lines(&[
            "* header   ",
            "         CALL  PROG,",
            "               (A)",
            "         GO    NEXT   ",
        ]);
        let out = normalize_with_origin(&src, &FlowConfig::default());
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].text, "* header");
        assert_eq!(out[1].line_no, 2);
        assert_eq!(out[2].line_no, 4);
        assert_eq!(out[2].text, "         GO    NEXT");
    }

    #[test]
    fn test_collapse_disabled() {
        let config = FlowConfig {
            collapse_continuations: false,
            ..FlowConfig::default()
        };
        let out = normalize_with_origin(&lines(&["         CALL  P,", "               (A)"]), &config);
        assert_eq!(out.len(), 2);
    }
}
