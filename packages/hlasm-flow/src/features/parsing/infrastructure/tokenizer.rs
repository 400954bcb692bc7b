//! Line tokenizer
//!
//! Splits one source line into `(label, opcode, operands, remarks)`.
//!
//! # Rules
//! - Blank lines yield an empty [`TokenizedLine`].
//! - Lines starting with `*` or `.*` are full-line comments.
//! - A line starting with whitespace has no label.
//! - The operand field ends at the first whitespace outside quotes and
//!   parentheses; anything after it is remarks.
//! - Operands split at depth-0 commas outside quotes, so `C'A,B'` and
//!   `D(X,B)` stay whole.
//!
//! - A quote right after a lone attribute letter (`L'FLD`, `K'&P`) is an
//!   attribute reference, not a literal.
//!
//! Unbalanced quotes or parentheses never fail: the rest of the line is
//! treated as still inside the open construct.

use crate::features::parsing::domain::{InstructionKind, ParsedInstruction, TokenizedLine};

use super::opcodes::classify_opcode;

/// Attribute letters that may precede a quote without opening a literal
const ATTRIBUTE_LETTERS: [char; 7] = ['L', 'K', 'T', 'N', 'D', 'I', 'S'];

fn is_symbol_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '@' | '#' | '$' | '_' | '&')
}

/// Delimiter state shared by the field and operand scanners
#[derive(Debug, Default)]
struct Nesting {
    quote: Option<char>,
    depth: usize,
    prev: Option<char>,
    prev2: Option<char>,
}

impl Nesting {
    /// Feed one character; returns true when it sits at top level
    fn step(&mut self, ch: char, next: Option<char>) -> bool {
        let top = self.advance(ch, next);
        self.prev2 = self.prev;
        self.prev = Some(ch);
        top
    }

    fn advance(&mut self, ch: char, next: Option<char>) -> bool {
        if let Some(q) = self.quote {
            if ch == q {
                self.quote = None;
            }
            return false;
        }
        match ch {
            '\'' if self.is_attribute_reference(next) => false,
            '\'' | '"' => {
                self.quote = Some(ch);
                false
            }
            '(' => {
                self.depth += 1;
                false
            }
            ')' => {
                self.depth = self.depth.saturating_sub(1);
                false
            }
            _ => self.depth == 0,
        }
    }

    /// `L'FLD`, `K'&P` and friends: a lone attribute letter, then a symbol
    fn is_attribute_reference(&self, next: Option<char>) -> bool {
        let letter = self
            .prev
            .is_some_and(|c| ATTRIBUTE_LETTERS.contains(&c.to_ascii_uppercase()));
        let term_start = !self.prev2.is_some_and(is_symbol_char);
        let symbol_follows =
            next.is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '&' | '@' | '#' | '$'));
        letter && term_start && symbol_follows
    }
}

/// Byte index where the operand field ends
pub fn find_operands_end(text: &str) -> usize {
    let mut nesting = Nesting::default();
    let mut chars = text.char_indices().peekable();
    while let Some((idx, ch)) = chars.next() {
        let next = chars.peek().map(|&(_, c)| c);
        if nesting.step(ch, next) && ch.is_whitespace() {
            return idx;
        }
    }
    text.len()
}

/// Split an operand field at top-level commas
///
/// Empty positional operands are kept (`A,,B` has three operands) so macro
/// parameter binding stays positional. Joining the result with `,` gives
/// back the input.
pub fn split_operands(operands: &str) -> Vec<String> {
    if operands.is_empty() {
        return Vec::new();
    }

    let mut result = Vec::new();
    let mut nesting = Nesting::default();
    let mut start = 0;
    let mut chars = operands.char_indices().peekable();
    while let Some((idx, ch)) = chars.next() {
        let next = chars.peek().map(|&(_, c)| c);
        if nesting.step(ch, next) && ch == ',' {
            result.push(operands[start..idx].to_string());
            start = idx + ch.len_utf8();
        }
    }
    result.push(operands[start..].to_string());
    result
}

/// Split `OPCODE OPERANDS REMARKS` (leading whitespace already removed)
fn split_fields(text: &str) -> (Option<String>, Vec<String>, Option<String>) {
    let text = text.trim();
    if text.is_empty() {
        return (None, Vec::new(), None);
    }

    let (opcode, rest) = match text.find(char::is_whitespace) {
        Some(idx) => (&text[..idx], text[idx..].trim_start()),
        None => (text, ""),
    };

    let end = find_operands_end(rest);
    let operands = split_operands(&rest[..end]);
    let remarks = rest[end..].trim();

    (
        Some(opcode.to_ascii_uppercase()),
        operands,
        (!remarks.is_empty()).then(|| remarks.to_string()),
    )
}

/// Tokenize one full source line
pub fn tokenize_line(line: &str) -> TokenizedLine {
    let line = line.trim_end();
    if line.trim().is_empty() {
        return TokenizedLine::default();
    }

    if let Some(body) = line.strip_prefix(".*").or_else(|| line.strip_prefix('*')) {
        return TokenizedLine {
            comment: Some(body.trim().to_string()),
            ..TokenizedLine::default()
        };
    }

    let starts_blank = line.chars().next().is_some_and(char::is_whitespace);
    let (label, rest) = if starts_blank {
        (None, line.trim_start())
    } else {
        match line.find(char::is_whitespace) {
            Some(idx) => (Some(line[..idx].to_string()), line[idx..].trim_start()),
            None => (Some(line.to_string()), ""),
        }
    };

    let (opcode, operands, comment) = split_fields(rest);
    TokenizedLine {
        label,
        opcode,
        operands,
        comment,
    }
}

/// Parse instruction text whose label zone was already taken off
pub fn parse_instruction(text: &str, label: Option<&str>) -> ParsedInstruction {
    let stripped = text.trim();
    let label = label.map(str::to_string);

    if stripped.is_empty() {
        return ParsedInstruction {
            label,
            opcode: None,
            operands: Vec::new(),
            comment: None,
            raw_text: text.to_string(),
            kind: InstructionKind::Empty,
        };
    }

    if let Some(body) = stripped.strip_prefix('*') {
        return ParsedInstruction {
            label,
            opcode: None,
            operands: Vec::new(),
            comment: Some(body.trim().to_string()),
            raw_text: text.to_string(),
            kind: InstructionKind::Comment,
        };
    }

    let (opcode, operands, comment) = split_fields(stripped);
    let kind = classify_opcode(opcode.as_deref());
    ParsedInstruction {
        label,
        opcode,
        operands,
        comment,
        raw_text: text.to_string(),
        kind,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labelled_line() {
        let t = tokenize_line("SUBA     IN    ,               entry point");
        assert_eq!(t.label.as_deref(), Some("SUBA"));
        assert_eq!(t.opcode.as_deref(), Some("IN"));
        assert_eq!(t.operands, vec!["".to_string(), "".to_string()]);
        assert_eq!(t.comment.as_deref(), Some("entry point"));
    }

    #[test]
    fn test_unlabelled_line() {
        let t = tokenize_line("         go    SUBA");
        assert_eq!(t.label, None);
        assert_eq!(t.opcode.as_deref(), Some("GO"));
        assert_eq!(t.operands, vec!["SUBA"]);
        assert_eq!(t.comment, None);
    }

    #[test]
    fn test_blank_and_comment_lines() {
        assert!(tokenize_line("      ").is_empty());
        let t = tokenize_line("* GO NOWHERE");
        assert!(t.is_comment());
        assert_eq!(t.comment.as_deref(), Some("GO NOWHERE"));
        assert!(tokenize_line(".* macro comment").is_comment());
    }

    #[test]
    fn test_quoted_literal_keeps_commas_and_spaces() {
        let t = tokenize_line("MSG      DC    C'A, B',X'FF'  remark");
        assert_eq!(t.operands, vec!["C'A, B'", "X'FF'"]);
        assert_eq!(t.comment.as_deref(), Some("remark"));
    }

    #[test]
    fn test_nested_parens() {
        let t = tokenize_line("         MVC   0(8,R1),=A(X,(Y,Z))");
        assert_eq!(t.operands, vec!["0(8,R1)", "=A(X,(Y,Z))"]);
    }

    #[test]
    fn test_unbalanced_quote_is_tolerated() {
        let t = tokenize_line("         DC    C'OPEN, STILL OPEN");
        assert_eq!(t.operands, vec!["C'OPEN, STILL OPEN"]);
        assert_eq!(t.comment, None);
    }

    #[test]
    fn test_attribute_reference_keeps_remarks_apart() {
        let t = tokenize_line("         MVC   0(L'FLD,R1),FLD   copy field");
        assert_eq!(t.operands, vec!["0(L'FLD,R1)", "FLD"]);
        assert_eq!(t.comment.as_deref(), Some("copy field"));

        let t = tokenize_line("         AIF   (K'&P EQ 0).SKIP  no operand");
        assert_eq!(t.operands, vec!["(K'&P EQ 0).SKIP"]);
        assert_eq!(t.comment.as_deref(), Some("no operand"));
    }

    #[test]
    fn test_typed_constants_still_quote() {
        let t = tokenize_line("         DC    D'1.5',CL8'SAVE AREA'  two");
        assert_eq!(t.operands, vec!["D'1.5'", "CL8'SAVE AREA'"]);
        assert_eq!(t.comment.as_deref(), Some("two"));
    }

    #[test]
    fn test_find_operands_end() {
        assert_eq!(find_operands_end("A,B rest"), 3);
        assert_eq!(find_operands_end("C' ' rest"), 4);
        assert_eq!(find_operands_end("(A B)"), 5);
    }

    #[test]
    fn test_split_keeps_empty_positionals() {
        assert_eq!(split_operands("A,,B"), vec!["A", "", "B"]);
        assert!(split_operands("").is_empty());
    }

    #[test]
    fn test_parse_instruction_classifies() {
        let p = parse_instruction("  BAL   R14,SUBX", Some("HERE"));
        assert_eq!(p.kind, InstructionKind::Call);
        assert_eq!(p.operands, vec!["R14", "SUBX"]);
        assert_eq!(p.label.as_deref(), Some("HERE"));

        assert_eq!(parse_instruction("* note", None).kind, InstructionKind::Comment);
        assert_eq!(parse_instruction("   ", None).kind, InstructionKind::Empty);
    }
}
