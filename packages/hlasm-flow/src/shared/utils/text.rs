//! Fixed-column text helpers
//!
//! Source lines are semantically fixed-column: columns 1-8 hold the label
//! field, column 9 onwards the operation, operands and remarks. All helpers
//! count characters, not bytes, so lossily-decoded input never panics.

/// Width of the label field (columns 1-8)
pub const LABEL_FIELD_WIDTH: usize = 8;

/// Byte offset of the `n`-th character (or the string length)
fn char_offset(line: &str, n: usize) -> usize {
    line.char_indices()
        .nth(n)
        .map(|(idx, _)| idx)
        .unwrap_or(line.len())
}

/// Label field (columns 1-8), right-padded with spaces to full width
pub fn label_zone(line: &str) -> String {
    let head = &line[..char_offset(line, LABEL_FIELD_WIDTH)];
    format!("{:<width$}", head, width = LABEL_FIELD_WIDTH)
}

/// Everything from column 9 onwards
pub fn operation_field(line: &str) -> &str {
    &line[char_offset(line, LABEL_FIELD_WIDTH)..]
}

/// First `limit` characters of a line
pub fn truncate_chars(line: &str, limit: usize) -> &str {
    &line[..char_offset(line, limit)]
}

/// Split at the `n`-th character
pub fn split_at_char(line: &str, n: usize) -> (&str, &str) {
    line.split_at(char_offset(line, n))
}

/// True when the line has nothing but whitespace
pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}
