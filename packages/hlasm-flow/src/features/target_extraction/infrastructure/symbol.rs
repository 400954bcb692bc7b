//! Symbol validity checks

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SYMBOL: Regex = Regex::new(r"^[A-Za-z@#$][A-Za-z0-9@#$_]{0,62}$").unwrap();
    static ref REGISTER: Regex = Regex::new(r"(?i)^R(1[0-5]|[0-9])$").unwrap();
}

/// True for register aliases `R0`..`R15`
pub fn is_register(token: &str) -> bool {
    REGISTER.is_match(token.trim())
}

/// True when `token` can name a callable unit
///
/// Rejects literals, numbers, expressions, parenthesised forms and register
/// aliases.
pub fn is_symbolic(token: &str) -> bool {
    let token = token.trim();
    SYMBOL.is_match(token) && !is_register(token)
}

/// Remove one pair of enclosing parentheses: `(PGM)` becomes `PGM`
pub fn strip_parens(token: &str) -> &str {
    let t = token.trim();
    t.strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
        .map(str::trim)
        .unwrap_or(t)
}

/// Uppercased candidate if it is symbolic
pub fn symbolic_candidate(token: &str) -> Option<String> {
    let token = token.trim();
    is_symbolic(token).then(|| token.to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbols_accepted() {
        for ok in ["SUBA", "@ERR", "#TAB1", "$X_Y", "r16", "PROC_A"] {
            assert!(is_symbolic(ok), "{} should be symbolic", ok);
        }
    }

    #[test]
    fn test_non_symbols_rejected() {
        for bad in ["R0", "r15", "R9", "15", "=V(X)", "C'AB'", "(R1)", "A+4", "", "*", "LEN-1"] {
            assert!(!is_symbolic(bad), "{} should be rejected", bad);
        }
    }

    #[test]
    fn test_strip_parens() {
        assert_eq!(strip_parens("(PGM)"), "PGM");
        assert_eq!(strip_parens(" ( PGM ) "), "PGM");
        assert_eq!(strip_parens("PGM"), "PGM");
        assert_eq!(strip_parens("(A"), "(A");
    }
}
