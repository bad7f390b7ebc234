//! Operator and punctuation tables.
//!
//! The infix table assigns every binary operator a precedence class
//! (1 = tightest binding). The scanner derives its special-character
//! alphabet from the union of all tables plus the reserved punctuation.
//! Tables are built once and cached process-wide.

use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::OnceLock;

/// Infix operators grouped by precedence class, tightest first.
///
/// `|` is listed twice (classes 8 and 10); successive insertion means the
/// last write wins, so its effective precedence is 10.
const INFIX_CLASSES: &[&[&str]] = &[
    &["*", "/", "%"],
    &["+", "-"],
    &["<<", ">>"],
    &["<", "<="],
    &[">", ">="],
    &["==", "!="],
    &["&"],
    &["|"],
    &["^"],
    &["|"],
    &["&&"],
    &["||"],
    &["?"],
    &["=", "+=", "-=", "*=", "/=", "%=", "&=", "^=", "|=", ">>=", "<<="],
    &[","],
];

/// Unary prefix operators grouped by precedence class.
const UNARY_CLASSES: &[&[&str]] = &[&["++", "--"], &["!", "~", "*", "&", "-", "+"]];

/// Unary postfix operators.
const UNARY_POSTFIX: &[&str] = &["++", "--", ".", "->"];

/// Reserved punctuation that is not an operator.
const PUNCTUATION: &[&str] = &["(", ")", "{", "}", ",", ";", ":", "::"];

fn build_with_precedence(classes: &'static [&'static [&'static str]]) -> FxHashMap<&'static str, i64> {
    let mut ret = FxHashMap::default();
    let mut next_prec = 1;
    for class in classes {
        for op in *class {
            ret.insert(*op, next_prec);
        }
        next_prec += 1;
    }
    ret
}

/// All infix operators with their precedence class.
pub fn infix_operators_with_precedence() -> &'static FxHashMap<&'static str, i64> {
    static TABLE: OnceLock<FxHashMap<&'static str, i64>> = OnceLock::new();
    TABLE.get_or_init(|| build_with_precedence(INFIX_CLASSES))
}

/// All unary prefix operators with their precedence class.
pub fn unary_operators_with_precedence() -> &'static FxHashMap<&'static str, i64> {
    static TABLE: OnceLock<FxHashMap<&'static str, i64>> = OnceLock::new();
    TABLE.get_or_init(|| build_with_precedence(UNARY_CLASSES))
}

/// All unary postfix operators.
pub fn unary_postfix_operators() -> &'static FxHashSet<&'static str> {
    static TABLE: OnceLock<FxHashSet<&'static str>> = OnceLock::new();
    TABLE.get_or_init(|| UNARY_POSTFIX.iter().copied().collect())
}

/// Precedence class of an infix operator, if it is one.
pub fn infix_precedence(op: &str) -> Option<i64> {
    infix_operators_with_precedence().get(op).copied()
}

/// Whether the lexeme is a unary prefix operator.
pub fn is_unary_prefix(op: &str) -> bool {
    unary_operators_with_precedence().contains_key(op)
}

/// Whether the lexeme is a unary postfix operator.
pub fn is_unary_postfix(op: &str) -> bool {
    unary_postfix_operators().contains(op)
}

/// The canonical `&'static str` for a recognized operator or punctuation
/// lexeme. The parser stores these in AST nodes so operator identity is a
/// pointer-free string comparison against table entries.
pub fn canonical(lexeme: &str) -> Option<&'static str> {
    all_special_tokens().get(lexeme).copied()
}

/// Every special (non-word) token: punctuation plus all operators.
///
/// Stored as a map from the token to itself so lookups can hand back the
/// `'static` spelling.
pub fn all_special_tokens() -> &'static FxHashMap<&'static str, &'static str> {
    static TABLE: OnceLock<FxHashMap<&'static str, &'static str>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut ret = FxHashMap::default();
        for tok in PUNCTUATION {
            ret.insert(*tok, *tok);
        }
        for class in INFIX_CLASSES.iter().chain(UNARY_CLASSES.iter()) {
            for tok in *class {
                ret.insert(*tok, *tok);
            }
        }
        for tok in UNARY_POSTFIX {
            ret.insert(*tok, *tok);
        }
        ret
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence_classes() {
        assert_eq!(infix_precedence("*"), Some(1));
        assert_eq!(infix_precedence("+"), Some(2));
        assert_eq!(infix_precedence(">>"), Some(3));
        assert_eq!(infix_precedence("<="), Some(4));
        assert_eq!(infix_precedence(">"), Some(5));
        assert_eq!(infix_precedence("=="), Some(6));
        assert_eq!(infix_precedence("&&"), Some(11));
        assert_eq!(infix_precedence("="), Some(14));
        assert_eq!(infix_precedence(","), Some(15));
        assert_eq!(infix_precedence("("), None);
    }

    #[test]
    fn test_duplicate_bitor_entry_last_write_wins() {
        assert_eq!(infix_precedence("|"), Some(10));
    }

    #[test]
    fn test_unary_sets() {
        for op in ["++", "--", "!", "~", "*", "&", "-", "+"] {
            assert!(is_unary_prefix(op), "{op} should be unary prefix");
        }
        for op in ["++", "--", ".", "->"] {
            assert!(is_unary_postfix(op), "{op} should be unary postfix");
        }
        assert!(!is_unary_postfix("!"));
        assert!(!is_unary_prefix("."));
    }

    #[test]
    fn test_special_tokens_cover_punctuation_and_operators() {
        let special = all_special_tokens();
        for tok in ["(", ")", "{", "}", ",", ";", ":", "::", "->", ">>=", "||"] {
            assert!(special.contains_key(tok), "{tok} missing from special set");
        }
        assert!(!special.contains_key("@"));
        assert!(!special.contains_key("int"));
    }

    #[test]
    fn test_canonical_returns_table_spelling() {
        assert_eq!(canonical("<<"), Some("<<"));
        assert_eq!(canonical("abc"), None);
    }
}
