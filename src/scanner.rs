//! Lexical analysis for stacklang.
//!
//! The scanner walks the source a byte at a time and produces an ordered
//! sequence of raw token strings. There are three character classes:
//! whitespace, word characters (`[A-Za-z0-9_]`), and the special bytes
//! that appear in the operator and punctuation tables. Any other byte is
//! a lexical error.
//!
//! Words are accumulated maximal-munch. Runs of special bytes are split
//! by longest match: the scanner keeps a candidate set of all special
//! tokens consistent with the accumulated prefix, narrowing it with every
//! byte. When the set empties, the prefix is closed as a token and the
//! current byte is re-processed; when a single candidate of exactly the
//! accumulated length remains, it is closed immediately. So `x>>y` scans
//! to `>>` and `x >>= y` to `>>=`, while `>>>` splits into `>>` and `>`.
//!
//! A `#` anywhere starts a preprocessor line marker: the rest of the line
//! is emitted as one raw token, `#` included. Markers survive in the raw
//! stream and are dropped by [`assemble_tokens`] before parsing.
//!
//! # Example
//!
//! ```rust
//! use stackc::scanner::scan;
//!
//! let tokens = scan("int top(int x) { return x; }").unwrap();
//! assert_eq!(tokens[0], "int");
//! assert_eq!(tokens[2], "(");
//! ```

use crate::diagnostics::{Error, Result};
use crate::span::Location;
use crate::tokens::all_special_tokens;
use rustc_hash::FxHashSet;
use std::sync::OnceLock;

/// A raw token paired with its source location.
///
/// Locations are unknown until line markers are turned into location
/// updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub lexeme: String,
    pub loc: Location,
}

impl Token {
    pub fn new(lexeme: impl Into<String>, loc: Location) -> Self {
        Self {
            lexeme: lexeme.into(),
            loc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Null,
    Whitespace,
    Word,
    Special,
}

fn special_bytes() -> &'static FxHashSet<u8> {
    static BYTES: OnceLock<FxHashSet<u8>> = OnceLock::new();
    BYTES.get_or_init(|| {
        let mut ret = FxHashSet::default();
        for tok in all_special_tokens().keys() {
            ret.extend(tok.bytes());
        }
        ret
    })
}

fn classify(byte: u8) -> CharClass {
    if special_bytes().contains(&byte) {
        return CharClass::Special;
    }
    if matches!(byte, b' ' | b'\t' | b'\n' | b'\r') {
        return CharClass::Whitespace;
    }
    if byte.is_ascii_alphanumeric() || byte == b'_' {
        return CharClass::Word;
    }
    CharClass::Null
}

/// Tokenize source text into raw token strings.
///
/// Fails with a lexical error on the first byte that falls in no
/// character class.
pub fn scan(input: &str) -> Result<Vec<String>> {
    let bytes = input.as_bytes();

    let mut ret: Vec<String> = Vec::new();
    let mut current: Vec<u8> = Vec::new();
    let mut candidates: Vec<&'static str> = Vec::new();
    let mut last_class = CharClass::Null;
    let mut pos = 0usize;

    fn complete(ret: &mut Vec<String>, current: &mut Vec<u8>) {
        if !current.is_empty() {
            ret.push(String::from_utf8_lossy(current).into_owned());
            current.clear();
        }
    }

    while pos < bytes.len() {
        let next = bytes[pos];

        // Line marker mode: the rest of the line becomes one token,
        // without completing any token already in progress.
        if next == b'#' {
            let mut marker: Vec<u8> = Vec::new();
            while pos < bytes.len() {
                let b = bytes[pos];
                pos += 1;
                if b == b'\n' {
                    break;
                }
                marker.push(b);
            }
            ret.push(String::from_utf8_lossy(&marker).into_owned());
            continue;
        }

        let next_class = classify(next);
        pos += 1;

        if next_class != last_class {
            complete(&mut ret, &mut current);
        }
        last_class = next_class;

        match next_class {
            CharClass::Whitespace => continue,
            CharClass::Word => current.push(next),
            CharClass::Special => {
                if current.is_empty() {
                    candidates = all_special_tokens().keys().copied().collect();
                }
                let idx = current.len();
                candidates.retain(|t| t.as_bytes().get(idx) == Some(&next));

                if candidates.is_empty() {
                    // The accumulated prefix is the longest match; close it
                    // and re-process this byte against a fresh set.
                    complete(&mut ret, &mut current);
                    pos -= 1;
                    continue;
                }

                current.push(next);

                if candidates.len() == 1 && candidates[0].len() == current.len() {
                    complete(&mut ret, &mut current);
                }
            }
            CharClass::Null => {
                return Err(Error::lex(
                    format!(
                        "don't know what to do with byte `{}`",
                        (next as char).escape_default()
                    ),
                    Location::UNKNOWN,
                ));
            }
        }
    }

    complete(&mut ret, &mut current);

    Ok(ret)
}

/// Pair surviving raw tokens with locations, dropping line markers.
pub fn assemble_tokens(raw: Vec<String>) -> Vec<Token> {
    // TODO: parse line markers into location updates for the tokens that
    // follow them instead of discarding the information.
    let last_marker = Location::UNKNOWN;

    raw.into_iter()
        .filter(|t| !t.starts_with('#'))
        .map(|lexeme| Token::new(lexeme, last_marker))
        .collect()
}
