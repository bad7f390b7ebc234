//! Source location tracking.
//!
//! Every token and every AST node carries a [`Location`]. Locations are
//! file/line/column triples; a component of `-1` means "unknown". Until
//! preprocessor line markers are parsed into location updates, every
//! location produced by the token assembler is [`Location::UNKNOWN`].

use serde::{Deserialize, Serialize};

/// A source position: file index, 1-based line, 1-based column.
///
/// All fields `-1` means the position is unknown. Locations are attached
/// at token-assembly time and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub fileno: i64,
    pub lineno: i64,
    pub colno: i64,
}

impl Location {
    /// The unknown location.
    pub const UNKNOWN: Location = Location {
        fileno: -1,
        lineno: -1,
        colno: -1,
    };

    pub fn new(fileno: i64, lineno: i64, colno: i64) -> Self {
        Self {
            fileno,
            lineno,
            colno,
        }
    }

    /// Whether every component is unknown.
    pub fn is_unknown(&self) -> bool {
        self.fileno < 0 && self.lineno < 0 && self.colno < 0
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_unknown() {
            write!(f, "<unknown>")
        } else {
            write!(f, "{}:{}:{}", self.fileno, self.lineno, self.colno)
        }
    }
}

/// A precomputed index of line start offsets for line/column conversion.
///
/// The diagnostic emitter uses this to turn a known line/column back into
/// a byte offset for report labels.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offsets where each line starts. `line_starts[0] == 0`.
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Build a line index from source text. O(n) one-time cost.
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (offset, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(offset + 1);
            }
        }
        Self { line_starts }
    }

    /// Byte offset of a 1-based line/column pair, if the line exists.
    pub fn offset(&self, lineno: i64, colno: i64) -> Option<usize> {
        if lineno < 1 || colno < 1 {
            return None;
        }
        let start = *self.line_starts.get(lineno as usize - 1)?;
        Some(start + colno as usize - 1)
    }

    /// 1-based line and column for a byte offset.
    pub fn line_col(&self, offset: usize) -> (i64, i64) {
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        let line = line_idx as i64 + 1;
        let col = (offset - self.line_starts[line_idx]) as i64 + 1;
        (line, col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_location() {
        assert!(Location::UNKNOWN.is_unknown());
        assert!(!Location::new(0, 1, 1).is_unknown());
        assert_eq!(Location::UNKNOWN.to_string(), "<unknown>");
    }

    #[test]
    fn test_line_index_round_trip() {
        let source = "int top() {\n\treturn 0;\n}\n";
        let index = LineIndex::new(source);
        assert_eq!(index.line_col(0), (1, 1));
        assert_eq!(index.line_col(12), (2, 1));
        assert_eq!(index.offset(2, 1), Some(12));
        assert_eq!(index.offset(1, 5), Some(4));
        assert_eq!(index.offset(-1, -1), None);
    }
}
