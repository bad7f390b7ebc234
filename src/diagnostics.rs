//! Error kinds and diagnostic reporting.
//!
//! Every front-end failure is one of a closed set of [`Error`] kinds,
//! carrying a human-readable message and a (possibly unknown)
//! [`Location`]. Speculative parse rules catch errors and roll back;
//! everything else propagates them to the caller, and the top-level
//! `parse` surfaces the first unrecovered one.
//!
//! # Error Codes
//!
//! Diagnostic codes are organized by category:
//!
//! - **E0001-E0099**: lexical errors
//! - **E0100-E0199**: syntax errors
//! - **E0200-E0299**: name resolution errors
//! - **E0300-E0399**: declaration-kind and arity errors
//! - **E0400-E0499**: unsupported constructs

use crate::span::{LineIndex, Location};
use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Stable diagnostic codes for the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    /// A byte outside every scanner character class.
    UnrecognizedByte = 1,
    /// Unexpected token, exhausted input, or invalid identifier.
    SyntaxError = 100,
    /// Identifier not bound in any visible frame.
    UnresolvedName = 200,
    /// Two declarations with the same name in one frame.
    DuplicateName = 201,
    /// Declaration used where a different kind is required.
    WrongDeclKind = 300,
    /// Call argument count differs from the callee's parameter count.
    WrongArgumentCount = 301,
    /// Deliberately refused pending future work.
    Unsupported = 400,
}

impl ErrorCode {
    /// The formatted code string, e.g. `"E0100"`.
    pub fn as_str(&self) -> String {
        format!("E{:04}", *self as u16)
    }

    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::UnrecognizedByte => "unrecognized byte in source",
            ErrorCode::SyntaxError => "syntax error",
            ErrorCode::UnresolvedName => "unresolved name",
            ErrorCode::DuplicateName => "duplicate declaration",
            ErrorCode::WrongDeclKind => "wrong declaration kind",
            ErrorCode::WrongArgumentCount => "wrong number of call arguments",
            ErrorCode::Unsupported => "unsupported construct",
        }
    }

    /// A help message suggesting how to fix the error, when one exists.
    pub fn help(&self) -> Option<&'static str> {
        match self {
            ErrorCode::DuplicateName => {
                Some("names must be unique within a single scope frame")
            }
            ErrorCode::Unsupported => {
                Some("qualified names, prototype merging, and template argument defaults are not implemented yet")
            }
            _ => None,
        }
    }
}

/// A front-end failure.
///
/// The set is closed: everything the scanner, resolver, or parser can
/// report is one of these kinds.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Unclassifiable byte in the scanner.
    #[error("{message}")]
    Lex { message: String, loc: Location },

    /// Unexpected token, exhausted input, or invalid identifier.
    #[error("{message}")]
    Parse { message: String, loc: Location },

    /// Identifier not found in any visible frame.
    #[error("{message}")]
    Resolve { message: String, loc: Location },

    /// Declaration referenced where a different kind is demanded.
    #[error("{message}")]
    Kind { message: String, loc: Location },

    /// Function call argument count differs from the callee's parameters.
    #[error("{message}")]
    Arity { message: String, loc: Location },

    /// Two declarations with the same name in one frame.
    #[error("{message}")]
    DuplicateDecl { message: String, loc: Location },

    /// Deliberately refused pending future work.
    #[error("{message}")]
    Unsupported { message: String, loc: Location },
}

impl Error {
    pub fn lex(message: impl Into<String>, loc: Location) -> Self {
        Error::Lex {
            message: message.into(),
            loc,
        }
    }

    pub fn parse(message: impl Into<String>, loc: Location) -> Self {
        Error::Parse {
            message: message.into(),
            loc,
        }
    }

    pub fn resolve(message: impl Into<String>, loc: Location) -> Self {
        Error::Resolve {
            message: message.into(),
            loc,
        }
    }

    pub fn kind(message: impl Into<String>, loc: Location) -> Self {
        Error::Kind {
            message: message.into(),
            loc,
        }
    }

    pub fn arity(message: impl Into<String>, loc: Location) -> Self {
        Error::Arity {
            message: message.into(),
            loc,
        }
    }

    pub fn duplicate(message: impl Into<String>, loc: Location) -> Self {
        Error::DuplicateDecl {
            message: message.into(),
            loc,
        }
    }

    pub fn unsupported(message: impl Into<String>, loc: Location) -> Self {
        Error::Unsupported {
            message: message.into(),
            loc,
        }
    }

    /// The location the error points at (possibly unknown).
    pub fn loc(&self) -> Location {
        match self {
            Error::Lex { loc, .. }
            | Error::Parse { loc, .. }
            | Error::Resolve { loc, .. }
            | Error::Kind { loc, .. }
            | Error::Arity { loc, .. }
            | Error::DuplicateDecl { loc, .. }
            | Error::Unsupported { loc, .. } => *loc,
        }
    }

    /// The diagnostic code for this error kind.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::Lex { .. } => ErrorCode::UnrecognizedByte,
            Error::Parse { .. } => ErrorCode::SyntaxError,
            Error::Resolve { .. } => ErrorCode::UnresolvedName,
            Error::Kind { .. } => ErrorCode::WrongDeclKind,
            Error::Arity { .. } => ErrorCode::WrongArgumentCount,
            Error::DuplicateDecl { .. } => ErrorCode::DuplicateName,
            Error::Unsupported { .. } => ErrorCode::Unsupported,
        }
    }
}

/// Convenience alias used throughout the front end.
pub type Result<T> = std::result::Result<T, Error>;

/// A renderable diagnostic derived from an [`Error`].
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub message: String,
    pub loc: Location,
    pub help: Option<String>,
}

impl From<&Error> for Diagnostic {
    fn from(error: &Error) -> Self {
        let code = error.code();
        Diagnostic {
            code,
            message: error.to_string(),
            loc: error.loc(),
            help: code.help().map(str::to_string),
        }
    }
}

/// Renders diagnostics to stderr.
pub struct DiagnosticEmitter<'a> {
    filename: &'a str,
    source: &'a str,
    line_index: LineIndex,
}

impl<'a> DiagnosticEmitter<'a> {
    pub fn new(filename: &'a str, source: &'a str) -> Self {
        Self {
            filename,
            source,
            line_index: LineIndex::new(source),
        }
    }

    /// Emit a diagnostic to stderr.
    ///
    /// A source label is attached only when the location is known; most
    /// locations are unknown until line markers feed location updates.
    pub fn emit(&self, diagnostic: &Diagnostic) {
        let offset = self
            .line_index
            .offset(diagnostic.loc.lineno, diagnostic.loc.colno)
            .unwrap_or(0);

        let mut builder = Report::build(ReportKind::Error, self.filename, offset)
            .with_message(format!("[{}] {}", diagnostic.code.as_str(), diagnostic.message));

        if !diagnostic.loc.is_unknown() {
            builder = builder.with_label(
                Label::new((self.filename, offset..offset + 1))
                    .with_color(Color::Red)
                    .with_message(&diagnostic.message),
            );
        }

        if let Some(help) = &diagnostic.help {
            builder = builder.with_help(help);
        }

        builder
            .finish()
            .eprint((self.filename, Source::from(self.source)))
            .ok();
    }
}
