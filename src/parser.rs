//! The stacklang parser.
//!
//! A hand-written recursive descent parser that resolves every identifier
//! to a declaration as it goes. C++-style ambiguities are handled by
//! speculation: a rule that may fail takes a checkpoint first, and the
//! failure path restores both the token cursor and the context stack
//! before the caller tries an alternative. Once a rule commits past an
//! ambiguity (the `(` of a call, the `)` of a cast), later failures
//! propagate.
//!
//! The parser is organized into submodules:
//!
//! - `item` — declarations and statements
//! - `types` — type expressions and template arguments
//! - `expr` — expressions and precedence normalization by rotation
//!
//! # Example
//!
//! ```rust
//! use stackc::Parser;
//!
//! let source = "int add(int x, int y) { return x + y; }";
//! let unit = Parser::new(source).unwrap().parse_translation_unit().unwrap();
//! assert_eq!(unit.root.decls.len(), 1);
//! ```

mod expr;
mod item;
mod types;


use crate::arena::Arena;
use crate::ast::{Decl, DeclId, Identifier, Namespace, ParsedUnit, Symbol};
use crate::context::ContextStack;
use crate::diagnostics::{Error, Result};
use crate::scanner::{assemble_tokens, scan, Token};
use crate::span::Location;
use string_interner::DefaultStringInterner;

/// A snapshot of the restorable parser state: the token cursor and the
/// whole context stack, provisional registrations included.
struct Checkpoint {
    pos: usize,
    context: ContextStack,
}

/// The stacklang parser. Create one per translation unit.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    context: ContextStack,
    decls: Arena<Decl>,
    interner: DefaultStringInterner,
}

impl Parser {
    /// Tokenize the source and set up a parser over it.
    pub fn new(source: &str) -> Result<Self> {
        let raw = scan(source)?;
        let tokens = assemble_tokens(raw);
        Ok(Self {
            tokens,
            pos: 0,
            context: ContextStack::new(),
            decls: Arena::new(),
            interner: DefaultStringInterner::new(),
        })
    }

    /// Parse the whole token stream into the anonymous root namespace.
    ///
    /// This is the single public parse operation; everything else hangs
    /// off the returned [`ParsedUnit`].
    #[must_use = "parsing has no effect if the result is not used"]
    pub fn parse_translation_unit(mut self) -> Result<ParsedUnit> {
        let name = self.interner.get_or_intern("");
        let mut root = Namespace {
            name,
            loc: Location::UNKNOWN,
            nested: Vec::new(),
            decls: Vec::new(),
        };

        self.parse_namespace_contents(&mut root)?;

        if !self.is_at_end() {
            return Err(Error::parse(
                format!("unexpected `{}` at top level", self.current_lexeme()),
                self.loc(),
            ));
        }

        Ok(ParsedUnit {
            root,
            decls: self.decls,
            interner: self.interner,
        })
    }

    /// Parse declarations and nested namespaces until the stream ends or
    /// a `}` closes the enclosing namespace.
    fn parse_namespace_contents(&mut self, ns: &mut Namespace) -> Result<()> {
        while !self.is_at_end() && !self.check("}") {
            if self.try_consume("namespace") {
                let (name, loc) = self.expect_ident()?;
                self.expect("{")?;

                let mut nested = Namespace {
                    name,
                    loc,
                    nested: Vec::new(),
                    decls: Vec::new(),
                };
                self.with_scope(|p| p.parse_namespace_contents(&mut nested))?;
                self.expect("}")?;
                ns.nested.push(nested);
                continue;
            }

            let decl = self.parse_decl()?;
            let name = self.decls[decl].name;
            let loc = self.decls[decl].loc;
            self.register(name, decl, loc)?;
            ns.decls.push(decl);
        }
        Ok(())
    }

    // ============================================================
    // Token cursor
    // ============================================================

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    /// The current lexeme, or a placeholder at end of input.
    fn current_lexeme(&self) -> &str {
        self.peek().map(|t| t.lexeme.as_str()).unwrap_or("<eof>")
    }

    /// Location of the current token (unknown at end of input).
    fn loc(&self) -> Location {
        self.peek().map(|t| t.loc).unwrap_or(Location::UNKNOWN)
    }

    /// Consume and return the current token; error when exhausted.
    fn advance(&mut self) -> Result<Token> {
        match self.tokens.get(self.pos) {
            Some(tok) => {
                let tok = tok.clone();
                self.pos += 1;
                Ok(tok)
            }
            None => Err(Error::parse(
                "unexpected end of input",
                Location::UNKNOWN,
            )),
        }
    }

    fn check(&self, lexeme: &str) -> bool {
        self.peek().is_some_and(|t| t.lexeme == lexeme)
    }

    fn try_consume(&mut self, lexeme: &str) -> bool {
        if self.check(lexeme) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, lexeme: &str) -> Result<Token> {
        if self.check(lexeme) {
            self.advance()
        } else {
            Err(Error::parse(
                format!(
                    "expected `{}`, found `{}`",
                    lexeme,
                    self.current_lexeme()
                ),
                self.loc(),
            ))
        }
    }

    // ============================================================
    // Speculation
    // ============================================================

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            pos: self.pos,
            context: self.context.clone(),
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.pos = checkpoint.pos;
        self.context = checkpoint.context;
    }

    /// Run a rule that is allowed to fail. On failure the cursor and the
    /// context stack are restored to the pre-attempt state; on success
    /// the rule's effects are committed.
    fn speculate<T>(&mut self, rule: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let checkpoint = self.checkpoint();
        match rule(self) {
            Ok(value) => Ok(value),
            Err(error) => {
                self.restore(checkpoint);
                Err(error)
            }
        }
    }

    /// Run a rule inside a fresh context frame, dropping the frame (and
    /// anything pushed above it) on every exit path.
    fn with_scope<T>(&mut self, rule: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let depth = self.context.depth();
        self.context.push();
        let result = rule(self);
        self.context.truncate(depth);
        result
    }

    // ============================================================
    // Identifiers and resolution
    // ============================================================

    /// Consume one token that must be a simple identifier.
    fn expect_ident(&mut self) -> Result<(Symbol, Location)> {
        let tok = self.advance()?;
        if !is_valid_id(&tok.lexeme) {
            return Err(Error::parse(
                format!("invalid identifier: `{}`", tok.lexeme),
                tok.loc,
            ));
        }
        Ok((self.interner.get_or_intern(&tok.lexeme), tok.loc))
    }

    /// Parse a possibly `::`-qualified identifier.
    fn parse_identifier(&mut self) -> Result<Identifier> {
        let global = self.try_consume("::");
        let mut parts = Vec::new();
        let mut loc;
        loop {
            let (symbol, tok_loc) = self.expect_ident()?;
            parts.push(symbol);
            loc = tok_loc;
            if !self.try_consume("::") {
                break;
            }
        }
        Ok(Identifier { parts, global, loc })
    }

    fn identifier_text(&self, ident: &Identifier) -> String {
        let mut out = String::new();
        if ident.global {
            out.push_str("::");
        }
        for (i, part) in ident.parts.iter().enumerate() {
            if i > 0 {
                out.push_str("::");
            }
            out.push_str(self.interner.resolve(*part).unwrap_or(""));
        }
        out
    }

    /// Resolve an identifier against the context stack.
    ///
    /// Only simple unqualified names resolve today; qualified and
    /// `::`-global lookup is declared but unsupported.
    fn resolve(&self, ident: &Identifier) -> Result<DeclId> {
        if !ident.is_simple() {
            return Err(Error::unsupported(
                format!(
                    "qualified identifier lookup is not supported yet: `{}`",
                    self.identifier_text(ident)
                ),
                ident.loc,
            ));
        }
        self.context.lookup_simple(ident.parts[0]).ok_or_else(|| {
            Error::resolve(
                format!(
                    "couldn't find identifier `{}`",
                    self.identifier_text(ident)
                ),
                ident.loc,
            )
        })
    }

    fn decl_name(&self, id: DeclId) -> &str {
        self.interner
            .resolve(self.decls[id].name)
            .unwrap_or("")
    }

    /// Bind a declaration in the current top frame.
    fn register(&mut self, name: Symbol, decl: DeclId, loc: Location) -> Result<()> {
        self.context.add(name, decl).map_err(|_| {
            Error::duplicate(
                format!(
                    "duplicate declaration of `{}`",
                    self.interner.resolve(name).unwrap_or("")
                ),
                loc,
            )
        })
    }

    /// Bind a declaration in the frame at `index` (for registering a
    /// function beneath its own parameter/body frame).
    fn register_in_frame(
        &mut self,
        index: usize,
        name: Symbol,
        decl: DeclId,
        loc: Location,
    ) -> Result<()> {
        self.context.add_in_frame(index, name, decl).map_err(|_| {
            Error::duplicate(
                format!(
                    "duplicate declaration of `{}`",
                    self.interner.resolve(name).unwrap_or("")
                ),
                loc,
            )
        })
    }
}

/// Whether a lexeme is a well-formed identifier: non-empty, not starting
/// with a digit, built from letters, digits, and underscores.
fn is_valid_id(lexeme: &str) -> bool {
    let bytes = lexeme.as_bytes();
    match bytes.first() {
        None => return false,
        Some(b) if b.is_ascii_digit() => return false,
        Some(_) => {}
    }
    bytes
        .iter()
        .all(|b| b.is_ascii_alphanumeric() || *b == b'_')
}

#[cfg(test)]
mod id_tests {
    use super::is_valid_id;

    #[test]
    fn test_is_valid_id() {
        assert!(is_valid_id("x"));
        assert!(is_valid_id("_foo42"));
        assert!(is_valid_id("CamelCase"));
        assert!(!is_valid_id(""));
        assert!(!is_valid_id("9bar"));
        assert!(!is_valid_id("a-b"));
        assert!(!is_valid_id("::"));
        assert!(!is_valid_id("+"));
    }
}
