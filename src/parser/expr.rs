//! Expression parsing.
//!
//! `parse_expr` is deliberately right-recursive: it builds a leaf,
//! optionally folds one unary postfix, then folds at most one infix
//! operator whose right-hand side is a recursive `parse_expr`. Operator
//! precedence is repaired locally at construction time: [`binary_op`]
//! rotates a fresh node over its right child when the new operator binds
//! tighter, and [`adjust_unary_precedence`] pushes a fresh unary or cast
//! node down to the leaf side of a binary sub-expression. Unary
//! operators bind tighter than every binary operator in this language.
//!
//! The `disallow` set threads through recursive calls so that `,` and
//! `>` can stop being infix operators inside a single template argument.

use super::Parser;
use crate::ast::{
    BinaryOp, CastExpr, CastKind, CtorCall, DeclKind, DeclRef, Expr, ExprKind, FuncCall,
    MemberExpr, UnaryOp, Value,
};
use crate::diagnostics::{Error, Result};
use crate::span::Location;
use crate::tokens;

/// Precedence class of an infix operator; tighter operators have smaller
/// numbers. Non-operators compare looser than everything.
fn precedence(op: &str) -> i64 {
    tokens::infix_precedence(op).unwrap_or(i64::MAX)
}

/// Build a binary node, rotating so precedence is respected.
///
/// When the right child is a binary node with a looser operator, the
/// fresh operator must bind below it: the result is rooted at the right
/// child's operator, with the fresh operator folded into its left
/// subtree. The fold re-enters this constructor, so a chain of rotations
/// settles the node at the correct depth.
pub(super) fn binary_op(op: &'static str, left: Expr, right: Expr, loc: Location) -> Expr {
    let Expr {
        kind: right_kind,
        loc: right_loc,
    } = right;

    match right_kind {
        ExprKind::Binary(r) if precedence(op) < precedence(r.op) => {
            let inner = binary_op(op, left, *r.left, loc);
            Expr {
                kind: ExprKind::Binary(BinaryOp {
                    op: r.op,
                    left: Box::new(inner),
                    right: r.right,
                }),
                loc: right_loc,
            }
        }
        right_kind => Expr {
            kind: ExprKind::Binary(BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(Expr {
                    kind: right_kind,
                    loc: right_loc,
                }),
            }),
            loc,
        },
    }
}

/// Hoist a freshly built unary or cast node above a binary
/// sub-expression: `unary (x op y)` becomes `(unary x) op y`, repeated
/// until the unary lands on a non-binary operand.
pub(super) fn adjust_unary_precedence(expr: Expr) -> Expr {
    let Expr { kind, loc } = expr;
    match kind {
        ExprKind::Unary(UnaryOp { op, postfix, sub }) => match *sub {
            Expr {
                kind: ExprKind::Binary(b),
                loc: sub_loc,
            } => {
                let unary = adjust_unary_precedence(Expr {
                    kind: ExprKind::Unary(UnaryOp {
                        op,
                        postfix,
                        sub: b.left,
                    }),
                    loc,
                });
                Expr {
                    kind: ExprKind::Binary(BinaryOp {
                        op: b.op,
                        left: Box::new(unary),
                        right: b.right,
                    }),
                    loc: sub_loc,
                }
            }
            sub => Expr {
                kind: ExprKind::Unary(UnaryOp {
                    op,
                    postfix,
                    sub: Box::new(sub),
                }),
                loc,
            },
        },
        ExprKind::Cast(CastExpr {
            kind: cast_kind,
            ty,
            sub,
        }) => match *sub {
            Expr {
                kind: ExprKind::Binary(b),
                loc: sub_loc,
            } => {
                let cast = adjust_unary_precedence(Expr {
                    kind: ExprKind::Cast(CastExpr {
                        kind: cast_kind,
                        ty,
                        sub: b.left,
                    }),
                    loc,
                });
                Expr {
                    kind: ExprKind::Binary(BinaryOp {
                        op: b.op,
                        left: Box::new(cast),
                        right: b.right,
                    }),
                    loc: sub_loc,
                }
            }
            sub => Expr {
                kind: ExprKind::Cast(CastExpr {
                    kind: cast_kind,
                    ty,
                    sub: Box::new(sub),
                }),
                loc,
            },
        },
        kind => Expr { kind, loc },
    }
}

impl Parser {
    /// Parse an expression. Lexemes in `disallow` are not treated as
    /// infix operators at this level or below.
    pub(super) fn parse_expr(&mut self, disallow: &[&str]) -> Result<Expr> {
        let leaf = self.parse_expr_leaf(disallow)?;
        let leaf = self.fold_postfix(leaf)?;
        self.fold_infix(leaf, disallow)
    }

    /// Try the leaf alternatives in order; the first that succeeds wins.
    fn parse_expr_leaf(&mut self, disallow: &[&str]) -> Result<Expr> {
        // Integer literal.
        if let Some(tok) = self.peek() {
            if let Ok(value) = tok.lexeme.parse::<i64>() {
                let loc = tok.loc;
                self.advance()?;
                return Ok(Expr {
                    kind: ExprKind::Literal(Value::Int(value)),
                    loc,
                });
            }
        }

        // Parenthesized: a C-style cast if a type parses, otherwise a
        // grouping. Once the type has parsed, the cast is committed.
        if self.check("(") {
            let loc = self.loc();
            self.advance()?;

            if let Ok(ty) = self.speculate(|p| p.parse_type()) {
                self.expect(")")?;
                let sub = self.parse_expr(disallow)?;
                return Ok(adjust_unary_precedence(Expr {
                    kind: ExprKind::Cast(CastExpr {
                        kind: CastKind::CStyle,
                        ty,
                        sub: Box::new(sub),
                    }),
                    loc,
                }));
            }

            let inner = self.parse_expr(disallow)?;
            self.expect(")")?;
            return Ok(Expr {
                kind: ExprKind::Paren(Box::new(inner)),
                loc,
            });
        }

        // Constructor call / functional cast: a type followed by `(`.
        // The speculation covers the type and the `(`; the argument list
        // is committed.
        let loc = self.loc();
        if let Ok(ty) = self.speculate(|p| {
            let ty = p.parse_type()?;
            p.expect("(")?;
            Ok(ty)
        }) {
            let args = self.parse_arg_list(")")?;
            return Ok(Expr {
                kind: ExprKind::Ctor(CtorCall { ty, args }),
                loc,
            });
        }

        // Identifier reference. Resolution and template arguments are
        // committed once an identifier has parsed.
        if let Ok(ident) = self.speculate(|p| p.parse_identifier()) {
            let target = self.resolve(&ident)?;
            let template_params = self.decls[target].template_params().to_vec();
            let template_args = if template_params.is_empty() {
                Vec::new()
            } else {
                self.parse_template_args(&template_params)?
            };
            let decl_ref = Expr {
                kind: ExprKind::DeclRef(DeclRef {
                    decl: target,
                    template_args,
                }),
                loc: ident.loc,
            };
            if self.check("(") {
                return self.parse_func_call(decl_ref);
            }
            return Ok(decl_ref);
        }

        // Prefix unary.
        if let Some(tok) = self.peek() {
            if tokens::is_unary_prefix(&tok.lexeme) {
                let op = tokens::canonical(&tok.lexeme).unwrap_or("");
                let loc = tok.loc;
                self.advance()?;
                let sub = self.parse_expr(disallow)?;
                return Ok(adjust_unary_precedence(Expr {
                    kind: ExprKind::Unary(UnaryOp {
                        op,
                        postfix: false,
                        sub: Box::new(sub),
                    }),
                    loc,
                }));
            }
        }

        Err(Error::parse(
            format!(
                "unable to parse expression starting at `{}`",
                self.current_lexeme()
            ),
            self.loc(),
        ))
    }

    /// Fold one unary postfix operator, if present: member access for
    /// `.` and `->`, otherwise a postfix unary node.
    fn fold_postfix(&mut self, leaf: Expr) -> Result<Expr> {
        let (lexeme, loc) = match self.peek() {
            Some(tok) if tokens::is_unary_postfix(&tok.lexeme) => (tok.lexeme.clone(), tok.loc),
            _ => return Ok(leaf),
        };

        match lexeme.as_str() {
            "." | "->" => {
                let via_pointer = lexeme == "->";
                self.advance()?;
                let (member, _) = self.expect_ident()?;
                Ok(Expr {
                    kind: ExprKind::Member(MemberExpr {
                        base: Box::new(leaf),
                        member,
                        via_pointer,
                    }),
                    loc,
                })
            }
            other => {
                let op = tokens::canonical(other).unwrap_or("");
                self.advance()?;
                Ok(Expr {
                    kind: ExprKind::Unary(UnaryOp {
                        op,
                        postfix: true,
                        sub: Box::new(leaf),
                    }),
                    loc,
                })
            }
        }
    }

    /// Fold one infix operator, delegating the right-hand side to a
    /// recursive `parse_expr` and normalizing precedence in the
    /// constructed node.
    fn fold_infix(&mut self, left: Expr, disallow: &[&str]) -> Result<Expr> {
        let Some(tok) = self.peek() else {
            return Ok(left);
        };
        if disallow.contains(&tok.lexeme.as_str()) {
            return Ok(left);
        }
        let Some(op) = tokens::canonical(&tok.lexeme) else {
            return Ok(left);
        };
        if tokens::infix_precedence(op).is_none() {
            return Ok(left);
        }
        let loc = tok.loc;
        self.advance()?;
        let right = self.parse_expr(disallow)?;
        Ok(binary_op(op, left, right, loc))
    }

    /// Parse a function call off an already-parsed callee reference.
    ///
    /// Fails fast when the callee is not a function; argument count is
    /// checked against the callee's parameters at the call site.
    fn parse_func_call(&mut self, callee: Expr) -> Result<Expr> {
        let loc = self.loc();
        let ExprKind::DeclRef(decl_ref) = &callee.kind else {
            return Err(Error::kind("call of a non-reference expression", loc));
        };
        let target = decl_ref.decl;

        let DeclKind::Func(func) = &self.decls[target].kind else {
            return Err(Error::kind(
                format!("`{}` is not a function", self.decl_name(target)),
                loc,
            ));
        };
        let param_count = func.params.len();

        self.expect("(")?;
        let args = self.parse_arg_list(")")?;

        if args.len() != param_count {
            return Err(Error::arity(
                format!(
                    "call to `{}` expects {} argument(s), got {}",
                    self.decl_name(target),
                    param_count,
                    args.len()
                ),
                loc,
            ));
        }

        Ok(Expr {
            kind: ExprKind::Call(FuncCall {
                callee: Box::new(callee),
                args,
            }),
            loc,
        })
    }

    /// Parse a comma-separated expression list up to and including the
    /// closing lexeme. `,` is not an infix operator inside an argument.
    pub(super) fn parse_arg_list(&mut self, close: &str) -> Result<Vec<Expr>> {
        let mut args = Vec::new();
        let mut first = true;
        while !self.try_consume(close) {
            if !first {
                self.expect(",")?;
            }
            first = false;
            args.push(self.parse_expr(&[","])?);
        }
        Ok(args)
    }
}
