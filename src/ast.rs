//! Abstract syntax tree for stacklang.
//!
//! Every node category is a tagged sum: [`Type`], [`Value`], [`DeclKind`],
//! [`Stmt`], and [`ExprKind`]. Declarations live in a typed arena owned by
//! the [`ParsedUnit`]; everything that refers to a declaration — a
//! reference expression, a struct member list, a function parameter list,
//! a declaration-as-type — holds a [`DeclId`] into that arena. This is
//! what lets a recursive call refer back into its own enclosing function
//! and lets one declaration (a struct, a typedef, a type template
//! parameter) be reachable from both declaration and type positions.
//!
//! Names are interned; the interner travels with the parse result so
//! consumers can resolve [`Symbol`]s back to text.
//!
//! Nodes are immutable once the parser hands them out. The only mutation
//! the parser performs is the precedence adjustment of freshly built
//! binary and unary nodes, before anything else can observe them.

use crate::arena::{Arena, Id};
use crate::span::Location;
use serde::{Deserialize, Serialize};
use string_interner::{DefaultStringInterner, DefaultSymbol};

/// An interned name.
pub type Symbol = DefaultSymbol;

/// Handle to a declaration in the unit's arena.
pub type DeclId = Id<Decl>;

/// A possibly-qualified identifier as written in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    /// Name segments; always at least one.
    pub parts: Vec<Symbol>,
    /// Whether the source form started with `::`.
    pub global: bool,
    pub loc: Location,
}

impl Identifier {
    /// Whether this is a plain single-segment name.
    pub fn is_simple(&self) -> bool {
        !self.global && self.parts.len() == 1
    }
}

/// Kind of a template parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateParamKind {
    Type,
    Int,
}

/// A concrete template argument: a type or an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateArg {
    Type(Type),
    Expr(Expr),
}

/// A type: built-in, or a declaration used in type position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    Void,
    Int,
    /// A struct, typedef, using, using-alias, or Type-kind template
    /// parameter.
    Decl(DeclId),
}

/// A literal payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    Void,
    Int(i64),
}

// ============================================================
// Declarations
// ============================================================

/// A named declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decl {
    pub name: Symbol,
    pub loc: Location,
    pub kind: DeclKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclKind {
    Var(VarDecl),
    Func(FuncDecl),
    Struct(StructDecl),
    Typedef(TypedefDecl),
    Using(UsingDecl),
    UsingAlias(UsingAliasDecl),
    TemplateParam(TemplateParamKind),
}

impl Decl {
    /// Template parameters, for the declaration kinds that carry them.
    pub fn template_params(&self) -> &[DeclId] {
        match &self.kind {
            DeclKind::Func(f) => &f.template_params,
            DeclKind::Struct(s) => &s.template_params,
            DeclKind::UsingAlias(u) => &u.template_params,
            _ => &[],
        }
    }

    /// Whether this declaration can stand in type position.
    pub fn is_type_like(&self) -> bool {
        matches!(
            self.kind,
            DeclKind::Struct(_)
                | DeclKind::Typedef(_)
                | DeclKind::Using(_)
                | DeclKind::UsingAlias(_)
                | DeclKind::TemplateParam(_)
        )
    }
}

/// How a variable declaration is initialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VarInit {
    /// `int x;`
    None,
    /// `int x = expr;` — exactly one initializer expression.
    Equals(Expr),
    /// `Foo x(args);`
    Ctor(Vec<Expr>),
    /// `Foo x {args};`
    BraceList(Vec<Expr>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarDecl {
    pub ty: Type,
    pub init: VarInit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncDecl {
    pub template_params: Vec<DeclId>,
    pub return_type: Type,
    /// Parameter declarations, in order; each is a `Var` decl.
    pub params: Vec<DeclId>,
    /// `true` for `type name(...);` — body stays empty.
    pub is_prototype: bool,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDecl {
    /// Introduced with `class` rather than `struct`.
    pub is_class: bool,
    pub template_params: Vec<DeclId>,
    pub inner: Vec<DeclId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedefDecl {
    pub ty: Type,
}

/// `using name;` — name bound to an existing type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsingDecl {
    pub ty: Type,
}

/// `using name = type;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsingAliasDecl {
    pub template_params: Vec<DeclId>,
    pub ty: Type,
}

// ============================================================
// Statements
// ============================================================

/// A statement in a function body. Declarations and expressions are both
/// statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Decl(DeclId),
    Expr(Expr),
    Return(ReturnStmt),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnStmt {
    /// `None` for a bare `return;`.
    pub value: Option<Expr>,
    pub loc: Location,
}

// ============================================================
// Expressions
// ============================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    pub kind: ExprKind,
    pub loc: Location,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    /// `42`
    Literal(Value),
    /// A resolved reference to a declaration, possibly with template
    /// arguments: `x`, `add1<int>`.
    DeclRef(DeclRef),
    /// `(expr)`
    Paren(Box<Expr>),
    /// Prefix or postfix unary operation: `++x`, `y--`.
    Unary(UnaryOp),
    /// `(int)expr` and friends.
    Cast(CastExpr),
    /// `left op right`.
    Binary(BinaryOp),
    /// `base.member` or `base->member`.
    Member(MemberExpr),
    /// `callee(args)` where the callee is a `DeclRef` to a function.
    Call(FuncCall),
    /// `Type(args)` — constructor call / functional cast.
    Ctor(CtorCall),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclRef {
    pub decl: DeclId,
    pub template_args: Vec<TemplateArg>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnaryOp {
    pub op: &'static str,
    pub postfix: bool,
    pub sub: Box<Expr>,
}

/// The cast spellings of the surface language. Only `CStyle` is produced
/// today; the functional form parses as a constructor call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CastKind {
    CStyle,
    Functional,
    Static,
    Dynamic,
    Const,
    Reinterpret,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastExpr {
    pub kind: CastKind,
    pub ty: Type,
    pub sub: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryOp {
    pub op: &'static str,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberExpr {
    pub base: Box<Expr>,
    pub member: Symbol,
    /// `->` rather than `.`.
    pub via_pointer: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncCall {
    /// Always an `ExprKind::DeclRef` resolving to a function.
    pub callee: Box<Expr>,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CtorCall {
    pub ty: Type,
    pub args: Vec<Expr>,
}

impl Expr {
    /// The ordered sub-expression operands of this node.
    ///
    /// Call arguments count as operands of the call but the callee
    /// reference does not; template arguments are not operands.
    pub fn operands(&self) -> Vec<&Expr> {
        match &self.kind {
            ExprKind::Literal(_) | ExprKind::DeclRef(_) => Vec::new(),
            ExprKind::Paren(inner) => vec![inner],
            ExprKind::Unary(u) => vec![&u.sub],
            ExprKind::Cast(c) => vec![&c.sub],
            ExprKind::Binary(b) => vec![&b.left, &b.right],
            ExprKind::Member(m) => vec![&m.base],
            ExprKind::Call(c) => c.args.iter().collect(),
            ExprKind::Ctor(c) => c.args.iter().collect(),
        }
    }
}

// ============================================================
// Namespaces and the parse result
// ============================================================

/// A namespace: an ordered list of child namespaces and declarations.
/// The top level of a translation unit is the anonymous namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    /// Empty string for the anonymous top level.
    pub name: Symbol,
    pub loc: Location,
    pub nested: Vec<Namespace>,
    pub decls: Vec<DeclId>,
}

/// The result of parsing one translation unit: the anonymous root
/// namespace, the declaration arena, and the name interner.
pub struct ParsedUnit {
    pub root: Namespace,
    pub decls: Arena<Decl>,
    pub interner: DefaultStringInterner,
}

impl std::fmt::Debug for ParsedUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParsedUnit")
            .field("root", &self.root)
            .field("decls", &self.decls.len())
            .finish_non_exhaustive()
    }
}

impl ParsedUnit {
    /// Resolve an interned name.
    pub fn name(&self, symbol: Symbol) -> &str {
        self.interner.resolve(symbol).unwrap_or("")
    }

    pub fn decl(&self, id: DeclId) -> &Decl {
        &self.decls[id]
    }

    /// Find a top-level declaration by name.
    pub fn find_decl(&self, name: &str) -> Option<DeclId> {
        self.root
            .decls
            .iter()
            .copied()
            .find(|&id| self.name(self.decls[id].name) == name)
    }

    /// Render the unit as an indented tree with names resolved.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_namespace(&self.root, 0, &mut out);
        out
    }

    fn indent(depth: usize, out: &mut String) {
        for _ in 0..depth {
            out.push_str("  ");
        }
    }

    fn dump_namespace(&self, ns: &Namespace, depth: usize, out: &mut String) {
        Self::indent(depth, out);
        out.push_str(&format!("Namespace({})\n", self.name(ns.name)));
        for nested in &ns.nested {
            self.dump_namespace(nested, depth + 1, out);
        }
        for &decl in &ns.decls {
            self.dump_decl(decl, depth + 1, out);
        }
    }

    fn dump_decl(&self, id: DeclId, depth: usize, out: &mut String) {
        let decl = &self.decls[id];
        let name = self.name(decl.name);
        Self::indent(depth, out);
        match &decl.kind {
            DeclKind::Var(v) => {
                out.push_str(&format!("VarDecl {} : {}", name, self.type_name(v.ty)));
                match &v.init {
                    VarInit::None => out.push('\n'),
                    VarInit::Equals(e) => {
                        out.push_str(" =\n");
                        self.dump_expr(e, depth + 1, out);
                    }
                    VarInit::Ctor(args) => {
                        out.push_str(" ctor\n");
                        for arg in args {
                            self.dump_expr(arg, depth + 1, out);
                        }
                    }
                    VarInit::BraceList(args) => {
                        out.push_str(" brace-list\n");
                        for arg in args {
                            self.dump_expr(arg, depth + 1, out);
                        }
                    }
                }
            }
            DeclKind::Func(f) => {
                let params: Vec<String> = f
                    .params
                    .iter()
                    .map(|&p| self.name(self.decls[p].name).to_string())
                    .collect();
                out.push_str(&format!(
                    "FuncDecl {}({}) -> {}{}\n",
                    name,
                    params.join(", "),
                    self.type_name(f.return_type),
                    if f.is_prototype { " [prototype]" } else { "" }
                ));
                for &param in &f.params {
                    self.dump_decl(param, depth + 1, out);
                }
                for stmt in &f.body {
                    self.dump_stmt(stmt, depth + 1, out);
                }
            }
            DeclKind::Struct(s) => {
                out.push_str(&format!(
                    "{} {}\n",
                    if s.is_class { "ClassDecl" } else { "StructDecl" },
                    name
                ));
                for &inner in &s.inner {
                    self.dump_decl(inner, depth + 1, out);
                }
            }
            DeclKind::Typedef(t) => {
                out.push_str(&format!("Typedef {} = {}\n", name, self.type_name(t.ty)));
            }
            DeclKind::Using(u) => {
                out.push_str(&format!("Using {} = {}\n", name, self.type_name(u.ty)));
            }
            DeclKind::UsingAlias(u) => {
                out.push_str(&format!("UsingAlias {} = {}\n", name, self.type_name(u.ty)));
            }
            DeclKind::TemplateParam(kind) => {
                out.push_str(&format!("TemplateParam {} : {:?}\n", name, kind));
            }
        }
    }

    fn dump_stmt(&self, stmt: &Stmt, depth: usize, out: &mut String) {
        match stmt {
            Stmt::Decl(id) => self.dump_decl(*id, depth, out),
            Stmt::Expr(e) => self.dump_expr(e, depth, out),
            Stmt::Return(r) => {
                Self::indent(depth, out);
                out.push_str("Return\n");
                if let Some(value) = &r.value {
                    self.dump_expr(value, depth + 1, out);
                }
            }
        }
    }

    fn dump_expr(&self, expr: &Expr, depth: usize, out: &mut String) {
        Self::indent(depth, out);
        match &expr.kind {
            ExprKind::Literal(Value::Int(v)) => out.push_str(&format!("Literal int({})\n", v)),
            ExprKind::Literal(Value::Void) => out.push_str("Literal void\n"),
            ExprKind::DeclRef(r) => {
                let name = self.name(self.decls[r.decl].name);
                if r.template_args.is_empty() {
                    out.push_str(&format!("Ref {}\n", name));
                } else {
                    out.push_str(&format!("Ref {}<{} args>\n", name, r.template_args.len()));
                }
            }
            ExprKind::Paren(_) => out.push_str("Paren\n"),
            ExprKind::Unary(u) => out.push_str(&format!(
                "UnaryOp {}{}\n",
                u.op,
                if u.postfix { " [postfix]" } else { "" }
            )),
            ExprKind::Cast(c) => {
                out.push_str(&format!("Cast {:?} {}\n", c.kind, self.type_name(c.ty)))
            }
            ExprKind::Binary(b) => out.push_str(&format!("BinaryOp {}\n", b.op)),
            ExprKind::Member(m) => out.push_str(&format!(
                "Member {}{}\n",
                if m.via_pointer { "->" } else { "." },
                self.name(m.member)
            )),
            ExprKind::Call(c) => {
                if let ExprKind::DeclRef(r) = &c.callee.kind {
                    out.push_str(&format!("Call {}\n", self.name(self.decls[r.decl].name)));
                } else {
                    out.push_str("Call\n");
                }
            }
            ExprKind::Ctor(c) => out.push_str(&format!("Ctor {}\n", self.type_name(c.ty))),
        }
        for operand in expr.operands() {
            self.dump_expr(operand, depth + 1, out);
        }
    }

    fn type_name(&self, ty: Type) -> String {
        match ty {
            Type::Void => "void".to_string(),
            Type::Int => "int".to_string(),
            Type::Decl(id) => self.name(self.decls[id].name).to_string(),
        }
    }
}
