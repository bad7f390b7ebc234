//! Declaration and statement parsing.
//!
//! Every declaration parse opens a fresh frame to hold template
//! parameters; the frame is dropped when the declaration completes, and
//! the caller (the namespace driver or an enclosing struct) is the one
//! that registers the finished declaration in its own frame.
//!
//! The function-versus-variable ambiguity at a declaration site is
//! settled by trying the function form first under a checkpoint and
//! falling back to a variable declaration on failure.

use super::Parser;
use crate::ast::{
    Decl, DeclId, DeclKind, FuncDecl, ReturnStmt, Stmt, StructDecl, Symbol, TemplateParamKind,
    Type, TypedefDecl, UsingAliasDecl, UsingDecl, VarDecl, VarInit,
};
use crate::diagnostics::{Error, Result};
use crate::span::Location;

impl Parser {
    /// Parse one declaration: typedef, using, struct/class, function, or
    /// variable, with an optional `template<...>` head where the form
    /// allows it. Consumes the trailing `;` of variable, typedef, and
    /// using forms.
    pub(super) fn parse_decl(&mut self) -> Result<DeclId> {
        self.with_scope(|p| p.parse_decl_in_scope())
    }

    fn parse_decl_in_scope(&mut self) -> Result<DeclId> {
        if self.try_consume("typedef") {
            let ty = self.parse_type()?;
            let (name, loc) = self.expect_ident()?;
            self.expect(";")?;
            return Ok(self.decls.alloc(Decl {
                name,
                loc,
                kind: DeclKind::Typedef(TypedefDecl { ty }),
            }));
        }

        let template_params = if self.try_consume("template") {
            self.parse_template_params()?
        } else {
            Vec::new()
        };

        if self.try_consume("using") {
            return self.parse_using_decl(template_params);
        }

        if self.check("class") || self.check("struct") {
            return self.parse_struct_decl(template_params);
        }

        self.try_consume("static");

        let ty = self.parse_type()?;
        let (name, name_loc) = self.expect_ident()?;

        // Function first; a variable declaration on rollback. The
        // function form commits once its parameter list closes, so
        // failures inside a body propagate instead of re-parsing the
        // tokens as an initializer.
        let enclosing = self.context.depth() - 1;
        let depth = self.context.depth();
        let signature = self.speculate(|p| {
            p.context.push();
            p.expect("(")?;
            let mut params = Vec::new();
            let mut first = true;
            while !p.try_consume(")") {
                if !first {
                    p.expect(",")?;
                }
                first = false;
                params.push(p.parse_param_decl()?);
            }
            Ok(params)
        });

        match signature {
            Ok(params) => {
                let result = self.parse_func_decl_rest(
                    template_params,
                    ty,
                    name,
                    name_loc,
                    params,
                    enclosing,
                );
                self.context.truncate(depth);
                result
            }
            Err(_) => {
                if !template_params.is_empty() {
                    return Err(Error::unsupported(
                        "template parameters on a variable declaration",
                        name_loc,
                    ));
                }
                let id = self.parse_var_decl(ty, name, name_loc, false)?;
                self.expect(";")?;
                Ok(id)
            }
        }
    }

    /// Parse `<int|typename name, ...>` after `template`, registering
    /// each parameter in the current top frame. An absent `<` means an
    /// empty parameter list.
    fn parse_template_params(&mut self) -> Result<Vec<DeclId>> {
        if !self.try_consume("<") {
            return Ok(Vec::new());
        }
        let mut params = Vec::new();
        let mut first = true;
        while !self.try_consume(">") {
            if !first {
                self.expect(",")?;
            }
            first = false;
            let kind = if self.try_consume("int") {
                TemplateParamKind::Int
            } else if self.try_consume("typename") {
                TemplateParamKind::Type
            } else {
                return Err(Error::parse(
                    format!(
                        "expected `int` or `typename`, found `{}`",
                        self.current_lexeme()
                    ),
                    self.loc(),
                ));
            };
            let (name, loc) = self.expect_ident()?;
            let id = self.decls.alloc(Decl {
                name,
                loc,
                kind: DeclKind::TemplateParam(kind),
            });
            self.register(name, id, loc)?;
            params.push(id);
        }
        Ok(params)
    }

    /// `using name = type;` with optional template parameters, or
    /// `using name;` rebinding an existing type.
    fn parse_using_decl(&mut self, template_params: Vec<DeclId>) -> Result<DeclId> {
        let ident = self.parse_identifier()?;
        let name = ident.parts[ident.parts.len() - 1];
        let loc = ident.loc;

        if self.try_consume("=") {
            let ty = self.parse_type()?;
            self.expect(";")?;
            return Ok(self.decls.alloc(Decl {
                name,
                loc,
                kind: DeclKind::UsingAlias(UsingAliasDecl {
                    template_params,
                    ty,
                }),
            }));
        }

        if !template_params.is_empty() {
            return Err(Error::parse(
                "`using` with template parameters requires `= type`",
                loc,
            ));
        }

        let target = self.resolve(&ident)?;
        if !self.decls[target].is_type_like() {
            return Err(Error::kind(
                format!("`{}` does not name a type", self.decl_name(target)),
                loc,
            ));
        }
        self.expect(";")?;
        Ok(self.decls.alloc(Decl {
            name,
            loc,
            kind: DeclKind::Using(UsingDecl {
                ty: Type::Decl(target),
            }),
        }))
    }

    /// `struct name { decl* };` or `class name { decl* };`. Members bind
    /// in the struct's own frame so later members can refer to earlier
    /// ones.
    fn parse_struct_decl(&mut self, template_params: Vec<DeclId>) -> Result<DeclId> {
        let is_class = if self.try_consume("class") {
            true
        } else {
            self.expect("struct")?;
            false
        };
        let (name, name_loc) = self.expect_ident()?;
        self.expect("{")?;

        let inner = self.with_scope(|p| {
            let mut inner = Vec::new();
            while !p.try_consume("}") {
                let member = p.parse_decl()?;
                let member_name = p.decls[member].name;
                let member_loc = p.decls[member].loc;
                p.register(member_name, member, member_loc)?;
                inner.push(member);
            }
            Ok(inner)
        })?;

        self.expect(";")?;
        Ok(self.decls.alloc(Decl {
            name,
            loc: name_loc,
            kind: DeclKind::Struct(StructDecl {
                is_class,
                template_params,
                inner,
            }),
        }))
    }

    /// Finish a function declaration whose signature has parsed: the
    /// parameter/body frame is on top of the context stack and the
    /// parameters are bound in it. The declaration registers in the
    /// frame *below* that one before the body parses, so the body can
    /// call it recursively; a rollback of the enclosing speculation
    /// undoes the registration.
    fn parse_func_decl_rest(
        &mut self,
        template_params: Vec<DeclId>,
        return_type: Type,
        name: Symbol,
        name_loc: Location,
        params: Vec<DeclId>,
        enclosing: usize,
    ) -> Result<DeclId> {
        let func_id = self.decls.alloc(Decl {
            name,
            loc: name_loc,
            kind: DeclKind::Func(FuncDecl {
                template_params,
                return_type,
                params,
                is_prototype: false,
                body: Vec::new(),
            }),
        });

        if self.try_consume(";") {
            if let DeclKind::Func(func) = &mut self.decls[func_id].kind {
                func.is_prototype = true;
            }
            self.register_in_frame(enclosing, name, func_id, name_loc)?;
            return Ok(func_id);
        }

        self.register_in_frame(enclosing, name, func_id, name_loc)?;

        self.expect("{")?;
        let mut body = Vec::new();
        while !self.try_consume("}") {
            body.push(self.parse_stmt()?);
        }
        if let DeclKind::Func(func) = &mut self.decls[func_id].kind {
            func.body = body;
        }
        Ok(func_id)
    }

    /// One function parameter: a type, a name, then the variable rule in
    /// parameter mode (no ctor or brace-list initializers).
    fn parse_param_decl(&mut self) -> Result<DeclId> {
        let ty = self.parse_type()?;
        let (name, loc) = self.expect_ident()?;
        self.parse_var_decl(ty, name, loc, true)
    }

    /// Finish a variable declaration whose type and name are consumed,
    /// selecting the initializer form from the next token, and register
    /// it in the current top frame.
    pub(super) fn parse_var_decl(
        &mut self,
        ty: Type,
        name: Symbol,
        loc: Location,
        param_mode: bool,
    ) -> Result<DeclId> {
        let init = if self.try_consume("=") {
            VarInit::Equals(self.parse_expr(&[","])?)
        } else if !param_mode && self.try_consume("(") {
            VarInit::Ctor(self.parse_arg_list(")")?)
        } else if !param_mode && self.try_consume("{") {
            VarInit::BraceList(self.parse_arg_list("}")?)
        } else {
            VarInit::None
        };

        let id = self.decls.alloc(Decl {
            name,
            loc,
            kind: DeclKind::Var(VarDecl { ty, init }),
        });
        self.register(name, id, loc)?;
        Ok(id)
    }

    /// One statement: `return`, a variable declaration, or an
    /// expression, each terminated by `;`. The declaration form is tried
    /// under a checkpoint and rolled back if it does not fit.
    pub(super) fn parse_stmt(&mut self) -> Result<Stmt> {
        let loc = self.loc();

        if self.try_consume("return") {
            if self.try_consume(";") {
                return Ok(Stmt::Return(ReturnStmt { value: None, loc }));
            }
            let value = self.parse_expr(&[])?;
            self.expect(";")?;
            return Ok(Stmt::Return(ReturnStmt {
                value: Some(value),
                loc,
            }));
        }

        let decl_attempt = self.speculate(|p| {
            let ty = p.parse_type()?;
            let (name, name_loc) = p.expect_ident()?;
            let id = p.parse_var_decl(ty, name, name_loc, false)?;
            p.expect(";")?;
            Ok(id)
        });
        if let Ok(decl) = decl_attempt {
            return Ok(Stmt::Decl(decl));
        }

        let expr = self.parse_expr(&[])?;
        self.expect(";")?;
        Ok(Stmt::Expr(expr))
    }
}
