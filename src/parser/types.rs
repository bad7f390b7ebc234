//! Type parsing and template argument lists.

use super::Parser;
use crate::ast::{DeclId, DeclKind, TemplateArg, TemplateParamKind, Type};
use crate::diagnostics::{Error, Result};
use crate::span::Location;

impl Parser {
    /// Parse a type: `void`, `int`, or a name resolving to a type-like
    /// declaration (struct, typedef, using, using-alias, or a Type-kind
    /// template parameter). A templated declaration consumes its
    /// template argument list here; the `>` is disambiguated purely by
    /// position.
    ///
    /// Callers that treat "not a type" as an alternative wrap this in a
    /// speculation.
    pub(super) fn parse_type(&mut self) -> Result<Type> {
        if self.try_consume("void") {
            return Ok(Type::Void);
        }
        if self.try_consume("int") {
            return Ok(Type::Int);
        }

        let ident = self.parse_identifier()?;
        let target = self.resolve(&ident)?;
        self.decl_as_type(target, ident.loc)
    }

    /// Use a resolved declaration in type position, consuming template
    /// arguments when the declaration is templated.
    pub(super) fn decl_as_type(&mut self, target: DeclId, loc: Location) -> Result<Type> {
        let decl = &self.decls[target];

        if let DeclKind::TemplateParam(kind) = decl.kind {
            if kind == TemplateParamKind::Int {
                return Err(Error::kind(
                    format!(
                        "integer template parameter `{}` used as a type",
                        self.decl_name(target)
                    ),
                    loc,
                ));
            }
            return Ok(Type::Decl(target));
        }

        if !decl.is_type_like() {
            return Err(Error::kind(
                format!("`{}` does not name a type", self.decl_name(target)),
                loc,
            ));
        }

        let template_params = decl.template_params().to_vec();
        if !template_params.is_empty() {
            // Arguments are checked positionally and then dropped; the
            // type refers to the templated declaration itself.
            self.parse_template_args(&template_params)?;
        }

        Ok(Type::Decl(target))
    }

    /// Parse `<arg, ...>` with exactly one argument per parameter.
    ///
    /// A Type-kind parameter takes a type; an Int-kind parameter takes an
    /// expression in which `,` and `>` are not infix operators, so they
    /// terminate the argument instead of being consumed.
    pub(super) fn parse_template_args(
        &mut self,
        params: &[DeclId],
    ) -> Result<Vec<TemplateArg>> {
        self.expect("<")?;
        let mut args = Vec::new();
        for (i, &param) in params.iter().enumerate() {
            if i > 0 {
                self.expect(",")?;
            }
            let DeclKind::TemplateParam(kind) = self.decls[param].kind else {
                return Err(Error::kind(
                    "template parameter list holds a non-parameter declaration",
                    self.loc(),
                ));
            };
            match kind {
                TemplateParamKind::Type => {
                    args.push(TemplateArg::Type(self.parse_type()?));
                }
                TemplateParamKind::Int => {
                    args.push(TemplateArg::Expr(self.parse_expr(&[",", ">"])?));
                }
            }
        }
        self.expect(">")?;
        Ok(args)
    }
}
