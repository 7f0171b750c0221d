//! Module-level statements and definitions.
//!
//! ```text
//! import   := '\import' modpath filter
//! open     := '\open' name filter
//! filter   := [ '(' items ')' | '\using' '(' items ')' ] [ '\hiding' '(' names ')' ]
//! item     := name [ '\as' [fixity] name ]
//!
//! func     := '\func' [fixity] name [alias] telescope [':' expr] fbody [where]
//! fbody    := '=>' expr | ['\elim' name (',' name)*] clause*
//! clause   := '|' pattern (',' pattern)* '=>' expr
//! data     := '\data' [fixity] name [alias] telescope [':' expr] ('|' [fixity] name telescope)* [where]
//! class    := '\class' [fixity] name [alias] telescope ('|' [fixity] name ':' expr)* [where]
//! instance := '\instance' name telescope ':' expr ('|' name '=>' expr)* [where]
//! meta     := '\meta' [fixity] name binders '=>' expr [where]
//! where    := '\where' ( '{' def* '}' | def )
//! ```

use arend_ir::{
    AliasDecl, Binder, Clause, ConcreteDef, ConstructorDecl, DefBody, DefIndex, ExprId, ExprKind,
    FieldDecl, FunctionBody, Implementation, Import, LongName, ModulePath, NameRef,
    NamespaceFilter, Open, Precedence, Renaming, Span,
};

use crate::{ParseError, Parser, TokenKind};

use super::starts_definition;

/// Everything after a definition's name.
struct DefParts {
    params: Vec<Binder>,
    result: Option<ExprId>,
    body: DefBody,
}

impl Parser<'_> {
    pub(crate) fn parse_import(&mut self) -> Result<Import, ParseError> {
        let start = self.advance().span;
        let path = match self.current_kind() {
            TokenKind::Name(name) => {
                self.advance();
                ModulePath::parse(name)
            }
            _ => return Err(self.expected("a module path")),
        };
        let filter = self.parse_filter()?;
        Ok(Import {
            path,
            span: start.merge(self.previous_span()),
            filter,
        })
    }

    pub(crate) fn parse_open(&mut self) -> Result<Open, ParseError> {
        let start = self.advance().span;
        let target = match self.current_kind() {
            TokenKind::Name(name) => {
                self.advance();
                LongName::parse(name)
            }
            _ => return Err(self.expected("a namespace to open")),
        };
        let filter = self.parse_filter()?;
        Ok(Open {
            target,
            span: start.merge(self.previous_span()),
            filter,
        })
    }

    fn parse_filter(&mut self) -> Result<NamespaceFilter, ParseError> {
        let mut filter = NamespaceFilter::default();
        if self.eat(&TokenKind::Using) {
            self.expect(&TokenKind::LParen)?;
            filter.using = Some(self.parse_renamings()?);
        } else if self.eat(&TokenKind::LParen) {
            filter.using = Some(self.parse_renamings()?);
        }
        if self.eat(&TokenKind::Hiding) {
            self.expect(&TokenKind::LParen)?;
            let mut hidden = Vec::new();
            if !self.check(&TokenKind::RParen) {
                loop {
                    let (name, span) = self.parse_simple_name("a name to hide")?;
                    hidden.push(NameRef { name, span });
                    if !self.eat(&TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(&TokenKind::RParen)?;
            filter.hiding = hidden;
        }
        Ok(filter)
    }

    /// Parse `item, item, ...)` after the opening parenthesis.
    fn parse_renamings(&mut self) -> Result<Vec<Renaming>, ParseError> {
        let mut items = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                let (name, name_span) = self.parse_simple_name("a name")?;
                let mut renaming = Renaming {
                    name,
                    span: name_span,
                    new_name: None,
                    precedence: None,
                };
                if self.eat(&TokenKind::As) {
                    renaming.precedence = self.parse_fixity()?;
                    let (new_name, _) = self.parse_simple_name("a new name after `\\as`")?;
                    renaming.new_name = Some(new_name);
                    renaming.span = name_span.merge(self.previous_span());
                }
                items.push(renaming);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen)?;
        Ok(items)
    }

    /// Parse a definition and its `\where` block.
    ///
    /// Returns `None` only when not even the name could be read; any later
    /// error yields a definition marked erroneous.
    pub(crate) fn parse_definition(&mut self, parent: Option<DefIndex>) -> Option<DefIndex> {
        let outer_erroneous = std::mem::replace(&mut self.def_erroneous, false);
        let keyword = self.advance();
        let start = keyword.span;

        let header = self.parse_fixity().and_then(|precedence| {
            let (name, name_span) = self.parse_simple_name("a definition name")?;
            Ok((precedence.unwrap_or(Precedence::NONFIX), name, name_span))
        });
        let (precedence, name, name_span) = match header {
            Ok(header) => header,
            Err(error) => {
                self.report(error);
                self.synchronize_statement();
                self.def_erroneous = outer_erroneous;
                return None;
            }
        };

        let mut alias = None;
        let parts = self.parse_alias().and_then(|parsed| {
            alias = parsed;
            self.parse_def_parts(&keyword.kind)
        });
        let parts = match parts {
            Ok(parts) => parts,
            Err(error) => {
                self.recover(error);
                self.synchronize_statement();
                let span = self.previous_span();
                let error_expr = self.module.alloc_expr(ExprKind::Error, span);
                DefParts::recovered(&keyword.kind, error_expr)
            }
        };

        let header_end = self.previous_span().end;
        let index = self.module.alloc_def(ConcreteDef {
            name,
            name_span,
            span: Span::new(start.start, header_end),
            header_end,
            precedence,
            alias,
            params: parts.params,
            result: parts.result,
            body: parts.body,
            where_defs: Vec::new(),
            parent,
            erroneous: self.def_erroneous,
        });

        if self.eat(&TokenKind::Where) {
            let where_defs = self.parse_where(index);
            let end = self.previous_span().end;
            let def = self.module.def_mut(index);
            def.where_defs = where_defs;
            def.span = Span::new(start.start, end);
        }

        self.def_erroneous = outer_erroneous;
        Some(index)
    }

    fn parse_alias(&mut self) -> Result<Option<AliasDecl>, ParseError> {
        if !self.eat(&TokenKind::Alias) {
            return Ok(None);
        }
        let precedence = self.parse_fixity()?.unwrap_or(Precedence::NONFIX);
        let (name, span) = self.parse_simple_name("an alias name")?;
        Ok(Some(AliasDecl {
            name,
            span,
            precedence,
        }))
    }

    fn parse_def_parts(&mut self, keyword: &TokenKind) -> Result<DefParts, ParseError> {
        match keyword {
            TokenKind::Func => {
                let params = self.parse_typed_telescope()?;
                let result = self.parse_result_type()?;
                let body = DefBody::Function(self.parse_function_body()?);
                Ok(DefParts {
                    params,
                    result,
                    body,
                })
            }
            TokenKind::Data => {
                let params = self.parse_typed_telescope()?;
                let result = self.parse_result_type()?;
                let constructors = self.parse_constructors()?;
                Ok(DefParts {
                    params,
                    result,
                    body: DefBody::Data { constructors },
                })
            }
            TokenKind::Class => {
                let params = self.parse_typed_telescope()?;
                let fields = self.parse_fields()?;
                Ok(DefParts {
                    params,
                    result: None,
                    body: DefBody::Class { fields },
                })
            }
            TokenKind::Instance => {
                let params = self.parse_typed_telescope()?;
                self.expect(&TokenKind::Colon)?;
                let result = Some(self.parse_expr()?);
                let implementations = self.parse_implementations()?;
                Ok(DefParts {
                    params,
                    result,
                    body: DefBody::Instance { implementations },
                })
            }
            _ => {
                let params = self.parse_untyped_binders()?;
                self.expect(&TokenKind::FatArrow)?;
                let body = self.parse_expr()?;
                Ok(DefParts {
                    params,
                    result: None,
                    body: DefBody::Meta { body },
                })
            }
        }
    }

    fn parse_result_type(&mut self) -> Result<Option<ExprId>, ParseError> {
        if self.eat(&TokenKind::Colon) {
            Ok(Some(self.parse_expr()?))
        } else {
            Ok(None)
        }
    }

    fn parse_function_body(&mut self) -> Result<FunctionBody, ParseError> {
        if self.eat(&TokenKind::FatArrow) {
            return Ok(FunctionBody::Term(self.parse_expr()?));
        }
        let elim = if self.eat(&TokenKind::Elim) {
            let mut names = Vec::new();
            loop {
                let (name, span) = self.parse_simple_name("a parameter name")?;
                names.push(NameRef { name, span });
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
            Some(names)
        } else if self.check(&TokenKind::Pipe) {
            None
        } else {
            return Err(self.expected("`=>`, `\\elim` or a clause"));
        };

        let mut clauses = Vec::new();
        while self.check(&TokenKind::Pipe) {
            let start = self.advance().span;
            match self.parse_clause(start) {
                Ok(clause) => clauses.push(clause),
                Err(error) => {
                    self.recover(error);
                    self.synchronize_clause();
                }
            }
        }
        Ok(FunctionBody::Clauses { elim, clauses })
    }

    fn parse_clause(&mut self, start: Span) -> Result<Clause, ParseError> {
        let mut patterns = vec![self.parse_pattern()?];
        while self.eat(&TokenKind::Comma) {
            patterns.push(self.parse_pattern()?);
        }
        self.expect(&TokenKind::FatArrow)?;
        let rhs = self.parse_expr()?;
        Ok(Clause {
            patterns,
            rhs,
            span: start.merge(self.previous_span()),
        })
    }

    fn parse_constructors(&mut self) -> Result<Vec<ConstructorDecl>, ParseError> {
        let mut constructors = Vec::new();
        while self.eat(&TokenKind::Pipe) {
            let parsed = self.parse_fixity().and_then(|precedence| {
                let (name, name_span) = self.parse_simple_name("a constructor name")?;
                let params = self.parse_typed_telescope()?;
                Ok(ConstructorDecl {
                    name,
                    span: name_span.merge(self.previous_span()),
                    precedence: precedence.unwrap_or(Precedence::NONFIX),
                    params,
                })
            });
            match parsed {
                Ok(constructor) => constructors.push(constructor),
                Err(error) => {
                    self.recover(error);
                    self.synchronize_clause();
                }
            }
        }
        Ok(constructors)
    }

    fn parse_fields(&mut self) -> Result<Vec<FieldDecl>, ParseError> {
        let mut fields = Vec::new();
        while self.eat(&TokenKind::Pipe) {
            let parsed = self.parse_fixity().and_then(|precedence| {
                let (name, name_span) = self.parse_simple_name("a field name")?;
                self.expect(&TokenKind::Colon)?;
                let ty = self.parse_expr()?;
                Ok(FieldDecl {
                    name,
                    span: name_span.merge(self.previous_span()),
                    precedence: precedence.unwrap_or(Precedence::NONFIX),
                    ty,
                })
            });
            match parsed {
                Ok(field) => fields.push(field),
                Err(error) => {
                    self.recover(error);
                    self.synchronize_clause();
                }
            }
        }
        Ok(fields)
    }

    fn parse_implementations(&mut self) -> Result<Vec<Implementation>, ParseError> {
        let mut implementations = Vec::new();
        while self.eat(&TokenKind::Pipe) {
            let parsed = self.parse_simple_name("a field name").and_then(|(name, span)| {
                self.expect(&TokenKind::FatArrow)?;
                let value = self.parse_expr()?;
                Ok(Implementation {
                    name,
                    span: span.merge(self.previous_span()),
                    value,
                })
            });
            match parsed {
                Ok(implementation) => implementations.push(implementation),
                Err(error) => {
                    self.recover(error);
                    self.synchronize_clause();
                }
            }
        }
        Ok(implementations)
    }

    fn parse_where(&mut self, parent: DefIndex) -> Vec<DefIndex> {
        let mut defs = Vec::new();
        if !self.eat(&TokenKind::LBrace) {
            if starts_definition(self.current_kind()) {
                defs.extend(self.parse_definition(Some(parent)));
            } else {
                let error = self.expected("`{` or a definition after `\\where`");
                self.recover(error);
            }
            return defs;
        }
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            if starts_definition(self.current_kind()) {
                defs.extend(self.parse_definition(Some(parent)));
            } else {
                let error = self.expected("a definition");
                self.report(error);
                self.advance();
                self.synchronize_statement();
            }
        }
        if let Err(error) = self.expect(&TokenKind::RBrace) {
            self.report(error);
        }
        defs
    }
}

impl DefParts {
    /// Placeholder parts for a definition whose header or body failed.
    fn recovered(keyword: &TokenKind, error: ExprId) -> Self {
        let body = match keyword {
            TokenKind::Func => DefBody::Function(FunctionBody::Term(error)),
            TokenKind::Data => DefBody::Data {
                constructors: Vec::new(),
            },
            TokenKind::Class => DefBody::Class { fields: Vec::new() },
            TokenKind::Instance => DefBody::Instance {
                implementations: Vec::new(),
            },
            _ => DefBody::Meta { body: error },
        };
        DefParts {
            params: Vec::new(),
            result: None,
            body,
        }
    }
}
