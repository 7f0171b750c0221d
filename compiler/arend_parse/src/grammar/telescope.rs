//! Parameter telescopes.
//!
//! Typed telescopes appear in definition headers, constructors and `\Pi`:
//! `(x y : A)`, `{x : A}`, or a bare type atom for an anonymous parameter
//! (`| suc Nat`). Untyped binders appear in `\lam` and `\meta` headers,
//! where a bare name binds a variable.

use arend_ir::{Binder, ExprId, ExprKind, LongName, Span};

use crate::{ParseError, Parser, TokenKind};

impl Parser<'_> {
    /// Whether the tokens after the current opening delimiter read
    /// `name+ ':'`.
    fn at_binder_group(&self) -> bool {
        let mut offset = 1;
        loop {
            match self.cursor.peek_kind(offset) {
                TokenKind::Name(name) if !name.contains('.') => offset += 1,
                TokenKind::Underscore => offset += 1,
                TokenKind::Colon => return offset > 1,
                _ => return false,
            }
        }
    }

    /// Parse `name+ : type close` after the opening delimiter was consumed.
    fn parse_binder_group(
        &mut self,
        explicit: bool,
        close: &TokenKind,
    ) -> Result<Vec<Binder>, ParseError> {
        let mut names: Vec<(String, Span)> = Vec::new();
        loop {
            match self.current_kind() {
                TokenKind::Name(name) => {
                    let span = self.advance().span;
                    names.push((name.clone(), span));
                }
                TokenKind::Underscore => {
                    let span = self.advance().span;
                    names.push(("_".to_string(), span));
                }
                _ => break,
            }
        }
        self.expect(&TokenKind::Colon)?;
        let ty = self.parse_expr()?;
        self.expect(close)?;
        Ok(names
            .into_iter()
            .map(|(name, span)| Binder {
                name,
                span,
                ty: Some(ty),
                explicit,
            })
            .collect())
    }

    fn anonymous(&self, ty: ExprId, explicit: bool) -> Binder {
        Binder {
            name: "_".to_string(),
            span: self.module.expr(ty).span,
            ty: Some(ty),
            explicit,
        }
    }

    pub(crate) fn parse_typed_telescope(&mut self) -> Result<Vec<Binder>, ParseError> {
        let mut binders = Vec::new();
        loop {
            match self.current_kind() {
                TokenKind::LParen if self.at_binder_group() => {
                    self.advance();
                    binders.extend(self.parse_binder_group(true, &TokenKind::RParen)?);
                }
                TokenKind::LParen => {
                    self.advance();
                    let ty = self.parse_expr()?;
                    self.expect(&TokenKind::RParen)?;
                    binders.push(self.anonymous(ty, true));
                }
                TokenKind::LBrace if self.at_binder_group() => {
                    self.advance();
                    binders.extend(self.parse_binder_group(false, &TokenKind::RBrace)?);
                }
                TokenKind::LBrace => {
                    self.advance();
                    let ty = self.parse_expr()?;
                    self.expect(&TokenKind::RBrace)?;
                    binders.push(self.anonymous(ty, false));
                }
                TokenKind::Name(name) => {
                    let span = self.advance().span;
                    let ty = self.module.alloc_expr(ExprKind::Ref(LongName::parse(name)), span);
                    binders.push(self.anonymous(ty, true));
                }
                TokenKind::Type => {
                    let span = self.advance().span;
                    let ty = self.module.alloc_expr(ExprKind::Universe, span);
                    binders.push(self.anonymous(ty, true));
                }
                _ => return Ok(binders),
            }
        }
    }

    pub(crate) fn parse_untyped_binders(&mut self) -> Result<Vec<Binder>, ParseError> {
        let mut binders = Vec::new();
        loop {
            match self.current_kind() {
                TokenKind::Name(name) if !name.contains('.') => {
                    let span = self.advance().span;
                    binders.push(Binder {
                        name: name.clone(),
                        span,
                        ty: None,
                        explicit: true,
                    });
                }
                TokenKind::Underscore => {
                    let span = self.advance().span;
                    binders.push(Binder {
                        name: "_".to_string(),
                        span,
                        ty: None,
                        explicit: true,
                    });
                }
                TokenKind::LParen if self.at_binder_group() => {
                    self.advance();
                    binders.extend(self.parse_binder_group(true, &TokenKind::RParen)?);
                }
                TokenKind::LBrace if self.at_binder_group() => {
                    self.advance();
                    binders.extend(self.parse_binder_group(false, &TokenKind::RBrace)?);
                }
                TokenKind::LBrace => {
                    self.advance();
                    let (name, span) = match self.current_kind() {
                        TokenKind::Name(name) if !name.contains('.') => {
                            (name.clone(), self.advance().span)
                        }
                        _ => return Err(self.expected("a parameter name")),
                    };
                    self.expect(&TokenKind::RBrace)?;
                    binders.push(Binder {
                        name,
                        span,
                        ty: None,
                        explicit: false,
                    });
                }
                _ => return Ok(binders),
            }
        }
    }
}
