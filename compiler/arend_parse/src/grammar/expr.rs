//! Expressions.
//!
//! ```text
//! expr    := '\lam' binders '=>' expr
//!          | '\Pi' telescope '->' expr
//!          | seq ['->' expr]
//! seq     := element+
//! element := name | number | '\Type' | '_' | '(' expr ')' | '{' expr '}'
//!          | '`' name '`' | '`' name
//! ```
//!
//! A lambda or Pi may close a sequence (`f \lam x => x`). Sequences are
//! kept flat; association happens after resolution.

use arend_ir::{ElemPosition, ExprId, ExprKind, LongName, SeqElem};

use arend_stack::ensure_sufficient_stack;
use crate::{ParseError, Parser, TokenKind};

impl Parser<'_> {
    pub(crate) fn parse_expr(&mut self) -> Result<ExprId, ParseError> {
        ensure_sufficient_stack(|| self.parse_expr_inner())
    }

    fn parse_expr_inner(&mut self) -> Result<ExprId, ParseError> {
        match self.current_kind() {
            TokenKind::Lam => self.parse_lambda(),
            TokenKind::Pi => self.parse_pi(),
            _ => {
                let start = self.current_span();
                let domain = self.parse_seq()?;
                if self.eat(&TokenKind::Arrow) {
                    let codomain = self.parse_expr()?;
                    let span = start.merge(self.previous_span());
                    Ok(self
                        .module
                        .alloc_expr(ExprKind::Arrow { domain, codomain }, span))
                } else {
                    Ok(domain)
                }
            }
        }
    }

    fn parse_lambda(&mut self) -> Result<ExprId, ParseError> {
        let start = self.advance().span;
        let params = self.parse_untyped_binders()?;
        if params.is_empty() {
            return Err(self.expected("a lambda parameter"));
        }
        self.expect(&TokenKind::FatArrow)?;
        let body = self.parse_expr()?;
        let span = start.merge(self.previous_span());
        Ok(self.module.alloc_expr(ExprKind::Lam { params, body }, span))
    }

    fn parse_pi(&mut self) -> Result<ExprId, ParseError> {
        let start = self.advance().span;
        let params = self.parse_typed_telescope()?;
        if params.is_empty() {
            return Err(self.expected("a Pi parameter"));
        }
        self.expect(&TokenKind::Arrow)?;
        let codomain = self.parse_expr()?;
        let span = start.merge(self.previous_span());
        Ok(self.module.alloc_expr(ExprKind::Pi { params, codomain }, span))
    }

    fn starts_element(&self) -> bool {
        matches!(
            self.current_kind(),
            TokenKind::Name(_)
                | TokenKind::Symbol(_)
                | TokenKind::Number(_)
                | TokenKind::Type
                | TokenKind::Underscore
                | TokenKind::LParen
                | TokenKind::LBrace
                | TokenKind::Backquote
                | TokenKind::Lam
                | TokenKind::Pi
        )
    }

    fn parse_seq(&mut self) -> Result<ExprId, ParseError> {
        let start = self.current_span();
        let mut elems: Vec<SeqElem> = Vec::new();
        while self.starts_element() {
            if matches!(self.current_kind(), TokenKind::Lam | TokenKind::Pi) {
                let expr = self.parse_expr()?;
                elems.push(SeqElem {
                    expr,
                    explicit: true,
                    position: ElemPosition::Natural,
                });
                break;
            }
            elems.push(self.parse_element()?);
        }

        if elems.is_empty() {
            return Err(self.expected("an expression"));
        }
        if let [single] = elems[..] {
            if !single.explicit {
                return Err(ParseError::new(
                    "implicit argument without a function",
                    self.module.expr(single.expr).span,
                ));
            }
            return Ok(single.expr);
        }
        let span = start.merge(self.previous_span());
        Ok(self.module.alloc_expr(ExprKind::Seq(elems), span))
    }

    fn parse_element(&mut self) -> Result<SeqElem, ParseError> {
        let token = self.advance();
        let span = token.span;
        let natural = |expr| SeqElem {
            expr,
            explicit: true,
            position: ElemPosition::Natural,
        };
        let elem = match &token.kind {
            TokenKind::Name(name) => {
                natural(self.module.alloc_expr(ExprKind::Ref(LongName::parse(name)), span))
            }
            TokenKind::Symbol(name) => {
                natural(self.module.alloc_expr(ExprKind::Ref(LongName::short(name.clone())), span))
            }
            TokenKind::Number(n) => natural(self.module.alloc_expr(ExprKind::Number(*n), span)),
            TokenKind::Type => natural(self.module.alloc_expr(ExprKind::Universe, span)),
            TokenKind::Underscore => natural(self.module.alloc_expr(ExprKind::Hole, span)),
            TokenKind::LParen => SeqElem {
                expr: self.parse_delimited(&TokenKind::RParen)?,
                explicit: true,
                position: ElemPosition::Operand,
            },
            TokenKind::LBrace => SeqElem {
                expr: self.parse_delimited(&TokenKind::RBrace)?,
                explicit: false,
                position: ElemPosition::Natural,
            },
            TokenKind::Backquote => {
                let name = match self.current_kind() {
                    TokenKind::Name(name) => LongName::parse(name),
                    TokenKind::Symbol(name) => LongName::short(name.clone()),
                    _ => return Err(self.expected("a name after the backquote")),
                };
                let name_span = self.advance().span;
                let position = if self.eat(&TokenKind::Backquote) {
                    ElemPosition::Infix
                } else {
                    ElemPosition::Postfix
                };
                SeqElem {
                    expr: self.module.alloc_expr(ExprKind::Ref(name), name_span),
                    explicit: true,
                    position,
                }
            }
            _ => return Err(ParseError::new(format!("unexpected `{}`", token.kind), span)),
        };
        Ok(elem)
    }

    /// Parse `expr close` after an opening delimiter.
    ///
    /// An error inside the group is recovered here: it is reported, the
    /// group is skipped and an error node takes its place.
    fn parse_delimited(&mut self, close: &TokenKind) -> Result<ExprId, ParseError> {
        let open_span = self.previous_span();
        let result = self
            .parse_expr()
            .and_then(|expr| self.expect(close).map(|_| expr));
        match result {
            Ok(expr) => Ok(expr),
            Err(error) => {
                self.recover(error);
                self.skip_to_closing(close);
                let span = open_span.merge(self.previous_span());
                Ok(self.module.alloc_expr(ExprKind::Error, span))
            }
        }
    }
}
