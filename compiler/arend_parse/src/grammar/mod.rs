//! Grammar productions, split by syntactic category.

mod expr;
mod item;
mod pattern;
mod telescope;

use arend_ir::{Associativity, Precedence, Span};

use crate::{ParseError, Parser, TokenKind};

pub(crate) fn starts_definition(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Func | TokenKind::Data | TokenKind::Class | TokenKind::Instance | TokenKind::Meta
    )
}

impl Parser<'_> {
    /// Parse an optional fixity declaration such as `\infixl 6`.
    pub(crate) fn parse_fixity(&mut self) -> Result<Option<Precedence>, ParseError> {
        let kind = self.current_kind();
        if !kind.is_fixity_keyword() {
            return Ok(None);
        }
        let keyword_span = self.advance().span;
        let priority = match self.current_kind() {
            TokenKind::Number(n) => {
                let n = *n;
                let span = self.advance().span;
                match u8::try_from(n) {
                    Ok(p) if p <= Precedence::MAX_PRIORITY => p,
                    _ => {
                        return Err(ParseError::new(
                            format!(
                                "priority must be between 0 and {}, found {n}",
                                Precedence::MAX_PRIORITY
                            ),
                            span,
                        ))
                    }
                }
            }
            _ => return Err(self.expected("a priority after the fixity keyword")),
        };
        let precedence = match kind {
            TokenKind::Infix => Precedence::infix(Associativity::NonAssoc, priority),
            TokenKind::Infixl => Precedence::infix(Associativity::Left, priority),
            TokenKind::Infixr => Precedence::infix(Associativity::Right, priority),
            TokenKind::Fix => Precedence::prefix(Associativity::NonAssoc, priority),
            TokenKind::Fixl => Precedence::prefix(Associativity::Left, priority),
            TokenKind::Fixr => Precedence::prefix(Associativity::Right, priority),
            TokenKind::Postfix => Precedence::postfix(priority),
            _ => {
                return Err(ParseError::new("expected a fixity keyword", keyword_span));
            }
        };
        Ok(Some(precedence))
    }

    /// Parse an unqualified definition or renaming name: alphanumeric or
    /// symbolic.
    pub(crate) fn parse_simple_name(&mut self, what: &str) -> Result<(String, Span), ParseError> {
        match self.current_kind() {
            TokenKind::Name(name) if name.contains('.') => Err(ParseError::new(
                format!("{what} cannot be qualified"),
                self.current_span(),
            )),
            TokenKind::Name(name) | TokenKind::Symbol(name) => {
                let span = self.advance().span;
                Ok((name.clone(), span))
            }
            _ => Err(self.expected(what)),
        }
    }
}
