//! Clause patterns.
//!
//! ```text
//! pattern := name atom* | atom
//! atom    := '_' | number | name | '(' pattern ')'
//! ```
//!
//! Whether a bare name is a constructor or a new variable is decided during
//! resolution.

use arend_ir::{LongName, PatId, PatternKind};

use arend_stack::ensure_sufficient_stack;
use crate::{ParseError, Parser, TokenKind};

impl Parser<'_> {
    pub(crate) fn parse_pattern(&mut self) -> Result<PatId, ParseError> {
        ensure_sufficient_stack(|| {
            if let TokenKind::Name(name) = self.current_kind() {
                let start = self.advance().span;
                let mut args = Vec::new();
                while self.starts_pattern_atom() {
                    args.push(self.parse_pattern_atom()?);
                }
                let span = start.merge(self.previous_span());
                let name = LongName::parse(name);
                return Ok(self.module.alloc_pattern(PatternKind::Name { name, args }, span));
            }
            self.parse_pattern_atom()
        })
    }

    fn starts_pattern_atom(&self) -> bool {
        matches!(
            self.current_kind(),
            TokenKind::Underscore | TokenKind::Number(_) | TokenKind::Name(_) | TokenKind::LParen
        )
    }

    fn parse_pattern_atom(&mut self) -> Result<PatId, ParseError> {
        let span = self.current_span();
        let kind = match self.current_kind() {
            TokenKind::Underscore => PatternKind::Wildcard,
            TokenKind::Number(n) => PatternKind::Number(*n),
            TokenKind::Name(name) => PatternKind::Name {
                name: LongName::parse(name),
                args: Vec::new(),
            },
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_pattern()?;
                self.expect(&TokenKind::RParen)?;
                return Ok(inner);
            }
            _ => return Err(self.expected("a pattern")),
        };
        self.advance();
        Ok(self.module.alloc_pattern(kind, span))
    }
}
