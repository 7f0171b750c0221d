//! Resynchronisation after syntax errors.
//!
//! Each helper skips tokens while tracking bracket depth, so a recovery
//! never stops inside a nested group.

use crate::{Parser, TokenKind};

impl Parser<'_> {
    /// Skip to the next module-level keyword, `\where`, an unmatched `}`,
    /// or the end of input.
    pub(crate) fn synchronize_statement(&mut self) {
        self.skip_until(|kind| kind.starts_statement() || matches!(kind, TokenKind::Where));
    }

    /// Skip to the next clause, constructor or field bar.
    pub(crate) fn synchronize_clause(&mut self) {
        self.skip_until(|kind| {
            kind.starts_statement() || matches!(kind, TokenKind::Where | TokenKind::Pipe)
        });
    }

    /// Skip past the `close` delimiter matching an already consumed opener.
    ///
    /// Stops without consuming at a module-level keyword so that a missing
    /// delimiter does not swallow the rest of the module.
    pub(crate) fn skip_to_closing(&mut self, close: &TokenKind) {
        let mut depth = 0usize;
        loop {
            let kind = self.current_kind();
            match kind {
                TokenKind::Eof => return,
                kind if kind.starts_statement() || matches!(kind, TokenKind::Where) => return,
                TokenKind::LParen | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBrace => {
                    if depth == 0 {
                        if kind == close {
                            self.advance();
                        }
                        return;
                    }
                    depth -= 1;
                }
                _ => {}
            }
            self.advance();
        }
    }

    /// Skip tokens at bracket depth zero until `stop` holds or an unmatched
    /// closing brace is reached.
    fn skip_until(&mut self, stop: impl Fn(&TokenKind) -> bool) {
        let mut depth = 0usize;
        loop {
            let kind = self.current_kind();
            match kind {
                TokenKind::Eof => return,
                kind if depth == 0 && stop(kind) => return,
                TokenKind::LParen | TokenKind::LBrace => depth += 1,
                TokenKind::RParen => depth = depth.saturating_sub(1),
                TokenKind::RBrace => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                }
                _ => {}
            }
            self.advance();
        }
    }
}
