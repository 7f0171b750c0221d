//! Lexer and recursive descent parser for Arend modules.
//!
//! Produces a [`ConcreteModule`] whose expressions and patterns live in flat
//! arenas. Syntax errors never abort the parse: each one becomes a
//! `SyntaxError` diagnostic, the enclosing definition is marked erroneous,
//! and parsing resumes at the closing delimiter or the next module-level
//! keyword.
//!
//! Operator sequences are kept flat ([`ExprKind::Seq`](arend_ir::ExprKind)):
//! association needs fixities, which are only known after resolution.
//!
//! # Salsa Compatibility
//!
//! [`ParseOutput`] derives Clone, Eq, Hash and Debug so it can be the result
//! of a tracked query; an edit that re-parses to the same module is cut off.

mod cursor;
mod error;
mod grammar;
pub mod lexer;
mod recovery;

pub use cursor::Cursor;
pub use error::ParseError;
pub use lexer::{lex, Token, TokenKind, TokenList};

use arend_diagnostic::Diagnostic;
use arend_ir::{ConcreteModule, ModulePath, Span};

/// Result of parsing one module.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ParseOutput {
    pub module: ConcreteModule,
    /// Syntax errors, in source order.
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseOutput {
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Parse the source text of the module at `path`.
#[tracing::instrument(level = "debug", skip(source), fields(len = source.len()))]
pub fn parse(path: ModulePath, source: &str) -> ParseOutput {
    let tokens = lex(source);
    let mut parser = Parser::new(&tokens.tokens, path);
    for error in &tokens.errors {
        parser.report(ParseError::new(error.message.clone(), error.span));
    }
    parser.parse_module()
}

/// Parser state.
pub struct Parser<'a> {
    cursor: Cursor<'a>,
    module: ConcreteModule,
    errors: Vec<ParseError>,
    /// Set when an error is recovered inside the definition being parsed.
    def_erroneous: bool,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token], path: ModulePath) -> Self {
        Parser {
            cursor: Cursor::new(tokens),
            module: ConcreteModule::new(path),
            errors: Vec::new(),
            def_erroneous: false,
        }
    }

    #[inline]
    fn current_kind(&self) -> &'a TokenKind {
        self.cursor.current_kind()
    }

    #[inline]
    fn current_span(&self) -> Span {
        self.cursor.current_span()
    }

    #[inline]
    fn previous_span(&self) -> Span {
        self.cursor.previous_span()
    }

    #[inline]
    fn is_at_end(&self) -> bool {
        self.cursor.is_at_end()
    }

    #[inline]
    fn check(&self, kind: &TokenKind) -> bool {
        self.cursor.check(kind)
    }

    #[inline]
    fn advance(&mut self) -> &'a Token {
        self.cursor.advance()
    }

    #[inline]
    fn eat(&mut self, kind: &TokenKind) -> bool {
        self.cursor.eat(kind)
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<Span, ParseError> {
        if self.check(kind) {
            Ok(self.advance().span)
        } else {
            Err(self.expected(&format!("`{kind}`")))
        }
    }

    /// Error for an unexpected current token.
    fn expected(&self, what: &str) -> ParseError {
        ParseError::new(
            format!("expected {what}, found `{}`", self.current_kind()),
            self.current_span(),
        )
    }

    fn report(&mut self, error: ParseError) {
        tracing::trace!(message = %error.message, span = ?error.span, "syntax error");
        self.errors.push(error);
    }

    /// Report an error recovered inside the current definition.
    fn recover(&mut self, error: ParseError) {
        self.report(error);
        self.def_erroneous = true;
    }

    /// Parse a whole module.
    pub fn parse_module(mut self) -> ParseOutput {
        while !self.is_at_end() {
            match self.current_kind() {
                TokenKind::Import => match self.parse_import() {
                    Ok(import) => self.module.imports.push(import),
                    Err(error) => {
                        self.report(error);
                        self.synchronize_statement();
                    }
                },
                TokenKind::Open => match self.parse_open() {
                    Ok(open) => self.module.opens.push(open),
                    Err(error) => {
                        self.report(error);
                        self.synchronize_statement();
                    }
                },
                kind if grammar::starts_definition(kind) => {
                    if let Some(index) = self.parse_definition(None) {
                        self.module.top_level.push(index);
                    }
                }
                _ => {
                    let error = self.expected("a definition");
                    self.report(error);
                    self.advance();
                    self.synchronize_statement();
                }
            }
        }

        let path = self.module.path.clone();
        let mut errors = self.errors;
        errors.sort_by_key(|error| error.span.start);
        let diagnostics = errors
            .into_iter()
            .map(|error| error.into_diagnostic(path.clone()))
            .collect();
        ParseOutput {
            module: self.module,
            diagnostics,
        }
    }
}

#[cfg(test)]
mod tests;
