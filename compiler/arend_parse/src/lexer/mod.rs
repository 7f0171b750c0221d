//! Tokenizer.
//!
//! A `logos` automaton recognises raw tokens; [`lex`] converts them into
//! owned [`Token`]s with spans and turns unrecognised input into recovered
//! syntax errors instead of aborting.

use std::fmt;

use arend_ir::Span;
use logos::Logos;

#[derive(Logos, Clone, Debug, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum RawToken {
    #[regex(r"--[^\n]*", logos::skip)]
    LineComment,
    #[token("{-", block_comment)]
    BlockComment,

    #[token("\\import")]
    Import,
    #[token("\\open")]
    Open,
    #[token("\\using")]
    Using,
    #[token("\\hiding")]
    Hiding,
    #[token("\\as")]
    As,
    #[token("\\func")]
    Func,
    #[token("\\data")]
    Data,
    #[token("\\class")]
    Class,
    #[token("\\instance")]
    Instance,
    #[token("\\meta")]
    Meta,
    #[token("\\where")]
    Where,
    #[token("\\elim")]
    Elim,
    #[token("\\lam")]
    Lam,
    #[token("\\Pi")]
    Pi,
    #[token("\\Type")]
    Type,
    #[token("\\alias")]
    Alias,
    #[token("\\infix")]
    Infix,
    #[token("\\infixl")]
    Infixl,
    #[token("\\infixr")]
    Infixr,
    #[token("\\fix")]
    Fix,
    #[token("\\fixl")]
    Fixl,
    #[token("\\fixr")]
    Fixr,
    #[token("\\postfix")]
    Postfix,
    #[regex(r"\\[A-Za-z]+")]
    UnknownKeyword,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(":", priority = 10)]
    Colon,
    #[token("|", priority = 10)]
    Pipe,
    #[token("=>", priority = 10)]
    FatArrow,
    #[token("->", priority = 10)]
    Arrow,
    #[token("_", priority = 10)]
    Underscore,
    #[token("`")]
    Backquote,

    #[regex(r"[0-9]+")]
    Number,
    #[regex(r"[A-Za-z_][A-Za-z0-9_']*(\.[A-Za-z_][A-Za-z0-9_']*)*")]
    Name,
    #[regex(r"[~!@#$%^&*\-+=<>?/|:;]+")]
    Symbol,
}

/// Consume a possibly nested `{- ... -}` comment after its opening `{-`.
fn block_comment(lex: &mut logos::Lexer<RawToken>) -> bool {
    let bytes = lex.remainder().as_bytes();
    let mut depth = 1usize;
    let mut i = 0;
    while i + 1 < bytes.len() {
        match (bytes[i], bytes[i + 1]) {
            (b'{', b'-') => {
                depth += 1;
                i += 2;
            }
            (b'-', b'}') => {
                depth -= 1;
                i += 2;
                if depth == 0 {
                    lex.bump(i);
                    return true;
                }
            }
            _ => i += 1,
        }
    }
    lex.bump(bytes.len());
    false
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum TokenKind {
    Import,
    Open,
    Using,
    Hiding,
    As,
    Func,
    Data,
    Class,
    Instance,
    Meta,
    Where,
    Elim,
    Lam,
    Pi,
    Type,
    Alias,
    Infix,
    Infixl,
    Infixr,
    Fix,
    Fixl,
    Fixr,
    Postfix,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Pipe,
    FatArrow,
    Arrow,
    Underscore,
    Backquote,
    Number(u64),
    /// Alphanumeric, possibly qualified with dots.
    Name(String),
    /// Operator-like name such as `+` or `<=`.
    Symbol(String),
    Eof,
}

impl TokenKind {
    /// Keywords that start a module-level statement; used to resynchronise
    /// after a syntax error.
    pub fn starts_statement(&self) -> bool {
        matches!(
            self,
            TokenKind::Import
                | TokenKind::Open
                | TokenKind::Func
                | TokenKind::Data
                | TokenKind::Class
                | TokenKind::Instance
                | TokenKind::Meta
        )
    }

    pub fn is_fixity_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Infix
                | TokenKind::Infixl
                | TokenKind::Infixr
                | TokenKind::Fix
                | TokenKind::Fixl
                | TokenKind::Fixr
                | TokenKind::Postfix
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::Import => "\\import",
            TokenKind::Open => "\\open",
            TokenKind::Using => "\\using",
            TokenKind::Hiding => "\\hiding",
            TokenKind::As => "\\as",
            TokenKind::Func => "\\func",
            TokenKind::Data => "\\data",
            TokenKind::Class => "\\class",
            TokenKind::Instance => "\\instance",
            TokenKind::Meta => "\\meta",
            TokenKind::Where => "\\where",
            TokenKind::Elim => "\\elim",
            TokenKind::Lam => "\\lam",
            TokenKind::Pi => "\\Pi",
            TokenKind::Type => "\\Type",
            TokenKind::Alias => "\\alias",
            TokenKind::Infix => "\\infix",
            TokenKind::Infixl => "\\infixl",
            TokenKind::Infixr => "\\infixr",
            TokenKind::Fix => "\\fix",
            TokenKind::Fixl => "\\fixl",
            TokenKind::Fixr => "\\fixr",
            TokenKind::Postfix => "\\postfix",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::Pipe => "|",
            TokenKind::FatArrow => "=>",
            TokenKind::Arrow => "->",
            TokenKind::Underscore => "_",
            TokenKind::Backquote => "`",
            TokenKind::Number(n) => return write!(f, "{n}"),
            TokenKind::Name(name) | TokenKind::Symbol(name) => return write!(f, "{name}"),
            TokenKind::Eof => "end of file",
        };
        write!(f, "{text}")
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// A lexical problem; reported as a syntax error by the parser.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct LexError {
    pub span: Span,
    pub message: String,
}

/// Output of [`lex`]: tokens terminated by a single `Eof`.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct TokenList {
    pub tokens: Vec<Token>,
    pub errors: Vec<LexError>,
}

/// Tokenize a module's source text.
pub fn lex(source: &str) -> TokenList {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let mut lexer = RawToken::lexer(source);

    while let Some(raw) = lexer.next() {
        let span = Span::from_range(lexer.span());
        let slice = lexer.slice();
        let kind = match raw {
            Ok(raw) => match convert(raw, slice) {
                Ok(Some(kind)) => kind,
                Ok(None) => continue,
                Err(message) => {
                    errors.push(LexError { span, message });
                    continue;
                }
            },
            Err(()) => {
                let message = if slice.starts_with("{-") {
                    "unterminated block comment".to_string()
                } else {
                    format!("unexpected character `{slice}`")
                };
                errors.push(LexError { span, message });
                continue;
            }
        };
        tokens.push(Token { kind, span });
    }

    let end = u32::try_from(source.len()).unwrap_or(u32::MAX);
    tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span::new(end, end),
    });
    TokenList { tokens, errors }
}

fn convert(raw: RawToken, slice: &str) -> Result<Option<TokenKind>, String> {
    let kind = match raw {
        RawToken::LineComment | RawToken::BlockComment => return Ok(None),
        RawToken::UnknownKeyword => return Err(format!("unknown keyword `{slice}`")),
        RawToken::Number => match slice.parse::<u64>() {
            Ok(value) => TokenKind::Number(value),
            Err(_) => return Err(format!("number literal `{slice}` is too large")),
        },
        RawToken::Name => TokenKind::Name(slice.to_string()),
        RawToken::Symbol => TokenKind::Symbol(slice.to_string()),
        RawToken::Import => TokenKind::Import,
        RawToken::Open => TokenKind::Open,
        RawToken::Using => TokenKind::Using,
        RawToken::Hiding => TokenKind::Hiding,
        RawToken::As => TokenKind::As,
        RawToken::Func => TokenKind::Func,
        RawToken::Data => TokenKind::Data,
        RawToken::Class => TokenKind::Class,
        RawToken::Instance => TokenKind::Instance,
        RawToken::Meta => TokenKind::Meta,
        RawToken::Where => TokenKind::Where,
        RawToken::Elim => TokenKind::Elim,
        RawToken::Lam => TokenKind::Lam,
        RawToken::Pi => TokenKind::Pi,
        RawToken::Type => TokenKind::Type,
        RawToken::Alias => TokenKind::Alias,
        RawToken::Infix => TokenKind::Infix,
        RawToken::Infixl => TokenKind::Infixl,
        RawToken::Infixr => TokenKind::Infixr,
        RawToken::Fix => TokenKind::Fix,
        RawToken::Fixl => TokenKind::Fixl,
        RawToken::Fixr => TokenKind::Fixr,
        RawToken::Postfix => TokenKind::Postfix,
        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Pipe => TokenKind::Pipe,
        RawToken::FatArrow => TokenKind::FatArrow,
        RawToken::Arrow => TokenKind::Arrow,
        RawToken::Underscore => TokenKind::Underscore,
        RawToken::Backquote => TokenKind::Backquote,
    };
    Ok(Some(kind))
}
