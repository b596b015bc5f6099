//! Lexical units produced by the lexer.

use std::fmt;

use super::value::Value;

/// The iteration marker: stands for the active loop index.
pub const ITERATION_MARKER: &str = "..it::";

/// Classification of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Newline,
    Space,
    Comment,
    Number,
    True,
    False,
    Equal,
    Plus,
    Minus,
    Mult,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Define,
    For,
    Undef,
    If,
    IfNot,
    Else,
    End,
    /// Generic `..name::` reference.
    Var,
    Identifier,
}

impl TokenKind {
    /// Upper-case name used in diagnostics and token dumps.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Newline => "NEWLINE",
            TokenKind::Space => "SPACE",
            TokenKind::Comment => "COMMENT",
            TokenKind::Number => "NUMBER",
            TokenKind::True => "TRUE",
            TokenKind::False => "FALSE",
            TokenKind::Equal => "EQUAL",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Mult => "MULT",
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
            TokenKind::LBracket => "LBRACKET",
            TokenKind::RBracket => "RBRACKET",
            TokenKind::Define => "DEFINE",
            TokenKind::For => "FOR",
            TokenKind::Undef => "UNDEF",
            TokenKind::If => "IF",
            TokenKind::IfNot => "IFNOT",
            TokenKind::Else => "ELSE",
            TokenKind::End => "END",
            TokenKind::Var => "VAR",
            TokenKind::Identifier => "IDENTIFIER",
        }
    }

    /// Source spelling of a reserved directive, or the kind name otherwise.
    pub fn directive(self) -> &'static str {
        match self {
            TokenKind::Define => "..define::",
            TokenKind::For => "..for::",
            TokenKind::Undef => "..undef::",
            TokenKind::If => "..if::",
            TokenKind::IfNot => "..ifnot::",
            TokenKind::Else => "..else::",
            TokenKind::End => "..end::",
            other => other.name(),
        }
    }

    /// Directives that open a block closed by `..end::`.
    pub fn opens_block(self) -> bool {
        matches!(self, TokenKind::For | TokenKind::If | TokenKind::IfNot)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One classified slice of the template source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Byte offset of the first character in the source buffer.
    pub offset: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, offset: usize) -> Self {
        Self { kind, text: text.into(), offset }
    }

    /// The token reinterpreted as a typed value.
    ///
    /// `NUMBER` becomes an integer (or stays a string if it does not fit in
    /// `i64`), `TRUE`/`FALSE` become booleans, everything else is its text.
    pub fn value(&self) -> Value {
        match self.kind {
            TokenKind::Number => self
                .text
                .parse::<i64>()
                .map_or_else(|_| Value::Str(self.text.clone()), Value::Int),
            TokenKind::True => Value::Bool(true),
            TokenKind::False => Value::Bool(false),
            _ => Value::Str(self.text.clone()),
        }
    }

    /// For a `VAR` token, the bare name between the delimiters.
    pub fn var_name(&self) -> &str {
        self.text
            .strip_prefix("..")
            .and_then(|s| s.strip_suffix("::"))
            .unwrap_or(&self.text)
    }

    pub fn is_iteration_marker(&self) -> bool {
        self.kind == TokenKind::Var && self.text == ITERATION_MARKER
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Newline | TokenKind::Space => write!(f, "{}", self.kind),
            _ => write!(f, "{}({})", self.kind, self.text),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
