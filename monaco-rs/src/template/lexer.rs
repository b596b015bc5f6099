//! Template lexer.
//!
//! Splits a buffer into [`Token`]s by trying a fixed, prioritised list of
//! rules at the scan cursor and taking the first one that matches there.
//! Matching is purely local to the cursor; order matters:
//!
//! | Priority | Kind | Pattern |
//! |----------|------|---------|
//! | 1 | `NEWLINE` | `[\r\n]+` |
//! | 2 | `SPACE` | horizontal whitespace |
//! | 3 | `COMMENT` | `#+` |
//! | 4 | `NUMBER` | `[0-9]+` |
//! | 5–6 | `TRUE` / `FALSE` | `true` / `false`, any case |
//! | 7–14 | operators | `=` `+` `-` `*` `(` `)` `[` `]` |
//! | 15–21 | directives | `..define::` `..for::` `..undef::` `..if::` `..ifnot::` `..else::` `..end::` |
//! | 22 | `VAR` | `..` word-characters `::` |
//! | 23 | `IDENTIFIER` | `[A-Za-z0-9_]+` |

use std::sync::OnceLock;

use regex::Regex;
use tracing::trace;

use super::token::{Token, TokenKind};
use crate::error::{Error, Result};

const RULES: &[(&str, TokenKind)] = &[
    (r"[\r\n]+", TokenKind::Newline),
    (r"[^\S\r\n]+", TokenKind::Space),
    (r"#+", TokenKind::Comment),
    (r"[0-9]+", TokenKind::Number),
    (r"(?i:true)", TokenKind::True),
    (r"(?i:false)", TokenKind::False),
    (r"=", TokenKind::Equal),
    (r"\+", TokenKind::Plus),
    (r"-", TokenKind::Minus),
    (r"\*", TokenKind::Mult),
    (r"\(", TokenKind::LParen),
    (r"\)", TokenKind::RParen),
    (r"\[", TokenKind::LBracket),
    (r"\]", TokenKind::RBracket),
    (r"\.\.define::", TokenKind::Define),
    (r"\.\.for::", TokenKind::For),
    (r"\.\.undef::", TokenKind::Undef),
    (r"\.\.if::", TokenKind::If),
    (r"\.\.ifnot::", TokenKind::IfNot),
    (r"\.\.else::", TokenKind::Else),
    (r"\.\.end::", TokenKind::End),
    (r"\.\.\w+::", TokenKind::Var),
    (r"[A-Za-z0-9_]+", TokenKind::Identifier),
];

/// Compiled rule table, anchored at the start of the remaining input.
fn rules() -> &'static [(Regex, TokenKind)] {
    static COMPILED: OnceLock<Vec<(Regex, TokenKind)>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        RULES
            .iter()
            .map(|&(pat, kind)| {
                let re = Regex::new(&format!(r"\A(?:{pat})"))
                    .expect("lexer rules are valid regular expressions");
                (re, kind)
            })
            .collect()
    })
}

/// Scanner over a template buffer.  Yields tokens until the input is
/// exhausted, or a single [`Error::Lex`] at the first unmatched byte.
#[derive(Debug)]
pub struct Lexer<'src> {
    src: &'src str,
    pos: usize,
    failed: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(src: &'src str) -> Self {
        Self { src, pos: 0, failed: false }
    }

    /// Current byte offset of the scan cursor.
    pub fn position(&self) -> usize {
        self.pos
    }

    fn next_token(&mut self) -> Result<Token> {
        let rest = &self.src[self.pos..];
        for (re, kind) in rules() {
            // Every rule matches at least one byte, so the cursor always advances.
            if let Some(m) = re.find(rest) {
                let tok = Token::new(*kind, m.as_str(), self.pos);
                self.pos += m.end();
                return Ok(tok);
            }
        }
        let snippet = rest.chars().next().map(String::from).unwrap_or_default();
        Err(Error::Lex { offset: self.pos, snippet })
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.src.len() {
            return None;
        }
        let tok = self.next_token();
        self.failed = tok.is_err();
        Some(tok)
    }
}

/// Lex the whole buffer.
pub fn tokenize(src: &str) -> Result<Vec<Token>> {
    let tokens = Lexer::new(src).collect::<Result<Vec<_>>>()?;
    trace!(bytes = src.len(), tokens = tokens.len(), "lexed template");
    Ok(tokens)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
