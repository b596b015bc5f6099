//! Block extraction over an already-lexed token run.
//!
//! A block opens with `..for::`, `..if::` or `..ifnot::`, runs its header up
//! to the first line break, and is closed by the `..end::` at the same
//! nesting depth.  Only an `..else::` at depth 1 splits the body; deeper
//! ones belong to nested blocks.  Directives inside `#` comments are not
//! counted.

use super::token::{Token, TokenKind};
use crate::error::{Error, Result};

/// The pieces of one block, borrowed from the enclosing token run.
#[derive(Debug, Clone, Copy)]
pub struct Block<'t> {
    /// Tokens between the directive and the end of its line.
    pub header: &'t [Token],
    /// Loop body, or the branch taken when the condition holds.
    pub body: &'t [Token],
    /// The `..else::` branch, if present.
    pub alternative: Option<&'t [Token]>,
    /// Position just past the matching `..end::`.
    pub next: usize,
}

/// Index of the first line break at or after `from`, or `tokens.len()`.
pub fn line_end(tokens: &[Token], from: usize) -> usize {
    tokens
        .iter()
        .skip(from)
        .position(|t| t.kind == TokenKind::Newline)
        .map_or(tokens.len(), |i| from + i)
}

/// Position just past the line break ending the line that contains `from`.
pub fn after_line(tokens: &[Token], from: usize) -> usize {
    (line_end(tokens, from) + 1).min(tokens.len())
}

/// Split the block whose opening directive sits at `pos`.
pub fn split_block(tokens: &[Token], pos: usize) -> Result<Block<'_>> {
    let opener = &tokens[pos];
    let malformed = |reason: &str| Error::MalformedDirective {
        directive: opener.kind.directive(),
        offset: opener.offset,
        reason: reason.to_owned(),
    };

    let header_end = line_end(tokens, pos + 1);
    if header_end == tokens.len() {
        return Err(malformed("expected a line break after the header"));
    }
    let body_start = header_end + 1;

    let mut depth = 1usize;
    let mut else_at = None;
    let mut end_at = None;
    let mut i = body_start;
    while let Some(tok) = tokens.get(i) {
        match tok.kind {
            TokenKind::Comment => {
                i = line_end(tokens, i);
                continue;
            }
            k if k.opens_block() => depth += 1,
            TokenKind::Else if depth == 1 => {
                if opener.kind == TokenKind::For {
                    return Err(malformed("..else:: is not allowed in a loop body"));
                }
                if else_at.is_some() {
                    return Err(malformed("more than one ..else:: branch"));
                }
                else_at = Some(i);
            }
            TokenKind::End => {
                depth -= 1;
                if depth == 0 {
                    end_at = Some(i);
                    break;
                }
            }
            _ => {}
        }
        i += 1;
    }
    let end_at = end_at.ok_or_else(|| malformed("missing matching ..end::"))?;

    let body = trim_tail(&tokens[body_start..else_at.unwrap_or(end_at)]);
    let alternative = else_at.map(|e| trim_tail(&tokens[skip_line_break(tokens, e + 1)..end_at]));

    Ok(Block {
        header: &tokens[pos + 1..header_end],
        body,
        alternative,
        next: end_at + 1,
    })
}

/// Skip trailing spaces and one line break directly after a directive.
fn skip_line_break(tokens: &[Token], from: usize) -> usize {
    let mut i = from;
    while tokens.get(i).is_some_and(|t| t.kind == TokenKind::Space) {
        i += 1;
    }
    match tokens.get(i) {
        Some(t) if t.kind == TokenKind::Newline => i + 1,
        _ => from,
    }
}

/// Drop the line break (and indentation) that precedes a closing directive,
/// along with any whitespace-only lines just above it.
fn trim_tail(body: &[Token]) -> &[Token] {
    let mut end = body.len();
    loop {
        let content = body[..end]
            .iter()
            .rposition(|t| t.kind != TokenKind::Space)
            .map_or(0, |i| i + 1);
        match body[..content].last() {
            Some(t) if t.kind == TokenKind::Newline => end = content - 1,
            _ => break,
        }
    }
    &body[..end]
}

// ── Tests ─────────────────────────────────────────────────────────────────────
