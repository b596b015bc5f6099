//! Template evaluator.
//!
//! Walks a token run left to right with an explicit position.  Each
//! directive handler returns the text it produced together with the
//! position to resume from, which may jump past a whole nested block.
//! Loop bodies, branches and loop ranges are evaluated by recursing on
//! sub-slices of the same token sequence; nothing is re-lexed.
//!
//! The [`Environment`] is borrowed mutably for the whole call graph, so a
//! `..define::` inside a loop or branch stays visible after the block ends.

use std::borrow::Cow;

use tracing::debug;

use super::block::{after_line, line_end, split_block};
use super::token::{Token, TokenKind, ITERATION_MARKER};
use super::value::Value;
use crate::env::Environment;
use crate::error::{Error, Result};

/// Output of one handler and where evaluation continues.
#[derive(Debug)]
struct Step<'t> {
    output: Cow<'t, str>,
    next: usize,
}

impl<'t> Step<'t> {
    fn emit(text: &'t str, next: usize) -> Self {
        Self { output: Cow::Borrowed(text), next }
    }

    fn owned(text: String, next: usize) -> Self {
        Self { output: Cow::Owned(text), next }
    }

    fn skip(next: usize) -> Self {
        Self { output: Cow::Borrowed(""), next }
    }
}

/// Expands token runs against a mutable environment.
#[derive(Debug)]
pub struct Evaluator<'env> {
    env: &'env mut Environment,
}

impl<'env> Evaluator<'env> {
    pub fn new(env: &'env mut Environment) -> Self {
        Self { env }
    }

    /// Expand `tokens`, substituting `..it::` with `loop_index` when set.
    pub fn eval(&mut self, tokens: &[Token], loop_index: Option<i64>) -> Result<String> {
        self.eval_run(tokens, loop_index, false)
    }

    /// `line_start` tells whether the run begins right after a line break,
    /// which is true for block bodies.
    fn eval_run(
        &mut self,
        tokens: &[Token],
        loop_index: Option<i64>,
        line_start: bool,
    ) -> Result<String> {
        let mut out = String::new();
        let mut pos = 0;
        while let Some(tok) = tokens.get(pos) {
            let step = match tok.kind {
                TokenKind::Comment => Step::skip(line_end(tokens, pos)),
                TokenKind::Space | TokenKind::Newline => {
                    // Indentation and whitespace-only lines vanish.
                    let prev = tokens[..pos].iter().rposition(|t| t.kind != TokenKind::Space);
                    let after_break = match prev {
                        Some(prev) => tokens[prev].kind == TokenKind::Newline,
                        None => line_start,
                    };
                    if after_break {
                        Step::skip(pos + 1)
                    } else {
                        Step::emit(&tok.text, pos + 1)
                    }
                }
                TokenKind::Define => self.eval_define(tokens, pos)?,
                TokenKind::Undef => self.eval_undef(tokens, pos)?,
                TokenKind::Var => self.eval_var(tokens, pos, loop_index)?,
                TokenKind::For => self.eval_for(tokens, pos, loop_index)?,
                TokenKind::If | TokenKind::IfNot => self.eval_if(tokens, pos, loop_index)?,
                _ => Step::emit(&tok.text, pos + 1),
            };
            out.push_str(&step.output);
            pos = step.next;
        }
        Ok(out)
    }

    // ── Definitions ──────────────────────────────────────────────────────────

    /// `..define:: name value`: binds the typed value of the second word.
    fn eval_define<'t>(&mut self, tokens: &'t [Token], pos: usize) -> Result<Step<'t>> {
        let directive = &tokens[pos];
        let mut words = line_words(tokens, pos + 1);
        let key = words.next().ok_or_else(|| Error::MalformedDirective {
            directive: directive.kind.directive(),
            offset: directive.offset,
            reason: "missing variable name".to_owned(),
        })?;
        let value = words.next().ok_or_else(|| Error::MalformedDirective {
            directive: directive.kind.directive(),
            offset: directive.offset,
            reason: format!("missing value for '{}'", key.text),
        })?;

        let value = value.value();
        debug!(name = %key.text, %value, "define");
        self.env.set(key.text.clone(), value);
        Ok(Step::skip(after_line(tokens, pos)))
    }

    /// `..undef:: name`: the name must currently be bound.
    fn eval_undef<'t>(&mut self, tokens: &'t [Token], pos: usize) -> Result<Step<'t>> {
        let directive = &tokens[pos];
        let key = line_words(tokens, pos + 1).next().ok_or_else(|| Error::MalformedDirective {
            directive: directive.kind.directive(),
            offset: directive.offset,
            reason: "missing variable name".to_owned(),
        })?;

        if self.env.unset(&key.text).is_none() {
            return Err(Error::UndefinedKey { key: key.text.clone(), offset: key.offset });
        }
        debug!(name = %key.text, "undef");
        Ok(Step::skip(after_line(tokens, pos)))
    }

    // ── Substitution ─────────────────────────────────────────────────────────

    fn eval_var<'t>(
        &mut self,
        tokens: &'t [Token],
        pos: usize,
        loop_index: Option<i64>,
    ) -> Result<Step<'t>> {
        let tok = &tokens[pos];

        if let (Some(lb), Some(_), Some(rb)) =
            (tokens.get(pos + 1), tokens.get(pos + 2), tokens.get(pos + 3))
        {
            if lb.kind == TokenKind::LBracket && rb.kind == TokenKind::RBracket {
                return self.eval_indexed(tokens, pos, loop_index);
            }
        }

        let output = if tok.is_iteration_marker() {
            match loop_index {
                Some(i) => Cow::Owned(i.to_string()),
                None => Cow::Borrowed(tok.text.as_str()),
            }
        } else {
            match self.env.get(tok.var_name()) {
                Some(value) => Cow::Owned(value.to_string()),
                None => Cow::Borrowed(tok.text.as_str()),
            }
        };
        Ok(Step { output, next: pos + 1 })
    }

    /// `..name::[index]` where `index` is a literal integer, or `..it::`
    /// which stands for the loop index itself without any lookup.
    fn eval_indexed<'t>(
        &self,
        tokens: &'t [Token],
        pos: usize,
        loop_index: Option<i64>,
    ) -> Result<Step<'t>> {
        let span = &tokens[pos..pos + 4];
        let next = pos + span.len();
        let name = span[0].var_name();
        let index = &span[2];

        if index.is_iteration_marker() {
            return Ok(match loop_index {
                Some(i) => Step::owned(i.to_string(), next),
                None => Step::emit(ITERATION_MARKER, next),
            });
        }
        let index_error = |reason: String| Error::Index {
            name: name.to_owned(),
            index: index.text.clone(),
            reason,
            offset: index.offset,
        };

        let i: i64 = if index.kind == TokenKind::Number {
            index
                .text
                .parse()
                .map_err(|_| index_error("index does not fit in an integer".to_owned()))?
        } else {
            return Err(Error::TypeMismatch {
                expected: "integer index",
                found: format!("{} {:?}", index.kind, index.text),
                offset: index.offset,
            });
        };

        // Unbound names render verbatim, brackets included.
        let Some(value) = self.env.get(name) else {
            let verbatim: String = span.iter().map(|t| t.text.as_str()).collect();
            return Ok(Step::owned(verbatim, next));
        };
        let items = value
            .as_list()
            .ok_or_else(|| index_error(format!("{} is not a sequence", value.type_name())))?;
        let item = usize::try_from(i)
            .ok()
            .and_then(|i| items.get(i))
            .ok_or_else(|| index_error(format!("out of bounds for length {}", items.len())))?;
        Ok(Step::owned(item.to_string(), next))
    }

    // ── Blocks ───────────────────────────────────────────────────────────────

    /// `..for:: <range>` … `..end::`: the range is itself expanded and must
    /// yield two integers; the end bound is exclusive.
    fn eval_for<'t>(
        &mut self,
        tokens: &'t [Token],
        pos: usize,
        loop_index: Option<i64>,
    ) -> Result<Step<'t>> {
        let block = split_block(tokens, pos)?;
        let range = self.eval_run(block.header, loop_index, false)?;
        let (start, end) = parse_range(&range).ok_or_else(|| Error::NonIntegerRange {
            text: range.trim().to_owned(),
            offset: tokens[pos].offset,
        })?;

        debug!(start, end, offset = tokens[pos].offset, "expanding loop");
        let mut out = String::new();
        for i in start..end {
            out.push_str(&self.eval_run(block.body, Some(i), true)?);
        }
        Ok(Step::owned(out, block.next))
    }

    /// `..if::` / `..ifnot::`: exactly one branch is expanded.
    fn eval_if<'t>(
        &mut self,
        tokens: &'t [Token],
        pos: usize,
        loop_index: Option<i64>,
    ) -> Result<Step<'t>> {
        let directive = &tokens[pos];
        let block = split_block(tokens, pos)?;
        let mut holds = self.condition(block.header, directive)?;
        if directive.kind == TokenKind::IfNot {
            holds = !holds;
        }

        debug!(kind = %directive.kind, holds, offset = directive.offset, "conditional");
        let branch = if holds { Some(block.body) } else { block.alternative };
        let out = match branch {
            Some(body) => self.eval_run(body, loop_index, true)?,
            None => String::new(),
        };
        Ok(Step::owned(out, block.next))
    }

    /// Single-token truthiness: literals as-is, identifiers via the
    /// environment, anything else by its typed value.
    fn condition(&self, header: &[Token], directive: &Token) -> Result<bool> {
        let tok = header
            .iter()
            .find(|t| t.kind != TokenKind::Space)
            .ok_or_else(|| Error::MalformedDirective {
                directive: directive.kind.directive(),
                offset: directive.offset,
                reason: "missing condition".to_owned(),
            })?;
        Ok(match tok.kind {
            TokenKind::True => true,
            TokenKind::False => false,
            TokenKind::Identifier => self.env.get(&tok.text).is_some_and(Value::is_truthy),
            _ => tok.value().is_truthy(),
        })
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Non-space tokens from `from` up to the end of the line.
fn line_words(tokens: &[Token], from: usize) -> impl Iterator<Item = &Token> {
    let end = line_end(tokens, from);
    tokens
        .get(from..end)
        .unwrap_or_default()
        .iter()
        .filter(|t| t.kind != TokenKind::Space)
}

/// Parse `"<start> <end>"` into integer bounds.
fn parse_range(text: &str) -> Option<(i64, i64)> {
    let mut words = text.split_whitespace();
    let start = words.next()?.parse().ok()?;
    let end = words.next()?.parse().ok()?;
    words.next().is_none().then_some((start, end))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
