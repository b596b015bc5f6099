//! Template language.
//!
//! Literal text passes through unchanged except for directives, which are
//! delimited by two leading dots and two trailing colons:
//!
//! | Directive | Meaning |
//! |-----------|---------|
//! | `..name::` | Value of `name`, or the directive text itself if unbound |
//! | `..name::[n]` | Element `n` of the sequence bound to `name` |
//! | `..it::` | Index of the innermost active loop |
//! | `..name::[..it::]` | Same as `..it::`; the sequence is not consulted |
//! | `..define:: name value` | Bind `name` for the rest of the evaluation |
//! | `..undef:: name` | Remove a binding (it must exist) |
//! | `..for:: start end` … `..end::` | Repeat the body for `start..end` |
//! | `..if:: cond` … `..else::` … `..end::` | Conditional; `..ifnot::` negates |
//! | `# …` | Comment to end of line |
//!
//! # Quick start
//!
//! ```rust
//! use monaco::{Environment, Template};
//!
//! let mut env = Environment::new();
//! env.set("r", vec![10i64, 20, 30]);
//! let tpl = Template::parse("..for:: 0 3\nR..it:: ..r::[2]\n..end::").unwrap();
//! assert_eq!(tpl.render(&env).unwrap(), "R0 30R1 30R2 30");
//! ```

pub mod block;
pub mod eval;
pub mod lexer;
pub mod token;
pub mod value;

use std::path::Path;
use std::str::FromStr;

use crate::env::Environment;
use crate::error::{Error, Result};

pub use eval::Evaluator;
pub use lexer::{tokenize, Lexer};
pub use token::{Token, TokenKind, ITERATION_MARKER};
pub use value::Value;

/// A lexed template, ready to be rendered any number of times.
#[derive(Debug, Clone)]
pub struct Template {
    tokens: Vec<Token>,
}

impl Template {
    /// Lex `src` once.
    pub fn parse(src: &str) -> Result<Self> {
        Ok(Self { tokens: tokenize(src)? })
    }

    /// Read and lex a UTF-8 template file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path)
            .map_err(|source| Error::Io { path: path.to_path_buf(), source })?;
        Self::parse(&src)
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Render against a private copy of `env`; the caller's map is untouched.
    pub fn render(&self, env: &Environment) -> Result<String> {
        let mut env = env.clone();
        self.render_in(&mut env)
    }

    /// Render directly against `env`, keeping `..define::`/`..undef::` effects.
    #[tracing::instrument(skip_all, level = "debug", fields(tokens = self.tokens.len()))]
    pub fn render_in(&self, env: &mut Environment) -> Result<String> {
        Evaluator::new(env).eval(&self.tokens, None)
    }
}

impl FromStr for Template {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Lex and render `src` in one step.
pub fn evaluate(src: &str, env: &Environment) -> Result<String> {
    Template::parse(src)?.render(env)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn render_does_not_mutate_caller_env() {
        let env: Environment = [("x", 1i64)].into_iter().collect();
        let tpl = Template::parse("..undef:: x\n..define:: y 2\n").unwrap();
        assert_eq!(tpl.render(&env).unwrap(), "");
        assert_eq!(env.get("x"), Some(&Value::Int(1)));
        assert!(!env.contains("y"));
    }

    #[test]
    fn render_in_keeps_side_effects() {
        let mut env = Environment::new();
        Template::parse("..define:: y 2\n").unwrap().render_in(&mut env).unwrap();
        assert_eq!(env.get("y"), Some(&Value::Int(2)));
    }

    #[test]
    fn template_is_reusable() {
        let tpl: Template = "v=..v::".parse().unwrap();
        let a: Environment = [("v", 1i64)].into_iter().collect();
        let b: Environment = [("v", 2i64)].into_iter().collect();
        assert_eq!(tpl.render(&a).unwrap(), "v=1");
        assert_eq!(tpl.render(&b).unwrap(), "v=2");
    }

    #[test]
    fn from_path_reads_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "temp ..t::").unwrap();
        let tpl = Template::from_path(f.path()).unwrap();
        let env: Environment = [("t", 27i64)].into_iter().collect();
        assert_eq!(tpl.render(&env).unwrap(), "temp 27");
    }

    #[test]
    fn from_path_missing_file() {
        let err = Template::from_path("/nonexistent/monaco.tpl").unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn lex_error_surfaces_from_evaluate() {
        let err = evaluate("a.b", &Environment::new()).unwrap_err();
        assert_eq!(err.offset(), Some(1));
    }
}
