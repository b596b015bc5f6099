//! Environment file parser.
//!
//! One binding per line, in the same shape as simulation parameter files:
//!
//! | Line | Binding |
//! |------|---------|
//! | `temp 27` | `temp` = integer `27` |
//! | `corner "slow slow"` | `corner` = string `slow slow` |
//! | `widths 1.0 2.5 4` | `widths` = list `[1.0, 2.5, 4]` |
//! | `# comment` | ignored |
//!
//! Values are cast with [`Value::parse_literal`].

use std::path::Path;

use crate::env::Environment;
use crate::template::Value;

// ── Public API ────────────────────────────────────────────────────────────────

/// A non-fatal error encountered while loading an environment file.
#[derive(Debug)]
pub struct ConfigError {
    pub line: usize,
    pub message: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Loader for environment files.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvFile;

impl EnvFile {
    /// Parse environment file text.
    ///
    /// Bad lines are skipped and reported so the rest of the file still
    /// loads.  Later lines override earlier ones.
    pub fn load_str(s: &str) -> (Environment, Vec<ConfigError>) {
        let mut env = Environment::new();
        let mut errors = Vec::new();

        for (i, raw) in s.lines().enumerate() {
            let lineno = i + 1;
            let line = raw.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut words = split_args(line).into_iter();
            let Some(name) = words.next() else { continue };
            if let Err(msg) = check_name(&name) {
                errors.push(ConfigError { line: lineno, message: msg });
                continue;
            }

            let mut values: Vec<Value> = words.map(|w| Value::parse_literal(&w)).collect();
            let value = match values.len() {
                0 => {
                    errors.push(ConfigError {
                        line: lineno,
                        message: format!("missing value for '{name}'"),
                    });
                    continue;
                }
                1 => values.remove(0),
                _ => Value::List(values),
            };
            env.set(name, value);
        }

        (env, errors)
    }

    /// Read and parse an environment file from disk.
    pub fn load_file(path: &Path) -> std::io::Result<(Environment, Vec<ConfigError>)> {
        let s = std::fs::read_to_string(path)?;
        Ok(Self::load_str(&s))
    }
}

/// Parse a `name=value` override as given on the command line.
pub fn parse_assignment(s: &str) -> Result<(String, Value), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{s}'"))?;
    let name = name.trim();
    check_name(name)?;
    Ok((name.to_owned(), Value::parse_literal(value)))
}

/// Names must be reachable as `..name::`, i.e. consist of word characters.
fn check_name(name: &str) -> Result<(), String> {
    if !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(format!("invalid variable name '{name}'"))
    }
}

// ── Argument tokenizer ────────────────────────────────────────────────────────

/// Split `s` into whitespace-delimited words, honouring double-quoted strings
/// and `\"` escapes within them.
fn split_args(s: &str) -> Vec<String> {
    let mut args: Vec<String> = Vec::new();
    let mut cur = String::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let mut chars = s.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if !in_quotes => {
                in_quotes = true;
                quoted = true;
            }
            '"' if in_quotes => in_quotes = false,
            '\\' if in_quotes => {
                if let Some(escaped) = chars.next() {
                    cur.push(escaped);
                }
            }
            c if c.is_whitespace() && !in_quotes => {
                if !cur.is_empty() || quoted {
                    args.push(std::mem::take(&mut cur));
                    quoted = false;
                }
            }
            c => cur.push(c),
        }
    }
    if !cur.is_empty() || quoted {
        args.push(cur);
    }
    args
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_are_cast() {
        let (env, errors) = EnvFile::load_str("temp 27\nvdd 1.8\nfast true\nmodel nmos\n");
        assert!(errors.is_empty());
        assert_eq!(env.get("temp"), Some(&Value::Int(27)));
        assert_eq!(env.get("vdd"), Some(&Value::Float(1.8)));
        assert_eq!(env.get("fast"), Some(&Value::Bool(true)));
        assert_eq!(env.get("model"), Some(&Value::Str("nmos".into())));
    }

    #[test]
    fn several_values_make_a_list() {
        let (env, _) = EnvFile::load_str("widths 1 2 4");
        assert_eq!(env.get("widths"), Some(&Value::from(vec![1i64, 2, 4])));
    }

    #[test]
    fn quotes_group_words() {
        let (env, _) = EnvFile::load_str(r#"corner "slow slow" "" "a \"b\"""#);
        assert_eq!(
            env.get("corner"),
            Some(&Value::from(vec!["slow slow", "", "a \"b\""]))
        );
    }

    #[test]
    fn comments_and_blank_lines_skipped() {
        let (env, errors) = EnvFile::load_str("# header\n\n   \n## more\nx 1\n");
        assert!(errors.is_empty());
        assert_eq!(env.len(), 1);
    }

    #[test]
    fn later_lines_override() {
        let (env, _) = EnvFile::load_str("x 1\nx 2\n");
        assert_eq!(env.get("x"), Some(&Value::Int(2)));
    }

    #[test]
    fn bad_lines_are_reported_not_fatal() {
        let (env, errors) = EnvFile::load_str("lonely\nbad-name 3\nok 1\n");
        assert_eq!(env.len(), 1);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].line, 1);
        assert_eq!(errors[1].line, 2);
        assert!(errors[1].to_string().contains("bad-name"));
    }

    #[test]
    fn assignment() {
        assert_eq!(parse_assignment("n=4").unwrap(), ("n".to_owned(), Value::Int(4)));
        assert_eq!(
            parse_assignment("label=hello world").unwrap(),
            ("label".to_owned(), Value::Str("hello world".into()))
        );
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("=3").is_err());
    }

    #[test]
    fn load_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sim.env");
        std::fs::write(&path, "temp 85\n").unwrap();
        let (env, errors) = EnvFile::load_file(&path).unwrap();
        assert!(errors.is_empty());
        assert_eq!(env.get("temp"), Some(&Value::Int(85)));
    }
}
