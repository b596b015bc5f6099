//! Command-line argument parsing.
//!
//! Usage:
//!   monaco [-d] [-e<envfile>]... [-D<name>=<value>]... [-o<out>] <template>
//!
//! `-` as the template reads it from stdin.

use std::path::PathBuf;

use crate::config::parse_assignment;
use crate::template::Value;

pub const USAGE: &str =
    "Usage: monaco [-d] [-e<envfile>]... [-D<name>=<value>]... [-o<out>] <template|->";

// ── Public types ──────────────────────────────────────────────────────────────

/// Parsed command-line arguments.
#[derive(Debug, Default)]
pub struct CliArgs {
    /// Environment files, applied in order (`-e<file>`).
    pub env_files: Vec<PathBuf>,
    /// Single-variable overrides applied after the files (`-D<name>=<value>`).
    pub defines: Vec<(String, Value)>,
    /// Output file; stdout when absent (`-o<file>`).
    pub output: Option<PathBuf>,
    /// Debug logging (`-d`).
    pub debug: bool,
    /// Where the template comes from.
    pub input: Input,
}

/// Template source.
#[derive(Debug, Default, PartialEq)]
pub enum Input {
    /// Read from standard input (`-` or no positional argument).
    #[default]
    Stdin,
    /// Read from a file.
    File(PathBuf),
}

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parse `std::env::args()` and return [`CliArgs`] or an error message.
pub fn parse_args() -> Result<CliArgs, String> {
    let raw: Vec<String> = std::env::args().collect();
    parse_argv(raw.get(1..).unwrap_or_default())
}

/// Parse a slice of argument strings (exposed for testing).
pub fn parse_argv(argv: &[String]) -> Result<CliArgs, String> {
    let mut args = CliArgs::default();
    let mut positional: Vec<String> = Vec::new();
    let mut i = 0;

    while i < argv.len() {
        let arg = argv[i].as_str();

        // `--` ends flag processing.
        if arg == "--" {
            i += 1;
            positional.extend(argv[i..].iter().cloned());
            break;
        }

        // Non-flag argument.
        if !arg.starts_with('-') || arg == "-" {
            positional.push(arg.to_owned());
            i += 1;
            continue;
        }

        // Flag argument: iterate over characters after the leading `-`.
        let chars: Vec<char> = arg[1..].chars().collect();
        let mut j = 0;
        while j < chars.len() {
            match chars[j] {
                'd' => args.debug = true,

                // Flags taking a value, attached (`-ofile`) or separate (`-o file`).
                flag @ ('e' | 'D' | 'o') => {
                    let value = if j + 1 < chars.len() {
                        let s: String = chars[j + 1..].iter().collect();
                        j = chars.len();
                        s
                    } else if i + 1 < argv.len() {
                        i += 1;
                        argv[i].clone()
                    } else {
                        return Err(format!("-{flag} requires an argument"));
                    };
                    match flag {
                        'e' => args.env_files.push(PathBuf::from(value)),
                        'D' => args.defines.push(parse_assignment(&value)?),
                        _ => args.output = Some(PathBuf::from(value)),
                    }
                }

                c => return Err(format!("unknown option: -{c}")),
            }
            j += 1;
        }
        i += 1;
    }

    match positional.len() {
        0 => {}
        1 => {
            let p = positional.remove(0);
            if p != "-" {
                args.input = Input::File(PathBuf::from(p));
            }
        }
        n => return Err(format!("too many arguments ({n})")),
    }

    Ok(args)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|&s| s.to_owned()).collect()
    }

    #[test]
    fn empty_args_reads_stdin() {
        let a = parse_argv(&argv(&[])).unwrap();
        assert_eq!(a.input, Input::Stdin);
        assert!(a.output.is_none());
        assert!(!a.debug);
    }

    #[test]
    fn template_positional() {
        let a = parse_argv(&argv(&["netlist.tpl"])).unwrap();
        assert_eq!(a.input, Input::File(PathBuf::from("netlist.tpl")));
    }

    #[test]
    fn dash_is_stdin() {
        let a = parse_argv(&argv(&["-"])).unwrap();
        assert_eq!(a.input, Input::Stdin);
    }

    #[test]
    fn env_files_keep_order() {
        let a = parse_argv(&argv(&["-ebase.env", "-e", "run.env", "t.tpl"])).unwrap();
        assert_eq!(a.env_files, vec![PathBuf::from("base.env"), PathBuf::from("run.env")]);
    }

    #[test]
    fn defines_are_cast() {
        let a = parse_argv(&argv(&["-Dtemp=27", "-D", "model=nmos"])).unwrap();
        assert_eq!(
            a.defines,
            vec![
                ("temp".to_owned(), Value::Int(27)),
                ("model".to_owned(), Value::Str("nmos".into())),
            ]
        );
    }

    #[test]
    fn bad_define_is_error() {
        assert!(parse_argv(&argv(&["-Dnovalue"])).is_err());
    }

    #[test]
    fn output_embedded_and_separate() {
        let a = parse_argv(&argv(&["-oout.sp"])).unwrap();
        assert_eq!(a.output, Some(PathBuf::from("out.sp")));
        let a = parse_argv(&argv(&["-o", "out.sp"])).unwrap();
        assert_eq!(a.output, Some(PathBuf::from("out.sp")));
    }

    #[test]
    fn combined_flags() {
        let a = parse_argv(&argv(&["-dofile.out"])).unwrap();
        assert!(a.debug);
        assert_eq!(a.output, Some(PathBuf::from("file.out")));
    }

    #[test]
    fn missing_flag_value() {
        assert!(parse_argv(&argv(&["-o"])).is_err());
    }

    #[test]
    fn double_dash_ends_flags() {
        let a = parse_argv(&argv(&["--", "-weird.tpl"])).unwrap();
        assert_eq!(a.input, Input::File(PathBuf::from("-weird.tpl")));
    }

    #[test]
    fn too_many_positional() {
        assert!(parse_argv(&argv(&["a", "b"])).is_err());
    }

    #[test]
    fn unknown_flag() {
        assert!(parse_argv(&argv(&["-z"])).is_err());
    }
}
