use std::io::{Read, Write};
use std::process::ExitCode;

use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use monaco::cli::{self, CliArgs, Input};
use monaco::config::EnvFile;
use monaco::{Environment, Template};

fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("monaco: {e}");
            eprintln!("{}", cli::USAGE);
            return ExitCode::FAILURE;
        }
    };

    init_logging(args.debug);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("monaco: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr; `MONACO_LOG` takes `EnvFilter` directives, `-d` forces debug.
fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("MONACO_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    // ── Environment: files in order, then -D overrides ───────────────────────
    let mut env = Environment::new();
    for path in &args.env_files {
        let (file_env, errors) = EnvFile::load_file(path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
        for e in errors {
            warn!("{}: {e}", path.display());
        }
        debug!(path = %path.display(), vars = file_env.len(), "loaded environment file");
        env.extend(file_env.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    env.extend(args.defines.iter().cloned());

    // ── Template ─────────────────────────────────────────────────────────────
    let template = match &args.input {
        Input::File(path) => Template::from_path(path)?,
        Input::Stdin => {
            let mut src = String::new();
            std::io::stdin().read_to_string(&mut src)?;
            src.parse::<Template>()?
        }
    };

    let rendered = template.render_in(&mut env)?;

    match &args.output {
        Some(path) => std::fs::write(path, rendered)
            .map_err(|e| format!("cannot write {}: {e}", path.display()))?,
        None => std::io::stdout().write_all(rendered.as_bytes())?,
    }
    Ok(())
}
