//! jsonweave CLI
//!
//! Usage:
//!   jsonweave [OPTIONS] --context <FILE> [TEMPLATE]
//!
//! Options:
//!   -c, --context <FILE>  Context file (JSON object)
//!   --config <FILE>       Engine configuration (TOML format)
//!   --compact             Print the result on a single line
//!   --no-builtins         Do not install the builtin helper functions
//!   -v, --verbose         Increase log verbosity (repeatable)
//!   -h, --help            Print help

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::Parser;
use serde_json::Value as JsonValue;
use tracing_subscriber::EnvFilter;

use jsonweave::{render_with_config, Context, EngineConfig, EvalError, RenderError};

#[derive(Parser)]
#[command(name = "jsonweave")]
#[command(about = "Render JSON templates against a context")]
struct Cli {
    /// Template file (reads from stdin if not provided)
    template: Option<PathBuf>,

    /// Context file (JSON object)
    #[arg(short, long)]
    context: PathBuf,

    /// Engine configuration file (TOML format)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the rendered JSON on a single line
    #[arg(long)]
    compact: bool,

    /// Do not install the builtin helper functions
    #[arg(long)]
    no_builtins: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => match EngineConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => EngineConfig::default(),
    };

    let template = match &cli.template {
        Some(path) => read_json(path),
        None => {
            let mut buffer = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut buffer) {
                eprintln!("Error reading from stdin: {}", e);
                std::process::exit(1);
            }
            match serde_json::from_str(&buffer) {
                Ok(json) => json,
                Err(e) => {
                    eprintln!("Error parsing template from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    let mut context = match Context::from_json(read_json(&cli.context)) {
        Ok(context) => context,
        Err(e) => {
            eprintln!("Error in context '{}': {}", cli.context.display(), e);
            std::process::exit(1);
        }
    };
    if !cli.no_builtins {
        context = context.with_builtins();
    }

    match render_with_config(template, context, config) {
        Ok(output) => {
            let printed = if cli.compact {
                serde_json::to_string(&output)
            } else {
                serde_json::to_string_pretty(&output)
            };
            match printed {
                Ok(text) => println!("{}", text),
                Err(e) => {
                    eprintln!("Error serializing output: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Err(e) => {
            report(&e);
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_json(path: &Path) -> JsonValue {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path.display(), e);
            std::process::exit(1);
        }
    };
    match serde_json::from_str(&content) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error parsing JSON in '{}': {}", path.display(), e);
            std::process::exit(1);
        }
    }
}

fn report(error: &RenderError) {
    // Syntax errors get a source excerpt pointing at the offending token
    if let RenderError::Evaluation {
        expression,
        path,
        source: EvalError::Parse(errors),
    } = error
    {
        let name = if path.is_empty() { "/" } else { path.as_str() };
        for parse_error in errors {
            eprint!("{}", parse_error.format(expression, name));
        }
        return;
    }
    eprintln!("Error: {}", error);
}
