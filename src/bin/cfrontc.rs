//! A thin CLI binary wiring [`cfront::run_pipeline`] to the normative flag surface: it exists so
//! the driver's flag surface is exercisable by integration tests, not as a deliverable of its own.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Lex, parse, and constant-fold one or more C-like source files.
#[derive(Parser, Debug)]
#[clap(name = "cfrontc", version)]
struct Cli {
    /// Source files to process.
    #[clap(required = true)]
    inputs: Vec<PathBuf>,

    /// Stop after lexing and print the token stream.
    #[clap(short = 'l')]
    lex_only: bool,

    /// Compile only (no link). Accepted for CLI-surface compatibility; this crate has no linker.
    #[clap(short = 'c')]
    compile_only: bool,

    /// Output file path.
    #[clap(short = 'o', value_name = "PATH")]
    output: Option<PathBuf>,

    /// Warning category, attached to `-W` the way gcc attaches it (`-Wall`, `-Werror`, ...).
    /// May be given multiple times.
    #[clap(short = 'W', value_name = "CATEGORY", action = clap::ArgAction::Append)]
    warnings: Vec<String>,

    /// Emit debug info. Accepted for CLI-surface compatibility.
    #[clap(short = 'g')]
    debug_info: bool,

    /// Enable constant-fold optimization.
    #[clap(short = 'O')]
    optimize: bool,

    /// Header search path. May be given multiple times.
    #[clap(short = 'I', value_name = "PATH", action = clap::ArgAction::Append)]
    include: Vec<PathBuf>,
}

impl Cli {
    fn wall(&self) -> bool {
        self.warnings.iter().any(|w| w == "all")
    }

    fn werror(&self) -> bool {
        self.warnings.iter().any(|w| w == "error")
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    let _ = (cli.compile_only, cli.debug_info, cli.output, cli.include);

    let mut had_diagnostics = false;
    for input in &cli.inputs {
        let source = std::fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?;

        if cli.lex_only {
            let (tokens, diags) = cfront::lex(&source);
            for t in &tokens {
                println!("{t}");
            }
            for d in &diags {
                eprintln!("{d}");
                had_diagnostics = true;
            }
            continue;
        }

        let (ast, diagnostics) = cfront::run_pipeline(&source, cli.optimize);
        for d in &diagnostics {
            eprintln!("{d}");
        }
        if !diagnostics.is_empty() {
            had_diagnostics = true;
            if cli.werror() {
                anyhow::bail!("{} diagnostic(s) promoted to errors by -Werror", diagnostics.len());
            }
        }
        if cli.wall() {
            println!("{}", ast.print_tree());
        }
    }

    if had_diagnostics {
        std::process::exit(1);
    }
    Ok(())
}
