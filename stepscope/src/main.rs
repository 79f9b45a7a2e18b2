//! Step report tooling.
//!
//! Writes the default reporting config and inspects JSON-lines step reports
//! produced by a reporting session.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use stepscope::exit_codes;
use stepscope::inspect::{CheckOutcome, check_report, render_report};
use stepscope::io::config::{DEFAULT_CONFIG_FILE, StepsConfig, write_config};
use stepscope::logging;

#[derive(Parser)]
#[command(
    name = "stepscope",
    version,
    about = "Configure and inspect nested test step reports"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a default config file if missing.
    Init {
        /// Config file to write.
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        path: PathBuf,
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
    /// Print the step tree of a report as an indented outline.
    Render {
        /// JSON-lines report file.
        report: PathBuf,
    },
    /// Check step nesting; exits 2 when any step failed.
    Check {
        /// JSON-lines report file.
        report: PathBuf,
    },
}

fn main() {
    logging::init("warn");
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Init { path, force } => cmd_init(&path, force),
        Command::Render { report } => cmd_render(&report),
        Command::Check { report } => cmd_check(&report),
    }
}

fn cmd_init(path: &Path, force: bool) -> Result<i32> {
    if !force && path.exists() {
        println!("{} already exists", path.display());
        return Ok(exit_codes::OK);
    }
    write_config(path, &StepsConfig::default())
        .with_context(|| format!("write {}", path.display()))?;
    println!("wrote {}", path.display());
    Ok(exit_codes::OK)
}

fn cmd_render(report: &Path) -> Result<i32> {
    let outline = render_report(report)?;
    if !outline.is_empty() {
        println!("{outline}");
    }
    Ok(exit_codes::OK)
}

fn cmd_check(report: &Path) -> Result<i32> {
    match check_report(report)? {
        CheckOutcome::Clean { nodes } => {
            println!("ok: {nodes} nodes");
            Ok(exit_codes::OK)
        }
        CheckOutcome::Failed { failed } => {
            for path in &failed {
                println!("failed: {path}");
            }
            Ok(exit_codes::FAILED)
        }
    }
}
