//! Command-line front end: render, check or apply a resolver parameter file.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use resolvconf_manager::{ResolvConfManager, ResolverError, ResolverParams, validate};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(name = "resolvconf")]
#[command(version)]
#[command(about = "Validate resolver parameters and manage /etc/resolv.conf", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the file content to stdout
    Render(Source),
    /// Validate only; print every problem found
    Check(Source),
    /// Write the target file
    Apply {
        #[command(flatten)]
        source: Source,

        /// Report what would change without writing
        #[arg(long)]
        noop: bool,
    },
}

#[derive(Args, Debug)]
struct Source {
    /// JSON parameter file, or `-` for stdin
    #[arg(short, long)]
    params: PathBuf,

    /// Tool named in the warning banner
    #[arg(short, long, default_value = "resolvconf")]
    tool: String,
}

impl Source {
    fn load(&self) -> Result<ResolverParams> {
        let text = if self.params.as_os_str() == "-" {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read parameters from stdin")?;
            buf
        } else {
            std::fs::read_to_string(&self.params)
                .with_context(|| format!("failed to read {}", self.params.display()))?
        };
        ResolverParams::from_json(&text)
            .with_context(|| format!("failed to parse {}", self.params.display()))
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("resolvconf={0},resolvconf_manager={0}", cli.log_level)));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli.command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: &Command) -> Result<ExitCode> {
    match command {
        Command::Render(source) => {
            let params = source.load()?;
            let manager = ResolvConfManager::new(&source.tool);
            match manager.plan(&params) {
                Ok((_, content)) => {
                    print!("{content}");
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => report(e),
            }
        }
        Command::Check(source) => {
            let params = source.load()?;
            match validate(&params) {
                Ok(conf) => {
                    println!("ok: {}", conf.path().display());
                    Ok(ExitCode::SUCCESS)
                }
                Err(errors) => report(errors.into()),
            }
        }
        Command::Apply { source, noop } => {
            let params = source.load()?;
            let manager = ResolvConfManager::new(&source.tool).noop(*noop);
            match manager.apply(&params) {
                Ok(outcome) => {
                    println!("{outcome:?}");
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => report(e),
            }
        }
    }
}

/// Prints validation failures one per line; anything else is propagated.
fn report(error: ResolverError) -> Result<ExitCode> {
    match error.validation_errors() {
        Some(errors) => {
            for e in errors {
                eprintln!("{}: {e}", e.kind);
            }
            Ok(ExitCode::FAILURE)
        }
        None => Err(error.into()),
    }
}
