use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use env_logger::Builder;
use log::info;

use fave::session::Session;

#[derive(ClapParser, Debug)]
#[command(version, about = "Fave language interpreter", long_about = None)]
pub struct Cli {
    /// Script to execute; starts an interactive prompt when omitted
    script: Option<PathBuf>,

    /// Print the token stream as JSON lines instead of executing
    #[arg(long, requires = "script")]
    dump_tokens: bool,

    /// Enable logging to app.log
    #[arg(long)]
    log: bool,
}

fn init_logger() -> Result<()> {
    // Create or open the log file
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    // Configure env_logger to write to file with module and source line
    Builder::new()
        .format(|buf, record| {
            // Strip 'fave::' from module path
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("fave::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // Default to Debug, override with RUST_LOG
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    // Initialize logger only if --log flag is provided
    if args.log {
        init_logger()?;
    } else {
        // Initialize a minimal logger to avoid "no logger" errors
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    let mut session = Session::new();

    match args.script {
        Some(path) => {
            if args.dump_tokens {
                session
                    .dump_tokens(&path)
                    .context(format!("Failed to tokenize {:?}", path))?;
            } else {
                session
                    .run_file(&path)
                    .context(format!("Failed to run {:?}", path))?;
            }

            if session.had_error() {
                std::process::exit(65);
            }

            if session.had_runtime_error() {
                std::process::exit(70);
            }
        }

        None => {
            session.run_prompt().context("Prompt loop failed")?;
        }
    }

    Ok(())
}
