//! Terminal Replay
//!
//! Feeds a captured byte stream (file or stdin) through the engine and
//! prints the resulting screen as text or JSON.

use std::io::{self, Read};
use std::process::ExitCode;

use clap::Parser;
use terminal_engine::{CliArgs, NoopEvents, Terminal, TerminalConfig, TerminalError};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = CliArgs::parse();
    match run(&args) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &CliArgs) -> Result<String, TerminalError> {
    let config = TerminalConfig::load_with_args(args)?;
    let mut terminal = Terminal::new(&config, Box::new(NoopEvents));
    if let Some(path) = &config.palette {
        terminal.load_palette_file(path)?;
    }

    let input = match &args.input {
        Some(path) => std::fs::read(path)?,
        None => {
            let mut data = Vec::new();
            io::stdin().read_to_end(&mut data)?;
            data
        }
    };
    tracing::debug!("replaying {} bytes", input.len());

    terminal.write_input(&input);
    terminal.set_scroll_offset(args.offset);
    let snapshot = terminal.snapshot();

    if args.json {
        return Ok(snapshot.to_json()?);
    }

    let cursor = snapshot.cursor();
    let mut out = format!(
        "Terminal State ({}x{}, scrollback {}, offset {}):\nCursor: ({}, {})\n---\n",
        snapshot.cols(),
        snapshot.rows(),
        snapshot.scrollback_len(),
        snapshot.scroll_offset(),
        cursor.row,
        cursor.col
    );
    out.push_str(&snapshot.text());
    out.push_str("\n---");
    Ok(out)
}
