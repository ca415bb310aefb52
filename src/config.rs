//! Configuration for the terminal engine
//!
//! Precedence, lowest to highest: built-in defaults, the TOML config file,
//! `TERMINAL_ENGINE_*` environment variables, command line flags.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};
use terminal_input::StickyModifiers;
use thiserror::Error;

/// Upper bound for either screen dimension
pub const MAX_DIMENSION: usize = 1000;

/// Upper bound for the scrollback capacity
pub const MAX_SCROLLBACK: usize = 10_000_000;

/// CLI arguments for the replay binary
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "terminal-replay")]
#[command(version)]
#[command(
    about = "Replay a captured terminal byte stream and print the resulting screen",
    long_about = None
)]
pub struct CliArgs {
    /// Path to custom config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Screen rows
    #[arg(short, long, value_name = "ROWS")]
    pub rows: Option<usize>,

    /// Screen columns
    #[arg(short = 'C', long, value_name = "COLS")]
    pub cols: Option<usize>,

    /// Number of scrollback lines
    #[arg(long, value_name = "LINES")]
    pub scrollback: Option<usize>,

    /// Print the snapshot as JSON instead of text
    #[arg(short, long)]
    pub json: bool,

    /// Rows to scroll back before printing
    #[arg(short, long, value_name = "ROWS", default_value_t = 0)]
    pub offset: usize,

    /// Input file (reads stdin when omitted)
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    pub rows: usize,
    pub cols: usize,
    /// Lines kept after scrolling off the top; 0 disables scrollback
    pub scrollback_lines: usize,
    /// Taps on OSC 8 spans and bare URLs report hyperlink clicks
    pub detect_links: bool,
    pub sticky_modifiers: StickyModifiers,
    /// Shift+digit sends F1..F10
    pub shifted_numbers_are_fkeys: bool,
    /// Ctrl+digit sends F1..F10
    pub control_numbers_are_fkeys: bool,
    /// Color scheme file (GNOME/Gogh or iTerm2)
    pub palette: Option<PathBuf>,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            rows: 24,
            cols: 80,
            scrollback_lines: terminal_core::DEFAULT_SCROLLBACK_SIZE,
            detect_links: true,
            sticky_modifiers: StickyModifiers::None,
            shifted_numbers_are_fkeys: false,
            control_numbers_are_fkeys: false,
            palette: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config error in '{field}': {message}")]
    Invalid { field: &'static str, message: String },
}

impl TerminalConfig {
    /// Load configuration with full precedence:
    /// CLI args > environment variables > config file > defaults
    pub fn load_with_args(args: &CliArgs) -> Result<Self, ConfigError> {
        let mut config = TerminalConfig::default();

        let config_path = args.config.clone().or_else(Self::default_config_path);
        if let Some(path) = &config_path {
            if path.exists() {
                match Self::load_from_file(path) {
                    Ok(file_config) => config = file_config,
                    Err(e) => tracing::warn!("Failed to load config from {:?}: {}", path, e),
                }
            }
        }

        config.apply_env_vars();
        config.apply_cli_args(args);
        config.validate()?;

        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    fn apply_env_vars(&mut self) {
        self.apply_env(|key| env::var(key).ok());
    }

    /// Apply `TERMINAL_ENGINE_*` overrides read through `lookup`. Values
    /// that fail to parse are ignored.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(rows) = lookup("TERMINAL_ENGINE_ROWS").and_then(|v| v.parse().ok()) {
            self.rows = rows;
        }
        if let Some(cols) = lookup("TERMINAL_ENGINE_COLS").and_then(|v| v.parse().ok()) {
            self.cols = cols;
        }
        if let Some(lines) = lookup("TERMINAL_ENGINE_SCROLLBACK").and_then(|v| v.parse().ok()) {
            self.scrollback_lines = lines;
        }
        if let Some(val) = lookup("TERMINAL_ENGINE_DETECT_LINKS") {
            self.detect_links = val == "1" || val.eq_ignore_ascii_case("true");
        }
    }

    fn apply_cli_args(&mut self, args: &CliArgs) {
        if let Some(rows) = args.rows {
            self.rows = rows;
        }
        if let Some(cols) = args.cols {
            self.cols = cols;
        }
        if let Some(scrollback) = args.scrollback {
            self.scrollback_lines = scrollback;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows < 1 {
            return Err(invalid("rows", "Screen rows must be at least 1"));
        }
        if self.cols < 2 {
            return Err(invalid("cols", "Screen columns must be at least 2"));
        }
        if self.rows > MAX_DIMENSION {
            return Err(invalid(
                "rows",
                format!("Screen rows must be at most {MAX_DIMENSION}"),
            ));
        }
        if self.cols > MAX_DIMENSION {
            return Err(invalid(
                "cols",
                format!("Screen columns must be at most {MAX_DIMENSION}"),
            ));
        }
        if self.scrollback_lines > MAX_SCROLLBACK {
            return Err(invalid(
                "scrollback_lines",
                "Scrollback lines must be at most 10,000,000",
            ));
        }
        Ok(())
    }

    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("terminal-engine").join("config.toml"))
    }
}

fn invalid(field: &'static str, message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        message: message.into(),
    }
}
