use clap::{Parser, Subcommand};

pub mod advisory;
pub mod config;
pub mod settings;
pub mod stats;
pub mod tracking;

/// One line typed into the interactive shell.
#[derive(Parser, Debug)]
#[command(multicall = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: ShellCommand,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum ShellCommand {
    /// Start tracking screen time
    Start,
    /// Stop tracking
    Stop,
    /// Pause tracking
    Pause,
    /// Resume tracking
    Resume,
    /// Take a break now
    Break,
    /// Skip the rest of the current break
    Skip,
    /// Show tracker state and risk
    Status {
        /// Print the state snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show screen-time statistics
    Stats {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// List settings
    Settings,
    /// Change a setting (e.g. `set break-interval 45`, `set sound off`)
    Set {
        field: String,
        value: String,
    },
    /// Show the pomodoro cycle, or change one of its fields
    Pomodoro {
        /// work | break | long-break | sessions
        #[arg(requires = "value")]
        field: Option<String>,
        value: Option<String>,
    },
    /// Ask the prediction service for a burnout risk
    Check {
        /// Mood from 1 (low) to 5 (great)
        #[arg(long)]
        mood: u8,
        /// Hours slept last night
        #[arg(long)]
        sleep: f64,
        /// Score locally instead of calling the service
        #[arg(long)]
        offline: bool,
    },
    /// Tips to reduce burnout
    Tips,
    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

impl ShellLine {
    /// Parse a raw input line. `Ok(None)` for blank lines.
    pub fn parse_line(line: &str) -> Result<Option<ShellCommand>, clap::Error> {
        let args: Vec<&str> = line.split_whitespace().collect();
        if args.is_empty() {
            return Ok(None);
        }
        Self::try_parse_from(args).map(|parsed| Some(parsed.command))
    }
}
