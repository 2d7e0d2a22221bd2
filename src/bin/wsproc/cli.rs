use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "wsproc")]
#[command(version, about = "Run a command line with non-blocking output capture", long_about = None)]
#[command(after_help = "EXAMPLES:
    wsproc run \"echo 'hello world'\"
    wsproc run --cwd /tmp --sandbox \"ls -la\"
    wsproc run --options launch.json
    wsproc tokenize \"grep -r 'two words' src\"
    wsproc check
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch a command and stream its output until it exits
    Run(RunArgs),

    /// Print how a command line splits into arguments
    Tokenize {
        /// Command line to split
        command_line: String,
    },

    /// Check sandbox support on this system
    Check,
}

#[derive(Args)]
pub struct RunArgs {
    /// Command line to execute
    #[arg(value_name = "COMMAND_LINE", required_unless_present = "options")]
    pub command_line: Option<String>,

    /// Load launch options from a JSON file
    #[arg(long, value_name = "FILE", conflicts_with = "command_line")]
    pub options: Option<PathBuf>,

    /// Working directory for the process
    #[arg(short = 'C', long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Run inside the platform sandbox when available
    #[arg(short, long)]
    pub sandbox: bool,

    /// Label used in log lines
    #[arg(short, long, value_name = "ID")]
    pub id: Option<String>,

    /// Sleep between idle polls, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 10)]
    pub poll_ms: u64,
}
