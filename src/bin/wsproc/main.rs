//! wsproc - run a command line under the workspace process supervisor

mod cli;
mod commands;
mod logging;
mod runner;

use clap::Parser;
use cli::{Cli, Commands};
use commands::{check_requirements, print_tokens};
use console::style;

/// Exit code when the command could not be started at all
const LAUNCH_FAILURE: i32 = 127;

fn main() {
    let cli = Cli::parse();

    logging::init_logger(cli.verbose);

    match cli.command {
        Commands::Run(args) => match runner::run(&args) {
            Ok(code) => std::process::exit(code),
            Err(e) => {
                eprintln!("{} {}", style("error:").red().bold(), e);
                std::process::exit(LAUNCH_FAILURE);
            }
        },
        Commands::Tokenize { command_line } => print_tokens(&command_line),
        Commands::Check => check_requirements(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn check_requirements_runs() {
        check_requirements();
    }

    #[test]
    fn run_requires_command_or_options() {
        assert!(Cli::try_parse_from(["wsproc", "run"]).is_err());
        assert!(Cli::try_parse_from(["wsproc", "run", "echo hi"]).is_ok());
        assert!(Cli::try_parse_from(["wsproc", "run", "--options", "o.json"]).is_ok());
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "wsproc", "run", "--cwd", "/tmp", "--sandbox", "--id", "w1", "ls -la",
        ])
        .unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };

        let options = runner::launch_options(&args).unwrap();
        assert_eq!(options.command_line, "ls -la");
        assert_eq!(options.cwd, Some(PathBuf::from("/tmp")));
        assert!(options.sandbox);
        assert_eq!(options.id, "w1");
    }

    #[test]
    fn default_id_is_generated() {
        let cli = Cli::try_parse_from(["wsproc", "run", "true"]).unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        let options = runner::launch_options(&args).unwrap();
        assert!(options.id.starts_with("wsproc-"));
    }

    #[cfg(unix)]
    #[test]
    fn run_returns_child_exit_code() {
        let cli = Cli::try_parse_from(["wsproc", "run", "--poll-ms", "1", "sh -c 'exit 5'"]).unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(runner::run(&args).unwrap(), 5);
    }

    #[test]
    fn run_reports_launch_failure() {
        let cli = Cli::try_parse_from(["wsproc", "run", "no-such-binary-wsproc-e91"]).unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert!(runner::run(&args).is_err());
    }
}
