use console::style;
use env_logger::Builder;
use log::{Level, LevelFilter};
use std::io::Write;

/// Log to stderr so the child's stdout passes through untouched.
///
/// `--verbose` raises the supervisor's own modules to debug; `RUST_LOG`
/// is applied last and wins.
pub fn init_logger(verbose: bool) {
    let own_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    Builder::new()
        .filter_level(LevelFilter::Warn)
        .filter_module("workspace_proc", own_level)
        .filter_module("wsproc", own_level)
        .parse_default_env()
        .format(|buf, record| {
            let level = match record.level() {
                Level::Error => style("error").red().bold(),
                Level::Warn => style("warn ").yellow().bold(),
                Level::Info => style("info ").green(),
                Level::Debug => style("debug").cyan(),
                Level::Trace => style("trace").dim(),
            };
            writeln!(buf, "{} {} {}", style("wsproc").dim(), level, record.args())
        })
        .init();
}
